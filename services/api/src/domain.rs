// ドメイン層モジュール
pub mod expense;
pub mod goal;
pub mod income;
pub mod ledger_event;
pub mod money;
pub mod timestamp;
pub mod user;

// 再エクスポート
pub use expense::Expense;
pub use goal::Goal;
pub use income::Income;
pub use ledger_event::LedgerEvent;
pub use user::User;

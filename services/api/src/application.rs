// アプリケーション層モジュール
pub mod expense_handler;
pub mod goal_handler;
pub mod income_handler;
pub mod ledger_event_handler;
pub mod response;
pub mod router;
pub mod user_handler;

// 再エクスポート
pub use expense_handler::ExpenseHandler;
pub use goal_handler::GoalHandler;
pub use income_handler::IncomeHandler;
pub use ledger_event_handler::LedgerEventHandler;
pub use router::ApiRouter;
pub use user_handler::UserHandler;

// インフラストラクチャ層モジュール
pub mod config;
pub mod credentials;
pub mod expense_repository;
pub mod goal_repository;
pub mod income_repository;
pub mod ledger_event_repository;
pub mod logging;
pub mod store;
pub mod user_repository;

// 再エクスポート
pub use config::{DynamoDbConfig, DynamoDbConfigError};
pub use expense_repository::{DynamoExpenseRepository, ExpenseRepository};
pub use goal_repository::{DynamoGoalRepository, GoalRepository};
pub use income_repository::{DynamoIncomeRepository, IncomeRepository};
pub use ledger_event_repository::{DynamoLedgerEventRepository, LedgerEventRepository};
pub use logging::init_logging;
pub use store::StoreError;
pub use user_repository::{DynamoUserRepository, UserRepository};

/// DynamoDB接続設定
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// DynamoDB設定のエラー型
#[derive(Debug, Error)]
pub enum DynamoDbConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// テーブル名とクライアントを持つDynamoDB設定
///
/// この構造体は環境変数から読み込んだDynamoDBクライアントとテーブル名を保持します。
/// テーブル名は以下の環境変数で設定:
/// - USERS_TABLE_NAME: ユーザーテーブル
/// - EXPENSES_TABLE_NAME: 支出テーブル
/// - INCOME_TABLE_NAME: 収入テーブル
/// - GOALS_TABLE_NAME: 貯蓄目標テーブル
/// - EVENTS_TABLE_NAME: 台帳イベントテーブル
#[derive(Debug, Clone)]
pub struct DynamoDbConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    users_table: String,
    expenses_table: String,
    income_table: String,
    goals_table: String,
    events_table: String,
}

/// userId全件取得に使うグローバルセカンダリインデックス名
///
/// 4つのトランザクションテーブル（Expenses/Income/Goals/Events）共通。
pub const USER_ID_INDEX: &str = "UserIdIndex";

impl DynamoDbConfig {
    /// 環境からAWS設定を読み込み、環境変数からテーブル名を読み取って新しいDynamoDbConfigを作成
    pub async fn from_env() -> Result<Self, DynamoDbConfigError> {
        // 環境からAWS設定を読み込み（認証情報、リージョンなど）
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self {
            client,
            users_table: require_env("USERS_TABLE_NAME")?,
            expenses_table: require_env("EXPENSES_TABLE_NAME")?,
            income_table: require_env("INCOME_TABLE_NAME")?,
            goals_table: require_env("GOALS_TABLE_NAME")?,
            events_table: require_env("EVENTS_TABLE_NAME")?,
        })
    }

    /// 明示的な値で新しいDynamoDbConfigを作成（テスト用）
    pub fn new(
        client: DynamoDbClient,
        users_table: String,
        expenses_table: String,
        income_table: String,
        goals_table: String,
        events_table: String,
    ) -> Self {
        Self {
            client,
            users_table,
            expenses_table,
            income_table,
            goals_table,
            events_table,
        }
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    pub fn users_table(&self) -> &str {
        &self.users_table
    }

    pub fn expenses_table(&self) -> &str {
        &self.expenses_table
    }

    pub fn income_table(&self) -> &str {
        &self.income_table
    }

    pub fn goals_table(&self) -> &str {
        &self.goals_table
    }

    pub fn events_table(&self) -> &str {
        &self.events_table
    }
}

fn require_env(key: &str) -> Result<String, DynamoDbConfigError> {
    std::env::var(key).map_err(|_| DynamoDbConfigError::MissingEnvVar(key.to_string()))
}

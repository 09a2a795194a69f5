/// 家計簿API HTTPエントリポイント
///
/// API Gateway / Lambda Function URL経由のHTTPリクエストを受け取り、
/// ルーター経由で各リソースハンドラーへ振り分ける。
use std::sync::Arc;

use finance_api::application::ApiRouter;
use finance_api::infrastructure::{
    DynamoDbConfig, DynamoExpenseRepository, DynamoGoalRepository, DynamoIncomeRepository,
    DynamoLedgerEventRepository, DynamoUserRepository, init_logging,
};
use lambda_http::{Body, Error, Request, Response, run, service_fn};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("家計簿APIを初期化");

    // DynamoDBクライアントとテーブル名を環境から読み込み、
    // ルーターはコールドスタート時に一度だけ構築する
    let config = DynamoDbConfig::from_env().await?;
    let router = Arc::new(ApiRouter::new(
        DynamoUserRepository::new(&config),
        DynamoExpenseRepository::new(&config),
        DynamoIncomeRepository::new(&config),
        DynamoGoalRepository::new(&config),
        DynamoLedgerEventRepository::new(&config),
    ));

    run(service_fn(move |request: Request| {
        let router = Arc::clone(&router);
        async move { Ok::<Response<Body>, Error>(router.route(&request).await) }
    }))
    .await
}

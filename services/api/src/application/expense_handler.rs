/// 支出ハンドラー
///
/// 1操作 = 1ストア呼び出し。入力検証は行わず、ボディ解析や金額変換を
/// 含む内部エラーはすべてこの境界で捕捉して汎用の500に変換する
/// （ボディ不正で400を返すのはユーザー系ハンドラーのみ）。
use lambda_http::{Body, Response};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::application::response;
use crate::domain::expense::{Expense, ExpenseUpdate};
use crate::domain::{money, timestamp};
use crate::infrastructure::ExpenseRepository;

/// 支出リクエストボディ（作成・更新共通）
#[derive(Debug, Deserialize)]
struct ExpenseBody {
    name: Option<String>,
    #[serde(default, with = "money::option")]
    amount: Option<Decimal>,
    category: Option<String>,
    date: Option<String>,
}

/// 解析失敗・amount欠落を一括でエラーにする
fn parse_body(body: Option<&str>) -> Result<(ExpenseBody, Decimal), String> {
    let raw = body.ok_or_else(|| "Request body is missing".to_string())?;
    let parsed: ExpenseBody =
        serde_json::from_str(raw).map_err(|e| format!("Invalid body: {e}"))?;
    let amount = parsed
        .amount
        .ok_or_else(|| "Missing amount".to_string())?;
    Ok((parsed, amount))
}

/// 支出リソースのハンドラー
pub struct ExpenseHandler<R: ExpenseRepository> {
    repo: R,
}

impl<R: ExpenseRepository> ExpenseHandler<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// POST /expenses/{userId}
    pub async fn create(&self, user_id: &str, body: Option<&str>) -> Response<Body> {
        let (parsed, amount) = match parse_body(body) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "支出作成に失敗");
                return response::error(500, "Could not create expense");
            }
        };

        let now = timestamp::now_iso();
        let expense = Expense {
            user_id: user_id.to_string(),
            id: Uuid::new_v4().to_string(),
            name: parsed.name,
            amount,
            category: parsed.category,
            date: parsed.date,
            created_at: now.clone(),
            updated_at: now,
        };

        match self.repo.put(&expense).await {
            Ok(()) => response::respond_json(201, &expense),
            Err(e) => {
                error!(error = %e, "支出作成に失敗");
                response::error(500, "Could not create expense")
            }
        }
    }

    /// GET /expenses/{userId}
    pub async fn list(&self, user_id: &str) -> Response<Body> {
        match self.repo.list_by_user(user_id).await {
            Ok(expenses) => response::respond_json(200, &expenses),
            Err(e) => {
                error!(error = %e, "支出一覧取得に失敗");
                response::error(500, "Could not retrieve expenses")
            }
        }
    }

    /// PUT /expenses/{userId}/{id}
    pub async fn update(
        &self,
        user_id: &str,
        expense_id: &str,
        body: Option<&str>,
    ) -> Response<Body> {
        let (parsed, amount) = match parse_body(body) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "支出更新に失敗");
                return response::error(500, "Could not update expense");
            }
        };

        let update = ExpenseUpdate {
            name: parsed.name,
            amount,
            category: parsed.category,
            date: parsed.date,
        };

        match self
            .repo
            .update(user_id, expense_id, &update, &timestamp::now_iso())
            .await
        {
            Ok(expense) => response::respond_json(200, &expense),
            Err(e) => {
                error!(error = %e, "支出更新に失敗");
                response::error(500, "Could not update expense")
            }
        }
    }

    /// DELETE /expenses/{userId}/{id}
    ///
    /// DynamoDBのdelete_itemは存在しないキーでも成功を報告するため、
    /// 事前の存在チェックなしで204を返す。
    pub async fn delete(&self, user_id: &str, expense_id: &str) -> Response<Body> {
        match self.repo.delete(user_id, expense_id).await {
            Ok(()) => response::respond_empty(204),
            Err(e) => {
                error!(error = %e, "支出削除に失敗");
                response::error(500, "Could not delete expense")
            }
        }
    }
}

/// 収入ハンドラー
///
/// 支出ハンドラーと同形だが、GETはidの有無で1件取得と一覧を
/// 切り替える。内部エラーはすべて汎用の500に変換する。
use lambda_http::{Body, Response};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::application::response;
use crate::domain::income::{Income, IncomeUpdate};
use crate::domain::{money, timestamp};
use crate::infrastructure::IncomeRepository;

/// 収入リクエストボディ（作成・更新共通）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeBody {
    name: Option<String>,
    #[serde(default, with = "money::option")]
    amount: Option<Decimal>,
    category: Option<String>,
    date: Option<String>,
    payment_method: Option<String>,
    notes: Option<String>,
    receipt_url: Option<String>,
}

fn parse_body(body: Option<&str>) -> Result<(IncomeBody, Decimal), String> {
    let raw = body.ok_or_else(|| "Request body is missing".to_string())?;
    let parsed: IncomeBody =
        serde_json::from_str(raw).map_err(|e| format!("Invalid body: {e}"))?;
    let amount = parsed
        .amount
        .ok_or_else(|| "Missing amount".to_string())?;
    Ok((parsed, amount))
}

/// 収入リソースのハンドラー
pub struct IncomeHandler<R: IncomeRepository> {
    repo: R,
}

impl<R: IncomeRepository> IncomeHandler<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// POST /income/{userId}
    pub async fn create(&self, user_id: &str, body: Option<&str>) -> Response<Body> {
        let (parsed, amount) = match parse_body(body) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "収入作成に失敗");
                return response::error(500, "Could not create income");
            }
        };

        let now = timestamp::now_iso();
        let income = Income {
            user_id: user_id.to_string(),
            id: Uuid::new_v4().to_string(),
            name: parsed.name,
            amount,
            category: parsed.category,
            date: parsed.date,
            payment_method: parsed.payment_method,
            notes: parsed.notes,
            receipt_url: parsed.receipt_url,
            created_at: now.clone(),
            updated_at: now,
        };

        match self.repo.put(&income).await {
            Ok(()) => response::respond_json(201, &income),
            Err(e) => {
                error!(error = %e, "収入作成に失敗");
                response::error(500, "Could not create income")
            }
        }
    }

    /// GET /income/{userId}[/{id}]
    ///
    /// idありは1件取得（404あり）、idなしはユーザー別一覧。
    pub async fn get(&self, user_id: &str, income_id: Option<&str>) -> Response<Body> {
        match income_id {
            Some(id) => match self.repo.get(user_id, id).await {
                Ok(Some(income)) => response::respond_json(200, &income),
                Ok(None) => response::error(404, "Income item not found"),
                Err(e) => {
                    error!(error = %e, "収入取得に失敗");
                    response::error(500, "Could not retrieve income")
                }
            },
            None => match self.repo.list_by_user(user_id).await {
                Ok(incomes) => response::respond_json(200, &incomes),
                Err(e) => {
                    error!(error = %e, "収入一覧取得に失敗");
                    response::error(500, "Could not retrieve income")
                }
            },
        }
    }

    /// PUT /income/{userId}/{id}
    pub async fn update(
        &self,
        user_id: &str,
        income_id: &str,
        body: Option<&str>,
    ) -> Response<Body> {
        let (parsed, amount) = match parse_body(body) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "収入更新に失敗");
                return response::error(500, "Could not update income");
            }
        };

        let update = IncomeUpdate {
            name: parsed.name,
            amount,
            category: parsed.category,
            date: parsed.date,
            payment_method: parsed.payment_method,
            notes: parsed.notes,
            receipt_url: parsed.receipt_url,
        };

        match self
            .repo
            .update(user_id, income_id, &update, &timestamp::now_iso())
            .await
        {
            Ok(income) => response::respond_json(200, &income),
            Err(e) => {
                error!(error = %e, "収入更新に失敗");
                response::error(500, "Could not update income")
            }
        }
    }

    /// DELETE /income/{userId}/{id}
    pub async fn delete(&self, user_id: &str, income_id: &str) -> Response<Body> {
        match self.repo.delete(user_id, income_id).await {
            Ok(()) => response::respond_empty(204),
            Err(e) => {
                error!(error = %e, "収入削除に失敗");
                response::error(500, "Could not delete income")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::response::tests::body_json;
    use crate::infrastructure::StoreError;
    use crate::infrastructure::income_repository::tests::MockIncomeRepository;

    fn handler() -> (IncomeHandler<MockIncomeRepository>, MockIncomeRepository) {
        let repo = MockIncomeRepository::new();
        (IncomeHandler::new(repo.clone()), repo)
    }

    // ==================== 作成テスト ====================

    /// 作成は201で全フィールドを返す
    #[tokio::test]
    async fn test_create_returns_201() {
        let (handler, _repo) = handler();

        let response = handler
            .create(
                "u1",
                Some(
                    r#"{"name":"Salary","amount":2500.00,"category":"work",
                        "date":"2024-02-01","paymentMethod":"transfer"}"#,
                ),
            )
            .await;

        assert_eq!(response.status(), 201);
        let json = body_json(&response);
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["paymentMethod"], "transfer");
        assert!(json["notes"].is_null());
        assert_eq!(json["amount"].to_string(), "2500.00");
    }

    /// amount欠落は500
    #[tokio::test]
    async fn test_create_missing_amount_returns_500() {
        let (handler, _repo) = handler();

        let response = handler.create("u1", Some(r#"{"name":"Salary"}"#)).await;
        assert_eq!(response.status(), 500);
        assert_eq!(body_json(&response)["error"], "Could not create income");
    }

    // ==================== 取得テスト ====================

    /// idありGETは1件取得、存在しなければ404
    #[tokio::test]
    async fn test_get_point_lookup() {
        let (handler, _repo) = handler();
        let created = body_json(
            &handler
                .create("u1", Some(r#"{"name":"Salary","amount":2500}"#))
                .await,
        );
        let id = created["id"].as_str().unwrap();

        let response = handler.get("u1", Some(id)).await;
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["name"], "Salary");

        let response = handler.get("u1", Some("missing")).await;
        assert_eq!(response.status(), 404);
        assert_eq!(body_json(&response)["error"], "Income item not found");
    }

    /// idなしGETはユーザー別一覧
    #[tokio::test]
    async fn test_get_without_id_lists_all() {
        let (handler, _repo) = handler();
        handler
            .create("u1", Some(r#"{"name":"Salary","amount":2500}"#))
            .await;
        handler
            .create("u1", Some(r#"{"name":"Bonus","amount":500}"#))
            .await;

        let response = handler.get("u1", None).await;
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response).as_array().unwrap().len(), 2);
    }

    /// 取得のストア障害は500
    #[tokio::test]
    async fn test_get_store_failure_returns_500() {
        let (handler, repo) = handler();
        repo.set_next_error(StoreError::ReadError("down".to_string()));

        let response = handler.get("u1", None).await;
        assert_eq!(response.status(), 500);
        assert_eq!(body_json(&response)["error"], "Could not retrieve income");
    }

    // ==================== 更新・削除テスト ====================

    /// 更新は欠落フィールドをnullにする全置換
    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let (handler, _repo) = handler();
        let created = body_json(
            &handler
                .create(
                    "u1",
                    Some(r#"{"name":"Salary","amount":2500,"notes":"March"}"#),
                )
                .await,
        );
        let id = created["id"].as_str().unwrap();

        let response = handler
            .update("u1", id, Some(r#"{"name":"Salary","amount":2600}"#))
            .await;

        assert_eq!(response.status(), 200);
        let json = body_json(&response);
        assert_eq!(json["amount"].to_string(), "2600");
        assert!(json["notes"].is_null(), "absent field must become null");
    }

    /// 削除は存在チェックなしで204
    #[tokio::test]
    async fn test_delete_returns_204() {
        let (handler, _repo) = handler();
        assert_eq!(handler.delete("u1", "missing").await.status(), 204);
    }
}

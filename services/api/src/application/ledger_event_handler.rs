/// 台帳イベントハンドラー
///
/// 金額が任意である点と、更新がReturnValuesの欠落を404に写す点が
/// 他世帯と異なる。それ以外は支出・収入と同じ全置換CRUD。
use lambda_http::{Body, Response};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::application::response;
use crate::domain::ledger_event::{LedgerEvent, LedgerEventUpdate};
use crate::domain::{money, timestamp};
use crate::infrastructure::LedgerEventRepository;

/// イベントリクエストボディ（作成・更新共通）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerEventBody {
    title: Option<String>,
    date: Option<String>,
    #[serde(rename = "type")]
    event_type: Option<String>,
    #[serde(default, with = "money::option")]
    amount: Option<Decimal>,
    notes: Option<String>,
    category: Option<String>,
}

fn parse_body(body: Option<&str>) -> Result<LedgerEventBody, String> {
    let raw = body.ok_or_else(|| "Request body is missing".to_string())?;
    serde_json::from_str(raw).map_err(|e| format!("Invalid body: {e}"))
}

/// イベントリソースのハンドラー
pub struct LedgerEventHandler<R: LedgerEventRepository> {
    repo: R,
}

impl<R: LedgerEventRepository> LedgerEventHandler<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// POST /events/{userId}[/{id}]
    ///
    /// パスにidが付いていても新規作成になる（idは常にサーバー採番）。
    pub async fn create(&self, user_id: &str, body: Option<&str>) -> Response<Body> {
        let parsed = match parse_body(body) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "イベント作成に失敗");
                return response::error(500, "Could not create event");
            }
        };

        let now = timestamp::now_iso();
        let event = LedgerEvent {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: parsed.title,
            date: parsed.date,
            event_type: parsed.event_type,
            amount: parsed.amount,
            notes: parsed.notes,
            category: parsed.category,
            created_at: now.clone(),
            updated_at: now,
        };

        match self.repo.put(&event).await {
            Ok(()) => response::respond_json(201, &event),
            Err(e) => {
                error!(error = %e, "イベント作成に失敗");
                response::error(500, "Could not create event")
            }
        }
    }

    /// GET /events/{userId}[/{id}]
    pub async fn get(&self, user_id: &str, event_id: Option<&str>) -> Response<Body> {
        match event_id {
            Some(id) => match self.repo.get(user_id, id).await {
                Ok(Some(event)) => response::respond_json(200, &event),
                Ok(None) => response::error(404, "Event item not found"),
                Err(e) => {
                    error!(error = %e, "イベント取得に失敗");
                    response::error(500, "Could not retrieve event")
                }
            },
            None => match self.repo.list_by_user(user_id).await {
                Ok(events) => response::respond_json(200, &events),
                Err(e) => {
                    error!(error = %e, "イベント一覧取得に失敗");
                    response::error(500, "Could not retrieve event")
                }
            },
        }
    }

    /// PUT /events/{userId}/{id}
    ///
    /// 更新後属性が返ってこなければ404。
    pub async fn update(
        &self,
        user_id: &str,
        event_id: &str,
        body: Option<&str>,
    ) -> Response<Body> {
        let parsed = match parse_body(body) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "イベント更新に失敗");
                return response::error(500, "Could not update event");
            }
        };

        let update = LedgerEventUpdate {
            title: parsed.title,
            date: parsed.date,
            event_type: parsed.event_type,
            amount: parsed.amount,
            notes: parsed.notes,
            category: parsed.category,
        };

        match self
            .repo
            .update(user_id, event_id, &update, &timestamp::now_iso())
            .await
        {
            Ok(Some(event)) => response::respond_json(200, &event),
            Ok(None) => response::error(404, "Event not found"),
            Err(e) => {
                error!(error = %e, "イベント更新に失敗");
                response::error(500, "Could not update event")
            }
        }
    }

    /// DELETE /events/{userId}/{id}
    pub async fn delete(&self, user_id: &str, event_id: &str) -> Response<Body> {
        match self.repo.delete(user_id, event_id).await {
            Ok(()) => response::respond_empty(204),
            Err(e) => {
                error!(error = %e, "イベント削除に失敗");
                response::error(500, "Could not delete event")
            }
        }
    }
}

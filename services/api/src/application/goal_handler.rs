/// 貯蓄目標ハンドラー
///
/// 他世帯と異なり、読み取り系は一切エラーを返さない。1件取得の
/// 未ヒットもストア障害も、警告ログを出して200と空配列に落とす。
use lambda_http::{Body, Response};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::response;
use crate::domain::goal::{Goal, GoalUpdate};
use crate::domain::{money, timestamp};
use crate::infrastructure::GoalRepository;

/// 目標リクエストボディ（作成・更新共通）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoalBody {
    name: Option<String>,
    #[serde(default, with = "money::option")]
    target_amount: Option<Decimal>,
    #[serde(default, with = "money::option")]
    current_amount: Option<Decimal>,
    category: Option<String>,
    target_date: Option<String>,
    description: Option<String>,
}

fn parse_body(body: Option<&str>) -> Result<GoalBody, String> {
    let raw = body.ok_or_else(|| "Request body is missing".to_string())?;
    serde_json::from_str(raw).map_err(|e| format!("Invalid body: {e}"))
}

/// 目標リソースのハンドラー
pub struct GoalHandler<R: GoalRepository> {
    repo: R,
}

impl<R: GoalRepository> GoalHandler<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// POST /goals/{userId}
    ///
    /// targetAmountは必須、currentAmountは省略時0。
    pub async fn create(&self, user_id: &str, body: Option<&str>) -> Response<Body> {
        let parsed = match parse_body(body) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "目標作成に失敗");
                return response::error(500, "Could not create goal");
            }
        };
        let target_amount = match parsed.target_amount {
            Some(amount) => amount,
            None => {
                error!("目標作成に失敗: targetAmountがありません");
                return response::error(500, "Could not create goal");
            }
        };

        let now = timestamp::now_iso();
        let goal = Goal {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: parsed.name,
            target_amount,
            current_amount: parsed.current_amount.unwrap_or(Decimal::ZERO),
            category: parsed.category,
            target_date: parsed.target_date,
            description: parsed.description,
            created_at: now.clone(),
            updated_at: now,
        };

        match self.repo.put(&goal).await {
            Ok(()) => response::respond_json(201, &goal),
            Err(e) => {
                error!(error = %e, "目標作成に失敗");
                response::error(500, "Could not create goal")
            }
        }
    }

    /// GET /goals/{userId}[/{id}]
    ///
    /// idありは1件取得だが、未ヒットとストア障害はどちらも200と
    /// 空配列になる。idなしはユーザー別一覧で、これも失敗時は空配列。
    pub async fn get(&self, user_id: &str, goal_id: Option<&str>) -> Response<Body> {
        match goal_id {
            Some(id) => match self.repo.get(user_id, id).await {
                Ok(Some(goal)) => response::respond_json(200, &goal),
                Ok(None) => response::respond_json(200, &Vec::<Goal>::new()),
                Err(e) => {
                    warn!(error = %e, "目標取得に失敗、空配列を返す");
                    response::respond_json(200, &Vec::<Goal>::new())
                }
            },
            None => match self.repo.list_by_user(user_id).await {
                Ok(goals) => response::respond_json(200, &goals),
                Err(e) => {
                    warn!(error = %e, "目標一覧取得に失敗、空配列を返す");
                    response::respond_json(200, &Vec::<Goal>::new())
                }
            },
        }
    }

    /// PUT /goals/{userId}/{id}
    ///
    /// targetAmountとcurrentAmountの両方が必須。
    pub async fn update(
        &self,
        user_id: &str,
        goal_id: &str,
        body: Option<&str>,
    ) -> Response<Body> {
        let parsed = match parse_body(body) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "目標更新に失敗");
                return response::error(500, "Could not update goal");
            }
        };
        let (target_amount, current_amount) =
            match (parsed.target_amount, parsed.current_amount) {
                (Some(ta), Some(ca)) => (ta, ca),
                _ => {
                    error!("目標更新に失敗: 金額フィールドがありません");
                    return response::error(500, "Could not update goal");
                }
            };

        let update = GoalUpdate {
            name: parsed.name,
            target_amount,
            current_amount,
            category: parsed.category,
            target_date: parsed.target_date,
            description: parsed.description,
        };

        match self
            .repo
            .update(user_id, goal_id, &update, &timestamp::now_iso())
            .await
        {
            Ok(goal) => response::respond_json(200, &goal),
            Err(e) => {
                error!(error = %e, "目標更新に失敗");
                response::error(500, "Could not update goal")
            }
        }
    }

    /// DELETE /goals/{userId}/{id}
    pub async fn delete(&self, user_id: &str, goal_id: &str) -> Response<Body> {
        match self.repo.delete(user_id, goal_id).await {
            Ok(()) => response::respond_empty(204),
            Err(e) => {
                error!(error = %e, "目標削除に失敗");
                response::error(500, "Could not delete goal")
            }
        }
    }
}

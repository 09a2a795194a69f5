/// ルーター
///
/// メソッドとパスの静的な分岐で5つのハンドラーへ振り分ける。
/// 分岐ごとのエラーメッセージや世帯ごとの微妙な挙動差
/// （goalsだけメソッド不一致が404になる、eventsのPOSTはidを
/// 無視する等）は既存クライアントとの互換のため揃えている。
/// ルーター自体は失敗せず、必ずレスポンスを返す。
use lambda_http::http::Method;
use lambda_http::{Body, Request, Response};

use crate::application::expense_handler::ExpenseHandler;
use crate::application::goal_handler::GoalHandler;
use crate::application::income_handler::IncomeHandler;
use crate::application::ledger_event_handler::LedgerEventHandler;
use crate::application::response;
use crate::application::user_handler::UserHandler;
use crate::infrastructure::{
    ExpenseRepository, GoalRepository, IncomeRepository, LedgerEventRepository, UserRepository,
};

/// リクエストボディを文字列として取り出す（空は欠落扱い）
fn body_str(request: &Request) -> Option<&str> {
    match request.body() {
        Body::Text(text) if !text.is_empty() => Some(text.as_str()),
        Body::Binary(bytes) if !bytes.is_empty() => std::str::from_utf8(bytes).ok(),
        _ => None,
    }
}

/// 全リソースのハンドラーを束ねるルーター
pub struct ApiRouter<UR, ER, IR, GR, LR>
where
    UR: UserRepository,
    ER: ExpenseRepository,
    IR: IncomeRepository,
    GR: GoalRepository,
    LR: LedgerEventRepository,
{
    users: UserHandler<UR>,
    expenses: ExpenseHandler<ER>,
    income: IncomeHandler<IR>,
    goals: GoalHandler<GR>,
    events: LedgerEventHandler<LR>,
}

impl<UR, ER, IR, GR, LR> ApiRouter<UR, ER, IR, GR, LR>
where
    UR: UserRepository,
    ER: ExpenseRepository,
    IR: IncomeRepository,
    GR: GoalRepository,
    LR: LedgerEventRepository,
{
    pub fn new(
        user_repo: UR,
        expense_repo: ER,
        income_repo: IR,
        goal_repo: GR,
        event_repo: LR,
    ) -> Self {
        Self {
            users: UserHandler::new(user_repo),
            expenses: ExpenseHandler::new(expense_repo),
            income: IncomeHandler::new(income_repo),
            goals: GoalHandler::new(goal_repo),
            events: LedgerEventHandler::new(event_repo),
        }
    }

    /// リクエストを該当ハンドラーへ振り分ける
    pub async fn route(&self, request: &Request) -> Response<Body> {
        let method = request.method();
        let path = request.uri().path();
        let body = body_str(request);

        tracing::info!(%method, path, "リクエスト受信");

        // CORSプリフライトは振り分け前に応答する
        if method == Method::OPTIONS {
            return response::message(200, "CORS preflight successful");
        }

        // ユーザー・認証ルート
        if path == "/users" && method == Method::POST {
            return self.users.signup(body).await;
        }
        if path == "/login" && method == Method::POST {
            return self.users.login(body).await;
        }
        if path == "/pass_change" && method == Method::POST {
            return self.users.change_password(body).await;
        }
        if let Some(rest) = path.strip_prefix("/users/") {
            // idは最後のセグメント
            let user_id = rest.rsplit('/').next().unwrap_or_default();
            match method.as_str() {
                "GET" => return self.users.get_user(user_id).await,
                "PUT" => return self.users.update_user(user_id, body).await,
                "DELETE" => return self.users.delete_user(user_id).await,
                _ => return response::message(404, "Route not found"),
            }
        }

        // 取引系ルート: /{family}/{userId}[/{id}]
        let segments: Vec<&str> = path.split('/').collect();
        let user_id = segments.get(2).copied().unwrap_or_default();
        let id_segment = segments.get(3).copied();
        // GET系はidセグメントが空文字列なら一覧扱い
        let id_nonempty = id_segment.filter(|s| !s.is_empty());

        if path.starts_with("/expenses/") {
            if user_id.is_empty() {
                return response::message(400, "User ID is required in the path");
            }
            return match method.as_str() {
                "POST" => self.expenses.create(user_id, body).await,
                // 末尾にidが付いていても常に一覧
                "GET" => self.expenses.list(user_id).await,
                "PUT" => match id_segment {
                    Some(id) => self.expenses.update(user_id, id, body).await,
                    None => {
                        response::message(400, "Expense ID is required for this operation")
                    }
                },
                "DELETE" => match id_segment {
                    Some(id) => self.expenses.delete(user_id, id).await,
                    None => {
                        response::message(400, "Expense ID is required for this operation")
                    }
                },
                _ => response::message(400, "Invalid HTTP method for this resource"),
            };
        }

        if path.starts_with("/income/") {
            if user_id.is_empty() {
                return response::message(400, "User ID is required in the path");
            }
            return match method.as_str() {
                "POST" => self.income.create(user_id, body).await,
                "GET" => self.income.get(user_id, id_nonempty).await,
                "PUT" => match id_segment {
                    Some(id) => self.income.update(user_id, id, body).await,
                    None => {
                        response::message(400, "Income ID is required for this operation")
                    }
                },
                "DELETE" => match id_segment {
                    Some(id) => self.income.delete(user_id, id).await,
                    None => {
                        response::message(400, "Income ID is required for this operation")
                    }
                },
                _ => response::message(400, "Invalid HTTP method for this resource"),
            };
        }

        if path.starts_with("/goals/") {
            if user_id.is_empty() {
                return response::message(400, "User ID is required in the path");
            }
            return match method.as_str() {
                "POST" => self.goals.create(user_id, body).await,
                "GET" => self.goals.get(user_id, id_nonempty).await,
                "PUT" => match id_segment {
                    Some(id) => self.goals.update(user_id, id, body).await,
                    None => response::message(400, "Goal ID is required for this operation"),
                },
                "DELETE" => match id_segment {
                    Some(id) => self.goals.delete(user_id, id).await,
                    None => response::message(400, "Goal ID is required for this operation"),
                },
                // この世帯だけメソッド不一致が404になる
                _ => response::message(404, "Route not found"),
            };
        }

        if path.starts_with("/events/") {
            if user_id.is_empty() {
                return response::message(400, "User ID is required in the path");
            }
            return match method.as_str() {
                // idセグメント付きPOSTも新規作成（idは無視してサーバー採番）
                "POST" => self.events.create(user_id, body).await,
                "GET" => self.events.get(user_id, id_nonempty).await,
                "PUT" => match id_nonempty {
                    Some(id) => self.events.update(user_id, id, body).await,
                    None => response::message(400, "Invalid HTTP method for this resource"),
                },
                "DELETE" => match id_nonempty {
                    Some(id) => self.events.delete(user_id, id).await,
                    None => response::message(400, "Invalid HTTP method for this resource"),
                },
                _ => response::message(400, "Invalid HTTP method for this resource"),
            };
        }

        response::message(404, "Route not found")
    }
}

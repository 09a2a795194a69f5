/// ユーザーハンドラー
///
/// 他の世帯と異なり、入力不備は400、未発見は404、認証失敗は401と
/// いう通常のステータス分けを行う。ボディのメッセージキーは
/// `message`で統一されている。
///
/// パスワードは平文保存せず、argon2idハッシュで保存・照合する。
use lambda_http::{Body, Response};
use serde::Deserialize;
use tracing::error;

use crate::application::response;
use crate::domain::timestamp;
use crate::domain::user::{self, User, UserUpdate};
use crate::infrastructure::UserRepository;
use crate::infrastructure::credentials;

/// サインアップ・更新・ログイン共通のボディ形
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserBody {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
    user_id: Option<String>,
    old_password: Option<String>,
    new_password: Option<String>,
}

/// ボディ解析の結果: 欠落・壊れたJSONはそれぞれ専用の400になる
fn parse_body(body: Option<&str>) -> Result<UserBody, Response<Body>> {
    let raw = match body {
        Some(raw) => raw,
        None => return Err(response::message(400, "Request body is missing")),
    };
    serde_json::from_str(raw)
        .map_err(|_| response::message(400, "Invalid JSON in request body"))
}

/// 空文字列はフィールド欠落と同じ扱い
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// ユーザーリソースと認証のハンドラー
pub struct UserHandler<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserHandler<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// POST /users
    ///
    /// email・password・nameが必須。emailの重複は検査しない。
    pub async fn signup(&self, body: Option<&str>) -> Response<Body> {
        let parsed = match parse_body(body) {
            Ok(ok) => ok,
            Err(resp) => return resp,
        };
        let (email, password, name) = match (
            present(&parsed.email),
            present(&parsed.password),
            present(&parsed.name),
        ) {
            (Some(e), Some(p), Some(n)) => (e, p, n),
            _ => return response::message(400, "Missing required fields"),
        };

        let password_hash = match credentials::hash_password(password) {
            Ok(hash) => hash,
            Err(e) => {
                error!(error = %e, "サインアップに失敗");
                return response::message(500, "Could not create user");
            }
        };

        let now = timestamp::now_iso();
        let new_user = User {
            id: user::new_user_id(),
            email: email.to_string(),
            password_hash,
            name: name.to_string(),
            created_at: now.clone(),
            last_login: now,
        };

        match self.repo.put(&new_user).await {
            Ok(()) => response::respond_json(201, &new_user),
            Err(e) => {
                error!(error = %e, "サインアップに失敗");
                response::message(500, "Could not create user")
            }
        }
    }

    /// GET /users/{id}
    pub async fn get_user(&self, user_id: &str) -> Response<Body> {
        match self.repo.get(user_id).await {
            Ok(Some(found)) => response::respond_json(200, &found),
            Ok(None) => response::message(404, "User not found"),
            Err(e) => {
                error!(error = %e, user_id, "ユーザー取得に失敗");
                response::message(500, "Could not retrieve user")
            }
        }
    }

    /// PUT /users/{id}
    ///
    /// 現在値を読み、name/emailのうち変わったものだけ更新する。
    /// 変更が一つもなければ400。
    pub async fn update_user(&self, user_id: &str, body: Option<&str>) -> Response<Body> {
        let parsed = match parse_body(body) {
            Ok(ok) => ok,
            Err(resp) => return resp,
        };

        let current = match self.repo.get(user_id).await {
            Ok(Some(found)) => found,
            Ok(None) => return response::message(404, "User not found"),
            Err(e) => {
                error!(error = %e, user_id, "ユーザー更新に失敗");
                return response::message(500, "Could not update user");
            }
        };

        let update = UserUpdate {
            name: present(&parsed.name)
                .filter(|n| *n != current.name)
                .map(str::to_string),
            email: present(&parsed.email)
                .filter(|e| *e != current.email)
                .map(str::to_string),
        };
        if update.is_empty() {
            return response::message(400, "No fields provided for update");
        }

        match self.repo.update_fields(user_id, &update).await {
            Ok(updated) => response::respond_json(200, &updated),
            Err(e) => {
                error!(error = %e, user_id, "ユーザー更新に失敗");
                response::message(500, "Could not update user")
            }
        }
    }

    /// DELETE /users/{id}
    ///
    /// 削除だけは存在チェックを先に行う。
    pub async fn delete_user(&self, user_id: &str) -> Response<Body> {
        match self.repo.get(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return response::message(404, "User not found"),
            Err(e) => {
                error!(error = %e, user_id, "ユーザー削除に失敗");
                return response::message(500, "Could not delete user");
            }
        }

        match self.repo.delete(user_id).await {
            Ok(()) => response::respond_empty(204),
            Err(e) => {
                error!(error = %e, user_id, "ユーザー削除に失敗");
                response::message(500, "Could not delete user")
            }
        }
    }

    /// POST /login
    ///
    /// emailでスキャンした候補それぞれにハッシュ照合をかけ、最初に
    /// 一致したユーザーを返す。成功時はlastLoginを更新してから返す。
    pub async fn login(&self, body: Option<&str>) -> Response<Body> {
        let parsed = match parse_body(body) {
            Ok(ok) => ok,
            Err(resp) => return resp,
        };
        let (email, password) = match (present(&parsed.email), present(&parsed.password)) {
            (Some(e), Some(p)) => (e, p),
            _ => return response::message(400, "Missing email or password"),
        };

        let candidates = match self.repo.find_by_email(email).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(error = %e, "ログインに失敗");
                return response::message(500, "Could not log in");
            }
        };

        let mut matched = match candidates
            .into_iter()
            .find(|u| credentials::verify_password(password, &u.password_hash))
        {
            Some(found) => found,
            None => return response::message(401, "Invalid credentials"),
        };

        let now = timestamp::now_iso();
        if let Err(e) = self.repo.update_last_login(&matched.id, &now).await {
            error!(error = %e, user_id = %matched.id, "ログインに失敗");
            return response::message(500, "Could not log in");
        }
        matched.last_login = now;

        response::respond_json(200, &matched)
    }

    /// POST /pass_change
    pub async fn change_password(&self, body: Option<&str>) -> Response<Body> {
        let parsed = match parse_body(body) {
            Ok(ok) => ok,
            Err(resp) => return resp,
        };
        let (user_id, old_password, new_password) = match (
            present(&parsed.user_id),
            present(&parsed.old_password),
            present(&parsed.new_password),
        ) {
            (Some(id), Some(old), Some(new)) => (id, old, new),
            _ => {
                return response::message(400, "Missing required fields for password change");
            }
        };

        let current = match self.repo.get(user_id).await {
            Ok(Some(found)) => found,
            Ok(None) => return response::message(404, "User not found"),
            Err(e) => {
                error!(error = %e, user_id, "パスワード変更に失敗");
                return response::message(500, "Could not change password");
            }
        };

        if !credentials::verify_password(old_password, &current.password_hash) {
            return response::message(401, "Invalid old password");
        }

        let new_hash = match credentials::hash_password(new_password) {
            Ok(hash) => hash,
            Err(e) => {
                error!(error = %e, user_id, "パスワード変更に失敗");
                return response::message(500, "Could not change password");
            }
        };

        match self.repo.update_password_hash(user_id, &new_hash).await {
            Ok(()) => response::message(200, "Password updated successfully"),
            Err(e) => {
                error!(error = %e, user_id, "パスワード変更に失敗");
                response::message(500, "Could not change password")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::response::tests::body_json;
    use crate::infrastructure::StoreError;
    use crate::infrastructure::user_repository::tests::MockUserRepository;

    fn handler() -> (UserHandler<MockUserRepository>, MockUserRepository) {
        let repo = MockUserRepository::new();
        (UserHandler::new(repo.clone()), repo)
    }

    async fn signup_alice(handler: &UserHandler<MockUserRepository>) -> serde_json::Value {
        let response = handler
            .signup(Some(
                r#"{"email":"alice@example.com","password":"secret123","name":"Alice"}"#,
            ))
            .await;
        assert_eq!(response.status(), 201);
        body_json(&response)
    }

    // ==================== サインアップテスト ====================

    /// サインアップは201、passwordHashはレスポンスに現れない
    #[tokio::test]
    async fn test_signup_creates_user_without_hash_in_response() {
        let (handler, repo) = handler();

        let json = signup_alice(&handler).await;
        assert!(json["id"].as_str().unwrap().starts_with("user_"));
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["createdAt"], json["lastLogin"]);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password").is_none());

        // ストアには平文ではなくargon2idハッシュが入る
        let stored = repo.get_sync(json["id"].as_str().unwrap()).unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    /// ボディ欠落・壊れたJSON・必須フィールド欠落はそれぞれ400
    #[tokio::test]
    async fn test_signup_input_errors() {
        let (handler, _repo) = handler();

        let response = handler.signup(None).await;
        assert_eq!(response.status(), 400);
        assert_eq!(body_json(&response)["message"], "Request body is missing");

        let response = handler.signup(Some("{not json")).await;
        assert_eq!(response.status(), 400);
        assert_eq!(
            body_json(&response)["message"],
            "Invalid JSON in request body"
        );

        let response = handler
            .signup(Some(r#"{"email":"a@b.com","password":""}"#))
            .await;
        assert_eq!(response.status(), 400);
        assert_eq!(body_json(&response)["message"], "Missing required fields");
    }

    /// email重複は拒否されない
    #[tokio::test]
    async fn test_signup_allows_duplicate_email() {
        let (handler, repo) = handler();
        let a = signup_alice(&handler).await;
        let b = signup_alice(&handler).await;
        assert_ne!(a["id"], b["id"]);
        assert_eq!(repo.user_count(), 2);
    }

    // ==================== 取得・更新・削除テスト ====================

    /// 取得は200/404
    #[tokio::test]
    async fn test_get_user() {
        let (handler, _repo) = handler();
        let created = signup_alice(&handler).await;
        let id = created["id"].as_str().unwrap();

        let response = handler.get_user(id).await;
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["name"], "Alice");

        let response = handler.get_user("user_missing").await;
        assert_eq!(response.status(), 404);
        assert_eq!(body_json(&response)["message"], "User not found");
    }

    /// 更新は変更されたフィールドだけ反映し、未変更なら400
    #[tokio::test]
    async fn test_update_user() {
        let (handler, _repo) = handler();
        let created = signup_alice(&handler).await;
        let id = created["id"].as_str().unwrap();

        // 同値更新は「変更なし」
        let response = handler
            .update_user(id, Some(r#"{"name":"Alice","email":"alice@example.com"}"#))
            .await;
        assert_eq!(response.status(), 400);
        assert_eq!(
            body_json(&response)["message"],
            "No fields provided for update"
        );

        let response = handler.update_user(id, Some(r#"{"name":"Alicia"}"#)).await;
        assert_eq!(response.status(), 200);
        let json = body_json(&response);
        assert_eq!(json["name"], "Alicia");
        assert_eq!(json["email"], "alice@example.com");

        let response = handler
            .update_user("user_missing", Some(r#"{"name":"X"}"#))
            .await;
        assert_eq!(response.status(), 404);
    }

    /// 削除は存在チェック付きで204/404
    #[tokio::test]
    async fn test_delete_user() {
        let (handler, repo) = handler();
        let created = signup_alice(&handler).await;
        let id = created["id"].as_str().unwrap();

        assert_eq!(handler.delete_user(id).await.status(), 204);
        assert_eq!(repo.user_count(), 0);

        let response = handler.delete_user(id).await;
        assert_eq!(response.status(), 404);
        assert_eq!(body_json(&response)["message"], "User not found");
    }

    // ==================== 認証テスト ====================

    /// ログイン成功はlastLoginを進めてユーザーを返す
    #[tokio::test]
    async fn test_login_success_updates_last_login() {
        let (handler, _repo) = handler();
        let created = signup_alice(&handler).await;

        let response = handler
            .login(Some(
                r#"{"email":"alice@example.com","password":"secret123"}"#,
            ))
            .await;

        assert_eq!(response.status(), 200);
        let json = body_json(&response);
        assert_eq!(json["id"], created["id"]);
        assert!(json.get("passwordHash").is_none());
        assert!(
            json["lastLogin"].as_str().unwrap() > created["lastLogin"].as_str().unwrap(),
            "lastLogin must advance on login"
        );
    }

    /// 誤パスワード・未知emailは401
    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (handler, _repo) = handler();
        signup_alice(&handler).await;

        let response = handler
            .login(Some(r#"{"email":"alice@example.com","password":"wrong"}"#))
            .await;
        assert_eq!(response.status(), 401);
        assert_eq!(body_json(&response)["message"], "Invalid credentials");

        let response = handler
            .login(Some(r#"{"email":"nobody@example.com","password":"secret123"}"#))
            .await;
        assert_eq!(response.status(), 401);
    }

    /// email・password欠落は400
    #[tokio::test]
    async fn test_login_missing_fields() {
        let (handler, _repo) = handler();

        let response = handler
            .login(Some(r#"{"email":"alice@example.com"}"#))
            .await;
        assert_eq!(response.status(), 400);
        assert_eq!(body_json(&response)["message"], "Missing email or password");
    }

    /// スキャン失敗は500
    #[tokio::test]
    async fn test_login_store_failure() {
        let (handler, repo) = handler();
        repo.set_next_error(StoreError::ReadError("down".to_string()));

        let response = handler
            .login(Some(r#"{"email":"a@b.com","password":"x"}"#))
            .await;
        assert_eq!(response.status(), 500);
        assert_eq!(body_json(&response)["message"], "Could not log in");
    }

    /// パスワード変更の正常系と異常系
    #[tokio::test]
    async fn test_change_password() {
        let (handler, _repo) = handler();
        let created = signup_alice(&handler).await;
        let id = created["id"].as_str().unwrap();

        let response = handler
            .change_password(Some(&format!(
                r#"{{"userId":"{id}","oldPassword":"wrong","newPassword":"next456"}}"#
            )))
            .await;
        assert_eq!(response.status(), 401);
        assert_eq!(body_json(&response)["message"], "Invalid old password");

        let response = handler
            .change_password(Some(&format!(
                r#"{{"userId":"{id}","oldPassword":"secret123","newPassword":"next456"}}"#
            )))
            .await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            body_json(&response)["message"],
            "Password updated successfully"
        );

        // 旧パスワードは使えなくなり、新パスワードでログインできる
        let response = handler
            .login(Some(
                r#"{"email":"alice@example.com","password":"secret123"}"#,
            ))
            .await;
        assert_eq!(response.status(), 401);
        let response = handler
            .login(Some(
                r#"{"email":"alice@example.com","password":"next456"}"#,
            ))
            .await;
        assert_eq!(response.status(), 200);
    }

    /// パスワード変更の入力不備と未知ユーザー
    #[tokio::test]
    async fn test_change_password_input_errors() {
        let (handler, _repo) = handler();

        let response = handler
            .change_password(Some(r#"{"userId":"u1","oldPassword":"x"}"#))
            .await;
        assert_eq!(response.status(), 400);
        assert_eq!(
            body_json(&response)["message"],
            "Missing required fields for password change"
        );

        let response = handler
            .change_password(Some(
                r#"{"userId":"user_missing","oldPassword":"x","newPassword":"y"}"#,
            ))
            .await;
        assert_eq!(response.status(), 404);
        assert_eq!(body_json(&response)["message"], "User not found");
    }
}

//! ユーザーレコード
//!
//! Usersテーブルのレコード。他のリソースと異なり`id`単独キーで、
//! `userId`複合キーを持たない。emailの一意性はストレージ層では強制しない。

use serde::Serialize;
use uuid::Uuid;

/// ユーザーレコード
///
/// パスワードはargon2idハッシュ（PHC文字列）のみ保存し、
/// HTTPレスポンスには一切含めない。
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// argon2idハッシュ。レスポンスにはシリアライズしない
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub created_at: String,
    pub last_login: String,
}

/// ユーザー更新で変更されたフィールドの集合
///
/// 現在値と異なるフィールドだけがSomeになる。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    /// 更新対象フィールドが一つもないか
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// 新しいユーザーIDを生成する（`user_` + UUID v4先頭9桁hex）
pub fn new_user_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("user_{}", &hex[..9])
}

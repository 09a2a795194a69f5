/// ユーザーリポジトリ
///
/// Usersテーブル（パーティションキー: id）へのアクセスを抽象化する。
/// ログインはemailに対するインデックスがないため、フィルタ付きの
/// テーブルスキャンで候補を取得する。
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::domain::user::{User, UserUpdate};
use crate::infrastructure::config::DynamoDbConfig;
use crate::infrastructure::store::{self, StoreError};

/// ユーザーストア操作のトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを無条件に保存する（重複チェックなし）
    async fn put(&self, user: &User) -> Result<(), StoreError>;

    /// idでユーザーを取得する
    async fn get(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// emailが完全一致するユーザー候補を全件取得する
    ///
    /// email一意性は強制されていないため複数件返りうる。
    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, StoreError>;

    /// 変更されたフィールドのみを上書きし、更新後の全レコードを返す
    async fn update_fields(&self, user_id: &str, update: &UserUpdate) -> Result<User, StoreError>;

    /// lastLoginのみを更新する
    async fn update_last_login(&self, user_id: &str, last_login: &str) -> Result<(), StoreError>;

    /// パスワードハッシュのみを更新する
    async fn update_password_hash(&self, user_id: &str, hash: &str) -> Result<(), StoreError>;

    /// ユーザーを削除する（存在しなくても成功扱い）
    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;
}

/// DynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoUserRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoUserRepository {
    pub fn new(config: &DynamoDbConfig) -> Self {
        Self {
            client: config.client().clone(),
            table_name: config.users_table().to_string(),
        }
    }

    fn to_item(user: &User) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(user.id.clone()));
        item.insert("email".to_string(), AttributeValue::S(user.email.clone()));
        item.insert(
            "passwordHash".to_string(),
            AttributeValue::S(user.password_hash.clone()),
        );
        item.insert("name".to_string(), AttributeValue::S(user.name.clone()));
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(user.created_at.clone()),
        );
        item.insert(
            "lastLogin".to_string(),
            AttributeValue::S(user.last_login.clone()),
        );
        item
    }

    fn from_item(item: &HashMap<String, AttributeValue>) -> Result<User, StoreError> {
        Ok(User {
            id: store::get_s(item, "id")?,
            email: store::get_s(item, "email")?,
            password_hash: store::get_s(item, "passwordHash")?,
            name: store::get_s(item, "name")?,
            created_at: store::get_s(item, "createdAt")?,
            last_login: store::get_s(item, "lastLogin")?,
        })
    }
}

#[async_trait]
impl UserRepository for DynamoUserRepository {
    async fn put(&self, user: &User) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(user)))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::ReadError(e.into_service_error().to_string()))?;

        match result.item {
            Some(item) => Ok(Some(Self::from_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, StoreError> {
        let mut users = Vec::new();
        let mut last_evaluated_key = None;

        // ページネーション: LastEvaluatedKeyがある限りスキャンを続ける
        loop {
            let mut scan_builder = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("email = :email_val")
                .expression_attribute_values(":email_val", AttributeValue::S(email.to_string()));

            if let Some(key) = last_evaluated_key.take() {
                scan_builder = scan_builder.set_exclusive_start_key(Some(key));
            }

            let result = scan_builder
                .send()
                .await
                .map_err(|e| StoreError::ReadError(e.into_service_error().to_string()))?;

            if let Some(items) = result.items {
                for item in items {
                    match Self::from_item(&item) {
                        Ok(user) => users.push(user),
                        Err(e) => {
                            tracing::warn!(error = %e, "不正なユーザーアイテムをスキップ");
                        }
                    }
                }
            }

            match result.last_evaluated_key {
                Some(key) => last_evaluated_key = Some(key),
                None => break,
            }
        }

        Ok(users)
    }

    async fn update_fields(&self, user_id: &str, update: &UserUpdate) -> Result<User, StoreError> {
        // 変更フィールドだけの動的SET式を組み立てる
        let mut expression_parts = Vec::new();
        let mut values = HashMap::new();
        let mut names = HashMap::new();

        if let Some(name) = &update.name {
            expression_parts.push("#n = :n");
            names.insert("#n".to_string(), "name".to_string());
            values.insert(":n".to_string(), AttributeValue::S(name.clone()));
        }
        if let Some(email) = &update.email {
            expression_parts.push("email = :e");
            values.insert(":e".to_string(), AttributeValue::S(email.clone()));
        }

        if expression_parts.is_empty() {
            return Err(StoreError::WriteError(
                "No fields provided for update".to_string(),
            ));
        }

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(user_id.to_string()))
            .update_expression(format!("SET {}", expression_parts.join(", ")))
            .set_expression_attribute_values(Some(values))
            .set_expression_attribute_names(if names.is_empty() { None } else { Some(names) })
            .return_values(aws_sdk_dynamodb::types::ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        let attributes = result.attributes.ok_or_else(|| {
            StoreError::WriteError("Update returned no attributes".to_string())
        })?;

        Self::from_item(&attributes)
    }

    async fn update_last_login(&self, user_id: &str, last_login: &str) -> Result<(), StoreError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(user_id.to_string()))
            .update_expression("SET lastLogin = :last_login")
            .expression_attribute_values(
                ":last_login",
                AttributeValue::S(last_login.to_string()),
            )
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn update_password_hash(&self, user_id: &str, hash: &str) -> Result<(), StoreError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(user_id.to_string()))
            .update_expression("SET passwordHash = :new_hash")
            .expression_attribute_values(":new_hash", AttributeValue::S(hash.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }
}

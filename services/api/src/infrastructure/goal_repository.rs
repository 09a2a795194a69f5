/// 貯蓄目標リポジトリ
///
/// Goalsテーブル（パーティションキー: id、ソートキー: userId）への
/// アクセスを抽象化する。ユーザー別一覧はGSI `UserIdIndex`を試し、
/// クエリが失敗した場合はフィルタ付きテーブルスキャンにフォールバック
/// する（GSI未作成のテーブルでも動作させるための互換挙動）。
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};

use crate::domain::goal::{Goal, GoalUpdate};
use crate::infrastructure::config::{DynamoDbConfig, USER_ID_INDEX};
use crate::infrastructure::store::{self, StoreError};

/// 目標ストア操作のトレイト
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// 目標を無条件に保存する
    async fn put(&self, goal: &Goal) -> Result<(), StoreError>;

    /// 複合キーで1件取得する
    async fn get(&self, user_id: &str, goal_id: &str) -> Result<Option<Goal>, StoreError>;

    /// ユーザーの全目標を取得する
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Goal>, StoreError>;

    /// 全フィールドを上書きし、更新後のレコードを返す
    async fn update(
        &self,
        user_id: &str,
        goal_id: &str,
        update: &GoalUpdate,
        updated_at: &str,
    ) -> Result<Goal, StoreError>;

    /// 目標を削除する（存在しなくても成功扱い）
    async fn delete(&self, user_id: &str, goal_id: &str) -> Result<(), StoreError>;
}

/// DynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoGoalRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoGoalRepository {
    pub fn new(config: &DynamoDbConfig) -> Self {
        Self {
            client: config.client().clone(),
            table_name: config.goals_table().to_string(),
        }
    }

    fn to_item(goal: &Goal) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(goal.id.clone()));
        item.insert("userId".to_string(), AttributeValue::S(goal.user_id.clone()));
        item.insert("name".to_string(), store::attr_opt_s(goal.name.as_deref()));
        item.insert(
            "targetAmount".to_string(),
            store::attr_decimal(&goal.target_amount),
        );
        item.insert(
            "currentAmount".to_string(),
            store::attr_decimal(&goal.current_amount),
        );
        item.insert(
            "category".to_string(),
            store::attr_opt_s(goal.category.as_deref()),
        );
        item.insert(
            "targetDate".to_string(),
            store::attr_opt_s(goal.target_date.as_deref()),
        );
        item.insert(
            "description".to_string(),
            store::attr_opt_s(goal.description.as_deref()),
        );
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(goal.created_at.clone()),
        );
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(goal.updated_at.clone()),
        );
        item
    }

    fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Goal, StoreError> {
        Ok(Goal {
            id: store::get_s(item, "id")?,
            user_id: store::get_s(item, "userId")?,
            name: store::get_opt_s(item, "name"),
            target_amount: store::get_decimal(item, "targetAmount")?,
            current_amount: store::get_decimal(item, "currentAmount")?,
            category: store::get_opt_s(item, "category"),
            target_date: store::get_opt_s(item, "targetDate"),
            description: store::get_opt_s(item, "description"),
            created_at: store::get_s(item, "createdAt")?,
            updated_at: store::get_s(item, "updatedAt")?,
        })
    }

    /// GSIクエリ失敗時のフォールバック: フィルタ付きテーブルスキャン
    async fn list_by_scan(&self, user_id: &str) -> Result<Vec<Goal>, StoreError> {
        let mut goals = Vec::new();
        let mut last_evaluated_key = None;

        // ページネーション: LastEvaluatedKeyがある限りスキャンを続ける
        loop {
            let mut scan_builder = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("userId = :uid")
                .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()));

            if let Some(key) = last_evaluated_key.take() {
                scan_builder = scan_builder.set_exclusive_start_key(Some(key));
            }

            let result = scan_builder
                .send()
                .await
                .map_err(|e| StoreError::ReadError(e.into_service_error().to_string()))?;

            if let Some(items) = result.items {
                for item in items {
                    goals.push(Self::from_item(&item)?);
                }
            }

            match result.last_evaluated_key {
                Some(key) => last_evaluated_key = Some(key),
                None => break,
            }
        }

        Ok(goals)
    }
}

#[async_trait]
impl GoalRepository for DynamoGoalRepository {
    async fn put(&self, goal: &Goal) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(goal)))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn get(&self, user_id: &str, goal_id: &str) -> Result<Option<Goal>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(goal_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::ReadError(e.into_service_error().to_string()))?;

        match result.item {
            Some(item) => Ok(Some(Self::from_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Goal>, StoreError> {
        let query_result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(USER_ID_INDEX)
            .key_condition_expression("userId = :uid")
            .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
            .send()
            .await;

        match query_result {
            Ok(result) => {
                let mut goals = Vec::new();
                if let Some(items) = result.items {
                    for item in items {
                        goals.push(Self::from_item(&item)?);
                    }
                }
                Ok(goals)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e.into_service_error(),
                    "GSIクエリ失敗、スキャンにフォールバック"
                );
                self.list_by_scan(user_id).await
            }
        }
    }

    async fn update(
        &self,
        user_id: &str,
        goal_id: &str,
        update: &GoalUpdate,
        updated_at: &str,
    ) -> Result<Goal, StoreError> {
        // nameは予約語、descriptionは#dプレースホルダで渡す
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(goal_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .update_expression(
                "SET #n = :n, targetAmount = :ta, currentAmount = :ca, \
                 category = :c, targetDate = :td, #d = :d, updatedAt = :ua",
            )
            .expression_attribute_names("#n", "name")
            .expression_attribute_names("#d", "description")
            .expression_attribute_values(":n", store::attr_opt_s(update.name.as_deref()))
            .expression_attribute_values(":ta", store::attr_decimal(&update.target_amount))
            .expression_attribute_values(":ca", store::attr_decimal(&update.current_amount))
            .expression_attribute_values(":c", store::attr_opt_s(update.category.as_deref()))
            .expression_attribute_values(":td", store::attr_opt_s(update.target_date.as_deref()))
            .expression_attribute_values(":d", store::attr_opt_s(update.description.as_deref()))
            .expression_attribute_values(":ua", AttributeValue::S(updated_at.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        let attributes = result.attributes.ok_or_else(|| {
            StoreError::WriteError("Update returned no attributes".to_string())
        })?;

        Self::from_item(&attributes)
    }

    async fn delete(&self, user_id: &str, goal_id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(goal_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }
}

/// 台帳イベントリポジトリ
///
/// Eventsテーブル（パーティションキー: id、ソートキー: userId）への
/// アクセスを抽象化する。ユーザー別一覧はGSI `UserIdIndex`で取得する。
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};

use crate::domain::ledger_event::{LedgerEvent, LedgerEventUpdate};
use crate::infrastructure::config::{DynamoDbConfig, USER_ID_INDEX};
use crate::infrastructure::store::{self, StoreError};

/// 台帳イベントストア操作のトレイト
#[async_trait]
pub trait LedgerEventRepository: Send + Sync {
    /// イベントを無条件に保存する
    async fn put(&self, event: &LedgerEvent) -> Result<(), StoreError>;

    /// 複合キーで1件取得する
    async fn get(&self, user_id: &str, event_id: &str) -> Result<Option<LedgerEvent>, StoreError>;

    /// ユーザーの全イベントを取得する
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<LedgerEvent>, StoreError>;

    /// 全フィールドを上書きする
    ///
    /// ストアが更新後属性を返さなかった場合はNone（呼び出し側で404になる）。
    async fn update(
        &self,
        user_id: &str,
        event_id: &str,
        update: &LedgerEventUpdate,
        updated_at: &str,
    ) -> Result<Option<LedgerEvent>, StoreError>;

    /// イベントを削除する（存在しなくても成功扱い）
    async fn delete(&self, user_id: &str, event_id: &str) -> Result<(), StoreError>;
}

/// DynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoLedgerEventRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoLedgerEventRepository {
    pub fn new(config: &DynamoDbConfig) -> Self {
        Self {
            client: config.client().clone(),
            table_name: config.events_table().to_string(),
        }
    }

    fn to_item(event: &LedgerEvent) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(event.id.clone()));
        item.insert("userId".to_string(), AttributeValue::S(event.user_id.clone()));
        item.insert("title".to_string(), store::attr_opt_s(event.title.as_deref()));
        item.insert("date".to_string(), store::attr_opt_s(event.date.as_deref()));
        item.insert(
            "type".to_string(),
            store::attr_opt_s(event.event_type.as_deref()),
        );
        item.insert(
            "amount".to_string(),
            store::attr_opt_decimal(event.amount.as_ref()),
        );
        item.insert("notes".to_string(), store::attr_opt_s(event.notes.as_deref()));
        item.insert(
            "category".to_string(),
            store::attr_opt_s(event.category.as_deref()),
        );
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(event.created_at.clone()),
        );
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(event.updated_at.clone()),
        );
        item
    }

    fn from_item(item: &HashMap<String, AttributeValue>) -> Result<LedgerEvent, StoreError> {
        Ok(LedgerEvent {
            id: store::get_s(item, "id")?,
            user_id: store::get_s(item, "userId")?,
            title: store::get_opt_s(item, "title"),
            date: store::get_opt_s(item, "date"),
            event_type: store::get_opt_s(item, "type"),
            amount: store::get_opt_decimal(item, "amount")?,
            notes: store::get_opt_s(item, "notes"),
            category: store::get_opt_s(item, "category"),
            created_at: store::get_s(item, "createdAt")?,
            updated_at: store::get_s(item, "updatedAt")?,
        })
    }
}

#[async_trait]
impl LedgerEventRepository for DynamoLedgerEventRepository {
    async fn put(&self, event: &LedgerEvent) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(event)))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn get(&self, user_id: &str, event_id: &str) -> Result<Option<LedgerEvent>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(event_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::ReadError(e.into_service_error().to_string()))?;

        match result.item {
            Some(item) => Ok(Some(Self::from_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<LedgerEvent>, StoreError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(USER_ID_INDEX)
            .key_condition_expression("userId = :uid")
            .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::ReadError(e.into_service_error().to_string()))?;

        let mut events = Vec::new();
        if let Some(items) = result.items {
            for item in items {
                events.push(Self::from_item(&item)?);
            }
        }

        Ok(events)
    }

    async fn update(
        &self,
        user_id: &str,
        event_id: &str,
        update: &LedgerEventUpdate,
        updated_at: &str,
    ) -> Result<Option<LedgerEvent>, StoreError> {
        // dateとtypeはDynamoDBの予約語のためプレースホルダを使う
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(event_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .update_expression(
                "SET title = :title, #date = :date, #type = :type, amount = :amount, \
                 notes = :notes, updatedAt = :updatedAt, category = :category",
            )
            .expression_attribute_names("#date", "date")
            .expression_attribute_names("#type", "type")
            .expression_attribute_values(":title", store::attr_opt_s(update.title.as_deref()))
            .expression_attribute_values(":date", store::attr_opt_s(update.date.as_deref()))
            .expression_attribute_values(":type", store::attr_opt_s(update.event_type.as_deref()))
            .expression_attribute_values(":amount", store::attr_opt_decimal(update.amount.as_ref()))
            .expression_attribute_values(":notes", store::attr_opt_s(update.notes.as_deref()))
            .expression_attribute_values(":updatedAt", AttributeValue::S(updated_at.to_string()))
            .expression_attribute_values(":category", store::attr_opt_s(update.category.as_deref()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        match result.attributes {
            Some(attributes) => Ok(Some(Self::from_item(&attributes)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: &str, event_id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(event_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }
}

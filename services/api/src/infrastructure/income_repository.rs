/// 収入リポジトリ
///
/// Incomeテーブル（パーティションキー: id、ソートキー: userId）への
/// アクセスを抽象化する。ユーザー別一覧はGSI `UserIdIndex`で取得する。
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};

use crate::domain::income::{Income, IncomeUpdate};
use crate::infrastructure::config::{DynamoDbConfig, USER_ID_INDEX};
use crate::infrastructure::store::{self, StoreError};

/// 収入ストア操作のトレイト
#[async_trait]
pub trait IncomeRepository: Send + Sync {
    /// 収入を無条件に保存する
    async fn put(&self, income: &Income) -> Result<(), StoreError>;

    /// 複合キーで1件取得する
    async fn get(&self, user_id: &str, income_id: &str) -> Result<Option<Income>, StoreError>;

    /// ユーザーの全収入を取得する
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Income>, StoreError>;

    /// 全フィールドを上書きし、更新後のレコードを返す
    async fn update(
        &self,
        user_id: &str,
        income_id: &str,
        update: &IncomeUpdate,
        updated_at: &str,
    ) -> Result<Income, StoreError>;

    /// 収入を削除する（存在しなくても成功扱い）
    async fn delete(&self, user_id: &str, income_id: &str) -> Result<(), StoreError>;
}

/// DynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoIncomeRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoIncomeRepository {
    pub fn new(config: &DynamoDbConfig) -> Self {
        Self {
            client: config.client().clone(),
            table_name: config.income_table().to_string(),
        }
    }

    fn to_item(income: &Income) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(income.id.clone()));
        item.insert("userId".to_string(), AttributeValue::S(income.user_id.clone()));
        item.insert("name".to_string(), store::attr_opt_s(income.name.as_deref()));
        item.insert("amount".to_string(), store::attr_decimal(&income.amount));
        item.insert(
            "category".to_string(),
            store::attr_opt_s(income.category.as_deref()),
        );
        item.insert("date".to_string(), store::attr_opt_s(income.date.as_deref()));
        item.insert(
            "paymentMethod".to_string(),
            store::attr_opt_s(income.payment_method.as_deref()),
        );
        item.insert("notes".to_string(), store::attr_opt_s(income.notes.as_deref()));
        item.insert(
            "receiptUrl".to_string(),
            store::attr_opt_s(income.receipt_url.as_deref()),
        );
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(income.created_at.clone()),
        );
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(income.updated_at.clone()),
        );
        item
    }

    fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Income, StoreError> {
        Ok(Income {
            user_id: store::get_s(item, "userId")?,
            id: store::get_s(item, "id")?,
            name: store::get_opt_s(item, "name"),
            amount: store::get_decimal(item, "amount")?,
            category: store::get_opt_s(item, "category"),
            date: store::get_opt_s(item, "date"),
            payment_method: store::get_opt_s(item, "paymentMethod"),
            notes: store::get_opt_s(item, "notes"),
            receipt_url: store::get_opt_s(item, "receiptUrl"),
            created_at: store::get_s(item, "createdAt")?,
            updated_at: store::get_s(item, "updatedAt")?,
        })
    }
}

#[async_trait]
impl IncomeRepository for DynamoIncomeRepository {
    async fn put(&self, income: &Income) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(income)))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn get(&self, user_id: &str, income_id: &str) -> Result<Option<Income>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(income_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::ReadError(e.into_service_error().to_string()))?;

        match result.item {
            Some(item) => Ok(Some(Self::from_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Income>, StoreError> {
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

        let mut incomes = Vec::new();
        if let Some(items) = result.items {
            for item in items {
                incomes.push(Self::from_item(&item)?);
            }
        }

        Ok(incomes)
    }

    async fn update(
        &self,
        user_id: &str,
        income_id: &str,
        update: &IncomeUpdate,
        updated_at: &str,
    ) -> Result<Income, StoreError> {
        // nameとdateはDynamoDBの予約語のためプレースホルダを使う
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(income_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .update_expression(
                "SET #n = :n, amount = :a, category = :c, #d = :d, \
                 paymentMethod = :pm, notes = :nt, receiptUrl = :ru, updatedAt = :ua",
            )
            .expression_attribute_names("#n", "name")
            .expression_attribute_names("#d", "date")
            .expression_attribute_values(":n", store::attr_opt_s(update.name.as_deref()))
            .expression_attribute_values(":a", store::attr_decimal(&update.amount))
            .expression_attribute_values(":c", store::attr_opt_s(update.category.as_deref()))
            .expression_attribute_values(":d", store::attr_opt_s(update.date.as_deref()))
            .expression_attribute_values(":pm", store::attr_opt_s(update.payment_method.as_deref()))
            .expression_attribute_values(":nt", store::attr_opt_s(update.notes.as_deref()))
            .expression_attribute_values(":ru", store::attr_opt_s(update.receipt_url.as_deref()))
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

    async fn delete(&self, user_id: &str, income_id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(income_id.to_string()))
            .key("userId", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }
}

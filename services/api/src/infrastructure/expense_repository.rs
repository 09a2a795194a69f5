/// 支出リポジトリ
///
/// Expensesテーブル（パーティションキー: userId、ソートキー: id）への
/// アクセスを抽象化する。このテーブルだけはuserIdがパーティションキー
/// なので、ユーザー別一覧はGSIではなくテーブル本体のクエリで取得する。
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};

use crate::domain::expense::{Expense, ExpenseUpdate};
use crate::infrastructure::config::DynamoDbConfig;
use crate::infrastructure::store::{self, StoreError};

/// 支出ストア操作のトレイト
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// 支出を無条件に保存する
    async fn put(&self, expense: &Expense) -> Result<(), StoreError>;

    /// ユーザーの全支出を取得する
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Expense>, StoreError>;

    /// 全フィールドを上書きし、更新後のレコードを返す
    async fn update(
        &self,
        user_id: &str,
        expense_id: &str,
        update: &ExpenseUpdate,
        updated_at: &str,
    ) -> Result<Expense, StoreError>;

    /// 支出を削除する（存在しなくても成功扱い）
    async fn delete(&self, user_id: &str, expense_id: &str) -> Result<(), StoreError>;
}

/// DynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoExpenseRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoExpenseRepository {
    pub fn new(config: &DynamoDbConfig) -> Self {
        Self {
            client: config.client().clone(),
            table_name: config.expenses_table().to_string(),
        }
    }

    fn to_item(expense: &Expense) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("userId".to_string(), AttributeValue::S(expense.user_id.clone()));
        item.insert("id".to_string(), AttributeValue::S(expense.id.clone()));
        item.insert("name".to_string(), store::attr_opt_s(expense.name.as_deref()));
        item.insert("amount".to_string(), store::attr_decimal(&expense.amount));
        item.insert(
            "category".to_string(),
            store::attr_opt_s(expense.category.as_deref()),
        );
        item.insert("date".to_string(), store::attr_opt_s(expense.date.as_deref()));
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(expense.created_at.clone()),
        );
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(expense.updated_at.clone()),
        );
        item
    }

    fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Expense, StoreError> {
        Ok(Expense {
            user_id: store::get_s(item, "userId")?,
            id: store::get_s(item, "id")?,
            name: store::get_opt_s(item, "name"),
            amount: store::get_decimal(item, "amount")?,
            category: store::get_opt_s(item, "category"),
            date: store::get_opt_s(item, "date"),
            created_at: store::get_s(item, "createdAt")?,
            updated_at: store::get_s(item, "updatedAt")?,
        })
    }
}

#[async_trait]
impl ExpenseRepository for DynamoExpenseRepository {
    async fn put(&self, expense: &Expense) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(expense)))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Expense>, StoreError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("userId = :uid")
            .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::ReadError(e.into_service_error().to_string()))?;

        let mut expenses = Vec::new();
        if let Some(items) = result.items {
            for item in items {
                expenses.push(Self::from_item(&item)?);
            }
        }

        Ok(expenses)
    }

    async fn update(
        &self,
        user_id: &str,
        expense_id: &str,
        update: &ExpenseUpdate,
        updated_at: &str,
    ) -> Result<Expense, StoreError> {
        // nameとdateはDynamoDBの予約語のためプレースホルダを使う
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .key("id", AttributeValue::S(expense_id.to_string()))
            .update_expression("SET #n = :n, amount = :a, category = :c, #d = :d, updatedAt = :ua")
            .expression_attribute_names("#n", "name")
            .expression_attribute_names("#d", "date")
            .expression_attribute_values(":n", store::attr_opt_s(update.name.as_deref()))
            .expression_attribute_values(":a", store::attr_decimal(&update.amount))
            .expression_attribute_values(":c", store::attr_opt_s(update.category.as_deref()))
            .expression_attribute_values(":d", store::attr_opt_s(update.date.as_deref()))
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

    async fn delete(&self, user_id: &str, expense_id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .key("id", AttributeValue::S(expense_id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }
}

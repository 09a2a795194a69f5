//! 支出レコード

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::money;

/// Expensesテーブルのレコード（複合キー: userId + id）
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub user_id: String,
    pub id: String,
    pub name: Option<String>,
    #[serde(with = "money")]
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// 支出更新の置換フィールド集合
///
/// マージパッチではなく全フィールド上書き。Noneのフィールドは
/// ストアにNULLとして書き込まれる。
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseUpdate {
    pub name: Option<String>,
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// フィールド名はcamelCase、金額はJSON数値で出力される
    #[test]
    fn test_expense_serializes_camel_case() {
        let expense = Expense {
            user_id: "u1".to_string(),
            id: "e1".to_string(),
            name: Some("Coffee".to_string()),
            amount: money::parse_decimal("3.5").unwrap(),
            category: Some("food".to_string()),
            date: Some("2024-01-01".to_string()),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&expense).unwrap();
        assert!(json.contains(r#""userId":"u1""#));
        assert!(json.contains(r#""amount":3.5"#));
        assert!(json.contains(r#""createdAt":"2024-01-01T00:00:00Z""#));
    }

    /// 欠落フィールドはnullとして出力される
    #[test]
    fn test_expense_absent_fields_serialize_as_null() {
        let expense = Expense {
            user_id: "u1".to_string(),
            id: "e1".to_string(),
            name: None,
            amount: Decimal::ZERO,
            category: None,
            date: None,
            created_at: "t".to_string(),
            updated_at: "t".to_string(),
        };

        let json = serde_json::to_value(&expense).unwrap();
        assert!(json["name"].is_null());
        assert!(json["category"].is_null());
        assert!(json["date"].is_null());
    }
}

//! 収入レコード

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::money;

/// Incomeテーブルのレコード（複合キー: userId + id）
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub user_id: String,
    pub id: String,
    pub name: Option<String>,
    #[serde(with = "money")]
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub receipt_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// 収入更新の置換フィールド集合（全フィールド上書き、欠落はNULL）
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeUpdate {
    pub name: Option<String>,
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub receipt_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// camelCaseフィールド名と金額の正確な出力
    #[test]
    fn test_income_serializes_camel_case() {
        let income = Income {
            user_id: "u1".to_string(),
            id: "i1".to_string(),
            name: Some("Salary".to_string()),
            amount: money::parse_decimal("2500.00").unwrap(),
            category: Some("work".to_string()),
            date: Some("2024-02-01".to_string()),
            payment_method: Some("transfer".to_string()),
            notes: None,
            receipt_url: None,
            created_at: "t".to_string(),
            updated_at: "t".to_string(),
        };

        let json = serde_json::to_string(&income).unwrap();
        assert!(json.contains(r#""paymentMethod":"transfer""#));
        assert!(json.contains(r#""receiptUrl":null"#));
        assert!(json.contains(r#""amount":2500.00"#));
    }
}

//! 台帳イベントレコード
//!
//! 支出/収入と重複する汎用的な台帳エントリ。カレンダー表示用に
//! 使われ、金額は任意フィールドになっている。

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::money;

/// Eventsテーブルのレコード（複合キー: userId + id）
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    #[serde(with = "money::option")]
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// イベント更新の置換フィールド集合（全フィールド上書き、欠落はNULL）
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEventUpdate {
    pub title: Option<String>,
    pub date: Option<String>,
    pub event_type: Option<String>,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `type`フィールド名の出力と任意金額のnull出力
    #[test]
    fn test_ledger_event_serialization() {
        let event = LedgerEvent {
            id: "ev1".to_string(),
            user_id: "u1".to_string(),
            title: Some("Rent due".to_string()),
            date: Some("2024-03-01".to_string()),
            event_type: Some("expense".to_string()),
            amount: None,
            notes: None,
            category: Some("housing".to_string()),
            created_at: "t".to_string(),
            updated_at: "t".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "expense");
        assert!(json["amount"].is_null());
        assert_eq!(json["title"], "Rent due");
    }

    /// 金額ありのイベントはJSON数値で出力される
    #[test]
    fn test_ledger_event_amount_serializes_as_number() {
        let event = LedgerEvent {
            id: "ev1".to_string(),
            user_id: "u1".to_string(),
            title: None,
            date: None,
            event_type: None,
            amount: Some(money::parse_decimal("99.90").unwrap()),
            notes: None,
            category: None,
            created_at: "t".to_string(),
            updated_at: "t".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""amount":99.90"#));
    }
}

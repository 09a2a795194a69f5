//! 貯蓄目標レコード

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::money;

/// Goalsテーブルのレコード（複合キー: userId + id）
///
/// `currentAmount`は作成時に未指定なら0で初期化される。
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub name: Option<String>,
    #[serde(with = "money")]
    pub target_amount: Decimal,
    #[serde(with = "money")]
    pub current_amount: Decimal,
    pub category: Option<String>,
    pub target_date: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// 目標更新の置換フィールド集合（全フィールド上書き、欠落はNULL）
#[derive(Debug, Clone, PartialEq)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub category: Option<String>,
    pub target_date: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 金額2種がどちらも正確な桁でJSON数値になる
    #[test]
    fn test_goal_serializes_both_amounts() {
        let goal = Goal {
            id: "g1".to_string(),
            user_id: "u1".to_string(),
            name: Some("Vacation".to_string()),
            target_amount: money::parse_decimal("1000.00").unwrap(),
            current_amount: Decimal::ZERO,
            category: None,
            target_date: Some("2025-06-01".to_string()),
            description: None,
            created_at: "t".to_string(),
            updated_at: "t".to_string(),
        };

        let json = serde_json::to_string(&goal).unwrap();
        assert!(json.contains(r#""targetAmount":1000.00"#));
        assert!(json.contains(r#""currentAmount":0"#));
        assert!(json.contains(r#""targetDate":"2025-06-01""#));
    }
}

/// ストア共通部品
///
/// 5つのリソースリポジトリが共有するエラー型と、DynamoDBアイテムと
/// ドメイン型の間のAttributeValue変換ヘルパー。欠落フィールドは
/// NULL属性として書き込み、読み出し時はNoneに戻す。
use std::collections::HashMap;
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use rust_decimal::Decimal;
use thiserror::Error;

/// ストア操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// 読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// 書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// アイテムとドメイン型の変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 任意の文字列フィールドをAttributeValueにする（None→NULL）
pub fn attr_opt_s(value: Option<&str>) -> AttributeValue {
    match value {
        Some(s) => AttributeValue::S(s.to_string()),
        None => AttributeValue::Null(true),
    }
}

/// 金額をAttributeValue::Nにする（10進数の桁をそのまま保持）
pub fn attr_decimal(value: &Decimal) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

/// 任意の金額フィールドをAttributeValueにする（None→NULL）
pub fn attr_opt_decimal(value: Option<&Decimal>) -> AttributeValue {
    match value {
        Some(d) => attr_decimal(d),
        None => AttributeValue::Null(true),
    }
}

/// 必須の文字列フィールドをアイテムから取り出す
pub fn get_s(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, StoreError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::SerializationError(format!("Missing attribute: {key}")))
}

/// 任意の文字列フィールドをアイテムから取り出す（欠落/NULL→None）
pub fn get_opt_s(item: &HashMap<String, AttributeValue>, key: &str) -> Option<String> {
    item.get(key).and_then(|v| v.as_s().ok()).cloned()
}

/// 必須の金額フィールドをアイテムから取り出す
pub fn get_decimal(item: &HashMap<String, AttributeValue>, key: &str) -> Result<Decimal, StoreError> {
    let n = item
        .get(key)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| StoreError::SerializationError(format!("Missing attribute: {key}")))?;

    Decimal::from_str(n)
        .map_err(|e| StoreError::SerializationError(format!("Invalid number in {key}: {e}")))
}

/// 任意の金額フィールドをアイテムから取り出す（欠落/NULL→None）
pub fn get_opt_decimal(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<Option<Decimal>, StoreError> {
    match item.get(key).and_then(|v| v.as_n().ok()) {
        Some(n) => Decimal::from_str(n)
            .map(Some)
            .map_err(|e| StoreError::SerializationError(format!("Invalid number in {key}: {e}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== エラー型テスト ====================

    #[test]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::ReadError("conn refused".to_string()).to_string(),
            "Read error: conn refused"
        );
        assert_eq!(
            StoreError::WriteError("throttled".to_string()).to_string(),
            "Write error: throttled"
        );
        assert_eq!(
            StoreError::SerializationError("bad item".to_string()).to_string(),
            "Serialization error: bad item"
        );
    }

    #[test]
    fn test_store_error_equality() {
        assert_eq!(
            StoreError::ReadError("x".to_string()),
            StoreError::ReadError("x".to_string())
        );
        assert_ne!(
            StoreError::ReadError("x".to_string()),
            StoreError::WriteError("x".to_string())
        );
    }

    // ==================== 変換ヘルパーテスト ====================

    /// None文字列はNULL属性になる
    #[test]
    fn test_attr_opt_s() {
        assert_eq!(
            attr_opt_s(Some("food")),
            AttributeValue::S("food".to_string())
        );
        assert_eq!(attr_opt_s(None), AttributeValue::Null(true));
    }

    /// 金額は桁を保ったままN属性になる
    #[test]
    fn test_attr_decimal_preserves_scale() {
        let d = Decimal::from_str("12.50").unwrap();
        assert_eq!(attr_decimal(&d), AttributeValue::N("12.50".to_string()));
    }

    /// アイテムからの必須/任意フィールド読み出し
    #[test]
    fn test_item_readers() {
        let mut item = HashMap::new();
        item.insert("name".to_string(), AttributeValue::S("Coffee".to_string()));
        item.insert("amount".to_string(), AttributeValue::N("3.5".to_string()));
        item.insert("notes".to_string(), AttributeValue::Null(true));

        assert_eq!(get_s(&item, "name").unwrap(), "Coffee");
        assert_eq!(get_decimal(&item, "amount").unwrap().to_string(), "3.5");
        assert_eq!(get_opt_s(&item, "notes"), None);
        assert_eq!(get_opt_s(&item, "missing"), None);
        assert_eq!(get_opt_decimal(&item, "missing").unwrap(), None);
    }

    /// 必須フィールド欠落はSerializationError
    #[test]
    fn test_missing_required_attribute() {
        let item = HashMap::new();
        match get_s(&item, "id") {
            Err(StoreError::SerializationError(msg)) => assert!(msg.contains("id")),
            other => panic!("Expected SerializationError, got {other:?}"),
        }
        assert!(get_decimal(&item, "amount").is_err());
    }
}

//! 金額のシリアライズ/デシリアライズ
//!
//! 金額は必ず`rust_decimal::Decimal`として扱い、浮動小数点数を経由しない。
//! JSONへの出力は`serde_json`のarbitrary_precisionを利用して数値のまま
//! 正確な桁を保持する（`12.50`は`12.50`のまま往復する）。
//! 入力はJSON数値と文字列（`"12.50"`）の両方を受け付ける。

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// 文字列から正確な10進数を解析する
///
/// 指数表記（`1e2`など）にもフォールバックで対応する。
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim())
        .or_else(|_| Decimal::from_scientific(s.trim()))
        .ok()
}

/// JSON値（数値または文字列）から正確な10進数を解析する
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        // arbitrary_precision有効時、Numberは元の桁をそのまま保持している
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// 必須の金額フィールド用 `#[serde(with = "money")]`
pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    rust_decimal::serde::arbitrary_precision::serialize(value, serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_from_value(&value)
        .ok_or_else(|| D::Error::custom("expected a decimal number or string"))
}

/// 任意の金額フィールド用 `#[serde(default, with = "money::option")]`
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => super::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Null => Ok(None),
            other => decimal_from_value(&other)
                .map(Some)
                .ok_or_else(|| D::Error::custom("expected a decimal number, string or null")),
        }
    }
}

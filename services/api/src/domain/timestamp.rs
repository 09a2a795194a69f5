//! createdAt/updatedAtタイムスタンプ生成

use chrono::{SecondsFormat, Utc};

/// 現在時刻のISO 8601文字列（UTC、マイクロ秒精度）を返す
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

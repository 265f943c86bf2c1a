//! リモートAPIのエンベロープと寛容なデシリアライザ
//!
//! バックエンドは表計算ベースのため、IDや数量が数値で返ることがある。
//! 空文字列は「未設定」として扱う。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// fetchOrders / fetchItems の応答 `{ok, items?}`
///
/// `items` は検証前の生データのまま保持する（配列でない場合はフォーマットエラー）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchEnvelope {
    #[serde(default)]
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// add* / update*Status の応答 `{ok}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true, error: None }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
        }
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 文字列または数値のIDを文字列に正規化
pub fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match scalar_to_string(value) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(serde::de::Error::custom("id must be a non-empty string or number")),
    }
}

/// 必須テキスト: null/非スカラーは空文字列（後段のフィルタで除外される）
pub fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

/// 任意テキスト: null・空白のみはNone
pub fn de_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).filter(|s| !s.trim().is_empty()))
}

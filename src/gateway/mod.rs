//! リモートAPIゲートウェイ
//!
//! 4種類の操作（取得・追加・ステータス更新）を統一エンベロープで返す。
//! ゲートウェイ自身はリトライしない。再送の方針は呼び出し側が決める。

mod http;

pub use http::HttpGateway;

use crate::error::GatewayError;
use async_trait::async_trait;
use oapp_common::{Ack, FetchEnvelope, Kind, Lane, NewItem, NewOrder, Record};
use serde_json::Value;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn fetch_orders(&self) -> GatewayResult<FetchEnvelope>;

    async fn fetch_items(&self) -> GatewayResult<FetchEnvelope>;

    async fn add_order(&self, fields: &NewOrder) -> GatewayResult<Ack>;

    async fn add_item(&self, fields: &NewItem) -> GatewayResult<Ack>;

    async fn update_order_status(&self, id: &str, status: Lane) -> GatewayResult<Ack>;

    async fn update_item_status(&self, id: &str, status: Lane) -> GatewayResult<Ack>;

    async fn fetch(&self, kind: Kind) -> GatewayResult<FetchEnvelope> {
        match kind {
            Kind::Orders => self.fetch_orders().await,
            Kind::Items => self.fetch_items().await,
        }
    }

    async fn update_status(&self, kind: Kind, id: &str, status: Lane) -> GatewayResult<Ack> {
        match kind {
            Kind::Orders => self.update_order_status(id, status).await,
            Kind::Items => self.update_item_status(id, status).await,
        }
    }
}

/// API未設定時のゲートウェイ（すべて通信エラーを返す）
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedGateway;

impl DisconnectedGateway {
    fn unavailable<T>() -> GatewayResult<T> {
        Err(GatewayError::Transport("API URL not configured".to_string()))
    }
}

#[async_trait]
impl RemoteGateway for DisconnectedGateway {
    async fn fetch_orders(&self) -> GatewayResult<FetchEnvelope> {
        Self::unavailable()
    }

    async fn fetch_items(&self) -> GatewayResult<FetchEnvelope> {
        Self::unavailable()
    }

    async fn add_order(&self, _fields: &NewOrder) -> GatewayResult<Ack> {
        Self::unavailable()
    }

    async fn add_item(&self, _fields: &NewItem) -> GatewayResult<Ack> {
        Self::unavailable()
    }

    async fn update_order_status(&self, _id: &str, _status: Lane) -> GatewayResult<Ack> {
        Self::unavailable()
    }

    async fn update_item_status(&self, _id: &str, _status: Lane) -> GatewayResult<Ack> {
        Self::unavailable()
    }
}

/// 取得結果の検証結果
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecords<R> {
    pub records: Vec<R>,
    /// パースできなかった要素数（不明なレーン・ID欠落など）
    pub unparsable: usize,
}

/// 取得エンベロープからレコードを取り出す
///
/// - `ok:false` → `Rejected`
/// - `items` が配列でない → `Format`
/// - パースできない要素は警告して捨てる
pub fn parse_records<R: Record>(envelope: FetchEnvelope) -> GatewayResult<ParsedRecords<R>> {
    if !envelope.ok {
        return Err(GatewayError::Rejected(
            envelope.error.unwrap_or_else(|| "ok=false".to_string()),
        ));
    }

    let elements = match envelope.items {
        Some(Value::Array(elements)) => elements,
        Some(other) => {
            return Err(GatewayError::Format(format!(
                "items is not an array: {}",
                json_type_name(&other)
            )))
        }
        None => return Err(GatewayError::Format("items missing".to_string())),
    };

    let mut records = Vec::with_capacity(elements.len());
    let mut unparsable = 0;
    for element in elements {
        match serde_json::from_value::<R>(element) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("{}: 不正なレコードを除外: {}", R::KIND, e);
                unparsable += 1;
            }
        }
    }

    Ok(ParsedRecords { records, unparsable })
}

/// Ackを結果に変換（`ok:false` は拒否）
pub fn check_ack(ack: Ack) -> GatewayResult<()> {
    if ack.ok {
        Ok(())
    } else {
        Err(GatewayError::Rejected(
            ack.error.unwrap_or_else(|| "ok=false".to_string()),
        ))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

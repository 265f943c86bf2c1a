//! HTTPゲートウェイ（reqwest）
//!
//! - 取得: `GET {api_url}?action=getOrders|getItems`
//! - 追加: `POST {api_url}` `{"action":"addOrder","data":{...}}`
//! - 更新: `POST {api_url}` `{"action":"updateOrderStatus","id":..,"status":..}`

use super::{GatewayResult, RemoteGateway};
use crate::config::Config;
use crate::error::{GatewayError, OappError, Result};
use async_trait::async_trait;
use oapp_common::{Ack, FetchEnvelope, Lane, NewItem, NewOrder};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_url = api_url.into();
        if !api_url.starts_with("http") {
            return Err(OappError::Config(format!("URLが不正です: {}", api_url)));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url()?, config.request_timeout())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get_action<T: DeserializeOwned>(&self, action: &str) -> GatewayResult<T> {
        tracing::debug!("GET {}?action={}", self.api_url, action);
        let request = self.client.get(&self.api_url).query(&[("action", action)]);
        self.send(request).await
    }

    async fn post_action<T: DeserializeOwned>(&self, body: serde_json::Value) -> GatewayResult<T> {
        tracing::debug!("POST {} {}", self.api_url, body);
        let request = self.client.post(&self.api_url).json(&body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> GatewayResult<T> {
        let response = request.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        serde_json::from_str(&body).map_err(|e| GatewayError::MalformedBody(e.to_string()))
    }

    fn map_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.timeout.as_secs())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn fetch_orders(&self) -> GatewayResult<FetchEnvelope> {
        self.get_action("getOrders").await
    }

    async fn fetch_items(&self) -> GatewayResult<FetchEnvelope> {
        self.get_action("getItems").await
    }

    async fn add_order(&self, fields: &NewOrder) -> GatewayResult<Ack> {
        self.post_action(json!({ "action": "addOrder", "data": fields }))
            .await
    }

    async fn add_item(&self, fields: &NewItem) -> GatewayResult<Ack> {
        self.post_action(json!({ "action": "addItem", "data": fields }))
            .await
    }

    async fn update_order_status(&self, id: &str, status: Lane) -> GatewayResult<Ack> {
        self.post_action(json!({ "action": "updateOrderStatus", "id": id, "status": status }))
            .await
    }

    async fn update_item_status(&self, id: &str, status: Lane) -> GatewayResult<Ack> {
        self.post_action(json!({ "action": "updateItemStatus", "id": id, "status": status }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_url() {
        let gateway = HttpGateway::new("https://example.com/exec", Duration::from_secs(5)).unwrap();
        assert_eq!(gateway.api_url(), "https://example.com/exec");
    }

    #[test]
    fn test_from_config_rejects_non_http_url() {
        if std::env::var("OAPP_API_URL").is_ok() {
            return;
        }
        let config = Config {
            api_url: Some("ftp://example.com/exec".to_string()),
            ..Default::default()
        };
        assert!(matches!(HttpGateway::from_config(&config), Err(OappError::Config(_))));

        let config = Config {
            api_url: Some("https://example.com/exec".to_string()),
            timeout_seconds: 0,
            ..Default::default()
        };
        let gateway = HttpGateway::from_config(&config).unwrap();
        assert_eq!(gateway.api_url(), "https://example.com/exec");
        assert_eq!(gateway.timeout, Duration::from_secs(1));
    }

    /// 接続できない宛先は通信エラー（フォーマットエラーではない）
    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let gateway = HttpGateway::new("http://127.0.0.1:9/exec", Duration::from_secs(2)).unwrap();
        let err = gateway.fetch_orders().await.unwrap_err();
        assert!(!err.is_format());
        assert!(matches!(err, GatewayError::Transport(_) | GatewayError::Timeout(_)));
    }
}

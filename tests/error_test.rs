//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use oapp::config::Config;
use oapp::gateway::{parse_records, DisconnectedGateway, HttpGateway, RemoteGateway};
use oapp::store::LocalStore;
use oapp::{Board, CreateOutcome, GatewayError, OappError, SyncOutcome};
use oapp_common::{FetchEnvelope, Kind, Lane, NewOrder, Order};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// URLでない値はAPI URLとして受け付けない
#[test]
fn test_invalid_api_url() {
    let result = HttpGateway::new("not-a-url".to_string(), Duration::from_secs(5));
    assert!(matches!(result, Err(OappError::Config(_))));
}

/// 接続できないサーバーは通信エラー
#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let gateway =
        HttpGateway::new("http://127.0.0.1:9/exec".to_string(), Duration::from_secs(2)).unwrap();

    let result = gateway.fetch(Kind::Orders).await;
    assert!(matches!(
        result,
        Err(GatewayError::Transport(_)) | Err(GatewayError::Timeout(_))
    ));
}

/// API未設定でもボードはローカルで動作する
#[tokio::test]
async fn test_board_without_api_url() {
    let board = Board::new(LocalStore::in_memory(), Arc::new(DisconnectedGateway));

    let outcome = board.reconcile(Kind::Orders, false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::TransportError);

    let created = board
        .create_order(NewOrder {
            subject: "Kable".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(matches!(created, CreateOutcome::Degraded { .. }));
    assert_eq!(board.orders().unwrap().len(), 1);
}

/// `items` がない応答はフォーマットエラー
#[test]
fn test_missing_items_is_format_error() {
    let envelope = FetchEnvelope {
        ok: true,
        items: None,
        error: None,
    };
    let err = parse_records::<Order>(envelope).unwrap_err();
    assert!(err.is_format());
}

/// 不正な要素だけが除外され、残りは使える
#[test]
fn test_partially_invalid_items() {
    let envelope = FetchEnvelope {
        ok: true,
        items: Some(json!([
            {"id": 1, "co": "A", "status": "Nowe"},
            {"co": "no id", "status": "Nowe"},
            "garbage"
        ])),
        error: None,
    };
    let parsed = parse_records::<Order>(envelope).unwrap();
    assert_eq!(parsed.records.len(), 1);
    assert_eq!(parsed.records[0].status, Lane::New);
    assert_eq!(parsed.unparsable, 2);
}

/// 不正なレーン名はパースエラー
#[test]
fn test_invalid_lane_name() {
    let result = "Archiwum".parse::<Lane>();
    assert!(matches!(result, Err(oapp_common::Error::InvalidLane(_))));
}

/// 設定ファイルの型が違う場合はJSONエラー
#[test]
fn test_config_type_mismatch() {
    let result: Result<Config, _> = serde_json::from_str(r#"{"timeout_seconds": "thirty"}"#);
    assert!(result.is_err());
}

/// エラーメッセージにゲートウェイの詳細が含まれる
#[test]
fn test_gateway_error_message() {
    let err: OappError = GatewayError::HttpStatus(503).into();
    assert!(err.to_string().contains("503"));
}

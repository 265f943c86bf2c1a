//! 統合テスト用の共通部品
//!
//! メモリ上のサーバーを持つ偽ゲートウェイ、通知の記録、固定時計。

#![allow(dead_code)]

use async_trait::async_trait;
use oapp::board::Board;
use oapp::clock::Clock;
use oapp::connectivity::ConnectivityFlag;
use oapp::gateway::{GatewayResult, RemoteGateway};
use oapp::notice::{Notice, Notifier};
use oapp::store::LocalStore;
use oapp::GatewayError;
use oapp_common::{Ack, FetchEnvelope, Kind, Lane, NewItem, NewOrder};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

pub const T0: i64 = 1_700_000_000_000;

/// 次の呼び出しの振る舞い
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Normal,
    Transport,
    Rejected,
    /// 取得時に任意のエンベロープを返す
    Envelope(FetchEnvelope),
}

#[derive(Default)]
struct ServerState {
    orders: Vec<Value>,
    items: Vec<Value>,
    next_id: u64,
    behavior: Option<Behavior>,
    /// 何回目の呼び出しから失敗させるか（Noneは常にbehaviorに従う）
    fail_after: Option<usize>,
    /// 作成だけを拒否する
    reject_adds: bool,
    calls: Vec<String>,
}

/// メモリ上のサーバー
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<ServerState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        let gateway = Self::default();
        gateway.state.lock().unwrap().next_id = 100;
        gateway
    }

    pub fn with_orders(self, orders: Vec<Value>) -> Self {
        self.state.lock().unwrap().orders = orders;
        self
    }

    pub fn with_items(self, items: Vec<Value>) -> Self {
        self.state.lock().unwrap().items = items;
        self
    }

    /// 以降の呼び出しをすべて指定の振る舞いにする
    pub fn set_behavior(&self, behavior: Behavior) {
        let mut state = self.state.lock().unwrap();
        state.behavior = Some(behavior);
        state.fail_after = None;
    }

    /// n回成功した後、Transportエラーにする
    pub fn fail_after(&self, n: usize) {
        let mut state = self.state.lock().unwrap();
        state.behavior = Some(Behavior::Transport);
        state.fail_after = Some(n);
    }

    /// 作成 (`add*`) を常に `ok:false` で拒否する
    pub fn reject_adds(&self) {
        self.state.lock().unwrap().reject_adds = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn server_orders(&self) -> Vec<Value> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn server_items(&self) -> Vec<Value> {
        self.state.lock().unwrap().items.clone()
    }

    /// 呼び出しを記録し、今回の振る舞いを返す
    fn record(&self, call: String) -> Behavior {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let made = state.calls.len();
        match (&state.behavior, state.fail_after) {
            (Some(_), Some(n)) if made <= n => Behavior::Normal,
            (Some(behavior), _) => behavior.clone(),
            (None, _) => Behavior::Normal,
        }
    }

    fn fetch_kind(&self, kind: Kind) -> GatewayResult<FetchEnvelope> {
        match self.record(format!("fetch {}", kind)) {
            Behavior::Transport => Err(GatewayError::Transport("connection refused".into())),
            Behavior::Rejected => Ok(FetchEnvelope {
                ok: false,
                items: None,
                error: Some("sheet locked".into()),
            }),
            Behavior::Envelope(envelope) => Ok(envelope),
            Behavior::Normal => {
                let state = self.state.lock().unwrap();
                let records = match kind {
                    Kind::Orders => state.orders.clone(),
                    Kind::Items => state.items.clone(),
                };
                Ok(FetchEnvelope {
                    ok: true,
                    items: Some(Value::Array(records)),
                    error: None,
                })
            }
        }
    }

    fn add(&self, kind: Kind, fields: Value) -> GatewayResult<Ack> {
        let behavior = self.record(format!("add {}", kind));
        if self.state.lock().unwrap().reject_adds {
            return Ok(Ack::rejected("invalid row"));
        }
        match behavior {
            Behavior::Transport => Err(GatewayError::Transport("connection refused".into())),
            Behavior::Rejected => Ok(Ack::rejected("invalid row")),
            _ => {
                let mut state = self.state.lock().unwrap();
                state.next_id += 1;
                let mut record = fields;
                record["id"] = json!(state.next_id);
                record["status"] = json!("Nowe");
                match kind {
                    Kind::Orders => state.orders.push(record),
                    Kind::Items => state.items.push(record),
                }
                Ok(Ack::ok())
            }
        }
    }

    fn update(&self, kind: Kind, id: &str, status: Lane) -> GatewayResult<Ack> {
        match self.record(format!("update {} {} {}", kind, id, status)) {
            Behavior::Transport => Err(GatewayError::Transport("connection refused".into())),
            Behavior::Rejected => Ok(Ack::rejected("row not found")),
            _ => {
                let mut state = self.state.lock().unwrap();
                let records = match kind {
                    Kind::Orders => &mut state.orders,
                    Kind::Items => &mut state.items,
                };
                for record in records.iter_mut() {
                    let matches = match &record["id"] {
                        Value::String(s) => s == id,
                        Value::Number(n) => n.to_string() == id,
                        _ => false,
                    };
                    if matches {
                        record["status"] = json!(status.label());
                    }
                }
                Ok(Ack::ok())
            }
        }
    }
}

/// 各呼び出しで一度スケジューラに戻し、並行する操作を割り込ませる
#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn fetch_orders(&self) -> GatewayResult<FetchEnvelope> {
        tokio::task::yield_now().await;
        self.fetch_kind(Kind::Orders)
    }

    async fn fetch_items(&self) -> GatewayResult<FetchEnvelope> {
        tokio::task::yield_now().await;
        self.fetch_kind(Kind::Items)
    }

    async fn add_order(&self, fields: &NewOrder) -> GatewayResult<Ack> {
        tokio::task::yield_now().await;
        self.add(Kind::Orders, serde_json::to_value(fields).unwrap())
    }

    async fn add_item(&self, fields: &NewItem) -> GatewayResult<Ack> {
        tokio::task::yield_now().await;
        self.add(Kind::Items, serde_json::to_value(fields).unwrap())
    }

    async fn update_order_status(&self, id: &str, status: Lane) -> GatewayResult<Ack> {
        tokio::task::yield_now().await;
        self.update(Kind::Orders, id, status)
    }

    async fn update_item_status(&self, id: &str, status: Lane) -> GatewayResult<Ack> {
        tokio::task::yield_now().await;
        self.update(Kind::Items, id, status)
    }
}

/// 発行された通知を記録する
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn contains(&self, notice: &Notice) -> bool {
        self.notices.lock().unwrap().contains(notice)
    }

    pub fn clear(&self) {
        self.notices.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// 手動で進める時計
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// テスト用に組み立てたボード一式
pub struct Harness {
    pub board: Board,
    pub server: FakeGateway,
    pub notifier: RecordingNotifier,
    pub connectivity: Arc<ConnectivityFlag>,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new(store: LocalStore, server: FakeGateway) -> Self {
        let notifier = RecordingNotifier::default();
        let connectivity = Arc::new(ConnectivityFlag::new(true));
        let clock = ManualClock::new(T0);
        let board = Board::new(store, Arc::new(server.clone()))
            .with_notifier(Arc::new(notifier.clone()))
            .with_connectivity(connectivity.clone())
            .with_clock(Arc::new(clock.clone()));
        Self {
            board,
            server,
            notifier,
            connectivity,
            clock,
        }
    }

    pub fn in_memory(server: FakeGateway) -> Self {
        Self::new(LocalStore::in_memory(), server)
    }

    pub fn go_offline(&self) {
        self.connectivity.set(false);
    }

    pub fn go_online(&self) {
        self.connectivity.set(true);
    }
}

pub fn server_order(id: u64, subject: &str, status: &str) -> Value {
    json!({"id": id, "co": subject, "status": status})
}

pub fn server_item(id: u64, description: &str, status: &str) -> Value {
    json!({"id": id, "opis": description, "status": status, "priorytet": "Średni"})
}

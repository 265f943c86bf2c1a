//! ボード: ローカルストアとリモートゲートウェイをまとめる
//!
//! 画面状態（表示中のビュー）は保持せず、呼び出し側が`View`として渡す。
//! ストアは`Mutex`で保護し、コレクションの読み込み→変更→保存は
//! 1回のロック内で完結させる（ネットワーク待ちの間はロックしない）。

use crate::clock::{Clock, SystemClock};
use crate::connectivity::{Connectivity, ConnectivityFlag};
use crate::error::{GatewayError, OappError, Result};
use crate::gateway::{GatewayResult, RemoteGateway};
use crate::notice::{Notice, Notifier, NullNotifier};
use crate::store::LocalStore;
use oapp_common::{Item, Kind, Link, Order, Settings};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 表示中のタブ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Orders,
    Items,
    Docs,
}

impl View {
    /// ビューに対応するコレクション（ドキュメントはなし）
    pub fn kind(&self) -> Option<Kind> {
        match self {
            View::Orders => Some(Kind::Orders),
            View::Items => Some(Kind::Items),
            View::Docs => None,
        }
    }
}

impl From<Kind> for View {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Orders => View::Orders,
            Kind::Items => View::Items,
        }
    }
}

pub struct Board {
    store: Mutex<LocalStore>,
    pub(crate) gateway: Arc<dyn RemoteGateway>,
    notifier: Arc<dyn Notifier>,
    connectivity: Arc<dyn Connectivity>,
    pub(crate) clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl Board {
    pub fn new(store: LocalStore, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            store: Mutex::new(store),
            gateway,
            notifier: Arc::new(NullNotifier),
            connectivity: Arc::new(ConnectivityFlag::default()),
            clock: Arc::new(SystemClock),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// ゲートウェイ呼び出し1回あたりの上限時間
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn store(&self) -> Result<MutexGuard<'_, LocalStore>> {
        self.store
            .lock()
            .map_err(|_| OappError::Storage("store lock poisoned".into()))
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// ゲートウェイ呼び出しにタイムアウトをかける（超過時は呼び出しを破棄）
    pub(crate) async fn call<T>(
        &self,
        fut: impl Future<Output = GatewayResult<T>>,
    ) -> GatewayResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.timeout.as_secs())),
        }
    }

    // --- 読み取り（コピーを返す） ---

    pub fn orders(&self) -> Result<Vec<Order>> {
        Ok(self.store()?.orders())
    }

    pub fn items(&self) -> Result<Vec<Item>> {
        Ok(self.store()?.items())
    }

    pub fn links(&self) -> Result<Vec<Link>> {
        Ok(self.store()?.links())
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(self.store()?.settings())
    }

    pub fn last_sync(&self, kind: Kind) -> Result<i64> {
        Ok(self.store()?.last_sync(kind))
    }

    // --- ローカル専用データ ---

    pub fn add_link(&self, title: &str, url: &str) -> Result<Link> {
        let now = self.clock.now_ms();
        let link = self.store()?.add_link(title, url, now)?;
        tracing::info!("リンク追加: {} ({})", link.title, link.id);
        Ok(link)
    }

    pub fn remove_link(&self, id: u64) -> Result<bool> {
        self.store()?.remove_link(id)
    }

    pub fn save_user_name(&self, name: &str) -> Result<()> {
        self.store()?.save_user_name(name)
    }

    pub fn save_chat_link(&self, link: &str) -> Result<()> {
        self.store()?.save_chat_link(link)
    }
}

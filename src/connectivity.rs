//! 接続状態（オンライン/オフライン）のシグナル

use std::sync::atomic::{AtomicBool, Ordering};

/// オンライン判定
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// 手動で切り替える接続フラグ
#[derive(Debug)]
pub struct ConnectivityFlag {
    online: AtomicBool,
}

impl ConnectivityFlag {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// 状態を更新し、変化があったかを返す
    pub fn set(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::SeqCst) != online
    }
}

impl Default for ConnectivityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

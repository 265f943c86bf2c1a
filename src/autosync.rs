//! 自動同期の判定
//!
//! バックグラウンドタイマーは持たない。起動時とタブ切り替え時にだけ
//! 最終同期からの経過時間を見て、古ければサイレント同期する。

use crate::board::{Board, View};
use crate::error::Result;
use crate::reconcile::SyncOutcome;
use oapp_common::Kind;

/// 自動同期の間隔（24時間）
pub const SYNC_INTERVAL_MS: i64 = 86_400_000;

/// 最終同期から間隔を「超えて」いればtrue（ちょうどはfalse）
pub fn should_autosync(last_sync_ms: i64, now_ms: i64) -> bool {
    now_ms - last_sync_ms > SYNC_INTERVAL_MS
}

impl Board {
    pub fn should_autosync(&self, kind: Kind) -> Result<bool> {
        let last = self.last_sync(kind)?;
        Ok(should_autosync(last, self.clock.now_ms()))
    }

    /// 起動時: 古いコレクションをサイレント同期
    pub async fn startup(&self) -> Result<Vec<(Kind, SyncOutcome)>> {
        let mut outcomes = Vec::new();
        for kind in Kind::ALL {
            if self.should_autosync(kind)? {
                tracing::info!("{}: 最終同期から24時間以上経過、自動同期", kind);
                outcomes.push((kind, self.reconcile(kind, true).await?));
            }
        }
        Ok(outcomes)
    }

    /// タブ切り替え時: そのビューのコレクションが古ければサイレント同期
    pub async fn activate_view(&self, view: View) -> Result<Option<SyncOutcome>> {
        let Some(kind) = view.kind() else {
            return Ok(None);
        };
        if !self.should_autosync(kind)? {
            return Ok(None);
        }
        tracing::info!("{}: タブ表示時の自動同期", kind);
        Ok(Some(self.reconcile(kind, true).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_synced_is_stale() {
        assert!(should_autosync(0, 1_700_000_000_000));
    }

    #[test]
    fn test_exact_interval_is_not_stale() {
        let last = 1_700_000_000_000;
        assert!(!should_autosync(last, last + SYNC_INTERVAL_MS));
        assert!(should_autosync(last, last + SYNC_INTERVAL_MS + 1));
    }

    #[test]
    fn test_recent_sync_is_fresh() {
        let last = 1_700_000_000_000;
        assert!(!should_autosync(last, last + 60_000));
    }
}

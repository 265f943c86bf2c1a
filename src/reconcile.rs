//! 同期（リモート取得結果でローカルのコレクションを置き換える）
//!
//! 置き換えの前に、未送信キューにある作成レコードは残し、
//! 未送信のステータス変更はサーバーのレコードに再適用する。

use crate::board::{Board, View};
use crate::error::Result;
use crate::gateway::parse_records;
use crate::notice::Notice;
use crate::outbox::{self, PendingOp};
use crate::store::StoredRecord;
use oapp_common::{Item, Kind, Order, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// オフラインのため何もしていない
    Offline,
    Replaced {
        stored: usize,
        /// 必須テキストが空・パース不能で除外した件数
        discarded: usize,
        /// 未送信のため残したローカルレコード数
        kept_pending: usize,
    },
    FormatError,
    TransportError,
}

impl SyncOutcome {
    pub fn is_replaced(&self) -> bool {
        matches!(self, SyncOutcome::Replaced { .. })
    }
}

/// 取得結果と未送信キューのマージ結果
#[derive(Debug, Clone, PartialEq)]
pub struct Merged<R> {
    pub records: Vec<R>,
    pub kept_pending: usize,
}

/// 取得したレコードに未送信分を重ねる
///
/// - キューにある作成レコードは先頭に残す（ローカルの並び順のまま）
/// - キューにあるステータス変更はサーバーの値より優先する。
///   サーバーが同じレーンを返した変更、サーバーに存在しないIDへの変更はキューから外す。
pub fn merge_fetched<R: Record>(
    fetched: Vec<R>,
    local: &[R],
    pending: &mut Vec<PendingOp>,
) -> Merged<R> {
    let creates = outbox::pending_creates(pending, R::KIND);
    let statuses = outbox::pending_statuses(pending, R::KIND);

    let mut records: Vec<R> = local
        .iter()
        .filter(|r| r.is_local_pending() && creates.contains(r.id()))
        .cloned()
        .collect();
    let kept_pending = records.len();

    for mut record in fetched {
        if let Some(&lane) = statuses.get(record.id()) {
            if record.status() == lane {
                outbox::clear_status_update(pending, R::KIND, record.id());
            } else {
                record.set_status(lane);
            }
        }
        records.push(record);
    }

    for id in statuses.keys() {
        if !records.iter().any(|r| r.id() == id) {
            tracing::info!("{}: サーバーに存在しない {} への変更を破棄", R::KIND, id);
            outbox::clear_status_update(pending, R::KIND, id);
        }
    }

    Merged {
        records,
        kept_pending,
    }
}

impl Board {
    /// コレクションを同期する
    ///
    /// `silent` の場合は通知を出さない。画面の再描画は呼び出し側で行う。
    /// 通信・フォーマットのエラーは通知と戻り値に変換され、ストアは変更されない。
    pub async fn reconcile(&self, kind: Kind, silent: bool) -> Result<SyncOutcome> {
        match kind {
            Kind::Orders => self.reconcile_collection::<Order>(silent).await,
            Kind::Items => self.reconcile_collection::<Item>(silent).await,
        }
    }

    pub(crate) async fn reconcile_collection<R: StoredRecord>(
        &self,
        silent: bool,
    ) -> Result<SyncOutcome> {
        let kind = R::KIND;
        if !self.is_online() {
            if !silent {
                self.notify(Notice::ShowingLocalData);
            }
            return Ok(SyncOutcome::Offline);
        }

        if !silent {
            self.notify(Notice::Refreshing(kind));
        }

        let envelope = match self.call(self.gateway.fetch(kind)).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("{}: 同期エラー: {}", kind, e);
                if !silent {
                    self.notify(Notice::SyncError);
                }
                return Ok(SyncOutcome::TransportError);
            }
        };
        tracing::debug!("{}: 取得 {:?}", kind, envelope);

        let parsed = match parse_records::<R>(envelope) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("{}: 不正なフォーマット: {}", kind, e);
                if !silent {
                    self.notify(Notice::FormatError);
                }
                return Ok(SyncOutcome::FormatError);
            }
        };

        let received = parsed.records.len();
        let clean: Vec<R> = parsed.records.into_iter().filter(|r| r.is_valid()).collect();
        let discarded = received - clean.len() + parsed.unparsable;
        let synced_at = self.clock.now_ms();

        let (stored, kept_pending) = {
            let mut store = self.store()?;
            let mut pending = store.pending();
            let merged = merge_fetched(clean, &store.records::<R>(), &mut pending);
            let counts = (merged.records.len(), merged.kept_pending);
            store.commit_sync(merged.records, synced_at, pending)?;
            counts
        };

        tracing::info!(
            "{}: 同期完了 (保存 {}件, 除外 {}件, 未送信 {}件)",
            kind,
            stored,
            discarded,
            kept_pending
        );
        if !silent {
            self.notify(Notice::Updated(kind));
        }

        Ok(SyncOutcome::Replaced {
            stored,
            discarded,
            kept_pending,
        })
    }

    /// 未送信キューを再送してから同期する（手動の更新ボタン相当）
    pub async fn sync(&self, kind: Kind, silent: bool) -> Result<SyncOutcome> {
        self.flush_pending(kind).await?;
        self.reconcile(kind, silent).await
    }

    /// 表示中ビューのコレクションを同期（ドキュメントビューでは何もしない）
    pub async fn sync_current_view(&self, view: View, silent: bool) -> Result<Option<SyncOutcome>> {
        match view.kind() {
            Some(kind) => Ok(Some(self.sync(kind, silent).await?)),
            None => Ok(None),
        }
    }

    /// 接続状態の変化を処理する
    ///
    /// オンライン復帰時は表示中ビューを同期する。
    pub async fn connectivity_changed(&self, view: View) -> Result<Option<SyncOutcome>> {
        if self.is_online() {
            tracing::info!("オンラインに復帰");
            self.notify(Notice::ConnectionRestored);
            self.sync_current_view(view, false).await
        } else {
            tracing::info!("オフラインに移行");
            self.notify(Notice::ConnectionLost);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oapp_common::{Lane, NewOrder};

    fn order(id: &str, status: Lane) -> Order {
        Order {
            id: id.to_string(),
            status,
            subject: format!("Zamówienie {}", id),
            quantity: None,
            producer: None,
            author: None,
        }
    }

    fn create_op(local_id: &str) -> PendingOp {
        PendingOp::CreateOrder {
            local_id: local_id.to_string(),
            fields: NewOrder {
                subject: "X".to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_merge_without_pending_is_replace() {
        let local = vec![order("local-1", Lane::New), order("1", Lane::Done)];
        let fetched = vec![order("1", Lane::New), order("2", Lane::New)];
        let mut pending = Vec::new();

        let merged = merge_fetched(fetched.clone(), &local, &mut pending);
        assert_eq!(merged.records, fetched);
        assert_eq!(merged.kept_pending, 0);
    }

    #[test]
    fn test_merge_keeps_pending_creates_on_top() {
        let local = vec![order("local-2", Lane::New), order("local-1", Lane::InProgress)];
        let fetched = vec![order("9", Lane::New)];
        let mut pending = vec![create_op("local-1"), create_op("local-2")];

        let merged = merge_fetched(fetched, &local, &mut pending);
        let ids: Vec<&str> = merged.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["local-2", "local-1", "9"]);
        assert_eq!(merged.kept_pending, 2);
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn test_merge_reapplies_pending_status() {
        let fetched = vec![order("5", Lane::New), order("6", Lane::New)];
        let mut pending = Vec::new();
        outbox::queue_status_update(&mut pending, Kind::Orders, "5", Lane::Done);
        outbox::queue_status_update(&mut pending, Kind::Orders, "6", Lane::New);
        outbox::queue_status_update(&mut pending, Kind::Orders, "404", Lane::Done);

        let merged = merge_fetched(fetched, &[], &mut pending);
        assert_eq!(merged.records[0].status, Lane::Done);
        assert_eq!(merged.records[1].status, Lane::New);

        // "6"はサーバーが追いついた、"404"は存在しない → キューから外れる
        let left = outbox::pending_statuses(&pending, Kind::Orders);
        assert_eq!(left.len(), 1);
        assert_eq!(left.get("5"), Some(&Lane::Done));
    }
}

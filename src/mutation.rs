//! 楽観的な変更（ステータス変更・新規作成）
//!
//! ローカルストアへの保存を先に確定させ、その後でリモートへの反映を試みる。
//! リモートが失敗してもローカルの変更は取り消さない（未送信キューに残る）。

use crate::board::Board;
use crate::error::Result;
use crate::gateway::{check_ack, GatewayResult};
use crate::notice::Notice;
use crate::outbox::{self, PendingOp};
use crate::store::StoredRecord;
use oapp_common::{Item, Kind, Lane, NewItem, NewOrder, Order, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    NotFound,
    /// 既に同じレーン（書き込み・通信なし）
    Unchanged,
    /// ローカル保留レコードのためローカルのみ
    LocalOnly,
    Synced,
    /// リモート失敗、ローカルの変更は維持
    Degraded,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// 必須項目が空
    Rejected,
    Synced { local_id: String },
    Degraded { local_id: String },
    Offline { local_id: String },
}

impl CreateOutcome {
    pub fn local_id(&self) -> Option<&str> {
        match self {
            CreateOutcome::Rejected => None,
            CreateOutcome::Synced { local_id }
            | CreateOutcome::Degraded { local_id }
            | CreateOutcome::Offline { local_id } => Some(local_id),
        }
    }
}

/// 未送信キューの再送結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub sent: usize,
    /// サーバーに拒否されてキューから外した件数
    pub dropped: usize,
    /// 送れずに残った件数
    pub remaining: usize,
}

/// 新規作成フォームの入力
trait Draft: Clone + Send + Sync {
    type Output: StoredRecord;

    fn required_text(&self) -> &str;
    fn author_mut(&mut self) -> &mut Option<String>;
    fn to_record(&self, id: String) -> Self::Output;
    fn to_pending(&self, local_id: &str) -> PendingOp;
}

impl Draft for NewOrder {
    type Output = Order;

    fn required_text(&self) -> &str {
        &self.subject
    }

    fn author_mut(&mut self) -> &mut Option<String> {
        &mut self.author
    }

    fn to_record(&self, id: String) -> Order {
        NewOrder::to_record(self, id)
    }

    fn to_pending(&self, local_id: &str) -> PendingOp {
        PendingOp::CreateOrder {
            local_id: local_id.to_string(),
            fields: self.clone(),
        }
    }
}

impl Draft for NewItem {
    type Output = Item;

    fn required_text(&self) -> &str {
        &self.description
    }

    fn author_mut(&mut self) -> &mut Option<String> {
        &mut self.author
    }

    fn to_record(&self, id: String) -> Item {
        NewItem::to_record(self, id)
    }

    fn to_pending(&self, local_id: &str) -> PendingOp {
        PendingOp::CreateItem {
            local_id: local_id.to_string(),
            fields: self.clone(),
        }
    }
}

impl Board {
    /// レコードのステータスを変更する
    ///
    /// ローカル保存はネットワーク呼び出しより前に必ず完了する。
    ///
    /// `local-` レコードの変更はローカルのみでキューにも積まない。
    /// 作成の応答はサーバーIDを返さないため、作成が届いた後の同期で
    /// レコードはサーバー側のレーン（Nowe）に戻る。
    pub async fn set_status(&self, kind: Kind, id: &str, status: Lane) -> Result<StatusOutcome> {
        match kind {
            Kind::Orders => self.set_status_in::<Order>(id, status).await,
            Kind::Items => self.set_status_in::<Item>(id, status).await,
        }
    }

    async fn set_status_in<R: StoredRecord>(
        &self,
        id: &str,
        status: Lane,
    ) -> Result<StatusOutcome> {
        let kind = R::KIND;
        tracing::info!("{} {} → {}", kind, id, status);

        let is_local = {
            let mut store = self.store()?;
            let mut records = store.records::<R>();
            let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
                tracing::warn!("{}: {} が見つかりません", kind, id);
                return Ok(StatusOutcome::NotFound);
            };
            if record.status() == status {
                return Ok(StatusOutcome::Unchanged);
            }

            record.set_status(status);
            let is_local = record.is_local_pending();

            let mut pending = store.pending();
            if !is_local {
                outbox::queue_status_update(&mut pending, kind, id, status);
            }
            store.save_with_pending(records, pending)?;
            is_local
        };

        if is_local {
            self.notify(Notice::LocalOnlyStatus);
            return Ok(StatusOutcome::LocalOnly);
        }

        if !self.is_online() {
            self.notify(Notice::StatusOffline);
            return Ok(StatusOutcome::Offline);
        }

        let result = self
            .call(self.gateway.update_status(kind, id, status))
            .await
            .and_then(check_ack);

        match result {
            Ok(()) => {
                {
                    let mut store = self.store()?;
                    let mut pending = store.pending();
                    outbox::settle_status_update(&mut pending, kind, id, status);
                    store.save_pending(pending)?;
                }
                self.notify(Notice::StatusSynced);
                Ok(StatusOutcome::Synced)
            }
            Err(e) => {
                tracing::error!("{}: ステータス更新失敗 ({}): {}", kind, id, e);
                self.notify(Notice::StatusFailed);
                Ok(StatusOutcome::Degraded)
            }
        }
    }

    /// 発注を作成する
    pub async fn create_order(&self, fields: NewOrder) -> Result<CreateOutcome> {
        self.create_record(fields).await
    }

    /// 質問を作成する
    pub async fn create_item(&self, fields: NewItem) -> Result<CreateOutcome> {
        self.create_record(fields).await
    }

    async fn create_record<D: Draft>(&self, mut draft: D) -> Result<CreateOutcome> {
        let kind = <D::Output as Record>::KIND;
        if draft.required_text().trim().is_empty() {
            return Ok(CreateOutcome::Rejected);
        }

        let (local_id, op) = {
            let mut store = self.store()?;

            let author = draft.author_mut();
            if author.as_deref().map_or(true, |a| a.trim().is_empty()) {
                let user_name = store.user_name();
                *author = (!user_name.is_empty()).then_some(user_name);
            }

            let mut records = store.records::<D::Output>();
            let mut now = self.clock.now_ms();
            let mut id = oapp_common::local_id(now);
            while records.iter().any(|r| r.id() == id) {
                now += 1;
                id = oapp_common::local_id(now);
            }

            records.insert(0, draft.to_record(id.clone()));
            let op = draft.to_pending(&id);
            let mut pending = store.pending();
            pending.push(op.clone());
            store.save_with_pending(records, pending)?;
            (id, op)
        };
        tracing::info!("{}: ローカルに作成 {}", kind, local_id);

        if !self.is_online() {
            self.notify(Notice::SavedOffline);
            return Ok(CreateOutcome::Offline { local_id });
        }

        self.notify(Notice::Sending);
        match self.send_pending(&op).await? {
            Ok(()) => {
                self.notify(Notice::Added);
                // サーバーIDのレコードに置き換える
                self.reconcile_collection::<D::Output>(true).await?;
                Ok(CreateOutcome::Synced { local_id })
            }
            Err(e) => {
                tracing::error!("{}: 送信失敗 ({}): {}", kind, local_id, e);
                self.notify(Notice::SendFailed);
                Ok(CreateOutcome::Degraded { local_id })
            }
        }
    }

    /// キューの1操作を送信し、成功したらキューから外す
    async fn send_pending(&self, op: &PendingOp) -> Result<GatewayResult<()>> {
        let result = match op {
            PendingOp::CreateOrder { fields, .. } => {
                self.call(self.gateway.add_order(fields)).await
            }
            PendingOp::CreateItem { fields, .. } => self.call(self.gateway.add_item(fields)).await,
            PendingOp::StatusUpdate { kind, id, status } => {
                self.call(self.gateway.update_status(*kind, id, *status)).await
            }
        }
        .and_then(check_ack);

        if result.is_ok() {
            let mut store = self.store()?;
            let mut pending = store.pending();
            match op {
                PendingOp::StatusUpdate { kind, id, status } => {
                    outbox::settle_status_update(&mut pending, *kind, id, *status)
                }
                _ => {
                    if let Some(local_id) = op.local_id() {
                        outbox::remove_create(&mut pending, local_id);
                    }
                }
            }
            store.save_pending(pending)?;
        }

        Ok(result)
    }

    /// 未送信キューのうち指定コレクションの操作を順に再送する
    ///
    /// 通信の失敗で止める（順序を崩さないため）。サーバーが拒否した操作は
    /// 再送しても通らないので捨てて次へ進む。
    pub async fn flush_pending(&self, kind: Kind) -> Result<FlushReport> {
        let ops: Vec<PendingOp> = self
            .store()?
            .pending()
            .into_iter()
            .filter(|op| op.kind() == kind)
            .collect();

        let mut report = FlushReport {
            remaining: ops.len(),
            ..Default::default()
        };
        if ops.is_empty() || !self.is_online() {
            return Ok(report);
        }

        for op in &ops {
            match self.send_pending(op).await? {
                Ok(()) => report.sent += 1,
                Err(e) if e.is_format() => {
                    tracing::warn!("{}: サーバーが拒否した操作を破棄: {:?}: {}", kind, op, e);
                    self.discard_pending(op)?;
                    self.notify(Notice::PendingRejected);
                    report.dropped += 1;
                }
                Err(e) => {
                    tracing::warn!("{}: 再送失敗、残り{}件: {}", kind, report.remaining, e);
                    break;
                }
            }
            report.remaining -= 1;
        }

        if report.sent > 0 {
            tracing::info!("{}: 未送信 {}件を再送", kind, report.sent);
            self.notify(Notice::PendingFlushed(report.sent));
        }

        Ok(report)
    }

    /// 拒否された操作をキューから外す（作成ならローカルレコードも消す）
    fn discard_pending(&self, op: &PendingOp) -> Result<()> {
        let mut store = self.store()?;
        let mut pending = store.pending();
        match op {
            PendingOp::StatusUpdate { kind, id, .. } => {
                outbox::clear_status_update(&mut pending, *kind, id);
                store.save_pending(pending)
            }
            PendingOp::CreateOrder { local_id, .. } => {
                outbox::remove_create(&mut pending, local_id);
                let mut records = store.records::<Order>();
                records.retain(|r| r.id() != local_id);
                store.save_with_pending(records, pending)
            }
            PendingOp::CreateItem { local_id, .. } => {
                outbox::remove_create(&mut pending, local_id);
                let mut records = store.records::<Item>();
                records.retain(|r| r.id() != local_id);
                store.save_with_pending(records, pending)
            }
        }
    }

    /// 指定コレクションの未送信操作
    pub fn pending(&self, kind: Kind) -> Result<Vec<PendingOp>> {
        Ok(self
            .store()?
            .pending()
            .into_iter()
            .filter(|op| op.kind() == kind)
            .collect())
    }
}

//! 未送信操作のキュー（アウトボックス）
//!
//! 作成・ステータス変更がリモートに届くまでここに残る。
//! 同期時にこのキューにあるレコードは上書きされない。

use oapp_common::{Kind, Lane, NewItem, NewOrder};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PendingOp {
    #[serde(rename_all = "camelCase")]
    CreateOrder { local_id: String, fields: NewOrder },

    #[serde(rename_all = "camelCase")]
    CreateItem { local_id: String, fields: NewItem },

    StatusUpdate { kind: Kind, id: String, status: Lane },
}

impl PendingOp {
    pub fn kind(&self) -> Kind {
        match self {
            PendingOp::CreateOrder { .. } => Kind::Orders,
            PendingOp::CreateItem { .. } => Kind::Items,
            PendingOp::StatusUpdate { kind, .. } => *kind,
        }
    }

    /// 作成操作ならローカルID
    pub fn local_id(&self) -> Option<&str> {
        match self {
            PendingOp::CreateOrder { local_id, .. } | PendingOp::CreateItem { local_id, .. } => {
                Some(local_id)
            }
            PendingOp::StatusUpdate { .. } => None,
        }
    }
}

/// ステータス変更を積む（同じレコードへの古い変更は置き換える）
pub fn queue_status_update(ops: &mut Vec<PendingOp>, kind: Kind, id: &str, status: Lane) {
    ops.retain(|op| !is_status_update_for(op, kind, id));
    ops.push(PendingOp::StatusUpdate {
        kind,
        id: id.to_string(),
        status,
    });
}

/// 指定レコードのステータス変更を取り除く
pub fn clear_status_update(ops: &mut Vec<PendingOp>, kind: Kind, id: &str) {
    ops.retain(|op| !is_status_update_for(op, kind, id));
}

/// 送信済みのステータス変更を取り除く（後から別のレーンに変わっていれば残す）
pub fn settle_status_update(ops: &mut Vec<PendingOp>, kind: Kind, id: &str, status: Lane) {
    ops.retain(|op| {
        !matches!(op, PendingOp::StatusUpdate { kind: k, id: i, status: s }
            if *k == kind && i == id && *s == status)
    });
}

/// 作成操作を取り除く（送信成功時）
pub fn remove_create(ops: &mut Vec<PendingOp>, local_id: &str) {
    ops.retain(|op| op.local_id() != Some(local_id));
}

/// 未送信の作成操作のローカルID
pub fn pending_creates(ops: &[PendingOp], kind: Kind) -> HashSet<String> {
    ops.iter()
        .filter(|op| op.kind() == kind)
        .filter_map(|op| op.local_id().map(str::to_string))
        .collect()
}

/// 未送信のステータス変更（ID → レーン）
pub fn pending_statuses(ops: &[PendingOp], kind: Kind) -> HashMap<String, Lane> {
    ops.iter()
        .filter_map(|op| match op {
            PendingOp::StatusUpdate { kind: k, id, status } if *k == kind => {
                Some((id.clone(), *status))
            }
            _ => None,
        })
        .collect()
}

fn is_status_update_for(op: &PendingOp, kind: Kind, id: &str) -> bool {
    matches!(op, PendingOp::StatusUpdate { kind: k, id: i, .. } if *k == kind && i == id)
}

//! ローカルストア
//!
//! 発注・質問・リンク・設定・最終同期時刻・未送信キューを
//! 1つのJSONファイルに保存する。書き込みは常にコレクション全体の上書き。

use crate::error::{OappError, Result};
use crate::outbox::PendingOp;
use oapp_common::{Item, Kind, Link, Order, Record, Settings};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// ストアファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreData {
    /// バージョン（互換性チェック用）
    version: u32,
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    last_sync_orders: i64,
    #[serde(default)]
    last_sync_items: i64,
    #[serde(default)]
    pending: Vec<PendingOp>,
}

impl StoreData {
    const CURRENT_VERSION: u32 = 1;
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            orders: Vec::new(),
            items: Vec::new(),
            links: Vec::new(),
            settings: Settings::default(),
            last_sync_orders: 0,
            last_sync_items: 0,
            pending: Vec::new(),
        }
    }
}

/// ストア内のコレクションへのアクセス
pub trait StoredRecord: Record {
    fn collection(data: &StoreData) -> &Vec<Self>;
    fn collection_mut(data: &mut StoreData) -> &mut Vec<Self>;
}

impl StoredRecord for Order {
    fn collection(data: &StoreData) -> &Vec<Self> {
        &data.orders
    }

    fn collection_mut(data: &mut StoreData) -> &mut Vec<Self> {
        &mut data.orders
    }
}

impl StoredRecord for Item {
    fn collection(data: &StoreData) -> &Vec<Self> {
        &data.items
    }

    fn collection_mut(data: &mut StoreData) -> &mut Vec<Self> {
        &mut data.items
    }
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Noneはメモリのみ（永続化しない）
    path: Option<PathBuf>,
    data: StoreData,
}

impl LocalStore {
    /// ストアファイルを開く（無い・壊れている・バージョン違いは空で開始）
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = Self::read_file(&path);
        Self {
            path: Some(path),
            data,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: StoreData::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read_file(path: &Path) -> StoreData {
        if !path.exists() {
            return StoreData::default();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("ストアを開けません ({}): {}", path.display(), e);
                return StoreData::default();
            }
        };

        match serde_json::from_reader::<_, StoreData>(BufReader::new(file)) {
            Ok(data) if data.version == StoreData::CURRENT_VERSION => data,
            Ok(data) => {
                tracing::warn!("ストアのバージョン不一致 ({})、空で開始します", data.version);
                StoreData::default()
            }
            Err(e) => {
                tracing::warn!("ストアが破損しています ({}): {}", path.display(), e);
                StoreData::default()
            }
        }
    }

    /// 一時ファイルに書いてからリネーム
    fn persist(&self, data: &StoreData) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let tmp_path = path.with_extension("json.tmp");
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, data)?;
            writer.flush()?;
            drop(writer);
            std::fs::rename(&tmp_path, path)
        };

        write().map_err(|e| OappError::Storage(format!("{}: {}", path.display(), e)))
    }

    /// 変更をコピーに適用し、保存できた場合のみ確定する
    fn update<T>(&mut self, f: impl FnOnce(&mut StoreData) -> T) -> Result<T> {
        let mut next = self.data.clone();
        let out = f(&mut next);
        self.persist(&next)?;
        self.data = next;
        Ok(out)
    }

    // --- レコード ---

    pub fn records<R: StoredRecord>(&self) -> Vec<R> {
        R::collection(&self.data).clone()
    }

    pub fn save_records<R: StoredRecord>(&mut self, records: Vec<R>) -> Result<()> {
        self.update(|data| *R::collection_mut(data) = records)
    }

    pub fn orders(&self) -> Vec<Order> {
        self.records()
    }

    pub fn save_orders(&mut self, orders: Vec<Order>) -> Result<()> {
        self.save_records(orders)
    }

    pub fn items(&self) -> Vec<Item> {
        self.records()
    }

    pub fn save_items(&mut self, items: Vec<Item>) -> Result<()> {
        self.save_records(items)
    }

    // --- 最終同期時刻 ---

    pub fn last_sync(&self, kind: Kind) -> i64 {
        match kind {
            Kind::Orders => self.data.last_sync_orders,
            Kind::Items => self.data.last_sync_items,
        }
    }

    pub fn set_last_sync(&mut self, kind: Kind, ms: i64) -> Result<()> {
        self.update(|data| match kind {
            Kind::Orders => data.last_sync_orders = ms,
            Kind::Items => data.last_sync_items = ms,
        })
    }

    pub fn last_sync_orders(&self) -> i64 {
        self.last_sync(Kind::Orders)
    }

    pub fn set_last_sync_orders(&mut self, ms: i64) -> Result<()> {
        self.set_last_sync(Kind::Orders, ms)
    }

    pub fn last_sync_items(&self) -> i64 {
        self.last_sync(Kind::Items)
    }

    pub fn set_last_sync_items(&mut self, ms: i64) -> Result<()> {
        self.set_last_sync(Kind::Items, ms)
    }

    /// 同期結果をまとめて書き込む（コレクション・同期時刻・キュー）
    pub fn commit_sync<R: StoredRecord>(
        &mut self,
        records: Vec<R>,
        synced_at: i64,
        pending: Vec<PendingOp>,
    ) -> Result<()> {
        self.update(|data| {
            *R::collection_mut(data) = records;
            match R::KIND {
                Kind::Orders => data.last_sync_orders = synced_at,
                Kind::Items => data.last_sync_items = synced_at,
            }
            data.pending = pending;
        })
    }

    // --- リンク ---

    pub fn links(&self) -> Vec<Link> {
        self.data.links.clone()
    }

    /// リンクを追加（IDは `now_ms` ベースで単調増加）
    pub fn add_link(&mut self, title: &str, url: &str, now_ms: i64) -> Result<Link> {
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() || url.is_empty() {
            return Err(OappError::InvalidLink);
        }

        let now = now_ms.max(0) as u64;
        let next_id = self
            .data
            .links
            .iter()
            .map(|l| l.id + 1)
            .max()
            .map_or(now, |min_id| min_id.max(now));

        let link = Link {
            id: next_id,
            title: title.to_string(),
            url: url.to_string(),
        };
        let added = link.clone();
        self.update(|data| data.links.push(link))?;
        Ok(added)
    }

    /// リンクを削除（存在した場合true）
    pub fn remove_link(&mut self, id: u64) -> Result<bool> {
        if !self.data.links.iter().any(|l| l.id == id) {
            return Ok(false);
        }
        self.update(|data| data.links.retain(|l| l.id != id))?;
        Ok(true)
    }

    // --- 設定 ---

    pub fn settings(&self) -> Settings {
        self.data.settings.clone()
    }

    pub fn user_name(&self) -> String {
        self.data.settings.user_name.clone()
    }

    pub fn save_user_name(&mut self, name: &str) -> Result<()> {
        let name = name.trim().to_string();
        self.update(|data| data.settings.user_name = name)
    }

    pub fn chat_link(&self) -> String {
        self.data.settings.chat_link.clone()
    }

    /// チャットリンクを保存（httpで始まらないものは拒否）
    pub fn save_chat_link(&mut self, link: &str) -> Result<()> {
        let link = link.trim();
        if !link.starts_with("http") {
            return Err(OappError::InvalidChatLink(link.to_string()));
        }
        let link = link.to_string();
        self.update(|data| data.settings.chat_link = link)
    }

    // --- 未送信キュー ---

    pub fn pending(&self) -> Vec<PendingOp> {
        self.data.pending.clone()
    }

    pub fn save_pending(&mut self, pending: Vec<PendingOp>) -> Result<()> {
        self.update(|data| data.pending = pending)
    }

    /// コレクションとキューをまとめて書き込む
    pub fn save_with_pending<R: StoredRecord>(
        &mut self,
        records: Vec<R>,
        pending: Vec<PendingOp>,
    ) -> Result<()> {
        self.update(|data| {
            *R::collection_mut(data) = records;
            data.pending = pending;
        })
    }
}

//! カンバンのレコード型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - Lane / Priority: 固定の列挙値（ワイヤ上はポーランド語ラベル）
//! - Order: 発注（zapotrzebowanie）
//! - Item: 質問（pytanie）
//! - Link / Settings: ローカル専用データ

use crate::error::Error;
use crate::wire::{de_id, de_opt_text, de_text};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// ローカル生成IDの接頭辞（未同期レコード）
pub const LOCAL_ID_PREFIX: &str = "local-";

/// ローカル保留IDを生成 (`local-<epoch ms>`)
pub fn local_id(now_ms: i64) -> String {
    format!("{}{}", LOCAL_ID_PREFIX, now_ms)
}

/// カンバンのレーン（3列固定）
///
/// シリアライズ値は既存バックエンドと完全一致させること。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    #[serde(rename = "Nowe")]
    New,
    #[serde(rename = "W toku")]
    InProgress,
    #[serde(rename = "Zrealizowane")]
    Done,
}

impl Lane {
    /// ボードの列順
    pub const ALL: [Lane; 3] = [Lane::New, Lane::InProgress, Lane::Done];

    /// ワイヤ/画面表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            Lane::New => "Nowe",
            Lane::InProgress => "W toku",
            Lane::Done => "Zrealizowane",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Lane {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nowe" | "new" | "n" => Ok(Lane::New),
            "w toku" | "in-progress" | "inprogress" | "progress" | "w" => Ok(Lane::InProgress),
            "zrealizowane" | "done" | "z" => Ok(Lane::Done),
            _ => Err(Error::InvalidLane(s.to_string())),
        }
    }
}

/// 質問の優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Priority {
    #[serde(rename = "Niski")]
    Low,
    #[serde(rename = "Średni")]
    #[default]
    Medium,
    #[serde(rename = "Wysoki")]
    High,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Niski",
            Priority::Medium => "Średni",
            Priority::High => "Wysoki",
        }
    }

    /// 不明な値は既定（Średni）に倒す
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "niski" | "low" => Priority::Low,
            "wysoki" | "high" => Priority::High,
            _ => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Priority::from_label(s))
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = de_opt_text(deserializer)?;
        Ok(raw.map(|s| Priority::from_label(&s)).unwrap_or_default())
    }
}

/// コレクションの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Orders,
    Items,
}

impl Kind {
    pub const ALL: [Kind; 2] = [Kind::Orders, Kind::Items];
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Orders => write!(f, "orders"),
            Kind::Items => write!(f, "items"),
        }
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "orders" | "order" | "o" => Ok(Kind::Orders),
            "items" | "item" | "i" => Ok(Kind::Items),
            _ => Err(Error::Parse(format!("unknown collection: {}", s))),
        }
    }
}

/// OrderとItemの共通インターフェース
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: Kind;

    fn id(&self) -> &str;
    fn status(&self) -> Lane;
    fn set_status(&mut self, lane: Lane);

    /// 必須テキスト（Orderはsubject、Itemはdescription）
    fn required_text(&self) -> &str;

    /// 必須テキストが空白のみでないこと
    fn is_valid(&self) -> bool {
        !self.required_text().trim().is_empty()
    }

    /// サーバー未確認のローカルレコードか
    fn is_local_pending(&self) -> bool {
        self.id().starts_with(LOCAL_ID_PREFIX)
    }
}

/// 発注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    pub status: Lane,

    #[serde(rename = "co", default, deserialize_with = "de_text")]
    pub subject: String,

    #[serde(
        rename = "ilosc",
        default,
        deserialize_with = "de_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<String>,

    #[serde(
        rename = "producent",
        default,
        deserialize_with = "de_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub producer: Option<String>,

    #[serde(
        rename = "autor",
        default,
        deserialize_with = "de_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<String>,
}

impl Record for Order {
    const KIND: Kind = Kind::Orders;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Lane {
        self.status
    }

    fn set_status(&mut self, lane: Lane) {
        self.status = lane;
    }

    fn required_text(&self) -> &str {
        &self.subject
    }
}

/// 質問
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    pub status: Lane,

    #[serde(rename = "opis", default, deserialize_with = "de_text")]
    pub description: String,

    #[serde(rename = "priorytet", default)]
    pub priority: Priority,

    #[serde(
        rename = "termin_odpowiedzi",
        default,
        deserialize_with = "de_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_deadline: Option<String>,

    #[serde(
        rename = "autor",
        default,
        deserialize_with = "de_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<String>,

    #[serde(
        rename = "odpowiedz",
        default,
        deserialize_with = "de_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub answer: Option<String>,
}

impl Record for Item {
    const KIND: Kind = Kind::Items;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Lane {
        self.status
    }

    fn set_status(&mut self, lane: Lane) {
        self.status = lane;
    }

    fn required_text(&self) -> &str {
        &self.description
    }
}

/// 新規発注フォームの入力（addOrderの送信内容）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(rename = "co")]
    pub subject: String,

    #[serde(rename = "ilosc", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,

    #[serde(rename = "producent", default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,

    #[serde(rename = "autor", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl NewOrder {
    /// 楽観的に追加するローカルレコードを生成（レーンは常にNowe）
    pub fn to_record(&self, id: String) -> Order {
        Order {
            id,
            status: Lane::New,
            subject: self.subject.clone(),
            quantity: self.quantity.clone(),
            producer: self.producer.clone(),
            author: self.author.clone(),
        }
    }
}

/// 新規質問フォームの入力（addItemの送信内容）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(rename = "opis")]
    pub description: String,

    #[serde(rename = "priorytet", default)]
    pub priority: Priority,

    #[serde(rename = "termin_odpowiedzi", default, skip_serializing_if = "Option::is_none")]
    pub response_deadline: Option<String>,

    #[serde(rename = "autor", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl NewItem {
    pub fn to_record(&self, id: String) -> Item {
        Item {
            id,
            status: Lane::New,
            description: self.description.clone(),
            priority: self.priority,
            response_deadline: self.response_deadline.clone(),
            author: self.author.clone(),
            answer: None,
        }
    }
}

/// ドキュメント用リンク（ローカル専用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: u64,
    pub title: String,
    pub url: String,
}

/// ユーザー設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub chat_link: String,
    pub user_name: String,
}

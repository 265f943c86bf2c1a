use clap::{Parser, Subcommand};
use oapp_common::{Kind, Lane, Priority};

#[derive(Parser)]
#[command(name = "oapp")]
#[command(about = "オフラインファーストのカンバン（発注・質問）トラッカー", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// オフラインとして動作（リモートAPIを呼ばない）
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ボードを表示（古ければ自動同期）
    Board {
        /// コレクション (orders/items)、省略時は両方（起動時の自動同期）
        kind: Option<Kind>,
    },

    /// 手動同期（未送信の変更を再送してから取得）
    Sync {
        /// コレクション (orders/items/all)
        #[arg(default_value = "all")]
        target: SyncTarget,
    },

    /// 発注を追加
    AddOrder {
        /// 品目（必須）
        #[arg(short, long)]
        subject: String,

        /// 数量
        #[arg(short, long)]
        quantity: Option<String>,

        /// メーカー
        #[arg(short, long)]
        producer: Option<String>,

        /// 作成者（省略時は設定のユーザー名）
        #[arg(short, long)]
        author: Option<String>,
    },

    /// 質問を追加
    AddItem {
        /// 内容（必須）
        #[arg(short, long)]
        description: String,

        /// 優先度 (Niski/Średni/Wysoki)
        #[arg(short, long, default_value = "Średni")]
        priority: Priority,

        /// 回答期限
        #[arg(long)]
        deadline: Option<String>,

        /// 作成者（省略時は設定のユーザー名）
        #[arg(short, long)]
        author: Option<String>,
    },

    /// ステータスを変更
    Move {
        /// コレクション (orders/items)
        kind: Kind,

        /// レコードID
        id: String,

        /// 移動先レーン (Nowe/"W toku"/Zrealizowane, new/in-progress/done)
        lane: Lane,
    },

    /// ドキュメントリンク管理
    Links {
        #[command(subcommand)]
        action: Option<LinkAction>,
    },

    /// ユーザー設定を表示/編集
    Settings {
        /// ユーザー名（新規作成時の作成者の既定値）
        #[arg(long)]
        user_name: Option<String>,

        /// チャットリンク（httpで始まること）
        #[arg(long)]
        chat_link: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// APIのURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 未送信の変更を表示
    Pending {
        /// コレクション（省略時は両方）
        kind: Option<Kind>,
    },
}

#[derive(Subcommand)]
pub enum LinkAction {
    /// 一覧
    List,

    /// 追加（省略した項目は対話入力）
    Add {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        url: Option<String>,
    },

    /// 削除
    Remove {
        id: u64,

        /// 確認をスキップ
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncTarget {
    Orders,
    Items,
    #[default]
    All,
}

impl SyncTarget {
    pub fn kinds(&self) -> Vec<Kind> {
        match self {
            SyncTarget::Orders => vec![Kind::Orders],
            SyncTarget::Items => vec![Kind::Items],
            SyncTarget::All => Kind::ALL.to_vec(),
        }
    }
}

impl std::str::FromStr for SyncTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orders" | "order" | "o" => Ok(SyncTarget::Orders),
            "items" | "item" | "i" => Ok(SyncTarget::Items),
            "all" | "a" => Ok(SyncTarget::All),
            _ => Err(format!("Unknown target: {}. Use orders, items, or all", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        let cli = Cli::try_parse_from(["oapp", "move", "items", "12", "W toku"]).unwrap();
        match cli.command {
            Commands::Move { kind, id, lane } => {
                assert_eq!(kind, Kind::Items);
                assert_eq!(id, "12");
                assert_eq!(lane, Lane::InProgress);
            }
            _ => panic!("moveとして解釈されていない"),
        }
    }

    #[test]
    fn test_parse_add_item_default_priority() {
        let cli = Cli::try_parse_from(["oapp", "--offline", "add-item", "-d", "Need X"]).unwrap();
        assert!(cli.offline);
        match cli.command {
            Commands::AddItem { description, priority, .. } => {
                assert_eq!(description, "Need X");
                assert_eq!(priority, Priority::Medium);
            }
            _ => panic!("add-itemとして解釈されていない"),
        }
    }

    #[test]
    fn test_parse_board_without_kind() {
        let cli = Cli::try_parse_from(["oapp", "board"]).unwrap();
        assert!(matches!(cli.command, Commands::Board { kind: None }));
    }

    #[test]
    fn test_sync_target() {
        assert_eq!("all".parse::<SyncTarget>().unwrap().kinds(), Kind::ALL.to_vec());
        assert!("docs".parse::<SyncTarget>().is_err());
    }
}

use clap::Parser;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use oapp::cli::{Cli, Commands, LinkAction};
use oapp::clock::format_sync_time;
use oapp::config::Config;
use oapp::connectivity::ConnectivityFlag;
use oapp::gateway::{DisconnectedGateway, HttpGateway, RemoteGateway};
use oapp::notice::{Notice, Notifier};
use oapp::outbox::PendingOp;
use oapp::render::{render_board, render_links};
use oapp::store::LocalStore;
use oapp::{Board, CreateOutcome, OappError, StatusOutcome, SyncOutcome, View};
use oapp_common::{Kind, NewItem, NewOrder};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// 通知を標準出力に表示
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("› {}", notice);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "oapp=debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_board(config: &Config, offline: bool) -> anyhow::Result<Board> {
    let store = LocalStore::open(config.store_path()?);

    let (gateway, online): (Arc<dyn RemoteGateway>, bool) = match HttpGateway::from_config(config) {
        Ok(gateway) => (Arc::new(gateway), !offline),
        Err(OappError::MissingApiUrl) => {
            if !offline {
                tracing::warn!("{} (ローカルのみで動作)", OappError::MissingApiUrl);
            }
            (Arc::new(DisconnectedGateway), false)
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Board::new(store, gateway)
        .with_notifier(Arc::new(ConsoleNotifier))
        .with_connectivity(Arc::new(ConnectivityFlag::new(online)))
        .with_timeout(config.request_timeout()))
}

fn print_board(board: &Board, kind: Kind) -> anyhow::Result<()> {
    let title = match kind {
        Kind::Orders => "Zapotrzebowania",
        Kind::Items => "Pytania",
    };
    println!(
        "# {} (最終同期: {})\n",
        title,
        format_sync_time(board.last_sync(kind)?)
    );
    match kind {
        Kind::Orders => print!("{}", render_board(&board.orders()?)),
        Kind::Items => print!("{}", render_board(&board.items()?)),
    }
    Ok(())
}

fn describe_sync(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Offline => "オフライン（ローカルデータのまま）".to_string(),
        SyncOutcome::Replaced {
            stored,
            discarded,
            kept_pending,
        } => format!(
            "{}件を保存（除外 {}件, 未送信 {}件）",
            stored, discarded, kept_pending
        ),
        SyncOutcome::FormatError => "応答フォーマット不正（変更なし）".to_string(),
        SyncOutcome::TransportError => "通信エラー（変更なし）".to_string(),
    }
}

fn describe_create(outcome: &CreateOutcome) -> String {
    match outcome {
        CreateOutcome::Rejected => "必須項目が空のため追加しませんでした".to_string(),
        CreateOutcome::Synced { .. } => "✔ 追加してサーバーと同期しました".to_string(),
        CreateOutcome::Degraded { local_id } => format!("ローカルに保存: {}（未送信）", local_id),
        CreateOutcome::Offline { local_id } => format!("オフライン保存: {}（未送信）", local_id),
    }
}

fn describe_pending(op: &PendingOp) -> String {
    match op {
        PendingOp::CreateOrder { local_id, fields } => {
            format!("[orders] 追加 {} \"{}\"", local_id, fields.subject)
        }
        PendingOp::CreateItem { local_id, fields } => {
            format!("[items] 追加 {} \"{}\"", local_id, fields.description)
        }
        PendingOp::StatusUpdate { kind, id, status } => {
            format!("[{}] ステータス {} → {}", kind, id, status)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = Config::load()?;

    match cli.command {
        Commands::Board { kind } => {
            let board = open_board(&config, cli.offline)?;
            match kind {
                Some(kind) => {
                    board.activate_view(View::from(kind)).await?;
                    print_board(&board, kind)?;
                }
                None => {
                    board.startup().await?;
                    for kind in Kind::ALL {
                        print_board(&board, kind)?;
                    }
                }
            }
        }

        Commands::Sync { target } => {
            let board = open_board(&config, cli.offline)?;
            for kind in target.kinds() {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
                spinner.set_message(format!("{} を同期中...", kind));
                spinner.enable_steady_tick(Duration::from_millis(100));

                let outcome = board.sync(kind, false).await;
                spinner.finish_and_clear();
                println!("{}: {}", kind, describe_sync(&outcome?));
            }
        }

        Commands::AddOrder {
            subject,
            quantity,
            producer,
            author,
        } => {
            let board = open_board(&config, cli.offline)?;
            let outcome = board
                .create_order(NewOrder {
                    subject,
                    quantity,
                    producer,
                    author,
                })
                .await?;
            println!("{}", describe_create(&outcome));
        }

        Commands::AddItem {
            description,
            priority,
            deadline,
            author,
        } => {
            let board = open_board(&config, cli.offline)?;
            let outcome = board
                .create_item(NewItem {
                    description,
                    priority,
                    response_deadline: deadline,
                    author,
                })
                .await?;
            println!("{}", describe_create(&outcome));
        }

        Commands::Move { kind, id, lane } => {
            let board = open_board(&config, cli.offline)?;
            match board.set_status(kind, &id, lane).await? {
                StatusOutcome::NotFound => println!("{} が見つかりません", id),
                StatusOutcome::Unchanged => println!("既に {} です", lane),
                _ => println!("✔ {} → {}", id, lane),
            }
        }

        Commands::Links { action } => {
            let board = open_board(&config, true)?;
            match action.unwrap_or(LinkAction::List) {
                LinkAction::List => print!("{}", render_links(&board.links()?)),
                LinkAction::Add { title, url } => {
                    let title = match title {
                        Some(t) => t,
                        None => Input::new().with_prompt("Nazwa linku").interact_text()?,
                    };
                    let url = match url {
                        Some(u) => u,
                        None => Input::new().with_prompt("URL linku").interact_text()?,
                    };
                    let link = board.add_link(&title, &url)?;
                    println!("✔ リンクを追加しました: [{}] {}", link.id, link.title);
                }
                LinkAction::Remove { id, yes } => {
                    let confirmed = yes
                        || Confirm::new()
                            .with_prompt("Usunąć link?")
                            .default(false)
                            .interact()?;
                    if confirmed {
                        if board.remove_link(id)? {
                            println!("✔ リンクを削除しました");
                        } else {
                            println!("リンクが存在しません: {}", id);
                        }
                    }
                }
            }
        }

        Commands::Settings {
            user_name,
            chat_link,
        } => {
            let board = open_board(&config, true)?;
            if let Some(name) = user_name {
                board.save_user_name(&name)?;
                println!("✔ ユーザー名を設定しました");
            }
            if let Some(link) = chat_link {
                board.save_chat_link(&link)?;
                println!("✔ チャットリンクを設定しました");
            }

            let settings = board.settings()?;
            println!("設定:");
            println!("  ユーザー名: {}", settings.user_name);
            println!("  チャットリンク: {}", settings.chat_link);
        }

        Commands::Config { set_api_url, show } => {
            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ APIのURLを設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  API URL: {}",
                    config.api_url().unwrap_or_else(|_| "未設定".to_string())
                );
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  ストア: {}", config.store_path()?.display());
            }
        }

        Commands::Pending { kind } => {
            let board = open_board(&config, true)?;
            let kinds = kind.map(|k| vec![k]).unwrap_or_else(|| Kind::ALL.to_vec());
            let mut total = 0;
            for kind in kinds {
                for op in board.pending(kind)? {
                    println!("{}", describe_pending(&op));
                    total += 1;
                }
            }
            if total == 0 {
                println!("未送信の変更はありません");
            }
        }
    }

    Ok(())
}

//! OAPP - オフラインファーストのカンバン（発注・質問）トラッカー
//!
//! ローカルストアを正とし、リモートAPIとは楽観的更新と定期/手動同期でつなぐ。

pub mod autosync;
pub mod board;
pub mod cli;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod gateway;
pub mod mutation;
pub mod notice;
pub mod outbox;
pub mod reconcile;
pub mod render;
pub mod store;

pub use board::{Board, View};
pub use error::{GatewayError, OappError, Result};
pub use mutation::{CreateOutcome, FlushReport, StatusOutcome};
pub use reconcile::SyncOutcome;

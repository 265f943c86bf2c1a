//! OAPP Common Library
//!
//! CLIと将来のWeb(WASM)版で共有されるレコード型とワイヤ形式

pub mod error;
pub mod types;
pub mod wire;

pub use error::{Error, Result};
pub use types::{
    local_id, Item, Kind, Lane, Link, NewItem, NewOrder, Order, Priority, Record, Settings,
    LOCAL_ID_PREFIX,
};
pub use wire::{Ack, FetchEnvelope};

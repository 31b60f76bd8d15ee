//! Crypto Devs ICO client
//!
//! Mints (and optionally claims) the Crypto Dev Token, whose free claim is
//! tied to holding Crypto Devs NFTs:
//! - One wallet session per process, pinned to a single network
//! - Read-only or signing access derived per operation
//! - A balance snapshot kept in step with the contracts after every mutation
//!
//! The contracts are external; this crate only talks to them through their ABI.

pub mod config;
pub mod contracts;
pub mod deploy;
pub mod notice;
pub mod session;
pub mod state;
pub mod sync;
pub mod units;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use config::{Config, Network, RpcConfig};
pub use error::{Error, Result};
pub use notice::{Notice, Notifier};
pub use session::{AccessHandle, AccessMode, SessionManager};
pub use state::{DappState, MintRequest, TokenBalanceSnapshot};
pub use sync::{IcoClient, RefreshReport};

//! Wallet access
//!
//! A [`WalletProvider`] is the thing that can be asked for a connection (and
//! may prompt the user to approve it). A [`WalletConnection`] reports the
//! selected network and the active account, and hands out contract gateways
//! bound either to a plain provider or to the signer.

mod local;
#[cfg(test)]
pub(crate) mod mock;
mod signer;

pub use local::{
    AutoApprove, ConnectApproval, ConnectRequest, LocalWallet, RpcConnection, TerminalPrompt,
};
pub use signer::SecureWallet;

use crate::contracts::{ChainReader, ChainWriter};
use crate::Result;
use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of wallet connections
#[async_trait]
pub trait WalletProvider: Send + Sync {
    type Connection: WalletConnection;

    /// Establish a connection, prompting the user if the wallet requires it.
    ///
    /// Fails with `Error::ConnectionRejected` when the user declines.
    async fn connect(&self) -> Result<Self::Connection>;
}

/// An established wallet connection
#[async_trait]
pub trait WalletConnection: Send + Sync + 'static {
    /// Chain ID of the network the wallet is currently on
    async fn chain_id(&self) -> Result<u64>;

    /// The account the wallet signs with, if any
    fn active_account(&self) -> Option<Address>;

    /// Contract gateway for view calls
    fn reader(&self) -> Arc<dyn ChainReader>;

    /// Contract gateway for transactions signed by the active account
    fn writer(&self) -> Result<Arc<dyn ChainWriter>>;
}

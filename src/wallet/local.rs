//! Local wallet: a key from the environment plus an RPC endpoint
//!
//! Connecting asks a [`ConnectApproval`] first, which plays the part of the
//! browser wallet's "connect this site?" prompt.

use super::{SecureWallet, WalletConnection, WalletProvider};
use crate::config::{ContractAddresses, RpcConfig};
use crate::contracts::{AlloyReader, AlloyWriter, ChainReader, ChainWriter};
use crate::{Error, Result};
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;

/// What the user is asked to approve
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub rpc_url: String,
    pub account: Option<Address>,
}

/// Decides whether a connection request goes ahead
#[async_trait]
pub trait ConnectApproval: Send + Sync {
    async fn approve(&self, request: &ConnectRequest) -> bool;
}

/// Approves every request (`--yes`)
pub struct AutoApprove;

#[async_trait]
impl ConnectApproval for AutoApprove {
    async fn approve(&self, _request: &ConnectRequest) -> bool {
        true
    }
}

/// Asks on the terminal and waits for an answer
pub struct TerminalPrompt;

#[async_trait]
impl ConnectApproval for TerminalPrompt {
    async fn approve(&self, request: &ConnectRequest) -> bool {
        let account = request
            .account
            .map(|a| a.to_string())
            .unwrap_or_else(|| "no account (read-only)".to_string());
        let prompt = format!("Connect wallet {} to {}? [y/N] ", account, request.rpc_url);

        tokio::task::spawn_blocking(move || {
            print!("{}", prompt);
            let _ = std::io::stdout().flush();

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_err() {
                return false;
            }
            matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
        })
        .await
        .unwrap_or(false)
    }
}

/// Wallet backed by an optional local key and an HTTP RPC endpoint
pub struct LocalWallet {
    rpc: RpcConfig,
    key: Option<SecureWallet>,
    contracts: ContractAddresses,
    approval: Arc<dyn ConnectApproval>,
}

impl LocalWallet {
    pub fn new(
        rpc: RpcConfig,
        key: Option<SecureWallet>,
        contracts: ContractAddresses,
        approval: Arc<dyn ConnectApproval>,
    ) -> Self {
        Self {
            rpc,
            key,
            contracts,
            approval,
        }
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    type Connection = RpcConnection;

    async fn connect(&self) -> Result<RpcConnection> {
        let url = self.rpc.parsed_url()?;

        let request = ConnectRequest {
            rpc_url: self.rpc.url().to_string(),
            account: self.key.as_ref().map(SecureWallet::address),
        };
        if !self.approval.approve(&request).await {
            return Err(Error::ConnectionRejected(
                "user dismissed the connection prompt".to_string(),
            ));
        }

        let provider = ProviderBuilder::new().connect_http(url.clone()).erased();
        let signing = self.key.as_ref().map(|key| {
            let provider = ProviderBuilder::new()
                .wallet(key.wallet().clone())
                .connect_http(url.clone())
                .erased();
            (key.address(), provider)
        });

        tracing::debug!(
            network = self.rpc.network().name(),
            rpc_url = %self.rpc.url(),
            signing = signing.is_some(),
            "Built RPC connection"
        );

        Ok(RpcConnection {
            provider,
            signing,
            contracts: self.contracts,
        })
    }
}

/// Connection produced by [`LocalWallet`]
pub struct RpcConnection {
    provider: DynProvider,
    signing: Option<(Address, DynProvider)>,
    contracts: ContractAddresses,
}

impl RpcConnection {
    /// Provider that signs with the active account
    pub fn signing_provider(&self) -> Option<&DynProvider> {
        self.signing.as_ref().map(|(_, provider)| provider)
    }
}

#[async_trait]
impl WalletConnection for RpcConnection {
    async fn chain_id(&self) -> Result<u64> {
        self.provider.get_chain_id().await.map_err(|e| {
            Error::ConnectionRejected(format!("could not query network: {}", e))
        })
    }

    fn active_account(&self) -> Option<Address> {
        self.signing.as_ref().map(|(address, _)| *address)
    }

    fn reader(&self) -> Arc<dyn ChainReader> {
        Arc::new(AlloyReader::new(self.provider.clone(), self.contracts))
    }

    fn writer(&self) -> Result<Arc<dyn ChainWriter>> {
        let (_, provider) = self.signing.as_ref().ok_or(Error::NoActiveAccount)?;
        Ok(Arc::new(AlloyWriter::new(provider.clone(), self.contracts)))
    }
}

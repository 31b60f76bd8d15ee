//! Wallet session manager
//!
//! Owns the single wallet connection for the lifetime of the process and
//! gates every chain access behind the required-network check.
//!
//! - The connection is created on first use and cached; later calls never
//!   prompt again. A failed connect is not cached.
//! - The network is checked on every call, so switching networks in the
//!   wallet and retrying works without reconnecting.
//! - Access handles are derived per call and never stored.

use crate::config::Network;
use crate::contracts::{ChainReader, ChainWriter};
use crate::notice::{Notice, Notifier};
use crate::state::DappState;
use crate::wallet::{WalletConnection, WalletProvider};
use crate::{Error, Result};
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// The cached wallet connection
pub struct Session<C> {
    connection: Arc<C>,
    connected_at: DateTime<Utc>,
}

impl<C> Session<C> {
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }
}

/// What an access handle may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    Signing,
}

/// Capability to read chain state, or to read and sign
///
/// Derived fresh for each operation; deliberately not `Clone`.
pub struct AccessHandle<C> {
    mode: AccessMode,
    connection: Arc<C>,
    signer: Option<Address>,
}

impl<C: WalletConnection> AccessHandle<C> {
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// The underlying session connection
    pub fn connection(&self) -> &Arc<C> {
        &self.connection
    }

    /// The account operations act for
    pub fn account(&self) -> Result<Address> {
        self.signer
            .or_else(|| self.connection.active_account())
            .ok_or(Error::NoActiveAccount)
    }

    pub fn reader(&self) -> Arc<dyn ChainReader> {
        self.connection.reader()
    }

    /// Only available on signing handles
    pub fn writer(&self) -> Result<Arc<dyn ChainWriter>> {
        match self.mode {
            AccessMode::Signing => self.connection.writer(),
            AccessMode::ReadOnly => Err(Error::Wallet(
                "a signing handle is required to send transactions".to_string(),
            )),
        }
    }
}

/// Owner of the single wallet session
pub struct SessionManager<W: WalletProvider> {
    wallet: W,
    network: Network,
    session: OnceCell<Session<W::Connection>>,
    notifier: Arc<dyn Notifier>,
}

impl<W: WalletProvider> SessionManager<W> {
    pub fn new(wallet: W, network: Network, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            wallet,
            network,
            session: OnceCell::new(),
            notifier,
        }
    }

    /// The network every access is pinned to
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// The session, once established
    pub fn session(&self) -> Option<&Session<W::Connection>> {
        self.session.get()
    }

    /// Resolve an access handle, connecting first if needed
    ///
    /// Fails with `ConnectionRejected` if the user declines the wallet prompt,
    /// `NetworkMismatch` if the wallet is on another network, and
    /// `NoActiveAccount` if signing is requested from a wallet without one.
    pub async fn acquire_access(
        &self,
        require_signing: bool,
    ) -> Result<AccessHandle<W::Connection>> {
        self.resolve(require_signing, true).await
    }

    /// Like [`acquire_access`](Self::acquire_access), but a network mismatch
    /// is only logged. Used by background refreshes.
    pub async fn acquire_access_quietly(
        &self,
        require_signing: bool,
    ) -> Result<AccessHandle<W::Connection>> {
        self.resolve(require_signing, false).await
    }

    async fn resolve(
        &self,
        require_signing: bool,
        notify_mismatch: bool,
    ) -> Result<AccessHandle<W::Connection>> {
        let session = self
            .session
            .get_or_try_init(|| async {
                tracing::info!(network = self.network.name(), "Requesting wallet connection");
                let connection = self.wallet.connect().await?;
                tracing::info!(
                    account = ?connection.active_account(),
                    "Wallet connected"
                );
                Ok::<_, Error>(Session {
                    connection: Arc::new(connection),
                    connected_at: Utc::now(),
                })
            })
            .await?;

        let actual = session.connection.chain_id().await?;
        let expected = self.network.chain_id();
        if actual != expected {
            tracing::warn!(expected, actual, "Wallet is on the wrong network");
            if notify_mismatch {
                self.notifier.notify(Notice::WrongNetwork {
                    network: self.network.display_name(),
                });
            }
            return Err(Error::NetworkMismatch {
                expected: self.network.display_name(),
                expected_chain_id: expected,
                actual,
            });
        }

        let connection = session.connection.clone();
        if require_signing {
            let signer = connection.active_account().ok_or(Error::NoActiveAccount)?;
            Ok(AccessHandle {
                mode: AccessMode::Signing,
                connection,
                signer: Some(signer),
            })
        } else {
            Ok(AccessHandle {
                mode: AccessMode::ReadOnly,
                connection,
                signer: None,
            })
        }
    }

    /// Establish the session and mark the client connected
    pub async fn connect(&self, state: &DappState) -> Result<()> {
        match self.acquire_access(false).await {
            Ok(_) => {
                state.mark_connected();
                if let Some(session) = self.session() {
                    tracing::debug!(connected_at = %session.connected_at(), "Session ready");
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Wallet connection failed");
                if !e.already_surfaced() {
                    self.notifier.notify(Notice::ActionFailed {
                        action: "connect",
                        reason: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }
}

//! Local key wallet
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are held in alloy's PrivateKeySigner which handles crypto securely
//! - Keys are read into a `SecretString` and never logged
//! - Keys are never serialized

use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the hex-encoded private key
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Wallet that protects its private key
///
/// The private key is:
/// - Stored in alloy's PrivateKeySigner
/// - Never serialized (no Serialize impl)
/// - Only reachable through the `EthereumWallet` used to sign transactions
#[derive(Clone)]
pub struct SecureWallet {
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy integration
    wallet: EthereumWallet,
}

impl SecureWallet {
    /// Load the wallet from `PRIVATE_KEY` if it is set
    ///
    /// Returns `Ok(None)` when the variable is absent so callers can fall back
    /// to a read-only wallet.
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(PRIVATE_KEY_ENV) {
            Ok(key) => Self::from_secret(&SecretString::from(key)).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Create a wallet from a hex-encoded private key
    pub fn from_secret(key: &SecretString) -> Result<Self> {
        let key_hex = key.expose_secret().trim();
        // Remove 0x prefix if present
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        Ok(Self { address, wallet })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get a reference to the EthereumWallet for use with alloy providers
    pub fn wallet(&self) -> &EthereumWallet {
        &self.wallet
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

//! User-visible notices
//!
//! Failures of user-initiated actions and successful transactions are shown to
//! the user. Background refresh failures never produce a notice.

use alloy::primitives::TxHash;
use std::fmt;

/// A message the user must see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Wallet is on the wrong network
    WrongNetwork { network: &'static str },
    /// Mint confirmed
    Minted { amount: u64, tx_hash: TxHash },
    /// Claim confirmed
    Claimed { tx_hash: TxHash },
    /// A user-initiated action failed
    ActionFailed { action: &'static str, reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::WrongNetwork { network } => write!(f, "Change the network to {}", network),
            Notice::Minted { amount, tx_hash } => write!(
                f,
                "Successfully minted {} Crypto Dev Tokens (tx {})",
                amount, tx_hash
            ),
            Notice::Claimed { tx_hash } => {
                write!(f, "Successfully claimed Crypto Dev Tokens (tx {})", tx_hash)
            }
            Notice::ActionFailed { action, reason } => write!(f, "{} failed: {}", action, reason),
        }
    }
}

/// Delivers notices to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

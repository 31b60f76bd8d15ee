//! Error types for the ICO client

use crate::contracts::decode_revert_data;
use alloy::transports::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Wallet connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("Wrong network: expected {expected} (chain {expected_chain_id}), connected to chain {actual}")]
    NetworkMismatch {
        expected: &'static str,
        expected_chain_id: u64,
        actual: u64,
    },

    #[error("Transaction rejected: {0}")]
    ChainRejected(String),

    #[error("Wallet has no active account; signing is unavailable")]
    NoActiveAccount,

    #[error("Another transaction is already in flight")]
    Busy,

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unexpected contract response: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a failure from its message, keeping the revert reason if one can be found
    pub fn chain(err: impl std::fmt::Display) -> Self {
        Error::ChainRejected(crate::contracts::parse_revert_reason(&err.to_string()))
    }

    /// Wrap a contract call failure, decoding the node's revert data when present
    pub fn contract(err: alloy::contract::Error) -> Self {
        match err.as_revert_data().and_then(|data| decode_revert_data(&data)) {
            Some(reason) => Error::ChainRejected(reason),
            None => Error::chain(err),
        }
    }

    /// Wrap an RPC failure, decoding the node's revert data when present
    pub fn transport(err: TransportError) -> Self {
        let reason = err
            .as_error_resp()
            .and_then(|payload| payload.as_revert_data())
            .and_then(|data| decode_revert_data(&data));
        match reason {
            Some(reason) => Error::ChainRejected(reason),
            None => Error::chain(err),
        }
    }

    /// Whether a notice for this error was already raised where it originated
    pub(crate) fn already_surfaced(&self) -> bool {
        matches!(self, Error::NetworkMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

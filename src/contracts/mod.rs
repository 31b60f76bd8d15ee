//! Contract gateway
//!
//! The token and NFT contracts are external collaborators. This module fixes
//! their interface descriptions and exposes the calls the client makes through
//! two traits: [`ChainReader`] for view calls and [`ChainWriter`] for
//! transactions that need a signer.

mod revert;
pub mod rpc;

pub use revert::{decode_revert_data, parse_revert_reason};
pub use rpc::{AlloyReader, AlloyWriter};

use crate::{Error, Result};
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, U256};
use alloy::sol;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

sol! {
    /// Crypto Dev Token: ERC-20 with paid mint and NFT-gated free claim
    #[sol(rpc)]
    interface ICryptoDevToken {
        function balanceOf(address account) external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function tokenIdsClaimed(uint256 tokenId) external view returns (bool);
        function mint(uint256 amount) external payable;
        function claim() external;
    }

    /// Crypto Devs collection: ERC-721 with the enumerable extension
    #[sol(rpc)]
    interface ICryptoDevs {
        function balanceOf(address owner) external view returns (uint256);
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);
    }
}

/// Read-only calls against the token and NFT contracts
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Token units held by `owner`
    async fn token_balance_of(&self, owner: Address) -> Result<U256>;

    /// Token units minted so far
    async fn token_total_supply(&self) -> Result<U256>;

    /// Whether the free claim for `token_id` has been used
    async fn token_id_claimed(&self, token_id: U256) -> Result<bool>;

    /// Number of NFTs held by `owner`
    async fn nft_balance_of(&self, owner: Address) -> Result<U256>;

    /// The `index`-th NFT identifier held by `owner`
    async fn nft_token_of_owner_by_index(&self, owner: Address, index: U256) -> Result<U256>;
}

/// State-changing calls. Both block until the transaction is confirmed.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Mint `amount` tokens, attaching `value` wei as payment
    async fn mint(&self, amount: U256, value: U256) -> Result<TxOutcome>;

    /// Claim the free allowance for every unclaimed NFT held by the signer
    async fn claim(&self) -> Result<TxOutcome>;
}

/// A confirmed transaction
#[derive(Debug, Clone, Serialize)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub confirmed_at: DateTime<Utc>,
}

impl TxOutcome {
    /// Build from a mined receipt, rejecting reverted transactions
    pub fn from_receipt<R: ReceiptResponse>(receipt: &R) -> Result<Self> {
        if !receipt.status() {
            return Err(Error::ChainRejected(format!(
                "transaction {} reverted",
                receipt.transaction_hash()
            )));
        }

        Ok(Self {
            tx_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            confirmed_at: Utc::now(),
        })
    }
}

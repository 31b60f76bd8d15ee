//! Alloy-backed contract gateway

use super::{ChainReader, ChainWriter, ICryptoDevToken, ICryptoDevs, TxOutcome};
use crate::config::ContractAddresses;
use crate::{Error, Result};
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

/// View calls over a read-only provider
pub struct AlloyReader {
    token: ICryptoDevToken::ICryptoDevTokenInstance<DynProvider>,
    nft: ICryptoDevs::ICryptoDevsInstance<DynProvider>,
}

impl AlloyReader {
    pub fn new(provider: DynProvider, addresses: ContractAddresses) -> Self {
        Self {
            token: ICryptoDevToken::new(addresses.token, provider.clone()),
            nft: ICryptoDevs::new(addresses.nft, provider),
        }
    }
}

#[async_trait]
impl ChainReader for AlloyReader {
    async fn token_balance_of(&self, owner: Address) -> Result<U256> {
        tracing::debug!(%owner, "token.balanceOf");
        self.token.balanceOf(owner).call().await.map_err(Error::contract)
    }

    async fn token_total_supply(&self) -> Result<U256> {
        tracing::debug!("token.totalSupply");
        self.token.totalSupply().call().await.map_err(Error::contract)
    }

    async fn token_id_claimed(&self, token_id: U256) -> Result<bool> {
        tracing::debug!(%token_id, "token.tokenIdsClaimed");
        self.token
            .tokenIdsClaimed(token_id)
            .call()
            .await
            .map_err(Error::contract)
    }

    async fn nft_balance_of(&self, owner: Address) -> Result<U256> {
        tracing::debug!(%owner, "nft.balanceOf");
        self.nft.balanceOf(owner).call().await.map_err(Error::contract)
    }

    async fn nft_token_of_owner_by_index(&self, owner: Address, index: U256) -> Result<U256> {
        tracing::debug!(%owner, %index, "nft.tokenOfOwnerByIndex");
        self.nft
            .tokenOfOwnerByIndex(owner, index)
            .call()
            .await
            .map_err(Error::contract)
    }
}

/// Transactions over a provider that carries the signing wallet
pub struct AlloyWriter {
    token: ICryptoDevToken::ICryptoDevTokenInstance<DynProvider>,
}

impl AlloyWriter {
    pub fn new(signing_provider: DynProvider, addresses: ContractAddresses) -> Self {
        Self {
            token: ICryptoDevToken::new(addresses.token, signing_provider),
        }
    }

    /// `mint(amount)` on the token contract with `value` wei attached
    pub fn mint_request(&self, amount: U256, value: U256) -> TransactionRequest {
        self.token
            .mint(amount)
            .value(value)
            .into_transaction_request()
    }

    pub fn claim_request(&self) -> TransactionRequest {
        self.token.claim().into_transaction_request()
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<TxOutcome> {
        let pending = self
            .token
            .provider()
            .send_transaction(tx)
            .await
            .map_err(Error::transport)?;

        tracing::info!(
            tx_hash = %pending.tx_hash(),
            "Transaction submitted, waiting for confirmation"
        );

        let receipt = pending.get_receipt().await.map_err(Error::chain)?;
        TxOutcome::from_receipt(&receipt)
    }
}

#[async_trait]
impl ChainWriter for AlloyWriter {
    async fn mint(&self, amount: U256, value: U256) -> Result<TxOutcome> {
        tracing::debug!(%amount, %value, "token.mint");
        self.submit(self.mint_request(amount, value)).await
    }

    async fn claim(&self) -> Result<TxOutcome> {
        tracing::debug!("token.claim");
        self.submit(self.claim_request()).await
    }
}

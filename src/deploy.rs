//! Token contract deployment
//!
//! Deploys the Crypto Dev Token from a compiled Hardhat artifact, passing the
//! NFT collection address as the constructor argument.

use crate::contracts::TxOutcome;
use crate::{Error, Result};
use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolValue;
use serde::Deserialize;
use std::path::Path;

/// The parts of a Hardhat artifact we need
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let artifact: ContractArtifact = serde_json::from_str(&content)?;
        if artifact.bytecode.is_empty() {
            return Err(Error::Config(format!(
                "{} has no bytecode (abstract contract or interface?)",
                path.display()
            )));
        }
        Ok(artifact)
    }

    /// Creation code followed by the ABI-encoded `nft` constructor argument
    pub fn deploy_code(&self, nft: Address) -> Bytes {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&nft.abi_encode());
        code.into()
    }
}

/// Deploy the token contract and wait for it to be mined
pub async fn deploy_token(
    provider: &DynProvider,
    artifact: &ContractArtifact,
    nft: Address,
) -> Result<Address> {
    tracing::info!(
        contract = artifact.contract_name.as_deref().unwrap_or("CryptoDevToken"),
        %nft,
        "Deploying token contract"
    );

    let tx = TransactionRequest::default().with_deploy_code(artifact.deploy_code(nft));
    let pending = provider
        .send_transaction(tx)
        .await
        .map_err(Error::transport)?;
    tracing::info!(tx_hash = %pending.tx_hash(), "Deployment submitted, waiting for confirmation");

    let receipt = pending.get_receipt().await.map_err(Error::chain)?;
    deployed_address(&receipt)
}

/// Address of the contract created by a mined deployment
pub fn deployed_address<R: ReceiptResponse>(receipt: &R) -> Result<Address> {
    let outcome = TxOutcome::from_receipt(receipt)?;
    let address = receipt.contract_address().ok_or_else(|| {
        Error::ChainRejected(format!(
            "deployment {} has no contract address",
            outcome.tx_hash
        ))
    })?;

    tracing::info!(%address, block = ?outcome.block_number, "Token contract deployed");
    Ok(address)
}

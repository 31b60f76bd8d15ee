//! Configuration for the ICO client

pub mod rpc;

use crate::{Error, Result};
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Environment variable names for contract address overrides
pub mod env_vars {
    pub const TOKEN_CONTRACT_ADDRESS: &str = "TOKEN_CONTRACT_ADDRESS";
    pub const NFT_CONTRACT_ADDRESS: &str = "NFT_CONTRACT_ADDRESS";
    /// Name used by the deployment tooling for the token's constructor argument
    pub const CRYPTO_DEVS_NFT_CONTRACT_ADDRESS: &str = "CRYPTO_DEVS_NFT_CONTRACT_ADDRESS";
}

/// Networks the client can be pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Ethereum,
    Goerli,
    Sepolia,
    Localhost,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Goerli => 5,
            Network::Sepolia => 11_155_111,
            Network::Localhost => 31_337,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Goerli => "goerli",
            Network::Sepolia => "sepolia",
            Network::Localhost => "localhost",
        }
    }

    /// Human readable name for user notices
    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Ethereum => "Ethereum Mainnet",
            Network::Goerli => "Goerli",
            Network::Sepolia => "Sepolia",
            Network::Localhost => "Localhost",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ethereum" | "mainnet" => Ok(Network::Ethereum),
            "goerli" => Ok(Network::Goerli),
            "sepolia" => Ok(Network::Sepolia),
            "localhost" | "hardhat" => Ok(Network::Localhost),
            other => Err(Error::InvalidArgument(format!("Unknown network: {}", other))),
        }
    }
}

/// Addresses of the two contracts the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// Crypto Dev Token (ERC-20, mint + claim)
    pub token: Address,
    /// Crypto Devs collection (ERC-721 enumerable)
    pub nft: Address,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            token: Address::ZERO,
            nft: Address::ZERO,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The only network the client will operate on
    pub network: Network,
    /// Contract addresses
    #[serde(default)]
    pub contracts: ContractAddresses,
    /// Price of one token in wei (0.001 ether)
    pub unit_price_wei: u128,
    /// Total supply cap, used for display only
    pub max_supply: u64,
    /// Tokens granted per unclaimed NFT, used for display only
    pub tokens_per_nft: u64,
    /// Whether the claim action is offered
    #[serde(default)]
    pub claim_enabled: bool,
    /// Upper bound on in-flight per-NFT reads when computing the claimable amount
    pub claim_scan_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::Goerli,
            contracts: ContractAddresses::default(),
            unit_price_wei: 1_000_000_000_000_000, // 0.001 ETH
            max_supply: 10_000,
            tokens_per_nft: 10,
            claim_enabled: false,
            claim_scan_concurrency: 1,
        }
    }
}

impl Config {
    /// Load config from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                serde_json::from_str(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
            }
            None => Config::default(),
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply contract address overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(env_vars::TOKEN_CONTRACT_ADDRESS) {
            tracing::debug!("Using TOKEN_CONTRACT_ADDRESS override");
            self.contracts.token = parse_address(env_vars::TOKEN_CONTRACT_ADDRESS, &token)?;
        }

        let nft = lookup(env_vars::NFT_CONTRACT_ADDRESS)
            .map(|v| (env_vars::NFT_CONTRACT_ADDRESS, v))
            .or_else(|| {
                lookup(env_vars::CRYPTO_DEVS_NFT_CONTRACT_ADDRESS)
                    .map(|v| (env_vars::CRYPTO_DEVS_NFT_CONTRACT_ADDRESS, v))
            });
        if let Some((name, value)) = nft {
            tracing::debug!(var = name, "Using NFT contract address override");
            self.contracts.nft = parse_address(name, &value)?;
        }

        Ok(())
    }

    /// Check the settings every chain-facing command depends on
    pub fn validate(&self) -> Result<()> {
        if self.contracts.token.is_zero() {
            return Err(Error::Config(format!(
                "token contract address not set (config `contracts.token` or {})",
                env_vars::TOKEN_CONTRACT_ADDRESS
            )));
        }
        self.validate_nft()?;
        if self.unit_price_wei == 0 {
            return Err(Error::Config("unit_price_wei must be positive".to_string()));
        }
        Ok(())
    }

    /// Deployment only needs the NFT address
    pub fn validate_nft(&self) -> Result<()> {
        if self.contracts.nft.is_zero() {
            return Err(Error::Config(format!(
                "NFT contract address not set (config `contracts.nft` or {})",
                env_vars::CRYPTO_DEVS_NFT_CONTRACT_ADDRESS
            )));
        }
        Ok(())
    }

    pub fn unit_price(&self) -> U256 {
        U256::from(self.unit_price_wei)
    }
}

fn parse_address(name: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{} is not a valid address: {}", name, e)))
}

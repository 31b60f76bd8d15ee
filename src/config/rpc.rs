//! RPC endpoint configuration
//!
//! The client only ever talks to one network, so this resolves a single URL:
//! 1. `RPC_URL` - explicit endpoint, highest priority
//! 2. Per-network env vars (GOERLI_RPC_URL, SEPOLIA_RPC_URL, ...)
//! 3. Provider API keys (ALCHEMY_API_KEY, INFURA_API_KEY) - builds the URL
//! 4. Public RPC fallbacks - for testing only
//!
//! # Examples
//!
//! ```bash
//! # Option 1: Explicit URL
//! export RPC_URL="https://eth-goerli.g.alchemy.com/v2/YOUR_KEY"
//!
//! # Option 2: Single provider API key
//! export ALCHEMY_API_KEY="YOUR_KEY"
//! ```

use super::Network;
use crate::{Error, Result};

/// Environment variable names
mod env_vars {
    pub const RPC_URL: &str = "RPC_URL";

    // Per-network URLs
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
    pub const GOERLI_RPC_URL: &str = "GOERLI_RPC_URL";
    pub const SEPOLIA_RPC_URL: &str = "SEPOLIA_RPC_URL";
    pub const LOCALHOST_RPC_URL: &str = "LOCALHOST_RPC_URL";

    // Provider API keys
    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
    pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
}

/// Public RPC endpoints (rate limited, for testing only)
mod public_rpcs {
    pub const ETHEREUM: &str = "https://eth.llamarpc.com";
    pub const GOERLI: &str = "https://ethereum-goerli.publicnode.com";
    pub const SEPOLIA: &str = "https://ethereum-sepolia.publicnode.com";
    pub const LOCALHOST: &str = "http://127.0.0.1:8545";
}

/// RPC configuration for the required network
#[derive(Debug, Clone)]
pub struct RpcConfig {
    network: Network,
    url: String,
}

impl RpcConfig {
    /// Resolve the RPC URL for `network` from environment variables
    pub fn from_env(network: Network) -> Self {
        Self::resolve(network, |name| std::env::var(name).ok())
    }

    /// Resolve the RPC URL for `network` using `lookup` for variables
    ///
    /// Priority:
    /// 1. RPC_URL
    /// 2. The per-network variable
    /// 3. ALCHEMY_API_KEY
    /// 4. INFURA_API_KEY
    /// 5. Public RPC fallback
    pub fn resolve<F>(network: Network, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(env_vars::RPC_URL) {
            tracing::debug!("Using RPC_URL");
            return Self { network, url };
        }

        let per_network = match network {
            Network::Ethereum => env_vars::ETH_RPC_URL,
            Network::Goerli => env_vars::GOERLI_RPC_URL,
            Network::Sepolia => env_vars::SEPOLIA_RPC_URL,
            Network::Localhost => env_vars::LOCALHOST_RPC_URL,
        };
        if let Some(url) = lookup(per_network) {
            tracing::debug!(var = per_network, "Using per-network RPC URL");
            return Self { network, url };
        }

        if network != Network::Localhost {
            if let Some(key) = lookup(env_vars::ALCHEMY_API_KEY) {
                tracing::info!("Building RPC URL from ALCHEMY_API_KEY");
                let host = match network {
                    Network::Goerli => "eth-goerli",
                    Network::Sepolia => "eth-sepolia",
                    _ => "eth-mainnet",
                };
                return Self {
                    network,
                    url: format!("https://{}.g.alchemy.com/v2/{}", host, key),
                };
            }

            if let Some(key) = lookup(env_vars::INFURA_API_KEY) {
                tracing::info!("Building RPC URL from INFURA_API_KEY");
                let host = match network {
                    Network::Goerli => "goerli",
                    Network::Sepolia => "sepolia",
                    _ => "mainnet",
                };
                return Self {
                    network,
                    url: format!("https://{}.infura.io/v3/{}", host, key),
                };
            }
        }

        let url = match network {
            Network::Ethereum => public_rpcs::ETHEREUM,
            Network::Goerli => public_rpcs::GOERLI,
            Network::Sepolia => public_rpcs::SEPOLIA,
            Network::Localhost => public_rpcs::LOCALHOST,
        };
        if network != Network::Localhost {
            tracing::warn!(
                network = network.name(),
                "No RPC configured, using public RPC (rate limited)"
            );
        }
        Self {
            network,
            url: url.to_string(),
        }
    }

    /// Create with an explicit RPC URL
    pub fn with_url(network: Network, url: impl Into<String>) -> Self {
        Self {
            network,
            url: url.into(),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Get the raw RPC URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parse the RPC URL
    pub fn parsed_url(&self) -> Result<url::Url> {
        self.url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL {}: {}", self.url, e)))
    }
}

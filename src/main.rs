//! Crypto Devs ICO CLI
//!
//! Command-line front end for minting and claiming Crypto Dev Tokens, plus
//! the one-shot token deployment.

use alloy::primitives::U256;
use clap::{Parser, Subcommand};
use crypto_devs_ico::deploy::{deploy_token, ContractArtifact};
use crypto_devs_ico::units::format_ether;
use crypto_devs_ico::wallet::{
    AutoApprove, ConnectApproval, LocalWallet, SecureWallet, TerminalPrompt,
};
use crypto_devs_ico::{
    Config, DappState, Error, IcoClient, MintRequest, Network, Notice, Notifier, Result,
    RpcConfig, SessionManager, TokenBalanceSnapshot,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ico")]
#[command(about = "Mint and claim Crypto Dev Tokens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Required network (overrides the config file)
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Approve the wallet connection without prompting
    #[arg(short, long, global = true)]
    yes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and show balances, total minted and claimable tokens
    Status,

    /// Mint tokens (0.001 ETH each by default)
    Mint {
        /// Number of whole tokens to mint
        #[arg(short, long)]
        amount: u64,
    },

    /// Claim free tokens for unclaimed Crypto Devs NFTs
    Claim,

    /// Show current configuration
    Config,

    /// Deploy the token contract
    Deploy {
        /// Compiled Hardhat artifact (CryptoDevToken.json)
        #[arg(short, long)]
        artifact: PathBuf,
    },
}

/// Prints notices to the terminal
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::WrongNetwork { .. } | Notice::ActionFailed { .. } => {
                eprintln!("!! {}", notice)
            }
            _ => println!("{}", notice),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(network) = cli.network {
        config.network = network;
    }

    match cli.command {
        Commands::Status => {
            config.validate()?;
            let client = build_client(&config, cli.yes)?;
            let report = client.load().await;
            if !client.state().is_connected() {
                return Err(Error::Wallet("wallet is not connected".to_string()));
            }
            if !report.all_ok() {
                tracing::warn!("Some values could not be refreshed; showing the last known ones");
            }
            render(&config, &client.state().snapshot().await);
        }
        Commands::Mint { amount } => {
            let request = MintRequest::new(amount)?;
            config.validate()?;
            let client = build_client(&config, cli.yes)?;
            client.connect().await?;
            client.refresh_all().await;
            client.mint(request).await?;
            render(&config, &client.state().snapshot().await);
        }
        Commands::Claim => {
            if !config.claim_enabled {
                return Err(Error::InvalidArgument(
                    "claiming is disabled; set `claim_enabled` in the config".to_string(),
                ));
            }
            config.validate()?;
            let client = build_client(&config, cli.yes)?;
            client.connect().await?;
            client.refresh_all().await;
            client.claim().await?;
            render(&config, &client.state().snapshot().await);
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Deploy { artifact } => {
            run_deploy(&config, artifact, cli.yes).await?;
        }
    }

    Ok(())
}

fn build_client(config: &Config, yes: bool) -> Result<IcoClient<LocalWallet>> {
    let session = Arc::new(build_session(config, yes)?);
    Ok(IcoClient::new(session, Arc::new(DappState::new()), config))
}

fn build_session(config: &Config, yes: bool) -> Result<SessionManager<LocalWallet>> {
    let rpc = RpcConfig::from_env(config.network);
    let key = SecureWallet::from_env()?;
    if key.is_none() {
        tracing::warn!("No PRIVATE_KEY set - wallet is read-only");
    }

    let approval: Arc<dyn ConnectApproval> = if yes {
        Arc::new(AutoApprove)
    } else {
        Arc::new(TerminalPrompt)
    };

    let wallet = LocalWallet::new(rpc, key, config.contracts, approval);
    Ok(SessionManager::new(wallet, config.network, Arc::new(ConsoleNotifier)))
}

fn render(config: &Config, snapshot: &TokenBalanceSnapshot) {
    println!(
        "You have minted {} Crypto Dev Tokens!",
        format_ether(snapshot.owned)
    );
    println!(
        "Overall {}/{} have been minted!",
        format_ether(snapshot.total_minted),
        config.max_supply
    );
    if config.claim_enabled && !snapshot.claimable.is_zero() {
        println!(
            "{} Tokens can be claimed!",
            snapshot.claimable * U256::from(config.tokens_per_nft)
        );
    }
}

async fn run_deploy(config: &Config, artifact_path: PathBuf, yes: bool) -> Result<()> {
    config.validate_nft()?;
    let artifact = ContractArtifact::load(&artifact_path)?;

    let session = build_session(config, yes)?;
    tracing::info!(network = session.network().name(), "Preparing deployment");
    let handle = session.acquire_access(true).await?;
    let provider = handle
        .connection()
        .signing_provider()
        .ok_or(Error::NoActiveAccount)?;

    let address = deploy_token(provider, &artifact, config.contracts.nft).await?;
    println!("CryptoDevToken contract address {}", address);
    Ok(())
}

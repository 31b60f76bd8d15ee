//! On-chain state synchronization
//!
//! [`IcoClient`] keeps the [`TokenBalanceSnapshot`](crate::state::TokenBalanceSnapshot)
//! in line with the contracts. It refreshes on initial load and after every
//! confirmed mint or claim. Each refresh publishes its own field and fails on
//! its own: a failed read is logged and leaves the previous value in place.

use crate::config::Config;
use crate::contracts::{ChainReader, TxOutcome};
use crate::notice::{Notice, Notifier};
use crate::session::SessionManager;
use crate::state::{DappState, MintRequest, SnapshotField};
use crate::wallet::WalletProvider;
use crate::{Error, Result};
use alloy::primitives::{Address, U256};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;

/// Outcome of the three independent refreshes
#[derive(Debug)]
pub struct RefreshReport {
    pub owned: Result<U256>,
    pub total_minted: Result<U256>,
    pub claimable: Result<U256>,
}

impl RefreshReport {
    pub fn all_ok(&self) -> bool {
        self.owned.is_ok() && self.total_minted.is_ok() && self.claimable.is_ok()
    }
}

/// Count the NFTs held by `account` whose free claim is still unused
///
/// Holding nothing short-circuits to zero without any claimed-flag reads.
/// Otherwise every owned identifier is looked up and checked, with at most
/// `concurrency` lookups in flight; the count is only returned once all of
/// them have finished. Any failed read fails the whole count.
pub async fn compute_claimable(
    reader: &dyn ChainReader,
    account: Address,
    concurrency: usize,
) -> Result<U256> {
    let held = reader.nft_balance_of(account).await?;
    if held.is_zero() {
        return Ok(U256::ZERO);
    }

    let held = u64::try_from(held)
        .map_err(|_| Error::Decode(format!("NFT balance {} does not fit in u64", held)))?;

    let unclaimed = stream::iter(0..held)
        .map(move |index| async move {
            let token_id = reader
                .nft_token_of_owner_by_index(account, U256::from(index))
                .await?;
            let claimed = reader.token_id_claimed(token_id).await?;
            tracing::debug!(index, %token_id, claimed, "Checked claim status");
            Ok::<_, Error>(!claimed)
        })
        .buffered(concurrency.max(1))
        .try_fold(0u64, |count, unclaimed| async move {
            Ok(count + u64::from(unclaimed))
        })
        .await?;

    Ok(U256::from(unclaimed))
}

/// Mint, claim and refresh against one wallet session
pub struct IcoClient<W: WalletProvider> {
    session: Arc<SessionManager<W>>,
    state: Arc<DappState>,
    notifier: Arc<dyn Notifier>,
    unit_price: U256,
    claim_scan_concurrency: usize,
}

impl<W: WalletProvider> IcoClient<W> {
    pub fn new(session: Arc<SessionManager<W>>, state: Arc<DappState>, config: &Config) -> Self {
        let notifier = session.notifier().clone();
        Self {
            session,
            state,
            notifier,
            unit_price: config.unit_price(),
            claim_scan_concurrency: config.claim_scan_concurrency,
        }
    }

    pub fn state(&self) -> &Arc<DappState> {
        &self.state
    }

    /// Establish the wallet session
    pub async fn connect(&self) -> Result<()> {
        self.session.connect(&self.state).await
    }

    /// Initial load: connect, then refresh everything
    pub async fn load(&self) -> RefreshReport {
        // A failed connect is already reported; the refreshes retry it
        let _ = self.connect().await;
        self.refresh_all().await
    }

    /// Refresh the connected account's token balance
    pub async fn refresh_owned_balance(&self) -> Result<U256> {
        self.publish(SnapshotField::Owned, async {
            let handle = self.session.acquire_access_quietly(false).await?;
            let account = handle.account()?;
            handle.reader().token_balance_of(account).await
        })
        .await
    }

    /// Refresh the total number of tokens minted
    pub async fn refresh_total_minted(&self) -> Result<U256> {
        self.publish(SnapshotField::TotalMinted, async {
            let handle = self.session.acquire_access_quietly(false).await?;
            handle.reader().token_total_supply().await
        })
        .await
    }

    /// Refresh the number of NFTs with an unused claim
    pub async fn refresh_claimable(&self) -> Result<U256> {
        self.publish(SnapshotField::Claimable, async {
            let handle = self.session.acquire_access_quietly(false).await?;
            let account = handle.account()?;
            let reader = handle.reader();
            compute_claimable(reader.as_ref(), account, self.claim_scan_concurrency).await
        })
        .await
    }

    /// Run the three refreshes concurrently; each publishes independently
    pub async fn refresh_all(&self) -> RefreshReport {
        let (owned, total_minted, claimable) = tokio::join!(
            self.refresh_owned_balance(),
            self.refresh_total_minted(),
            self.refresh_claimable()
        );
        RefreshReport {
            owned,
            total_minted,
            claimable,
        }
    }

    /// Mint tokens, paying `amount * unit_price`, and wait for confirmation
    pub async fn mint(&self, request: MintRequest) -> Result<TxOutcome> {
        let result = self
            .transact("mint", async {
                let handle = self.session.acquire_access(true).await?;
                let payment = request.payment(self.unit_price)?;
                let account = handle.account()?;
                tracing::info!(amount = request.amount(), %payment, %account, "Minting");
                handle
                    .writer()?
                    .mint(U256::from(request.amount()), payment)
                    .await
            })
            .await?;

        self.notifier.notify(Notice::Minted {
            amount: request.amount(),
            tx_hash: result.tx_hash,
        });
        self.refresh_all().await;
        Ok(result)
    }

    /// Claim the free allowance for every unclaimed NFT and wait for confirmation
    pub async fn claim(&self) -> Result<TxOutcome> {
        let result = self
            .transact("claim", async {
                let handle = self.session.acquire_access(true).await?;
                let account = handle.account()?;
                tracing::info!(%account, "Claiming");
                handle.writer()?.claim().await
            })
            .await?;

        self.notifier.notify(Notice::Claimed {
            tx_hash: result.tx_hash,
        });
        self.refresh_all().await;
        Ok(result)
    }

    /// Publish a refresh result into its field, or log and keep the old value
    async fn publish<F>(&self, field: SnapshotField, read: F) -> Result<U256>
    where
        F: Future<Output = Result<U256>>,
    {
        match read.await {
            Ok(value) => {
                self.state.replace(field, value).await;
                tracing::debug!(field = field.name(), %value, "Snapshot field refreshed");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(
                    field = field.name(),
                    error = %e,
                    "Refresh failed, keeping previous value"
                );
                Err(e)
            }
        }
    }

    /// Hold the loading state while a transaction is sent and confirmed
    async fn transact<F>(&self, action: &'static str, send: F) -> Result<TxOutcome>
    where
        F: Future<Output = Result<TxOutcome>>,
    {
        let result = match self.state.begin_transaction() {
            Ok(_in_flight) => send.await,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                tracing::info!(
                    action,
                    tx_hash = %outcome.tx_hash,
                    block = ?outcome.block_number,
                    gas_used = outcome.gas_used,
                    "Transaction confirmed"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(action, error = %e, "Transaction failed");
                if !e.already_surfaced() {
                    self.notifier.notify(Notice::ActionFailed {
                        action,
                        reason: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::notice::recording::RecordingNotifier;
    use crate::wallet::mock::{whole, MockChain, MockWallet, ALICE, GOERLI};

    struct Fixture {
        client: IcoClient<MockWallet>,
        chain: Arc<MockChain>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture_with(chain_id: u64, configure: impl FnOnce(&mut Config)) -> Fixture {
        let mut config = Config::default();
        configure(&mut config);

        let chain = Arc::new(MockChain::new(config.unit_price()));
        let notifier = Arc::new(RecordingNotifier::default());
        let wallet = MockWallet::new(chain.clone(), chain_id, Some(ALICE));
        let session = Arc::new(SessionManager::new(wallet, Network::Goerli, notifier.clone()));
        let client = IcoClient::new(session, Arc::new(DappState::new()), &config);

        Fixture {
            client,
            chain,
            notifier,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(GOERLI, |_| {})
    }

    #[tokio::test]
    async fn claimable_counts_unclaimed_ids() {
        let f = fixture();
        f.chain.give_nfts(ALICE, &[5, 9, 12]);
        f.chain.mark_claimed(&[5, 12]);

        let claimable = f.client.refresh_claimable().await.unwrap();

        assert_eq!(claimable, U256::from(1));
        assert_eq!(f.client.state().snapshot().await.claimable, U256::from(1));
        assert_eq!(f.chain.calls("nft.tokenOfOwnerByIndex"), 3);
        assert_eq!(f.chain.calls("token.tokenIdsClaimed"), 3);
    }

    #[tokio::test]
    async fn claimable_with_parallel_scan_matches_sequential() {
        let f = fixture_with(GOERLI, |c| c.claim_scan_concurrency = 8);
        f.chain.give_nfts(ALICE, &[1, 2, 3, 4, 5, 6]);
        f.chain.mark_claimed(&[2, 4]);

        assert_eq!(f.client.refresh_claimable().await.unwrap(), U256::from(4));
    }

    #[tokio::test]
    async fn zero_holdings_skip_claim_checks() {
        let f = fixture();

        let claimable = f.client.refresh_claimable().await.unwrap();

        assert_eq!(claimable, U256::ZERO);
        assert_eq!(f.chain.calls("nft.balanceOf"), 1);
        assert_eq!(f.chain.calls("nft.tokenOfOwnerByIndex"), 0);
        assert_eq!(f.chain.calls("token.tokenIdsClaimed"), 0);
    }

    #[tokio::test]
    async fn failed_claim_check_keeps_stale_claimable() {
        let f = fixture();
        f.chain.give_nfts(ALICE, &[5, 9]);
        f.client.refresh_claimable().await.unwrap();

        f.chain.mark_claimed(&[5]);
        f.chain.fail("token.tokenIdsClaimed");
        assert!(f.client.refresh_claimable().await.is_err());
        assert_eq!(f.client.state().snapshot().await.claimable, U256::from(2));

        f.chain.heal("token.tokenIdsClaimed");
        assert_eq!(f.client.refresh_claimable().await.unwrap(), U256::from(1));
    }

    #[tokio::test]
    async fn mint_refreshes_each_field_once() {
        let f = fixture();
        f.chain.give_nfts(ALICE, &[7]);
        f.client.connect().await.unwrap();
        f.chain.reset_calls();

        let outcome = f.client.mint(MintRequest::new(3).unwrap()).await.unwrap();

        assert_eq!(f.chain.calls("token.mint"), 1);
        assert_eq!(f.chain.calls("token.balanceOf"), 1);
        assert_eq!(f.chain.calls("token.totalSupply"), 1);
        assert_eq!(f.chain.calls("nft.balanceOf"), 1);

        let snapshot = f.client.state().snapshot().await;
        assert_eq!(snapshot.owned, whole(3));
        assert_eq!(snapshot.total_minted, whole(3));
        assert_eq!(snapshot.claimable, U256::from(1));
        assert!(!f.client.state().is_loading());
        assert_eq!(
            f.notifier.notices(),
            vec![Notice::Minted {
                amount: 3,
                tx_hash: outcome.tx_hash
            }]
        );
    }

    #[tokio::test]
    async fn one_failing_refresh_does_not_block_the_others() {
        let f = fixture();
        f.chain.set_total_supply(whole(100));
        f.chain.fail("token.totalSupply");

        f.client.mint(MintRequest::new(2).unwrap()).await.unwrap();

        let snapshot = f.client.state().snapshot().await;
        assert_eq!(snapshot.owned, whole(2));
        assert_eq!(snapshot.total_minted, U256::ZERO);
        assert_eq!(snapshot.claimable, U256::ZERO);
        assert_eq!(f.chain.calls("nft.balanceOf"), 1);
    }

    #[tokio::test]
    async fn failed_total_minted_refresh_is_silent() {
        let f = fixture();
        f.chain.set_total_supply(whole(5));
        let report = f.client.load().await;
        assert!(report.all_ok());
        let before = f.client.state().snapshot().await;

        f.chain.fail("token.totalSupply");
        let report = f.client.refresh_all().await;

        assert!(report.total_minted.is_err());
        assert!(report.owned.is_ok());
        let after = f.client.state().snapshot().await;
        assert_eq!(after.owned, before.owned);
        assert_eq!(after.total_minted, whole(5));
        assert!(f.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn rejected_mint_leaves_snapshot_and_notifies() {
        let f = fixture();
        f.client.load().await;
        f.chain.fail("token.mint");
        f.chain.reset_calls();

        let err = f.client.mint(MintRequest::new(1).unwrap()).await.unwrap_err();

        assert!(matches!(err, Error::ChainRejected(_)));
        assert_eq!(f.client.state().snapshot().await, Default::default());
        assert_eq!(f.chain.calls("token.balanceOf"), 0);
        assert!(!f.client.state().is_loading());
        assert!(matches!(
            f.notifier.notices().as_slice(),
            [Notice::ActionFailed { action: "mint", .. }]
        ));
    }

    #[tokio::test]
    async fn mint_on_wrong_network_makes_no_contract_calls() {
        let f = fixture_with(1, |_| {});

        let err = f.client.mint(MintRequest::new(3).unwrap()).await.unwrap_err();

        assert!(matches!(err, Error::NetworkMismatch { .. }));
        assert_eq!(f.chain.total_calls(), 0);
        // Only the network notice, not a second failure notice
        assert_eq!(
            f.notifier.notices(),
            vec![Notice::WrongNetwork { network: "Goerli" }]
        );
    }

    #[tokio::test]
    async fn load_on_wrong_network_notifies_once() {
        let f = fixture_with(1, |_| {});

        let report = f.client.load().await;

        assert!(!report.all_ok());
        assert!(!f.client.state().is_connected());
        assert_eq!(f.chain.total_calls(), 0);
        assert_eq!(
            f.notifier.notices(),
            vec![Notice::WrongNetwork { network: "Goerli" }]
        );
    }

    #[tokio::test]
    async fn mint_while_loading_is_busy() {
        let f = fixture();
        let _in_flight = f.client.state().begin_transaction().unwrap();

        let err = f.client.mint(MintRequest::new(1).unwrap()).await.unwrap_err();

        assert!(matches!(err, Error::Busy));
        assert_eq!(f.chain.calls("token.mint"), 0);
    }

    #[tokio::test]
    async fn claim_uses_allowance_and_refreshes() {
        let f = fixture();
        f.chain.give_nfts(ALICE, &[5, 9, 12]);
        f.chain.mark_claimed(&[5]);
        f.client.load().await;
        assert_eq!(f.client.state().snapshot().await.claimable, U256::from(2));

        f.client.claim().await.unwrap();

        let snapshot = f.client.state().snapshot().await;
        assert_eq!(snapshot.claimable, U256::ZERO);
        assert_eq!(snapshot.owned, whole(20));
        assert!(matches!(
            f.notifier.notices().as_slice(),
            [Notice::Claimed { .. }]
        ));
    }

    #[tokio::test]
    async fn claim_with_nothing_to_claim_is_rejected() {
        let f = fixture();

        let err = f.client.claim().await.unwrap_err();

        assert!(matches!(err, Error::ChainRejected(_)));
        assert_eq!(f.chain.calls("token.balanceOf"), 0);
    }
}

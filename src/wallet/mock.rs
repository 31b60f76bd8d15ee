//! In-memory wallet and contracts for tests

use super::{WalletConnection, WalletProvider};
use crate::contracts::{ChainReader, ChainWriter, TxOutcome};
use crate::{Error, Result};
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const GOERLI: u64 = 5;
pub const ALICE: Address = Address::repeat_byte(0xa1);

/// One whole token (18 decimals)
pub fn whole(tokens: u64) -> U256 {
    U256::from(tokens) * U256::from(10u64).pow(U256::from(18))
}

#[derive(Default)]
struct Ledger {
    token_balances: HashMap<Address, U256>,
    total_supply: U256,
    claimed: HashSet<U256>,
    nfts: HashMap<Address, Vec<U256>>,
}

/// Token + NFT contracts with call counting and failure injection
pub struct MockChain {
    ledger: Mutex<Ledger>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    unit_price: U256,
    tokens_per_nft: u64,
}

impl MockChain {
    pub fn new(unit_price: U256) -> Self {
        Self {
            ledger: Mutex::new(Ledger::default()),
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            unit_price,
            tokens_per_nft: 10,
        }
    }

    pub fn give_nfts(&self, owner: Address, ids: &[u64]) {
        let ids = ids.iter().map(|id| U256::from(*id)).collect();
        self.ledger.lock().unwrap().nfts.insert(owner, ids);
    }

    pub fn mark_claimed(&self, ids: &[u64]) {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.claimed.extend(ids.iter().map(|id| U256::from(*id)));
    }

    pub fn set_total_supply(&self, supply: U256) {
        self.ledger.lock().unwrap().total_supply = supply;
    }

    /// Make every later call to `method` fail
    pub fn fail(&self, method: &'static str) {
        self.failing.lock().unwrap().insert(method);
    }

    pub fn heal(&self, method: &'static str) {
        self.failing.lock().unwrap().remove(method);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, method: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(method).or_default() += 1;
        if self.failing.lock().unwrap().contains(method) {
            return Err(Error::ChainRejected(format!("{} failed", method)));
        }
        Ok(())
    }

    fn outcome() -> TxOutcome {
        TxOutcome {
            tx_hash: TxHash::repeat_byte(0x11),
            block_number: Some(1),
            gas_used: 21_000,
            confirmed_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn token_balance_of(&self, owner: Address) -> Result<U256> {
        self.record("token.balanceOf")?;
        let ledger = self.ledger.lock().unwrap();
        Ok(ledger.token_balances.get(&owner).copied().unwrap_or_default())
    }

    async fn token_total_supply(&self) -> Result<U256> {
        self.record("token.totalSupply")?;
        Ok(self.ledger.lock().unwrap().total_supply)
    }

    async fn token_id_claimed(&self, token_id: U256) -> Result<bool> {
        self.record("token.tokenIdsClaimed")?;
        Ok(self.ledger.lock().unwrap().claimed.contains(&token_id))
    }

    async fn nft_balance_of(&self, owner: Address) -> Result<U256> {
        self.record("nft.balanceOf")?;
        let ledger = self.ledger.lock().unwrap();
        Ok(U256::from(ledger.nfts.get(&owner).map_or(0, Vec::len)))
    }

    async fn nft_token_of_owner_by_index(&self, owner: Address, index: U256) -> Result<U256> {
        self.record("nft.tokenOfOwnerByIndex")?;
        let ledger = self.ledger.lock().unwrap();
        let index = usize::try_from(index).map_err(|_| Error::ChainRejected("index".into()))?;
        ledger
            .nfts
            .get(&owner)
            .and_then(|ids| ids.get(index).copied())
            .ok_or_else(|| Error::ChainRejected("owner index out of bounds".to_string()))
    }
}

/// Writer bound to one signing account
pub struct MockSigner {
    chain: Arc<MockChain>,
    account: Address,
}

#[async_trait]
impl ChainWriter for MockSigner {
    async fn mint(&self, amount: U256, value: U256) -> Result<TxOutcome> {
        self.chain.record("token.mint")?;
        if value != amount * self.chain.unit_price {
            return Err(Error::ChainRejected("Ether sent is incorrect".to_string()));
        }
        let minted = amount * whole(1);
        let mut ledger = self.chain.ledger.lock().unwrap();
        *ledger.token_balances.entry(self.account).or_default() += minted;
        ledger.total_supply += minted;
        Ok(MockChain::outcome())
    }

    async fn claim(&self) -> Result<TxOutcome> {
        self.chain.record("token.claim")?;
        let mut ledger = self.chain.ledger.lock().unwrap();
        let owned = ledger.nfts.get(&self.account).cloned().unwrap_or_default();
        let unclaimed: Vec<U256> = owned
            .into_iter()
            .filter(|id| !ledger.claimed.contains(id))
            .collect();
        if unclaimed.is_empty() {
            return Err(Error::ChainRejected(
                "You have already claimed all the tokens".to_string(),
            ));
        }
        let minted = U256::from(unclaimed.len()) * whole(self.chain.tokens_per_nft);
        ledger.claimed.extend(unclaimed);
        *ledger.token_balances.entry(self.account).or_default() += minted;
        ledger.total_supply += minted;
        Ok(MockChain::outcome())
    }
}

/// Wallet whose network can be switched and whose prompt can be declined
pub struct MockWallet {
    pub chain: Arc<MockChain>,
    chain_id: Arc<AtomicU64>,
    account: Option<Address>,
    connects: AtomicUsize,
    decline: AtomicBool,
}

impl MockWallet {
    pub fn new(chain: Arc<MockChain>, chain_id: u64, account: Option<Address>) -> Self {
        Self {
            chain,
            chain_id: Arc::new(AtomicU64::new(chain_id)),
            account,
            connects: AtomicUsize::new(0),
            decline: AtomicBool::new(false),
        }
    }

    pub fn switch_network(&self, chain_id: u64) {
        self.chain_id.store(chain_id, Ordering::SeqCst);
    }

    pub fn decline_prompts(&self, decline: bool) {
        self.decline.store(decline, Ordering::SeqCst);
    }

    /// Number of times the user was prompted
    pub fn prompts(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    type Connection = MockConnection;

    async fn connect(&self) -> Result<MockConnection> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.decline.load(Ordering::SeqCst) {
            return Err(Error::ConnectionRejected("user dismissed the prompt".into()));
        }
        Ok(MockConnection {
            chain: self.chain.clone(),
            chain_id: self.chain_id.clone(),
            account: self.account,
        })
    }
}

pub struct MockConnection {
    chain: Arc<MockChain>,
    chain_id: Arc<AtomicU64>,
    account: Option<Address>,
}

#[async_trait]
impl WalletConnection for MockConnection {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    fn active_account(&self) -> Option<Address> {
        self.account
    }

    fn reader(&self) -> Arc<dyn ChainReader> {
        self.chain.clone()
    }

    fn writer(&self) -> Result<Arc<dyn ChainWriter>> {
        let account = self.account.ok_or(Error::NoActiveAccount)?;
        Ok(Arc::new(MockSigner {
            chain: self.chain.clone(),
            account,
        }))
    }
}

//! Shared client state
//!
//! [`DappState`] is the single holder of everything the view renders: the
//! connected flag, the loading flag and the balance snapshot. Fields are only
//! changed through discrete replace operations.

use crate::{Error, Result};
use alloy::primitives::U256;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Cached view of the account's holdings and global supply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenBalanceSnapshot {
    /// Token units held by the connected account (18 decimals)
    pub owned: U256,
    /// Token units minted overall (18 decimals)
    pub total_minted: U256,
    /// NFTs whose free claim is still unused
    pub claimable: U256,
}

/// Snapshot field a refresh publishes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotField {
    Owned,
    TotalMinted,
    Claimable,
}

impl SnapshotField {
    pub fn name(&self) -> &'static str {
        match self {
            SnapshotField::Owned => "owned",
            SnapshotField::TotalMinted => "total_minted",
            SnapshotField::Claimable => "claimable",
        }
    }
}

/// User intent to mint a number of whole tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintRequest {
    amount: u64,
}

impl MintRequest {
    /// Zero is rejected
    pub fn new(amount: u64) -> Result<Self> {
        if amount == 0 {
            return Err(Error::InvalidArgument(
                "mint amount must be greater than zero".to_string(),
            ));
        }
        Ok(Self { amount })
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Wei to attach: `amount * unit_price`
    pub fn payment(&self, unit_price: U256) -> Result<U256> {
        U256::from(self.amount)
            .checked_mul(unit_price)
            .ok_or_else(|| Error::InvalidArgument("mint payment overflows".to_string()))
    }
}

/// State holder shared between the session, the synchronizer and the view
#[derive(Debug, Default)]
pub struct DappState {
    snapshot: RwLock<TokenBalanceSnapshot>,
    connected: AtomicBool,
    loading: AtomicBool,
}

impl DappState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A consistent copy of the snapshot
    pub async fn snapshot(&self) -> TokenBalanceSnapshot {
        *self.snapshot.read().await
    }

    /// Replace one snapshot field
    pub async fn replace(&self, field: SnapshotField, value: U256) {
        let mut snapshot = self.snapshot.write().await;
        match field {
            SnapshotField::Owned => snapshot.owned = value,
            SnapshotField::TotalMinted => snapshot.total_minted = value,
            SnapshotField::Claimable => snapshot.claimable = value,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn mark_connected(&self) {
        self.connected.store(true, Ordering::Release);
    }

    /// Whether a mint or claim is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Enter the loading state; fails with `Busy` if a transaction is already in flight
    pub fn begin_transaction(&self) -> Result<InFlight<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(InFlight { state: self })
    }
}

/// Leaves the loading state when dropped
#[must_use]
pub struct InFlight<'a> {
    state: &'a DappState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.loading.store(false, Ordering::Release);
    }
}

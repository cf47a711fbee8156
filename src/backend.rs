//! Chain backend collaborator
//!
//! The wallet core never talks to the network itself. Everything it needs
//! from the chain (wallet figures, UTXOs, cycle change hashes, previous
//! transactions) and the final broadcast go through [`ChainBackend`].
//! Transport errors are `anyhow::Error` here and get wrapped into
//! [`crate::error::WalletError::Backend`] by the caller.

use crate::error::BackendStep;
use crate::types::*;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[async_trait]
pub trait ChainBackend: Send + Sync {
    /// Content nonce, balance, fee rate and cycle height for a wallet
    async fn fetch_wallet_info(&self, pkh: &Pkh) -> anyhow::Result<WalletInfo>;

    /// Unspent outputs owned by `pkh`, in spending priority order
    async fn fetch_utxos(&self, pkh: &Pkh) -> anyhow::Result<Vec<Utxo>>;

    /// Cycle change hashes seen by the wallet, most recent first
    async fn fetch_cch_list(&self, pkh: &Pkh) -> anyhow::Result<CchList>;

    async fn fetch_transaction(&self, hash: &Hash) -> anyhow::Result<Option<Transaction>>;

    /// Submit a signed transaction
    async fn broadcast(&self, tx: &Transaction) -> anyhow::Result<()>;
}

/// [`ChainBackend`] keeping the chain view in memory
///
/// # Differences with a real backend
///
/// * Broadcast only records the transaction and drops the UTXOs it spends;
///   no new UTXOs are created.
///
/// * Any step can be made to fail with [`MemoryBackend::fail_on`].
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    info: HashMap<Pkh, WalletInfo>,
    utxos: HashMap<Pkh, Vec<Utxo>>,
    cch_list: CchList,
    transactions: HashMap<Hash, Transaction>,
    broadcasts: Vec<Transaction>,
    failing: HashSet<BackendStep>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_wallet_info(&self, pkh: Pkh, info: WalletInfo) {
        self.state().info.insert(pkh, info);
    }

    pub fn set_cch_list(&self, cch_list: CchList) {
        self.state().cch_list = cch_list;
    }

    /// Store a confirmed transaction and return its hash
    pub fn add_transaction(&self, tx: Transaction) -> Hash {
        let hash = tx.hash();
        self.state().transactions.insert(hash, tx);
        hash
    }

    /// Register output `vout` of a stored transaction as unspent
    pub fn add_utxo(&self, tx_id: Hash, vout: u32, mr: u64, cch: Hash) -> Option<Utxo> {
        let mut state = self.state();
        let output = state.transactions.get(&tx_id)?.outputs.get(vout as usize)?.clone();
        let utxo = Utxo {
            tx_id,
            vout,
            output,
            mr,
            cch,
        };
        state.utxos.entry(utxo.output.pkh).or_default().push(utxo.clone());
        Some(utxo)
    }

    pub fn fail_on(&self, step: BackendStep) {
        self.state().failing.insert(step);
    }

    pub fn recover(&self, step: BackendStep) {
        self.state().failing.remove(&step);
    }

    pub fn broadcasts(&self) -> Vec<Transaction> {
        self.state().broadcasts.clone()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, step: BackendStep) -> anyhow::Result<()> {
        if self.state().failing.contains(&step) {
            anyhow::bail!("{} unavailable", step);
        }
        Ok(())
    }
}

#[async_trait]
impl ChainBackend for MemoryBackend {
    async fn fetch_wallet_info(&self, pkh: &Pkh) -> anyhow::Result<WalletInfo> {
        self.check(BackendStep::InfoFetch)?;
        Ok(self.state().info.get(pkh).cloned().unwrap_or_default())
    }

    async fn fetch_utxos(&self, pkh: &Pkh) -> anyhow::Result<Vec<Utxo>> {
        self.check(BackendStep::UtxoFetch)?;
        Ok(self.state().utxos.get(pkh).cloned().unwrap_or_default())
    }

    async fn fetch_cch_list(&self, _pkh: &Pkh) -> anyhow::Result<CchList> {
        self.check(BackendStep::CchFetch)?;
        Ok(self.state().cch_list.clone())
    }

    async fn fetch_transaction(&self, hash: &Hash) -> anyhow::Result<Option<Transaction>> {
        self.check(BackendStep::PrevTxFetch)?;
        Ok(self.state().transactions.get(hash).cloned())
    }

    async fn broadcast(&self, tx: &Transaction) -> anyhow::Result<()> {
        self.check(BackendStep::Broadcast)?;
        let spent: HashSet<OutPoint> = tx
            .inputs
            .iter()
            .filter_map(|input| {
                input.prev_transaction_hash.map(|hash| OutPoint {
                    hash,
                    index: input.vout,
                })
            })
            .collect();

        let mut state = self.state();
        for utxos in state.utxos.values_mut() {
            utxos.retain(|utxo| !spent.contains(&utxo.outpoint()));
        }
        state.transactions.insert(tx.hash(), tx.clone());
        state.broadcasts.push(tx.clone());
        debug!(inputs = tx.inputs.len(), outputs = tx.outputs.len(), "memory backend accepted transaction");
        Ok(())
    }
}

//! Wallet state and actions
//!
//! A [`Wallet`] pairs its [`KeyStore`] with the last synchronized chain view.
//! Every operation that reads or replaces that view takes `&mut self`, so a
//! build can never interleave with a competing synchronize.

use crate::backend::ChainBackend;
use crate::builder::{build_transaction, BuiltTransaction, OutputRequest};
use crate::codec::address_from_pkh;
use crate::config::WalletConfig;
use crate::constants::*;
use crate::constitution::Constitution;
use crate::error::{BackendStep, Result, WalletError};
use crate::keys::{KeyStore, SealedMnemonic};
use crate::melting::total_melted_value;
use crate::script::{ProposalCosts, ScriptVariant};
use crate::types::*;
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Last synchronized chain view of a wallet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    pub utxos: Vec<Utxo>,
    pub cch_list: CchList,
    pub info: WalletInfo,
    /// Highest content nonce handed out locally
    pub content_nonce: u64,
}

/// Persisted form of a wallet; loading and saving it is up to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub sealed: Option<SealedMnemonic>,
    /// Compressed master public key, hex
    pub master_public_key: Option<String>,
    pub state: WalletState,
}

#[derive(Default)]
pub struct Wallet {
    keys: KeyStore,
    state: WalletState,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(keys: KeyStore, state: WalletState) -> Self {
        Self { keys, state }
    }

    pub fn set(&mut self, mnemonic: &str, password: &str, config: &WalletConfig) -> Result<()> {
        self.keys.set(mnemonic, password, &config.kdf)
    }

    /// Replace the mnemonic; the synchronized view belongs to the old keys
    /// and is dropped
    pub fn reset(&mut self, mnemonic: &str, password: &str, config: &WalletConfig) -> Result<()> {
        self.keys.reset(mnemonic, password, &config.kdf)?;
        self.state = WalletState::default();
        Ok(())
    }

    pub fn unlock(&mut self, password: &str) -> Result<()> {
        self.keys.unlock(password)
    }

    pub fn lock(&mut self) {
        self.keys.lock();
    }

    pub fn is_unlocked(&self) -> bool {
        self.keys.is_unlocked()
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    pub fn pkh(&self) -> Result<Pkh> {
        self.keys.master_pkh()
    }

    pub fn address(&self) -> Result<String> {
        Ok(address_from_pkh(&self.pkh()?))
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut WalletState {
        &mut self.state
    }

    pub fn utxos(&self) -> &[Utxo] {
        &self.state.utxos
    }

    pub fn cch_list(&self) -> &[Hash] {
        &self.state.cch_list
    }

    pub fn info(&self) -> &WalletInfo {
        &self.state.info
    }

    /// Total melted value of the synchronized UTXOs
    pub fn balance(&self) -> u64 {
        total_melted_value(&self.state.utxos, &self.state.cch_list)
    }

    /// Fetch info, UTXOs and CCH list; the state is only replaced once all
    /// three succeeded
    pub async fn synchronize<B: ChainBackend + ?Sized>(&mut self, backend: &B) -> Result<()> {
        let pkh = self.pkh()?;
        debug!(address = %address_from_pkh(&pkh), "synchronizing wallet");

        let info = backend
            .fetch_wallet_info(&pkh)
            .await
            .map_err(|e| WalletError::backend(BackendStep::InfoFetch, e))?;
        let utxos = backend
            .fetch_utxos(&pkh)
            .await
            .map_err(|e| WalletError::backend(BackendStep::UtxoFetch, e))?;
        let cch_list = backend
            .fetch_cch_list(&pkh)
            .await
            .map_err(|e| WalletError::backend(BackendStep::CchFetch, e))?;

        if info.content_nonce > self.state.content_nonce {
            self.state.content_nonce = info.content_nonce;
        }
        self.state.utxos = utxos;
        self.state.cch_list = cch_list;
        self.state.info = info;

        info!(
            utxos = self.state.utxos.len(),
            cycles = self.state.cch_list.len(),
            balance = self.balance(),
            "wallet synchronized"
        );
        Ok(())
    }

    /// Next unused content nonce; reserved even if the content is never
    /// published
    pub fn reserve_content_nonce(&mut self) -> Result<u32> {
        let next = self.state.content_nonce.max(self.state.info.content_nonce) + 1;
        let nonce = u32::try_from(next)
            .map_err(|_| WalletError::InvalidScriptFormat(format!("content nonce {} exceeds {}", next, CONTENT_NONCE_MAX)))?;
        self.state.content_nonce = next;
        debug!(nonce, "reserved content nonce");
        Ok(nonce)
    }

    pub async fn send<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        to: Pkh,
        amount: u64,
    ) -> Result<BuiltTransaction> {
        self.build(backend, config, &[OutputRequest::payment(to, amount)]).await
    }

    pub async fn create_thread<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        amount: u64,
    ) -> Result<BuiltTransaction> {
        let (nonce, pkh) = self.next_content_key()?;
        self.publish(backend, config, amount, pkh, ScriptVariant::Thread { nonce, pkh })
            .await
    }

    pub async fn create_rethread<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        target: Pkh,
        amount: u64,
    ) -> Result<BuiltTransaction> {
        let (nonce, pkh) = self.next_content_key()?;
        self.publish(backend, config, amount, pkh, ScriptVariant::Rethread { nonce, pkh, target })
            .await
    }

    pub async fn propose_application<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        amount: u64,
    ) -> Result<BuiltTransaction> {
        let (nonce, pkh) = self.next_content_key()?;
        self.publish(backend, config, amount, pkh, ScriptVariant::ApplicationProposal { nonce, pkh })
            .await
    }

    pub async fn propose_costs<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        costs: ProposalCosts,
        amount: u64,
    ) -> Result<BuiltTransaction> {
        let (nonce, pkh) = self.next_content_key()?;
        self.publish(backend, config, amount, pkh, ScriptVariant::CostProposal { nonce, pkh, costs })
            .await
    }

    pub async fn propose_constitution<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        constitution: Constitution,
        amount: u64,
    ) -> Result<BuiltTransaction> {
        let (nonce, pkh) = self.next_content_key()?;
        let variant = ScriptVariant::ConstitutionProposal {
            nonce,
            pkh,
            constitution,
        };
        self.publish(backend, config, amount, pkh, variant).await
    }

    /// Vote on the proposal whose content hash is `target`
    pub async fn vote<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        target: Pkh,
        accepted: bool,
        amount: u64,
    ) -> Result<BuiltTransaction> {
        self.publish(backend, config, amount, target, ScriptVariant::Vote { target, accepted })
            .await
    }

    /// Reward the content `target`; `vout` is the output the reward is
    /// redistributed through
    pub async fn reward<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        target: Pkh,
        vout: u8,
        amount: u64,
    ) -> Result<BuiltTransaction> {
        self.publish(backend, config, amount, target, ScriptVariant::Reward { target, vout })
            .await
    }

    /// Submit a built transaction; consumed UTXOs leave the local view only
    /// once the backend accepted it
    pub async fn broadcast<B: ChainBackend + ?Sized>(&mut self, backend: &B, tx: &Transaction) -> Result<Hash> {
        if let Err(e) = backend.broadcast(tx).await {
            warn!(error = %e, "broadcast rejected");
            return Err(WalletError::backend(BackendStep::Broadcast, e));
        }

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
        let before = self.state.utxos.len();
        self.state.utxos.retain(|utxo| !spent.contains(&utxo.outpoint()));

        let hash = tx.hash();
        info!(
            tx = %hex::encode(hash),
            spent = before - self.state.utxos.len(),
            "transaction broadcast"
        );
        Ok(hash)
    }

    pub fn to_record(&self) -> WalletRecord {
        WalletRecord {
            sealed: self.keys.sealed().cloned(),
            master_public_key: self.keys.master_public_key().ok().map(|pk| hex::encode(pk.serialize())),
            state: self.state.clone(),
        }
    }

    /// Restore a locked wallet
    pub fn from_record(record: WalletRecord) -> Result<Self> {
        let keys = match (record.sealed, record.master_public_key) {
            (Some(sealed), Some(public_key)) => {
                let bytes = hex::decode(&public_key)
                    .map_err(|_| WalletError::Crypto("invalid master public key encoding".to_string()))?;
                let public_key = PublicKey::from_slice(&bytes).map_err(|e| WalletError::Crypto(e.to_string()))?;
                KeyStore::from_sealed(sealed, public_key)
            }
            (None, None) => KeyStore::new(),
            _ => {
                return Err(WalletError::Crypto(
                    "record holds only half of the key material".to_string(),
                ))
            }
        };
        Ok(Self {
            keys,
            state: record.state,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_record(serde_json::from_str(json)?)
    }

    fn next_content_key(&mut self) -> Result<(u32, Pkh)> {
        if !self.keys.is_unlocked() {
            return Err(WalletError::LockedWallet);
        }
        let nonce = self.reserve_content_nonce()?;
        let pkh = self.keys.content_pkh(nonce as u64)?;
        Ok((nonce, pkh))
    }

    async fn publish<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        amount: u64,
        to: Pkh,
        variant: ScriptVariant,
    ) -> Result<BuiltTransaction> {
        let script = variant.encode_with(&config.script)?;
        let request = OutputRequest::content(to, amount, variant.kind(), script);
        self.build(backend, config, &[request]).await
    }

    async fn build<B: ChainBackend + ?Sized>(
        &mut self,
        backend: &B,
        config: &WalletConfig,
        requests: &[OutputRequest],
    ) -> Result<BuiltTransaction> {
        build_transaction(std::slice::from_mut(self), requests, backend, config).await
    }
}

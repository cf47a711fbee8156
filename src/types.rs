//! Core wallet types

use crate::category::ScriptKind;
use crate::script::Script;
use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Public-key hash: 160-bit hash
pub type Pkh = [u8; 20];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Cycle change hashes, most recent first
pub type CchList = Vec<Hash>;

/// Reference to an output of a previous transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub value: u64,
    pub pkh: Pkh,
    /// Indexes of the inputs funding this output
    pub input_src: Vec<u8>,
    /// Content script, empty for plain transfers
    pub ta: Script,
    pub k: ScriptKind,
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// `None` only for the input of a Lugh transaction
    pub prev_transaction_hash: Option<Hash>,
    pub vout: u32,
    pub script_sig: Script,
}

/// Transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Cycle height marker
    pub lh: u32,
    /// Unix timestamp in seconds
    pub t: i64,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

/// Unspent output owned by a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub tx_id: Hash,
    pub vout: u32,
    pub output: Output,
    /// Melt ratio recorded at `cch`, fixed point over `MR_SCALE`
    pub mr: u64,
    /// Cycle change hash at which `mr` was recorded
    pub cch: Hash,
}

impl Utxo {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            hash: self.tx_id,
            index: self.vout,
        }
    }

    pub fn value(&self) -> u64 {
        self.output.value
    }
}

/// Per-wallet figures returned by the chain backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    /// Last content nonce the network has seen from this wallet
    pub content_nonce: u64,
    pub balance: u64,
    pub fee_per_byte: u64,
    pub lugh_height: u32,
}

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

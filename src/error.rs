//! Error types for the wallet core

use std::fmt;
use thiserror::Error;

/// Network round-trip that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendStep {
    InfoFetch,
    UtxoFetch,
    CchFetch,
    PrevTxFetch,
    Broadcast,
}

impl fmt::Display for BackendStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendStep::InfoFetch => "wallet info fetch",
            BackendStep::UtxoFetch => "UTXO fetch",
            BackendStep::CchFetch => "cycle change hash fetch",
            BackendStep::PrevTxFetch => "previous transaction fetch",
            BackendStep::Broadcast => "broadcast",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Structure mismatch: {0}")]
    StructureMismatch(String),

    #[error("Insufficient funds: need {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("No recorded cycle state to anchor the transaction")]
    MissingCycleState,

    #[error("Invalid script format: {0}")]
    InvalidScriptFormat(String),

    #[error("Script is not a {0}")]
    NotAVariant(&'static str),

    #[error("Wallet is locked")]
    LockedWallet,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Unresolved UTXO: {0}")]
    UnresolvedUtxo(String),

    #[error("Fee did not converge after {0} attempts")]
    FeeConvergence(usize),

    #[error("Transaction limit exceeded: {0}")]
    TransactionLimit(String),

    #[error("Wallet keys are already set")]
    AlreadySet,

    #[error("Wallet keys are not set")]
    NotSet,

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Cryptographic failure: {0}")]
    Crypto(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{step} failed: {source}")]
    Backend {
        step: BackendStep,
        #[source]
        source: anyhow::Error,
    },
}

impl WalletError {
    pub fn backend(step: BackendStep, source: anyhow::Error) -> Self {
        WalletError::Backend { step, source }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;

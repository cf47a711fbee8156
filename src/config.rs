//! Wallet configuration

use crate::constants::*;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Argon2 cost parameters used to protect the mnemonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_KDF_MEMORY_KIB,
            iterations: DEFAULT_KDF_ITERATIONS,
            parallelism: DEFAULT_KDF_PARALLELISM,
        }
    }
}

/// Script engine limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Largest unit cost a cost proposal may carry
    pub max_unit_cost: i64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_unit_cost: DEFAULT_MAX_UNIT_COST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub script: ScriptConfig,
    /// Floor of the fee recomputation cap; the builder also allows one
    /// attempt per candidate UTXO
    pub max_fee_iterations: usize,
    pub kdf: KdfParams,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            script: ScriptConfig::default(),
            max_fee_iterations: DEFAULT_MAX_FEE_ITERATIONS,
            kdf: KdfParams::default(),
        }
    }
}

impl WalletConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

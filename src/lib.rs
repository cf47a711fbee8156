//! # Lugh Wallet
//!
//! Client-side core of a Lugh wallet: the script engine, the melting value
//! model, key management and the transaction builder.
//!
//! ## Architecture
//!
//! Modules build on each other, leaves first:
//! - `codec`, `category`, `constitution` (byte primitives and code tables)
//! - `script` (builder, classifier, parser and tagged variants)
//! - `melting` (spendable value of a UTXO across cycles)
//! - `transaction` (wire form, hashing, signature checks)
//! - `keys` (encrypted mnemonic, derivation, signing)
//! - `builder` and `wallet` (coin selection, fees, signing, sync)
//!
//! Network access goes through the [`backend::ChainBackend`] trait; this
//! crate never opens a connection itself.
//!
//! ## Design Principles
//!
//! 1. **Exact Wire Format**: scripts and transactions encode byte for byte
//!    what the network validators expect
//! 2. **Integer Value Arithmetic**: monetary amounts never go through floats
//! 3. **Exact Version Pinning**: signature and hashing dependencies are pinned
//! 4. **No Partial Results**: a build either yields a fully signed
//!    transaction or an error
//!
//! ## Usage
//!
//! ```rust
//! use lugh_wallet::{Script, ScriptKind};
//!
//! let mut builder = Script::build(ScriptKind::Empty);
//! builder.append().lock_script(&[0xaa; 20]).unwrap();
//! let script = builder.finish();
//!
//! assert!(script.is().lock_script());
//! assert_eq!(script.parse().pkh_from_lock_script().unwrap(), [0xaa; 20]);
//! ```

pub mod backend;
pub mod builder;
pub mod category;
pub mod codec;
pub mod config;
pub mod constants;
pub mod constitution;
pub mod error;
pub mod keys;
pub mod melting;
pub mod script;
pub mod transaction;
pub mod types;
pub mod wallet;

// Re-export commonly used types
pub use backend::{ChainBackend, MemoryBackend};
pub use builder::{build_transaction, BuiltTransaction, OutputRequest};
pub use category::ScriptKind;
pub use config::{KdfParams, ScriptConfig, WalletConfig};
pub use constants::*;
pub use error::{BackendStep, Result, WalletError};
pub use keys::{HeaderSignature, KeyStore};
pub use script::{ProposalCosts, Script, ScriptVariant};
pub use types::*;
pub use wallet::{Wallet, WalletRecord, WalletState};

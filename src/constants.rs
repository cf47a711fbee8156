//! Wallet protocol constants: opcodes, category codes and limits

/// Duplicate the top element
pub const OP_DUP: u8 = 0x76;

/// RIPEMD160(SHA256(x))
pub const OP_HASH160: u8 = 0xa9;

/// Verify the top two elements are equal
pub const OP_EQUALVERIFY: u8 = 0x88;

/// Verify an ECDSA signature against a public key
pub const OP_CHECKSIG: u8 = 0xac;

/// Terminal opcode of every content script
pub const OP_CONTENT: u8 = 0xc1;

// Depth-1 content categories
pub const PROPOSAL: u8 = 0;
pub const THREAD: u8 = 1;
pub const REWARD: u8 = 2;
pub const VOTE: u8 = 3;

// Depth-2 under PROPOSAL
pub const PROPOSAL_APPLICATION: u8 = 0;
pub const PROPOSAL_COSTS: u8 = 1;
pub const PROPOSAL_CONSTITUTION: u8 = 2;

// Depth-2 under THREAD
pub const THREAD_THREAD: u8 = 0;
pub const THREAD_RETHREAD: u8 = 1;

// Depth-2 under VOTE
pub const VOTE_ACCEPTED: u8 = 0;
pub const VOTE_DECLINED: u8 = 1;

// Depth-3 under COSTS
pub const COSTS_THREAD_PRICE: u8 = 0;
pub const COSTS_PROPOSAL_PRICE: u8 = 1;

/// Output kind byte for a plain value transfer
pub const KIND_EMPTY: u8 = 4;

/// Public-key-hash length (RIPEMD160)
pub const PKH_LENGTH: usize = 20;

/// Compressed secp256k1 public key length
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Shortest accepted DER signature
pub const MIN_SIGNATURE_LENGTH: usize = 66;

/// Longest accepted DER signature
pub const MAX_SIGNATURE_LENGTH: usize = 72;

/// Length of every signature this wallet produces: low R and low S, each
/// a full 32 bytes without DER padding
pub const SIGNATURE_LENGTH: usize = 70;

/// Most elements a script may hold (count is one byte on the wire)
pub const MAX_SCRIPT_ELEMENTS: usize = 255;

/// Longest script element (length is two bytes on the wire)
pub const MAX_ELEMENT_LENGTH: usize = u16::MAX as usize;

/// Width of the content nonce element
pub const CONTENT_NONCE_LENGTH: usize = 4;

/// Largest encodable content nonce
pub const CONTENT_NONCE_MAX: u64 = u32::MAX as u64;

/// Width of a cost element in a cost proposal
pub const COST_LENGTH: usize = 8;

/// Cost value meaning "leave this price unchanged"
pub const UNCHANGED_COST: i64 = -1;

/// Default ceiling for a proposed unit cost
pub const DEFAULT_MAX_UNIT_COST: i64 = 1_000_000_000_000;

/// Maximum number of inputs per transaction (input indexes are one byte)
pub const MAX_TX_INPUT: usize = 255;

/// Maximum number of outputs per transaction (output indexes are one byte)
pub const MAX_TX_OUTPUT: usize = 255;

/// Number of rules in a constitution
pub const CONSTITUTION_RULE_COUNT: usize = 10;

/// Longest rule title in bytes
pub const MAX_RULE_TITLE_LENGTH: usize = 60;

/// Longest rule content in bytes
pub const MAX_RULE_CONTENT_LENGTH: usize = 300;

/// Fixed-point scale of melt ratios: `MR_SCALE` is a ratio of 1.0
pub const MR_SCALE: u64 = 100_000_000;

/// Number of cycles after which a fresh output has fully melted
pub const CYCLE_IN_LUGH: u64 = 22;

/// Hard ceiling on the circulating supply
pub const MAX_SUPPLY: u64 = 21_000_000 * 100_000_000;

/// Version byte prepended to encoded addresses
pub const ADDRESS_PREFIX: u8 = 0x1c;

/// Address checksum length
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;

/// Default cap on fee recomputation attempts
pub const DEFAULT_MAX_FEE_ITERATIONS: usize = 32;

/// Argon2 defaults for mnemonic encryption
pub const DEFAULT_KDF_MEMORY_KIB: u32 = 19_456;
pub const DEFAULT_KDF_ITERATIONS: u32 = 2;
pub const DEFAULT_KDF_PARALLELISM: u32 = 1;

/// Argon2 salt length
pub const KDF_SALT_LENGTH: usize = 16;

/// ChaCha20-Poly1305 nonce length
pub const CIPHER_NONCE_LENGTH: usize = 12;

/// Hardened branch holding the wallet master key
pub const MASTER_KEY_BRANCH: u32 = 0;

/// Hardened branch holding per-content keys
pub const CONTENT_KEY_BRANCH: u32 = 1;

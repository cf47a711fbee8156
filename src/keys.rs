//! Key management
//!
//! The wallet secret is a BIP39 mnemonic kept encrypted at rest:
//! - Argon2id turns the password into a 32-byte key
//! - SHA256(key) is stored as the password hash
//! - ChaCha20-Poly1305 encrypts the mnemonic under the key
//!
//! The store moves through `Unset -> Set (locked) <-> Unlocked`. Private key
//! operations require `Unlocked`. The master public key is cached so a locked
//! wallet can still synchronize.
//!
//! Derivation (BIP32 over the BIP39 seed, empty passphrase):
//! - master key: `m/0'`
//! - content key for nonce `n`: `m/1'/n`

use crate::codec::{pkh_from_public_key, sha256};
use crate::config::KdfParams;
use crate::constants::*;
use crate::error::{Result, WalletError};
use crate::types::{Hash, Pkh};
use argon2::{Algorithm, Argon2, Params, Version};
use bip32::{ChildNumber, XPrv};
use bip39::{Language, Mnemonic, Seed};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Encrypted mnemonic as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedMnemonic {
    /// Argon2 salt, hex
    pub salt: String,
    /// ChaCha20-Poly1305 nonce, hex
    pub nonce: String,
    /// Encrypted mnemonic, hex
    pub ciphertext: String,
    /// SHA256 of the derived key, hex
    pub pass_hash: String,
    pub kdf: KdfParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Unset,
    Locked,
    Unlocked,
}

struct UnlockedKeys {
    root: XPrv,
    master: SecretKey,
}

/// Signed request header binding the master public key to a UTC date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSignature {
    pub pubkey: String,
    pub signature: String,
}

#[derive(Default)]
pub struct KeyStore {
    sealed: Option<SealedMnemonic>,
    master_public_key: Option<PublicKey>,
    unlocked: Option<UnlockedKeys>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a locked store from its persisted parts
    pub fn from_sealed(sealed: SealedMnemonic, master_public_key: PublicKey) -> Self {
        Self {
            sealed: Some(sealed),
            master_public_key: Some(master_public_key),
            unlocked: None,
        }
    }

    pub fn state(&self) -> KeyState {
        match (&self.sealed, &self.unlocked) {
            (None, _) => KeyState::Unset,
            (Some(_), None) => KeyState::Locked,
            (Some(_), Some(_)) => KeyState::Unlocked,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state() == KeyState::Unlocked
    }

    pub fn sealed(&self) -> Option<&SealedMnemonic> {
        self.sealed.as_ref()
    }

    /// `Unset -> Set`: encrypt and store the mnemonic; the store stays locked
    pub fn set(&mut self, mnemonic: &str, password: &str, kdf: &KdfParams) -> Result<()> {
        if self.sealed.is_some() {
            return Err(WalletError::AlreadySet);
        }
        self.reset(mnemonic, password, kdf)
    }

    /// Replace whatever mnemonic is stored; the store ends up locked
    pub fn reset(&mut self, mnemonic: &str, password: &str, kdf: &KdfParams) -> Result<()> {
        let keys = derive_keys(mnemonic)?;
        let sealed = seal(mnemonic, password, kdf)?;

        self.master_public_key = Some(PublicKey::from_secret_key(&Secp256k1::signing_only(), &keys.master));
        self.sealed = Some(sealed);
        self.unlocked = None;
        info!("wallet mnemonic stored");
        Ok(())
    }

    /// `Set -> Unlocked`; never touches the stored ciphertext
    pub fn unlock(&mut self, password: &str) -> Result<()> {
        let sealed = self.sealed.as_ref().ok_or(WalletError::NotSet)?;
        let salt = hex::decode(&sealed.salt).map_err(|_| WalletError::Crypto("invalid salt encoding".to_string()))?;
        let key = derive_key(password, &salt, &sealed.kdf)?;

        if hex::encode(sha256(&key[..])) != sealed.pass_hash {
            debug!("unlock rejected: password hash mismatch");
            return Err(WalletError::WrongPassword);
        }

        let nonce_bytes = hex::decode(&sealed.nonce).map_err(|_| WalletError::Crypto("invalid nonce encoding".to_string()))?;
        let ciphertext =
            hex::decode(&sealed.ciphertext).map_err(|_| WalletError::Crypto("invalid ciphertext encoding".to_string()))?;
        if nonce_bytes.len() != CIPHER_NONCE_LENGTH {
            return Err(WalletError::Crypto("invalid nonce length".to_string()));
        }

        let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
            .map_err(|_| WalletError::Crypto("failed to create cipher".to_string()))?;
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
                .map_err(|_| WalletError::Crypto("mnemonic decryption failed".to_string()))?,
        );
        let phrase = std::str::from_utf8(&plaintext)
            .map_err(|_| WalletError::Crypto("invalid mnemonic encoding".to_string()))?;

        let keys = derive_keys(phrase)?;
        self.master_public_key = Some(PublicKey::from_secret_key(&Secp256k1::signing_only(), &keys.master));
        self.unlocked = Some(keys);
        info!("wallet unlocked");
        Ok(())
    }

    /// `Unlocked -> Set`
    pub fn lock(&mut self) {
        if self.unlocked.take().is_some() {
            info!("wallet locked");
        }
    }

    /// Master public key; available while locked
    pub fn master_public_key(&self) -> Result<PublicKey> {
        self.master_public_key.ok_or(WalletError::NotSet)
    }

    pub fn master_pkh(&self) -> Result<Pkh> {
        Ok(pkh_from_public_key(&self.master_public_key()?.serialize()))
    }

    pub fn master_secret_key(&self) -> Result<SecretKey> {
        Ok(self.keys()?.master)
    }

    /// Key pair for the content published under `nonce`
    pub fn content_keypair(&self, nonce: u64) -> Result<(SecretKey, PublicKey)> {
        if nonce > CONTENT_NONCE_MAX {
            return Err(WalletError::InvalidScriptFormat(format!(
                "content nonce {} exceeds {}",
                nonce, CONTENT_NONCE_MAX
            )));
        }
        let keys = self.keys()?;
        let secret = child_secret(&keys.root, &[hardened(CONTENT_KEY_BRANCH)?, ChildNumber::from(nonce as u32)])?;
        let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
        Ok((secret, public))
    }

    pub fn content_pkh(&self, nonce: u64) -> Result<Pkh> {
        let (_, public) = self.content_keypair(nonce)?;
        Ok(pkh_from_public_key(&public.serialize()))
    }

    /// DER signature of a 32-byte digest with the master key
    pub fn sign(&self, digest: &Hash) -> Result<Vec<u8>> {
        sign_digest(&self.keys()?.master, digest)
    }

    /// Header signature for today's UTC date
    pub fn header_signature(&self) -> Result<HeaderSignature> {
        self.header_signature_for(Utc::now().date_naive())
    }

    pub fn header_signature_for(&self, date: NaiveDate) -> Result<HeaderSignature> {
        let keys = self.keys()?;
        let pubkey = hex::encode(self.master_public_key()?.serialize());
        let signature = sign_digest(&keys.master, &header_digest(&pubkey, date))?;
        Ok(HeaderSignature {
            pubkey,
            signature: hex::encode(signature),
        })
    }

    fn keys(&self) -> Result<&UnlockedKeys> {
        match self.state() {
            KeyState::Unset => Err(WalletError::NotSet),
            KeyState::Locked => Err(WalletError::LockedWallet),
            KeyState::Unlocked => self.unlocked.as_ref().ok_or(WalletError::LockedWallet),
        }
    }
}

/// Check a header signature against the date the backend expects
pub fn verify_header_signature(header: &HeaderSignature, date: NaiveDate) -> bool {
    let (Ok(pubkey), Ok(signature)) = (hex::decode(&header.pubkey), hex::decode(&header.signature)) else {
        return false;
    };
    crate::transaction::verify_signature(&pubkey, &signature, &header_digest(&header.pubkey, date))
}

/// SHA256(pubkey_hex || "YYYY-MM-DD")
fn header_digest(pubkey_hex: &str, date: NaiveDate) -> Hash {
    sha256(format!("{}{}", pubkey_hex, date.format("%Y-%m-%d")).as_bytes())
}

fn sign_digest(secret: &SecretKey, digest: &Hash) -> Result<Vec<u8>> {
    let message = Message::from_digest_slice(digest).map_err(|e| WalletError::Crypto(e.to_string()))?;
    let secp = Secp256k1::signing_only();
    let mut signature = secp.sign_ecdsa(&message, secret);
    // grind the RFC6979 nonce with a counter until the DER form is exactly
    // SIGNATURE_LENGTH bytes, as libsecp256k1's low-R grinding does
    let mut entropy = [0u8; 32];
    let mut counter: u32 = 0;
    while signature.serialize_der().len() != SIGNATURE_LENGTH {
        counter = counter.wrapping_add(1);
        entropy[..4].copy_from_slice(&counter.to_le_bytes());
        signature = secp.sign_ecdsa_with_noncedata(&message, secret, &entropy);
    }
    Ok(signature.serialize_der().to_vec())
}

fn derive_key(password: &str, salt: &[u8], kdf: &KdfParams) -> Result<Zeroizing<[u8; 32]>> {
    let params = Params::new(kdf.memory_kib, kdf.iterations, kdf.parallelism, Some(32))
        .map_err(|e| WalletError::Crypto(format!("invalid Argon2 params: {}", e)))?;
    let mut key = Zeroizing::new([0u8; 32]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut *key)
        .map_err(|e| WalletError::Crypto(format!("key derivation failed: {}", e)))?;
    Ok(key)
}

fn seal(mnemonic: &str, password: &str, kdf: &KdfParams) -> Result<SealedMnemonic> {
    let mut salt = [0u8; KDF_SALT_LENGTH];
    let mut nonce_bytes = [0u8; CIPHER_NONCE_LENGTH];
    let mut rng = rand::thread_rng();
    rng.fill(&mut salt);
    rng.fill(&mut nonce_bytes);

    let key = derive_key(password, &salt, kdf)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
        .map_err(|_| WalletError::Crypto("failed to create cipher".to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), mnemonic.as_bytes())
        .map_err(|_| WalletError::Crypto("mnemonic encryption failed".to_string()))?;

    Ok(SealedMnemonic {
        salt: hex::encode(salt),
        nonce: hex::encode(nonce_bytes),
        ciphertext: hex::encode(ciphertext),
        pass_hash: hex::encode(sha256(&key[..])),
        kdf: *kdf,
    })
}

fn derive_keys(phrase: &str) -> Result<UnlockedKeys> {
    let mnemonic =
        Mnemonic::from_phrase(phrase, Language::English).map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    let seed = Seed::new(&mnemonic, "");
    let root = XPrv::new(seed.as_bytes()).map_err(|e| WalletError::Crypto(e.to_string()))?;
    let master = child_secret(&root, &[hardened(MASTER_KEY_BRANCH)?])?;
    Ok(UnlockedKeys { root, master })
}

fn hardened(index: u32) -> Result<ChildNumber> {
    ChildNumber::new(index, true).map_err(|e| WalletError::Crypto(e.to_string()))
}

fn child_secret(root: &XPrv, path: &[ChildNumber]) -> Result<SecretKey> {
    let mut key = root.clone();
    for child in path {
        key = key.derive_child(*child).map_err(|e| WalletError::Crypto(e.to_string()))?;
    }
    let bytes = Zeroizing::new(key.to_bytes());
    SecretKey::from_slice(&bytes[..]).map_err(|e| WalletError::Crypto(e.to_string()))
}

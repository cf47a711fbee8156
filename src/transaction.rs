//! Transaction wire form, hashing and input signatures
//!
//! Layout (big-endian):
//!
//! ```text
//! tx     = lh u32 | t i64 | n_in u16 | input* | n_out u16 | output*
//! input  = hash_len u8 (0|32) | hash | vout u32 | script
//! output = value u64 | n_src u8 | src u8* | ta script | k u8 | pkh [20]
//! ```

use crate::category::ScriptKind;
use crate::codec::*;
use crate::constants::*;
use crate::error::{Result, WalletError};
use crate::keys::KeyStore;
use crate::script::Script;
use crate::types::*;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};

/// Wire size of an unlock script as the wallet signs it
pub const UNLOCK_SCRIPT_SIZE: usize = 1 + (2 + SIGNATURE_LENGTH) + (2 + PUBLIC_KEY_LENGTH);

impl Transaction {
    pub fn new(lh: u32, t: i64, inputs: Vec<Input>, outputs: Vec<Output>) -> Self {
        Self { lh, t, inputs, outputs }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode(false)
    }

    /// Decode a serialized transaction, rejecting trailing bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut reader = Reader { bytes, pos: 0 };
        let lh = decode_uint32(reader.take(4)?)?;
        let t = decode_int64(reader.take(8)?)?;

        let n_in = decode_uint16(reader.take(2)?)? as usize;
        let mut inputs = Vec::with_capacity(n_in.min(MAX_TX_INPUT));
        for _ in 0..n_in {
            let prev_transaction_hash = match decode_uint8(reader.take(1)?)? {
                0 => None,
                32 => Some(to_hash(reader.take(32)?)?),
                _ => return None,
            };
            let vout = decode_uint32(reader.take(4)?)?;
            let script_sig = reader.script()?;
            inputs.push(Input {
                prev_transaction_hash,
                vout,
                script_sig,
            });
        }

        let n_out = decode_uint16(reader.take(2)?)? as usize;
        let mut outputs = Vec::with_capacity(n_out.min(MAX_TX_OUTPUT));
        for _ in 0..n_out {
            let value = decode_uint64(reader.take(8)?)?;
            let n_src = decode_uint8(reader.take(1)?)? as usize;
            let input_src = reader.take(n_src)?.to_vec();
            let ta = reader.script()?;
            let k = ScriptKind::from_byte(decode_uint8(reader.take(1)?)?)?;
            let pkh = to_pkh(reader.take(PKH_LENGTH)?)?;
            outputs.push(Output {
                value,
                pkh,
                input_src,
                ta,
                k,
            });
        }

        if reader.pos != bytes.len() {
            return None;
        }
        Some(Self { lh, t, inputs, outputs })
    }

    pub fn serialized_size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Size the fee is charged on: every unlock script counted at
    /// [`UNLOCK_SCRIPT_SIZE`]. Equal to `serialized_size` once the wallet
    /// has signed every input.
    pub fn fee_size(&self) -> usize {
        let unsigned = self.encode(true).len();
        // each emptied script_sig still takes its count byte
        unsigned + self.inputs.len() * (UNLOCK_SCRIPT_SIZE - 1)
    }

    /// Double SHA-256 of the transaction with every unlock script emptied
    pub fn signing_hash(&self) -> Hash {
        double_sha256(&self.encode(true))
    }

    /// Transaction id: double SHA-256 of the full serialization
    pub fn hash(&self) -> Hash {
        double_sha256(&self.to_bytes())
    }

    /// Cycle-boundary transaction: a single input without a previous hash
    pub fn is_lugh(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prev_transaction_hash.is_none()
    }

    pub fn total_output(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }

    fn encode(&self, strip_scripts: bool) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(encode_uint32(self.lh));
        out.extend(encode_int64(self.t));

        out.extend(encode_uint16(self.inputs.len() as u16));
        for input in &self.inputs {
            match &input.prev_transaction_hash {
                Some(hash) => {
                    out.push(32);
                    out.extend_from_slice(hash);
                }
                None => out.push(0),
            }
            out.extend(encode_uint32(input.vout));
            if strip_scripts {
                Script::new().write_to(&mut out);
            } else {
                input.script_sig.write_to(&mut out);
            }
        }

        out.extend(encode_uint16(self.outputs.len() as u16));
        for output in &self.outputs {
            out.extend(encode_uint64(output.value));
            out.push(output.input_src.len() as u8);
            out.extend_from_slice(&output.input_src);
            output.ta.write_to(&mut out);
            out.push(output.k.as_byte());
            out.extend_from_slice(&output.pkh);
        }
        out
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let slice = self.bytes.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(slice)
    }

    fn script(&mut self) -> Option<Script> {
        let (script, used) = Script::read_from(self.bytes.get(self.pos..)?)?;
        self.pos += used;
        Some(script)
    }
}

/// CheckTransaction: structural rules the client enforces before broadcast
///
/// 1. |ins| > 0 ∧ |outs| > 0
/// 2. |ins| ≤ MAX_TX_INPUT ∧ |outs| ≤ MAX_TX_OUTPUT
/// 3. every non-Lugh input names a previous transaction
/// 4. every output funds itself from existing inputs
/// 5. every content output's script matches its kind
pub fn check_transaction(tx: &Transaction) -> Result<ValidationResult> {
    if tx.inputs.is_empty() || tx.outputs.is_empty() {
        return Ok(ValidationResult::Invalid("Empty inputs or outputs".to_string()));
    }

    if tx.inputs.len() > MAX_TX_INPUT {
        return Ok(ValidationResult::Invalid(format!("Too many inputs: {}", tx.inputs.len())));
    }

    if tx.outputs.len() > MAX_TX_OUTPUT {
        return Ok(ValidationResult::Invalid(format!("Too many outputs: {}", tx.outputs.len())));
    }

    if !tx.is_lugh() {
        if let Some(i) = tx.inputs.iter().position(|input| input.prev_transaction_hash.is_none()) {
            return Ok(ValidationResult::Invalid(format!("Input {} has no previous transaction", i)));
        }
    }

    for (i, output) in tx.outputs.iter().enumerate() {
        if output
            .input_src
            .iter()
            .any(|src| *src as usize >= tx.inputs.len())
        {
            return Ok(ValidationResult::Invalid(format!(
                "Output {} references a missing input",
                i
            )));
        }
        if output.k != ScriptKind::Empty && output.ta.kind() != output.k {
            return Ok(ValidationResult::Invalid(format!(
                "Output {} script does not match kind {:?}",
                i, output.k
            )));
        }
    }

    Ok(ValidationResult::Valid)
}

/// Verify a DER signature over a 32-byte digest
pub fn verify_signature(public_key: &[u8], signature: &[u8], digest: &Hash) -> bool {
    let secp = Secp256k1::verification_only();

    let public_key = match PublicKey::from_slice(public_key) {
        Ok(pk) => pk,
        Err(_) => return false,
    };

    let signature = match Signature::from_der(signature) {
        Ok(sig) => sig,
        Err(_) => return false,
    };

    let message = match Message::from_digest_slice(digest) {
        Ok(msg) => msg,
        Err(_) => return false,
    };

    secp.verify_ecdsa(&message, &signature, &public_key).is_ok()
}

/// Fill input `index`'s unlock script with a signature by the master key
/// of `keys`
pub fn sign_input(tx: &mut Transaction, index: usize, keys: &KeyStore) -> Result<()> {
    if index >= tx.inputs.len() {
        return Err(WalletError::StructureMismatch(format!(
            "input {} out of range for {} inputs",
            index,
            tx.inputs.len()
        )));
    }
    let signature = keys.sign(&tx.signing_hash())?;
    let public_key = keys.master_public_key()?.serialize();

    let mut script = Script::build(ScriptKind::Empty);
    script.append().unlock_script(&signature, &public_key)?;
    tx.inputs[index].script_sig = script.finish();
    Ok(())
}

/// Check input `index` is unlocked by the key locking `prev_output`
pub fn verify_input(tx: &Transaction, index: usize, prev_output: &Output) -> bool {
    let Some(input) = tx.inputs.get(index) else {
        return false;
    };
    let parser = input.script_sig.parse();
    let (Ok(signature), Ok(public_key)) = (
        parser.signature_from_unlock_script(),
        parser.public_key_from_unlock_script(),
    ) else {
        return false;
    };
    pkh_from_public_key(&public_key) == prev_output.pkh
        && verify_signature(&public_key, &signature, &tx.signing_hash())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_transaction() -> Transaction {
        let mut builder = Script::build(ScriptKind::Vote);
        builder.append().vote(&[7; 20], true).unwrap();
        Transaction::new(
            12,
            1_700_000_000,
            vec![Input {
                prev_transaction_hash: Some([1; 32]),
                vout: 0,
                script_sig: Script::new(),
            }],
            vec![
                Output {
                    value: 1_000,
                    pkh: [2; 20],
                    input_src: vec![0],
                    ta: builder.finish(),
                    k: ScriptKind::Vote,
                },
                Output {
                    value: 500,
                    pkh: [3; 20],
                    input_src: vec![0],
                    ta: Script::new(),
                    k: ScriptKind::Empty,
                },
            ],
        )
    }

    #[test]
    fn test_check_transaction_valid() {
        let tx = create_test_transaction();
        assert_eq!(check_transaction(&tx).unwrap(), ValidationResult::Valid);
    }

    #[test]
    fn test_check_transaction_empty_inputs() {
        let mut tx = create_test_transaction();
        tx.inputs.clear();
        assert!(matches!(check_transaction(&tx).unwrap(), ValidationResult::Invalid(_)));
    }

    #[test]
    fn test_check_transaction_dangling_input_src() {
        let mut tx = create_test_transaction();
        tx.outputs[1].input_src = vec![1];
        assert!(matches!(check_transaction(&tx).unwrap(), ValidationResult::Invalid(_)));
    }

    #[test]
    fn test_check_transaction_kind_mismatch() {
        let mut tx = create_test_transaction();
        tx.outputs[0].k = ScriptKind::Thread;
        assert!(matches!(check_transaction(&tx).unwrap(), ValidationResult::Invalid(_)));
    }

    #[test]
    fn test_lugh_detection() {
        let mut tx = create_test_transaction();
        assert!(!tx.is_lugh());
        tx.inputs[0].prev_transaction_hash = None;
        assert!(tx.is_lugh());
        assert_eq!(check_transaction(&tx).unwrap(), ValidationResult::Valid);

        tx.inputs.push(tx.inputs[0].clone());
        assert!(!tx.is_lugh());
        assert!(matches!(check_transaction(&tx).unwrap(), ValidationResult::Invalid(_)));
    }

    #[test]
    fn test_wire_form_decodes() {
        let tx = create_test_transaction();
        let bytes = tx.to_bytes();
        assert_eq!(Transaction::from_bytes(&bytes), Some(tx.clone()));
        assert_eq!(Transaction::from_bytes(&bytes[..bytes.len() - 1]), None);
        assert_eq!(tx.serialized_size(), bytes.len());
    }

    #[test]
    fn test_signing_hash_ignores_unlock_scripts() {
        let mut tx = create_test_transaction();
        let unsigned = tx.signing_hash();
        let before = tx.hash();

        let mut builder = Script::build(ScriptKind::Empty);
        builder.append().unlock_script(&[1; 70], &[2; 33]).unwrap();
        tx.inputs[0].script_sig = builder.finish();

        assert_eq!(tx.signing_hash(), unsigned);
        assert_ne!(tx.hash(), before);
    }

    #[test]
    fn test_fee_size_matches_signed_size() {
        let mut tx = create_test_transaction();
        let reserved = tx.fee_size();

        let mut builder = Script::build(ScriptKind::Empty);
        builder
            .append()
            .unlock_script(&[1; SIGNATURE_LENGTH], &[2; PUBLIC_KEY_LENGTH])
            .unwrap();
        tx.inputs[0].script_sig = builder.finish();

        assert_eq!(tx.serialized_size(), reserved);
        assert_eq!(tx.fee_size(), reserved);
    }

    #[test]
    fn test_total_output() {
        assert_eq!(create_test_transaction().total_output(), 1_500);
    }

    fn signer(unlock: bool) -> KeyStore {
        let kdf = crate::config::KdfParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };
        let mut keys = KeyStore::new();
        keys.set(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
            "pw",
            &kdf,
        )
        .unwrap();
        if unlock {
            keys.unlock("pw").unwrap();
        }
        keys
    }

    #[test]
    fn test_sign_input_then_verify() {
        let keys = signer(true);
        let mut tx = create_test_transaction();
        let reserved = tx.fee_size();
        sign_input(&mut tx, 0, &keys).unwrap();

        let prev_output = Output {
            value: 2_000,
            pkh: keys.master_pkh().unwrap(),
            input_src: vec![0],
            ta: Script::new(),
            k: ScriptKind::Empty,
        };
        assert!(tx.inputs[0].script_sig.is().unlock_script());
        assert!(verify_input(&tx, 0, &prev_output));
        assert_eq!(tx.serialized_size(), reserved);

        let stranger = Output {
            pkh: [0x55; 20],
            ..prev_output
        };
        assert!(!verify_input(&tx, 0, &stranger));
    }

    #[test]
    fn test_sign_input_errors() {
        let mut tx = create_test_transaction();
        assert!(matches!(
            sign_input(&mut tx, 5, &signer(true)),
            Err(WalletError::StructureMismatch(_))
        ));
        assert!(matches!(
            sign_input(&mut tx, 0, &signer(false)),
            Err(WalletError::LockedWallet)
        ));
        assert!(tx.inputs[0].script_sig.is_empty());
    }

    #[test]
    fn test_verify_signature_rejects_garbage() {
        assert!(!verify_signature(&[2; 33], &[0; 70], &[0; 32]));
    }
}

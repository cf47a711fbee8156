//! Byte codec primitives: fixed-width integers, hashes and addresses
//!
//! Integers are big-endian, signed values in two's complement. Decoders take
//! the exact width and return `None` for anything else so that classifiers can
//! treat a malformed element as a miss instead of a fault.

use crate::constants::*;
use crate::types::{Hash, Pkh};
use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

pub fn encode_int8(n: i8) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub fn encode_int16(n: i16) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub fn encode_int32(n: i32) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub fn encode_int64(n: i64) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub fn encode_uint8(n: u8) -> Vec<u8> {
    vec![n]
}

pub fn encode_uint16(n: u16) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub fn encode_uint32(n: u32) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub fn encode_uint64(n: u64) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub fn decode_int8(bytes: &[u8]) -> Option<i8> {
    Some(i8::from_be_bytes(bytes.try_into().ok()?))
}

pub fn decode_int16(bytes: &[u8]) -> Option<i16> {
    Some(i16::from_be_bytes(bytes.try_into().ok()?))
}

pub fn decode_int32(bytes: &[u8]) -> Option<i32> {
    Some(i32::from_be_bytes(bytes.try_into().ok()?))
}

pub fn decode_int64(bytes: &[u8]) -> Option<i64> {
    Some(i64::from_be_bytes(bytes.try_into().ok()?))
}

pub fn decode_uint8(bytes: &[u8]) -> Option<u8> {
    match bytes {
        [b] => Some(*b),
        _ => None,
    }
}

pub fn decode_uint16(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.try_into().ok()?))
}

pub fn decode_uint32(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.try_into().ok()?))
}

pub fn decode_uint64(bytes: &[u8]) -> Option<u64> {
    Some(u64::from_be_bytes(bytes.try_into().ok()?))
}

/// SHA256(x)
pub fn sha256(data: &[u8]) -> Hash {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Sha256::digest(data));
    hash
}

/// RIPEMD160(x)
pub fn ripemd160(data: &[u8]) -> Pkh {
    let mut hash = [0u8; PKH_LENGTH];
    hash.copy_from_slice(&Ripemd160::digest(data));
    hash
}

/// RIPEMD160(SHA256(x))
pub fn hash160(data: &[u8]) -> Pkh {
    ripemd160(&sha256(data))
}

/// SHA256(SHA256(x))
pub fn double_sha256(data: &[u8]) -> Hash {
    let mut hasher = sha256d::Hash::engine();
    hasher.input(data);
    let result = sha256d::Hash::from_engine(hasher);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Public-key hash of a serialized public key
pub fn pkh_from_public_key(public_key: &[u8]) -> Pkh {
    hash160(public_key)
}

/// Hex address: prefix || pkh || checksum
pub fn address_from_pkh(pkh: &Pkh) -> String {
    let mut payload = Vec::with_capacity(1 + PKH_LENGTH + ADDRESS_CHECKSUM_LENGTH);
    payload.push(ADDRESS_PREFIX);
    payload.extend_from_slice(pkh);
    let checksum = double_sha256(&payload);
    payload.extend_from_slice(&checksum[..ADDRESS_CHECKSUM_LENGTH]);
    hex::encode(payload)
}

/// Inverse of [`address_from_pkh`]; `None` on bad hex, prefix or checksum
pub fn pkh_from_address(address: &str) -> Option<Pkh> {
    let bytes = hex::decode(address).ok()?;
    if bytes.len() != 1 + PKH_LENGTH + ADDRESS_CHECKSUM_LENGTH || bytes[0] != ADDRESS_PREFIX {
        return None;
    }
    let (payload, checksum) = bytes.split_at(1 + PKH_LENGTH);
    if double_sha256(payload)[..ADDRESS_CHECKSUM_LENGTH] != *checksum {
        return None;
    }
    let mut pkh = [0u8; PKH_LENGTH];
    pkh.copy_from_slice(&payload[1..]);
    Some(pkh)
}

/// Copy a slice into a fixed 20-byte hash
pub fn to_pkh(bytes: &[u8]) -> Option<Pkh> {
    bytes.try_into().ok()
}

/// Copy a slice into a fixed 32-byte hash
pub fn to_hash(bytes: &[u8]) -> Option<Hash> {
    bytes.try_into().ok()
}

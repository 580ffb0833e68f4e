//! Canonical hash input and digest formatting shared by blocks, mining and
//! validation.

use sha2::{Digest, Sha256};
use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::payload::Payload;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    let digest = Sha256::digest(bytes.as_ref());
    hex::encode(digest)
}

/// Concatenates `index, timestamp, data, previous_hash, nonce` in that order
/// with no delimiter. Reference hashes depend on this exact layout.
pub fn preimage<D: Payload + ?Sized>(
    index: u64,
    timestamp: u64,
    data: &D,
    previous_hash: &str,
    nonce: u64,
) -> String {
    let data = data.canonical();
    let mut out = String::with_capacity(20 + 20 + data.len() + previous_hash.len() + 20);
    // Writing into a String cannot fail.
    let _ = write!(out, "{index}{timestamp}{data}{previous_hash}{nonce}");
    out
}

/// Digest of the canonical preimage.
pub fn block_digest<D: Payload + ?Sized>(
    index: u64,
    timestamp: u64,
    data: &D,
    previous_hash: &str,
    nonce: u64,
) -> String {
    sha256_hex(preimage(index, timestamp, data, previous_hash, nonce))
}

/// Shortens a digest for log lines and dumps, e.g. `0000de1b…5934`.
pub fn abbreviate(hash: &str) -> String {
    const KEEP: usize = 8;
    if hash.len() <= KEEP * 2 || !hash.is_ascii() {
        return hash.to_string();
    }
    format!("{}…{}", &hash[..KEEP], &hash[hash.len() - 4..])
}

/// Seconds since the unix epoch. A clock set before 1970 reads as 0.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

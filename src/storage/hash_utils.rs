/// xxh64 digests for fingerprints and content locators

use xxhash_rust::xxh64::xxh64;

const DIGEST_SEED: u64 = 0;

/// 16-char lowercase hex digest
pub fn hex_digest(data: &[u8]) -> String {
    format!("{:016x}", xxh64(data, DIGEST_SEED))
}

/// True for strings produced by `hex_digest`
pub fn is_hex_digest(candidate: &str) -> bool {
    candidate.len() == 16 && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

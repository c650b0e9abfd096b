//! Salted digest calculation using MD5
//!
//! The digest is the 128-bit MD5 of `salt || value` (plain byte
//! concatenation, no separator), hex encoded in lowercase. Digests must stay
//! stable across releases.

use md5::{Digest, Md5};

/// Length of a hex encoded digest (128 bits)
pub const DIGEST_HEX_LEN: usize = 32;

/// Compute the salted digest of `value`
///
/// # Example
///
/// ```
/// use json_salt::digest::checksum::salted_digest;
///
/// let hash = salted_digest(b"pepper", "foo@bar.com");
/// assert_eq!(hash.len(), 32);
/// assert_eq!(hash, salted_digest(b"pepper", "foo@bar.com"));
/// ```
pub fn salted_digest(salt: &[u8], value: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(salt);
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

//! Deterministic UUID Generation
//!
//! Channel identity must survive playlist refreshes, process restarts and
//! toolchain upgrades, so ids are derived from a SHA-256 digest of the
//! identifying fields rather than from `std`'s randomly seeded hasher.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a deterministic UUID from an ordered list of string parts.
///
/// Parts are length-prefixed before hashing so `["ab", "c"]` and
/// `["a", "bc"]` produce different ids.
///
/// ```rust
/// use openiptv::utils::deterministic_uuid::generate_deterministic_uuid;
///
/// let a = generate_deterministic_uuid(&["BBC News", "http://example.com/bbc.m3u8"]);
/// let b = generate_deterministic_uuid(&["BBC News", "http://example.com/bbc.m3u8"]);
/// assert_eq!(a, b);
/// ```
pub fn generate_deterministic_uuid(parts: &[&str]) -> Uuid {
    let mut hasher = Sha256::new();

    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }

    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

/// Generate the stable id of a playlist channel from its name and stream URL
pub fn generate_channel_id(name: &str, url: &str) -> Uuid {
    generate_deterministic_uuid(&[name, url])
}

//! Metrics and log instrumentation helpers.
//!
//! Spans use `#[instrument(skip_all)]` with explicit field allow-listing.
//! Every field falls into one of three classes: safe to log in plaintext
//! (operation names, outcomes), hashed before logging (usernames,
//! emails), or never logged at all (passwords, tokens, secrets).

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash an identifier for use in log fields (SHA-256, first 8 hex chars).
///
/// Lets log entries about one account be tied together without writing
/// `username` or `email` in plaintext. Do not use this for secrets: the
/// 32-bit truncation trades collision resistance for log brevity, which
/// is fine for a correlation handle and nothing else.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..4])
}

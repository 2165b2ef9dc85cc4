//! Hash-based issue ID generation.
//!
//! IDs have the form `{prefix}-{hash}` (e.g. `hd-a3f8`). The hash is a base36
//! rendering of a SHA-256 digest over the issue content, the current time and
//! a nonce. Collisions with already-known IDs are retried with the next nonce.
//! The hash length adapts to repository size:
//!
//! - up to 500 issues: 4 characters
//! - up to 1,500 issues: 5 characters
//! - beyond: 6 characters

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MAX_HASH_LENGTH: usize = 6;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Every nonce at every permitted length produced a known ID.
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of candidates tried
        attempts: u32,
    },
}

/// Generator that avoids IDs it has already seen.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: String,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a generator seeded with the IDs already in use.
    pub fn new<I, S>(prefix: impl Into<String>, existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            existing_ids: existing.into_iter().map(Into::into).collect(),
        }
    }

    /// Generate a new unique ID and remember it.
    ///
    /// # Errors
    ///
    /// Returns [`IdGenerationError::CollisionExhausted`] if no free ID is found.
    pub fn generate(&mut self, title: &str, description: &str) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut attempts = 0;

        for length in adaptive_length(self.existing_ids.len())..=MAX_HASH_LENGTH {
            for nonce in 0..MAX_NONCE {
                attempts += 1;
                let id = self.hash_id(title, description, timestamp, nonce, length);
                if self.existing_ids.insert(id.clone()) {
                    if nonce > 0 {
                        debug!(nonce, length, "Generated unique ID after collision retries");
                    }
                    return Ok(id);
                }
            }
            warn!(length, max_nonce = MAX_NONCE, "All nonces collided, increasing ID length");
        }

        Err(IdGenerationError::CollisionExhausted { attempts })
    }

    fn hash_id(
        &self,
        title: &str,
        description: &str,
        timestamp: i64,
        nonce: u32,
        length: usize,
    ) -> String {
        let content = format!("{title}|{description}|{timestamp}|{nonce}");
        let digest = Sha256::digest(content.as_bytes());
        format!("{}-{}", self.prefix, encode_base36(&digest[..8], length))
    }
}

/// Hash length for a repository of `size` issues.
fn adaptive_length(size: usize) -> usize {
    match size {
        0..=500 => 4,
        501..=1500 => 5,
        _ => MAX_HASH_LENGTH,
    }
}

/// Render up to eight bytes as exactly `length` base36 digits.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut n = bytes
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_shl(8).wrapping_add(u64::from(b)));

    let mut digits = Vec::with_capacity(length);
    while digits.len() < length {
        digits.push(char::from(BASE36_CHARS[(n % 36) as usize]));
        n /= 36;
    }
    digits.into_iter().rev().collect()
}

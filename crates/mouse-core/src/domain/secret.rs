//! The shared secret that gates every control connection.
//!
//! One [`SecretToken`] is generated when the server starts.  It is printed for
//! the operator, embedded in every discovery reply, and compared against the
//! first line of each control connection.  It is never rotated and never
//! written to disk.
//!
//! # Sharing without locks
//!
//! The token is immutable after creation and stores its text in an
//! `Arc<str>`, so cloning it into each connection task is a reference-count
//! bump and needs no `Mutex`.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use thiserror::Error;

/// Length of a generated token.
pub const TOKEN_LENGTH: usize = 8;

/// Characters a generated token is drawn from.
pub const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Rejection reasons for a caller-supplied token value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("secret token must not be empty")]
    Empty,
    #[error("secret token contains forbidden character {0:?}")]
    ForbiddenChar(char),
}

/// The process-wide credential.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken(Arc<str>);

impl SecretToken {
    /// Generates a fresh [`TOKEN_LENGTH`]-character token from the thread RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng(), TOKEN_LENGTH)
    }

    /// Generates a token of `len` characters from `rng`.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Self {
        let value: String = (0..len)
            .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
            .collect();
        Self(value.into())
    }

    /// Wraps a known value, e.g. a fixed key used by tests.
    ///
    /// # Errors
    ///
    /// The value must be non-empty and free of whitespace and `:` (it is
    /// trimmed on receipt and travels in a colon-delimited reply).
    pub fn from_value(value: impl Into<String>) -> Result<Self, TokenError> {
        let value = value.into();
        if value.is_empty() {
            return Err(TokenError::Empty);
        }
        if let Some(c) = value.chars().find(|c| c.is_whitespace() || *c == ':') {
            return Err(TokenError::ForbiddenChar(c));
        }
        Ok(Self(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact, case-sensitive comparison against a submitted value.
    pub fn matches(&self, submitted: &str) -> bool {
        &*self.0 == submitted
    }
}

impl fmt::Display for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keep the value out of `{:?}` output so it does not leak through debug logs.
impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretToken").field(&"********").finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

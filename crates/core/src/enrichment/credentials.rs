//! Rotating pool of API credentials.

use thiserror::Error;

use crate::external_catalog::Credential;

/// Errors building a credential pool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential pool must contain at least one token")]
    EmptyPool,
}

/// Fixed, ordered set of interchangeable API tokens with a cursor.
///
/// The cursor only moves forward (wrapping) when the current token is
/// rate limited.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    tokens: Vec<String>,
    cursor: usize,
}

impl CredentialPool {
    /// Create a pool starting at the first token.
    pub fn new(tokens: Vec<String>) -> Result<Self, CredentialError> {
        if tokens.is_empty() {
            return Err(CredentialError::EmptyPool);
        }
        Ok(Self { tokens, cursor: 0 })
    }

    /// Number of tokens in the pool.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false; empty pools cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Index of the current token.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The credential lookups should currently use.
    pub fn current(&self) -> Credential<'_> {
        Credential {
            index: self.cursor,
            token: &self.tokens[self.cursor],
        }
    }

    /// Advance to the next token, wrapping around. Returns the new index.
    pub fn rotate(&mut self) -> usize {
        self.cursor = (self.cursor + 1) % self.tokens.len();
        self.cursor
    }
}

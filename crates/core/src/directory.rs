//! Remote directory port.
//!
//! The store loads its collection through [`UserDirectory`]. The web crate
//! implements it over HTTP; tests implement it in memory.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::User;

/// Message used when the directory answers with a non-success status.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch users";

/// Errors that can occur when reading the remote directory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// Transport failure, non-success status, or an undecodable body.
    #[error("{0}")]
    FetchFailed(String),
}

impl DirectoryError {
    /// Human-readable message stored in the load state.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::FetchFailed(message) => message,
        }
    }
}

/// Read access to the full user collection.
///
/// Fetching is idempotent and side-effect free, so callers may retry at
/// will.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch every user, in the order the directory returns them.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::FetchFailed` on transport failure, a
    /// non-success response, or a body that does not decode into users.
    async fn fetch_all(&self) -> Result<Vec<User>, DirectoryError>;
}

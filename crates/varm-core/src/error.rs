//! Error types for offer signing.
//!
//! Two taxonomies live here:
//! - [`StoreError`] is what a [`crate::coordinator::RecordStore`] returns.
//! - [`SignError`] is what [`crate::coordinator::SignCoordinator::sign`]
//!   surfaces to its caller after the retry loop has absorbed recoverable
//!   conflicts.

use thiserror::Error;

/// Errors a record store collaborator can report.
///
/// The `status` fields carry the upstream HTTP status when the store is
/// reached over HTTP; stores with other transports may leave them `None`.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The identifier does not resolve to a record
    #[error("record not found: {0}")]
    NotFound(String),

    /// The store rejected a write because of a concurrent modification
    #[error("write conflict: {message}")]
    Conflict {
        /// Upstream status code, when known (409 or 412 over HTTP)
        status: Option<u16>,
        /// Upstream error message
        message: String,
    },

    /// The store answered with a non-conflict error (validation, auth, ...)
    #[error("store error: {message}")]
    Api {
        /// Upstream status code, when known
        status: Option<u16>,
        /// Upstream error message
        message: String,
    },

    /// The store could not be reached at all
    #[error("transport error: {0}")]
    Transport(String),
}

impl StoreError {
    /// Create a not found error
    #[must_use]
    pub fn not_found(slug: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("offer '{slug}'"))
    }

    /// Create a conflict error
    #[must_use]
    pub fn conflict(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Conflict {
            status,
            message: message.into(),
        }
    }

    /// Create a non-conflict API error
    #[must_use]
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Upstream status code, when the store reported one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Conflict { status, .. } | Self::Api { status, .. } => *status,
            Self::NotFound(_) | Self::Transport(_) => None,
        }
    }
}

/// Terminal failures of a sign operation.
///
/// `AlreadySigned` is deliberately absent: an already-signed offer is a
/// normal outcome, reported as
/// [`crate::coordinator::SignOutcome::AlreadySigned`].
#[derive(Debug, Clone, Error)]
pub enum SignError {
    /// The identifier does not resolve to a record; never retried
    #[error("offer not found: {0}")]
    NotFound(String),

    /// Contention could not be resolved within the attempt budget
    #[error("failed to sign offer after {attempts} attempts due to concurrent modifications")]
    ExhaustedRetries {
        /// How many read+write attempts were made
        attempts: u32,
    },

    /// Any non-conflict read or write failure, surfaced on first occurrence
    #[error("upstream error: {0}")]
    Upstream(StoreError),
}

impl SignError {
    /// True when a fresh `sign` call might succeed later.
    #[must_use]
    pub const fn is_retryable_by_caller(&self) -> bool {
        matches!(self, Self::ExhaustedRetries { .. } | Self::Upstream(_))
    }
}

impl From<StoreError> for SignError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::NotFound(msg),
            other => Self::Upstream(other),
        }
    }
}

/// Result type alias for sign operations
pub type Result<T> = std::result::Result<T, SignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::conflict(Some(409), "record modified");
        assert_eq!(err.to_string(), "write conflict: record modified");

        let err = StoreError::api(Some(422), "unknown field");
        assert_eq!(err.to_string(), "store error: unknown field");
    }

    #[test]
    fn test_store_error_status() {
        assert_eq!(StoreError::conflict(Some(412), "x").status(), Some(412));
        assert_eq!(StoreError::not_found("offer-1").status(), None);
        assert_eq!(StoreError::transport("refused").status(), None);
    }

    #[test]
    fn test_sign_error_from_store_not_found() {
        let err = SignError::from(StoreError::not_found("offer-99"));
        assert!(matches!(err, SignError::NotFound(_)));
        assert!(!err.is_retryable_by_caller());
    }

    #[test]
    fn test_sign_error_from_store_other() {
        let err = SignError::from(StoreError::transport("connection reset"));
        assert!(matches!(err, SignError::Upstream(_)));
        assert!(err.is_retryable_by_caller());
    }

    #[test]
    fn test_exhausted_retries_display() {
        let err = SignError::ExhaustedRetries { attempts: 3 };
        assert!(err.to_string().contains("after 3 attempts"));
    }
}

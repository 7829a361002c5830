//! Write-error classification for retry decision-making.
//!
//! The external store signals concurrent modifications with ad hoc status
//! codes and message text rather than a structured conflict type. The
//! matching rules live here, in pure functions, so the retry loop in
//! [`crate::coordinator`] never inspects message strings itself.

use crate::error::StoreError;

/// Classification of a failed write for the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Concurrent-modification conflict; retryable with backoff.
    Conflict,
    /// Record does not exist; terminal, a retry cannot make it appear.
    NotFound,
    /// Anything else (validation, auth, transport); terminal, surfaced as-is.
    Other,
}

/// Message substrings that mark a write failure as a concurrency conflict.
const CONFLICT_PATTERNS: [&str; 3] = ["record modified", "conflict", "concurrent"];

/// Classify a raw status/message pair.
///
/// A failure is a conflict if and only if one of:
/// - status 409 with a message indicating the record was already
///   modified or locked,
/// - status 412 (precondition failed),
/// - the message contains "record modified", "conflict", or "concurrent".
///
/// Everything else is `Other`; the caller decides what that means.
#[must_use]
pub fn classify_status_message(status: Option<u16>, message: &str) -> ErrorClass {
    let lower = message.to_lowercase();

    if status == Some(412) {
        return ErrorClass::Conflict;
    }

    if status == Some(409)
        && (lower.contains("already") || lower.contains("modified") || lower.contains("locked"))
    {
        return ErrorClass::Conflict;
    }

    if CONFLICT_PATTERNS.iter().any(|p| lower.contains(p)) {
        return ErrorClass::Conflict;
    }

    ErrorClass::Other
}

/// Classify a store error from a failed write.
#[must_use]
pub fn classify_write_error(error: &StoreError) -> ErrorClass {
    match error {
        StoreError::NotFound(_) => ErrorClass::NotFound,
        // Store clients construct the Conflict variant through
        // `classify_status_message`, so the variant is trusted here.
        StoreError::Conflict { .. } => ErrorClass::Conflict,
        StoreError::Api { status, message } => classify_status_message(*status, message),
        StoreError::Transport(_) => ErrorClass::Other,
    }
}

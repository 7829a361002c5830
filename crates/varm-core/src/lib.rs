//! Varm-core - Offer signing coordination
//!
//! This crate provides:
//! - Offer record types
//! - Write-error classification for retry decisions
//! - Bounded exponential backoff
//! - The sign coordinator (read, conditional write, retry loop)

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod backoff;
pub mod classify;
pub mod coordinator;
pub mod error;
pub mod offer;

pub use backoff::RetryOptions;
pub use classify::{classify_status_message, classify_write_error, ErrorClass};
pub use coordinator::{RecordStore, SignCoordinator, SignOutcome};
pub use error::{Result, SignError, StoreError};
pub use offer::{Offer, OfferSlug};

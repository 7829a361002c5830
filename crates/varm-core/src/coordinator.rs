//! Sign coordination: read, conditional write, bounded retry.
//!
//! A [`SignCoordinator`] ensures an offer becomes signed at most once,
//! tolerating transient conflicts from concurrent callers targeting the
//! same slug. It holds no state between calls; correctness of "at most one
//! sign succeeds" rests on the record store rejecting a second concurrent
//! write with a distinguishable conflict signal.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    backoff::RetryOptions,
    classify::{classify_write_error, ErrorClass},
    error::{Result, SignError, StoreError},
    offer::{Offer, OfferSlug},
};

/// External record store collaborator.
///
/// Implementations must enforce conditional-write semantics on
/// `write_signed`: the write succeeds only if the record is not already
/// signed, and a concurrent writer's success surfaces as
/// [`StoreError::Conflict`].
///
/// # Error Conditions
///
/// - `NotFound`: slug does not resolve to a record
/// - `Conflict`: write lost a race against a concurrent writer
/// - `Api`: non-conflict store rejection (validation, auth, ...)
/// - `Transport`: the store could not be reached
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the current state of the offer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the slug resolves to no record.
    /// Returns `Api`/`Transport` on other failures.
    async fn read_offer(&self, slug: &OfferSlug) -> std::result::Result<Offer, StoreError>;

    /// Attempt to set `is_signed = true` and `signed_at = now`.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the record was modified concurrently.
    /// Returns `NotFound`/`Api`/`Transport` on other failures.
    async fn write_signed(&self, slug: &OfferSlug) -> std::result::Result<Offer, StoreError>;
}

/// Successful result of a sign operation.
#[derive(Debug, Clone)]
pub enum SignOutcome {
    /// This call performed the sign; the record is now signed.
    Signed(Offer),
    /// The record was already signed before this call wrote anything.
    /// Idempotent outcome, not a failure of the caller's intent.
    AlreadySigned(Offer),
}

impl SignOutcome {
    /// The offer record in its post-operation state.
    #[must_use]
    pub const fn offer(&self) -> &Offer {
        match self {
            Self::Signed(offer) | Self::AlreadySigned(offer) => offer,
        }
    }
}

/// Executes sign intents against a record store with bounded retries.
///
/// Safe to share and to invoke concurrently; no lock is held across the
/// await points (read, write, backoff sleep).
pub struct SignCoordinator {
    store: Arc<dyn RecordStore>,
    options: RetryOptions,
}

impl SignCoordinator {
    /// Create a coordinator with default retry options.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_options(store, RetryOptions::default())
    }

    /// Create a coordinator with explicit retry options.
    #[must_use]
    pub fn with_options(store: Arc<dyn RecordStore>, options: RetryOptions) -> Self {
        Self { store, options }
    }

    /// Sign the offer identified by `slug`.
    ///
    /// Each attempt performs one read and, unless short-circuited, one
    /// write. Conflicting writes are retried with exponential backoff up
    /// to the configured attempt budget; every other failure is terminal
    /// on first occurrence.
    ///
    /// # Errors
    ///
    /// - [`SignError::NotFound`] when the slug resolves to no record
    /// - [`SignError::ExhaustedRetries`] when every attempt hit a conflict
    /// - [`SignError::Upstream`] on any non-conflict read/write failure
    pub async fn sign(&self, slug: &OfferSlug) -> Result<SignOutcome> {
        let max_attempts = self.options.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tracing::info!(
                    slug = %slug,
                    attempt,
                    max_attempts,
                    "retrying sign operation"
                );
            }

            // Fresh read each attempt: a concurrent writer may have signed
            // the record during the backoff.
            let offer = self.store.read_offer(slug).await.map_err(SignError::from)?;

            if offer.is_signed {
                tracing::info!(slug = %slug, signed_at = ?offer.signed_at, "offer already signed");
                return Ok(SignOutcome::AlreadySigned(offer));
            }

            match self.store.write_signed(slug).await {
                Ok(signed) => {
                    if attempt > 1 {
                        tracing::info!(slug = %slug, attempt, "sign succeeded after retries");
                    }
                    return Ok(SignOutcome::Signed(signed));
                }
                Err(err) => match classify_write_error(&err) {
                    ErrorClass::Conflict if attempt < max_attempts => {
                        let delay = self.options.delay_for_attempt(attempt);
                        tracing::info!(
                            slug = %slug,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "write conflict, backing off"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    ErrorClass::Conflict => {
                        return Err(SignError::ExhaustedRetries {
                            attempts: max_attempts,
                        });
                    }
                    ErrorClass::NotFound => {
                        return Err(SignError::from(err));
                    }
                    ErrorClass::Other => {
                        tracing::warn!(slug = %slug, error = %err, "non-retryable write failure");
                        return Err(SignError::Upstream(err));
                    }
                },
            }
        }

        // The loop always returns: success, terminal error, or exhausted
        // conflict on the final attempt.
        Err(SignError::ExhaustedRetries {
            attempts: max_attempts,
        })
    }
}

impl std::fmt::Debug for SignCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignCoordinator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

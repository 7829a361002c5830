//! Bounded exponential backoff between sign attempts.
//!
//! Worst-case total wait with the defaults is roughly
//! 200ms + 400ms + jitter before the loop gives up, bounded by the
//! per-attempt cap of 1000ms.

use std::time::Duration;

use rand::Rng;

/// Default maximum number of read+write attempts
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay in milliseconds for exponential backoff
const BASE_DELAY_MS: u64 = 200;

/// Maximum delay in milliseconds for a single backoff
const MAX_DELAY_MS: u64 = 1000;

/// Growth factor between consecutive delays
const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Jitter is uniform in `[0, JITTER_FACTOR * delay]`
const JITTER_FACTOR: f64 = 0.3;

/// Configuration for sign retry behavior
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Maximum number of read+write attempts
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds for a single backoff
    pub max_delay_ms: u64,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: BASE_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryOptions {
    /// Create new retry options with the default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of attempts
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set base delay for exponential backoff
    #[must_use]
    pub const fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Set maximum delay for a single backoff
    #[must_use]
    pub const fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Set the growth factor between consecutive delays
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Deterministic part of the delay for the given attempt (1-based):
    /// `min(max_delay, base * multiplier^(attempt-1))`.
    #[must_use]
    pub fn base_delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        #[allow(clippy::cast_precision_loss)]
        let raw = self.base_delay_ms as f64 * self.multiplier.powi(exponent as i32);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let capped = raw.min(self.max_delay_ms as f64) as u64;
        Duration::from_millis(capped)
    }

    /// Full delay for the given attempt: the deterministic base plus a
    /// uniformly random jitter in `[0, 0.3 * base]` so synchronized
    /// retries from concurrent callers spread out.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay_for_attempt(attempt);
        let jitter_ceiling = base.mul_f64(JITTER_FACTOR);
        let jitter_ms = if jitter_ceiling.is_zero() {
            0
        } else {
            rand::rng().random_range(0..=jitter_ceiling.as_millis() as u64)
        };
        base + Duration::from_millis(jitter_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RetryOptions::default();
        assert_eq!(options.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(options.base_delay_ms, BASE_DELAY_MS);
        assert_eq!(options.max_delay_ms, MAX_DELAY_MS);
        assert!((options.multiplier - DEFAULT_MULTIPLIER).abs() < f64::EPSILON);
    }

    #[test]
    fn test_options_builder() {
        let options = RetryOptions::new()
            .with_max_attempts(5)
            .with_base_delay_ms(50)
            .with_max_delay_ms(400)
            .with_multiplier(1.5);

        assert_eq!(options.max_attempts, 5);
        assert_eq!(options.base_delay_ms, 50);
        assert_eq!(options.max_delay_ms, 400);
        assert!((options.multiplier - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_base_delay_doubles_per_attempt() {
        let options = RetryOptions::default();
        assert_eq!(options.base_delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(options.base_delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(options.base_delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn test_base_delay_is_capped() {
        let options = RetryOptions::default();
        assert_eq!(
            options.base_delay_for_attempt(10),
            Duration::from_millis(MAX_DELAY_MS)
        );
    }

    #[test]
    fn test_multiplier_one_point_five() {
        let options = RetryOptions::new().with_multiplier(1.5);
        assert_eq!(options.base_delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(options.base_delay_for_attempt(2), Duration::from_millis(300));
        assert_eq!(options.base_delay_for_attempt(3), Duration::from_millis(450));
    }

    #[test]
    fn test_jitter_stays_within_bound() {
        let options = RetryOptions::default();
        for attempt in 1..=3 {
            let base = options.base_delay_for_attempt(attempt);
            let ceiling = base + base.mul_f64(JITTER_FACTOR);
            for _ in 0..50 {
                let delay = options.delay_for_attempt(attempt);
                assert!(delay >= base);
                assert!(delay <= ceiling + Duration::from_millis(1));
            }
        }
    }

    #[test]
    fn test_zero_base_delay_yields_zero() {
        let options = RetryOptions::new().with_base_delay_ms(0);
        assert_eq!(options.delay_for_attempt(1), Duration::ZERO);
    }
}

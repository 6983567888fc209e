//! Configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration for optimistic-concurrency transactions.
///
/// The store retries a conflicted read-modify-write transparently; this
/// bounds how long a single allocation can churn before it fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TxRetryConfig {
    pub max_retries: u32,
    /// Initial backoff between attempts
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub initial_backoff: Duration,
    /// Backoff ceiling
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub max_backoff: Duration,
    pub backoff_multiplier: f32,
}

impl Default for TxRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(250),
            backoff_multiplier: 2.0,
        }
    }
}

impl TxRetryConfig {
    /// Backoff to sleep after the given zero-based failed attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1.0).powi(attempt as i32);
        let scaled = self.initial_backoff.mul_f32(factor);
        scaled.min(self.max_backoff)
    }
}

// =============================================================================
// TESTS
// =============================================================================

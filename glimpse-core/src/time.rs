//! Time and duration conversion utilities.
//!
//! This module provides safe conversion functions for durations,
//! avoiding truncation issues with explicit saturation behavior.

use std::time::Duration;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    ///
    /// In practice, this is always safe because durations exceeding `u64::MAX`
    /// milliseconds would represent ~584 million years.
    fn as_millis_u64(&self) -> u64;

    /// Fraction of `whole` covered by `self`, expressed as a percentage.
    ///
    /// Returns 0.0 when `whole` is zero.
    fn percent_of(&self, whole: Duration) -> f64;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }

    fn percent_of(&self, whole: Duration) -> f64 {
        if whole.is_zero() {
            return 0.0;
        }
        100.0 * self.as_secs_f64() / whole.as_secs_f64()
    }
}

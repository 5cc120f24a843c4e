//! Aggregate latency status reported by the stats endpoint.

use serde::{Deserialize, Serialize};

/// Count and mean latency of successful accept calls.
///
/// `average` is in microseconds, truncated toward zero. Both fields are zero
/// when no successful call has been recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStatus {
    /// Number of successful accept calls.
    pub total: u64,
    /// Mean elapsed time in microseconds.
    pub average: u64,
}

impl AggregateStatus {
    /// Builds a status from a sample count and the sum of their durations.
    ///
    /// A zero count yields `{ total: 0, average: 0 }` instead of dividing.
    #[must_use]
    pub fn from_totals(total: u64, sum_micros: u128) -> Self {
        if total == 0 {
            return Self::default();
        }
        let average = sum_micros / u128::from(total);
        Self {
            total,
            average: u64::try_from(average).unwrap_or(u64::MAX),
        }
    }
}

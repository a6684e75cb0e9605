//! Quadratic backoff.

use std::time::Duration;

/// Calculate the delay before a retry.
///
/// `attempt` counts retries, starting at 1 for the first retry. The delay is
/// `1000 * attempt²` milliseconds, clamped to `max_ms` when configured.
pub fn delay_for(attempt: u32, max_ms: Option<u64>) -> Duration {
    let delay_ms = (attempt as u64)
        .saturating_mul(attempt as u64)
        .saturating_mul(1000);

    let capped = match max_ms {
        Some(max) => delay_ms.min(max),
        None => delay_ms,
    };

    Duration::from_millis(capped)
}

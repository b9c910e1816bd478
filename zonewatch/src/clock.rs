//! Time helpers.
//!
//! Engine timestamps are Unix milliseconds. The daemon needs them to agree
//! with tokio's timer so deadlines computed from sample timestamps can be
//! slept on, which also keeps paused-time tests deterministic.

use tokio::time::Instant;

/// Current wall-clock time as Unix milliseconds.
pub fn unix_now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Millisecond clock anchored to the wall clock at creation and advanced by
/// tokio's monotonic [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin_ms: u64,
    origin: Instant,
}

impl MonotonicClock {
    /// Anchor a clock at the current wall-clock time.
    pub fn new() -> Self {
        Self::starting_at(unix_now_ms())
    }

    /// Anchor a clock at an explicit Unix timestamp.
    pub fn starting_at(origin_ms: u64) -> Self {
        Self {
            origin_ms,
            origin: Instant::now(),
        }
    }

    /// Current time in Unix milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.origin_ms
            .saturating_add(self.origin.elapsed().as_millis() as u64)
    }

    /// Tokio instant corresponding to a Unix timestamp.
    ///
    /// Timestamps before the anchor map to the anchor itself.
    pub fn instant_at(&self, timestamp_ms: u64) -> Instant {
        let offset = timestamp_ms.saturating_sub(self.origin_ms);
        self.origin + std::time::Duration::from_millis(offset)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unix_now_is_recent() {
        // 2020-01-01
        assert!(unix_now_ms() > 1_577_836_800_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_tokio_time() {
        let clock = MonotonicClock::starting_at(1_000);
        assert_eq!(clock.now_ms(), 1_000);

        tokio::time::advance(Duration::from_millis(2_500)).await;
        assert_eq!(clock.now_ms(), 3_500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_round_trip() {
        let clock = MonotonicClock::starting_at(10_000);
        let at = clock.instant_at(15_000);
        assert_eq!(at - clock.instant_at(10_000), Duration::from_millis(5_000));
        assert_eq!(clock.instant_at(0), clock.instant_at(10_000));
    }
}

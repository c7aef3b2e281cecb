//! Common time/period helpers for lift_core.

use std::time::Duration;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Tick period for a loop rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn tick_period(hz: u32) -> Duration {
    Duration::from_micros((MICROS_PER_SEC / u64::from(hz.max(1))).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_for_common_rates() {
        assert_eq!(tick_period(200), Duration::from_millis(5));
        assert_eq!(tick_period(1), Duration::from_secs(1));
        assert_eq!(tick_period(0), Duration::from_secs(1));
        assert_eq!(tick_period(u32::MAX), Duration::from_micros(1));
    }
}

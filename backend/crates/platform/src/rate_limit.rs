//! Rate Limiting Infrastructure
//!
//! Pure throttle arithmetic shared by request handlers. All counters and
//! anchors live in the backing store; this module only decides, given the
//! elapsed time since a stored anchor, whether a request may proceed.

use std::time::Duration;

/// Resend throttle policy: a short per-send cooldown plus a capped number
/// of sends inside a rolling window.
#[derive(Debug, Clone)]
pub struct ResendThrottle {
    /// Minimum time between two sends to the same destination
    pub cooldown: Duration,
    /// Maximum sends allowed inside one rolling window
    pub max_per_window: u32,
    /// Rolling window duration
    pub window: Duration,
}

impl Default for ResendThrottle {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
            max_per_window: 5,
            window: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl ResendThrottle {
    pub fn new(cooldown_secs: u64, max_per_window: u32, window_secs: u64) -> Self {
        Self {
            cooldown: Duration::from_secs(cooldown_secs),
            max_per_window,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn cooldown_ms(&self) -> i64 {
        self.cooldown.as_millis() as i64
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }

    /// Remaining cooldown in whole seconds (rounded up), given the time
    /// elapsed since the last send. `None` means the cooldown has passed.
    ///
    /// A negative `elapsed_ms` (clock skew) is treated as zero elapsed.
    pub fn cooldown_remaining_secs(&self, elapsed_ms: i64) -> Option<u64> {
        let elapsed_ms = elapsed_ms.max(0);
        let remaining_ms = self.cooldown_ms() - elapsed_ms;
        if remaining_ms <= 0 {
            None
        } else {
            Some((remaining_ms as u64).div_ceil(1000))
        }
    }

    /// Whether the rolling window anchored `elapsed_ms` ago has fully
    /// elapsed, meaning the stored attempt count no longer applies.
    pub fn window_rolled(&self, elapsed_ms: i64) -> bool {
        elapsed_ms >= self.window_ms()
    }

    /// Whether an attempt count inside the current window exhausts the cap.
    pub fn cap_reached(&self, attempts: u32) -> bool {
        attempts >= self.max_per_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let throttle = ResendThrottle::default();
        assert_eq!(throttle.cooldown, Duration::from_secs(60));
        assert_eq!(throttle.max_per_window, 5);
        assert_eq!(throttle.window, Duration::from_secs(86_400));
    }

    #[test]
    fn test_cooldown_remaining_rounds_up() {
        let throttle = ResendThrottle::default();

        // 0.5s elapsed of a 60s cooldown: 59.5s remain, reported as 60
        assert_eq!(throttle.cooldown_remaining_secs(500), Some(60));
        // 59.999s elapsed: 1ms remains, reported as 1
        assert_eq!(throttle.cooldown_remaining_secs(59_999), Some(1));
        assert_eq!(throttle.cooldown_remaining_secs(60_000), None);
        assert_eq!(throttle.cooldown_remaining_secs(90_000), None);
    }

    #[test]
    fn test_cooldown_clock_skew() {
        let throttle = ResendThrottle::default();
        // A send timestamped in the future still blocks for the full cooldown
        assert_eq!(throttle.cooldown_remaining_secs(-5_000), Some(60));
    }

    #[test]
    fn test_window_rolled() {
        let throttle = ResendThrottle::default();
        assert!(!throttle.window_rolled(0));
        assert!(!throttle.window_rolled(86_399_999));
        assert!(throttle.window_rolled(86_400_000));
    }

    #[test]
    fn test_cap_reached() {
        let throttle = ResendThrottle::default();
        assert!(!throttle.cap_reached(0));
        assert!(!throttle.cap_reached(4));
        assert!(throttle.cap_reached(5));
        assert!(throttle.cap_reached(6));
    }
}

//! Trigger-window matching policy.
//!
//! A target is due when the current time has entered the window of
//! `seconds` before it. Instants are compared as absolute epoch
//! milliseconds; no timezone handling is involved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default trigger window in seconds.
pub const DEFAULT_WINDOW_SECONDS: u64 = 60;

/// The span of time, ending at a target moment, during which an alert
/// should fire. Applied uniformly to all watched items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerWindow {
    seconds: u64,
}

impl TriggerWindow {
    pub fn new(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Due when `now <= target <= now + seconds*1000`, half-open on the
    /// past side: a target exactly at `now` is due, a target before `now`
    /// never is -- a missed window does not retroactively fire.
    ///
    /// With `seconds == 0` the window collapses to exact millisecond
    /// equality, which polling granularity will practically never observe.
    /// Accepted quirk of the policy, not rounded away.
    pub fn is_due(&self, now: DateTime<Utc>, target: DateTime<Utc>) -> bool {
        let now_ms = now.timestamp_millis();
        let target_ms = target.timestamp_millis();
        let span_ms = self.seconds.saturating_mul(1000).min(i64::MAX as u64) as i64;
        now_ms <= target_ms && target_ms <= now_ms.saturating_add(span_ms)
    }
}

impl Default for TriggerWindow {
    fn default() -> Self {
        Self {
            seconds: DEFAULT_WINDOW_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at_ms(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn target_at_now_is_due() {
        let window = TriggerWindow::new(60);
        assert!(window.is_due(at_ms(1_000_000), at_ms(1_000_000)));
    }

    #[test]
    fn target_at_window_edge_is_due() {
        let window = TriggerWindow::new(60);
        assert!(window.is_due(at_ms(1_000_000), at_ms(1_000_000 + 60_000)));
        assert!(!window.is_due(at_ms(1_000_000), at_ms(1_000_000 + 60_001)));
    }

    #[test]
    fn past_target_is_never_due() {
        let window = TriggerWindow::new(60);
        assert!(!window.is_due(at_ms(1_000_000), at_ms(999_999)));
    }

    #[test]
    fn zero_window_needs_exact_equality() {
        let window = TriggerWindow::new(0);
        assert!(window.is_due(at_ms(42), at_ms(42)));
        assert!(!window.is_due(at_ms(42), at_ms(43)));
        assert!(!window.is_due(at_ms(42), at_ms(41)));
    }

    proptest! {
        #[test]
        fn matches_reference_policy(
            now_ms in 0i64..4_102_444_800_000i64,
            offset_ms in -600_000i64..600_000i64,
            window_secs in 0u64..86_400u64,
        ) {
            let target_ms = now_ms + offset_ms;
            let window = TriggerWindow::new(window_secs);
            let expected =
                now_ms <= target_ms && target_ms <= now_ms + (window_secs as i64) * 1000;
            prop_assert_eq!(window.is_due(at_ms(now_ms), at_ms(target_ms)), expected);
        }
    }
}

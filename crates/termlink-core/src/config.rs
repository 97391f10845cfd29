// ── Refresh policy ──
//
// Fixed policy values for the Last Entries poller. They are not user
// settings in the panel itself, but the host (and the tests) can hand in
// a different policy at construction time.

use std::time::Duration;

use crate::error::CoreError;
use crate::refresh::Cadence;

pub const NORMAL_MS: u64 = 500;
pub const DEGRADED_MS: u64 = 2000;
pub const DEBOUNCE_MS: u64 = 300;
pub const WATCHDOG_MS: u64 = 3000;
pub const MAX_ENTRIES: usize = 3;
pub const ERROR_THRESHOLD: u32 = 3;

/// Timing and sizing policy for an [`EntryRefreshController`](crate::EntryRefreshController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Recurring timer period while healthy.
    pub normal: Duration,
    /// Recurring timer period after sustained failure.
    pub degraded: Duration,
    /// Minimum gap after a successful load before another may start.
    pub debounce: Duration,
    /// A load still pending after this long is force-completed as a failure.
    pub watchdog: Duration,
    /// Entries kept per cycle.
    pub max_entries: usize,
    /// Cadence degrades once consecutive failures exceed this count.
    pub error_threshold: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            normal: Duration::from_millis(NORMAL_MS),
            degraded: Duration::from_millis(DEGRADED_MS),
            debounce: Duration::from_millis(DEBOUNCE_MS),
            watchdog: Duration::from_millis(WATCHDOG_MS),
            max_entries: MAX_ENTRIES,
            error_threshold: ERROR_THRESHOLD,
        }
    }
}

impl RefreshConfig {
    /// Timer period for the given cadence.
    pub fn period(&self, cadence: Cadence) -> Duration {
        match cadence {
            Cadence::Normal => self.normal,
            Cadence::Degraded => self.degraded,
        }
    }

    /// Reject policies the controller cannot run.
    ///
    /// Both timer periods and the watchdog must be non-zero, and the
    /// degraded cadence may not poll faster than the normal one.
    pub fn validate(&self) -> Result<(), CoreError> {
        let zero = [
            ("normal", self.normal),
            ("degraded", self.degraded),
            ("watchdog", self.watchdog),
        ]
        .into_iter()
        .find(|(_, d)| d.is_zero());
        if let Some((field, _)) = zero {
            return Err(CoreError::Config {
                message: format!("{field} period must be greater than zero"),
            });
        }
        if self.degraded < self.normal {
            return Err(CoreError::Config {
                message: format!(
                    "degraded period ({}ms) is shorter than normal period ({}ms)",
                    self.degraded.as_millis(),
                    self.normal.as_millis()
                ),
            });
        }
        if self.max_entries == 0 {
            return Err(CoreError::Config {
                message: "max_entries must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_constants() {
        let cfg = RefreshConfig::default();
        assert_eq!(cfg.period(Cadence::Normal), Duration::from_millis(500));
        assert_eq!(cfg.period(Cadence::Degraded), Duration::from_millis(2000));
        assert_eq!(cfg.debounce, Duration::from_millis(300));
        assert_eq!(cfg.watchdog, Duration::from_millis(3000));
        assert_eq!(cfg.max_entries, 3);
        assert_eq!(cfg.error_threshold, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_watchdog_is_rejected() {
        let cfg = RefreshConfig {
            watchdog: Duration::ZERO,
            ..RefreshConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("watchdog"), "{err}");
    }

    #[test]
    fn degraded_faster_than_normal_is_rejected() {
        let cfg = RefreshConfig {
            degraded: Duration::from_millis(100),
            ..RefreshConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::scenario::Category;

/// Recommended minimum ratio between the settle timeout and the poll interval.
pub const RECOMMENDED_POLL_RATIO: u64 = 20;

/// Timing budget for observing one scenario.
///
/// Bounds how long the poller may wait for the output surface to settle and
/// how often it samples while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimingProfile {
    /// Maximum time to wait for the oracle to hold
    pub settle_timeout_ms: u64,

    /// Delay between two samples of the output surface
    pub poll_interval_ms: u64,

    /// Grace period after applying input before the first sample
    pub min_settle_delay_ms: u64,
}

impl TimingProfile {
    /// Create a profile, checking the structural invariants.
    pub fn new(
        settle_timeout_ms: u64,
        poll_interval_ms: u64,
        min_settle_delay_ms: u64,
    ) -> Result<Self, TimingError> {
        let profile = Self {
            settle_timeout_ms,
            poll_interval_ms,
            min_settle_delay_ms,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Default profile for a scenario category.
    pub const fn for_category(category: Category) -> Self {
        match category {
            Category::Positive => Self {
                settle_timeout_ms: 15_000,
                poll_interval_ms: 250,
                min_settle_delay_ms: 700,
            },
            Category::Negative => Self {
                settle_timeout_ms: 15_000,
                poll_interval_ms: 250,
                min_settle_delay_ms: 1_000,
            },
            Category::UiBehavior => Self {
                settle_timeout_ms: 15_000,
                poll_interval_ms: 500,
                min_settle_delay_ms: 700,
            },
        }
    }

    /// Check `poll_interval_ms > 0` and `settle_timeout_ms >= min_settle_delay_ms`.
    pub fn validate(&self) -> Result<(), TimingError> {
        if self.poll_interval_ms == 0 {
            return Err(TimingError::ZeroPollInterval);
        }
        if self.settle_timeout_ms < self.min_settle_delay_ms {
            return Err(TimingError::SettleBelowMinimum {
                settle_timeout_ms: self.settle_timeout_ms,
                min_settle_delay_ms: self.min_settle_delay_ms,
            });
        }
        Ok(())
    }

    /// Whether the poll interval is at most 1/20 of the settle timeout.
    pub const fn has_recommended_ratio(&self) -> bool {
        self.poll_interval_ms.saturating_mul(RECOMMENDED_POLL_RATIO) <= self.settle_timeout_ms
    }

    pub const fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn min_settle_delay(&self) -> Duration {
        Duration::from_millis(self.min_settle_delay_ms)
    }
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::for_category(Category::Positive)
    }
}

/// Structural violations of a [`TimingProfile`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimingError {
    #[error("poll_interval_ms must be greater than zero")]
    ZeroPollInterval,

    #[error(
        "settle_timeout_ms ({settle_timeout_ms}) must be at least min_settle_delay_ms ({min_settle_delay_ms})"
    )]
    SettleBelowMinimum {
        settle_timeout_ms: u64,
        min_settle_delay_ms: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_defaults_are_valid() {
        for category in [Category::Positive, Category::Negative, Category::UiBehavior] {
            let profile = TimingProfile::for_category(category);
            assert!(profile.validate().is_ok(), "{category:?} default invalid");
            assert!(profile.has_recommended_ratio(), "{category:?} ratio too coarse");
            assert_eq!(profile.settle_timeout_ms, 15_000);
        }
    }

    #[test]
    fn test_negative_waits_longer_before_first_sample() {
        assert_eq!(
            TimingProfile::for_category(Category::Negative).min_settle_delay_ms,
            1_000
        );
        assert_eq!(
            TimingProfile::for_category(Category::UiBehavior).poll_interval_ms,
            500
        );
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        assert_eq!(
            TimingProfile::new(1_000, 0, 0).unwrap_err(),
            TimingError::ZeroPollInterval
        );
    }

    #[test]
    fn test_settle_below_minimum_rejected() {
        let err = TimingProfile::new(500, 50, 1_000).unwrap_err();
        assert!(matches!(
            err,
            TimingError::SettleBelowMinimum {
                settle_timeout_ms: 500,
                min_settle_delay_ms: 1_000
            }
        ));
    }

    #[test]
    fn test_coarse_ratio_detected() {
        let profile = TimingProfile::new(1_000, 100, 0).unwrap();
        assert!(!profile.has_recommended_ratio());
        assert_eq!(profile.poll_interval(), Duration::from_millis(100));
    }
}

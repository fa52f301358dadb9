//! Configuration for the poll loop
//!
//! A [`PollConfig`] fixes the interval floor, the interval ceiling and the
//! growth factor applied after each unchanged response. It is immutable once a
//! scheduler has started.

use std::time::Duration;

use crate::error::ConfigError;

/// Default interval after a change, and the floor of the backoff range
pub const DEFAULT_BASE_INTERVAL: Duration = Duration::from_millis(2000);

/// Default ceiling for the backoff range
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_millis(30000);

/// Default growth factor per unchanged response
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;

/// Interval policy for a [`PollScheduler`](crate::PollScheduler).
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Interval used right after a change is observed
    /// Default: 2 seconds
    pub base_interval: Duration,

    /// Upper bound the interval grows towards while nothing changes
    /// Default: 30 seconds
    pub max_interval: Duration,

    /// Factor applied to the interval after each unchanged response
    /// Default: 1.5
    pub backoff_multiplier: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            base_interval: DEFAULT_BASE_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight loop for a busy service window
    pub fn fast() -> Self {
        Self {
            base_interval: Duration::from_millis(1000),
            max_interval: Duration::from_secs(10),
            backoff_multiplier: 1.5,
        }
    }

    /// Gentle loop for a quiet board
    pub fn relaxed() -> Self {
        Self {
            base_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(120),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_intervals(mut self, base: Duration, max: Duration) -> Self {
        self.base_interval = base;
        self.max_interval = max;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Reject configurations that would give undefined backoff behaviour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier <= 1.0 {
            return Err(ConfigError::InvalidMultiplier(self.backoff_multiplier));
        }

        if self.base_interval.is_zero() {
            return Err(ConfigError::InvalidInterval(
                "Base interval must be greater than 0".to_string(),
            ));
        }

        if self.max_interval < self.base_interval {
            return Err(ConfigError::IntervalOrder {
                base: self.base_interval,
                max: self.max_interval,
            });
        }

        Ok(())
    }

    /// Interval to use after an unchanged response, given the current one.
    ///
    /// Grows geometrically and is clamped to `[base_interval, max_interval]`.
    pub fn next_interval(&self, current: Duration) -> Duration {
        let current = self.clamp(current);
        let grown = current.as_secs_f64() * self.backoff_multiplier;

        if !grown.is_finite() || grown >= self.max_interval.as_secs_f64() {
            return self.max_interval;
        }

        self.clamp(Duration::from_secs_f64(grown))
    }

    /// Clamp an interval into `[base_interval, max_interval]`
    pub fn clamp(&self, interval: Duration) -> Duration {
        interval.max(self.base_interval).min(self.max_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = PollConfig::default();
        assert_eq!(config.base_interval, Duration::from_millis(2000));
        assert_eq!(config.max_interval, Duration::from_millis(30000));
        assert_eq!(config.backoff_multiplier, 1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_presets() {
        assert!(PollConfig::fast().validate().is_ok());
        assert!(PollConfig::relaxed().validate().is_ok());
        assert!(PollConfig::fast().base_interval < PollConfig::relaxed().base_interval);
    }

    #[rstest]
    #[case(1.0)]
    #[case(0.5)]
    #[case(-2.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_invalid_multiplier_rejected(#[case] multiplier: f64) {
        let config = PollConfig::new().with_backoff_multiplier(multiplier);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMultiplier(_))
        ));
    }

    #[test]
    fn test_interval_order_rejected() {
        let config =
            PollConfig::new().with_intervals(Duration::from_secs(30), Duration::from_secs(10));
        assert_eq!(
            config.validate(),
            Err(ConfigError::IntervalOrder {
                base: Duration::from_secs(30),
                max: Duration::from_secs(10),
            })
        );
    }

    #[test]
    fn test_zero_base_rejected() {
        let config = PollConfig::new().with_intervals(Duration::ZERO, Duration::from_secs(10));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_equal_bounds_allowed() {
        let config =
            PollConfig::new().with_intervals(Duration::from_secs(5), Duration::from_secs(5));
        assert!(config.validate().is_ok());
        assert_eq!(
            config.next_interval(Duration::from_secs(5)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_backoff_sequence() {
        let config = PollConfig::default();
        let mut interval = config.base_interval;
        let mut seen = vec![interval];
        for _ in 0..3 {
            interval = config.next_interval(interval);
            seen.push(interval);
        }

        assert_eq!(
            seen,
            vec![
                Duration::from_millis(2000),
                Duration::from_millis(3000),
                Duration::from_millis(4500),
                Duration::from_millis(6750),
            ]
        );
    }

    #[test]
    fn test_backoff_caps_at_max() {
        let config = PollConfig::default();
        let mut interval = config.base_interval;
        for _ in 0..20 {
            interval = config.next_interval(interval);
        }
        assert_eq!(interval, Duration::from_millis(30000));
        assert_eq!(config.next_interval(interval), Duration::from_millis(30000));
    }
}

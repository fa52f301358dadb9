//! Dashboard configuration
//!
//! Values come from code, from `ORDERBOARD_*` environment variables, or from
//! both: [`DashboardConfig::from_env`] starts from the defaults and overrides
//! whatever the environment sets.

use std::time::Duration;

use poll_scheduler::PollConfig;
use sync_transport::DEFAULT_REQUEST_TIMEOUT;

use crate::error::{OrderBoardError, Result};

/// API base used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

pub const ENV_API_URL: &str = "ORDERBOARD_API_URL";
pub const ENV_BASE_INTERVAL_MS: &str = "ORDERBOARD_BASE_INTERVAL_MS";
pub const ENV_MAX_INTERVAL_MS: &str = "ORDERBOARD_MAX_INTERVAL_MS";
pub const ENV_BACKOFF_MULTIPLIER: &str = "ORDERBOARD_BACKOFF_MULTIPLIER";

/// Everything needed to connect an [`OrderBoard`](crate::OrderBoard)
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// API root, e.g. `http://localhost:8000/api`; the collection lives at `<base_url>/orders/`
    pub base_url: String,

    /// Poll interval policy
    pub poll: PollConfig,

    /// Per-request timeout for every HTTP call
    pub request_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            poll: PollConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl DashboardConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `ORDERBOARD_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            config.base_url = url.trim().to_string();
        }
        if let Some(value) = get(ENV_BASE_INTERVAL_MS) {
            config.poll.base_interval = parse_millis(ENV_BASE_INTERVAL_MS, &value)?;
        }
        if let Some(value) = get(ENV_MAX_INTERVAL_MS) {
            config.poll.max_interval = parse_millis(ENV_MAX_INTERVAL_MS, &value)?;
        }
        if let Some(value) = get(ENV_BACKOFF_MULTIPLIER) {
            config.poll.backoff_multiplier =
                value
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| OrderBoardError::Env {
                        name: ENV_BACKOFF_MULTIPLIER.to_string(),
                        reason: e.to_string(),
                    })?;
        }

        Ok(config)
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the poll policy and the base URL
    pub fn validate(&self) -> Result<()> {
        self.poll.validate()?;
        sync_transport::collection_url(&self.base_url)?;

        if self.request_timeout.is_zero() {
            return Err(OrderBoardError::Env {
                name: "request_timeout".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_millis(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| OrderBoardError::Env {
            name: name.to_string(),
            reason: format!("expected milliseconds, got {:?} ({})", value, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.poll, PollConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://kitchen.example.com/api/"),
            (ENV_BASE_INTERVAL_MS, "1000"),
            (ENV_MAX_INTERVAL_MS, " 60000 "),
            (ENV_BACKOFF_MULTIPLIER, "2.5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://kitchen.example.com/api/");
        assert_eq!(config.poll.base_interval, Duration::from_millis(1000));
        assert_eq!(config.poll.max_interval, Duration::from_millis(60000));
        assert_eq!(config.poll.backoff_multiplier, 2.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = DashboardConfig::from_lookup(lookup(&[(ENV_BASE_INTERVAL_MS, "  ")])).unwrap();
        assert_eq!(config.poll.base_interval, Duration::from_millis(2000));
    }

    #[test]
    fn test_malformed_interval_rejected() {
        let result = DashboardConfig::from_lookup(lookup(&[(ENV_MAX_INTERVAL_MS, "30s")]));
        match result {
            Err(OrderBoardError::Env { name, .. }) => assert_eq!(name, ENV_MAX_INTERVAL_MS),
            other => panic!("Expected Env error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_policy_and_url() {
        let config = DashboardConfig::default()
            .with_poll_config(PollConfig::default().with_backoff_multiplier(0.9));
        assert!(matches!(config.validate(), Err(OrderBoardError::Config(_))));

        let config = DashboardConfig::new("ftp://kitchen.local/api");
        assert!(matches!(config.validate(), Err(OrderBoardError::Transport(_))));
    }
}

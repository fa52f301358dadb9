//! Externally visible poll state and its transition rules

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sync_transport::FetchOutcome;

use crate::config::PollConfig;

/// Connection indicator shown next to the order board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    /// The last attempt returned fresh data
    Connected,
    /// Waiting for, or performing, the next attempt; also the state after an
    /// unchanged response
    Polling,
    /// The last attempt failed
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Polling => "polling",
            ConnectionStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Everything a consumer can read about the poll loop.
///
/// Invariant: `base_interval <= current_interval <= max_interval` after every
/// transition.
#[derive(Debug, Clone, PartialEq)]
pub struct PollState<S> {
    pub status: ConnectionStatus,
    /// Delay before the next attempt
    pub current_interval: Duration,
    /// Unchanged responses since the last change or refresh
    pub consecutive_unchanged: u32,
    /// Last snapshot received; kept across failures
    pub snapshot: Option<S>,
    /// True until the first attempt completes
    pub is_loading: bool,
    /// Cause of the most recent failure, cleared by the next success
    pub last_error: Option<String>,
    /// When `snapshot` was last replaced
    pub last_updated: Option<DateTime<Utc>>,
    /// Completed attempts
    pub poll_count: u64,
}

impl<S> PollState<S> {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            status: ConnectionStatus::Polling,
            current_interval: config.base_interval,
            consecutive_unchanged: 0,
            snapshot: None,
            is_loading: true,
            last_error: None,
            last_updated: None,
            poll_count: 0,
        }
    }

    /// Fold one fetch outcome into the state and return the delay before the
    /// next attempt.
    pub fn apply(&mut self, outcome: FetchOutcome<S>, config: &PollConfig) -> Duration {
        match outcome {
            FetchOutcome::Unchanged => {
                self.status = ConnectionStatus::Polling;
                self.consecutive_unchanged = self.consecutive_unchanged.saturating_add(1);
                self.current_interval = config.next_interval(self.current_interval);
                self.last_error = None;
            }
            FetchOutcome::Updated { snapshot } => {
                self.status = ConnectionStatus::Connected;
                self.consecutive_unchanged = 0;
                self.current_interval = config.base_interval;
                self.snapshot = Some(snapshot);
                self.last_updated = Some(Utc::now());
                self.last_error = None;
            }
            FetchOutcome::Failed { cause } => {
                // Failures neither grow nor reset the backoff
                self.status = ConnectionStatus::Error;
                self.current_interval = config.clamp(self.current_interval);
                self.last_error = Some(cause.to_string());
            }
        }

        self.is_loading = false;
        self.poll_count += 1;
        self.current_interval
    }

    /// Back to the most aggressive interval, as on an explicit refresh
    pub fn reset_interval(&mut self, config: &PollConfig) {
        self.current_interval = config.base_interval;
        self.consecutive_unchanged = 0;
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }
}

//! # poll-scheduler
//!
//! Adaptive poll loop for a collection that changes often but irregularly and
//! offers no push channel.
//!
//! The loop calls a [`Fetcher`](sync_transport::Fetcher), turns the outcome
//! into the next delay, and publishes a [`PollState`] that consumers read or
//! watch:
//!
//! ```text
//! Unchanged -> Polling,   interval = min(interval * multiplier, max)
//! Updated   -> Connected, interval = base, snapshot replaced
//! Failed    -> Error,     interval and snapshot kept
//! ```
//!
//! An unchanging resource is probed geometrically less often, while any
//! observed change drops straight back to the base interval. [`PollScheduler::refresh`]
//! collapses the current wait when the caller knows something just changed.
//!
//! ```rust,ignore
//! let scheduler = PollScheduler::start(PollConfig::default(), transport)?;
//! let mut updates = scheduler.subscribe();
//! while updates.changed().await.is_ok() {
//!     let state = updates.borrow().clone();
//!     println!("{} (next poll in {:?})", state.status, state.current_interval);
//! }
//! ```

mod config;
mod error;
mod scheduler;
mod state;

pub use config::{
    PollConfig, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_INTERVAL, DEFAULT_MAX_INTERVAL,
};
pub use error::{ConfigError, Result, SchedulerError};
pub use scheduler::PollScheduler;
pub use state::{ConnectionStatus, PollState};

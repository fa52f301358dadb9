//! Poll loop task and its control handle
//!
//! The loop dispatches one fetch, folds the outcome into [`PollState`], then
//! waits for whichever comes first: the outcome-derived delay, a refresh
//! request, or cancellation. The next fetch is only dispatched after the
//! previous one resolved, so a slow backend never sees overlapping requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sync_transport::Fetcher;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::PollConfig;
use crate::error::{Result, SchedulerError};
use crate::state::{ConnectionStatus, PollState};

/// Explicit at-most-one-fetch guard around dispatch
#[derive(Debug, Clone, Default)]
struct SingleFlight {
    busy: Arc<AtomicBool>,
}

struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    fn try_acquire(&self) -> Option<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// State shared between the handle and the loop task
struct Shared<S> {
    config: PollConfig,
    state: watch::Sender<PollState<S>>,
    refresh: Notify,
    cancel: CancellationToken,
    flight: SingleFlight,
}

/// Handle to a running poll loop.
///
/// Dropping the handle stops the loop.
pub struct PollScheduler<S> {
    shared: Arc<Shared<S>>,
    task: Option<JoinHandle<()>>,
}

impl<S> PollScheduler<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Validate `config` and start polling with `fetcher` on the current tokio
    /// runtime. The first fetch is dispatched immediately.
    pub fn start<F>(config: PollConfig, fetcher: F) -> Result<Self>
    where
        F: Fetcher<Snapshot = S> + 'static,
    {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SchedulerError::NoRuntime(e.to_string()))?;

        let (state, _rx) = watch::channel(PollState::new(&config));
        let shared = Arc::new(Shared {
            config,
            state,
            refresh: Notify::new(),
            cancel: CancellationToken::new(),
            flight: SingleFlight::default(),
        });

        info!(
            base_interval = ?shared.config.base_interval,
            max_interval = ?shared.config.max_interval,
            backoff_multiplier = shared.config.backoff_multiplier,
            "Starting poll loop"
        );

        let task = runtime.spawn(poll_loop(Arc::clone(&shared), fetcher));

        Ok(Self {
            shared,
            task: Some(task),
        })
    }
}

impl<S> PollScheduler<S> {
    /// Skip the pending wait and fetch now, starting again from the base interval.
    ///
    /// If a fetch is already in flight, one more fetch follows as soon as it
    /// resolves; two fetches never overlap. Does nothing after [`stop`](Self::stop).
    pub fn refresh(&self) {
        if self.shared.cancel.is_cancelled() {
            debug!("Refresh ignored, poll loop is stopped");
            return;
        }

        let config = &self.shared.config;
        self.shared
            .state
            .send_modify(|state| state.reset_interval(config));
        self.shared.refresh.notify_one();
        debug!("Refresh requested");
    }

    /// Cancel the pending wait and any in-flight fetch; no further fetches
    /// are dispatched. Idempotent.
    pub fn stop(&self) {
        if !self.shared.cancel.is_cancelled() {
            info!("Stopping poll loop");
            self.shared.cancel.cancel();
        }
    }

    /// Stop and wait for the loop task to finish
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop();
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| SchedulerError::TaskJoin(e.to_string())),
            None => Ok(()),
        }
    }

    /// Receiver that sees every state change
    pub fn subscribe(&self) -> watch::Receiver<PollState<S>> {
        self.shared.state.subscribe()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.state.borrow().status
    }

    pub fn current_interval(&self) -> Duration {
        self.shared.state.borrow().current_interval
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().is_loading
    }

    /// True while a fetch is in flight
    pub fn is_fetching(&self) -> bool {
        self.shared.flight.is_busy()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// True until the loop task has ended
    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    pub fn config(&self) -> &PollConfig {
        &self.shared.config
    }
}

impl<S: Clone> PollScheduler<S> {
    /// Copy of the current state
    pub fn state(&self) -> PollState<S> {
        self.shared.state.borrow().clone()
    }

    /// Copy of the last snapshot, if any
    pub fn snapshot(&self) -> Option<S> {
        self.shared.state.borrow().snapshot.clone()
    }
}

impl<S> Drop for PollScheduler<S> {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

impl<S> std::fmt::Debug for PollScheduler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("PollScheduler")
            .field("config", &self.shared.config)
            .field("status", &state.status)
            .field("current_interval", &state.current_interval)
            .field("stopped", &self.shared.cancel.is_cancelled())
            .finish()
    }
}

/// Why the loop woke up after a wait
enum Wake {
    Timer,
    Refresh,
}

async fn poll_loop<S, F>(shared: Arc<Shared<S>>, mut fetcher: F)
where
    F: Fetcher<Snapshot = S>,
{
    loop {
        let outcome = {
            let Some(_guard) = shared.flight.try_acquire() else {
                error!("Fetch already in flight, refusing to dispatch another");
                break;
            };

            tokio::select! {
                biased;
                _ = shared.cancel.cancelled() => {
                    debug!("Poll loop cancelled during fetch; result discarded");
                    break;
                }
                outcome = fetcher.fetch() => outcome,
            }
        };

        // A result that lands after stop() must not touch the state
        if shared.cancel.is_cancelled() {
            break;
        }

        let kind = outcome.kind();
        let mut delay = Duration::ZERO;
        shared.state.send_modify(|state| {
            delay = state.apply(outcome, &shared.config);
        });

        {
            let state = shared.state.borrow();
            match state.status {
                ConnectionStatus::Error => warn!(
                    error = state.last_error.as_deref().unwrap_or("unknown"),
                    next_in = ?delay,
                    "Fetch failed, retrying after current interval"
                ),
                _ => debug!(
                    outcome = kind,
                    consecutive_unchanged = state.consecutive_unchanged,
                    next_in = ?delay,
                    "Fetch applied"
                ),
            }
        }

        let wake = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => break,
            _ = shared.refresh.notified() => Wake::Refresh,
            _ = tokio::time::sleep(delay) => Wake::Timer,
        };

        if let Wake::Refresh = wake {
            // Also covers a refresh that arrived while the last fetch was in flight
            shared
                .state
                .send_modify(|state| state.reset_interval(&shared.config));
            debug!("Dispatching refresh fetch");
        }
    }

    info!("Poll loop ended");
}

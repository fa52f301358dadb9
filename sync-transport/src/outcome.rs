//! Three-way result of a single fetch attempt

use crate::error::FetchError;

/// What one fetch attempt observed.
///
/// Produced exactly once per attempt. Transport and status problems are
/// reported as [`FetchOutcome::Failed`], never as a Rust error, so callers
/// always have exactly three cases to handle.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<S> {
    /// The server confirmed the cached view is still current (304)
    Unchanged,
    /// The server returned a fresh snapshot (200)
    Updated { snapshot: S },
    /// The attempt failed; the cause is human-readable
    Failed { cause: FetchError },
}

impl<S> FetchOutcome<S> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FetchOutcome::Unchanged)
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, FetchOutcome::Updated { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::Unchanged => "unchanged",
            FetchOutcome::Updated { .. } => "updated",
            FetchOutcome::Failed { .. } => "failed",
        }
    }

    pub fn snapshot(self) -> Option<S> {
        match self {
            FetchOutcome::Updated { snapshot } => Some(snapshot),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(S) -> U>(self, f: F) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Unchanged => FetchOutcome::Unchanged,
            FetchOutcome::Updated { snapshot } => FetchOutcome::Updated { snapshot: f(snapshot) },
            FetchOutcome::Failed { cause } => FetchOutcome::Failed { cause },
        }
    }
}

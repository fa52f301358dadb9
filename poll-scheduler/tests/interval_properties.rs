//! Property-based tests for the interval policy
//!
//! Arbitrary outcome sequences are folded into a `PollState` and the bounds and
//! reset rules are checked after every single transition.

use std::time::Duration;

use poll_scheduler::{ConnectionStatus, PollConfig, PollState};
use proptest::prelude::*;
use sync_transport::{FetchError, FetchOutcome};

#[derive(Debug, Clone, Copy)]
enum Step {
    Unchanged,
    Updated,
    Failed,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Unchanged),
        1 => Just(Step::Updated),
        1 => Just(Step::Failed),
    ]
}

/// Valid configurations: base in [1ms, 10s], max >= base, multiplier in (1, 4]
fn config_strategy() -> impl Strategy<Value = PollConfig> {
    (1u64..10_000, 0u64..120_000, 1.01f64..4.0).prop_map(|(base, extra, multiplier)| {
        PollConfig::default()
            .with_intervals(
                Duration::from_millis(base),
                Duration::from_millis(base + extra),
            )
            .with_backoff_multiplier(multiplier)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* valid configuration and outcome sequence, the interval stays
    /// within `[base_interval, max_interval]` after every transition.
    #[test]
    fn prop_interval_stays_in_bounds(
        config in config_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..60),
    ) {
        prop_assert!(config.validate().is_ok());
        let mut state: PollState<u32> = PollState::new(&config);

        for (i, step) in steps.iter().enumerate() {
            let before = state.clone();
            let outcome = match step {
                Step::Unchanged => FetchOutcome::Unchanged,
                Step::Updated => FetchOutcome::Updated { snapshot: i as u32 },
                Step::Failed => FetchOutcome::Failed {
                    cause: FetchError::Status { status: 500 },
                },
            };

            let delay = state.apply(outcome, &config);

            prop_assert_eq!(delay, state.current_interval);
            prop_assert!(state.current_interval >= config.base_interval);
            prop_assert!(state.current_interval <= config.max_interval);

            match step {
                Step::Unchanged => {
                    prop_assert_eq!(state.status, ConnectionStatus::Polling);
                    prop_assert!(state.current_interval >= before.current_interval);
                    prop_assert_eq!(state.consecutive_unchanged, before.consecutive_unchanged + 1);
                    prop_assert_eq!(state.snapshot, before.snapshot);
                }
                Step::Updated => {
                    prop_assert_eq!(state.status, ConnectionStatus::Connected);
                    prop_assert_eq!(state.current_interval, config.base_interval);
                    prop_assert_eq!(state.consecutive_unchanged, 0);
                    prop_assert_eq!(state.snapshot, Some(i as u32));
                }
                Step::Failed => {
                    prop_assert_eq!(state.status, ConnectionStatus::Error);
                    prop_assert_eq!(state.current_interval, before.current_interval);
                    prop_assert_eq!(state.consecutive_unchanged, before.consecutive_unchanged);
                    prop_assert_eq!(state.snapshot, before.snapshot);
                }
            }
        }
    }

    /// *For any* run of unchanged responses, the interval never shrinks and
    /// reaches the ceiling eventually.
    #[test]
    fn prop_unchanged_run_is_monotonic(config in config_strategy()) {
        let mut state: PollState<u32> = PollState::new(&config);
        let mut previous = state.current_interval;

        for _ in 0..2_000 {
            state.apply(FetchOutcome::Unchanged, &config);
            prop_assert!(state.current_interval >= previous);
            previous = state.current_interval;
            if previous == config.max_interval {
                break;
            }
        }

        prop_assert_eq!(state.current_interval, config.max_interval);
    }
}

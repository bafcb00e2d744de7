//! Minute-resolution daily trigger.
//!
//! [`poll`] is a pure function over an explicit [`TriggerState`]; the caller
//! owns the state and feeds it back on every tick. It must be called at least
//! once inside every wall-clock minute, otherwise the run minute can be
//! skipped entirely. Nothing here compensates for a missed window.

use chrono::NaiveDateTime;

use crate::run_config::RunAt;

/// Result of one trigger poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    /// First poll inside the run minute: start a run.
    Fire,
    /// Still inside a run minute that already fired.
    Suppressed,
    /// Outside the run minute.
    NoMatch,
}

/// Remembers which run minute has already fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerState {
    last_fired_minute: Option<NaiveDateTime>,
}

impl TriggerState {
    #[must_use]
    pub fn last_fired_minute(&self) -> Option<NaiveDateTime> {
        self.last_fired_minute
    }
}

/// Decide whether `now` opens the daily run window.
///
/// Returns the state to use for the next poll alongside the decision.
#[must_use]
pub fn poll(state: TriggerState, run_at: RunAt, now: NaiveDateTime) -> (TriggerState, FireDecision) {
    if !run_at.matches(now.time()) {
        return (TriggerState::default(), FireDecision::NoMatch);
    }

    let window = now.date().and_time(run_at.as_naive_time());
    if state.last_fired_minute == Some(window) {
        return (state, FireDecision::Suppressed);
    }

    (
        TriggerState {
            last_fired_minute: Some(window),
        },
        FireDecision::Fire,
    )
}

//! Minute-granularity trigger plus the single-run guard.
//!
//! The scheduler calls [`Orchestrator::tick`] on every poll. At most one run
//! is ever in flight; a trigger that fires while a run is still going is
//! logged and dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDateTime;
use salesync_core::{poll, FireDecision, RunAt, TriggerState};
use tokio::task::JoinHandle;

use crate::pipeline::{Pipeline, RunReport, SalesSource};

/// What a single tick did.
#[derive(Debug)]
pub enum TickAction {
    NoMatch,
    /// Already fired for this minute.
    Suppressed,
    Started(JoinHandle<RunReport>),
    /// The trigger fired but a previous run is still in flight.
    SkippedBusy,
}

pub struct Orchestrator<S> {
    run_at: RunAt,
    trigger: Mutex<TriggerState>,
    running: Arc<AtomicBool>,
    pipeline: Pipeline<S>,
}

/// Clears the running flag when the run ends, however it ends.
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl<S: SalesSource + 'static> Orchestrator<S> {
    pub fn new(run_at: RunAt, pipeline: Pipeline<S>) -> Self {
        Self {
            run_at,
            trigger: Mutex::new(TriggerState::default()),
            running: Arc::new(AtomicBool::new(false)),
            pipeline,
        }
    }

    pub fn run_at(&self) -> RunAt {
        self.run_at
    }

    /// Claim the run slot, or `None` if a run is already in flight.
    pub fn try_begin_run(&self) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                running: Arc::clone(&self.running),
            })
    }

    /// Evaluate the trigger at local time `now`, spawning a run on fire.
    pub fn tick(self: &Arc<Self>, now: NaiveDateTime) -> TickAction {
        let decision = {
            let mut state = self.trigger.lock().unwrap_or_else(PoisonError::into_inner);
            let (next, decision) = poll(*state, self.run_at, now);
            *state = next;
            decision
        };

        match decision {
            FireDecision::NoMatch => TickAction::NoMatch,
            FireDecision::Suppressed => TickAction::Suppressed,
            FireDecision::Fire => {
                let Some(guard) = self.try_begin_run() else {
                    tracing::warn!(
                        run_at = %self.run_at,
                        "scheduler: previous run still in progress; skipping this trigger"
                    );
                    return TickAction::SkippedBusy;
                };

                tracing::info!(run_at = %self.run_at, now = %now, "scheduler: trigger fired, starting run");
                let this = Arc::clone(self);
                let today = now.date();
                TickAction::Started(tokio::spawn(async move {
                    let _guard = guard;
                    let report = this.pipeline.run(today).await;
                    report.log_summary();
                    report
                }))
            }
        }
    }
}

//! Deferred draft patches for simulated verification steps.
//!
//! Screens that fake an asynchronous check ("verifying…") schedule the
//! outcome as a patch with a fixed delay. Each patch carries the controller
//! generation it was scheduled under; if the user navigates before the delay
//! elapses, the generation no longer matches and the stale patch is dropped
//! instead of mutating a no-longer-current step's state.

use crate::catalog::StepId;
use crate::store::FormDraft;
use std::time::{Duration, Instant};
use tracing::debug;

/// A draft patch waiting for its delay to elapse.
#[derive(Debug, Clone)]
pub struct DeferredPatch {
    /// The step that scheduled the patch.
    pub step: StepId,
    pub patch: FormDraft,
    due: Instant,
    generation: u64,
}

/// Single-threaded queue of deferred patches, drained by the host event loop.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<DeferredPatch>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        step: StepId,
        patch: FormDraft,
        delay: Duration,
        now: Instant,
        generation: u64,
    ) {
        self.pending.push(DeferredPatch {
            step,
            patch,
            due: now + delay,
            generation,
        });
    }

    /// Removes and returns every due patch whose generation still matches the
    /// controller's. Due-but-stale patches are discarded with a diagnostic;
    /// not-yet-due patches stay queued.
    pub fn take_due(&mut self, now: Instant, current_generation: u64) -> Vec<DeferredPatch> {
        let mut fired = Vec::new();
        let mut waiting = Vec::new();
        for deferred in std::mem::take(&mut self.pending) {
            if deferred.due > now {
                waiting.push(deferred);
            } else if deferred.generation == current_generation {
                fired.push(deferred);
            } else {
                debug!(step_id = %deferred.step, "dropping stale deferred patch");
            }
        }
        self.pending = waiting;
        fired
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

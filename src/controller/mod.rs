//! The journey state machine: owns the ordered step list, the cursor into it,
//! and the optional branch overlay.

use crate::catalog::{Step, StepCatalog, StepId};
use crate::journey::{JourneyType, build_steps};
use tracing::{debug, warn};

mod scheduler;
mod watchdog;

pub use scheduler::{DeferredPatch, Scheduler};
pub use watchdog::InactivityWatchdog;

/// Where the controller currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyPhase {
    /// No journey in progress (fresh launch or after reset).
    Idle,
    /// A journey is underway and the cursor is before the last step.
    Active,
    /// The cursor sits on the last step of the sequence.
    Terminal,
}

/// The core navigation state machine.
///
/// A `BranchOverlay` sub-state exists orthogonally to the phase: while a
/// branch target is set, the rendered screen is the branch screen regardless
/// of the cursor, and any forward/back navigation clears it first.
///
/// Every operation on a missing id degrades to a no-op with a diagnostic —
/// a stale persisted id must never crash a resumed session.
#[derive(Debug, Clone)]
pub struct JourneyController {
    journey_type: Option<JourneyType>,
    steps: Vec<Step>,
    current_index: usize,
    branch: Option<StepId>,
    pending_resume: Option<usize>,
    started: bool,
    generation: u64,
}

impl JourneyController {
    /// An idle controller with the default journey's step list pre-built, so
    /// a shell has something sane to render immediately.
    pub fn idle(catalog: &StepCatalog) -> Self {
        Self {
            journey_type: Some(JourneyType::DEFAULT),
            steps: build_steps(JourneyType::DEFAULT, catalog),
            current_index: 0,
            branch: None,
            pending_resume: None,
            started: false,
            generation: 0,
        }
    }

    /// Rebuilds a controller from restored session state.
    pub fn restore(
        journey_type: Option<JourneyType>,
        steps: Vec<Step>,
        current_index: usize,
        branch: Option<StepId>,
        pending_resume: Option<usize>,
    ) -> Self {
        Self {
            journey_type,
            steps,
            current_index,
            branch,
            pending_resume,
            started: true,
            generation: 0,
        }
    }

    pub fn phase(&self) -> JourneyPhase {
        if !self.started || self.steps.is_empty() {
            JourneyPhase::Idle
        } else if self.current_index + 1 == self.steps.len() {
            JourneyPhase::Terminal
        } else {
            JourneyPhase::Active
        }
    }

    pub fn journey_type(&self) -> Option<JourneyType> {
        self.journey_type
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current_index)
    }

    pub fn branch(&self) -> Option<&StepId> {
        self.branch.as_ref()
    }

    /// The id of the screen to render: the branch overlay when set, the
    /// current sequence step otherwise.
    pub fn rendered_step_id(&self) -> Option<&StepId> {
        self.branch
            .as_ref()
            .or_else(|| self.current_step().map(|step| &step.id))
    }

    pub fn has_pending_resume(&self) -> bool {
        self.pending_resume.is_some()
    }

    /// Monotonic counter bumped on every navigation. Deferred effects carry
    /// the generation they were scheduled under; a mismatch marks them stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Begins a journey. The cursor starts on `start_step` when it is part of
    /// the built sequence, on the first step otherwise.
    pub fn start(&mut self, journey: JourneyType, catalog: &StepCatalog, start_step: Option<&StepId>) {
        self.journey_type = Some(journey);
        self.steps = build_steps(journey, catalog);
        self.current_index = start_step
            .and_then(|id| self.position_of(id))
            .unwrap_or(0);
        self.branch = None;
        self.pending_resume = None;
        self.started = true;
        self.generation += 1;
    }

    /// Moves one step forward, clamped at the last step.
    ///
    /// When a one-time resume target is pending (resume-by-link), the first
    /// call consumes it and jumps straight to the saved position instead.
    pub fn advance(&mut self) {
        self.branch = None;
        self.generation += 1;
        if self.steps.is_empty() {
            debug!("advance on empty step list ignored");
            return;
        }
        if let Some(target) = self.pending_resume.take() {
            if target > 0 && target < self.steps.len() {
                debug!(target, "consuming one-time resume fast-forward");
                self.current_index = target;
                return;
            }
        }
        if self.current_index + 1 < self.steps.len() {
            self.current_index += 1;
        }
    }

    /// Moves one step back, floored at the first step.
    pub fn retreat(&mut self) {
        self.branch = None;
        self.generation += 1;
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Jumps to a step by id.
    ///
    /// An id inside the current sequence moves the cursor. An id known to the
    /// catalog but outside the sequence becomes a branch overlay, leaving the
    /// cursor untouched. An unknown id is a diagnosed no-op.
    pub fn jump_to(&mut self, id: &StepId, catalog: &StepCatalog) {
        self.branch = None;
        self.generation += 1;
        if let Some(position) = self.position_of(id) {
            self.current_index = position;
        } else if catalog.contains(id) {
            self.branch = Some(id.clone());
        } else {
            warn!(step_id = %id, "jump target not found in journey or catalog");
        }
    }

    /// Switches to a different journey, rebuilding the sequence and resetting
    /// the cursor. Switching to the current journey is a no-op, so redundant
    /// calls cannot discard progress. Returns whether anything changed.
    ///
    /// The form store is deliberately untouched by a switch; captured answers
    /// survive the flow change.
    pub fn switch_flow(&mut self, journey: JourneyType, catalog: &StepCatalog) -> bool {
        if self.journey_type == Some(journey) {
            debug!(journey = %journey, "switch_flow to current journey ignored");
            return false;
        }
        self.journey_type = Some(journey);
        self.steps = build_steps(journey, catalog);
        self.current_index = 0;
        self.branch = None;
        self.started = true;
        self.generation += 1;
        true
    }

    /// Replaces the sequence with exactly the given ids (resolved through the
    /// catalog; unresolvable ids are dropped with a diagnostic) and puts the
    /// cursor on the last of them. Used by flows that end the digital journey
    /// early on the current screen.
    pub fn truncate_to(&mut self, ids: &[StepId], catalog: &StepCatalog) {
        let steps: Vec<Step> = ids
            .iter()
            .filter_map(|id| {
                let step = catalog.step(id);
                if step.is_none() {
                    warn!(step_id = %id, "truncation target missing from catalog, dropped");
                }
                step
            })
            .collect();
        self.branch = None;
        self.generation += 1;
        self.current_index = steps.len().saturating_sub(1);
        self.steps = steps;
    }

    /// Replaces the sequence wholesale with an already-resolved step list,
    /// positioning the cursor at `index` (clamped). Used when a flow variant
    /// rebuilds its canonical sequence and picks a specific re-entry point.
    pub(crate) fn set_sequence(&mut self, steps: Vec<Step>, index: usize) {
        self.branch = None;
        self.generation += 1;
        self.current_index = index.min(steps.len().saturating_sub(1));
        self.steps = steps;
        self.started = true;
    }

    /// Clears all navigation state and returns to `Idle` with the default
    /// journey's fresh step list pre-built.
    pub fn reset(&mut self, catalog: &StepCatalog) {
        *self = Self::idle(catalog);
        self.generation += 1;
    }

    fn position_of(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|step| &step.id == id)
    }
}

//! The journey session: an explicit context object owning the controller,
//! the form store, durable storage, the inactivity watchdog, and the deferred
//! effect queue.
//!
//! Lifecycle: [`JourneySession::init`] at process start (restore-or-fresh),
//! [`JourneySession::reset`] as teardown. Every mutation persists
//! write-through; loading never writes, so a saved resume target survives
//! repeated resume entries until it is consumed.

use crate::catalog::{PrimaryAction, ScreenRef, Step, StepCatalog, StepId, steps};
use crate::controller::{InactivityWatchdog, JourneyController, JourneyPhase, Scheduler};
use crate::entry::EntryPoint;
use crate::journey::{JourneyType, UserType, build_steps};
use crate::store::{FormDraft, FormStore, fields};
use serde::Serialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

pub mod restore;
pub mod storage;

pub use restore::{RestoredSession, SCHEMA_VERSION};
pub use storage::{FileStore, MemoryStore, NAMESPACE, SessionStorage, keys};

/// The single entry point screens talk to. All reads and mutations funnel
/// through here; there is no ambient session state.
pub struct JourneySession<S: SessionStorage> {
    catalog: StepCatalog,
    controller: JourneyController,
    store: FormStore,
    storage: S,
    user_type: UserType,
    watchdog: InactivityWatchdog,
    scheduler: Scheduler,
    resume_entry: bool,
}

impl<S: SessionStorage> JourneySession<S> {
    /// Initializes against the standard step catalog.
    pub fn init(storage: S, entry: EntryPoint) -> Self {
        Self::init_with_catalog(StepCatalog::standard(), storage, entry)
    }

    /// Restores a saved session if one exists and is usable; otherwise starts
    /// fresh. A corrupt or structurally invalid snapshot is erased rather
    /// than rendered.
    pub fn init_with_catalog(catalog: StepCatalog, mut storage: S, entry: EntryPoint) -> Self {
        let resume_entry = entry.resume();
        match restore::load(&storage, &catalog, resume_entry) {
            Ok(Some(restored)) => {
                info!(
                    journey = restored.journey_type.map(|j| j.as_str()),
                    step_index = restored.current_index,
                    "restored saved session"
                );
                let RestoredSession {
                    user_type,
                    journey_type,
                    steps,
                    current_index,
                    branch,
                    pending_resume,
                    draft,
                    baseline,
                    prefilled,
                    changed,
                } = restored;
                Self {
                    controller: JourneyController::restore(
                        journey_type,
                        steps,
                        current_index,
                        branch,
                        pending_resume,
                    ),
                    store: FormStore::restore(draft, baseline, prefilled, changed),
                    catalog,
                    storage,
                    user_type,
                    watchdog: InactivityWatchdog::default(),
                    scheduler: Scheduler::new(),
                    resume_entry,
                }
            }
            Ok(None) => Self::fresh(catalog, storage, resume_entry),
            Err(err) => {
                warn!(%err, "discarding unusable saved session");
                storage.clear();
                Self::fresh(catalog, storage, resume_entry)
            }
        }
    }

    fn fresh(catalog: StepCatalog, storage: S, resume_entry: bool) -> Self {
        Self {
            controller: JourneyController::idle(&catalog),
            store: FormStore::new(),
            catalog,
            storage,
            user_type: UserType::default(),
            watchdog: InactivityWatchdog::default(),
            scheduler: Scheduler::new(),
            resume_entry,
        }
    }

    // --- Navigation ---

    /// Starts a journey: builds its steps, positions the cursor (on
    /// `start_step` when given and found), merges `prefilled` into a fresh
    /// draft and takes a baseline equal to the result, so the changed set
    /// starts empty.
    pub fn start_journey(
        &mut self,
        journey: JourneyType,
        prefilled: Option<FormDraft>,
        start_step: Option<&StepId>,
    ) {
        info!(journey = %journey, "starting journey");
        self.controller.start(journey, &self.catalog, start_step);
        self.store.start(prefilled.unwrap_or_default());
        self.persist();
    }

    pub fn advance(&mut self) {
        self.controller.advance();
        self.persist();
    }

    pub fn retreat(&mut self) {
        self.controller.retreat();
        self.persist();
    }

    pub fn jump_to(&mut self, id: &StepId) {
        self.controller.jump_to(id, &self.catalog);
        self.persist();
    }

    /// Switches the journey mid-flow. Captured answers survive: the form
    /// store is untouched. Redundant switches to the current journey are
    /// no-ops and do not persist.
    pub fn switch_flow(&mut self, journey: JourneyType) {
        if self.controller.switch_flow(journey, &self.catalog) {
            self.persist();
        }
    }

    /// Ends the digital journey early: the sequence becomes exactly `ids` and
    /// the cursor sits on the last of them.
    pub fn truncate_to(&mut self, ids: &[StepId]) {
        self.controller.truncate_to(ids, &self.catalog);
        self.persist();
    }

    /// Full teardown: clears journey, draft, baseline, and changed set,
    /// erases persisted data, and returns to `Idle` with the default
    /// journey's fresh step list pre-built.
    pub fn reset(&mut self) {
        info!("resetting journey session");
        self.controller.reset(&self.catalog);
        self.store.clear();
        self.scheduler.clear();
        self.watchdog.disarm();
        self.user_type = UserType::default();
        self.resume_entry = false;
        self.storage.clear();
    }

    // --- Form data ---

    /// Merges a partial update into the draft and recomputes the changed set
    /// for the patched keys (see [`FormStore::merge_draft`]).
    pub fn merge_draft(&mut self, patch: FormDraft) {
        self.store.merge_draft(patch);
        self.persist();
    }

    /// Nominee capture is inline within profile details; this toggles it.
    pub fn set_nominee_enabled(&mut self, enabled: bool) {
        self.merge_draft(FormDraft::from_pairs([(
            fields::WANTS_NOMINEE,
            json!(enabled),
        )]));
    }

    // --- Flow variants ---

    /// Selects the customer segment and rebuilds the step list for its
    /// natural journey.
    pub fn set_user_type(&mut self, user: UserType) {
        self.user_type = user;
        self.controller
            .switch_flow(user.natural_journey(), &self.catalog);
        self.persist();
    }

    /// Physical KYC ends the digital journey on the KYC selection screen:
    /// the sequence truncates to the steps completed so far.
    pub fn select_physical_kyc(&mut self) {
        let Some(journey) = self.active_kyc_journey("select_physical_kyc") else {
            return;
        };
        let ids = [
            StepId::namespaced(journey, steps::WELCOME),
            StepId::namespaced(journey, steps::KYC_CHOICE),
            StepId::namespaced(journey, steps::PHYSICAL_KYC),
        ];
        self.controller.truncate_to(&ids, &self.catalog);
        self.persist();
    }

    /// Digital KYC restores the canonical flow and positions the cursor on
    /// the step after the KYC choice.
    pub fn select_digital_kyc(&mut self) {
        let Some(journey) = self.active_kyc_journey("select_digital_kyc") else {
            return;
        };
        let canonical = build_steps(journey, &self.catalog);
        let index = canonical
            .iter()
            .position(|step| step.id.base() == steps::KYC_CHOICE)
            .map(|kyc_index| kyc_index + 1)
            .unwrap_or(0);
        self.controller.set_sequence(canonical, index);
        self.persist();
    }

    fn active_kyc_journey(&self, operation: &str) -> Option<JourneyType> {
        if self.phase() == JourneyPhase::Idle {
            warn!(operation, "ignored outside an active journey");
            return None;
        }
        let journey = self.controller.journey_type()?;
        if !journey.has_kyc_choice() {
            warn!(operation, journey = %journey, "journey has no KYC choice");
            return None;
        }
        Some(journey)
    }

    // --- Timers and deferred effects ---

    /// Queues a simulated-verification outcome: `patch` merges into the draft
    /// once `delay` has elapsed, unless the user has navigated away in the
    /// meantime (stale outcomes are dropped).
    pub fn schedule_patch(&mut self, step: StepId, patch: FormDraft, delay: Duration, now: Instant) {
        self.scheduler
            .schedule(step, patch, delay, now, self.controller.generation());
    }

    /// Reports a user interaction; re-arms the inactivity watchdog.
    pub fn note_activity(&mut self, now: Instant) {
        self.watchdog.touch(now);
    }

    /// Event-loop pulse: fires the inactivity reset when due (at most once
    /// per arming) and applies any due deferred patches that are still fresh.
    pub fn tick(&mut self, now: Instant) {
        if self.watchdog.fire_if_expired(now) {
            info!("inactivity timeout, resetting session");
            self.reset();
            return;
        }
        let due = self.scheduler.take_due(now, self.controller.generation());
        if !due.is_empty() {
            for deferred in due {
                self.store.merge_draft(deferred.patch);
            }
            self.persist();
        }
    }

    // --- Reads ---

    pub fn phase(&self) -> JourneyPhase {
        self.controller.phase()
    }

    pub fn journey_type(&self) -> Option<JourneyType> {
        self.controller.journey_type()
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    pub fn steps(&self) -> &[Step] {
        self.controller.steps()
    }

    pub fn current_index(&self) -> usize {
        self.controller.current_index()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.controller.current_step()
    }

    pub fn branch(&self) -> Option<&StepId> {
        self.controller.branch()
    }

    /// The id of the screen to render: the branch overlay wins over the
    /// sequence cursor.
    pub fn rendered_step_id(&self) -> Option<&StepId> {
        self.controller.rendered_step_id()
    }

    pub fn rendered_screen(&self) -> Option<ScreenRef> {
        self.rendered_step_id()
            .and_then(|id| self.catalog.resolve_screen(id))
    }

    /// The declared primary call-to-action of the rendered screen, for the
    /// shell's footer.
    pub fn primary_action(&self) -> Option<PrimaryAction> {
        self.rendered_step_id()
            .and_then(|id| self.catalog.get(id))
            .map(|entry| entry.primary_action)
    }

    pub fn form_draft(&self) -> &FormDraft {
        self.store.draft()
    }

    pub fn prefilled(&self) -> &FormDraft {
        self.store.prefilled()
    }

    pub fn changed_fields(&self) -> Vec<String> {
        self.store.changed_fields()
    }

    pub fn is_changed(&self, key: &str) -> bool {
        self.store.is_changed(key)
    }

    pub fn is_resume_entry(&self) -> bool {
        self.resume_entry
    }

    pub fn has_pending_resume(&self) -> bool {
        self.controller.has_pending_resume()
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // --- Persistence ---

    fn persist(&mut self) {
        let user_type = self.user_type;
        let journey_type = self.controller.journey_type();
        let step_index = self.controller.current_index();
        let journey_steps = self.controller.steps().to_vec();
        let branch = self.controller.branch().cloned();
        let draft = self.store.draft().clone();
        let prefilled = self.store.prefilled().clone();
        let baseline = self.store.baseline().clone();
        let changed = self.store.changed_fields();

        self.set_json(keys::SCHEMA_VERSION, &SCHEMA_VERSION);
        self.set_json(keys::USER_TYPE, &user_type);
        match journey_type {
            Some(journey) => self.set_json(keys::JOURNEY_TYPE, &journey),
            None => self.storage.remove(keys::JOURNEY_TYPE),
        }
        self.storage.set(keys::STEP_INDEX, step_index.to_string());
        self.set_json(keys::JOURNEY_STEPS, &journey_steps);
        match branch {
            Some(id) => self.set_json(keys::BRANCH_STEP_ID, &id),
            None => self.storage.remove(keys::BRANCH_STEP_ID),
        }
        self.set_json(keys::FORM_DATA, &draft);
        self.set_json(keys::PREFILLED_DATA, &prefilled);
        self.set_json(keys::BASELINE_DATA, &baseline);
        self.set_json(keys::CHANGED_FIELDS, &changed);
    }

    fn set_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(encoded) => self.storage.set(key, encoded),
            Err(err) => error!(key, %err, "skipping unserializable session value"),
        }
    }
}

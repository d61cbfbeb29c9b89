//! Common test utilities for building sessions and persisted snapshots.
use annai::prelude::*;
use serde_json::json;

/// A freshly launched session over in-memory storage.
#[allow(dead_code)]
pub fn fresh_session() -> JourneySession<MemoryStore> {
    JourneySession::init(MemoryStore::new(), EntryPoint::fresh())
}

/// A session with `journey` already started (no prefill).
#[allow(dead_code)]
pub fn started_session(journey: JourneyType) -> JourneySession<MemoryStore> {
    let mut session = fresh_session();
    session.start_journey(journey, None, None);
    session
}

/// Namespaced step id within the new-to-bank journey.
#[allow(dead_code)]
pub fn ntb_step(base: &str) -> StepId {
    StepId::namespaced(JourneyType::Ntb, base)
}

/// A small prefilled payload that differs from the seed draft.
#[allow(dead_code)]
pub fn sample_prefill() -> FormDraft {
    FormDraft::from_pairs([
        ("mobileNumber", json!("9812345678")),
        ("employerName", json!("Acme Industries")),
    ])
}

/// Builds a legacy (schema v1) snapshot: raw scalar strings, no version
/// stamp, no baseline or changed-fields keys.
#[allow(dead_code)]
pub fn legacy_snapshot(
    journey: Option<&str>,
    step_index: usize,
    step_ids: &[&str],
) -> MemoryStore {
    let steps: Vec<serde_json::Value> = step_ids
        .iter()
        .map(|id| json!({ "id": id, "title": "Step" }))
        .collect();
    let mut store = MemoryStore::new();
    store.set("userType", "ntb".to_string());
    if let Some(journey) = journey {
        store.set("journeyType", journey.to_string());
    }
    store.set("stepIndex", step_index.to_string());
    store.set(
        "journeySteps",
        serde_json::to_string(&steps).expect("steps serialize"),
    );
    store
}

/// The canonical ntb step list serialized the way the engine persists it.
#[allow(dead_code)]
pub fn canonical_steps_json(journey: JourneyType) -> String {
    let steps = build_steps(journey, &StepCatalog::standard());
    serde_json::to_string(&steps).expect("steps serialize")
}

//! Session lifecycle tests: write-through persistence, resume-by-link,
//! snapshot migration, the inactivity watchdog, and deferred effects.
mod common;
use annai::catalog::steps;
use annai::prelude::*;
use annai::session::keys;
use common::*;
use serde_json::json;

#[test]
fn every_mutation_writes_through() {
    let mut session = started_session(JourneyType::Ntb);
    let storage = session.storage();
    assert_eq!(storage.get(keys::STEP_INDEX), Some("0".to_string()));
    assert_eq!(storage.get(keys::SCHEMA_VERSION), Some("2".to_string()));
    assert_eq!(storage.get(keys::JOURNEY_TYPE), Some("\"ntb\"".to_string()));

    session.advance();
    assert_eq!(session.storage().get(keys::STEP_INDEX), Some("1".to_string()));

    session.merge_draft(FormDraft::from_pairs([("email", json!("w@example.com"))]));
    let changed: Vec<String> =
        serde_json::from_str(&session.storage().get(keys::CHANGED_FIELDS).unwrap()).unwrap();
    assert_eq!(changed, vec!["email"]);
}

#[test]
fn saved_session_restores_across_init() {
    let mut session = started_session(JourneyType::EtbWithKyc);
    session.advance();
    session.advance();
    session.merge_draft(FormDraft::from_pairs([("email", json!("keep@example.com"))]));

    let reloaded = JourneySession::init(session.storage().clone(), EntryPoint::fresh());
    assert_eq!(reloaded.journey_type(), Some(JourneyType::EtbWithKyc));
    assert_eq!(reloaded.current_index(), 2);
    assert_eq!(reloaded.phase(), JourneyPhase::Active);
    assert_eq!(reloaded.form_draft().get("email"), Some(&json!("keep@example.com")));
    assert_eq!(reloaded.changed_fields(), vec!["email"]);
}

#[test]
fn branch_overlay_survives_a_reload() {
    let mut session = started_session(JourneyType::Ntb);
    session.advance();
    session.jump_to(&ntb_step(steps::PHYSICAL_KYC));
    assert!(session.branch().is_some());

    let reloaded = JourneySession::init(session.storage().clone(), EntryPoint::fresh());
    assert_eq!(reloaded.branch(), Some(&ntb_step(steps::PHYSICAL_KYC)));
    assert_eq!(reloaded.current_index(), 1);
}

#[test]
fn resume_entry_forces_reverification_then_fast_forwards_once() {
    let mut session = started_session(JourneyType::Ntb);
    for _ in 0..3 {
        session.advance();
    }
    assert_eq!(session.current_index(), 3);

    let mut resumed = JourneySession::init(session.storage().clone(), EntryPoint::resume_entry());
    assert!(resumed.is_resume_entry());
    assert_eq!(resumed.current_index(), 0, "resume re-enters at verification");
    assert!(resumed.has_pending_resume());

    // Loading never writes: the saved position is still on disk, so another
    // resume entry before the first advance would see it again.
    assert_eq!(resumed.storage().get(keys::STEP_INDEX), Some("3".to_string()));

    // The first advance consumes the marker as a one-time fast-forward.
    resumed.advance();
    assert_eq!(resumed.current_index(), 3);
    assert!(!resumed.has_pending_resume());

    // A second advance moves normally.
    resumed.advance();
    assert_eq!(resumed.current_index(), 4);
}

#[test]
fn retired_step_ids_are_filtered_on_load() {
    // A snapshot whose list still contains the retired nominee step, with the
    // cursor past it.
    let store = legacy_snapshot(
        Some("ntb"),
        5,
        &[
            "ntb:welcome",
            "ntb:kycChoice",
            "ntb:ekycHandler",
            "ntb:profileDetails",
            "ntb:nomineeDetails",
            "ntb:reviewApplication",
            "ntb:videoKyc",
            "ntb:complete",
        ],
    );

    let session = JourneySession::init(store, EntryPoint::fresh());
    assert_eq!(session.steps().len(), 7, "dead id filtered");
    assert!(session.steps().iter().all(|s| s.id.base() != "nomineeDetails"));
    // Position preserved by the previously-current id (reviewApplication).
    assert_eq!(session.current_index(), 4);
}

#[test]
fn outdated_flow_is_rebuilt_with_position_preserved() {
    // An old express-flow snapshot from before the profile and verification
    // steps were added, positioned on its last step.
    let store = legacy_snapshot(Some("etb"), 2, &["etb:welcome", "etb:autoConversion", "etb:complete"]);

    let session = JourneySession::init(store, EntryPoint::fresh());
    let canonical = build_steps(JourneyType::EtbExpress, &StepCatalog::standard());
    assert_eq!(session.steps(), canonical.as_slice());
    // "etb:complete" exists in the rebuilt flow; the position follows it.
    assert_eq!(session.current_index(), canonical.len() - 1);
}

#[test]
fn unknown_journey_snapshot_keeps_filtered_steps() {
    // No journeyType key: reconciliation can only filter, not rebuild.
    let store = legacy_snapshot(None, 2, &["ntb:welcome", "ntb:nomineeDetails", "ntb:complete"]);

    let session = JourneySession::init(store, EntryPoint::fresh());
    assert_eq!(session.steps().len(), 2);
    assert_eq!(session.current_index(), 1, "cursor follows ntb:complete");
}

#[test]
fn legacy_snapshot_defaults_baseline_to_draft() {
    let mut store = legacy_snapshot(Some("ntb"), 1, &[]);
    store.set(keys::JOURNEY_STEPS, canonical_steps_json(JourneyType::Ntb));
    store.set(
        keys::FORM_DATA,
        serde_json::to_string(&json!({ "email": "old@example.com" })).unwrap(),
    );

    let session = JourneySession::init(store, EntryPoint::fresh());
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.form_draft().get("email"), Some(&json!("old@example.com")));
    assert!(session.changed_fields().is_empty(), "no baseline key means nothing changed");
}

#[test]
fn corrupt_snapshot_falls_back_to_reset() {
    let mut store = legacy_snapshot(Some("ntb"), 1, &["ntb:welcome", "ntb:complete"]);
    store.set(keys::FORM_DATA, "{not valid json".to_string());

    let session = JourneySession::init(store, EntryPoint::fresh());
    assert_eq!(session.phase(), JourneyPhase::Idle);
    assert_eq!(session.journey_type(), Some(JourneyType::Ntb));
    assert!(session.storage().is_empty(), "unusable snapshot is erased");
}

#[test]
fn empty_step_list_with_nonzero_index_resets() {
    let store = legacy_snapshot(Some("ntb"), 2, &[]);
    let session = JourneySession::init(store, EntryPoint::fresh());
    assert_eq!(session.phase(), JourneyPhase::Idle);
    assert!(session.storage().is_empty());
}

#[test]
fn future_schema_version_is_not_trusted() {
    let mut store = legacy_snapshot(Some("ntb"), 0, &["ntb:welcome"]);
    store.set(keys::SCHEMA_VERSION, "99".to_string());
    let session = JourneySession::init(store, EntryPoint::fresh());
    assert_eq!(session.phase(), JourneyPhase::Idle);
    assert!(session.storage().is_empty());
}

#[test]
fn reset_erases_the_namespace() {
    let mut session = started_session(JourneyType::Ntb);
    session.merge_draft(FormDraft::from_pairs([("email", json!("x@example.com"))]));
    assert!(!session.storage().is_empty());

    session.reset();
    assert!(session.storage().is_empty());
    assert_eq!(session.phase(), JourneyPhase::Idle);
}

#[test]
fn inactivity_watchdog_fires_once_and_disarms() {
    let mut session = started_session(JourneyType::Ntb);
    session.advance();

    let t0 = Instant::now();
    session.note_activity(t0);

    session.tick(t0 + Duration::from_secs(299));
    assert_eq!(session.phase(), JourneyPhase::Active, "not expired yet");

    session.tick(t0 + Duration::from_secs(301));
    assert_eq!(session.phase(), JourneyPhase::Idle, "timeout resets the journey");

    // Disarmed until the next interaction: starting again and ticking far in
    // the future without activity must not reset.
    session.start_journey(JourneyType::Ntb, None, None);
    session.tick(t0 + Duration::from_secs(10_000));
    assert_eq!(session.phase(), JourneyPhase::Active);
}

#[test]
fn activity_pushes_the_deadline_out() {
    let mut session = started_session(JourneyType::Ntb);
    let t0 = Instant::now();
    session.note_activity(t0);
    session.note_activity(t0 + Duration::from_secs(200));

    session.tick(t0 + Duration::from_secs(400));
    assert_eq!(session.phase(), JourneyPhase::Active, "deadline moved to t0+500");

    session.tick(t0 + Duration::from_secs(501));
    assert_eq!(session.phase(), JourneyPhase::Idle);
}

#[test]
fn deferred_patch_applies_after_its_delay() {
    let mut session = started_session(JourneyType::Ntb);
    session.advance();
    session.advance(); // ekycHandler
    let step = session.current_step().unwrap().id.clone();

    let t0 = Instant::now();
    session.schedule_patch(
        step,
        FormDraft::from_pairs([("ekycVerified", json!(true))]),
        Duration::from_secs(2),
        t0,
    );

    session.tick(t0 + Duration::from_secs(1));
    assert!(session.form_draft().get("ekycVerified").is_none());

    session.tick(t0 + Duration::from_secs(3));
    assert_eq!(session.form_draft().get("ekycVerified"), Some(&json!(true)));
    assert!(session.is_changed("ekycVerified"));
}

#[test]
fn stale_deferred_patch_is_dropped_after_navigation() {
    let mut session = started_session(JourneyType::Ntb);
    session.advance();
    session.advance();
    let step = session.current_step().unwrap().id.clone();

    let t0 = Instant::now();
    session.schedule_patch(
        step,
        FormDraft::from_pairs([("ekycVerified", json!(true))]),
        Duration::from_secs(2),
        t0,
    );

    // The user navigates away before the simulated check completes.
    session.retreat();

    session.tick(t0 + Duration::from_secs(3));
    assert!(
        session.form_draft().get("ekycVerified").is_none(),
        "outcome for a no-longer-current step must not apply"
    );
}

#[test]
fn file_store_round_trips_a_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.bin");

    {
        let store = FileStore::open(&path).expect("open fresh");
        let mut session = JourneySession::init(store, EntryPoint::fresh());
        session.start_journey(JourneyType::EtbExpress, Some(sample_prefill()), None);
        session.advance();
    }

    let store = FileStore::open(&path).expect("reopen");
    let session = JourneySession::init(store, EntryPoint::fresh());
    assert_eq!(session.journey_type(), Some(JourneyType::EtbExpress));
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.form_draft().mobile_number(), Some("9812345678"));
}

#[test]
fn file_store_rejects_a_corrupt_container() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.bin");
    std::fs::write(&path, b"\xff\xfe garbage").expect("write garbage");

    assert!(matches!(
        FileStore::open(&path),
        Err(StorageError::Decode(_))
    ));
}

#[test]
fn entry_point_parses_and_strips_the_resume_flag() {
    let (entry, cleaned) =
        EntryPoint::from_url("https://bank.example/onboard?src=sms&resume=true");
    assert!(entry.resume());
    let cleaned = cleaned.expect("flag was present");
    assert!(cleaned.contains("src=sms"));
    assert!(!cleaned.contains("resume"));

    let (entry, cleaned) = EntryPoint::from_url("https://bank.example/onboard?resume=true");
    assert!(entry.resume());
    assert_eq!(cleaned.as_deref(), Some("https://bank.example/onboard"));

    let (entry, cleaned) = EntryPoint::from_url("https://bank.example/onboard?resume=false");
    assert!(!entry.resume());
    assert!(cleaned.is_none());

    let (entry, _) = EntryPoint::from_url("::definitely not a url::");
    assert!(!entry.resume());
}

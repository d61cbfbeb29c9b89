//! Navigation tests: graph determinism, cursor clamping, branch overlays,
//! flow switching, and early truncation.
mod common;
use annai::catalog::steps;
use annai::prelude::*;
use common::*;

#[test]
fn build_steps_is_deterministic_and_idempotent() {
    let catalog = StepCatalog::standard();
    for &journey in JourneyType::ALL {
        let first = build_steps(journey, &catalog);
        let second = build_steps(journey, &catalog);
        assert_eq!(first, second, "{journey} must build identical lists");
        assert!(!first.is_empty(), "{journey} must resolve against the standard catalog");
    }
}

#[test]
fn flow_lists_embed_the_business_rules() {
    let catalog = StepCatalog::standard();

    // The express flow has no KYC choice and no review.
    let express = build_steps(JourneyType::EtbExpress, &catalog);
    assert!(express.iter().all(|s| s.id.base() != steps::KYC_CHOICE));
    assert!(express.iter().all(|s| s.id.base() != steps::REVIEW_APPLICATION));

    // The post-conversion flow drops e-KYC and video KYC.
    let conversion = build_steps(JourneyType::NtbConversion, &catalog);
    assert!(conversion.iter().all(|s| s.id.base() != steps::EKYC_HANDLER));
    assert!(conversion.iter().all(|s| s.id.base() != steps::VIDEO_KYC));

    // The full flow keeps both.
    let full = build_steps(JourneyType::Ntb, &catalog);
    assert!(full.iter().any(|s| s.id.base() == steps::EKYC_HANDLER));
    assert!(full.iter().any(|s| s.id.base() == steps::VIDEO_KYC));
}

#[test]
fn step_ids_are_namespaced_per_journey() {
    let id = StepId::namespaced(JourneyType::EtbWithKyc, steps::KYC_CHOICE);
    assert_eq!(id.as_str(), "etb-nk:kycChoice");
    assert_eq!(id.base(), "kycChoice");
}

#[test]
fn advance_clamps_at_last_step() {
    let mut session = started_session(JourneyType::EtbExpress);
    let step_count = session.steps().len();
    for _ in 0..step_count + 5 {
        session.advance();
    }
    assert_eq!(session.current_index(), step_count - 1);
    assert_eq!(session.phase(), JourneyPhase::Terminal);
}

#[test]
fn retreat_floors_at_first_step() {
    let mut session = started_session(JourneyType::Ntb);
    session.advance();
    for _ in 0..10 {
        session.retreat();
    }
    assert_eq!(session.current_index(), 0);
}

#[test]
fn start_journey_honors_start_step() {
    let mut session = fresh_session();
    let target = ntb_step(steps::PROFILE_DETAILS);
    session.start_journey(JourneyType::Ntb, None, Some(&target));
    assert_eq!(session.current_step().map(|s| s.id.clone()), Some(target));

    // An unknown start step falls back to the first step.
    let mut session = fresh_session();
    session.start_journey(JourneyType::Ntb, None, Some(&StepId::new("ntb:retiredStep")));
    assert_eq!(session.current_index(), 0);
}

#[test]
fn jump_within_sequence_moves_cursor() {
    let mut session = started_session(JourneyType::Ntb);
    session.jump_to(&ntb_step(steps::REVIEW_APPLICATION));
    assert_eq!(session.current_index(), 4);
    assert!(session.branch().is_none());
}

#[test]
fn jump_outside_sequence_sets_branch_overlay() {
    let mut session = started_session(JourneyType::Ntb);
    session.advance(); // kycChoice
    let before = session.current_index();

    // physicalKyc is in the catalog but never in the ntb linear flow.
    let detour = ntb_step(steps::PHYSICAL_KYC);
    session.jump_to(&detour);
    assert_eq!(session.current_index(), before, "cursor must not move");
    assert_eq!(session.branch(), Some(&detour));
    assert_eq!(session.rendered_step_id(), Some(&detour));

    // Advancing clears the branch and moves exactly one step from the
    // pre-branch position.
    session.advance();
    assert!(session.branch().is_none());
    assert_eq!(session.current_index(), before + 1);
}

#[test]
fn jump_to_unknown_id_is_a_no_op() {
    let mut session = started_session(JourneyType::Ntb);
    session.advance();
    let index = session.current_index();
    session.jump_to(&StepId::new("ntb:doesNotExist"));
    assert_eq!(session.current_index(), index);
    assert!(session.branch().is_none());
}

#[test]
fn switch_flow_to_current_journey_changes_nothing() {
    let mut session = started_session(JourneyType::EtbWithKyc);
    session.advance();
    session.advance();
    session.merge_draft(FormDraft::from_pairs([("email", serde_json::json!("x@example.com"))]));

    let steps_before = session.steps().to_vec();
    let index_before = session.current_index();
    let draft_before = session.form_draft().clone();
    let changed_before = session.changed_fields();

    session.switch_flow(JourneyType::EtbWithKyc);

    assert_eq!(session.steps(), steps_before.as_slice());
    assert_eq!(session.current_index(), index_before);
    assert!(session.branch().is_none());
    assert_eq!(session.form_draft(), &draft_before);
    assert_eq!(session.changed_fields(), changed_before);
}

#[test]
fn switch_flow_rebuilds_steps_but_keeps_answers() {
    let mut session = started_session(JourneyType::EtbWithKyc);
    session.advance();
    session.merge_draft(FormDraft::from_pairs([("email", serde_json::json!("x@example.com"))]));

    session.switch_flow(JourneyType::EtbAadhaarKyc);

    assert_eq!(session.journey_type(), Some(JourneyType::EtbAadhaarKyc));
    assert_eq!(session.current_index(), 0);
    assert!(session.steps().iter().any(|s| s.id.base() == steps::EKYC_HANDLER));
    // Flow switch must not discard captured answers.
    assert_eq!(
        session.form_draft().get("email"),
        Some(&serde_json::json!("x@example.com"))
    );
    assert!(session.is_changed("email"));
}

#[test]
fn physical_kyc_truncates_the_journey() {
    let mut session = started_session(JourneyType::Ntb);
    session.advance(); // kycChoice

    session.select_physical_kyc();

    assert_eq!(session.steps().len(), 3);
    assert_eq!(session.current_index(), 2);
    assert_eq!(session.phase(), JourneyPhase::Terminal);
    assert_eq!(
        session.rendered_step_id(),
        Some(&ntb_step(steps::PHYSICAL_KYC))
    );
}

#[test]
fn digital_kyc_restores_canonical_flow_past_the_choice() {
    let mut session = started_session(JourneyType::Ntb);
    session.advance();
    session.select_physical_kyc();

    session.select_digital_kyc();

    let catalog = StepCatalog::standard();
    assert_eq!(session.steps(), build_steps(JourneyType::Ntb, &catalog).as_slice());
    // ntb: welcome, kycChoice, ekycHandler, ... — lands on ekycHandler.
    assert_eq!(session.current_index(), 2);
    assert_eq!(
        session.current_step().map(|s| s.id.base().to_string()),
        Some(steps::EKYC_HANDLER.to_string())
    );
}

#[test]
fn kyc_variants_are_ignored_outside_an_active_journey() {
    let mut session = fresh_session();
    assert_eq!(session.phase(), JourneyPhase::Idle);
    session.select_physical_kyc();
    assert_eq!(session.phase(), JourneyPhase::Idle);
    assert_eq!(session.steps().len(), 7, "idle prebuilt ntb flow untouched");
}

#[test]
fn set_user_type_rebuilds_for_the_natural_journey() {
    let mut session = fresh_session();
    session.set_user_type(UserType::EtbExpress);
    assert_eq!(session.user_type(), UserType::EtbExpress);
    assert_eq!(session.journey_type(), Some(JourneyType::EtbExpress));
    assert_eq!(session.current_index(), 0);
}

#[test]
fn empty_catalog_yields_nothing_to_render() {
    let mut session =
        JourneySession::init_with_catalog(StepCatalog::empty(), MemoryStore::new(), EntryPoint::fresh());
    session.start_journey(JourneyType::Ntb, None, None);

    assert!(session.steps().is_empty());
    assert_eq!(session.phase(), JourneyPhase::Idle);
    assert!(session.current_step().is_none());
    assert!(session.rendered_step_id().is_none());

    // Navigation on an empty sequence must not panic or underflow.
    session.advance();
    session.retreat();
    session.jump_to(&StepId::new("ntb:welcome"));
    assert_eq!(session.current_index(), 0);
}

#[test]
fn rendered_screen_and_primary_action_come_from_the_catalog() {
    let mut session = started_session(JourneyType::Ntb);
    assert_eq!(session.rendered_screen(), Some(ScreenRef("welcome")));
    let action = session.primary_action().expect("welcome declares an action");
    assert_eq!(action.label, "Verify & Continue");
    assert_eq!(action.kind, ActionKind::Advance);

    session.jump_to(&ntb_step(steps::PHYSICAL_KYC));
    assert_eq!(session.rendered_screen(), Some(ScreenRef("physical_kyc")));
    let action = session.primary_action().expect("branch declares an action");
    assert_eq!(action.kind, ActionKind::Complete);
}

#[test]
fn reset_returns_to_idle_with_default_flow_prebuilt() {
    let mut session = started_session(JourneyType::EtbExpress);
    session.merge_draft(FormDraft::from_pairs([("email", serde_json::json!("x@y.z"))]));
    session.reset();

    assert_eq!(session.phase(), JourneyPhase::Idle);
    assert_eq!(session.journey_type(), Some(JourneyType::Ntb));
    assert_eq!(session.steps().len(), 7);
    assert_eq!(session.current_index(), 0);
    assert!(session.form_draft().is_empty());
    assert!(session.changed_fields().is_empty());
}

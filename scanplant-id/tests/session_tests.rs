//! Identification State Machine Tests
//!
//! Covers the session lifecycle:
//! Capturing → Recognizing → Enriching → Ready → Saving → {Saved | Failed | Cancelled}

use scanplant_common::events::IdentState;
use scanplant_id::models::plant::PlantDraft;
use scanplant_id::models::{IdentSession, ImagePayload};

/// Helper to create a test session
fn create_test_session(generation: u64) -> IdentSession {
    IdentSession::new(
        generation,
        ImagePayload {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
            content_type: "image/jpeg".to_string(),
        },
        None,
    )
}

#[test]
fn capturing_to_recognizing() {
    // Given: a session freshly created for a captured image
    let mut session = create_test_session(1);
    assert_eq!(session.state, IdentState::Capturing);
    assert_eq!(session.draft, PlantDraft::default());

    // When: the image is accepted and recognition begins
    let transition = session.transition_to(IdentState::Recognizing);

    // Then: the session is recognizing, with the draft still at defaults
    assert_eq!(session.state, IdentState::Recognizing);
    assert_eq!(transition.old_state, IdentState::Capturing);
    assert_eq!(transition.new_state, IdentState::Recognizing);
    assert_eq!(session.draft, PlantDraft::default());
}

#[test]
fn recognizing_to_enriching() {
    // Given: a session with recognition in flight
    let mut session = create_test_session(1);
    session.transition_to(IdentState::Recognizing);

    // When: a candidate arrives
    let transition = session.transition_to(IdentState::Enriching);

    // Then: the concurrent enrichment stage begins
    assert_eq!(session.state, IdentState::Enriching);
    assert_eq!(transition.old_state, IdentState::Recognizing);
}

#[test]
fn recognizing_to_failed_retains_image() {
    // Given: a session with recognition in flight
    let mut session = create_test_session(1);
    session.transition_to(IdentState::Recognizing);

    // When: recognition returns zero suggestions
    session.alert = Some("Nenhuma sugestão de planta encontrada.".to_string());
    session.transition_to(IdentState::Failed);

    // Then: the session is terminal, the image is retained for retry, and
    // the draft was never written
    assert!(session.is_terminal());
    assert!(session.image.is_some());
    assert!(session.ended_at.is_some());
    assert_eq!(session.draft, PlantDraft::default());
    assert!(session.alert.is_some());
}

#[test]
fn enriching_to_ready_to_saving_to_saved() {
    // Given: a session past recognition
    let mut session = create_test_session(1);
    session.transition_to(IdentState::Recognizing);
    session.transition_to(IdentState::Enriching);

    // When: both lookups joined and the user saves
    session.draft.scientific_name = Some("Rosa gallica".to_string());
    session.transition_to(IdentState::Ready);
    assert!(session.ended_at.is_none());

    session.transition_to(IdentState::Saving);
    let transition = session.transition_to(IdentState::Saved);

    // Then: the session ends in Saved
    assert_eq!(transition.new_state, IdentState::Saved);
    assert!(session.is_terminal());
    assert!(session.ended_at.is_some());
}

#[test]
fn cancel_from_any_state_is_terminal() {
    for intermediate in [
        IdentState::Recognizing,
        IdentState::Enriching,
        IdentState::Ready,
        IdentState::Saving,
    ] {
        let mut session = create_test_session(1);
        session.transition_to(intermediate);
        session.transition_to(IdentState::Cancelled);
        assert!(session.is_terminal());
        assert!(session.ended_at.is_some());
    }
}

#[test]
fn generations_are_carried_per_session() {
    let first = create_test_session(1);
    let second = create_test_session(2);
    assert!(second.generation > first.generation);
    assert_ne!(first.session_id, second.session_id);
}

#[test]
fn snapshot_reflects_state_and_draft() {
    let mut session = create_test_session(7);
    session.transition_to(IdentState::Recognizing);
    session.draft.scientific_name = Some("Aloe vera".to_string());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.generation, 7);
    assert_eq!(snapshot.state, IdentState::Recognizing);
    assert_eq!(snapshot.draft.scientific_name.as_deref(), Some("Aloe vera"));
    assert!(snapshot.has_image);
    assert!(snapshot.ended_at.is_none());
}

mod common;

use citabot_engine::scope::{Scope, ScopeManager};
use citabot_engine::selector::Selector;
use citabot_engine::wait::WaitPolicy;
use common::MockBackend;
use std::time::Duration;

fn markers() -> Vec<Selector> {
    vec![Selector::id("form_marker").presence()]
}

fn probe_policy() -> WaitPolicy {
    WaitPolicy::new(Duration::ZERO, Duration::from_millis(1))
}

#[tokio::test]
async fn top_document_wins_over_frames() {
    let mut mock = MockBackend::new();
    mock.frames = 2;
    mock.add(None, "form_marker");
    mock.add(Some(0), "form_marker");

    let mut scopes = ScopeManager::new();
    let found = scopes
        .find_form_scope(&mut mock, &markers(), &probe_policy())
        .await
        .unwrap();

    assert_eq!(found, Some(Scope::Top));
    assert_eq!(mock.scope, None, "backend never left the top document");
}

#[tokio::test]
async fn commits_to_the_frame_holding_the_markers() {
    let mut mock = MockBackend::new();
    mock.frames = 3;
    mock.add(Some(1), "form_marker");

    let mut scopes = ScopeManager::new();
    let found = scopes
        .find_form_scope(&mut mock, &markers(), &probe_policy())
        .await
        .unwrap();

    assert_eq!(found, Some(Scope::Frame(1)));
    assert_eq!(
        mock.scope,
        Some(1),
        "backend stays switched into the committed frame"
    );
}

#[tokio::test]
async fn reverts_to_top_after_a_frame_without_markers() {
    let mut mock = MockBackend::new();
    mock.frames = 2;

    let mut scopes = ScopeManager::new();
    let found = scopes
        .find_form_scope(&mut mock, &markers(), &probe_policy())
        .await
        .unwrap();

    assert_eq!(found, None);
    assert_eq!(mock.scope, None, "no probe left the backend parked in a frame");
    assert_eq!(scopes.current(), Scope::Top);
}

#[tokio::test]
async fn inaccessible_frame_is_skipped_not_fatal() {
    let mut mock = MockBackend::new();
    mock.frames = 2;
    mock.inaccessible_frames.insert(0);
    mock.add(Some(1), "form_marker");

    let mut scopes = ScopeManager::new();
    let found = scopes
        .find_form_scope(&mut mock, &markers(), &probe_policy())
        .await
        .unwrap();

    assert_eq!(found, Some(Scope::Frame(1)));
}

mod common;

use citabot_engine::invoker::ClickStrategy;
use citabot_engine::selector::Selector;
use citabot_engine::step::{Requirement, StepStatus, UiStep};
use citabot_engine::verifier::Verification;
use citabot_engine::wait::WaitPolicy;
use common::MockBackend;
use std::time::Duration;

fn step(candidates: Vec<Selector>, verify: Verification) -> UiStep {
    let policy = WaitPolicy::new(Duration::ZERO, Duration::from_millis(1));
    UiStep {
        name: "test step",
        requirement: Requirement::Required,
        candidates,
        strategies: vec![ClickStrategy::Scripted],
        reveal_ids: vec![],
        scroll_first: false,
        verify,
        resolve_policy: policy,
        verify_policy: policy,
    }
}

#[tokio::test]
async fn completed_when_click_and_verification_succeed() {
    let mut mock = MockBackend::new();
    mock.add(None, "open_menu").on_click = common::ClickEffect::Show(vec!["menu"]);
    mock.add(None, "menu").visible = false;

    let step = step(
        vec![Selector::id("open_menu")],
        Verification::visible(Selector::id("menu").presence()),
    );
    let record = step.run(&mut mock).await.unwrap();

    assert_eq!(record.status, StepStatus::Completed);
    assert_eq!(record.strategy, Some(ClickStrategy::Scripted));
}

#[tokio::test]
async fn missing_element_reports_not_found() {
    let mut mock = MockBackend::new();
    let step = step(vec![Selector::id("nope")], Verification::none());
    let record = step.run(&mut mock).await.unwrap();

    assert_eq!(record.status, StepStatus::NotFound);
    assert!(record.strategy.is_none());
    assert!(mock.click_log.is_empty(), "nothing was clicked");
}

#[tokio::test]
async fn click_without_observable_change_is_unconfirmed() {
    let mut mock = MockBackend::new();
    mock.add(None, "button");

    // The click executes, but the element it should reveal never appears.
    let step = step(
        vec![Selector::id("button")],
        Verification::visible(Selector::id("menu_that_never_opens").presence()),
    );
    let record = step.run(&mut mock).await.unwrap();

    assert_eq!(record.status, StepStatus::Unconfirmed);
    assert_eq!(record.strategy, Some(ClickStrategy::Scripted));
}

#[tokio::test]
async fn all_strategies_failing_is_click_exhausted() {
    let mut mock = MockBackend::new();
    mock.add(None, "button");
    mock.fail_clicks = true;

    let step = step(vec![Selector::id("button")], Verification::none());
    let record = step.run(&mut mock).await.unwrap();

    assert_eq!(record.status, StepStatus::ClickExhausted);
}

#[tokio::test]
async fn stale_element_is_re_resolved_once() {
    let mut mock = MockBackend::new();
    let handle = mock.add(None, "button").handle;
    mock.stale_once.insert(handle);

    let step = step(vec![Selector::id("button")], Verification::none());
    let record = step.run(&mut mock).await.unwrap();

    assert_eq!(record.status, StepStatus::Completed);
    assert_eq!(
        mock.click_log.len(),
        2,
        "one stale attempt, one successful retry"
    );
}

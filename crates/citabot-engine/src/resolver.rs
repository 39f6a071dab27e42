//! Element resolution over a cascade of selector candidates.
//!
//! Candidates are tried strictly in order; each one gets a bounded poll for
//! its wait condition, and the first satisfying match short-circuits the rest.
//! Exhaustion is `Ok(None)`, never an error; only driver-fatal failures
//! propagate.

use crate::backend::{Backend, BackendError, ElementState};
use crate::selector::{Selector, WaitMode};
use crate::wait::WaitPolicy;
use tokio::time::Instant;
use tracing::debug;

/// An element matched by one candidate of a cascade, together with the
/// candidate that found it (kept for re-resolution after staleness).
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    pub selector: Selector,
    pub state: ElementState,
}

fn satisfies(mode: WaitMode, state: &ElementState) -> bool {
    match mode {
        WaitMode::Presence => true,
        WaitMode::Visible => state.visible,
        WaitMode::Clickable => state.visible && state.enabled,
    }
}

/// Try each candidate in order with a per-candidate bounded wait.
pub async fn resolve<B: Backend + ?Sized>(
    backend: &mut B,
    candidates: &[Selector],
    policy: &WaitPolicy,
) -> Result<Option<ResolvedElement>, BackendError> {
    for candidate in candidates {
        debug!(selector = %candidate, "trying selector candidate");
        let deadline = policy.deadline();
        loop {
            match backend.find(candidate).await {
                Ok(Some(state)) if satisfies(candidate.wait, &state) => {
                    debug!(selector = %candidate, handle = state.handle, "candidate matched");
                    return Ok(Some(ResolvedElement {
                        selector: candidate.clone(),
                        state,
                    }));
                }
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    // Lookup errors (bad expression, inaccessible scope) just
                    // move the cascade along.
                    debug!(selector = %candidate, "lookup failed: {e}");
                    break;
                }
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(policy.interval).await;
        }
    }
    Ok(None)
}

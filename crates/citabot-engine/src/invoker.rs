//! Click-equivalent actions through a fallback cascade.
//!
//! Strategy order is fixed by the caller: native input first, scripted click,
//! synthetic event dispatch, and finally forced state mutation on the reveal
//! targets. A strategy "succeeding" here only means it executed without a
//! driver error; whether the page actually changed is the verifier's job.

use crate::backend::{Backend, BackendError};
use crate::resolver::ResolvedElement;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickStrategy {
    Native,
    Scripted,
    SyntheticEvent,
    /// Direct style/class mutation forcing the step's reveal targets visible.
    /// Inherently fragile and site-specific; last resort only.
    ForceState,
}

impl fmt::Display for ClickStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClickStrategy::Native => "native click",
            ClickStrategy::Scripted => "scripted click",
            ClickStrategy::SyntheticEvent => "synthetic event",
            ClickStrategy::ForceState => "forced state mutation",
        };
        f.write_str(name)
    }
}

pub struct ClickPlan<'a> {
    pub strategies: &'a [ClickStrategy],
    pub scroll_first: bool,
    /// Element ids the `ForceState` tier makes visible.
    pub reveal_ids: &'a [&'a str],
}

/// Run the cascade until one strategy executes cleanly. `Ok(None)` means
/// exhaustion. Stale-handle and fatal errors propagate so the caller can
/// re-resolve or abort.
pub async fn click<B: Backend + ?Sized>(
    backend: &mut B,
    element: &ResolvedElement,
    plan: &ClickPlan<'_>,
) -> Result<Option<ClickStrategy>, BackendError> {
    let handle = element.state.handle;

    if plan.scroll_first {
        match backend.scroll_into_view(handle).await {
            Ok(()) => {}
            Err(e) if e.is_fatal() || matches!(e, BackendError::StaleElement) => return Err(e),
            Err(e) => debug!(handle, "scroll into view failed: {e}"),
        }
    }

    for strategy in plan.strategies {
        let attempt = match strategy {
            ClickStrategy::Native => backend.click_native(handle).await,
            ClickStrategy::Scripted => backend.click_scripted(handle).await,
            ClickStrategy::SyntheticEvent => backend.dispatch_click(handle).await,
            ClickStrategy::ForceState => match backend.force_visible(plan.reveal_ids).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(BackendError::Script("no reveal target present".into())),
                Err(e) => Err(e),
            },
        };

        match attempt {
            Ok(()) => {
                info!(%strategy, selector = %element.selector, "click strategy executed");
                return Ok(Some(*strategy));
            }
            Err(e) if e.is_fatal() || matches!(e, BackendError::StaleElement) => return Err(e),
            Err(e) => warn!(%strategy, "click strategy failed: {e}"),
        }
    }

    Ok(None)
}

//! The resilient UI step: resolve -> act -> verify.
//!
//! Every interaction in the booking flow is an instance of this one shape,
//! specialized only by its selector cascade, click strategies, and
//! verification signals.

use crate::backend::{Backend, BackendError};
use crate::invoker::{self, ClickPlan, ClickStrategy};
use crate::resolver;
use crate::selector::Selector;
use crate::verifier::{self, Verification};
use crate::wait::WaitPolicy;
use tracing::{debug, warn};

/// Whether a step failure aborts the whole run. Downstream sections of the
/// form may legitimately never materialize, so late steps are best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    /// No selector candidate matched within its wait budget.
    NotFound,
    /// Every click strategy failed.
    ClickExhausted,
    /// A strategy executed but no verification signal confirmed the change.
    Unconfirmed,
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub name: &'static str,
    pub status: StepStatus,
    pub strategy: Option<ClickStrategy>,
}

impl StepRecord {
    pub fn succeeded(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

pub struct UiStep {
    pub name: &'static str,
    pub requirement: Requirement,
    pub candidates: Vec<Selector>,
    pub strategies: Vec<ClickStrategy>,
    pub reveal_ids: Vec<&'static str>,
    pub scroll_first: bool,
    pub verify: Verification,
    pub resolve_policy: WaitPolicy,
    pub verify_policy: WaitPolicy,
}

impl UiStep {
    pub async fn run<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<StepRecord, BackendError> {
        let record = |status, strategy| StepRecord {
            name: self.name,
            status,
            strategy,
        };

        let Some(mut element) =
            resolver::resolve(backend, &self.candidates, &self.resolve_policy).await?
        else {
            debug!(step = self.name, "no selector candidate matched");
            return Ok(record(StepStatus::NotFound, None));
        };

        let plan = ClickPlan {
            strategies: &self.strategies,
            scroll_first: self.scroll_first,
            reveal_ids: &self.reveal_ids,
        };

        let clicked = match invoker::click(backend, &element, &plan).await {
            Ok(outcome) => outcome,
            Err(BackendError::StaleElement) => {
                // The DOM mutated under us; re-resolve once and retry.
                debug!(step = self.name, "element went stale, re-resolving");
                match resolver::resolve(backend, &self.candidates, &self.resolve_policy).await? {
                    Some(fresh) => {
                        element = fresh;
                        match invoker::click(backend, &element, &plan).await {
                            Ok(outcome) => outcome,
                            Err(BackendError::StaleElement) => None,
                            Err(e) => return Err(e),
                        }
                    }
                    None => None,
                }
            }
            Err(e) => return Err(e),
        };

        let Some(strategy) = clicked else {
            warn!(step = self.name, "all click strategies exhausted");
            return Ok(record(StepStatus::ClickExhausted, None));
        };

        if verifier::confirm(backend, &self.verify, &self.verify_policy).await? {
            Ok(record(StepStatus::Completed, Some(strategy)))
        } else {
            warn!(
                step = self.name,
                %strategy,
                "click executed but state change was not confirmed"
            );
            Ok(record(StepStatus::Unconfirmed, Some(strategy)))
        }
    }
}

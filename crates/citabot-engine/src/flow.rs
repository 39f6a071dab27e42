//! Sequenced flow controller: navigate, locate the form, run the booking
//! steps in order with asymmetric failure tolerance.

use crate::backend::{Backend, BackendError};
use crate::config::BookingConfig;
use crate::diagnostics;
use crate::scope::{Scope, ScopeManager};
use crate::selector::Selector;
use crate::site;
use crate::step::{Requirement, StepRecord};
use std::fmt;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("backend launch failed: {0}")]
    Launch(BackendError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// Required steps completed; one or more best-effort steps did not.
    CompletedWithWarnings,
    Failed,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunOutcome::Success => "success",
            RunOutcome::CompletedWithWarnings => "completed with warnings",
            RunOutcome::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub scope: Scope,
    pub steps: Vec<StepRecord>,
    pub failed_step: Option<&'static str>,
}

impl RunReport {
    pub const LOCATE_FORM: &'static str = "locate booking form";

    fn form_not_found() -> Self {
        Self {
            outcome: RunOutcome::Failed,
            scope: Scope::Top,
            steps: Vec::new(),
            failed_step: Some(Self::LOCATE_FORM),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome != RunOutcome::Failed
    }
}

pub struct FlowController {
    config: BookingConfig,
}

impl FlowController {
    pub fn new(config: BookingConfig) -> Self {
        Self { config }
    }

    /// Run the whole sequence. Expected failures (form missing, required step
    /// not completing) are reported through the `RunReport`; only driver-level
    /// failures surface as errors.
    pub async fn run<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<RunReport, FlowError> {
        let Some(scope) = self.locate_form(backend).await? else {
            error!("booking form not found on any candidate page or frame");
            return Ok(RunReport::form_not_found());
        };
        info!(?scope, "booking form located");

        self.nudge(backend).await?;

        let mut steps = Vec::new();
        let mut warnings = false;

        for step in site::booking_steps(&self.config) {
            info!(step = step.name, "running step");
            let record = step.run(backend).await?;

            if record.succeeded() {
                info!(step = step.name, strategy = ?record.strategy, "step completed");
                steps.push(record);
                continue;
            }

            match step.requirement {
                Requirement::Required => {
                    error!(step = step.name, status = ?record.status, "required step failed");
                    diagnostics::dump(backend).await;
                    steps.push(record);
                    return Ok(RunReport {
                        outcome: RunOutcome::Failed,
                        scope,
                        steps,
                        failed_step: Some(step.name),
                    });
                }
                Requirement::BestEffort => {
                    warn!(
                        step = step.name,
                        status = ?record.status,
                        "optional step did not complete, continuing"
                    );
                    warnings = true;
                    steps.push(record);
                }
            }
        }

        let outcome = if warnings {
            RunOutcome::CompletedWithWarnings
        } else {
            RunOutcome::Success
        };
        info!(%outcome, "booking flow finished");
        Ok(RunReport {
            outcome,
            scope,
            steps,
            failed_step: None,
        })
    }

    /// Open the primary URL (falling back through the alternates) and find
    /// which document scope holds the form markers. Leaves the backend
    /// switched into the committed scope.
    async fn locate_form<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<Option<Scope>, BackendError> {
        let markers = site::form_markers();
        for url in self.config.candidate_urls() {
            match backend.navigate(url).await {
                Ok(nav) => info!(url = %nav.url, title = %nav.title, "page opened"),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(%url, "navigation failed: {e}");
                    continue;
                }
            }

            self.wait_for_ready(backend).await?;

            let mut scopes = ScopeManager::new();
            match scopes
                .find_form_scope(backend, &markers, &self.config.probe_policy())
                .await?
            {
                Some(scope) => return Ok(Some(scope)),
                None => warn!(%url, "form markers absent in page and frames"),
            }
        }
        Ok(None)
    }

    async fn wait_for_ready<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<(), BackendError> {
        let policy = self.config.ready_policy();
        let deadline = policy.deadline();
        loop {
            match backend.page_ready().await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => debug!("readiness probe failed: {e}"),
            }
            if Instant::now() >= deadline {
                warn!("page never reported ready, continuing anyway");
                return Ok(());
            }
            tokio::time::sleep(policy.interval).await;
        }
    }

    /// Scroll down and back and click the body once. The form's dropdown
    /// markup is generated lazily and sometimes needs a user gesture before
    /// it exists at all.
    async fn nudge<B: Backend + ?Sized>(&self, backend: &mut B) -> Result<(), BackendError> {
        for y in [400, 0] {
            match backend.scroll_to(y).await {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!("scroll nudge failed: {e}");
                    return Ok(());
                }
            }
            tokio::time::sleep(self.config.probe_policy().interval).await;
        }

        match backend.find(&Selector::css("body").presence()).await {
            Ok(Some(body)) => {
                if let Err(e) = backend.click_scripted(body.handle).await {
                    if e.is_fatal() {
                        return Err(e);
                    }
                    debug!("body click nudge failed: {e}");
                }
            }
            Ok(None) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => debug!("body lookup failed: {e}"),
        }
        Ok(())
    }
}

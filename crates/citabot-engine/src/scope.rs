//! Navigation scope management for iframe-embedded forms.
//!
//! The booking form is sometimes rendered inside a same-origin iframe. The
//! scope manager enumerates candidate frames, tentatively enters each one,
//! probes for the form's marker elements, and either commits (all subsequent
//! lookups stay in that frame) or reverts to the top document before trying
//! the next frame. A probe is never allowed to leave the backend parked
//! inside a frame it did not commit to.

use crate::backend::{Backend, BackendError};
use crate::resolver;
use crate::selector::Selector;
use crate::wait::WaitPolicy;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Top,
    Frame(usize),
}

#[derive(Debug, Default)]
pub struct ScopeManager {
    current: Scope,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Scope {
        self.current
    }

    async fn enter<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        index: usize,
    ) -> Result<(), BackendError> {
        backend.switch_to_frame(index).await?;
        self.current = Scope::Frame(index);
        Ok(())
    }

    /// Restore the top document. A revert failure is a driver problem, not a
    /// condition to recover from.
    async fn revert<B: Backend + ?Sized>(&mut self, backend: &mut B) -> Result<(), BackendError> {
        backend.switch_to_top().await?;
        self.current = Scope::Top;
        Ok(())
    }

    /// Find the scope containing the given marker elements: the top document
    /// first, then each frame in order. On success the backend is left
    /// switched into the returned scope.
    pub async fn find_form_scope<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        markers: &[Selector],
        policy: &WaitPolicy,
    ) -> Result<Option<Scope>, BackendError> {
        if resolver::resolve(backend, markers, policy).await?.is_some() {
            debug!("form markers present in top document");
            return Ok(Some(Scope::Top));
        }

        let frames = backend.frame_count().await?;
        debug!(frames, "probing frames for form markers");
        for index in 0..frames {
            if let Err(e) = self.enter(backend, index).await {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!(index, "could not enter frame: {e}");
                self.revert(backend).await?;
                continue;
            }

            match resolver::resolve(backend, markers, policy).await {
                Ok(Some(found)) => {
                    info!(index, selector = %found.selector, "form markers found, committing to frame");
                    return Ok(Some(Scope::Frame(index)));
                }
                Ok(None) => {
                    debug!(index, "no markers in frame");
                    self.revert(backend).await?;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(index, "frame probe failed: {e}");
                    self.revert(backend).await?;
                }
            }
        }

        Ok(None)
    }
}

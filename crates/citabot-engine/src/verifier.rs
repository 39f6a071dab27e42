//! Confirmation that an intended DOM state change actually happened.
//!
//! A click that executed without error is not the same thing as a menu that
//! opened; the cascade can report a false positive with no observable effect.
//! Verification polls a set of independent signals (any one confirming) for a
//! bounded window before declaring the change unconfirmed.

use crate::backend::{Backend, BackendError};
use crate::selector::Selector;
use crate::wait::WaitPolicy;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum Signal {
    ElementPresent(Selector),
    ElementVisible(Selector),
    TextContains(Selector, String),
}

#[derive(Debug, Clone, Default)]
pub struct Verification {
    pub signals: Vec<Signal>,
}

impl Verification {
    /// No observable signal exists for this step; trust the action outcome.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn visible(selector: Selector) -> Self {
        Self {
            signals: vec![Signal::ElementVisible(selector)],
        }
    }

    pub fn text_contains(selector: Selector, needle: impl Into<String>) -> Self {
        Self {
            signals: vec![Signal::TextContains(selector, needle.into())],
        }
    }

    pub fn any(signals: Vec<Signal>) -> Self {
        Self { signals }
    }
}

async fn check<B: Backend + ?Sized>(
    backend: &mut B,
    signal: &Signal,
) -> Result<bool, BackendError> {
    let (selector, wanted_text) = match signal {
        Signal::ElementPresent(s) | Signal::ElementVisible(s) => (s, None),
        Signal::TextContains(s, needle) => (s, Some(needle.as_str())),
    };
    let state = match backend.find(selector).await {
        Ok(state) => state,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            debug!(selector = %selector, "verification lookup failed: {e}");
            return Ok(false);
        }
    };
    let Some(state) = state else {
        return Ok(false);
    };
    Ok(match signal {
        Signal::ElementPresent(_) => true,
        Signal::ElementVisible(_) => state.visible,
        Signal::TextContains(..) => {
            wanted_text.is_some_and(|needle| state.text.contains(needle))
        }
    })
}

/// Poll the signals until one confirms or the window closes.
pub async fn confirm<B: Backend + ?Sized>(
    backend: &mut B,
    verification: &Verification,
    policy: &WaitPolicy,
) -> Result<bool, BackendError> {
    if verification.signals.is_empty() {
        return Ok(true);
    }
    let deadline = policy.deadline();
    loop {
        for signal in &verification.signals {
            if check(backend, signal).await? {
                return Ok(true);
            }
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(policy.interval).await;
    }
}

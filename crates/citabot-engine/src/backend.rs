use crate::selector::Selector;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend not ready")]
    NotReady,

    /// The element handle no longer refers to a live node. Recoverable: the
    /// caller should re-resolve and retry.
    #[error("element handle is stale")]
    StaleElement,

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// Unrecoverable driver failure (session crashed, browser disconnected).
    /// Propagates to the top level; the caller must still guarantee teardown.
    #[error("fatal driver failure: {0}")]
    Fatal(String),
}

impl BackendError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, BackendError::Fatal(_) | BackendError::NotReady)
    }
}

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// Snapshot of a matched element at resolution time. The handle stays valid
/// only while the node is attached; operations on a detached node report
/// `BackendError::StaleElement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementState {
    pub handle: u64,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Driver abstraction the whole engine runs against. All lookups and actions
/// apply to the backend's current navigation scope (top document or a
/// committed frame); `switch_to_frame` / `switch_to_top` mutate that scope,
/// and `navigate` resets it to the top document.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the session and release resources. Must be safe to call after a
    /// failed launch.
    async fn close(&mut self) -> Result<(), BackendError>;

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Single non-waiting lookup in the current scope. `Ok(None)` when nothing
    /// matches; only driver-level failures are errors.
    async fn find(&mut self, selector: &Selector) -> Result<Option<ElementState>, BackendError>;

    async fn scroll_into_view(&mut self, handle: u64) -> Result<(), BackendError>;

    /// Native click through driver-level input events.
    async fn click_native(&mut self, handle: u64) -> Result<(), BackendError>;

    /// Scripted `element.click()`.
    async fn click_scripted(&mut self, handle: u64) -> Result<(), BackendError>;

    /// Synthetic `MouseEvent` dispatch.
    async fn dispatch_click(&mut self, handle: u64) -> Result<(), BackendError>;

    /// Last resort: force the named elements visible by direct style/class
    /// mutation. Returns whether any target was touched.
    async fn force_visible(&mut self, ids: &[&str]) -> Result<bool, BackendError>;

    /// Number of iframes in the top document.
    async fn frame_count(&mut self) -> Result<usize, BackendError>;

    async fn switch_to_frame(&mut self, index: usize) -> Result<(), BackendError>;

    async fn switch_to_top(&mut self) -> Result<(), BackendError>;

    /// Whether the current scope's document finished loading (and its dynamic
    /// initialization settled, as far as the backend can tell).
    async fn page_ready(&mut self) -> Result<bool, BackendError>;

    async fn scroll_to(&mut self, _y: i64) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("scroll_to".into()))
    }

    /// Structural summary of the current scope's document, for logging when a
    /// required step is about to fail.
    async fn page_diagnostics(&mut self) -> Result<serde_json::Value, BackendError> {
        Err(BackendError::NotSupported("page_diagnostics".into()))
    }
}

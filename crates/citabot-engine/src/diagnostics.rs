//! Best-effort page state dump, logged when a required step fails so the
//! operator can see what the page actually looked like.

use crate::backend::Backend;
use tracing::{debug, info};

pub async fn dump<B: Backend + ?Sized>(backend: &mut B) {
    match backend.page_diagnostics().await {
        Ok(summary) => info!(%summary, "page diagnostics"),
        Err(e) => debug!("page diagnostics unavailable: {e}"),
    }
}

//! Session lifecycle: launch, run the flow, hold for inspection, and tear the
//! browser session down exactly once on every exit path.

use crate::backend::Backend;
use crate::config::BookingConfig;
use crate::flow::{FlowController, FlowError, RunReport};
use std::future::Future;
use tracing::warn;

/// Run the booking flow with a guaranteed single teardown. `hold` runs after
/// the flow but before the session closes, so a caller can keep the browser
/// open for manual inspection of the final page state.
pub async fn run_booking<B, F, Fut>(
    backend: &mut B,
    config: &BookingConfig,
    hold: F,
) -> Result<RunReport, FlowError>
where
    B: Backend + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    if let Err(e) = backend.launch().await {
        // Teardown is owed even when initialization itself fails.
        if let Err(close_err) = backend.close().await {
            warn!("session close after failed launch also failed: {close_err}");
        }
        return Err(FlowError::Launch(e));
    }

    let result = FlowController::new(config.clone()).run(backend).await;

    hold().await;

    if let Err(e) = backend.close().await {
        warn!("session close failed: {e}");
    }

    result
}

//! JavaScript probe bridge: injects `probe.js` into the page and routes every
//! lookup/action through `window.__citabot.*` calls.

use chromiumoxide::Page;
use citabot_engine::backend::BackendError;
use serde_json::Value;
use std::time::Duration;

const PROBE_JS: &str = include_str!("probe.js");

/// Timeout for a single JS evaluation; protects against a dialog or a hung
/// renderer blocking the JS thread.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries for context errors while the page is navigating.
const MAX_CONTEXT_RETRIES: u32 = 10;
const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

fn is_session_error(err: &str) -> bool {
    err.contains("Browser closed")
        || err.contains("connection is closed")
        || err.contains("channel closed")
        || err.contains("WebSocket")
}

fn map_eval_error(err: String) -> BackendError {
    if is_session_error(&err) {
        BackendError::Fatal(err)
    } else {
        BackendError::Script(err)
    }
}

async fn ensure_probe(page: &Page) -> Result<(), BackendError> {
    let is_loaded: bool = page
        .evaluate("typeof window.__citabot !== 'undefined'")
        .await
        .map_err(|e| map_eval_error(format!("probe status check failed: {e}")))?
        .into_value()
        .map_err(|e| BackendError::Script(format!("probe status decode failed: {e}")))?;

    if !is_loaded {
        page.evaluate(PROBE_JS)
            .await
            .map_err(|e| map_eval_error(format!("probe injection failed: {e}")))?;
    }

    Ok(())
}

/// Call a probe function with JSON-encoded arguments, re-injecting the probe
/// and retrying on execution-context churn during navigation.
pub async fn call(page: &Page, method: &str, args: &[Value]) -> Result<Value, BackendError> {
    let rendered: Vec<String> = args.iter().map(Value::to_string).collect();
    let expression = format!("window.__citabot.{}({})", method, rendered.join(", "));
    tracing::trace!(%expression, "evaluating probe call");

    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        ensure_probe(page).await?;

        let eval_result = tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression.as_str()))
            .await;

        match eval_result {
            Err(_) => {
                return Err(BackendError::Script(format!(
                    "probe call '{method}' timed out (possibly blocked by a dialog)"
                )));
            }
            Ok(Err(e)) => {
                let err_str = e.to_string();
                if is_context_error(&err_str) {
                    tracing::debug!(
                        "context error during probe call (attempt {}/{}), retrying...",
                        attempt + 1,
                        MAX_CONTEXT_RETRIES
                    );
                    last_error = Some(err_str);
                    tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
                    continue;
                }
                return Err(map_eval_error(err_str));
            }
            Ok(Ok(remote_object)) => {
                return remote_object
                    .into_value::<Value>()
                    .map_err(|e| BackendError::Script(format!("probe result decode failed: {e}")));
            }
        }
    }

    Err(BackendError::Script(last_error.unwrap_or_else(|| {
        format!("probe call '{method}' failed after retries")
    })))
}

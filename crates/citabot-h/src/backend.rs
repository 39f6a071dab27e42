use crate::cdp::CdpClient;
use crate::probe;
use async_trait::async_trait;
use citabot_engine::backend::{Backend, BackendError, ElementState, NavigationResult};
use citabot_engine::selector::Selector;
use serde_json::{Value, json};
use tracing::info;

/// Chromium-backed driver. The navigation scope (top document or one iframe)
/// lives here and is applied to every probe call; `navigate` resets it.
pub struct HeadlessBackend {
    client: Option<CdpClient>,
    visible: bool,
    frame: Option<usize>,
}

impl HeadlessBackend {
    pub fn new(visible: bool) -> Self {
        Self {
            client: None,
            visible,
            frame: None,
        }
    }

    fn client(&self) -> Result<&CdpClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    fn scope_arg(&self) -> Value {
        match self.frame {
            Some(index) => json!(index),
            None => Value::Null,
        }
    }

    /// Probe calls that report a boolean "element still there" flag.
    async fn handle_call(&self, method: &str, handle: u64) -> Result<(), BackendError> {
        let page = &self.client()?.page;
        let value = probe::call(page, method, &[self.scope_arg(), json!(handle)]).await?;
        match value.as_bool() {
            Some(true) => Ok(()),
            _ => Err(BackendError::StaleElement),
        }
    }

    async fn navigation_result(&self) -> Result<NavigationResult, BackendError> {
        let page = &self.client()?.page;
        let title = page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching Chromium session...");
        let client = CdpClient::launch(self.visible)
            .await
            .map_err(|e| BackendError::Fatal(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Fatal(e.to_string()))?;
        }
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;
        info!("Navigating to: {}", url);
        client
            .page
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;
        self.frame = None;
        self.navigation_result().await
    }

    async fn find(&mut self, selector: &Selector) -> Result<Option<ElementState>, BackendError> {
        let page = &self.client()?.page;
        let value = probe::call(
            page,
            "find",
            &[
                self.scope_arg(),
                json!(selector.by.as_str()),
                json!(selector.expr),
            ],
        )
        .await?;
        if value.is_null() {
            return Ok(None);
        }
        let state: ElementState = serde_json::from_value(value)
            .map_err(|e| BackendError::Script(format!("malformed element state: {e}")))?;
        Ok(Some(state))
    }

    async fn scroll_into_view(&mut self, handle: u64) -> Result<(), BackendError> {
        self.handle_call("scrollIntoView", handle).await
    }

    async fn click_native(&mut self, handle: u64) -> Result<(), BackendError> {
        use chromiumoxide::cdp::browser_protocol::input::{
            DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
        };

        let page = &self.client()?.page;
        let center = probe::call(page, "center", &[self.scope_arg(), json!(handle)]).await?;
        if center.is_null() {
            return Err(BackendError::StaleElement);
        }
        let x = center["x"].as_f64().unwrap_or_default();
        let y = center["y"].as_f64().unwrap_or_default();

        for kind in [
            DispatchMouseEventType::MousePressed,
            DispatchMouseEventType::MouseReleased,
        ] {
            let event = DispatchMouseEventParams::builder()
                .r#type(kind)
                .x(x)
                .y(y)
                .button(MouseButton::Left)
                .click_count(1)
                .build()
                .map_err(|e| BackendError::Script(format!("failed to build mouse event: {e:?}")))?;
            page.execute(event)
                .await
                .map_err(|e| BackendError::Script(format!("mouse event failed: {e}")))?;
        }
        Ok(())
    }

    async fn click_scripted(&mut self, handle: u64) -> Result<(), BackendError> {
        self.handle_call("clickScripted", handle).await
    }

    async fn dispatch_click(&mut self, handle: u64) -> Result<(), BackendError> {
        self.handle_call("dispatchClick", handle).await
    }

    async fn force_visible(&mut self, ids: &[&str]) -> Result<bool, BackendError> {
        let page = &self.client()?.page;
        let value = probe::call(page, "forceVisible", &[self.scope_arg(), json!(ids)]).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn frame_count(&mut self) -> Result<usize, BackendError> {
        let page = &self.client()?.page;
        let value = probe::call(page, "frameCount", &[]).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn switch_to_frame(&mut self, index: usize) -> Result<(), BackendError> {
        let page = &self.client()?.page;
        let accessible = probe::call(page, "canEnter", &[json!(index)]).await?;
        if accessible.as_bool() != Some(true) {
            return Err(BackendError::Script(format!(
                "frame {index} is not accessible (missing or cross-origin)"
            )));
        }
        self.frame = Some(index);
        Ok(())
    }

    async fn switch_to_top(&mut self) -> Result<(), BackendError> {
        self.frame = None;
        Ok(())
    }

    async fn page_ready(&mut self) -> Result<bool, BackendError> {
        let page = &self.client()?.page;
        let value = probe::call(page, "ready", &[self.scope_arg()]).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn scroll_to(&mut self, y: i64) -> Result<(), BackendError> {
        let page = &self.client()?.page;
        probe::call(page, "scrollTo", &[self.scope_arg(), json!(y)]).await?;
        Ok(())
    }

    async fn page_diagnostics(&mut self) -> Result<Value, BackendError> {
        let page = &self.client()?.page;
        probe::call(page, "diagnostics", &[self.scope_arg()]).await
    }
}

//! Scriptable in-memory backend for exercising the engine without a browser.

use async_trait::async_trait;
use citabot_engine::backend::{Backend, BackendError, ElementState, NavigationResult};
use citabot_engine::selector::{By, Selector};
use std::collections::HashSet;

/// What clicking an element does to the mock page.
#[derive(Debug, Clone)]
pub enum ClickEffect {
    None,
    /// Make the elements with these keys visible.
    Show(Vec<&'static str>),
    /// Replace the text of the element with this key.
    SetText(&'static str, &'static str),
}

#[derive(Debug, Clone)]
pub struct MockElement {
    pub handle: u64,
    pub scope: Option<usize>,
    /// Matches `Selector::id(key)` lookups.
    pub key: &'static str,
    /// Extra selector renderings this element answers to, e.g.
    /// `"xpath=//button[@data-value='1450']"` or `"css=body"`.
    pub aliases: Vec<String>,
    pub visible: bool,
    pub enabled: bool,
    pub text: String,
    pub on_click: ClickEffect,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    pub elements: Vec<MockElement>,
    pub scope: Option<usize>,
    pub frames: usize,
    pub inaccessible_frames: HashSet<usize>,
    pub launch_error: Option<BackendError>,
    /// Every click strategy fails with a script error.
    pub fail_clicks: bool,
    /// Handles whose first click reports a stale element.
    pub stale_once: HashSet<u64>,
    /// After this many `find` calls, every further lookup is fatal.
    pub fatal_after_finds: Option<usize>,
    pub find_count: usize,
    pub close_calls: usize,
    pub navigations: Vec<String>,
    pub click_log: Vec<(u64, &'static str)>,
    pub probed_selectors: Vec<String>,
    next_handle: u64,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, scope: Option<usize>, key: &'static str) -> &mut MockElement {
        self.next_handle += 1;
        self.elements.push(MockElement {
            handle: self.next_handle,
            scope,
            key,
            aliases: Vec::new(),
            visible: true,
            enabled: true,
            text: String::new(),
            on_click: ClickEffect::None,
        });
        self.elements.last_mut().unwrap()
    }

    pub fn element(&self, key: &str) -> &MockElement {
        self.elements.iter().find(|e| e.key == key).unwrap()
    }

    fn matches(element: &MockElement, selector: &Selector) -> bool {
        let rendered = selector.to_string();
        (selector.by == By::Id && selector.expr == element.key)
            || element.aliases.iter().any(|alias| *alias == rendered)
    }

    fn apply_effect(&mut self, effect: ClickEffect, scope: Option<usize>) {
        match effect {
            ClickEffect::None => {}
            ClickEffect::Show(keys) => {
                for element in &mut self.elements {
                    if element.scope == scope && keys.contains(&element.key) {
                        element.visible = true;
                    }
                }
            }
            ClickEffect::SetText(key, text) => {
                for element in &mut self.elements {
                    if element.scope == scope && element.key == key {
                        element.text = text.to_string();
                    }
                }
            }
        }
    }

    fn click(&mut self, handle: u64, kind: &'static str) -> Result<(), BackendError> {
        self.click_log.push((handle, kind));
        if self.fail_clicks {
            return Err(BackendError::Script("click rejected".into()));
        }
        if self.stale_once.remove(&handle) {
            return Err(BackendError::StaleElement);
        }
        let scope = self.scope;
        let effect = self
            .elements
            .iter()
            .find(|e| e.scope == scope && e.handle == handle)
            .map(|e| e.on_click.clone())
            .ok_or(BackendError::StaleElement)?;
        self.apply_effect(effect, scope);
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        if let Some(e) = self.launch_error.take() {
            return Err(e);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.close_calls += 1;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.navigations.push(url.to_string());
        self.scope = None;
        Ok(NavigationResult {
            url: url.to_string(),
            title: "mock page".into(),
        })
    }

    async fn find(&mut self, selector: &Selector) -> Result<Option<ElementState>, BackendError> {
        self.find_count += 1;
        self.probed_selectors.push(selector.to_string());
        if let Some(limit) = self.fatal_after_finds {
            if self.find_count > limit {
                return Err(BackendError::Fatal("session lost".into()));
            }
        }
        let scope = self.scope;
        Ok(self
            .elements
            .iter()
            .find(|e| e.scope == scope && Self::matches(e, selector))
            .map(|e| ElementState {
                handle: e.handle,
                tag: "button".into(),
                text: e.text.clone(),
                visible: e.visible,
                enabled: e.enabled,
            }))
    }

    async fn scroll_into_view(&mut self, _handle: u64) -> Result<(), BackendError> {
        Ok(())
    }

    async fn click_native(&mut self, handle: u64) -> Result<(), BackendError> {
        self.click(handle, "native")
    }

    async fn click_scripted(&mut self, handle: u64) -> Result<(), BackendError> {
        self.click(handle, "scripted")
    }

    async fn dispatch_click(&mut self, handle: u64) -> Result<(), BackendError> {
        self.click(handle, "dispatch")
    }

    async fn force_visible(&mut self, ids: &[&str]) -> Result<bool, BackendError> {
        let scope = self.scope;
        let mut touched = false;
        for element in &mut self.elements {
            if element.scope == scope && ids.contains(&element.key) {
                element.visible = true;
                touched = true;
            }
        }
        Ok(touched)
    }

    async fn frame_count(&mut self) -> Result<usize, BackendError> {
        Ok(self.frames)
    }

    async fn switch_to_frame(&mut self, index: usize) -> Result<(), BackendError> {
        if index >= self.frames || self.inaccessible_frames.contains(&index) {
            return Err(BackendError::Script(format!("frame {index} not accessible")));
        }
        self.scope = Some(index);
        Ok(())
    }

    async fn switch_to_top(&mut self) -> Result<(), BackendError> {
        self.scope = None;
        Ok(())
    }

    async fn page_ready(&mut self) -> Result<bool, BackendError> {
        Ok(true)
    }

    async fn scroll_to(&mut self, _y: i64) -> Result<(), BackendError> {
        Ok(())
    }

    async fn page_diagnostics(&mut self) -> Result<serde_json::Value, BackendError> {
        Ok(serde_json::json!({ "elements": self.elements.len() }))
    }
}

/// A config whose wait budgets collapse to a single probe, so tests never
/// sleep out real timeouts.
pub fn fast_config() -> citabot_engine::config::BookingConfig {
    citabot_engine::config::BookingConfig {
        fallback_urls: Vec::new(),
        step_timeout_secs: 0,
        section_timeout_secs: 0,
        ready_timeout_secs: 0,
        probe_timeout_secs: 0,
        poll_interval_ms: 1,
        ..Default::default()
    }
}

/// Populate the mock with a working copy of the whole booking form in the
/// given scope.
pub fn build_booking_form(mock: &mut MockBackend, scope: Option<usize>) {
    mock.add(scope, "body").aliases.push("css=body".into());

    let e = mock.add(scope, "button_service");
    e.text = "Clic para seleccionar".into();
    e.on_click = ClickEffect::Show(vec!["services_drop"]);

    mock.add(scope, "services_drop").visible = false;

    let e = mock.add(scope, "cardiology_entry");
    e.aliases
        .push("xpath=//button[@class='action service' and @data-value='1450']".into());
    e.text = "CARDIOLOGÍA".into();
    e.on_click = ClickEffect::SetText("button_service", "CARDIOLOGÍA");

    let e = mock.add(scope, "consultation_entry");
    e.aliases.push("xpath=//button[@data-value='1511']".into());
    e.text = "Consulta control o de seguimiento".into();

    mock.add(scope, "btn_search");

    let e = mock.add(scope, "group_button");
    e.on_click = ClickEffect::Show(vec!["groups_drop"]);
    mock.add(scope, "groups_drop").visible = false;

    let e = mock.add(scope, "city_entry");
    e.aliases
        .push("xpath=//button[@data-value='Medellín' and @data-name='Medellín']".into());
    e.text = "Medellín".into();
    e.on_click = ClickEffect::SetText("selected_place", "Medellín");
    mock.add(scope, "selected_place");

    let e = mock.add(scope, "professional_button");
    e.on_click = ClickEffect::Show(vec!["professional_drop"]);
    mock.add(scope, "professional_drop").visible = false;

    let e = mock.add(scope, "professional_entry");
    e.aliases.push("text=Cualquier profesional".into());
    e.text = "Cualquier profesional".into();
    e.on_click = ClickEffect::SetText("selected_professional", "Cualquier profesional");
    mock.add(scope, "selected_professional");
}

//! Page map for the Instituto del Corazón appointment form.
//!
//! Everything here is specific to one page's markup: element ids, the
//! service catalog data-values, and the XPath fallbacks that survived contact
//! with the real site. The markup is generated client-side, so each step
//! carries several lookup routes for the same element.

use crate::config::BookingConfig;
use crate::invoker::ClickStrategy;
use crate::selector::Selector;
use crate::step::{Requirement, UiStep};
use crate::verifier::{Signal, Verification};

pub const SERVICE_BUTTON: &str = "button_service";
pub const SERVICES_DROP: &str = "services_drop";
pub const SERVICE_LIST: &str = "service_list";
pub const SEARCH_BUTTON: &str = "btn_search";
pub const GROUP_BUTTON: &str = "group_button";
pub const GROUPS_DROP: &str = "groups_drop";
pub const SELECTED_PLACE: &str = "selected_place";
pub const PROFESSIONAL_BUTTON: &str = "professional_button";
pub const PROFESSIONAL_DROP: &str = "professional_drop";
pub const SELECTED_PROFESSIONAL: &str = "selected_professional";

/// Cardiology's service code in the dropdown catalog.
pub const CARDIOLOGY_VALUE: &str = "1450";
pub const CARDIOLOGY_NAME: &str = "CARDIOLOGÍA";

const FULL_CASCADE: [ClickStrategy; 4] = [
    ClickStrategy::Native,
    ClickStrategy::Scripted,
    ClickStrategy::SyntheticEvent,
    ClickStrategy::ForceState,
];

const CLICK_CASCADE: [ClickStrategy; 3] = [
    ClickStrategy::Native,
    ClickStrategy::Scripted,
    ClickStrategy::SyntheticEvent,
];

/// Elements whose presence identifies the booking form, used when scouting
/// the top document and candidate frames.
pub fn form_markers() -> Vec<Selector> {
    vec![
        Selector::id(SERVICE_BUTTON).presence(),
        Selector::id(SERVICES_DROP).presence(),
        Selector::id(SERVICE_LIST).presence(),
    ]
}

fn open_service_menu(config: &BookingConfig) -> UiStep {
    UiStep {
        name: "open service menu",
        requirement: Requirement::Required,
        candidates: vec![
            Selector::id(SERVICE_BUTTON).clickable(),
            Selector::xpath("//button[@class='dropbtn' and contains(@onclick, 'showList')]"),
            Selector::xpath("//button[.//span[text()='Clic para seleccionar']]"),
            Selector::xpath("//div[@class='dropdown']//button[@class='dropbtn']"),
        ],
        strategies: FULL_CASCADE.to_vec(),
        reveal_ids: vec![SERVICES_DROP, SERVICE_LIST],
        scroll_first: true,
        verify: Verification::any(vec![
            Signal::ElementVisible(Selector::id(SERVICES_DROP).presence()),
            Signal::ElementVisible(Selector::id(SERVICE_LIST).presence()),
        ]),
        resolve_policy: config.step_policy(),
        verify_policy: config.probe_policy(),
    }
}

fn select_specialty(config: &BookingConfig) -> UiStep {
    UiStep {
        name: "select specialty",
        requirement: Requirement::Required,
        candidates: vec![
            Selector::xpath(format!(
                "//li[@class='subtitle']//button[@class='action service' and \
                 @data-value='{CARDIOLOGY_VALUE}' and @data-name='{CARDIOLOGY_NAME}']"
            )),
            Selector::xpath(format!(
                "//ul[@id='{SERVICE_LIST}']//button[@data-value='{CARDIOLOGY_VALUE}' and \
                 @data-name='{CARDIOLOGY_NAME}']"
            )),
            Selector::xpath(format!(
                "//button[@class='action service' and @data-value='{CARDIOLOGY_VALUE}']"
            )),
            Selector::xpath(format!(
                "//button[@data-value='{CARDIOLOGY_VALUE}' and text()='{CARDIOLOGY_NAME}']"
            )),
            Selector::xpath(format!(
                "//li[@class='subtitle']//button[text()='{CARDIOLOGY_NAME}']"
            )),
            Selector::xpath(format!(
                "//button[@onclick='showServiceOptionSelected(this)' and \
                 @data-value='{CARDIOLOGY_VALUE}']"
            )),
        ],
        strategies: CLICK_CASCADE.to_vec(),
        reveal_ids: vec![],
        scroll_first: true,
        verify: Verification::text_contains(
            Selector::id(SERVICE_BUTTON).presence(),
            CARDIOLOGY_NAME,
        ),
        resolve_policy: config.step_policy(),
        verify_policy: config.probe_policy(),
    }
}

fn select_consultation(config: &BookingConfig) -> UiStep {
    let value = config.consultation.data_value();
    UiStep {
        name: "select consultation type",
        requirement: Requirement::Required,
        candidates: vec![
            Selector::xpath(format!(
                "//button[@data-value='{value}' and @data-parent_id='{CARDIOLOGY_VALUE}']"
            )),
            Selector::xpath(format!(
                "//button[@class='subservice_item service' and @data-value='{value}']"
            )),
            Selector::xpath(format!("//button[@data-value='{value}']")),
        ],
        strategies: CLICK_CASCADE.to_vec(),
        reveal_ids: vec![],
        scroll_first: true,
        // The page exposes no reliable signal for this selection; the search
        // button exists either way.
        verify: Verification::none(),
        resolve_policy: config.step_policy(),
        verify_policy: config.probe_policy(),
    }
}

fn trigger_search(config: &BookingConfig) -> UiStep {
    UiStep {
        name: "trigger search",
        requirement: Requirement::BestEffort,
        candidates: vec![
            Selector::id(SEARCH_BUTTON).clickable(),
            Selector::xpath("//button[contains(@class, 'search')]"),
            Selector::xpath("//button[contains(text(), 'Buscar')]"),
            Selector::xpath("//button[@type='submit']"),
            Selector::css("button[style*='background-color: rgb(158, 19, 43)']"),
        ],
        strategies: CLICK_CASCADE.to_vec(),
        reveal_ids: vec![],
        scroll_first: true,
        verify: Verification::none(),
        resolve_policy: config.step_policy(),
        verify_policy: config.probe_policy(),
    }
}

fn open_location_menu(config: &BookingConfig) -> UiStep {
    UiStep {
        name: "open location menu",
        requirement: Requirement::BestEffort,
        candidates: vec![Selector::id(GROUP_BUTTON).clickable()],
        strategies: FULL_CASCADE.to_vec(),
        reveal_ids: vec![GROUPS_DROP],
        scroll_first: true,
        verify: Verification::visible(Selector::id(GROUPS_DROP).presence()),
        // The location section only appears after the search round-trip.
        resolve_policy: config.section_policy(),
        verify_policy: config.probe_policy(),
    }
}

fn select_city(config: &BookingConfig) -> UiStep {
    let city = &config.city;
    UiStep {
        name: "select city",
        requirement: Requirement::BestEffort,
        candidates: vec![
            Selector::xpath(format!(
                "//button[@data-value='{city}' and @data-name='{city}']"
            )),
            Selector::xpath(format!(
                "//button[@class='action place' and @data-value='{city}']"
            )),
            Selector::xpath(format!(
                "//li[@class='places_list']//button[text()='{city}']"
            )),
            Selector::xpath(format!(
                "//ul[@id='group']//button[contains(text(), '{city}')]"
            )),
        ],
        strategies: CLICK_CASCADE.to_vec(),
        reveal_ids: vec![],
        scroll_first: true,
        verify: Verification::text_contains(
            Selector::id(SELECTED_PLACE).presence(),
            city.clone(),
        ),
        resolve_policy: config.step_policy(),
        verify_policy: config.step_policy(),
    }
}

fn open_professional_menu(config: &BookingConfig) -> UiStep {
    UiStep {
        name: "open professional menu",
        requirement: Requirement::BestEffort,
        candidates: vec![Selector::id(PROFESSIONAL_BUTTON).clickable()],
        strategies: FULL_CASCADE.to_vec(),
        reveal_ids: vec![PROFESSIONAL_DROP],
        scroll_first: true,
        verify: Verification::visible(Selector::id(PROFESSIONAL_DROP).presence()),
        resolve_policy: config.section_policy(),
        verify_policy: config.probe_policy(),
    }
}

fn select_professional(config: &BookingConfig) -> UiStep {
    let professional = &config.professional;
    UiStep {
        name: "select professional",
        requirement: Requirement::BestEffort,
        candidates: vec![
            Selector::xpath(format!(
                "//button[@data-value='{professional}' and @data-name='{professional}']"
            )),
            Selector::xpath(format!(
                "//button[@class='action professional' and contains(text(), '{professional}')]"
            )),
            Selector::xpath(format!(
                "//li[@class='professionals_list']//button[text()='{professional}']"
            )),
            Selector::text(professional.clone()),
        ],
        strategies: CLICK_CASCADE.to_vec(),
        reveal_ids: vec![],
        scroll_first: true,
        verify: Verification::text_contains(
            Selector::id(SELECTED_PROFESSIONAL).presence(),
            professional.clone(),
        ),
        resolve_policy: config.step_policy(),
        verify_policy: config.probe_policy(),
    }
}

/// The full booking sequence, in execution order.
pub fn booking_steps(config: &BookingConfig) -> Vec<UiStep> {
    vec![
        open_service_menu(config),
        select_specialty(config),
        select_consultation(config),
        trigger_search(config),
        open_location_menu(config),
        select_city(config),
        open_professional_menu(config),
        select_professional(config),
    ]
}

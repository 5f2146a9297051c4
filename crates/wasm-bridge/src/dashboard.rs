//! JavaScript entry point.
//!
//! The page creates one `Dashboard`, registers a change callback, calls
//! `mount()` once the map container is in the DOM, and re-renders from
//! `view()` every time the callback fires.

use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use school_dash_config::{ConfigFormat, ConfigParser};
use school_dash_data::dates::today;
use school_dash_data::{BrowserStorage, FetchClient};
use school_dash_shared::{DashError, ErrorResponse};

use crate::kakao::{load_sdk, DomScriptHost, KakaoMapWidget};
use crate::map_view::LoadStep;
use crate::setup::SetupForm;
use crate::shell::{PageShell, PanelKind};

type Shell = PageShell<FetchClient, BrowserStorage, KakaoMapWidget>;

#[wasm_bindgen]
pub struct Dashboard {
    shell: Rc<Shell>,
}

#[wasm_bindgen]
impl Dashboard {
    /// `config_json` is a serialized dashboard configuration; missing
    /// sections fall back to defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Dashboard, JsValue> {
        crate::init_logging();

        let config = ConfigParser::parse_string(config_json, ConfigFormat::Json).map_err(|e| {
            js_error(
                DashError::InvalidConfig {
                    message: e.to_string(),
                    field: None,
                },
                "new",
            )
        })?;
        let report = config.validate();
        for error in &report.errors {
            log::error!("Config error: {error}");
        }

        let shell = Rc::new(PageShell::new(
            &config,
            FetchClient::new(),
            BrowserStorage::local(),
            today(),
        ));

        // A new profile re-fetches both day panels
        let weak = Rc::downgrade(&shell);
        shell.identity().subscribe(move |_profile| {
            if let Some(shell) = weak.upgrade() {
                spawn_refresh(&shell, PanelKind::Schedule);
                spawn_refresh(&shell, PanelKind::Menu);
            }
        });

        log::info!("Dashboard created");
        Ok(Dashboard { shell })
    }

    /// Register the function called after every asynchronous state change
    #[wasm_bindgen(js_name = setOnChange)]
    pub fn set_on_change(&self, callback: js_sys::Function) {
        self.shell.set_on_change(move || {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::error!("Change callback threw: {e:?}");
            }
        });
    }

    /// Start the map SDK and the first timetable and menu requests
    pub fn mount(&self) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| {
                js_error(
                    DashError::JsInterop {
                        message: "No document available".to_string(),
                    },
                    "mount",
                )
            })?;

        let on_load = {
            let weak = Rc::downgrade(&self.shell);
            move || init_map(weak.clone())
        };
        let on_error = {
            let weak = Rc::downgrade(&self.shell);
            move |detail: String| {
                if let Some(shell) = weak.upgrade() {
                    shell.map().borrow_mut().on_script_error(&detail);
                    shell.notify_changed();
                }
            }
        };
        let host = DomScriptHost::new(document, on_load, on_error);

        let step = self.shell.map().borrow_mut().begin_loading(&host);
        if step == LoadStep::SdkReady {
            init_map(Rc::downgrade(&self.shell));
        }

        spawn_refresh(&self.shell, PanelKind::Schedule);
        spawn_refresh(&self.shell, PanelKind::Menu);
        Ok(())
    }

    /// Current page snapshot as a plain JS object
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.shell.view()).map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = previousDay)]
    pub fn previous_day(&self, panel: &str) -> Result<(), JsValue> {
        self.shift(panel, false)
    }

    #[wasm_bindgen(js_name = nextDay)]
    pub fn next_day(&self, panel: &str) -> Result<(), JsValue> {
        self.shift(panel, true)
    }

    #[wasm_bindgen(js_name = updateSetup)]
    pub fn update_setup(&self, form: JsValue) -> Result<(), JsValue> {
        let form: SetupForm = serde_wasm_bindgen::from_value(form)?;
        self.shell.update_setup(form);
        Ok(())
    }

    /// Save the settings form; returns the message to show
    #[wasm_bindgen(js_name = saveSetup)]
    pub fn save_setup(&self) -> String {
        match self.shell.save_setup() {
            Ok(()) => school_dash_shared::messages::SETUP_SAVED.to_string(),
            Err(message) => message.to_string(),
        }
    }

    #[wasm_bindgen(js_name = resetSetup)]
    pub fn reset_setup(&self) {
        self.shell.reset_setup();
    }

    #[wasm_bindgen(js_name = setRouteInput)]
    pub fn set_route_input(&self, text: &str) {
        self.shell.set_route_input(text);
    }

    #[wasm_bindgen(js_name = focusRouteInput)]
    pub fn focus_route_input(&self) {
        self.shell.focus_route_input();
    }

    #[wasm_bindgen(js_name = blurRouteInput)]
    pub fn blur_route_input(&self) {
        self.shell.blur_route_input();
    }

    #[wasm_bindgen(js_name = pickHomeSuggestion)]
    pub fn pick_home_suggestion(&self) {
        self.shell.pick_home_suggestion();
    }

    /// Button click or Enter in the address box
    #[wasm_bindgen(js_name = searchRoute)]
    pub fn search_route(&self) {
        let shell = Rc::clone(&self.shell);
        spawn_local(async move {
            shell.search_route().await;
        });
    }
}

impl Dashboard {
    fn shift(&self, panel: &str, forward: bool) -> Result<(), JsValue> {
        let kind = match panel {
            "schedule" => PanelKind::Schedule,
            "menu" => PanelKind::Menu,
            other => return Err(JsValue::from_str(&format!("Unknown panel '{other}'"))),
        };
        self.shell.shift_day(kind, forward);
        spawn_refresh(&self.shell, kind);
        Ok(())
    }
}

/// Serialize an error envelope for the JS caller
fn js_error(error: DashError, operation: &str) -> JsValue {
    JsValue::from_str(&ErrorResponse::new(error).with_context("Dashboard", operation).to_json())
}

fn spawn_refresh(shell: &Rc<Shell>, kind: PanelKind) {
    let shell = Rc::clone(shell);
    spawn_local(async move {
        shell.refresh(kind).await;
    });
}

/// Build the map widget once `kakao.maps` has loaded its modules
fn init_map(weak: Weak<Shell>) {
    load_sdk(move || {
        let Some(shell) = weak.upgrade() else {
            return;
        };

        let config = shell.map().borrow().config().clone();
        let container = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&config.container_id));
        let Some(container) = container else {
            log::error!("Map container '#{}' not found", config.container_id);
            return;
        };

        let widget = KakaoMapWidget::create(
            &container,
            config.default_center.into(),
            config.default_level,
        );
        match widget {
            Ok(widget) => {
                if shell.map().borrow_mut().on_sdk_ready(widget) {
                    shell.notify_changed();
                }
            }
            Err(e) => log::error!("Failed to create map: {e}"),
        }
    });
}

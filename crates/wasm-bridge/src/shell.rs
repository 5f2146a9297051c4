//! The page: settings form, timetable and menu panels, route search and map.
//!
//! `PageShell` wires the identity store into every panel. Its async methods
//! never hold a `RefCell` borrow across an await, so the browser can run
//! several of them concurrently on the single UI thread.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use serde::Serialize;

use school_dash_config::{DashConfig, StorageKeys};
use school_dash_data::storage::{read_string, write_string};
use school_dash_data::{
    HttpClient, IdentityStore, KeyValueStore, MenuFetcher, RoutePipeline, ScheduleFetcher,
};
use school_dash_shared::{messages, MenuEntry, ScheduleEntry, UserProfile};

use crate::map_view::{MapView, MapWidget};
use crate::panels::{DayPanel, MenuPanelView, RoutePanel, RoutePanelView, SchedulePanelView};
use crate::setup::{SetupForm, SetupOptions};

/// Which day panel an action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Schedule,
    Menu,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetupView {
    pub options: SetupOptions,
    pub form: SetupForm,
    pub message: Option<&'static str>,
}

/// Everything the page renders, in one serializable snapshot
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub setup: SetupView,
    pub schedule: SchedulePanelView,
    pub menu: MenuPanelView,
    pub route: RoutePanelView,
    pub map_loaded: bool,
}

pub struct PageShell<C, S, W>
where
    C: HttpClient + Clone,
    S: KeyValueStore + Clone,
    W: MapWidget,
{
    store: S,
    keys: StorageKeys,
    identity: Rc<IdentityStore<S>>,
    schedule_fetcher: ScheduleFetcher<C>,
    menu_fetcher: MenuFetcher<C>,
    route_pipeline: RoutePipeline<C, S>,
    schedule: RefCell<DayPanel<ScheduleEntry>>,
    menu: RefCell<DayPanel<MenuEntry>>,
    route: RefCell<RoutePanel>,
    map: RefCell<MapView<W>>,
    setup_form: RefCell<SetupForm>,
    setup_message: RefCell<Option<&'static str>>,
    on_change: RefCell<Option<Rc<dyn Fn()>>>,
}

impl<C, S, W> PageShell<C, S, W>
where
    C: HttpClient + Clone,
    S: KeyValueStore + Clone,
    W: MapWidget,
{
    /// Restore the profile, both date cursors and the last route input from `store`
    pub fn new(config: &DashConfig, client: C, store: S, today: NaiveDate) -> Self {
        let keys = config.storage.clone();
        let identity = Rc::new(IdentityStore::load(store.clone(), keys.profile.clone()));

        let schedule = DayPanel::load(&store, &keys.schedule_date, today);
        let menu = DayPanel::load(&store, &keys.menu_date, today);
        let route_input = read_string(&store, &keys.home_input).unwrap_or_default();
        let setup_form = SetupForm::from_profile(identity.get().as_ref());

        Self {
            schedule_fetcher: ScheduleFetcher::new(client.clone(), config.neis.clone()),
            menu_fetcher: MenuFetcher::new(client.clone(), config.neis.clone()),
            route_pipeline: RoutePipeline::new(client, config.kakao.clone(), Rc::clone(&identity)),
            map: RefCell::new(MapView::new(config.map.clone(), config.kakao.sdk_script_url())),
            schedule: RefCell::new(schedule),
            menu: RefCell::new(menu),
            route: RefCell::new(RoutePanel::new(route_input)),
            setup_form: RefCell::new(setup_form),
            setup_message: RefCell::new(None),
            on_change: RefCell::new(None),
            identity,
            store,
            keys,
        }
    }

    pub fn identity(&self) -> &Rc<IdentityStore<S>> {
        &self.identity
    }

    pub fn map(&self) -> &RefCell<MapView<W>> {
        &self.map
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.identity.get()
    }

    /// Called whenever an async operation changes what the page shows
    pub fn set_on_change(&self, listener: impl Fn() + 'static) {
        *self.on_change.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn notify_changed(&self) {
        let listener = self.on_change.borrow().clone();
        if let Some(listener) = listener {
            listener();
        }
    }

    /// Re-fetch one panel for its current date.
    ///
    /// Returns `false` when a newer request superseded this one.
    pub async fn refresh(&self, kind: PanelKind) -> bool {
        let profile = self.identity.get();
        match kind {
            PanelKind::Schedule => {
                let (ticket, date) = {
                    let mut panel = self.schedule.borrow_mut();
                    (panel.begin(), panel.date())
                };
                self.notify_changed();
                let outcome = self.schedule_fetcher.fetch(profile.as_ref(), date).await;
                let applied = self.schedule.borrow_mut().finish(ticket, outcome);
                if applied {
                    self.notify_changed();
                }
                applied
            }
            PanelKind::Menu => {
                let (ticket, date) = {
                    let mut panel = self.menu.borrow_mut();
                    (panel.begin(), panel.date())
                };
                self.notify_changed();
                let outcome = self.menu_fetcher.fetch(profile.as_ref(), date).await;
                let applied = self.menu.borrow_mut().finish(ticket, outcome);
                if applied {
                    self.notify_changed();
                }
                applied
            }
        }
    }

    /// Move a panel by one day and persist its cursor; the caller refreshes it
    pub fn shift_day(&self, kind: PanelKind, forward: bool) -> NaiveDate {
        match (kind, forward) {
            (PanelKind::Schedule, true) => self.schedule.borrow_mut().next_day(&self.store),
            (PanelKind::Schedule, false) => self.schedule.borrow_mut().previous_day(&self.store),
            (PanelKind::Menu, true) => self.menu.borrow_mut().next_day(&self.store),
            (PanelKind::Menu, false) => self.menu.borrow_mut().previous_day(&self.store),
        }
    }

    pub fn update_setup(&self, form: SetupForm) {
        *self.setup_form.borrow_mut() = form;
        *self.setup_message.borrow_mut() = None;
    }

    /// Validate the form and save the profile; subscribers of the identity
    /// store hear about it
    pub fn save_setup(&self) -> Result<(), &'static str> {
        let submitted = self.setup_form.borrow().submit();
        let result = submitted.map(|profile| {
            if let Err(e) = self.identity.set(profile) {
                log::error!("Profile kept in memory only: {e}");
            }
        });
        *self.setup_message.borrow_mut() = Some(match result {
            Ok(()) => messages::SETUP_SAVED,
            Err(message) => message,
        });
        result
    }

    /// Discard edits and restore the form from the stored profile
    pub fn reset_setup(&self) {
        self.update_setup(SetupForm::from_profile(self.identity.get().as_ref()));
    }

    pub fn set_route_input(&self, text: &str) {
        self.route.borrow_mut().set_input(text);
        write_string(&self.store, &self.keys.home_input, text);
    }

    pub fn focus_route_input(&self) {
        let profile = self.identity.get();
        let home = profile.as_ref().and_then(UserProfile::home_address);
        self.route.borrow_mut().focus(home);
    }

    pub fn blur_route_input(&self) {
        self.route.borrow_mut().blur();
    }

    /// Fill the input with the saved home address, if any
    pub fn pick_home_suggestion(&self) {
        let profile = self.identity.get();
        if let Some(home) = profile.as_ref().and_then(UserProfile::home_address) {
            self.route.borrow_mut().pick_suggestion(home);
            write_string(&self.store, &self.keys.home_input, home);
        }
    }

    /// Run a route search for the current input.
    ///
    /// Ignored while a search is in flight. The map is cleared as the search
    /// starts and redrawn from whatever the search leaves behind.
    pub async fn search_route(&self) -> bool {
        let (ticket, address) = {
            let mut route = self.route.borrow_mut();
            if route.is_loading() {
                log::debug!("Route search already running");
                return false;
            }
            (route.begin(), route.input().to_string())
        };
        self.sync_map();
        self.notify_changed();

        let profile = self.identity.get();
        let result = self.route_pipeline.search(&address, profile.as_ref()).await;

        let applied = self.route.borrow_mut().finish(ticket, result);
        if applied {
            self.sync_map();
            self.notify_changed();
        }
        applied
    }

    /// Push the route panel's current geometry to the map
    pub fn sync_map(&self) {
        let scene = self.route.borrow().scene();
        self.map.borrow_mut().render(scene);
    }

    pub fn view(&self) -> PageView {
        let profile = self.identity.get();
        let has_profile = profile.is_some();
        let home = profile.as_ref().and_then(UserProfile::home_address);
        let map_loaded = self.map.borrow().is_loaded();

        PageView {
            setup: SetupView {
                options: SetupOptions::default(),
                form: self.setup_form.borrow().clone(),
                message: *self.setup_message.borrow(),
            },
            schedule: SchedulePanelView::build(&self.schedule.borrow(), has_profile),
            menu: MenuPanelView::build(&self.menu.borrow(), has_profile),
            route: self.route.borrow().view(home, map_loaded),
            map_loaded,
        }
    }
}

//! Per-panel state and the view models handed to the page.
//!
//! Each panel owns its loading flag, its last outcome and its request
//! generation; nothing is shared between panels.

use chrono::NaiveDate;
use serde::Serialize;

use school_dash_data::dates::{display_date, display_date_with_weekday};
use school_dash_data::{
    DateCursor, FetchOutcome, GenerationTicket, KeyValueStore, RequestGeneration, RouteError,
    RouteOutcome,
};
use school_dash_shared::{messages, MenuEntry, RouteResult, ScheduleEntry};

use crate::map_view::Scene;

/// A day-by-day panel (timetable or menu)
pub struct DayPanel<T> {
    cursor: DateCursor,
    storage_key: String,
    generation: RequestGeneration,
    loading: bool,
    outcome: FetchOutcome<T>,
}

impl<T> DayPanel<T> {
    /// Restore the panel's date from `store`, defaulting to `today`
    pub fn load<S: KeyValueStore>(store: &S, storage_key: &str, today: NaiveDate) -> Self {
        Self {
            cursor: DateCursor::load(store, storage_key, today),
            storage_key: storage_key.to_string(),
            generation: RequestGeneration::new(),
            loading: false,
            outcome: FetchOutcome::not_found(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.cursor.date()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn outcome(&self) -> &FetchOutcome<T> {
        &self.outcome
    }

    pub fn next_day<S: KeyValueStore>(&mut self, store: &S) -> NaiveDate {
        self.cursor.next_day();
        self.cursor.save(store, &self.storage_key);
        self.date()
    }

    pub fn previous_day<S: KeyValueStore>(&mut self, store: &S) -> NaiveDate {
        self.cursor.previous_day();
        self.cursor.save(store, &self.storage_key);
        self.date()
    }

    /// Reset to loading with no entries; the ticket identifies this request
    pub fn begin(&mut self) -> GenerationTicket {
        self.loading = true;
        self.outcome = FetchOutcome::not_found();
        self.generation.advance()
    }

    /// Store a finished request's outcome unless a newer request started since.
    ///
    /// Returns whether the outcome was applied.
    pub fn finish(&mut self, ticket: GenerationTicket, outcome: FetchOutcome<T>) -> bool {
        if !self.generation.is_current(ticket) {
            log::debug!(
                "Discarding stale response for '{}' (generation {})",
                self.storage_key,
                self.generation.current()
            );
            return false;
        }
        self.loading = false;
        self.outcome = outcome;
        true
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePanelView {
    pub title: &'static str,
    pub date_label: String,
    pub prev_label: &'static str,
    pub next_label: &'static str,
    pub loading: bool,
    /// Placeholder text shown instead of rows
    pub message: Option<&'static str>,
    /// `"N교시: subject"`
    pub rows: Vec<String>,
}

impl SchedulePanelView {
    pub fn build(panel: &DayPanel<ScheduleEntry>, has_profile: bool) -> Self {
        let message = panel_message(
            has_profile,
            panel,
            messages::SCHEDULE_LOADING,
            messages::SCHEDULE_NO_DATA,
        );
        let rows = if message.is_none() {
            panel
                .outcome()
                .entries
                .iter()
                .map(|entry| format!("{}교시: {}", entry.period, entry.content))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            title: messages::SCHEDULE_TITLE,
            date_label: display_date(panel.date()),
            prev_label: messages::PREV_DAY,
            next_label: messages::NEXT_DAY,
            loading: panel.is_loading(),
            message,
            rows,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealView {
    pub slot: String,
    pub dishes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuPanelView {
    pub title: &'static str,
    pub date_label: String,
    pub prev_label: &'static str,
    pub next_label: &'static str,
    pub loading: bool,
    pub message: Option<&'static str>,
    pub meals: Vec<MealView>,
}

impl MenuPanelView {
    pub fn build(panel: &DayPanel<MenuEntry>, has_profile: bool) -> Self {
        let message = panel_message(
            has_profile,
            panel,
            messages::MENU_LOADING,
            messages::MENU_NO_DATA,
        );
        let meals = if message.is_none() {
            panel
                .outcome()
                .entries
                .iter()
                .map(|entry| MealView {
                    slot: entry.meal_slot_name.clone(),
                    dishes: entry.dishes().map(str::to_string).collect(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            title: messages::MENU_TITLE,
            date_label: display_date_with_weekday(panel.date()),
            prev_label: messages::PREV_DAY,
            next_label: messages::NEXT_DAY,
            loading: panel.is_loading(),
            message,
            meals,
        }
    }
}

fn panel_message<T>(
    has_profile: bool,
    panel: &DayPanel<T>,
    loading: &'static str,
    no_data: &'static str,
) -> Option<&'static str> {
    if !has_profile {
        Some(messages::PROFILE_REQUIRED)
    } else if panel.is_loading() {
        Some(loading)
    } else if !panel.outcome().found {
        Some(no_data)
    } else {
        None
    }
}

/// Route search box, its result and the suggestion drop-down
#[derive(Debug, Default)]
pub struct RoutePanel {
    input: String,
    suggestion_open: bool,
    loading: bool,
    error: Option<String>,
    outcome: Option<RouteOutcome>,
    generation: RequestGeneration,
}

impl RoutePanel {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&RouteResult> {
        self.outcome.as_ref().map(|outcome| &outcome.result)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Typing replaces the input and closes the suggestion
    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        if !text.is_empty() {
            self.suggestion_open = false;
        }
    }

    /// The suggestion opens on focus when a home address is saved
    pub fn focus(&mut self, home_address: Option<&str>) {
        self.suggestion_open = home_address.is_some();
    }

    pub fn blur(&mut self) {
        self.suggestion_open = false;
    }

    pub fn pick_suggestion(&mut self, home_address: &str) {
        self.input = home_address.to_string();
        self.suggestion_open = false;
    }

    pub fn can_search(&self, map_loaded: bool) -> bool {
        !self.loading && !self.input.trim().is_empty() && map_loaded
    }

    /// Start a search: drop the previous result and error before anything else
    pub fn begin(&mut self) -> GenerationTicket {
        self.loading = true;
        self.error = None;
        self.outcome = None;
        self.suggestion_open = false;
        self.generation.advance()
    }

    pub fn finish(
        &mut self,
        ticket: GenerationTicket,
        result: Result<RouteOutcome, RouteError>,
    ) -> bool {
        if !self.generation.is_current(ticket) {
            log::debug!("Discarding stale route result");
            return false;
        }
        self.loading = false;
        match result {
            Ok(outcome) => {
                self.error = None;
                self.outcome = Some(outcome);
            }
            Err(e) => {
                if e.is_validation() {
                    log::debug!("Route search rejected: {e}");
                } else {
                    log::warn!("Route search failed: {e}");
                }
                self.error = Some(e.user_message());
                self.outcome = None;
            }
        }
        true
    }

    /// What the map should draw for the current result
    pub fn scene(&self) -> Scene {
        match self.result() {
            Some(result) => Scene {
                start: Some(result.start),
                end: Some(result.end),
                path: result.path.clone(),
            },
            None => Scene::default(),
        }
    }

    pub fn view(&self, home_address: Option<&str>, map_loaded: bool) -> RoutePanelView {
        let warning = self
            .outcome
            .as_ref()
            .and_then(|outcome| outcome.warning)
            .map(|warning| warning.user_message());

        RoutePanelView {
            title: messages::ROUTE_TITLE,
            input: self.input.clone(),
            placeholder: messages::ROUTE_INPUT_PLACEHOLDER,
            button_label: if self.loading {
                messages::ROUTE_BUTTON_BUSY
            } else {
                messages::ROUTE_BUTTON
            },
            button_enabled: self.can_search(map_loaded),
            input_enabled: !self.loading,
            suggestion: home_address
                .filter(|_| self.suggestion_open)
                .map(messages::home_suggestion),
            error: self.error.clone().or_else(|| warning.map(str::to_string)),
            duration: self
                .result()
                .map(|r| messages::route_duration(r.duration_minutes)),
            distance: self.result().map(|r| messages::route_distance(r.distance_km)),
            map_message: (!map_loaded).then_some(messages::MAP_LOADING),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutePanelView {
    pub title: &'static str,
    pub input: String,
    pub placeholder: &'static str,
    pub button_label: &'static str,
    pub button_enabled: bool,
    pub input_enabled: bool,
    pub suggestion: Option<String>,
    pub error: Option<String>,
    pub duration: Option<String>,
    pub distance: Option<String>,
    pub map_message: Option<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use school_dash_data::{MemoryStore, RouteWarning};
    use school_dash_shared::Coord;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn route_outcome(path: Vec<Coord>) -> RouteOutcome {
        RouteOutcome {
            warning: path.is_empty().then_some(RouteWarning::GeometryUnavailable),
            result: RouteResult {
                start: Coord::new(128.59, 38.20),
                end: Coord::new(128.583675, 38.225625),
                path,
                duration_minutes: 15,
                distance_km: 3.4,
            },
        }
    }

    #[test]
    fn test_day_panel_navigation_persists() {
        let store = MemoryStore::new();
        let mut panel: DayPanel<ScheduleEntry> =
            DayPanel::load(&store, "timetableCurrentDate", ymd(2025, 3, 4));

        assert_eq!(panel.next_day(&store), ymd(2025, 3, 5));
        let reloaded: DayPanel<ScheduleEntry> =
            DayPanel::load(&store, "timetableCurrentDate", ymd(2030, 1, 1));
        assert_eq!(reloaded.date(), ymd(2025, 3, 5));

        assert_eq!(panel.previous_day(&store), ymd(2025, 3, 4));
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        let store = MemoryStore::new();
        let mut panel: DayPanel<ScheduleEntry> =
            DayPanel::load(&store, "timetableCurrentDate", ymd(2025, 3, 4));

        let first = panel.begin();
        let second = panel.begin();

        let late = FetchOutcome::found(vec![ScheduleEntry {
            period: "1".to_string(),
            content: "stale".to_string(),
        }]);
        assert!(!panel.finish(first, late));
        assert!(panel.is_loading());

        let fresh = FetchOutcome::found(vec![ScheduleEntry {
            period: "1".to_string(),
            content: "국어".to_string(),
        }]);
        assert!(panel.finish(second, fresh));

        let view = SchedulePanelView::build(&panel, true);
        assert_eq!(view.rows, vec!["1교시: 국어".to_string()]);
        assert_eq!(view.message, None);
        assert_eq!(view.date_label, "2025년 3월 4일");
    }

    #[test]
    fn test_panel_messages() {
        let store = MemoryStore::new();
        let mut panel: DayPanel<MenuEntry> =
            DayPanel::load(&store, "mealCurrentDate", ymd(2025, 3, 4));

        let view = MenuPanelView::build(&panel, false);
        assert_eq!(view.message, Some(messages::PROFILE_REQUIRED));

        let ticket = panel.begin();
        assert_eq!(
            MenuPanelView::build(&panel, true).message,
            Some(messages::MENU_LOADING)
        );

        panel.finish(ticket, FetchOutcome::not_found());
        assert_eq!(
            MenuPanelView::build(&panel, true).message,
            Some(messages::MENU_NO_DATA)
        );
        assert_eq!(
            MenuPanelView::build(&panel, true).date_label,
            "2025년 3월 4일 (화)"
        );
    }

    #[test]
    fn test_menu_view_splits_dishes() {
        let store = MemoryStore::new();
        let mut panel: DayPanel<MenuEntry> =
            DayPanel::load(&store, "mealCurrentDate", ymd(2025, 3, 4));
        let ticket = panel.begin();
        panel.finish(
            ticket,
            FetchOutcome::found(vec![MenuEntry {
                meal_slot_name: "중식".to_string(),
                dish_names: "현미밥\n깍두기".to_string(),
            }]),
        );

        let view = MenuPanelView::build(&panel, true);
        assert_eq!(view.meals[0].slot, "중식");
        assert_eq!(view.meals[0].dishes, vec!["현미밥", "깍두기"]);
    }

    #[test]
    fn test_route_button_rules() {
        let mut panel = RoutePanel::new("");
        assert!(!panel.can_search(true));

        panel.set_input("속초시 중앙로 183");
        assert!(!panel.can_search(false));
        assert!(panel.can_search(true));

        let _ticket = panel.begin();
        assert!(!panel.can_search(true));
        let view = panel.view(None, true);
        assert_eq!(view.button_label, messages::ROUTE_BUTTON_BUSY);
        assert!(!view.input_enabled);
    }

    #[test]
    fn test_failed_search_clears_previous_result() {
        let mut panel = RoutePanel::new("속초시 중앙로 183");
        let ticket = panel.begin();
        panel.finish(ticket, Ok(route_outcome(vec![Coord::new(128.59, 38.21)])));
        assert!(panel.result().is_some());
        assert_eq!(panel.scene().path.len(), 1);

        let ticket = panel.begin();
        assert!(panel.result().is_none());
        panel.finish(ticket, Err(RouteError::RouteNotFound));

        assert!(panel.result().is_none());
        assert_eq!(panel.error(), Some(messages::ROUTE_NOT_FOUND));
        assert_eq!(panel.scene(), Scene::default());

        let view = panel.view(None, true);
        assert_eq!(view.duration, None);
        assert_eq!(view.distance, None);
    }

    #[test]
    fn test_result_lines_and_geometry_warning() {
        let mut panel = RoutePanel::new("속초시 중앙로 183");
        let ticket = panel.begin();
        panel.finish(ticket, Ok(route_outcome(Vec::new())));

        let view = panel.view(None, true);
        assert_eq!(view.duration.as_deref(), Some("예상 소요 시간: 약 15분"));
        assert_eq!(view.distance.as_deref(), Some("총 거리: 약 3.4km"));
        assert_eq!(view.error.as_deref(), Some(messages::ROUTE_GEOMETRY_MISSING));
        assert_eq!(view.map_message, None);
    }

    #[test]
    fn test_home_suggestion() {
        let home = Some("속초시 중앙로 183");
        let mut panel = RoutePanel::new("");

        panel.focus(None);
        assert_eq!(panel.view(None, true).suggestion, None);

        panel.focus(home);
        assert_eq!(
            panel.view(home, true).suggestion.as_deref(),
            Some("내 집: 속초시 중앙로 183")
        );

        panel.set_input("속");
        assert_eq!(panel.view(home, true).suggestion, None);

        panel.focus(home);
        panel.pick_suggestion("속초시 중앙로 183");
        assert_eq!(panel.input(), "속초시 중앙로 183");
        assert_eq!(panel.view(home, true).suggestion, None);
    }
}

//! Map widget lifecycle: script injection, one-time initialization, and the
//! clear-and-redraw of route overlays.
//!
//! `MapView` never talks to the SDK directly. The browser build supplies a
//! [`MapWidget`] backed by the Kakao maps SDK and a [`ScriptHost`] backed by
//! the DOM; tests supply recording fakes.

use school_dash_config::{MapConfig, PolylineStyle};
use school_dash_shared::{Coord, DashResult};

/// Rectangle spanning a set of coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: Coord,
    pub north_east: Coord,
}

impl Bounds {
    /// `None` for an empty iterator
    pub fn covering<'a>(points: impl IntoIterator<Item = &'a Coord>) -> Option<Self> {
        points.into_iter().fold(None, |bounds, point| {
            Some(match bounds {
                None => Bounds {
                    south_west: *point,
                    north_east: *point,
                },
                Some(b) => b.extend(*point),
            })
        })
    }

    pub fn extend(self, point: Coord) -> Self {
        Bounds {
            south_west: Coord::new(self.south_west.x.min(point.x), self.south_west.y.min(point.y)),
            north_east: Coord::new(self.north_east.x.max(point.x), self.north_east.y.max(point.y)),
        }
    }

    pub fn contains(&self, point: Coord) -> bool {
        (self.south_west.x..=self.north_east.x).contains(&point.x)
            && (self.south_west.y..=self.north_east.y).contains(&point.y)
    }
}

/// Drawing primitives of a constructed map widget.
///
/// Overlay handles are owned values; passing one back to `remove_*` releases it.
pub trait MapWidget {
    type Marker;
    type Polyline;

    fn add_marker(&self, position: Coord, title: &str) -> Self::Marker;
    fn remove_marker(&self, marker: Self::Marker);
    fn add_polyline(&self, path: &[Coord], style: &PolylineStyle) -> Self::Polyline;
    fn remove_polyline(&self, polyline: Self::Polyline);
    fn fit_bounds(&self, bounds: &Bounds);
    fn reset_view(&self, center: Coord, level: u8);
}

/// Page-level access to the SDK `<script>` element
pub trait ScriptHost {
    /// A script element with this id is already in the document
    fn script_present(&self, id: &str) -> bool;

    /// The SDK global is available
    fn sdk_ready(&self) -> bool;

    /// Append the SDK script element
    fn inject(&self, id: &str, src: &str) -> DashResult<()>;

    /// Wait for an already present script element to finish loading
    fn watch(&self, id: &str) -> DashResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Unloaded,
    ScriptLoading,
    Initialized,
    Rendering,
}

/// What the caller should do after [`MapView::begin_loading`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep {
    /// Loading was already started by an earlier call
    AlreadyStarted,
    /// The SDK is usable now; construct the widget
    SdkReady,
    /// A script load is in flight; construct the widget from its load callback
    AwaitingScript,
}

/// Route geometry the map should display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub start: Option<Coord>,
    pub end: Option<Coord>,
    pub path: Vec<Coord>,
}

struct Overlays<W: MapWidget> {
    markers: Vec<W::Marker>,
    line: Option<W::Polyline>,
}

impl<W: MapWidget> Default for Overlays<W> {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            line: None,
        }
    }
}

pub struct MapView<W: MapWidget> {
    config: MapConfig,
    script_src: String,
    state: MapState,
    widget: Option<W>,
    overlays: Overlays<W>,
    scene: Scene,
}

impl<W: MapWidget> MapView<W> {
    pub fn new(config: MapConfig, script_src: impl Into<String>) -> Self {
        Self {
            config,
            script_src: script_src.into(),
            state: MapState::Unloaded,
            widget: None,
            overlays: Overlays::default(),
            scene: Scene::default(),
        }
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, MapState::Initialized | MapState::Rendering)
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Inject the SDK script at most once.
    ///
    /// A script element that is already present is never injected again;
    /// the SDK global decides whether the widget can be built right away.
    pub fn begin_loading<H: ScriptHost>(&mut self, host: &H) -> LoadStep {
        if self.state != MapState::Unloaded {
            return LoadStep::AlreadyStarted;
        }
        self.state = MapState::ScriptLoading;

        let script_id = &self.config.script_id;
        if host.script_present(script_id) {
            if host.sdk_ready() {
                log::debug!("Map SDK already available");
                return LoadStep::SdkReady;
            }
            if let Err(e) = host.watch(script_id) {
                log::error!("Cannot watch map SDK script: {e}");
            }
            return LoadStep::AwaitingScript;
        }

        log::info!("Injecting map SDK script '{script_id}'");
        if let Err(e) = host.inject(script_id, &self.script_src) {
            self.on_script_error(&e.to_string());
        }
        LoadStep::AwaitingScript
    }

    /// The script failed to load; the view stays in `ScriptLoading`
    pub fn on_script_error(&mut self, detail: &str) {
        log::error!("Map SDK script failed to load: {detail}");
    }

    /// Adopt the constructed widget.
    ///
    /// Returns `true` exactly once, when the map-loaded signal should fire.
    /// Later calls drop the extra widget.
    pub fn on_sdk_ready(&mut self, widget: W) -> bool {
        if self.is_loaded() {
            log::warn!("Map already initialized, ignoring second widget");
            return false;
        }

        widget.reset_view(self.config.default_center.into(), self.config.default_level);
        self.widget = Some(widget);
        self.state = MapState::Initialized;
        log::info!("Map initialized");

        if self.scene != Scene::default() {
            self.redraw();
        }
        true
    }

    /// Replace what the map shows; drawn immediately once initialized
    pub fn render(&mut self, scene: Scene) {
        self.scene = scene;
        if self.is_loaded() {
            self.redraw();
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn marker_count(&self) -> usize {
        self.overlays.markers.len()
    }

    pub fn has_polyline(&self) -> bool {
        self.overlays.line.is_some()
    }

    fn redraw(&mut self) {
        let Some(widget) = self.widget.as_ref() else {
            return;
        };
        self.state = MapState::Rendering;

        let previous = std::mem::take(&mut self.overlays);
        for marker in previous.markers {
            widget.remove_marker(marker);
        }
        if let Some(line) = previous.line {
            widget.remove_polyline(line);
        }

        let (Some(start), Some(end)) = (self.scene.start, self.scene.end) else {
            widget.reset_view(self.config.default_center.into(), self.config.default_level);
            return;
        };

        self.overlays.markers = vec![
            widget.add_marker(start, &self.config.start_marker_title),
            widget.add_marker(end, &self.config.end_marker_title),
        ];

        if !self.scene.path.is_empty() {
            self.overlays.line = Some(widget.add_polyline(&self.scene.path, &self.config.polyline));
        }

        let drawn = [start, end];
        if let Some(bounds) = Bounds::covering(drawn.iter().chain(&self.scene.path)) {
            widget.fit_bounds(&bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Reset(Coord, u8),
        Fit(Bounds),
        Polyline(usize),
    }

    #[derive(Default)]
    struct Recorder {
        next_id: Cell<u32>,
        live_markers: RefCell<HashSet<u32>>,
        live_lines: RefCell<HashSet<u32>>,
        calls: RefCell<Vec<Call>>,
    }

    impl Recorder {
        fn next(&self) -> u32 {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            id
        }
    }

    #[derive(Clone, Default)]
    struct FakeWidget(Rc<Recorder>);

    impl MapWidget for FakeWidget {
        type Marker = u32;
        type Polyline = u32;

        fn add_marker(&self, _position: Coord, _title: &str) -> u32 {
            let id = self.0.next();
            self.0.live_markers.borrow_mut().insert(id);
            id
        }

        fn remove_marker(&self, marker: u32) {
            assert!(self.0.live_markers.borrow_mut().remove(&marker));
        }

        fn add_polyline(&self, path: &[Coord], _style: &PolylineStyle) -> u32 {
            let id = self.0.next();
            self.0.live_lines.borrow_mut().insert(id);
            self.0.calls.borrow_mut().push(Call::Polyline(path.len()));
            id
        }

        fn remove_polyline(&self, polyline: u32) {
            assert!(self.0.live_lines.borrow_mut().remove(&polyline));
        }

        fn fit_bounds(&self, bounds: &Bounds) {
            self.0.calls.borrow_mut().push(Call::Fit(*bounds));
        }

        fn reset_view(&self, center: Coord, level: u8) {
            self.0.calls.borrow_mut().push(Call::Reset(center, level));
        }
    }

    #[derive(Default)]
    struct FakeHost {
        present: bool,
        ready: bool,
        injected: Cell<usize>,
        watched: Cell<usize>,
    }

    impl ScriptHost for FakeHost {
        fn script_present(&self, _id: &str) -> bool {
            self.present
        }

        fn sdk_ready(&self) -> bool {
            self.ready
        }

        fn inject(&self, _id: &str, _src: &str) -> DashResult<()> {
            self.injected.set(self.injected.get() + 1);
            Ok(())
        }

        fn watch(&self, _id: &str) -> DashResult<()> {
            self.watched.set(self.watched.get() + 1);
            Ok(())
        }
    }

    fn scene(path_len: usize) -> Scene {
        Scene {
            start: Some(Coord::new(128.59, 38.20)),
            end: Some(Coord::new(128.583675, 38.225625)),
            path: (0..path_len)
                .map(|i| Coord::new(128.58 + i as f64 * 0.001, 38.21 + i as f64 * 0.001))
                .collect(),
        }
    }

    fn loaded_view() -> (MapView<FakeWidget>, Rc<Recorder>) {
        let widget = FakeWidget::default();
        let recorder = Rc::clone(&widget.0);
        let mut view = MapView::new(MapConfig::default(), "//sdk.js");
        assert!(view.on_sdk_ready(widget));
        (view, recorder)
    }

    #[test]
    fn test_script_injected_once() {
        let host = FakeHost::default();
        let mut view: MapView<FakeWidget> = MapView::new(MapConfig::default(), "//sdk.js");

        assert_eq!(view.begin_loading(&host), LoadStep::AwaitingScript);
        assert_eq!(view.begin_loading(&host), LoadStep::AlreadyStarted);
        assert_eq!(host.injected.get(), 1);
        assert_eq!(view.state(), MapState::ScriptLoading);
    }

    #[test]
    fn test_existing_script_is_not_injected_again() {
        let ready = FakeHost {
            present: true,
            ready: true,
            ..Default::default()
        };
        let mut view: MapView<FakeWidget> = MapView::new(MapConfig::default(), "//sdk.js");
        assert_eq!(view.begin_loading(&ready), LoadStep::SdkReady);
        assert_eq!(ready.injected.get(), 0);

        let loading = FakeHost {
            present: true,
            ..Default::default()
        };
        let mut view: MapView<FakeWidget> = MapView::new(MapConfig::default(), "//sdk.js");
        assert_eq!(view.begin_loading(&loading), LoadStep::AwaitingScript);
        assert_eq!(loading.injected.get(), 0);
        assert_eq!(loading.watched.get(), 1);
    }

    #[test]
    fn test_script_error_keeps_loading_state() {
        let host = FakeHost::default();
        let mut view: MapView<FakeWidget> = MapView::new(MapConfig::default(), "//sdk.js");
        view.begin_loading(&host);
        view.on_script_error("net::ERR_BLOCKED_BY_CLIENT");
        assert_eq!(view.state(), MapState::ScriptLoading);
        assert!(!view.is_loaded());
    }

    #[test]
    fn test_loaded_signal_fires_once() {
        let (mut view, recorder) = loaded_view();
        assert_eq!(view.state(), MapState::Initialized);
        assert_eq!(
            recorder.calls.borrow()[0],
            Call::Reset(Coord::from_lat_lng(38.207128, 128.591905), 3)
        );
        assert!(!view.on_sdk_ready(FakeWidget::default()));
    }

    #[test]
    fn test_repeated_renders_keep_two_markers() {
        let (mut view, recorder) = loaded_view();

        for len in [5, 0, 12, 3] {
            view.render(scene(len));
            assert_eq!(view.marker_count(), 2);
            assert_eq!(recorder.live_markers.borrow().len(), 2);
            assert_eq!(view.has_polyline(), len > 0);
            assert_eq!(recorder.live_lines.borrow().len(), usize::from(len > 0));
        }
        assert_eq!(view.state(), MapState::Rendering);
    }

    #[test]
    fn test_bounds_cover_markers_and_path() {
        let (mut view, recorder) = loaded_view();
        let scene = scene(4);
        view.render(scene.clone());

        let calls = recorder.calls.borrow();
        let Some(Call::Fit(bounds)) = calls.last() else {
            panic!("expected fit_bounds, got {calls:?}");
        };
        assert!(bounds.contains(scene.start.unwrap()));
        assert!(bounds.contains(scene.end.unwrap()));
        assert!(scene.path.iter().all(|p| bounds.contains(*p)));
        assert!(calls.contains(&Call::Polyline(4)));
    }

    #[test]
    fn test_missing_coordinate_resets_view() {
        let (mut view, recorder) = loaded_view();
        view.render(scene(3));

        view.render(Scene {
            start: None,
            ..scene(3)
        });
        assert_eq!(view.marker_count(), 0);
        assert!(!view.has_polyline());
        assert!(recorder.live_markers.borrow().is_empty());
        assert!(recorder.live_lines.borrow().is_empty());
        assert_eq!(
            recorder.calls.borrow().last(),
            Some(&Call::Reset(Coord::from_lat_lng(38.207128, 128.591905), 3))
        );
    }

    #[test]
    fn test_scene_before_load_is_drawn_on_init() {
        let mut view: MapView<FakeWidget> = MapView::new(MapConfig::default(), "//sdk.js");
        view.render(scene(2));
        assert_eq!(view.marker_count(), 0);

        let widget = FakeWidget::default();
        view.on_sdk_ready(widget);
        assert_eq!(view.marker_count(), 2);
        assert!(view.has_polyline());
    }

    #[test]
    fn test_bounds_covering() {
        assert_eq!(Bounds::covering(&[]), None);
        let points = [Coord::new(1.0, 5.0), Coord::new(3.0, 2.0)];
        let bounds = Bounds::covering(&points).unwrap();
        assert_eq!(bounds.south_west, Coord::new(1.0, 2.0));
        assert_eq!(bounds.north_east, Coord::new(3.0, 5.0));
    }
}

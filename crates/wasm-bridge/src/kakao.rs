//! Kakao maps SDK bindings and the DOM script host.

use std::rc::Rc;

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlScriptElement};

use school_dash_config::PolylineStyle;
use school_dash_shared::{Coord, DashError, DashResult};

use crate::map_view::{Bounds, MapWidget, ScriptHost};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["kakao", "maps"], js_name = LatLng)]
    pub type KakaoLatLng;

    #[wasm_bindgen(constructor, js_namespace = ["kakao", "maps"], js_class = "LatLng")]
    fn new(latitude: f64, longitude: f64) -> KakaoLatLng;

    #[wasm_bindgen(js_namespace = ["kakao", "maps"], js_name = LatLngBounds)]
    pub type KakaoLatLngBounds;

    #[wasm_bindgen(constructor, js_namespace = ["kakao", "maps"], js_class = "LatLngBounds")]
    fn new() -> KakaoLatLngBounds;

    #[wasm_bindgen(method, js_class = "LatLngBounds")]
    fn extend(this: &KakaoLatLngBounds, point: &KakaoLatLng);

    #[wasm_bindgen(js_namespace = ["kakao", "maps"], js_name = Map)]
    pub type KakaoMap;

    #[wasm_bindgen(constructor, js_namespace = ["kakao", "maps"], js_class = "Map")]
    fn new(container: &Element, options: &JsValue) -> KakaoMap;

    #[wasm_bindgen(method, js_class = "Map", js_name = setCenter)]
    fn set_center(this: &KakaoMap, center: &KakaoLatLng);

    #[wasm_bindgen(method, js_class = "Map", js_name = setLevel)]
    fn set_level(this: &KakaoMap, level: u8);

    #[wasm_bindgen(method, js_class = "Map", js_name = setBounds)]
    fn set_bounds(this: &KakaoMap, bounds: &KakaoLatLngBounds);

    #[wasm_bindgen(js_namespace = ["kakao", "maps"], js_name = Marker)]
    pub type KakaoMarker;

    #[wasm_bindgen(constructor, js_namespace = ["kakao", "maps"], js_class = "Marker")]
    fn new(options: &JsValue) -> KakaoMarker;

    #[wasm_bindgen(method, js_class = "Marker", js_name = setMap)]
    fn set_map(this: &KakaoMarker, map: Option<&KakaoMap>);

    #[wasm_bindgen(js_namespace = ["kakao", "maps"], js_name = Polyline)]
    pub type KakaoPolyline;

    #[wasm_bindgen(constructor, js_namespace = ["kakao", "maps"], js_class = "Polyline")]
    fn new(options: &JsValue) -> KakaoPolyline;

    #[wasm_bindgen(method, js_class = "Polyline", js_name = setMap)]
    fn set_map(this: &KakaoPolyline, map: Option<&KakaoMap>);

    /// `kakao.maps.load`: runs the callback once the SDK modules are ready
    #[wasm_bindgen(js_namespace = ["kakao", "maps"], js_name = load)]
    fn maps_load(callback: &js_sys::Function);
}

fn lat_lng(coord: Coord) -> KakaoLatLng {
    KakaoLatLng::new(coord.latitude(), coord.longitude())
}

fn options(entries: &[(&str, JsValue)]) -> DashResult<JsValue> {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &JsValue::from_str(key), value).map_err(js_error)?;
    }
    Ok(object.into())
}

fn js_error(err: JsValue) -> DashError {
    DashError::JsInterop {
        message: format!("{err:?}"),
    }
}

/// Run `on_ready` once `kakao.maps` has finished loading its modules
pub fn load_sdk(on_ready: impl FnOnce() + 'static) {
    let callback = Closure::once_into_js(on_ready);
    maps_load(callback.unchecked_ref());
}

/// A constructed Kakao map bound to one container element
pub struct KakaoMapWidget {
    map: KakaoMap,
}

impl KakaoMapWidget {
    pub fn create(container: &Element, center: Coord, level: u8) -> DashResult<Self> {
        let map_options = options(&[
            ("center", lat_lng(center).into()),
            ("level", JsValue::from(level)),
        ])?;
        Ok(Self {
            map: KakaoMap::new(container, &map_options),
        })
    }
}

impl MapWidget for KakaoMapWidget {
    type Marker = KakaoMarker;
    type Polyline = KakaoPolyline;

    fn add_marker(&self, position: Coord, title: &str) -> KakaoMarker {
        let marker_options = options(&[
            ("position", lat_lng(position).into()),
            ("title", JsValue::from_str(title)),
        ]);
        let marker = match marker_options {
            Ok(opts) => KakaoMarker::new(&opts),
            Err(e) => {
                log::error!("Marker options rejected: {e}");
                KakaoMarker::new(&Object::new().into())
            }
        };
        marker.set_map(Some(&self.map));
        marker
    }

    fn remove_marker(&self, marker: KakaoMarker) {
        marker.set_map(None);
    }

    fn add_polyline(&self, path: &[Coord], style: &PolylineStyle) -> KakaoPolyline {
        let points: Array = path.iter().map(|coord| JsValue::from(lat_lng(*coord))).collect();
        let line_options = options(&[
            ("path", points.into()),
            ("strokeWeight", JsValue::from(style.stroke_weight)),
            ("strokeColor", JsValue::from_str(&style.stroke_color)),
            ("strokeOpacity", JsValue::from(style.stroke_opacity)),
            ("strokeStyle", JsValue::from_str(&style.stroke_style)),
        ]);
        let polyline = match line_options {
            Ok(opts) => KakaoPolyline::new(&opts),
            Err(e) => {
                log::error!("Polyline options rejected: {e}");
                KakaoPolyline::new(&Object::new().into())
            }
        };
        polyline.set_map(Some(&self.map));
        polyline
    }

    fn remove_polyline(&self, polyline: KakaoPolyline) {
        polyline.set_map(None);
    }

    fn fit_bounds(&self, bounds: &Bounds) {
        let kakao_bounds = KakaoLatLngBounds::new();
        kakao_bounds.extend(&lat_lng(bounds.south_west));
        kakao_bounds.extend(&lat_lng(bounds.north_east));
        self.map.set_bounds(&kakao_bounds);
    }

    fn reset_view(&self, center: Coord, level: u8) {
        self.map.set_center(&lat_lng(center));
        self.map.set_level(level);
    }
}

/// Injects and watches the SDK `<script>` element
pub struct DomScriptHost {
    document: Document,
    on_load: Rc<dyn Fn()>,
    on_error: Rc<dyn Fn(String)>,
}

impl DomScriptHost {
    pub fn new(
        document: Document,
        on_load: impl Fn() + 'static,
        on_error: impl Fn(String) + 'static,
    ) -> Self {
        Self {
            document,
            on_load: Rc::new(on_load),
            on_error: Rc::new(on_error),
        }
    }

    fn attach_listeners(&self, script: &Element) -> DashResult<()> {
        let on_load = Rc::clone(&self.on_load);
        let load = Closure::<dyn FnMut()>::new(move || on_load());
        script
            .add_event_listener_with_callback("load", load.as_ref().unchecked_ref())
            .map_err(js_error)?;
        load.forget();

        let on_error = Rc::clone(&self.on_error);
        let error = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            on_error(event.type_());
        });
        script
            .add_event_listener_with_callback("error", error.as_ref().unchecked_ref())
            .map_err(js_error)?;
        error.forget();

        Ok(())
    }
}

impl ScriptHost for DomScriptHost {
    fn script_present(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn sdk_ready(&self) -> bool {
        let window = match web_sys::window() {
            Some(window) => window,
            None => return false,
        };
        Reflect::get(&window, &JsValue::from_str("kakao"))
            .ok()
            .filter(|kakao| kakao.is_object())
            .and_then(|kakao| Reflect::get(&kakao, &JsValue::from_str("maps")).ok())
            .is_some_and(|maps| maps.is_object())
    }

    fn inject(&self, id: &str, src: &str) -> DashResult<()> {
        let script: HtmlScriptElement = self
            .document
            .create_element("script")
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| DashError::JsInterop {
                message: "created element is not a script".to_string(),
            })?;
        script.set_id(id);
        script.set_type("text/javascript");
        script.set_async(true);
        script.set_src(src);
        self.attach_listeners(&script)?;

        let head = self.document.head().ok_or_else(|| DashError::JsInterop {
            message: "Document has no <head>".to_string(),
        })?;
        head.append_child(&script).map_err(js_error)?;
        Ok(())
    }

    fn watch(&self, id: &str) -> DashResult<()> {
        let script = self
            .document
            .get_element_by_id(id)
            .ok_or_else(|| DashError::NotFound {
                resource: format!("script #{id}"),
            })?;
        self.attach_listeners(&script)
    }
}

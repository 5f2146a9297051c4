//! Configuration system for School Dash
//! Manages API credentials, service endpoints, and map defaults

use serde::{Deserialize, Serialize};
use thiserror::Error;

use school_dash_shared::store_state::{
    HOME_INPUT_KEY, MENU_DATE_KEY, PROFILE_KEY, SCHEDULE_DATE_KEY,
};
use school_dash_shared::{Coord, SchoolCategory};

pub mod parser;
pub mod validation;

pub use parser::{ConfigFormat, ConfigParser, TemplateExpander};
pub use validation::{ConfigValidator, ValidationReport};

/// Environment variable prefix for overrides (`SCHOOL_DASH__NEIS__API_KEY`)
pub const ENV_PREFIX: &str = "SCHOOL_DASH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[cfg(not(target_arch = "wasm32"))]
    #[error("Config source error: {0}")]
    Source(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashConfig {
    pub neis: NeisConfig,
    pub kakao: KakaoConfig,
    pub map: MapConfig,
    pub storage: StorageKeys,
}

/// NEIS open API (timetables and meals)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NeisConfig {
    pub api_key: String,
    pub base_url: String,
    pub high_school_timetable: String,
    pub middle_school_timetable: String,
    pub elementary_school_timetable: String,
    pub meal_service: String,
}

impl Default for NeisConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://open.neis.go.kr/hub".to_string(),
            high_school_timetable: "hisTimetable".to_string(),
            middle_school_timetable: "misTimetable".to_string(),
            elementary_school_timetable: "elsTimetable".to_string(),
            meal_service: "mealServiceDietInfo".to_string(),
        }
    }
}

impl NeisConfig {
    /// Endpoint name for a school level; it is also the response's root key
    pub fn timetable_endpoint(&self, category: SchoolCategory) -> &str {
        match category {
            SchoolCategory::High => &self.high_school_timetable,
            SchoolCategory::Middle => &self.middle_school_timetable,
            SchoolCategory::Elementary => &self.elementary_school_timetable,
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}

/// Kakao local search, mobility directions and the maps JS SDK
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KakaoConfig {
    pub rest_api_key: String,
    pub javascript_key: String,
    pub local_search_url: String,
    pub directions_url: String,
    pub sdk_url: String,
    pub route_priority: String,
}

impl Default for KakaoConfig {
    fn default() -> Self {
        Self {
            rest_api_key: String::new(),
            javascript_key: String::new(),
            local_search_url: "https://dapi.kakao.com/v2/local/search/address.json".to_string(),
            directions_url: "https://apis-navi.kakaomobility.com/v1/directions".to_string(),
            sdk_url: "//dapi.kakao.com/v2/maps/sdk.js".to_string(),
            route_priority: "RECOMMEND".to_string(),
        }
    }
}

impl KakaoConfig {
    /// `Authorization` header value for the REST APIs
    pub fn authorization(&self) -> String {
        format!("KakaoAK {}", self.rest_api_key)
    }

    /// SDK script URL; `autoload=false` so initialization waits for `kakao.maps.load`
    pub fn sdk_script_url(&self) -> String {
        format!(
            "{}?appkey={}&libraries=services,clusterer,drawing&autoload=false",
            self.sdk_url, self.javascript_key
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LatLng> for Coord {
    fn from(value: LatLng) -> Self {
        Coord::from_lat_lng(value.latitude, value.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolylineStyle {
    pub stroke_weight: u32,
    pub stroke_color: String,
    pub stroke_opacity: f32,
    pub stroke_style: String,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            stroke_weight: 5,
            stroke_color: "#FF0000".to_string(),
            stroke_opacity: 0.7,
            stroke_style: "solid".to_string(),
        }
    }
}

/// Map widget placement and defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub container_id: String,
    pub script_id: String,
    pub default_level: u8,
    pub start_marker_title: String,
    pub end_marker_title: String,
    pub default_center: LatLng,
    pub polyline: PolylineStyle,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container_id: "route-map".to_string(),
            script_id: "kakao-map-sdk".to_string(),
            default_level: 3,
            start_marker_title: "출발지".to_string(),
            end_marker_title: "도착지".to_string(),
            default_center: LatLng {
                latitude: 38.207128,
                longitude: 128.591905,
            },
            polyline: PolylineStyle::default(),
        }
    }
}

/// localStorage keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageKeys {
    pub profile: String,
    pub schedule_date: String,
    pub menu_date: String,
    pub home_input: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            profile: PROFILE_KEY.to_string(),
            schedule_date: SCHEDULE_DATE_KEY.to_string(),
            menu_date: MENU_DATE_KEY.to_string(),
            home_input: HOME_INPUT_KEY.to_string(),
        }
    }
}

impl DashConfig {
    /// Collect configuration errors and warnings without failing
    pub fn validate(&self) -> ValidationReport {
        ConfigValidator::validate(self)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DashConfig {
    /// Defaults, then the file at `path`, then `SCHOOL_DASH__*` variables
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&DashConfig::default())?)
            .add_source(config::File::with_name(path))
            .add_source(Self::environment())
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Defaults overridden by `SCHOOL_DASH__*` variables only
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&DashConfig::default())?)
            .add_source(Self::environment())
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }
}

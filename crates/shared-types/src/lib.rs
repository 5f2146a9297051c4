//! Shared types for School Dash
//!
//! This crate contains the types that are shared between the data-manager,
//! config-system, and wasm-bridge crates: the student profile, the per-day
//! schedule and menu rows, and the commute route summary.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use tsify::Tsify;

pub mod errors;
pub mod messages;
pub mod store_state;

pub use errors::{DashError, DashResult, ErrorResponse};

/// A map coordinate in the routing service's convention: `x` is longitude,
/// `y` is latitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_lat_lng(latitude: f64, longitude: f64) -> Self {
        Self {
            x: longitude,
            y: latitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.y
    }

    pub fn longitude(&self) -> f64 {
        self.x
    }

    /// `"x,y"` as expected by the directions API origin/destination params
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

/// School level, which selects the timetable endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "lowercase")]
pub enum SchoolCategory {
    Elementary,
    Middle,
    High,
}

impl SchoolCategory {
    /// Korean suffix used in school names ("초등학교", "중학교", "고등학교")
    pub fn label(&self) -> &'static str {
        match self {
            SchoolCategory::Elementary => "초등학교",
            SchoolCategory::Middle => "중학교",
            SchoolCategory::High => "고등학교",
        }
    }
}

impl std::fmt::Display for SchoolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchoolCategory::Elementary => write!(f, "elementary"),
            SchoolCategory::Middle => write!(f, "middle"),
            SchoolCategory::High => write!(f, "high"),
        }
    }
}

/// The student's identity record.
///
/// Field names follow the camelCase layout the browser front end has always
/// persisted, so a profile saved by an earlier build still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub school: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_address: Option<String>,
}

impl UserProfile {
    /// School, grade and class are all set (schedule lookups need them)
    pub fn has_class_identity(&self) -> bool {
        !self.school.is_empty()
            && self.grade.is_some_and(|g| g > 0)
            && self.class_num.is_some_and(|c| c > 0)
    }

    pub fn has_school(&self) -> bool {
        !self.school.is_empty()
    }

    /// Destination of the commute route, once the school was resolved
    pub fn school_coord(&self) -> Option<Coord> {
        match (self.school_latitude, self.school_longitude) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => {
                Some(Coord::from_lat_lng(lat, lng))
            }
            _ => None,
        }
    }

    /// Saved home address, ignoring blank strings
    pub fn home_address(&self) -> Option<&str> {
        self.home_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// Copy of this profile with `home_address` replaced
    pub fn with_home_address(&self, address: &str) -> Self {
        Self {
            home_address: Some(address.to_string()),
            ..self.clone()
        }
    }
}

/// One period of the day's timetable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
pub struct ScheduleEntry {
    pub period: String,
    pub content: String,
}

/// One meal slot of the day's cafeteria menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
pub struct MenuEntry {
    pub meal_slot_name: String,
    /// Dish names separated by `\n`
    pub dish_names: String,
}

impl MenuEntry {
    pub fn dishes(&self) -> impl Iterator<Item = &str> {
        self.dish_names
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

/// Commute route from the home address to the school
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub start: Coord,
    pub end: Coord,
    pub path: Vec<Coord>,
    pub duration_minutes: u32,
    pub distance_km: f64,
}

impl RouteResult {
    pub fn has_geometry(&self) -> bool {
        !self.path.is_empty()
    }
}

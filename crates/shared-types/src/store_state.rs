// Persisted browser state for the dashboard.
// The profile envelope mirrors the layout the JS store wrote to localStorage.

use serde::{Deserialize, Serialize};

use crate::UserProfile;

/// localStorage key of the profile envelope
pub const PROFILE_KEY: &str = "user-storage";

/// localStorage key of the timetable panel's date cursor
pub const SCHEDULE_DATE_KEY: &str = "timetableCurrentDate";

/// localStorage key of the meal panel's date cursor
pub const MENU_DATE_KEY: &str = "mealCurrentDate";

/// localStorage key of the last text typed into the route address input
pub const HOME_INPUT_KEY: &str = "homeStartLocation";

/// Envelope version written alongside the profile
pub const PROFILE_STORE_VERSION: u32 = 0;

/// `{"state":{"userInfo":...},"version":0}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedProfile {
    pub state: ProfileSlot,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSlot {
    pub user_info: Option<UserProfile>,
}

impl PersistedProfile {
    pub fn new(profile: Option<UserProfile>) -> Self {
        Self {
            state: ProfileSlot { user_info: profile },
            version: PROFILE_STORE_VERSION,
        }
    }

    pub fn into_profile(self) -> Option<UserProfile> {
        self.state.user_info
    }
}

/// Profile validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl UserProfile {
    /// Validate the profile structure and data
    pub fn validate(&self) -> ProfileValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.school.trim().is_empty() {
            errors.push("School is required".to_string());
        }

        for (name, value) in [
            ("grade", self.grade),
            ("classNum", self.class_num),
            ("studentNum", self.student_num),
        ] {
            match value {
                None => errors.push(format!("{name} is required")),
                Some(0) => errors.push(format!("{name} must be a positive integer")),
                Some(_) => {}
            }
        }

        if self.school_coord().is_none() {
            warnings.push("School coordinates are not resolved".to_string());
        }

        if self.home_address().is_none() {
            warnings.push("No home address saved".to_string());
        }

        ProfileValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

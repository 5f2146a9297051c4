//! Settings form: school, grade, class, student number and home address.

use serde::{Deserialize, Serialize};

use school_dash_data::SchoolDirectory;
use school_dash_shared::{messages, UserProfile};

pub const GRADE_LIST: [u32; 3] = [1, 2, 3];

/// Raw form fields as typed into the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetupForm {
    pub school: String,
    pub grade: String,
    pub class_num: String,
    pub student_num: String,
    pub home_address: String,
}

impl SetupForm {
    /// Pre-filled from the stored profile, empty without one
    pub fn from_profile(profile: Option<&UserProfile>) -> Self {
        let Some(profile) = profile else {
            return Self::default();
        };
        let number = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();

        Self {
            school: profile.school.clone(),
            grade: number(profile.grade),
            class_num: number(profile.class_num),
            student_num: number(profile.student_num),
            home_address: profile.home_address.clone().unwrap_or_default(),
        }
    }

    /// Build the profile to save, or the message explaining why not.
    ///
    /// School coordinates come from the directory, never from the form.
    pub fn submit(&self) -> Result<UserProfile, &'static str> {
        let required = [&self.school, &self.grade, &self.class_num, &self.student_num];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(messages::SETUP_REQUIRED);
        }

        let school = SchoolDirectory::lookup(&self.school).ok_or(messages::SETUP_INVALID_SCHOOL)?;

        let parse = |value: &str| {
            value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(messages::SETUP_INVALID_NUMBER)
        };
        let grade = parse(&self.grade)?;
        let class_num = parse(&self.class_num)?;
        let student_num = parse(&self.student_num)?;

        let home_address = self.home_address.trim();
        let coord = school.coord();
        Ok(UserProfile {
            school: school.name.to_string(),
            grade: Some(grade),
            class_num: Some(class_num),
            student_num: Some(student_num),
            school_latitude: Some(coord.latitude()),
            school_longitude: Some(coord.longitude()),
            home_address: (!home_address.is_empty()).then(|| home_address.to_string()),
        })
    }
}

/// Static choices for the form's drop-downs
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetupOptions {
    pub title: &'static str,
    pub schools: Vec<&'static str>,
    pub grades: Vec<u32>,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            title: messages::SETUP_TITLE,
            schools: SchoolDirectory::names().collect(),
            grades: GRADE_LIST.to_vec(),
        }
    }
}

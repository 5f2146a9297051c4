//! Hand-curated table of the schools the dashboard supports.

use serde::Serialize;

use school_dash_shared::{Coord, SchoolCategory};

/// Administrative codes and location of one school
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchoolRecord {
    pub name: &'static str,
    /// ATPT_OFCDC_SC_CODE (education office)
    pub region_code: &'static str,
    /// SD_SCHUL_CODE
    pub institution_code: &'static str,
    pub category: SchoolCategory,
    pub latitude: f64,
    pub longitude: f64,
}

impl SchoolRecord {
    pub fn coord(&self) -> Coord {
        Coord::from_lat_lng(self.latitude, self.longitude)
    }
}

static SCHOOLS: &[SchoolRecord] = &[
    SchoolRecord {
        name: "설악중학교",
        region_code: "K10",
        institution_code: "7863055",
        category: SchoolCategory::Middle,
        latitude: 38.194360,
        longitude: 128.573260,
    },
    SchoolRecord {
        name: "속초중학교",
        region_code: "K10",
        institution_code: "7863057",
        category: SchoolCategory::Middle,
        latitude: 38.206670,
        longitude: 128.589350,
    },
    SchoolRecord {
        name: "해랑중학교",
        region_code: "K10",
        institution_code: "7863058",
        category: SchoolCategory::Middle,
        latitude: 38.192620,
        longitude: 128.578280,
    },
    SchoolRecord {
        name: "설온중학교",
        region_code: "K10",
        institution_code: "7863056",
        category: SchoolCategory::Middle,
        latitude: 38.215470,
        longitude: 128.574860,
    },
    SchoolRecord {
        name: "설악고등학교",
        region_code: "K10",
        institution_code: "7801148",
        category: SchoolCategory::High,
        latitude: 38.189460,
        longitude: 128.567310,
    },
    SchoolRecord {
        name: "속초고등학교",
        region_code: "K10",
        institution_code: "7801152",
        category: SchoolCategory::High,
        latitude: 38.225625,
        longitude: 128.583675,
    },
    SchoolRecord {
        name: "속초여자고등학교",
        region_code: "K10",
        institution_code: "7801153",
        category: SchoolCategory::High,
        latitude: 38.204200,
        longitude: 128.583900,
    },
];

/// Lookup over the static school table
pub struct SchoolDirectory;

impl SchoolDirectory {
    pub fn lookup(name: &str) -> Option<&'static SchoolRecord> {
        let name = name.trim();
        SCHOOLS.iter().find(|school| school.name == name)
    }

    /// School names in display order, for the settings drop-down
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::all().iter().map(|school| school.name)
    }

    pub fn all() -> &'static [SchoolRecord] {
        SCHOOLS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_school() {
        let school = SchoolDirectory::lookup("속초고등학교").unwrap();
        assert_eq!(school.region_code, "K10");
        assert_eq!(school.institution_code, "7801152");
        assert_eq!(school.category, SchoolCategory::High);
        assert_eq!(school.coord(), Coord::new(128.583675, 38.225625));
    }

    #[test]
    fn test_lookup_unknown_school() {
        assert!(SchoolDirectory::lookup("서울고등학교").is_none());
        assert!(SchoolDirectory::lookup("").is_none());
    }

    #[test]
    fn test_category_matches_name_suffix() {
        for school in SchoolDirectory::all() {
            assert!(
                school.name.ends_with(school.category.label()),
                "{} is not a {}",
                school.name,
                school.category
            );
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = SchoolDirectory::names().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 7);
    }
}

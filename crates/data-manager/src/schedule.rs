//! Daily class timetable from the NEIS timetable endpoints.

use chrono::NaiveDate;

use school_dash_config::NeisConfig;
use school_dash_shared::{DashResult, ScheduleEntry, UserProfile};

use crate::dates::api_date;
use crate::directory::{SchoolDirectory, SchoolRecord};
use crate::http::{HttpClient, HttpRequest};
use crate::neis::{into_outcome, parse_payload, FetchOutcome, TimetableRow};

/// What a schedule lookup needs from the profile, once validated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleQuery {
    pub school: &'static SchoolRecord,
    pub grade: u32,
    pub class_num: u32,
    pub date: NaiveDate,
}

impl ScheduleQuery {
    /// `None` when the profile lacks school, grade or class, or names an
    /// unknown school
    pub fn from_profile(profile: &UserProfile, date: NaiveDate) -> Option<Self> {
        if !profile.has_class_identity() {
            return None;
        }

        let school = SchoolDirectory::lookup(&profile.school);
        if school.is_none() {
            log::error!("School '{}' is not in the directory", profile.school);
        }

        Some(Self {
            school: school?,
            grade: profile.grade?,
            class_num: profile.class_num?,
            date,
        })
    }
}

pub struct ScheduleFetcher<C: HttpClient> {
    client: C,
    neis: NeisConfig,
}

impl<C: HttpClient> ScheduleFetcher<C> {
    pub fn new(client: C, neis: NeisConfig) -> Self {
        Self { client, neis }
    }

    /// Endpoint name for the school's level; the response nests rows under it
    pub fn endpoint(&self, school: &SchoolRecord) -> &str {
        self.neis.timetable_endpoint(school.category)
    }

    pub fn build_request(&self, query: &ScheduleQuery) -> HttpRequest {
        HttpRequest::get(self.neis.url(self.endpoint(query.school)))
            .query("KEY", &self.neis.api_key)
            .query("Type", "json")
            .query("ATPT_OFCDC_SC_CODE", query.school.region_code)
            .query("SD_SCHUL_CODE", query.school.institution_code)
            .query("GRADE", query.grade)
            .query("CLASS_NM", query.class_num)
            .query("ALL_TI_YMD", api_date(query.date))
    }

    /// Fetch the timetable for `date`.
    ///
    /// No request is issued when the profile is absent or incomplete, or when
    /// its school is not in the directory. Transport and parse failures are
    /// logged and reported as not found.
    pub async fn fetch(
        &self,
        profile: Option<&UserProfile>,
        date: NaiveDate,
    ) -> FetchOutcome<ScheduleEntry> {
        let Some(query) = profile.and_then(|p| ScheduleQuery::from_profile(p, date)) else {
            log::debug!("Skipping timetable lookup: incomplete identity");
            return FetchOutcome::not_found();
        };

        match self.request(&query).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Failed to load timetable for {}: {e}", query.date);
                FetchOutcome::not_found()
            }
        }
    }

    async fn request(&self, query: &ScheduleQuery) -> DashResult<FetchOutcome<ScheduleEntry>> {
        let request = self.build_request(query);
        let body = self.client.get_json(&request).await?;
        let payload = parse_payload::<TimetableRow>(&body, self.endpoint(query.school));
        Ok(into_outcome(payload, "timetable"))
    }
}

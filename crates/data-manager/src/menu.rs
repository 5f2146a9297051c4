//! Daily cafeteria menu from mealServiceDietInfo.

use chrono::NaiveDate;

use school_dash_config::NeisConfig;
use school_dash_shared::{DashResult, MenuEntry, UserProfile};

use crate::dates::api_date;
use crate::directory::{SchoolDirectory, SchoolRecord};
use crate::http::{HttpClient, HttpRequest};
use crate::neis::{into_outcome, parse_payload, FetchOutcome, MealRow};

pub struct MenuFetcher<C: HttpClient> {
    client: C,
    neis: NeisConfig,
}

impl<C: HttpClient> MenuFetcher<C> {
    pub fn new(client: C, neis: NeisConfig) -> Self {
        Self { client, neis }
    }

    pub fn build_request(&self, school: &SchoolRecord, date: NaiveDate) -> HttpRequest {
        HttpRequest::get(self.neis.url(&self.neis.meal_service))
            .query("KEY", &self.neis.api_key)
            .query("Type", "json")
            .query("ATPT_OFCDC_SC_CODE", school.region_code)
            .query("SD_SCHUL_CODE", school.institution_code)
            .query("MLSV_YMD", api_date(date))
    }

    /// Fetch the menu for `date`. Only the school is required; grade and
    /// class are ignored.
    pub async fn fetch(
        &self,
        profile: Option<&UserProfile>,
        date: NaiveDate,
    ) -> FetchOutcome<MenuEntry> {
        let Some(profile) = profile.filter(|p| p.has_school()) else {
            log::debug!("Skipping menu lookup: no school selected");
            return FetchOutcome::not_found();
        };
        let Some(school) = SchoolDirectory::lookup(&profile.school) else {
            log::error!("School '{}' is not in the directory", profile.school);
            return FetchOutcome::not_found();
        };

        match self.request(school, date).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Failed to load menu for {date}: {e}");
                FetchOutcome::not_found()
            }
        }
    }

    async fn request(
        &self,
        school: &SchoolRecord,
        date: NaiveDate,
    ) -> DashResult<FetchOutcome<MenuEntry>> {
        let request = self.build_request(school, date);
        let body = self.client.get_json(&request).await?;
        let payload = parse_payload::<MealRow>(&body, &self.neis.meal_service);
        Ok(into_outcome(payload, "menu"))
    }
}

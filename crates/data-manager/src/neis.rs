//! NEIS open API response parsing.
//!
//! Every NEIS endpoint answers with `{ "<endpoint>": [ {"head": [...]}, {"row": [...]} ] }`
//! when it has data, and with a bare `{"RESULT": {"CODE": ..}}` when it does
//! not. [`parse_payload`] turns either shape into a [`NeisPayload`] so the
//! fetchers never probe JSON themselves.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use school_dash_shared::{MenuEntry, ScheduleEntry};

/// "해당하는 데이터가 없습니다."
pub const NO_DATA_CODE: &str = "INFO-200";

/// Normal completion
pub const SUCCESS_CODE: &str = "INFO-000";

/// What a NEIS response contained
#[derive(Debug, Clone, PartialEq)]
pub enum NeisPayload<T> {
    HasData(Vec<T>),
    NoData,
    /// The service answered with a non-informational result code
    ServiceError { code: String, message: String },
    /// The body matched no known layout; `body` is the full response text
    Malformed { reason: String, body: String },
}

/// Parse a response body whose data lives under `root_key`
pub fn parse_payload<T: DeserializeOwned>(body: &Value, root_key: &str) -> NeisPayload<T> {
    if let Some(sections) = body.get(root_key).and_then(Value::as_array) {
        let rows = sections.iter().find_map(|section| {
            section
                .get("row")
                .and_then(Value::as_array)
                .filter(|rows| !rows.is_empty())
        });

        if let Some(rows) = rows {
            return match rows
                .iter()
                .cloned()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()
            {
                Ok(entries) => NeisPayload::HasData(entries),
                Err(e) => malformed(format!("Unexpected row layout: {e}"), body),
            };
        }

        // Sections present but no rows: decide from the head's result code
        return match head_result(sections) {
            Some((code, message)) if is_error_code(&code) => {
                NeisPayload::ServiceError { code, message }
            }
            _ => NeisPayload::NoData,
        };
    }

    match body.get("RESULT").and_then(result_code) {
        Some((code, _)) if code == NO_DATA_CODE => NeisPayload::NoData,
        Some((code, message)) => NeisPayload::ServiceError { code, message },
        None => malformed(format!("Missing '{root_key}' section"), body),
    }
}

fn malformed<T>(reason: String, body: &Value) -> NeisPayload<T> {
    NeisPayload::Malformed {
        reason,
        body: body.to_string(),
    }
}

fn head_result(sections: &[Value]) -> Option<(String, String)> {
    sections
        .iter()
        .filter_map(|section| section.get("head").and_then(Value::as_array))
        .flatten()
        .find_map(|entry| entry.get("RESULT").and_then(result_code))
}

fn result_code(result: &Value) -> Option<(String, String)> {
    let code = result.get("CODE")?.as_str()?.to_string();
    let message = result
        .get("MESSAGE")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((code, message))
}

fn is_error_code(code: &str) -> bool {
    code != SUCCESS_CODE && code != NO_DATA_CODE
}

/// Entries for one panel and whether the service had any for that day.
///
/// `found == false` covers every non-success path (missing identity, unknown
/// school, no-data status, transport failure); the panel shows its no-data
/// message in all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome<T> {
    pub entries: Vec<T>,
    pub found: bool,
}

impl<T> FetchOutcome<T> {
    pub fn found(entries: Vec<T>) -> Self {
        Self {
            found: !entries.is_empty(),
            entries,
        }
    }

    pub fn not_found() -> Self {
        Self {
            entries: Vec::new(),
            found: false,
        }
    }
}

impl<T> Default for FetchOutcome<T> {
    fn default() -> Self {
        Self::not_found()
    }
}

/// Collapse a parsed payload into panel entries, logging the failure cases
pub fn into_outcome<R, T>(payload: NeisPayload<R>, what: &str) -> FetchOutcome<T>
where
    R: Into<T>,
{
    match payload {
        NeisPayload::HasData(rows) => {
            FetchOutcome::found(rows.into_iter().map(Into::into).collect())
        }
        NeisPayload::NoData => {
            log::debug!("No {what} data for the requested day");
            FetchOutcome::not_found()
        }
        NeisPayload::ServiceError { code, message } => {
            log::error!("NEIS {what} request rejected: {code} {message}");
            FetchOutcome::not_found()
        }
        NeisPayload::Malformed { reason, body } => {
            log::error!("Unreadable NEIS {what} response: {reason}; body: {body}");
            FetchOutcome::not_found()
        }
    }
}

/// Timetable row shared by hisTimetable, misTimetable and elsTimetable
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TimetableRow {
    #[serde(rename = "PERIO", deserialize_with = "string_or_number")]
    pub period: String,
    #[serde(rename = "ITRT_CNTNT", default)]
    pub content: String,
}

impl From<TimetableRow> for ScheduleEntry {
    fn from(row: TimetableRow) -> Self {
        ScheduleEntry {
            period: row.period,
            content: row.content.trim().to_string(),
        }
    }
}

/// mealServiceDietInfo row
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MealRow {
    /// 조식 / 중식 / 석식
    #[serde(rename = "MMEAL_SC_NM")]
    pub meal_slot_name: String,
    #[serde(rename = "DDISH_NM", default)]
    pub dish_names: String,
    #[serde(rename = "MLSV_YMD", default)]
    pub service_date: Option<String>,
}

impl From<MealRow> for MenuEntry {
    fn from(row: MealRow) -> Self {
        MenuEntry {
            meal_slot_name: row.meal_slot_name,
            dish_names: split_dish_lines(&row.dish_names),
        }
    }
}

/// NEIS joins dishes with `<br/>`; the menu panel wants line breaks
pub fn split_dish_lines(raw: &str) -> String {
    raw.replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n")
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

//! Date cursors for the schedule and menu panels, and the date formats the
//! NEIS API and the panel headers use.

use chrono::{DateTime, Datelike, Local, NaiveDate, Weekday};

use crate::storage::{read_string, write_string, KeyValueStore};

/// Target date as the NEIS API expects it (`YYYYMMDD`)
pub fn api_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// `2025년 3월 4일`
pub fn display_date(date: NaiveDate) -> String {
    format!("{}년 {}월 {}일", date.year(), date.month(), date.day())
}

/// `2025년 3월 4일 (화)`
pub fn display_date_with_weekday(date: NaiveDate) -> String {
    format!("{} ({})", display_date(date), korean_weekday(date.weekday()))
}

fn korean_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "일",
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (converted to local time)
pub fn parse_stored_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|ts| ts.with_timezone(&Local).date_naive())
    })
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A day cursor moved by explicit prev/next actions, with no bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateCursor {
    date: NaiveDate,
}

impl DateCursor {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn next_day(&mut self) -> NaiveDate {
        if let Some(next) = self.date.succ_opt() {
            self.date = next;
        }
        self.date
    }

    pub fn previous_day(&mut self) -> NaiveDate {
        if let Some(prev) = self.date.pred_opt() {
            self.date = prev;
        }
        self.date
    }

    /// Restore the cursor stored under `key`, or start at `fallback`
    pub fn load<S: KeyValueStore>(store: &S, key: &str, fallback: NaiveDate) -> Self {
        let date = read_string(store, key)
            .and_then(|stored| {
                let parsed = parse_stored_date(&stored);
                if parsed.is_none() {
                    log::warn!("Ignoring unparsable date '{stored}' under '{key}'");
                }
                parsed
            })
            .unwrap_or(fallback);
        Self { date }
    }

    pub fn save<S: KeyValueStore>(&self, store: &S, key: &str) {
        write_string(store, key, &self.date.format("%Y-%m-%d").to_string());
    }
}

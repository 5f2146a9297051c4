//! Schedule and menu fetchers against a local NEIS stand-in

#![cfg(not(target_arch = "wasm32"))]

use std::cell::Cell;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockito::Matcher;
use serde_json::{json, Value};

use school_dash_config::NeisConfig;
use school_dash_data::{HttpClient, HttpRequest, MenuFetcher, ReqwestClient, ScheduleFetcher};
use school_dash_shared::{DashResult, UserProfile};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn neis_config(base_url: &str) -> NeisConfig {
    NeisConfig {
        api_key: "test-key".to_string(),
        base_url: format!("{base_url}/hub"),
        ..Default::default()
    }
}

fn sokcho_high(grade: u32, class_num: u32) -> UserProfile {
    UserProfile {
        school: "속초고등학교".to_string(),
        grade: Some(grade),
        class_num: Some(class_num),
        student_num: Some(7),
        ..Default::default()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Counts requests and always answers with the same body
struct CountingClient {
    calls: Cell<usize>,
    body: Value,
}

impl CountingClient {
    fn new(body: Value) -> Self {
        Self {
            calls: Cell::new(0),
            body,
        }
    }
}

#[async_trait(?Send)]
impl HttpClient for CountingClient {
    async fn get_json(&self, _request: &HttpRequest) -> DashResult<Value> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.body.clone())
    }
}

#[tokio::test]
async fn test_timetable_rows_for_high_school() {
    init_logging();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/hub/hisTimetable")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("KEY".into(), "test-key".into()),
            Matcher::UrlEncoded("Type".into(), "json".into()),
            Matcher::UrlEncoded("ATPT_OFCDC_SC_CODE".into(), "K10".into()),
            Matcher::UrlEncoded("SD_SCHUL_CODE".into(), "7801152".into()),
            Matcher::UrlEncoded("GRADE".into(), "1".into()),
            Matcher::UrlEncoded("CLASS_NM".into(), "3".into()),
            Matcher::UrlEncoded("ALL_TI_YMD".into(), "20250304".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "hisTimetable": [
                    {"head": [{"list_total_count": 2}, {"RESULT": {"CODE": "INFO-000", "MESSAGE": "정상 처리되었습니다."}}]},
                    {"row": [
                        {"ALL_TI_YMD": "20250304", "PERIO": "1", "ITRT_CNTNT": "국어"},
                        {"ALL_TI_YMD": "20250304", "PERIO": "2", "ITRT_CNTNT": "통합과학"}
                    ]}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let fetcher = ScheduleFetcher::new(ReqwestClient::new(), neis_config(&server.url()));
    let outcome = fetcher
        .fetch(Some(&sokcho_high(1, 3)), date(2025, 3, 4))
        .await;

    mock.assert_async().await;
    assert!(outcome.found);
    assert_eq!(outcome.entries.len(), 2);
    assert_eq!(outcome.entries[0].period, "1");
    assert_eq!(outcome.entries[1].content, "통합과학");
}

#[tokio::test]
async fn test_timetable_no_data_day() {
    init_logging();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/hub/hisTimetable")
        .match_query(Matcher::UrlEncoded("ALL_TI_YMD".into(), "20250301".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"RESULT":{"CODE":"INFO-200","MESSAGE":"해당하는 데이터가 없습니다."}}"#)
        .create_async()
        .await;

    let fetcher = ScheduleFetcher::new(ReqwestClient::new(), neis_config(&server.url()));
    let outcome = fetcher
        .fetch(Some(&sokcho_high(1, 1)), date(2025, 3, 1))
        .await;

    mock.assert_async().await;
    assert!(!outcome.found);
    assert!(outcome.entries.is_empty());
}

#[tokio::test]
async fn test_server_error_reports_not_found() {
    init_logging();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/hub/mealServiceDietInfo")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let fetcher = MenuFetcher::new(ReqwestClient::new(), neis_config(&server.url()));
    let outcome = fetcher
        .fetch(Some(&sokcho_high(1, 1)), date(2025, 3, 4))
        .await;

    assert!(!outcome.found);
    assert!(outcome.entries.is_empty());
}

#[tokio::test]
async fn test_menu_ignores_grade_and_class() {
    init_logging();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/hub/mealServiceDietInfo")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("SD_SCHUL_CODE".into(), "7801152".into()),
            Matcher::UrlEncoded("MLSV_YMD".into(), "20250304".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "mealServiceDietInfo": [
                    {"head": [{"list_total_count": 1}, {"RESULT": {"CODE": "INFO-000", "MESSAGE": "정상 처리되었습니다."}}]},
                    {"row": [{
                        "MMEAL_SC_NM": "중식",
                        "MLSV_YMD": "20250304",
                        "DDISH_NM": "현미밥<br/>돈육김치찌개 (5.9.10.)<br/>깍두기"
                    }]}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let profile = UserProfile {
        school: "속초고등학교".to_string(),
        ..Default::default()
    };
    let fetcher = MenuFetcher::new(ReqwestClient::new(), neis_config(&server.url()));
    let outcome = fetcher.fetch(Some(&profile), date(2025, 3, 4)).await;

    mock.assert_async().await;
    assert!(outcome.found);
    assert_eq!(outcome.entries[0].meal_slot_name, "중식");
    assert_eq!(
        outcome.entries[0].dishes().collect::<Vec<_>>(),
        vec!["현미밥", "돈육김치찌개 (5.9.10.)", "깍두기"]
    );
}

#[tokio::test]
async fn test_incomplete_profile_makes_no_request() {
    let client = CountingClient::new(json!({}));
    let fetcher = ScheduleFetcher::new(&client, NeisConfig::default());

    let no_class = UserProfile {
        class_num: None,
        ..sokcho_high(2, 1)
    };
    let unknown_school = UserProfile {
        school: "강릉고등학교".to_string(),
        ..sokcho_high(2, 1)
    };

    for profile in [None, Some(&no_class), Some(&unknown_school)] {
        let outcome = fetcher.fetch(profile, date(2025, 3, 4)).await;
        assert!(!outcome.found);
    }
    assert_eq!(client.calls.get(), 0);

    let menu = MenuFetcher::new(&client, NeisConfig::default());
    let outcome = menu.fetch(Some(&UserProfile::default()), date(2025, 3, 4)).await;
    assert!(!outcome.found);
    assert_eq!(client.calls.get(), 0);
}

#[tokio::test]
async fn test_middle_school_uses_middle_endpoint() {
    let client = CountingClient::new(json!({
        "misTimetable": [{"row": [{"PERIO": 1, "ITRT_CNTNT": "영어"}]}]
    }));
    let fetcher = ScheduleFetcher::new(&client, NeisConfig::default());
    let profile = UserProfile {
        school: "설악중학교".to_string(),
        ..sokcho_high(3, 2)
    };

    let outcome = fetcher.fetch(Some(&profile), date(2025, 3, 4)).await;
    assert_eq!(client.calls.get(), 1);
    assert!(outcome.found);
    assert_eq!(outcome.entries[0].period, "1");
}

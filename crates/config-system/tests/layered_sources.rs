//! Layered loading: defaults, then a config file, then environment overrides

use school_dash_config::{ConfigValidator, DashConfig};
use std::io::Write;
use std::sync::Mutex;

// Environment variables are process-wide; tests touching them take turns
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn test_file_and_environment_layers() {
    let _ = env_logger::builder().is_test(true).try_init();
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dash.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "neis:\n  api_key: from-file\nkakao:\n  rest_api_key: rest-from-file\n  javascript_key: js\nmap:\n  default_level: 5"
    )
    .unwrap();

    std::env::set_var("SCHOOL_DASH__KAKAO__REST_API_KEY", "rest-from-env");

    let config = DashConfig::from_file(path.to_str().unwrap()).unwrap();

    std::env::remove_var("SCHOOL_DASH__KAKAO__REST_API_KEY");

    assert_eq!(config.neis.api_key, "from-file");
    assert_eq!(config.kakao.rest_api_key, "rest-from-env");
    assert_eq!(config.map.default_level, 5);
    // untouched fields keep their defaults
    assert_eq!(config.map.script_id, "kakao-map-sdk");
    assert_eq!(config.neis.meal_service, "mealServiceDietInfo");
    assert!(ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_environment_over_defaults() {
    let _ = env_logger::builder().is_test(true).try_init();
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    std::env::set_var("SCHOOL_DASH__NEIS__API_KEY", "neis-from-env");
    std::env::set_var("SCHOOL_DASH__MAP__DEFAULT_LEVEL", "7");

    let config = DashConfig::from_env();

    std::env::remove_var("SCHOOL_DASH__NEIS__API_KEY");
    std::env::remove_var("SCHOOL_DASH__MAP__DEFAULT_LEVEL");

    let config = config.unwrap();
    assert_eq!(config.neis.api_key, "neis-from-env");
    assert_eq!(config.map.default_level, 7);
    assert_eq!(config.neis.base_url, "https://open.neis.go.kr/hub");
    assert_eq!(config.kakao.route_priority, "RECOMMEND");
    assert_eq!(config.storage.profile, "user-storage");
}

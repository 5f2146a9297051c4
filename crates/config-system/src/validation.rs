//! Configuration validation utilities

use crate::{ConfigError, DashConfig, Result};

/// Outcome of validating a configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration, collecting every problem
    pub fn validate(config: &DashConfig) -> ValidationReport {
        let mut report = ValidationReport::default();

        Self::validate_neis(config, &mut report);
        Self::validate_kakao(config, &mut report);
        Self::validate_map(config, &mut report);

        for warning in &report.warnings {
            log::warn!("Config warning: {warning}");
        }

        report
    }

    /// Validate and fail on the first error
    pub fn validate_strict(config: &DashConfig) -> Result<()> {
        let report = Self::validate(config);
        match report.errors.into_iter().next() {
            Some(error) => Err(ConfigError::Validation(error)),
            None => Ok(()),
        }
    }

    fn validate_neis(config: &DashConfig, report: &mut ValidationReport) {
        if config.neis.api_key.trim().is_empty() {
            report.errors.push("neis.api_key is empty".to_string());
        }
        Self::check_url("neis.base_url", &config.neis.base_url, report);

        for (field, endpoint) in [
            ("neis.high_school_timetable", &config.neis.high_school_timetable),
            ("neis.middle_school_timetable", &config.neis.middle_school_timetable),
            (
                "neis.elementary_school_timetable",
                &config.neis.elementary_school_timetable,
            ),
            ("neis.meal_service", &config.neis.meal_service),
        ] {
            if endpoint.trim().is_empty() || endpoint.contains('/') {
                report
                    .errors
                    .push(format!("{field} must be a bare endpoint name, got {endpoint:?}"));
            }
        }
    }

    fn validate_kakao(config: &DashConfig, report: &mut ValidationReport) {
        if config.kakao.rest_api_key.trim().is_empty() {
            report.errors.push("kakao.rest_api_key is empty".to_string());
        }
        if config.kakao.javascript_key.trim().is_empty() {
            report.errors.push("kakao.javascript_key is empty".to_string());
        }
        Self::check_url("kakao.local_search_url", &config.kakao.local_search_url, report);
        Self::check_url("kakao.directions_url", &config.kakao.directions_url, report);

        if config.kakao.route_priority.trim().is_empty() {
            report.errors.push("kakao.route_priority is empty".to_string());
        }
    }

    fn validate_map(config: &DashConfig, report: &mut ValidationReport) {
        let map = &config.map;

        if map.container_id.trim().is_empty() {
            report.errors.push("map.container_id is empty".to_string());
        }

        // Kakao map levels run from 1 (closest) to 14
        if !(1..=14).contains(&map.default_level) {
            report.errors.push(format!(
                "Invalid map.default_level: {}. Must be between 1 and 14",
                map.default_level
            ));
        }

        let center = map.default_center;
        if !(-90.0..=90.0).contains(&center.latitude)
            || !(-180.0..=180.0).contains(&center.longitude)
        {
            report.errors.push(format!(
                "Invalid map.default_center: ({}, {})",
                center.latitude, center.longitude
            ));
        }

        let color_ok = regex::Regex::new(r"^#[0-9A-Fa-f]{6}$")
            .map(|re| re.is_match(&map.polyline.stroke_color))
            .unwrap_or(false);
        if !color_ok {
            report.errors.push(format!(
                "Invalid map.polyline.stroke_color: {}",
                map.polyline.stroke_color
            ));
        }

        if !(0.0..=1.0).contains(&map.polyline.stroke_opacity) {
            report.errors.push(format!(
                "Invalid map.polyline.stroke_opacity: {}. Must be between 0.0 and 1.0",
                map.polyline.stroke_opacity
            ));
        }

        if map.polyline.stroke_weight == 0 {
            report.warnings.push(
                "map.polyline.stroke_weight is 0; the route line will be invisible".to_string(),
            );
        }
    }

    fn check_url(field: &str, url: &str, report: &mut ValidationReport) {
        if url.starts_with("https://") {
            return;
        }
        if url.starts_with("http://") {
            report
                .warnings
                .push(format!("{field} is not served over https: {url}"));
        } else {
            report.errors.push(format!("{field} is not an http(s) URL: {url}"));
        }
    }
}

//! Configuration file parser for multiple formats

use crate::{ConfigError, DashConfig, Result};
use std::fs;
use std::path::Path;

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Configuration parser
pub struct ConfigParser;

impl ConfigParser {
    /// Parse configuration from a file
    pub fn parse_file(path: impl AsRef<Path>) -> Result<DashConfig> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)?;
        let format = Self::detect_format(path)?;

        Self::parse_string(&TemplateExpander::expand_env_vars(&content), format)
    }

    /// Parse configuration from a string
    pub fn parse_string(content: &str, format: ConfigFormat) -> Result<DashConfig> {
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("YAML parse error: {}", e))),
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("JSON parse error: {}", e))),
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e))),
        }
    }

    /// Detect configuration format from file extension
    pub fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ConfigError::Parse("Cannot determine config format from file extension".to_string())
        })?;

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::Parse(format!(
                "Unsupported config format: {}",
                ext
            ))),
        }
    }
}

/// Template expander for configuration files
pub struct TemplateExpander;

impl TemplateExpander {
    /// Expand `${VAR}` references from the process environment.
    /// Unset variables are left as written.
    pub fn expand_env_vars(content: &str) -> String {
        Self::expand_with(content, |name| std::env::var(name).ok())
    }

    /// Expand `${VAR}` references using `lookup`
    pub fn expand_with(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
        let re = match regex::Regex::new(r"\$\{([^}]+)\}") {
            Ok(re) => re,
            Err(_) => return content.to_string(),
        };

        re.replace_all(content, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
neis:
  api_key: "neis-key"
kakao:
  rest_api_key: "rest-key"
  javascript_key: "js-key"
map:
  default_level: 4
  default_center:
    latitude: 38.2
    longitude: 128.5
"#;

        let config = ConfigParser::parse_string(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.neis.api_key, "neis-key");
        assert_eq!(config.neis.base_url, "https://open.neis.go.kr/hub");
        assert_eq!(config.kakao.javascript_key, "js-key");
        assert_eq!(config.map.default_level, 4);
        assert_eq!(config.map.polyline.stroke_weight, 5);
    }

    #[test]
    fn test_json_parsing() {
        let json = r##"{
            "neis": { "api_key": "k", "base_url": "http://localhost:9000/hub" },
            "map": { "container_id": "map", "polyline": { "stroke_color": "#00FF00" } },
            "storage": { "profile": "profile-v2" }
        }"##;

        let config = ConfigParser::parse_string(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.neis.base_url, "http://localhost:9000/hub");
        assert_eq!(config.map.container_id, "map");
        assert_eq!(config.map.polyline.stroke_color, "#00FF00");
        assert_eq!(config.map.polyline.stroke_opacity, 0.7);
        assert_eq!(config.storage.profile, "profile-v2");
        assert_eq!(config.storage.menu_date, "mealCurrentDate");
    }

    #[test]
    fn test_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.toml");
        fs::write(
            &path,
            "[kakao]\nrest_api_key = \"rest\"\n\n[map]\ndefault_level = 5\n",
        )
        .unwrap();

        let mut expected = DashConfig::default();
        expected.kakao.rest_api_key = "rest".to_string();
        expected.map.default_level = 5;

        let loaded = ConfigParser::parse_file(&path).unwrap();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = ConfigParser::detect_format(Path::new("dash.ini")).unwrap_err();
        assert!(err.to_string().contains("Unsupported config format"));
    }

    #[test]
    fn test_expand_with_lookup() {
        let content = "api_key: ${NEIS_KEY}\nother: ${MISSING}";
        let expanded = TemplateExpander::expand_with(content, |name| {
            (name == "NEIS_KEY").then(|| "secret".to_string())
        });
        assert_eq!(expanded, "api_key: secret\nother: ${MISSING}");
    }
}

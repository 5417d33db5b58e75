use crate::core::matcher::MatcherSettings;
use crate::core::query::AspectRatioDefault;
use crate::utils::error::{Result, TireSearchError};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "tire-finder.toml";
pub const DEFAULT_SEARCH_ENDPOINT: &str =
    "https://api.admovil.net/api/CRM/TiendaOnLine/BusquedaProducto";

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub matcher: MatcherSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "./price_list.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub company_id: String,
    pub timeout_seconds: u64,
    pub aspect_ratio_defaults: Vec<AspectRatioDefault>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            company_id: String::new(),
            timeout_seconds: 30,
            aspect_ratio_defaults: AspectRatioDefault::builtin(),
        }
    }
}

impl SearchConfig {
    /// 空白或仍含未替換的 `${VAR}` 時視為未設定
    pub fn resolved_company_id(&self) -> Option<&str> {
        let id = self.company_id.trim();
        if id.is_empty() || has_unresolved_placeholder(id) {
            None
        } else {
            Some(id)
        }
    }
}

/// 環境變數未設定時，`substitute_env_vars` 會留下原本的 `${VAR}` 文字
pub fn has_unresolved_placeholder(value: &str) -> bool {
    ENV_VAR.is_match(value)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 以 JSON 格式輸出日誌
    pub json: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用內建預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TireSearchError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SEARCH_COMPANY_ID})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("catalog.path", &self.catalog.path)?;
        validation::validate_url("search.endpoint", &self.search.endpoint)?;
        validation::validate_range("search.timeout_seconds", self.search.timeout_seconds, 1, 600)?;
        validation::validate_range(
            "matcher.aspect_ratio_tolerance",
            self.matcher.aspect_ratio_tolerance,
            0,
            100,
        )?;

        if !self.search.company_id.is_empty() {
            validation::validate_non_empty_string("search.company_id", &self.search.company_id)?;
            if has_unresolved_placeholder(&self.search.company_id) {
                tracing::warn!(
                    "⚠️ search.company_id still contains {}, external search is disabled",
                    self.search.company_id
                );
            }
        }

        for rule in &self.search.aspect_ratio_defaults {
            if rule.widths.is_empty() {
                return Err(TireSearchError::invalid_field(
                    "search.aspect_ratio_defaults.widths",
                    "[]",
                    "At least one width is required",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[catalog]
path = "./data/lista.csv"

[search]
endpoint = "https://search.example.com/api"
company_id = "42"
timeout_seconds = 10

[[search.aspect_ratio_defaults]]
widths = [225]
rim_diameter = 17
aspect_ratio = 65

[matcher]
aspect_ratio_tolerance = 3
auto_exact_when_complete = false

[logging]
json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.catalog.path, "./data/lista.csv");
        assert_eq!(config.search.company_id, "42");
        assert_eq!(config.search.aspect_ratio_defaults.len(), 1);
        assert_eq!(config.search.aspect_ratio_defaults[0].widths, vec![225]);
        assert_eq!(config.matcher.aspect_ratio_tolerance, 3);
        assert!(!config.matcher.auto_exact_when_complete);
        assert!(!config.matcher.require_positive_price);
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unset_company_id_variable_is_unresolved() {
        let config = TomlConfig::from_toml_str(
            "[search]\ncompany_id = \"${TIRE_FINDER_TEST_UNSET_COMPANY}\"\n",
        )
        .unwrap();
        assert_eq!(config.search.company_id, "${TIRE_FINDER_TEST_UNSET_COMPANY}");
        assert_eq!(config.search.resolved_company_id(), None);
        assert!(config.validate().is_ok());

        let config = TomlConfig::from_toml_str("[search]\ncompany_id = \" 42 \"\n").unwrap();
        assert_eq!(config.search.resolved_company_id(), Some("42"));
    }

    #[test]
    fn test_blank_company_id_is_rejected() {
        let config = TomlConfig::from_toml_str("[search]\ncompany_id = \"   \"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TireSearchError::InvalidField { .. }));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.search.endpoint, DEFAULT_SEARCH_ENDPOINT);
        assert_eq!(config.matcher, MatcherSettings::default());
        assert_eq!(config.search.aspect_ratio_defaults, AspectRatioDefault::builtin());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TIRE_FINDER_TEST_COMPANY", "777");

        let toml_content = r#"
[search]
company_id = "${TIRE_FINDER_TEST_COMPANY}"
endpoint = "https://search.example.com/${TIRE_FINDER_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.search.company_id, "777");
        assert!(config.search.endpoint.ends_with("${TIRE_FINDER_UNSET_VAR}"));

        std::env::remove_var("TIRE_FINDER_TEST_COMPANY");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[search]\nendpoint = \"invalid-url\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[matcher]\naspect_ratio_tolerance = 500\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file_and_missing_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[catalog]\npath = \"./file-test.csv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.catalog.path, "./file-test.csv");

        let config = TomlConfig::load_or_default("/nonexistent/tire-finder.toml").unwrap();
        assert_eq!(config.catalog.path, "./price_list.csv");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[catalog\npath =").unwrap_err();
        assert!(matches!(err, TireSearchError::ConfigError { .. }));
    }
}

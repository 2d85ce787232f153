use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CropError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_IP_LOOKUP_ENDPOINT: &str = "https://ipinfo.io/json";
pub const DEFAULT_ADVISOR_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_ADVISOR_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

pub const ADVISOR_KEY_ENV: &str = "GROQ_API_KEY";
pub const WEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub data: DataConfig,
    pub weather: WeatherConfig,
    pub geocoding: GeocodingConfig,
    pub advisor: AdvisorConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub crops: String,
    pub districts: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            crops: "data/crop_requirements.csv".to_string(),
            districts: "data/district.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_WEATHER_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    pub ip_lookup_endpoint: String,
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODE_ENDPOINT.to_string(),
            ip_lookup_endpoint: DEFAULT_IP_LOOKUP_ENDPOINT.to_string(),
            user_agent: format!("crop-advisor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ADVISOR_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_ADVISOR_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: String,
    pub filename: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            filename: "crop_suggestion.pdf".to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CropError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| CropError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.drop_unresolved_keys();
        Ok(config)
    }

    /// 替換環境變數 (例如 ${GROQ_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CropError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    // 未設定的 ${VAR} 視為沒有金鑰
    fn drop_unresolved_keys(&mut self) {
        for key in [&mut self.weather.api_key, &mut self.advisor.api_key] {
            if key
                .as_deref()
                .is_some_and(|k| k.trim().is_empty() || k.starts_with("${"))
            {
                *key = None;
            }
        }
    }

    /// Fills missing API keys from the environment.
    pub fn with_env_keys(mut self) -> Self {
        if self.advisor.api_key.is_none() {
            self.advisor.api_key = std::env::var(ADVISOR_KEY_ENV).ok().filter(|k| !k.is_empty());
        }
        if self.weather.api_key.is_none() {
            self.weather.api_key = std::env::var(WEATHER_KEY_ENV).ok().filter(|k| !k.is_empty());
        }
        self
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("data.crops", &self.data.crops)?;
        validate_file_extension("data.crops", &self.data.crops, &["csv"])?;
        validate_path("data.districts", &self.data.districts)?;
        validate_file_extension("data.districts", &self.data.districts, &["csv"])?;

        validate_url("weather.endpoint", &self.weather.endpoint)?;
        validate_url("geocoding.endpoint", &self.geocoding.endpoint)?;
        validate_url("geocoding.ip_lookup_endpoint", &self.geocoding.ip_lookup_endpoint)?;
        validate_non_empty_string("geocoding.user_agent", &self.geocoding.user_agent)?;

        validate_url("advisor.endpoint", &self.advisor.endpoint)?;
        validate_non_empty_string("advisor.model", &self.advisor.model)?;

        validate_path("report.output_path", &self.report.output_path)?;
        validate_path("report.filename", &self.report.filename)?;
        validate_file_extension("report.filename", &self.report.filename, &["pdf"])?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn crops_path(&self) -> &str {
        &self.data.crops
    }

    fn districts_path(&self) -> &str {
        &self.data.districts
    }

    fn output_path(&self) -> &str {
        &self.report.output_path
    }

    fn report_filename(&self) -> &str {
        &self.report.filename
    }

    fn weather_endpoint(&self) -> &str {
        &self.weather.endpoint
    }

    fn weather_api_key(&self) -> Option<&str> {
        self.weather.api_key.as_deref()
    }

    fn geocode_endpoint(&self) -> &str {
        &self.geocoding.endpoint
    }

    fn ip_lookup_endpoint(&self) -> &str {
        &self.geocoding.ip_lookup_endpoint
    }

    fn user_agent(&self) -> &str {
        &self.geocoding.user_agent
    }

    fn advisor_endpoint(&self) -> &str {
        &self.advisor.endpoint
    }

    fn advisor_api_key(&self) -> Option<&str> {
        self.advisor.api_key.as_deref()
    }

    fn advisor_model(&self) -> &str {
        &self.advisor.model
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.crops_path(), "data/crop_requirements.csv");
        assert_eq!(config.weather_endpoint(), DEFAULT_WEATHER_ENDPOINT);
        assert_eq!(config.advisor_model(), DEFAULT_ADVISOR_MODEL);
        assert_eq!(config.report_filename(), "crop_suggestion.pdf");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[data]
crops = "tables/crops.csv"

[advisor]
model = "llama-3.1-8b-instant"
api_key = "gsk_test"

[report]
output_path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.crops_path(), "tables/crops.csv");
        assert_eq!(config.districts_path(), "data/district.csv");
        assert_eq!(config.advisor_model(), "llama-3.1-8b-instant");
        assert_eq!(config.advisor_api_key(), Some("gsk_test"));
        assert_eq!(config.output_path(), "./reports");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CROP_ADVISOR_TEST_WEATHER_KEY", "owm-123");

        let toml_content = r#"
[weather]
api_key = "${CROP_ADVISOR_TEST_WEATHER_KEY}"

[advisor]
api_key = "${CROP_ADVISOR_TEST_UNSET_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.weather_api_key(), Some("owm-123"));
        assert_eq!(config.advisor_api_key(), None);

        std::env::remove_var("CROP_ADVISOR_TEST_WEATHER_KEY");
    }

    #[test]
    fn test_config_validation() {
        let bad_endpoint = TomlConfig::from_toml_str("[weather]\nendpoint = \"not-a-url\"\n").unwrap();
        assert!(bad_endpoint.validate().is_err());

        let bad_table = TomlConfig::from_toml_str("[data]\ncrops = \"crops.xlsx\"\n").unwrap();
        assert!(bad_table.validate().is_err());

        let bad_report = TomlConfig::from_toml_str("[report]\nfilename = \"report.txt\"\n").unwrap();
        assert!(bad_report.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            TomlConfig::from_toml_str("[data\ncrops = 1"),
            Err(CropError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[geocoding]
user_agent = "agro-test/1.0"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.user_agent(), "agro-test/1.0");
    }
}

use crate::config::toml_config::TomlConfig;
use crate::domain::model::{Coordinates, SoilConditions};
use crate::domain::ports::Storage;
use crate::utils::error::{CropError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::Path;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "crop-advisor.toml";

pub const DEFAULT_MOISTURE: f64 = 25.0;
pub const DEFAULT_TEMPERATURE: f64 = 30.0;

#[derive(Debug, Clone, Parser)]
#[command(name = "crop-advisor")]
#[command(version)]
#[command(about = "Crop suitability scoring with AI advice and PDF reports")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Crop requirement table (CSV)
    #[arg(long, global = true)]
    pub crops: Option<String>,

    /// District soil/moisture table (CSV)
    #[arg(long, global = true)]
    pub districts: Option<String>,

    /// Directory the PDF report is written to
    #[arg(long, global = true)]
    pub output_path: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Suggest the best crops for soil and weather conditions
    Suggest {
        #[command(flatten)]
        conditions: ConditionArgs,
        #[command(flatten)]
        location: LocationArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show a crop's requirements with fertilizer advice
    Info {
        /// Crop name (case-insensitive)
        crop: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check how suitable conditions are for one crop
    Check {
        /// Crop name (case-insensitive)
        crop: String,
        #[command(flatten)]
        conditions: ConditionArgs,
        #[command(flatten)]
        location: LocationArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Resolve soil, moisture and temperature for a location
    Locate {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// List crops and soil types in the catalog
    Catalog,
}

#[derive(Debug, Clone, Args)]
pub struct ConditionArgs {
    /// Soil type; defaults to the first soil type in the catalog
    #[arg(long)]
    pub soil: Option<String>,

    /// Soil moisture (%)
    #[arg(long, default_value_t = DEFAULT_MOISTURE, allow_negative_numbers = true)]
    pub moisture: f64,

    /// Temperature (°C)
    #[arg(long = "temp", default_value_t = DEFAULT_TEMPERATURE, allow_negative_numbers = true)]
    pub temperature: f64,
}

impl ConditionArgs {
    pub fn to_conditions(&self, default_soil: &str) -> SoilConditions {
        let soil = self
            .soil
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_soil);
        SoilConditions::new(soil, self.moisture, self.temperature)
    }
}

/// 命令列輸入錯誤
fn input_error(e: CropError) -> CropError {
    CropError::ValidationError {
        message: e.to_string(),
    }
}

impl Validate for ConditionArgs {
    fn validate(&self) -> Result<()> {
        if let Some(soil) = &self.soil {
            validate_non_empty_string("soil", soil).map_err(input_error)?;
        }
        validate_range("moisture", self.moisture, 0.0, 100.0).map_err(input_error)?;
        validate_range("temp", self.temperature, -60.0, 60.0).map_err(input_error)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct LocationArgs {
    /// Fill soil, moisture and temperature from the device location
    #[arg(long)]
    pub locate: bool,

    /// Latitude to use instead of the IP-based device location
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to use instead of the IP-based device location
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl LocationArgs {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    pub fn wants_location(&self) -> bool {
        self.locate || self.coordinates().is_some()
    }
}

impl Validate for LocationArgs {
    fn validate(&self) -> Result<()> {
        if let Some(lat) = self.lat {
            validate_range("lat", lat, -90.0, 90.0).map_err(input_error)?;
        }
        if let Some(lon) = self.lon {
            validate_range("lon", lon, -180.0, 180.0).map_err(input_error)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Skip the AI suggestion
    #[arg(long)]
    pub no_advice: bool,

    /// Do not write the PDF report
    #[arg(long)]
    pub no_report: bool,
}

impl CliConfig {
    /// Loads the TOML config (explicit, or the default file if present) and applies flag overrides.
    pub fn settings(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!("📁 Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                TomlConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => TomlConfig::default(),
        };

        // 套用命令列覆蓋設定
        if let Some(crops) = &self.crops {
            config.data.crops = crops.clone();
        }
        if let Some(districts) = &self.districts {
            config.data.districts = districts.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.report.output_path = output_path.clone();
        }

        Ok(config.with_env_keys())
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Suggest {
                conditions,
                location,
                ..
            }
            | Command::Check {
                conditions,
                location,
                ..
            } => {
                conditions.validate()?;
                location.validate()
            }
            Command::Info { crop, .. } => {
                validate_non_empty_string("crop", crop).map_err(input_error)
            }
            Command::Locate { location } => location.validate(),
            Command::Catalog => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data).map_err(|e| CropError::ReportError {
            message: format!("cannot write {}: {}", full_path.display(), e),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_suggest_with_location() {
        let cli = CliConfig::try_parse_from([
            "crop-advisor",
            "suggest",
            "--soil",
            "Loamy",
            "--moisture",
            "40",
            "--lat",
            "12.29",
            "--lon",
            "76.63",
            "--no-report",
        ])
        .unwrap();

        match &cli.command {
            Command::Suggest {
                conditions,
                location,
                output,
            } => {
                assert_eq!(conditions.to_conditions("Red"), SoilConditions::new("Loamy", 40.0, 30.0));
                assert!(location.wants_location());
                assert_eq!(location.coordinates().unwrap().latitude, 12.29);
                assert!(output.no_report);
                assert!(!output.no_advice);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_default_soil_when_not_given() {
        let cli = CliConfig::try_parse_from(["crop-advisor", "check", "Rice", "--temp", "-2"]).unwrap();
        match &cli.command {
            Command::Check { crop, conditions, location, .. } => {
                assert_eq!(crop, "Rice");
                assert_eq!(conditions.to_conditions("Clayey"), SoilConditions::new("Clayey", 25.0, -2.0));
                assert!(!location.wants_location());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_lat_requires_lon() {
        assert!(CliConfig::try_parse_from(["crop-advisor", "locate", "--lat", "12.0"]).is_err());
    }

    #[test]
    fn test_out_of_range_moisture_fails_validation() {
        let cli = CliConfig::try_parse_from(["crop-advisor", "suggest", "--moisture", "140"]).unwrap();
        let err = cli.validate().unwrap_err();

        assert!(matches!(err, CropError::ValidationError { .. }));
        assert!(err.to_string().contains("moisture"));
        assert!(err.recovery_suggestion().contains("Moisture must be between 0 and 100"));
    }

    #[test]
    fn test_out_of_range_latitude_fails_validation() {
        let cli = CliConfig::try_parse_from([
            "crop-advisor", "locate", "--lat", "95", "--lon", "76.6",
        ])
        .unwrap();
        assert!(matches!(cli.validate(), Err(CropError::ValidationError { .. })));
    }

    #[test]
    fn test_global_overrides_apply_to_settings() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("advisor.toml");
        std::fs::write(&config_path, "[data]\ncrops = \"from-file.csv\"\n").unwrap();

        let cli = CliConfig::try_parse_from([
            "crop-advisor",
            "--config",
            config_path.to_str().unwrap(),
            "catalog",
            "--output-path",
            "/tmp/reports",
        ])
        .unwrap();
        let settings = cli.settings().unwrap();

        assert_eq!(settings.data.crops, "from-file.csv");
        assert_eq!(settings.report.output_path, "/tmp/reports");
    }

    #[tokio::test]
    async fn test_local_storage_creates_directories() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("nested").to_str().unwrap().to_string();
        let storage = LocalStorage::new(base.clone());

        storage.write_file("report.pdf", b"%PDF-1.3").await.unwrap();

        let written = std::fs::read(Path::new(&base).join("report.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.3");
    }
}

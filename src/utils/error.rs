use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required setting: {field}")]
    MissingConfigError { field: String },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Unknown crop: {name}")]
    UnknownCropError { name: String },

    #[error("{service} returned HTTP {status}: {message}")]
    ServiceError {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Malformed {service} response: {message}")]
    MalformedResponseError { service: String, message: String },

    #[error("Report generation failed: {message}")]
    ReportError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Network,
    Report,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CropError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CropError::ConfigError { .. }
            | CropError::ConfigValidationError { .. }
            | CropError::InvalidConfigValueError { .. }
            | CropError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CropError::CsvError(_) | CropError::CatalogError { .. } => ErrorCategory::Data,
            CropError::ApiError(_)
            | CropError::ServiceError { .. }
            | CropError::MalformedResponseError { .. } => ErrorCategory::Network,
            CropError::IoError(_) | CropError::ReportError { .. } => ErrorCategory::Report,
            CropError::UnknownCropError { .. } | CropError::ValidationError { .. } => {
                ErrorCategory::Input
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Report => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CropError::MissingConfigError { .. } => {
                "Set the missing value in the config file or the matching environment variable"
            }
            CropError::ConfigError { .. }
            | CropError::ConfigValidationError { .. }
            | CropError::InvalidConfigValueError { .. } => {
                "Check the TOML config file and command line flags"
            }
            CropError::CsvError(_) | CropError::CatalogError { .. } => {
                "Check that the crop and district tables exist and have the expected columns"
            }
            CropError::UnknownCropError { .. } => {
                "Run `crop-advisor catalog` to list the available crops"
            }
            CropError::ApiError(_)
            | CropError::ServiceError { .. }
            | CropError::MalformedResponseError { .. } => {
                "Check your network connection and API keys, then try again"
            }
            CropError::IoError(_) | CropError::ReportError { .. } => {
                "Check that the output directory is writable"
            }
            CropError::ValidationError { .. } => {
                "Moisture must be between 0 and 100, temperature between -60 and 60, latitude between -90 and 90, longitude between -180 and 180"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CropError::UnknownCropError { name } => {
                format!("'{}' is not in the crop catalog", name)
            }
            CropError::MissingConfigError { field } => {
                format!("A required setting is missing: {}", field)
            }
            CropError::ServiceError { service, status, .. } => {
                format!("The {} service is unavailable (HTTP {})", service, status)
            }
            CropError::ReportError { .. } | CropError::IoError(_) => {
                "The report could not be generated".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_crop_is_input_error() {
        let err = CropError::UnknownCropError {
            name: "Kiwi".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("Kiwi"));
    }

    #[test]
    fn test_report_failure_is_critical() {
        let err = CropError::ReportError {
            message: "font".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.user_friendly_message(), "The report could not be generated");
    }

    #[test]
    fn test_validation_error_points_at_input_ranges() {
        let err = CropError::ValidationError {
            message: "moisture out of range".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(err.recovery_suggestion().contains("between 0 and 100"));
    }

    #[test]
    fn test_service_error_message() {
        let err = CropError::ServiceError {
            service: "weather".to_string(),
            status: 401,
            message: "invalid key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.to_string(), "weather returned HTTP 401: invalid key");
    }
}

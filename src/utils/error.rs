use thiserror::Error;

#[derive(Error, Debug)]
pub enum TireSearchError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidField {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, TireSearchError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TireSearchError {
    pub fn missing_field(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    pub fn invalid_field(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::ApiStatusError { .. } => ErrorCategory::Network,
            Self::CsvError(_) | Self::SerializationError(_) => ErrorCategory::Data,
            Self::ConfigError { .. } | Self::PatternError(_) => ErrorCategory::Configuration,
            Self::ValidationError { .. } | Self::MissingField { .. } | Self::InvalidField { .. } => {
                ErrorCategory::Input
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 呼叫端不應自動重試輸入錯誤
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Network)
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the search endpoint URL and network connectivity, then retry",
            ErrorCategory::Data => "Check that the price list / API response has the expected columns and format",
            ErrorCategory::Configuration => "Review the TOML configuration file and environment variables",
            ErrorCategory::Input => "Check the request parameters (width is required, measures must be numeric)",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingField { field } if field == "width" => {
                "Tire width (width) is a required parameter".to_string()
            }
            Self::MissingField { field } => format!("Missing required parameter: {}", field),
            Self::InvalidField { field, value, .. } => {
                format!("Parameter {} has an invalid value: {}", field, value)
            }
            Self::ApiError(_) | Self::ApiStatusError { .. } => {
                "The external catalog search service is not available right now".to_string()
            }
            Self::CsvError(_) => "The price list could not be read".to_string(),
            other => other.to_string(),
        }
    }
}

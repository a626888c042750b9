use thiserror::Error;

/// 預設錯誤訊息（無狀態文字、無訊息時使用）
pub const DEFAULT_FETCH_ERROR_MESSAGE: &str = "An error has occurred while fetching the URI";

/// 單次 fetch/parse 週期的失敗種類
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("{name}: {message}")]
    Network { name: String, message: String },

    #[error("HTTP {status}: {status_text}")]
    HttpStatus { status: u16, status_text: String },

    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl FetchFailure {
    pub fn network(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// 錯誤佔位元素的文字: `Error <status-or-name>: <statusText-or-message>`
    pub fn error_text(&self) -> String {
        let (label, detail) = match self {
            FetchFailure::Network { name, message } => (name.clone(), message.as_str()),
            FetchFailure::HttpStatus {
                status,
                status_text,
            } => (status.to_string(), status_text.as_str()),
            FetchFailure::Parse { message } => ("ParseError".to_string(), message.as_str()),
        };

        let label = if label.is_empty() {
            "Unknown".to_string()
        } else {
            label
        };
        let detail = if detail.trim().is_empty() {
            DEFAULT_FETCH_ERROR_MESSAGE
        } else {
            detail
        };

        format!("Error {}: {}", label, detail)
    }
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Fetch failed: {0}")]
    FetchError(#[from] FetchFailure),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FeedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::FetchError(FetchFailure::Parse { .. }) => ErrorCategory::Data,
            FeedError::FetchError(_) => ErrorCategory::Network,
            FeedError::SerializationError(_) | FeedError::ValidationError { .. } => {
                ErrorCategory::Data
            }
            FeedError::ConfigError { .. }
            | FeedError::ConfigValidationError { .. }
            | FeedError::InvalidConfigValueError { .. }
            | FeedError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FeedError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路或狀態碼錯誤通常可重試
            FeedError::FetchError(FetchFailure::Network { .. })
            | FeedError::FetchError(FetchFailure::HttpStatus { .. }) => ErrorSeverity::Medium,
            FeedError::FetchError(FetchFailure::Parse { .. })
            | FeedError::SerializationError(_)
            | FeedError::ValidationError { .. } => ErrorSeverity::High,
            FeedError::ConfigError { .. }
            | FeedError::ConfigValidationError { .. }
            | FeedError::InvalidConfigValueError { .. }
            | FeedError::MissingConfigError { .. } => ErrorSeverity::High,
            FeedError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FeedError::FetchError(failure) => failure.error_text(),
            FeedError::IoError(e) => format!("Could not read or write a file: {}", e),
            FeedError::SerializationError(e) => format!("Could not encode data: {}", e),
            FeedError::ConfigError { message } => format!("Configuration problem: {}", message),
            FeedError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            FeedError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not a valid value for {}: {}", value, field, reason),
            FeedError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            FeedError::ValidationError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FeedError::FetchError(FetchFailure::Network { .. }) => {
                "Check your network connection and that the site is reachable"
            }
            FeedError::FetchError(FetchFailure::HttpStatus { .. }) => {
                "Check that the site exposes the WordPress REST API at /wp-json"
            }
            FeedError::FetchError(FetchFailure::Parse { .. }) => {
                "Make sure the posts request includes _embed and the site returns WordPress JSON"
            }
            FeedError::IoError(_) => "Check file permissions and available disk space",
            FeedError::SerializationError(_) => "Report this issue with the offending input",
            FeedError::ConfigError { .. }
            | FeedError::ConfigValidationError { .. }
            | FeedError::InvalidConfigValueError { .. }
            | FeedError::MissingConfigError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
            FeedError::ValidationError { .. } => "Enter a site base URL such as https://example.com",
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;

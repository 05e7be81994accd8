use thiserror::Error;

#[derive(Error, Debug)]
pub enum SgeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        kind: Option<String>,
    },

    #[error("API reported failure: {message}")]
    EnvelopeError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Unknown entity '{name}'")]
    UnknownEntityError { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
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

impl SgeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SgeError::HttpError(_) => ErrorCategory::Network,
            SgeError::ApiError { .. } | SgeError::EnvelopeError { .. } => ErrorCategory::Api,
            SgeError::CsvError(_)
            | SgeError::SerializationError(_)
            | SgeError::ValidationError { .. } => ErrorCategory::Data,
            SgeError::ConfigError { .. }
            | SgeError::InvalidConfigValueError { .. }
            | SgeError::MissingConfigError { .. }
            | SgeError::UnknownEntityError { .. } => ErrorCategory::Configuration,
            SgeError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SgeError::HttpError(_) => ErrorSeverity::Medium,
            SgeError::ApiError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            SgeError::ApiError { .. } | SgeError::EnvelopeError { .. } => ErrorSeverity::High,
            SgeError::CsvError(_)
            | SgeError::SerializationError(_)
            | SgeError::ValidationError { .. } => ErrorSeverity::High,
            SgeError::ConfigError { .. }
            | SgeError::InvalidConfigValueError { .. }
            | SgeError::MissingConfigError { .. }
            | SgeError::UnknownEntityError { .. }
            | SgeError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the CLI, derived from severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SgeError::HttpError(_) => {
                "Check that the backend is running and that --api-base-url points at it"
            }
            SgeError::ApiError { status, .. } if *status == 404 => {
                "Check the record key; the backend could not find it"
            }
            SgeError::ApiError { status, .. } if *status >= 500 => {
                "The backend failed while handling the request; check its logs and retry"
            }
            SgeError::ApiError { .. } | SgeError::EnvelopeError { .. } => {
                "Review the request payload against the backend's required fields"
            }
            SgeError::CsvError(_) | SgeError::SerializationError(_) => {
                "The data could not be encoded or decoded; check the JSON payload"
            }
            SgeError::ValidationError { .. } => "Correct the highlighted value and retry",
            SgeError::ConfigError { .. }
            | SgeError::InvalidConfigValueError { .. }
            | SgeError::MissingConfigError { .. } => {
                "Fix the configuration file or command-line flags"
            }
            SgeError::UnknownEntityError { .. } => {
                "Use one of: students, courses, professors, subjects, offers, evaluations, enrollments, grades"
            }
            SgeError::IoError(_) => "Check file permissions and that the path exists",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SgeError::HttpError(e) if e.is_timeout() => "The API did not answer in time".to_string(),
            SgeError::HttpError(_) => "Could not reach the API".to_string(),
            SgeError::ApiError { message, .. } => format!("API error: {}", message),
            SgeError::EnvelopeError { message } => format!("API error: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SgeError>;

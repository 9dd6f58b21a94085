use thiserror::Error;

#[derive(Error, Debug)]
pub enum BizError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to load bundle '{language}': {message}")]
    BundleError { language: String, message: String },

    #[error("Unsupported language code: {code}")]
    UnsupportedLanguage { code: String },

    #[error("File '{name}' is not valid UTF-8 text")]
    EncodingError { name: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Save failed: {message}")]
    SaveError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Io,
    Configuration,
    Localization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BizError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BizError::HttpError(_) => ErrorCategory::Network,
            BizError::CsvError(_)
            | BizError::SerializationError(_)
            | BizError::EncodingError { .. }
            | BizError::SaveError { .. } => ErrorCategory::Data,
            BizError::IoError(_) | BizError::StorageError { .. } => ErrorCategory::Io,
            BizError::ConfigValidationError { .. }
            | BizError::InvalidConfigValueError { .. }
            | BizError::MissingConfigError { .. } => ErrorCategory::Configuration,
            BizError::BundleError { .. } | BizError::UnsupportedLanguage { .. } => {
                ErrorCategory::Localization
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 不支援的語言只是被忽略
            BizError::UnsupportedLanguage { .. } => ErrorSeverity::Low,
            BizError::HttpError(_) | BizError::BundleError { .. } | BizError::SaveError { .. } => {
                ErrorSeverity::Medium
            }
            BizError::CsvError(_)
            | BizError::SerializationError(_)
            | BizError::EncodingError { .. }
            | BizError::ConfigValidationError { .. }
            | BizError::InvalidConfigValueError { .. }
            | BizError::MissingConfigError { .. } => ErrorSeverity::High,
            BizError::IoError(_) | BizError::StorageError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BizError::HttpError(_) => "Could not reach the translation server".to_string(),
            BizError::CsvError(_) => "The CSV data could not be processed".to_string(),
            BizError::IoError(e) => format!("File system operation failed: {}", e),
            BizError::SerializationError(_) => "The JSON data could not be processed".to_string(),
            BizError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            BizError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            BizError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            BizError::BundleError { language, .. } => {
                format!("Translations for '{}' could not be loaded", language)
            }
            BizError::UnsupportedLanguage { code } => {
                format!("Language '{}' is not supported", code)
            }
            BizError::EncodingError { name } => format!("'{}' is not a text file", name),
            BizError::StorageError { message } => format!("Could not save the file: {}", message),
            BizError::SaveError { message } => format!("Auto-save failed: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the locales URL and your network connection",
            ErrorCategory::Data => "Check that the input file is well-formed CSV or JSON",
            ErrorCategory::Io => "Check that the path exists and is writable",
            ErrorCategory::Configuration => "Review the configuration file and CLI arguments",
            ErrorCategory::Localization => {
                "Supported languages are: uz-latn, uz-cyrl, ru, en"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BizError>;

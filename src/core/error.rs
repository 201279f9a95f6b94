//! Typed error handling for the marketplace
//!
//! Library traits return `anyhow::Result`; handlers convert failures into
//! [`SeljError`], which knows its HTTP status and a stable error code.
//!
//! # Error Categories
//!
//! - [`CategoryError`]: category administration
//! - [`ValidationError`]: rejected payloads
//! - [`StorageError`]: repository backends
//! - [`ConfigError`]: configuration parsing and validation
//! - [`RequestError`]: malformed HTTP requests
//!
//! Search degradation (index failures) never shows up here: the search
//! controller falls back to local matching instead of failing.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the marketplace
#[derive(Debug)]
pub enum SeljError {
    Category(CategoryError),

    Validation(ValidationError),

    Storage(StorageError),

    Config(ConfigError),

    Request(RequestError),

    /// Should not happen in normal operation
    Internal(String),
}

impl fmt::Display for SeljError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeljError::Category(e) => write!(f, "{}", e),
            SeljError::Validation(e) => write!(f, "{}", e),
            SeljError::Storage(e) => write!(f, "{}", e),
            SeljError::Config(e) => write!(f, "{}", e),
            SeljError::Request(e) => write!(f, "{}", e),
            SeljError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for SeljError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeljError::Category(e) => Some(e),
            SeljError::Validation(e) => Some(e),
            SeljError::Storage(e) => Some(e),
            SeljError::Config(e) => Some(e),
            SeljError::Request(e) => Some(e),
            SeljError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SeljError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SeljError::Category(e) => e.status_code(),
            SeljError::Validation(_) => StatusCode::BAD_REQUEST,
            SeljError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SeljError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SeljError::Request(_) => StatusCode::BAD_REQUEST,
            SeljError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SeljError::Category(e) => e.error_code(),
            SeljError::Validation(_) => "VALIDATION_ERROR",
            SeljError::Storage(_) => "STORAGE_ERROR",
            SeljError::Config(_) => "CONFIG_ERROR",
            SeljError::Request(_) => "BAD_REQUEST",
            SeljError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Wrap a repository failure, keeping typed storage errors as they are
    pub fn storage(backend: &str, err: anyhow::Error) -> Self {
        match err.downcast::<StorageError>() {
            Ok(typed) => SeljError::Storage(typed),
            Err(err) => SeljError::Storage(StorageError::QueryError {
                backend: backend.to_string(),
                message: err.to_string(),
            }),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            SeljError::Category(CategoryError::NotFound { value }) => {
                Some(serde_json::json!({ "value": value }))
            }
            SeljError::Validation(ValidationError::Rejected(errors)) => {
                Some(serde_json::json!({ "errors": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for SeljError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Category Errors
// =============================================================================

#[derive(Debug)]
pub enum CategoryError {
    NotFound { value: String },
}

impl fmt::Display for CategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryError::NotFound { value } => write!(f, "category '{}' not found", value),
        }
    }
}

impl std::error::Error for CategoryError {}

impl CategoryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CategoryError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CategoryError::NotFound { .. } => "CATEGORY_NOT_FOUND",
        }
    }
}

impl From<CategoryError> for SeljError {
    fn from(err: CategoryError) -> Self {
        SeljError::Category(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

#[derive(Debug)]
pub enum ValidationError {
    /// Human-readable messages, one per violation
    Rejected(Vec<String>),

    InvalidJson { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Rejected(errors) => {
                write!(f, "Validation errors: {}", errors.join(", "))
            }
            ValidationError::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for SeljError {
    fn from(err: ValidationError) -> Self {
        SeljError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

#[derive(Debug)]
pub enum StorageError {
    ConnectionError { backend: String, message: String },

    QueryError { backend: String, message: String },

    /// Stored data could not be decoded
    IntegrityError { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::IntegrityError { message } => {
                write!(f, "Data integrity error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for SeljError {
    fn from(err: StorageError) -> Self {
        SeljError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug)]
pub enum ConfigError {
    ParseError { file: Option<String>, message: String },

    InvalidValue { field: String, value: String, message: String },

    FileNotFound { path: String },

    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue { field, value, message } => {
                write!(f, "Invalid value '{}' for field '{}': {}", value, field, message)
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => write!(f, "IO error: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for SeljError {
    fn from(err: ConfigError) -> Self {
        SeljError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

#[derive(Debug)]
pub enum RequestError {
    MissingField { field: String },

    InvalidField { field: String, message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingField { field } => write!(f, "{} required", field),
            RequestError::InvalidField { field, message } => {
                write!(f, "Invalid {}: {}", field, message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl From<RequestError> for SeljError {
    fn from(err: RequestError) -> Self {
        SeljError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for SeljError {
    fn from(err: serde_json::Error) -> Self {
        SeljError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for SeljError {
    fn from(err: serde_yaml::Error) -> Self {
        SeljError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for SeljError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<SeljError>() {
            Ok(selj) => selj,
            Err(err) => SeljError::Internal(err.to_string()),
        }
    }
}

/// A specialized Result type for marketplace operations
pub type SeljResult<T> = Result<T, SeljError>;

//! Common error types used across all School Dash crates
//! Provides consistent error handling and reporting

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base error type for all School Dash operations
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum DashError {
    // Input errors, raised before any network call
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // External service answered but had no matching record
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    // Transport errors
    #[error("HTTP request failed (status {status:?}): {message}")]
    Http {
        status: Option<u16>,
        message: String,
    },

    #[error("Response parse error: {message}")]
    Parse { message: String },

    // Persistence errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        field: Option<String>,
    },

    // WASM-specific errors
    #[error("JavaScript interop error: {message}")]
    JsInterop { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DashError {
    /// Whether the failure came from the service rejecting our credentials
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            DashError::Http {
                status: Some(401) | Some(403),
                ..
            }
        )
    }
}

/// Result type alias for School Dash operations
pub type DashResult<T> = Result<T, DashError>;

/// Error response structure for JavaScript interop
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: DashError,
    pub timestamp: u64,
    pub context: Option<ErrorContext>,
}

/// Additional context for error reporting
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorContext {
    pub component: String,
    pub operation: String,
    pub metadata: serde_json::Value,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: DashError) -> Self {
        Self {
            success: false,
            error,
            timestamp: chrono::Utc::now().timestamp_millis() as u64,
            context: None,
        }
    }

    /// Add context to the error response
    pub fn with_context(mut self, component: &str, operation: &str) -> Self {
        self.context = Some(ErrorContext {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: serde_json::Value::Null,
        });
        self
    }

    /// Convert to JSON string for JavaScript
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"type":"Internal","details":{"message":"Failed to serialize error"}}}"#.to_string()
        })
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::Parse {
            message: format!("{} (line {})", err, err.line()),
        }
    }
}

/// Helper macro for converting Results to DashResult
#[macro_export]
macro_rules! map_dash_error {
    ($result:expr, $error_variant:ident, $message:expr) => {
        $result.map_err(|e| $crate::errors::DashError::$error_variant {
            message: format!("{}: {:?}", $message, e),
        })
    };
}

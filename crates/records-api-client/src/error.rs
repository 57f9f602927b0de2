//! Error types for record-base API operations.

use thiserror::Error;

/// Error type for all record-base API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport-level HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success HTTP status.
    ///
    /// Contains the status code and response body for debugging. Common
    /// causes: authentication failure, unknown base/table, schema mismatch.
    #[error("API error: {status} - {body}")]
    Status {
        /// The HTTP status code returned by the API.
        status: u16,
        /// The response body, typically containing error details.
        body: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration or initialization error.
    ///
    /// Used for missing credentials or an invalid API base URL.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type alias for record-base API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display() {
        let err = ApiError::Status {
            status: 401,
            body: "invalid token".to_string(),
        };
        assert_eq!(format!("{}", err), "API error: 401 - invalid token");
    }

    #[test]
    fn config_error_display() {
        let err = ApiError::Config("missing API token".to_string());
        assert_eq!(format!("{}", err), "Configuration error: missing API token");
    }

    #[test]
    fn json_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{{{").unwrap_err();
        let err: ApiError = serde_err.into();
        assert!(format!("{}", err).starts_with("JSON error:"));
    }
}

//! Delivery API error types.

use std::collections::BTreeMap;

use super::convert::ConversionError;

/// Errors from the delivery API and its client-side checks.
///
/// The variants separate three things callers treat differently: a valid
/// request for an absent resource (`NotFound`), a request the client must not
/// repeat unchanged (`InvalidInput`, `Validation`, other 4xx) and a transient
/// failure that may be retried (`Network`, 5xx).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response received (connection failure, timeout, ...)
    #[error("network error: {0}")]
    Network(reqwest::Error),

    /// The HTTP client could not be set up
    #[error("HTTP client setup failed: {0}")]
    Client(reqwest::Error),

    /// 401: the session token was missing or rejected
    #[error("unauthorized: sign in again")]
    Unauthorized,

    /// 403: signed in but not permitted
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// 404: the addressed resource does not exist
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// 422: field-level validation failures
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Any other non-success status
    #[error("API error {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body was not valid JSON of the expected shape
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response parsed but could not be mapped to domain types
    #[error("unexpected payload: {0}")]
    Conversion(#[from] ConversionError),

    /// Rejected before sending
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Whether repeating the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    pub(crate) fn not_found(resource: impl std::fmt::Display) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
        }
    }
}

impl From<crate::domain::DomainError> for ApiError {
    fn from(err: crate::domain::DomainError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<crate::domain::InvalidId> for ApiError {
    fn from(err: crate::domain::InvalidId) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

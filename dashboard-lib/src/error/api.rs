//! API error types

/// Errors that can occur during API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response from the API.
    #[error("Error: {status} {reason} - {message} (URL: {url})")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// Raw response body.
        message: String,
        /// URL of the failed request.
        url: String,
    },

    /// The API rejected the session credentials (401 or 403).
    ///
    /// The session has already been torn down when this is returned.
    #[error("Unauthorized or Forbidden ({status}): redirecting to login")]
    Unauthorized {
        /// HTTP status code, either 401 or 403.
        status: u16,
    },

    /// No response was obtained.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A request body could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An attempt chain was given no attempts.
    #[error("No request attempts were supplied")]
    NoAttempts,
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>, url: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self::Http {
            status,
            reason,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Returns the HTTP status code if this error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Unauthorized { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for 401/403 responses.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Returns `true` if the status triggers the session-expiry policy.
pub fn is_auth_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}

use thiserror::Error;

/// Errors returned by REST client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport could not complete the exchange (DNS, connect, TLS,
    /// timeout or transport initialization failure).
    #[error("network error: {0}")]
    Network(String),

    /// The exchange completed but the server answered with status >= 400.
    ///
    /// The response body is not preserved.
    #[error("{message}")]
    HttpStatus { status: u16, message: String },

    /// A successful response body could not be parsed as JSON.
    #[error("failed to parse JSON response: {0}")]
    JsonParse(String),
}

impl ClientError {
    pub(crate) fn http_status(status: u16) -> Self {
        Self::HttpStatus {
            status,
            message: format!("HTTP error: {status}"),
        }
    }

    /// Returns the HTTP status code for [`ClientError::HttpStatus`] errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Network(_) | Self::JsonParse(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonParse(error.to_string())
    }
}

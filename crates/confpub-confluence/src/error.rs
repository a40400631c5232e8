//! Error types for Confluence API operations.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, TLS, DNS).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned a non-2xx status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Server rejected an update because the version number is stale.
    #[error("edit conflict (HTTP 409): {body}")]
    Conflict {
        /// Response body.
        body: String,
    },

    /// The server answered 2xx but the payload had nothing in it.
    #[error("empty {0} response from server")]
    EmptyResponse(&'static str),

    /// I/O error while streaming a request body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfluenceError {
    /// Build the error for a non-2xx response.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        if status == 409 {
            Self::Conflict { body }
        } else {
            Self::HttpResponse { status, body }
        }
    }

    /// HTTP status carried by the error, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpResponse { status, .. } => Some(*status),
            Self::Conflict { .. } => Some(409),
            _ => None,
        }
    }
}

//! Adapter error types.

use thiserror::Error;

/// A result type using the adapter [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the gateway HTTP adapter.
///
/// Every failure is returned to the caller immediately; the adapter performs
/// no retries and never terminates the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed admin URL or credentials. Raised before any request is
    /// attempted.
    #[error("{0}")]
    Config(String),

    /// The request was canceled before completion.
    #[error("request canceled")]
    Canceled,

    /// The request deadline elapsed during connect or header wait.
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure (DNS, refused connection, TLS mismatch). The
    /// message carries a scheme-aware hint when the underlying error text
    /// matches a known pattern.
    #[error("{message}")]
    Connection {
        /// Full error text, including any TLS configuration hint.
        message: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status with an empty body. Displays as the HTTP status
    /// text, e.g. `404 Not Found`.
    #[error("{status_text}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The status line text, e.g. `404 Not Found`.
        status_text: String,
        /// The attempted request URL.
        url: String,
    },

    /// Non-success status with a message from the gateway, either a decoded
    /// `{"message": ...}` envelope or the trimmed raw body text.
    #[error("{message}")]
    Remote {
        /// The HTTP status code.
        status: u16,
        /// The remote error message, verbatim.
        message: String,
        /// The attempted request URL.
        url: String,
    },

    /// A JSON payload failed to encode, or a response that claimed JSON
    /// content failed to parse.
    #[error("error reading JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// The HTTP status code carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The attempted request URL, when the request got far enough to have
    /// one.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Status { url, .. } | Self::Remote { url, .. } => Some(url),
            _ => None,
        }
    }
}

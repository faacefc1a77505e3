use std::fmt;

use thiserror::Error;

/// Top-level error type for the `fleetdesk-api` crate.
///
/// Every outbound call either succeeds with a JSON payload or fails with one
/// of these. Server and transport failures share a single shape,
/// [`RequestError`], so callers never branch on HTTP internals.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No bearer token is present in the session. Raised before any I/O.
    #[error("Not authenticated: no access token in the current session")]
    Unauthenticated,

    // ── Request ─────────────────────────────────────────────────────
    /// The server answered non-2xx, or the transport never got an answer.
    #[error(transparent)]
    Request(#[from] RequestError),

    // ── Setup ───────────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client builder error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A multipart part could not be built (bad MIME type, unreadable file).
    #[error("Invalid multipart part '{field}': {reason}")]
    Multipart { field: String, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Session storage ─────────────────────────────────────────────
    /// The credential store could not be read or written.
    #[error("Session store error: {0}")]
    SessionStore(String),
}

impl Error {
    /// Returns `true` if the credential is missing or the server rejected it,
    /// so signing in again might resolve the failure.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Unauthenticated => true,
            Self::Request(e) => e.status == Some(401),
            _ => false,
        }
    }

    /// The HTTP status, if the failure came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status,
            _ => None,
        }
    }
}

/// Normalized failure of a single request.
///
/// `status` is `None` when no response arrived at all (DNS, refused
/// connection, timeout). `message` is the response body verbatim when the
/// server sent one, otherwise a generic `HTTP status <code>` string or the
/// transport's own reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub status: Option<u16>,
    pub message: String,
}

impl RequestError {
    /// Build from a non-2xx status and the raw response body.
    pub fn from_response(status: u16, body: String) -> Self {
        let message = if body.trim().is_empty() {
            format!("HTTP status {status}")
        } else {
            body
        };
        Self {
            status: Some(status),
            message,
        }
    }

    /// Build from a transport failure that produced no response.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            message: reason.into(),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "Request failed (HTTP {code}): {}", self.message),
            None => write!(f, "Request failed: {}", self.message),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(RequestError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_falls_back_to_status_text() {
        let err = RequestError::from_response(503, "  \n".into());
        assert_eq!(err.status, Some(503));
        assert_eq!(err.message, "HTTP status 503");
    }

    #[test]
    fn body_text_is_kept_verbatim() {
        let err = RequestError::from_response(422, "name already taken\n".into());
        assert_eq!(err.message, "name already taken\n");
    }

    #[test]
    fn auth_expired_covers_missing_token_and_401() {
        assert!(Error::Unauthenticated.is_auth_expired());
        assert!(Error::from(RequestError::from_response(401, String::new())).is_auth_expired());
        assert!(!Error::from(RequestError::transport("refused")).is_auth_expired());
    }
}

// ── Core error types ──
//
// What screens and front ends see. Local precondition failures are their
// own variants so callers can tell "nothing was sent" from "the server said
// no". The `From<fleetdesk_api::Error>` impl folds transport-layer errors
// into this taxonomy.

use thiserror::Error;

use crate::resource::ResourceKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Not signed in: no access token in the current session")]
    Unauthenticated,

    // ── Local preconditions (nothing sent) ───────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// The operation needs a parent entity that does not exist yet.
    #[error("{message}")]
    ParentRequired { message: String },

    #[error("The {kind} list is still loading, try again once it is ready")]
    NotReady { kind: ResourceKind },

    #[error("{kind} not found: {identifier}")]
    NotFound {
        kind: ResourceKind,
        identifier: String,
    },

    // ── Remote ───────────────────────────────────────────────────────
    /// Server rejection or transport failure. `message` is the server's
    /// body text verbatim when it sent one.
    #[error("{message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// HTTP status of a server rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }

    /// `true` when the failure was detected locally, before any request.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::ValidationFailed { .. }
                | Self::ParentRequired { .. }
                | Self::NotReady { .. }
                | Self::NotFound { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fleetdesk_api::Error> for CoreError {
    fn from(err: fleetdesk_api::Error) -> Self {
        match err {
            fleetdesk_api::Error::Unauthenticated => CoreError::Unauthenticated,
            fleetdesk_api::Error::Request(e) => CoreError::Request {
                status: e.status,
                message: e.message,
            },
            fleetdesk_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fleetdesk_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            fleetdesk_api::Error::Multipart { field, reason } => CoreError::ValidationFailed {
                message: format!("cannot attach '{field}': {reason}"),
            },
            fleetdesk_api::Error::Deserialization { message, body } => {
                tracing::debug!(%body, "undecodable payload");
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            fleetdesk_api::Error::SessionStore(msg) => CoreError::Config {
                message: format!("Session store: {msg}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdesk_api::RequestError;

    #[test]
    fn request_error_keeps_server_text() {
        let err: CoreError =
            fleetdesk_api::Error::from(RequestError::from_response(409, "Name taken".into())).into();
        assert_eq!(err.to_string(), "Name taken");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_local());
    }

    #[test]
    fn missing_token_is_local() {
        let err = CoreError::from(fleetdesk_api::Error::Unauthenticated);
        assert!(matches!(err, CoreError::Unauthenticated));
        assert!(err.is_local());
    }

    #[test]
    fn undecodable_payload_is_internal() {
        let err = CoreError::from(fleetdesk_api::Error::Deserialization {
            message: "missing field `id`".into(),
            body: "[{}]".into(),
        });
        assert!(matches!(err, CoreError::Internal(_)));
        assert!(err.to_string().contains("missing field `id`"));
    }
}

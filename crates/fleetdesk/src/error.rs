//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fleetdesk_config::ConfigError;
use fleetdesk_core::{CoreError, ResourceKind};

/// Process exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const NOT_READY: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the admin API: {message}")]
    #[diagnostic(
        code(fleetdesk::connection_failed),
        help(
            "Check the API URL and your network connection.\n\
             Self-signed staging servers need --insecure (-k) or ca_cert in the profile."
        )
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not signed in")]
    #[diagnostic(
        code(fleetdesk::unauthenticated),
        help(
            "Store a token with: fleetdesk auth login --profile {profile}\n\
             Or pass --token / set FLEETDESK_TOKEN for a single invocation."
        )
    )]
    Unauthenticated { profile: String },

    #[error("The server rejected the credential: {message}")]
    #[diagnostic(
        code(fleetdesk::auth_failed),
        help("The token may have expired. Sign in again with: fleetdesk auth login")
    )]
    AuthFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(fleetdesk::forbidden))]
    Forbidden { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fleetdesk::not_found),
        help("Run: fleetdesk {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(fleetdesk::conflict))]
    Conflict { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(fleetdesk::parent_required),
        help("Run: fleetdesk orgs create --name <NAME>")
    )]
    ParentRequired { message: String },

    #[error("The {kind} list is still loading")]
    #[diagnostic(code(fleetdesk::not_ready), help("Retry once the list has loaded."))]
    NotReady { kind: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(fleetdesk::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fleetdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fleetdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: fleetdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(fleetdesk::no_config),
        help(
            "Create a profile with: fleetdesk config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(fleetdesk::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(fleetdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal / IO ────────────────────────────────────────────────

    #[error("{0}")]
    #[diagnostic(code(fleetdesk::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl From<fleetdesk_api::Error> for CliError {
    fn from(err: fleetdesk_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl CliError {
    /// Name the profile in an authentication hint.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::Unauthenticated { .. } => Self::Unauthenticated {
                profile: name.into(),
            },
            other => other,
        }
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Unauthenticated { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::NotReady { .. } => exit_code::NOT_READY,
            Self::Validation { .. }
            | Self::ParentRequired { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthenticated => CliError::Unauthenticated {
                profile: "default".into(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::ParentRequired { message } => CliError::ParentRequired { message },

            CoreError::NotReady { kind } => CliError::NotReady {
                kind: kind.to_string(),
            },

            CoreError::NotFound { kind, identifier } => {
                let (resource_type, list_command) = match kind {
                    ResourceKind::Organizations => ("organization", "orgs list"),
                    ResourceKind::Devices => ("device", "devices list"),
                    ResourceKind::Payments => ("payment", "payments list"),
                };
                CliError::NotFound {
                    resource_type: resource_type.into(),
                    identifier,
                    list_command: list_command.into(),
                }
            }

            CoreError::Request { status, message } => match status {
                None => CliError::ConnectionFailed { message },
                Some(401) => CliError::AuthFailed { message },
                Some(403) => CliError::Forbidden { message },
                Some(409) => CliError::Conflict { message },
                Some(_) => CliError::ApiError { status, message },
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_status_picks_exit_code() {
        let conflict = CliError::from(CoreError::Request {
            status: Some(409),
            message: "name already taken".into(),
        });
        assert_eq!(conflict.exit_code(), exit_code::CONFLICT);
        assert_eq!(conflict.to_string(), "name already taken");

        let offline = CliError::from(CoreError::Request {
            status: None,
            message: "connection refused".into(),
        });
        assert_eq!(offline.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn local_failures_are_usage_errors() {
        let parent = CliError::from(CoreError::ParentRequired {
            message: "No organizations exist yet: create a new organization first".into(),
        });
        assert_eq!(parent.exit_code(), exit_code::USAGE);
        assert_eq!(
            CliError::from(CoreError::Unauthenticated).exit_code(),
            exit_code::AUTH
        );
        assert_eq!(
            CliError::from(CoreError::NotReady {
                kind: ResourceKind::Devices
            })
            .exit_code(),
            exit_code::NOT_READY
        );
    }

    #[test]
    fn not_found_names_list_command() {
        let err = CliError::from(CoreError::NotFound {
            kind: ResourceKind::Organizations,
            identifier: "42".into(),
        });
        let CliError::NotFound {
            resource_type,
            list_command,
            ..
        } = err
        else {
            panic!("expected NotFound");
        };
        assert_eq!(resource_type, "organization");
        assert_eq!(list_command, "orgs list");
    }
}

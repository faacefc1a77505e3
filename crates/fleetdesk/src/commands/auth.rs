//! Auth subcommand handlers.
//!
//! These only touch the persisted session; no request is sent.

use fleetdesk_core::{OrganizationRef, SessionContext};
use secrecy::SecretString;
use serde::Serialize;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct AuthStatus {
    profile: String,
    authenticated: bool,
    refresh_token: bool,
    organization: Option<OrganizationRef>,
}

fn detail(status: &AuthStatus) -> String {
    let signed_in = if status.authenticated {
        "signed in"
    } else {
        "not signed in"
    };
    let org = status
        .organization
        .as_ref()
        .map_or_else(|| "(none)".into(), |o| format!("{} ({})", o.name, o.id));
    [
        format!("Profile:      {}", status.profile),
        format!("Session:      {signed_in}"),
        format!("Organization: {org}"),
    ]
    .join("\n")
}

fn prompt_token() -> Result<String, CliError> {
    if !util::interactive() {
        return Err(CliError::Validation {
            field: "access-token".into(),
            reason: "pass --access-token when not running in a terminal".into(),
        });
    }
    let token = rpassword::prompt_password("Access token: ").map_err(util::prompt_err)?;
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "access-token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token.trim().to_owned())
}

fn session(global: &GlobalOpts) -> Result<(String, SessionContext), CliError> {
    let cfg = config::load_config_or_default();
    let (name, profile) = config::resolve_profile(global, &cfg)?;
    let session = fleetdesk_config::open_session(&profile, &name)?;
    Ok((name, session))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (profile, session) = session(global)?;

    match args.command {
        AuthCommand::Login {
            access_token,
            refresh_token,
        } => {
            let access = match access_token.filter(|t| !t.trim().is_empty()) {
                Some(token) => token,
                None => prompt_token()?,
            };
            session.set_tokens(
                SecretString::from(access),
                refresh_token.map(SecretString::from),
            )?;
            tracing::info!(%profile, "access token stored");
            if !global.quiet {
                eprintln!("✓ Signed in (profile '{profile}')");
            }
            Ok(())
        }

        AuthCommand::Status => {
            let status = AuthStatus {
                profile,
                authenticated: session.is_authenticated(),
                refresh_token: session.refresh_token().is_some(),
                organization: session.selected_organization(),
            };
            let out = output::render_single(&global.output, &status, detail, |s| {
                s.authenticated.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AuthCommand::Logout => {
            session.clear()?;
            if !global.quiet {
                eprintln!("✓ Signed out (profile '{profile}')");
            }
            Ok(())
        }
    }
}

//! CLI configuration: thin wrapper around `fleetdesk_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --token, etc.).

use std::sync::Arc;

use fleetdesk_api::{PersistedSession, SessionStore};
use fleetdesk_config::FileSessionStore;
use fleetdesk_core::{Console, ConsoleConfig, SessionContext};
use secrecy::{ExposeSecret, SecretString};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fleetdesk_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    names.sort();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// The named profile with flag overrides applied.
///
/// A profile that is not in the config file is synthesized from the flags
/// when `--api-url` is given; otherwise asking for it by name is an error.
pub fn resolve_profile(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    let mut profile = if let Some(profile) = config.profiles.get(&name) {
        profile.clone()
    } else if global.profile.is_some() && global.api_url.is_none() {
        return Err(CliError::ProfileNotFound {
            name,
            available: available_profiles(config),
        });
    } else {
        Profile::default()
    };

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok((name, profile))
}

/// Translate a resolved profile into a `ConsoleConfig`.
pub fn console_config(profile: &Profile, defaults: &Defaults) -> Result<ConsoleConfig, CliError> {
    if profile.api_url.trim().is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }
    Ok(fleetdesk_config::profile_to_console_config(profile, defaults)?)
}

/// Restore the profile's session, substituting a token from `--token` or
/// the profile's `token_env` for this invocation.
pub fn open_session(
    global: &GlobalOpts,
    profile: &Profile,
    name: &str,
) -> Result<SessionContext, CliError> {
    let token = global
        .token
        .clone()
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
        .or_else(|| fleetdesk_config::resolve_token_env(profile));

    let Some(token) = token else {
        return Ok(fleetdesk_config::open_session(profile, name)?);
    };

    tracing::debug!(profile = name, "using access token from flag or environment");
    let store = TokenOverride {
        inner: FileSessionStore::for_profile(profile, name),
        token,
    };
    Ok(SessionContext::restore(Arc::new(store))?)
}

/// Everything a command needs to talk to the service.
pub struct Connection {
    pub console: Console,
    pub profile_name: String,
}

/// Build a `Console` from the config file, profile, and CLI overrides.
pub fn connect(global: &GlobalOpts) -> Result<Connection, CliError> {
    let cfg = load_config_or_default();
    let (profile_name, profile) = resolve_profile(global, &cfg)?;
    let console_cfg = console_config(&profile, &cfg.defaults)?;
    let session = open_session(global, &profile, &profile_name)?;
    let console = Console::new(&console_cfg, session)?;
    Ok(Connection {
        console,
        profile_name,
    })
}

// ── Token override ──────────────────────────────────────────────────

/// Session store that answers with an externally supplied access token and
/// writes back only the organization pointer, leaving stored tokens alone.
struct TokenOverride {
    inner: FileSessionStore,
    token: SecretString,
}

impl SessionStore for TokenOverride {
    fn load(&self) -> Result<PersistedSession, fleetdesk_api::Error> {
        let mut record = self.inner.load()?;
        record.access_token = Some(self.token.expose_secret().to_owned());
        record.refresh_token = None;
        Ok(record)
    }

    fn save(&self, session: &PersistedSession) -> Result<(), fleetdesk_api::Error> {
        let mut record = self.inner.load()?;
        record
            .selected_organization_id
            .clone_from(&session.selected_organization_id);
        record
            .selected_organization_name
            .clone_from(&session.selected_organization_name);
        self.inner.save(&record)
    }
}

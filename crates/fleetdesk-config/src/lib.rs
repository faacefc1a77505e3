//! Shared configuration for the fleetdesk CLI.
//!
//! TOML profiles, platform config/data paths, translation to
//! `fleetdesk_core::ConsoleConfig`, and the file-backed session store
//! (with optional keyring storage for tokens).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use fleetdesk_api::{PersistedSession, SessionContext, SessionStore};
use fleetdesk_core::{ConsoleConfig, TlsVerification};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const KEYRING_SERVICE: &str = "fleetdesk";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in {path}")]
    UnknownProfile { profile: String, path: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("session file {path}: {reason}")]
    Session { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named service profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named service profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Base URL of the REST service (e.g. "https://admin.example.com/api/").
    pub api_url: String,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Where the session is persisted. Defaults to the platform data dir.
    pub session_file: Option<PathBuf>,

    /// Keep tokens in the system keyring instead of the session file.
    #[serde(default)]
    pub use_keyring: bool,

    /// Environment variable holding an access token for this profile.
    pub token_env: Option<String>,
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
                path: config_path().display().to_string(),
            })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "fleetdesk", "fleetdesk")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default session file for `profile_name`.
pub fn default_session_path(profile_name: &str) -> PathBuf {
    let file = format!("session-{profile_name}.json");
    project_dirs().map_or_else(
        || dirs_fallback().join(&file),
        |dirs| dirs.data_dir().join(&file),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fleetdesk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// Environment keys use `__` between levels, e.g.
/// `FLEETDESK_DEFAULTS__TIMEOUT=10`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Same as [`load_config`] with an explicit file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FLEETDESK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ConsoleConfig` from a profile, no CLI flag overrides.
pub fn profile_to_console_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let api_url: url::Url = profile
        .api_url
        .parse()
        .map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL '{}': {e}", profile.api_url),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ConsoleConfig {
        api_url,
        tls,
        timeout,
    })
}

/// Token from the profile's `token_env` variable, if set and non-empty.
pub fn resolve_token_env(profile: &Profile) -> Option<SecretString> {
    let name = profile.token_env.as_ref()?;
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

// ── Session persistence ─────────────────────────────────────────────

/// JSON file holding the persisted session for one profile.
///
/// With `keyring` enabled the tokens live in the system keyring under
/// `fleetdesk / <profile>/access-token` (and `refresh-token`), and the file
/// keeps only the selected-organization pointer.
pub struct FileSessionStore {
    path: PathBuf,
    keyring_profile: Option<String>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keyring_profile: None,
        }
    }

    #[must_use]
    pub fn with_keyring(mut self, profile_name: impl Into<String>) -> Self {
        self.keyring_profile = Some(profile_name.into());
        self
    }

    /// Store for `profile`, honoring `session_file` and `use_keyring`.
    pub fn for_profile(profile: &Profile, profile_name: &str) -> Self {
        let path = profile
            .session_file
            .clone()
            .unwrap_or_else(|| default_session_path(profile_name));
        let store = Self::new(path);
        if profile.use_keyring {
            store.with_keyring(profile_name)
        } else {
            store
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<PersistedSession, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedSession::default());
            }
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(PersistedSession::default());
        }
        serde_json::from_str(&text).map_err(|e| ConfigError::Session {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn write_file(&self, session: &PersistedSession) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session).map_err(|e| ConfigError::Session {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, json)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn keyring_entry(profile: &str, slot: &str) -> Option<keyring::Entry> {
    match keyring::Entry::new(KEYRING_SERVICE, &format!("{profile}/{slot}")) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(error = %e, "keyring unavailable");
            None
        }
    }
}

fn keyring_get(profile: &str, slot: &str) -> Option<String> {
    keyring_entry(profile, slot)?.get_password().ok()
}

fn keyring_put(profile: &str, slot: &str, value: Option<&str>) -> Result<(), keyring::Error> {
    let Some(entry) = keyring_entry(profile, slot) else {
        return Ok(());
    };
    match value {
        Some(secret) => entry.set_password(secret),
        None => match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        },
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<PersistedSession, fleetdesk_api::Error> {
        let mut session = self
            .read_file()
            .map_err(|e| fleetdesk_api::Error::SessionStore(e.to_string()))?;
        if let Some(profile) = &self.keyring_profile {
            session.access_token = keyring_get(profile, "access-token");
            session.refresh_token = keyring_get(profile, "refresh-token");
        }
        debug!(path = %self.path.display(), "session loaded");
        Ok(session)
    }

    fn save(&self, session: &PersistedSession) -> Result<(), fleetdesk_api::Error> {
        let mut on_disk = session.clone();
        if let Some(profile) = &self.keyring_profile {
            keyring_put(profile, "access-token", session.access_token.as_deref())
                .and_then(|()| {
                    keyring_put(profile, "refresh-token", session.refresh_token.as_deref())
                })
                .map_err(|e| fleetdesk_api::Error::SessionStore(format!("keyring: {e}")))?;
            on_disk.access_token = None;
            on_disk.refresh_token = None;
        }
        self.write_file(&on_disk)
            .map_err(|e| fleetdesk_api::Error::SessionStore(e.to_string()))
    }
}

/// Restore the persisted session for `profile`.
pub fn open_session(profile: &Profile, profile_name: &str) -> Result<SessionContext, ConfigError> {
    let store = FileSessionStore::for_profile(profile, profile_name);
    let path = store.path().display().to_string();
    SessionContext::restore(Arc::new(store)).map_err(|e| ConfigError::Session {
        path,
        reason: e.to_string(),
    })
}

//! Clap derive structures for the `fleetdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetdesk -- admin console for organizations, devices, and payments
#[derive(Debug, Parser)]
#[command(
    name = "fleetdesk",
    version,
    about = "Administer organizations, devices, and payments from the command line",
    long_about = "Command-line front end for the fleetdesk admin service.\n\n\
        Every command loads the collections it works on, applies changes only\n\
        after the server confirms them, and reports the outcome.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "FLEETDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Base URL of the admin API (overrides profile)
    #[arg(long, short = 'a', env = "FLEETDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token for this invocation only (overrides the stored session)
    #[arg(long, env = "FLEETDESK_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FLEETDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FLEETDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FLEETDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in, inspect, or clear the stored session
    Auth(AuthArgs),

    /// Manage organizations and the active organization
    #[command(alias = "org", alias = "o")]
    Orgs(OrgsArgs),

    /// Manage devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage payments
    #[command(alias = "pay")]
    Payments(PaymentsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Argument Types ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive substring filter on the display name
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store an access token for the active profile
    Login {
        /// Access token (prompted for when omitted)
        #[arg(long)]
        access_token: Option<String>,

        /// Refresh token issued alongside the access token
        #[arg(long)]
        refresh_token: Option<String>,
    },

    /// Show whether a token is stored and which organization is active
    Status,

    /// Forget the stored tokens and the active organization
    Logout,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ORGANIZATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct OrgsArgs {
    #[command(subcommand)]
    pub command: OrgsCommand,
}

#[derive(Debug, Subcommand)]
pub enum OrgsCommand {
    /// List organizations
    #[command(alias = "ls")]
    List(ListArgs),

    /// Create an organization
    Create {
        /// Organization name
        #[arg(long, short = 'n')]
        name: String,

        /// Extra field as key=value (repeatable)
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },

    /// Rename an organization
    Rename {
        /// Organization id or exact name
        org: String,

        /// New name
        #[arg(long, short = 'n')]
        name: String,
    },

    /// Delete an organization
    #[command(alias = "rm")]
    Delete {
        /// Organization id or exact name
        org: String,
    },

    /// Make an organization the active one (prompts when omitted or ambiguous)
    Switch {
        /// Organization id, exact name, or search text
        org: Option<String>,
    },

    /// Show the active organization
    Current,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List(ListArgs),

    /// Register a device under an organization
    Create {
        /// Device name
        #[arg(long, short = 'n')]
        name: String,

        /// Organization id, exact name, or search text (prompts when omitted or ambiguous)
        #[arg(long)]
        org: Option<String>,

        /// Image file to upload with the device
        #[arg(long)]
        image: Option<PathBuf>,

        /// Extra field as key=value (repeatable)
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },

    /// Rename a device or replace its image
    Update {
        /// Device id or exact name
        device: String,

        /// New name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Replacement image file
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Device id or exact name
        device: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PAYMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PaymentsArgs {
    #[command(subcommand)]
    pub command: PaymentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PaymentsCommand {
    /// List payments
    #[command(alias = "ls")]
    List(ListArgs),

    /// Record a payment (filed under the active organization)
    Create {
        /// Invoice or transfer reference
        #[arg(long, short = 'r')]
        reference: String,

        /// Amount, e.g. 129.90
        #[arg(long)]
        amount: String,

        /// ISO currency code
        #[arg(long)]
        currency: Option<String>,

        /// Extra field as key=value (repeatable)
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },

    /// Change a payment
    Update {
        /// Payment id or exact reference
        payment: String,

        #[arg(long, short = 'r')]
        reference: Option<String>,

        #[arg(long)]
        amount: Option<String>,

        #[arg(long)]
        currency: Option<String>,

        #[arg(long)]
        status: Option<String>,

        /// Extra field as key=value (repeatable)
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },

    /// Delete a payment
    #[command(alias = "rm")]
    Delete {
        /// Payment id or exact reference
        payment: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: api_url, ca_cert, insecure, timeout, session_file,
        /// use_keyring, token_env
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

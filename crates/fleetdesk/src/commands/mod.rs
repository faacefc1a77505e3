//! Command dispatch: bridges CLI args -> console screens -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod devices;
pub mod orgs;
pub mod payments;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Connection;
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    conn: &Connection,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let console = &conn.console;
    let result = match cmd {
        Command::Orgs(args) => orgs::handle(console, args, global).await,
        Command::Devices(args) => devices::handle(console, args, global).await,
        Command::Payments(args) => payments::handle(console, args, global).await,
        // Auth, Config and Completions are handled before dispatch
        Command::Auth(_) | Command::Config(_) | Command::Completions(_) => Err(
            CliError::Internal("command does not need a connection".into()),
        ),
    };
    console.shutdown();
    result.map_err(|e| e.for_profile(&conn.profile_name))
}

//! Command dispatch: bridges CLI args -> reconciler / auditor -> output formatting.

pub mod apply;
pub mod audit;
pub mod config_cmd;
pub mod revert;
pub mod switches;
pub mod util;

use switchyard_core::SwitchRegistry;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a registry-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    registry: &SwitchRegistry,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Apply(args) => apply::handle(registry, args, global).await,
        Command::Audit(args) => audit::handle(registry, args, global).await,
        Command::Revert(args) => revert::handle(registry, args, global).await,
        // Config and Switches are handled before dispatch
        Command::Config(_) | Command::Switches(_) => unreachable!(),
    }
}

//! Revert command handler.

use switchyard_core::{Reconciler, SwitchRegistry};

use super::util;
use crate::cli::{GlobalOpts, RevertArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    registry: &SwitchRegistry,
    args: RevertArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let port = util::parse_port(&args.port)?;
    Reconciler::new(registry).revert(&port).await?;

    output::print_output(&format!("Reverted {port}"), global.quiet);
    Ok(())
}

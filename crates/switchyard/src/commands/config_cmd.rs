//! Config subcommand handlers.

use std::io::BufRead;

use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = util::inventory_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            switchyard_config::save_config(&switchyard_config::sample_config(), &path)?;
            eprintln!("Wrote sample inventory to {}", path.display());
            Ok(())
        }

        ConfigCommand::SetPassword { switch } => {
            let cfg = util::load_inventory(global)?;
            if !cfg.switches.contains_key(&switch) {
                return Err(CliError::NotFound {
                    resource_type: "switch".into(),
                    identifier: switch,
                    list_command: "switches list".into(),
                });
            }

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            let password = line.trim_end_matches(['\r', '\n']);
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            switchyard_config::store_password(&switch, &SecretString::from(password.to_owned()))?;
            eprintln!("Stored password for '{switch}' in the system keyring");
            Ok(())
        }
    }
}

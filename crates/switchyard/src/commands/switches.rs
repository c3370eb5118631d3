//! Switches subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use switchyard_config::SwitchEntry;

use super::util;
use crate::cli::{GlobalOpts, SwitchesArgs, SwitchesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct SwitchSummary {
    label: String,
    #[serde(rename = "type")]
    kind: String,
    hostname: Option<String>,
    credentials: &'static str,
}

#[derive(Tabled)]
struct SwitchRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Password")]
    credentials: &'static str,
}

impl SwitchSummary {
    fn new(label: &str, entry: &SwitchEntry) -> Self {
        let credentials = match (&entry.password_env, &entry.password) {
            (Some(_), _) => "env",
            (None, Some(_)) => "plaintext",
            (None, None) => "keyring",
        };
        Self {
            label: label.to_owned(),
            kind: entry.kind.to_string(),
            hostname: entry
                .parameters
                .get("hostname")
                .and_then(|v| v.as_str())
                .map(ToOwned::to_owned),
            credentials,
        }
    }

    fn row(&self) -> SwitchRow {
        SwitchRow {
            label: self.label.clone(),
            kind: self.kind.clone(),
            hostname: self.hostname.clone().unwrap_or_else(|| "-".into()),
            credentials: self.credentials,
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    label: String,
    valid: bool,
    error: Option<String>,
}

#[derive(Tabled)]
struct ValidationRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Result")]
    result: String,
}

pub fn handle(args: SwitchesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = util::load_inventory(global)?;

    match args.command {
        SwitchesCommand::List => {
            let summaries: Vec<SwitchSummary> = cfg
                .switches
                .iter()
                .map(|(label, entry)| SwitchSummary::new(label, entry))
                .collect();
            let out = output::render_list(&global.output, &summaries, SwitchSummary::row, |s| {
                s.label.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SwitchesCommand::Validate { label } => {
            let selected: Vec<(&String, &SwitchEntry)> = match label {
                Some(ref label) => {
                    let entry = cfg.switches.get(label).ok_or_else(|| CliError::NotFound {
                        resource_type: "switch".into(),
                        identifier: label.clone(),
                        list_command: "switches list".into(),
                    })?;
                    vec![(label, entry)]
                }
                None => cfg.switches.iter().collect(),
            };
            if selected.is_empty() {
                return Err(CliError::NoConfig {
                    path: util::inventory_path(global).display().to_string(),
                });
            }

            let reports: Vec<ValidationReport> = selected
                .into_iter()
                .map(|(label, entry)| {
                    let error = entry.validate(label).err().map(|e| e.to_string());
                    ValidationReport {
                        label: label.clone(),
                        valid: error.is_none(),
                        error,
                    }
                })
                .collect();

            let out = output::render_list(
                &global.output,
                &reports,
                |r| ValidationRow {
                    label: r.label.clone(),
                    result: r.error.clone().unwrap_or_else(|| "ok".into()),
                },
                |r| format!("{}\t{}", r.label, if r.valid { "ok" } else { "invalid" }),
            )?;
            output::print_output(&out, global.quiet);

            match reports.iter().find(|r| !r.valid) {
                Some(invalid) => Err(CliError::InvalidSwitch {
                    label: invalid.label.clone(),
                    reason: invalid.error.clone().unwrap_or_default(),
                }),
                None => Ok(()),
            }
        }
    }
}

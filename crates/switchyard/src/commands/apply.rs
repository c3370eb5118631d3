//! Apply command handler.

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use switchyard_core::{ActionOutcome, Auditor, NetworkingAction, Reconciler, SwitchRegistry};

use super::util::{self, PortReport};
use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// An action file holds a single action or a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActionFile {
    One(NetworkingAction),
    Many(Vec<NetworkingAction>),
}

#[derive(Debug, Serialize)]
struct OutcomeReport {
    nic: String,
    port: Option<String>,
    channel: String,
    network: Option<String>,
    ok: bool,
    retryable: bool,
    error: Option<String>,
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "NIC")]
    nic: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl OutcomeReport {
    fn new(outcome: &ActionOutcome) -> Self {
        let action = &outcome.action;
        Self {
            nic: format!("{}/{}", action.nic.node, action.nic.label),
            port: action.nic.port.as_ref().map(ToString::to_string),
            channel: action.channel.clone(),
            network: action.new_network.as_ref().map(|n| n.label.clone()),
            ok: outcome.is_ok(),
            retryable: outcome.result.as_ref().err().is_some_and(|e| e.is_retryable()),
            error: outcome.result.as_ref().err().map(ToString::to_string),
        }
    }

    fn row(&self) -> OutcomeRow {
        let result = match (&self.error, self.retryable) {
            (None, _) => "ok".to_owned(),
            (Some(err), true) => format!("retryable: {err}"),
            (Some(err), false) => format!("failed: {err}"),
        };
        OutcomeRow {
            nic: self.nic.clone(),
            port: self.port.clone().unwrap_or_else(|| "-".into()),
            channel: self.channel.clone(),
            network: self.network.clone().unwrap_or_else(|| "(none)".into()),
            result,
        }
    }
}

pub async fn handle(
    registry: &SwitchRegistry,
    args: ApplyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reconciler = Reconciler::new(registry);

    let outcomes = match util::read_document::<ActionFile>(&args.file)? {
        ActionFile::One(action) => {
            // A lone action fails with its own error and exit code
            reconciler.apply(&action).await?;
            vec![ActionOutcome {
                action,
                result: Ok(()),
            }]
        }
        ActionFile::Many(actions) => reconciler.apply_all(actions).await,
    };

    let reports: Vec<OutcomeReport> = outcomes.iter().map(OutcomeReport::new).collect();
    let out = output::render_list(&global.output, &reports, OutcomeReport::row, |r| {
        format!("{}\t{}", r.nic, if r.ok { "ok" } else { "failed" })
    })?;
    output::print_output(&out, global.quiet);

    if args.verify {
        let touched: Vec<_> = outcomes
            .iter()
            .filter(|o| o.is_ok())
            .filter_map(|o| o.action.nic.port.clone())
            .collect();
        if !touched.is_empty() {
            let networks = Auditor::new(registry).port_networks(&touched).await?;
            let reports = util::port_reports(&networks);
            let out = output::render_list(&global.output, &reports, PortReport::row, |r| {
                r.port.clone()
            })?;
            output::print_output(&out, global.quiet);
        }
    }

    let failed = reports.iter().filter(|r| !r.ok).count();
    if failed > 0 {
        return Err(CliError::ActionsFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

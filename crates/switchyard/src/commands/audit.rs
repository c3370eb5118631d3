//! Audit command handler.

use serde::Serialize;
use tabled::Tabled;

use switchyard_core::{Auditor, Port, PortDrift, PortVlan, SwitchRegistry, ports_by_vlan};

use super::util::{self, PortReport};
use crate::cli::{AuditArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct VlanGroup {
    vlan: String,
    ports: Vec<String>,
}

#[derive(Tabled)]
struct VlanGroupRow {
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Ports")]
    ports: String,
}

#[derive(Debug, Serialize)]
struct DriftReport {
    port: String,
    missing: Vec<String>,
    unexpected: Vec<String>,
}

#[derive(Tabled)]
struct DriftRow {
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Missing")]
    missing: String,
    #[tabled(rename = "Unexpected")]
    unexpected: String,
}

#[derive(Tabled)]
struct PeerRow {
    #[tabled(rename = "Port")]
    port: String,
}

fn describe(vlan: &PortVlan) -> String {
    if vlan.channel.is_native() {
        format!("native {}", vlan.vlan)
    } else {
        vlan.vlan.to_string()
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".into()
    } else {
        items.join(",")
    }
}

impl DriftReport {
    fn new(drift: &PortDrift) -> Self {
        Self {
            port: drift.port.to_string(),
            missing: drift.missing.iter().map(describe).collect(),
            unexpected: drift.unexpected.iter().map(describe).collect(),
        }
    }

    fn row(&self) -> DriftRow {
        DriftRow {
            port: self.port.clone(),
            missing: join_or_dash(&self.missing),
            unexpected: join_or_dash(&self.unexpected),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    registry: &SwitchRegistry,
    args: AuditArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut ports = args
        .ports
        .iter()
        .map(|raw| util::parse_port(raw))
        .collect::<Result<Vec<Port>, _>>()?;

    let peer = args.peers_of.as_deref().map(util::parse_port).transpose()?;
    if let Some(ref peer) = peer {
        if !ports.contains(peer) {
            ports.push(peer.clone());
        }
    }

    let expected = match args.expected {
        Some(ref path) => {
            let reports: Vec<PortReport> = util::read_document(path)?;
            let expected = util::port_networks(&reports)?;
            for port in expected.keys() {
                if !ports.contains(port) {
                    ports.push(port.clone());
                }
            }
            Some(expected)
        }
        None => None,
    };

    let actual = Auditor::new(registry).port_networks(&ports).await?;

    // ── Peers of one port ──
    if let Some(peer) = peer {
        let peers: Vec<String> = Auditor::ports_on_same_network(&peer, &actual)
            .iter()
            .map(ToString::to_string)
            .collect();
        let out = output::render_list(
            &global.output,
            &peers,
            |p| PeerRow { port: p.clone() },
            Clone::clone,
        )?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    // ── Drift against an expected state ──
    if let Some(expected) = expected {
        let drift: Vec<DriftReport> = Auditor::drift(&expected, &actual)
            .iter()
            .map(DriftReport::new)
            .collect();
        let out = output::render_list(&global.output, &drift, DriftReport::row, |d| {
            d.port.clone()
        })?;
        output::print_output(&out, global.quiet);
        if !drift.is_empty() {
            return Err(CliError::Drift { ports: drift.len() });
        }
        return Ok(());
    }

    // ── Ports grouped by VLAN ──
    if args.by_vlan {
        let groups: Vec<VlanGroup> = ports_by_vlan(&actual)
            .into_iter()
            .map(|(vlan, ports)| VlanGroup {
                vlan: vlan.to_string(),
                ports: ports.iter().map(ToString::to_string).collect(),
            })
            .collect();
        let out = output::render_list(
            &global.output,
            &groups,
            |g| VlanGroupRow {
                vlan: g.vlan.clone(),
                ports: g.ports.join(","),
            },
            |g| g.vlan.clone(),
        )?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let reports = util::port_reports(&actual);
    let out = output::render_list(&global.output, &reports, PortReport::row, |r| r.port.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Port-network auditor ──
//
// Reads live VLAN state back from the switches. Ports are batched per
// switch: exactly one session per distinct switch, opened in the order the
// switches first appear in the request.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::channel::VlanId;
use crate::error::CoreError;
use crate::model::Port;
use crate::registry::SwitchRegistry;
use crate::switch::{PortNetworks, PortVlan, Session};

/// Difference between desired and observed VLANs on one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortDrift {
    pub port: Port,
    /// Expected but not configured on the device.
    pub missing: Vec<PortVlan>,
    /// Configured on the device but not expected.
    pub unexpected: Vec<PortVlan>,
}

#[derive(Debug, Clone, Copy)]
pub struct Auditor<'a> {
    registry: &'a SwitchRegistry,
}

impl<'a> Auditor<'a> {
    pub fn new(registry: &'a SwitchRegistry) -> Self {
        Self { registry }
    }

    /// Live VLANs of every port in `ports`, one entry per port.
    ///
    /// Every session that was opened is disconnected, even when a later
    /// switch fails; the first error wins.
    pub async fn port_networks(&self, ports: &[Port]) -> Result<PortNetworks, CoreError> {
        let mut by_switch: IndexMap<&str, Vec<Port>> = IndexMap::new();
        for port in ports {
            by_switch.entry(port.owner.as_str()).or_default().push(port.clone());
        }

        let mut sessions: Vec<Box<dyn Session>> = Vec::with_capacity(by_switch.len());
        let mut merged = PortNetworks::new();
        let mut failure = None;

        for (label, group) in &by_switch {
            let opened = match self.registry.get(label) {
                Ok(switch) => switch.session().await,
                Err(err) => Err(err),
            };
            let mut session = match opened {
                Ok(session) => session,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            };
            let result = session.get_port_networks(group).await;
            sessions.push(session);
            match result {
                Ok(networks) => {
                    debug!(switch = *label, ports = group.len(), "switch audited");
                    merged.extend(networks);
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        for mut session in sessions {
            if let Err(err) = session.disconnect().await {
                warn!(switch = session.switch_label(), error = %err, "disconnect failed during audit");
                failure.get_or_insert(err);
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(merged),
        }
    }

    /// Every port sharing at least one VLAN with `port`, `port` included.
    /// Empty when `port` was not audited.
    pub fn ports_on_same_network(port: &Port, networks: &PortNetworks) -> BTreeSet<Port> {
        let Some(own) = networks.get(port) else {
            return BTreeSet::new();
        };
        let wanted: BTreeSet<&VlanId> = own.iter().map(|v| &v.vlan).collect();
        networks
            .iter()
            .filter(|(_, vlans)| vlans.iter().any(|v| wanted.contains(&v.vlan)))
            .map(|(other, _)| other.clone())
            .collect()
    }

    /// Per-port differences between `expected` and `actual`, for ports where
    /// they disagree. A port absent from one side counts as having no VLANs.
    pub fn drift(expected: &PortNetworks, actual: &PortNetworks) -> Vec<PortDrift> {
        let ports: BTreeSet<&Port> = expected.keys().chain(actual.keys()).collect();
        let empty = Vec::new();

        let mut report = Vec::new();
        for port in ports {
            let want: BTreeSet<&PortVlan> = expected.get(port).unwrap_or(&empty).iter().collect();
            let have: BTreeSet<&PortVlan> = actual.get(port).unwrap_or(&empty).iter().collect();
            if want == have {
                continue;
            }
            report.push(PortDrift {
                port: port.clone(),
                missing: want.difference(&have).map(|v| (*v).clone()).collect(),
                unexpected: have.difference(&want).map(|v| (*v).clone()).collect(),
            });
        }
        report
    }
}

/// Group an audit result by VLAN: which ports carry each VLAN.
pub fn ports_by_vlan(networks: &PortNetworks) -> BTreeMap<VlanId, Vec<Port>> {
    let mut grouped: BTreeMap<VlanId, Vec<Port>> = BTreeMap::new();
    for (port, vlans) in networks {
        for vlan in vlans {
            grouped.entry(vlan.vlan.clone()).or_default().push(port.clone());
        }
    }
    grouped
}

//! Shared helpers for command handlers.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use switchyard_config::Config;
use switchyard_core::{Port, PortNetworks, PortVlan, SwitchRegistry, VlanId};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Inventory ───────────────────────────────────────────────────────

/// `--config` if given, else the platform config path.
pub fn inventory_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(switchyard_config::config_path)
}

/// Load the inventory and apply the transport flags.
pub fn load_inventory(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = switchyard_config::load_config_from(&inventory_path(global))?;
    if global.insecure {
        cfg.defaults.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.defaults.timeout = timeout;
    }
    Ok(cfg)
}

/// Build the switch registry, failing if the inventory is empty.
pub fn load_registry(global: &GlobalOpts) -> Result<SwitchRegistry, CliError> {
    let cfg = load_inventory(global)?;
    if cfg.switches.is_empty() {
        return Err(CliError::NoConfig {
            path: inventory_path(global).display().to_string(),
        });
    }
    Ok(switchyard_config::build_registry(&cfg)?)
}

// ── Arguments ───────────────────────────────────────────────────────

/// Parse `<switch>:<port>`. Port labels may themselves contain `:`.
pub fn parse_port(raw: &str) -> Result<Port, CliError> {
    match raw.split_once(':') {
        Some((owner, label)) if !owner.is_empty() && !label.is_empty() => {
            Ok(Port::new(owner, label))
        }
        _ => Err(CliError::Validation {
            field: "port".into(),
            reason: format!("expected <switch>:<port>, got {raw:?}"),
        }),
    }
}

/// Read a JSON or YAML document, picked by file extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        Ok(serde_yaml::from_str(&contents)?)
    } else {
        Ok(serde_json::from_str(&contents)?)
    }
}

// ── Port reports ────────────────────────────────────────────────────

/// Serializable view of one port's VLANs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortReport {
    pub port: String,
    #[serde(default)]
    pub native: Option<String>,
    #[serde(default)]
    pub tagged: Vec<String>,
}

#[derive(Tabled)]
pub struct PortRow {
    #[tabled(rename = "Port")]
    pub port: String,
    #[tabled(rename = "Native")]
    pub native: String,
    #[tabled(rename = "Tagged")]
    pub tagged: String,
}

impl PortReport {
    pub fn new(port: &Port, vlans: &[PortVlan]) -> Self {
        let mut native = None;
        let mut tagged = Vec::new();
        for vlan in vlans {
            if vlan.channel.is_native() {
                native = Some(vlan.vlan.to_string());
            } else {
                tagged.push(vlan.vlan.to_string());
            }
        }
        Self {
            port: port.to_string(),
            native,
            tagged,
        }
    }

    pub fn row(&self) -> PortRow {
        PortRow {
            port: self.port.clone(),
            native: self.native.clone().unwrap_or_else(|| "-".into()),
            tagged: if self.tagged.is_empty() {
                "-".into()
            } else {
                self.tagged.join(",")
            },
        }
    }
}

/// Flatten audit results for rendering, in port order.
pub fn port_reports(networks: &PortNetworks) -> Vec<PortReport> {
    networks
        .iter()
        .map(|(port, vlans)| PortReport::new(port, vlans))
        .collect()
}

/// Rebuild port VLANs from reports, e.g. an `--expected` file.
pub fn port_networks(reports: &[PortReport]) -> Result<PortNetworks, CliError> {
    let vlan = |raw: &str| -> Result<VlanId, CliError> {
        raw.parse().map_err(|e| CliError::Validation {
            field: "vlan".into(),
            reason: format!("{e}"),
        })
    };
    let mut networks = PortNetworks::new();
    for report in reports {
        let mut vlans = Vec::with_capacity(report.tagged.len() + 1);
        if let Some(native) = &report.native {
            vlans.push(PortVlan::native(vlan(native)?));
        }
        for tagged in &report.tagged {
            vlans.push(PortVlan::tagged(vlan(tagged)?));
        }
        networks.insert(parse_port(&report.port)?, vlans);
    }
    Ok(networks)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn port_argument_splits_on_first_colon() {
        let port = parse_port("brocade-01:104/0/18").unwrap();
        assert_eq!(port, Port::new("brocade-01", "104/0/18"));
        assert!(parse_port("Gi0/1").is_err());
        assert!(parse_port(":Gi0/1").is_err());
    }

    #[test]
    fn reports_keep_native_apart_from_tagged() {
        let port = Port::new("leaf-3", "Ethernet1/4");
        let vlans = vec![
            PortVlan::native("23".parse().unwrap()),
            PortVlan::tagged("100".parse().unwrap()),
            PortVlan::tagged("101".parse().unwrap()),
        ];
        let report = PortReport::new(&port, &vlans);
        assert_eq!(report.native.as_deref(), Some("23"));
        assert_eq!(report.tagged, ["100", "101"]);
        assert_eq!(report.row().tagged, "100,101");

        let rebuilt = port_networks(&[report]).unwrap();
        assert_eq!(rebuilt.get(&port), Some(&vlans));
    }

    #[test]
    fn expected_vlans_must_be_numeric() {
        let report = PortReport {
            port: "leaf-3:Ethernet1/4".into(),
            native: Some("blue".into()),
            tagged: Vec::new(),
        };
        assert!(matches!(
            port_networks(&[report]),
            Err(CliError::Validation { .. })
        ));
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use super::mac::MacAddress;
use super::network::NetworkAttachment;

/// A physical switch port. Labels are only unique within one switch, so a
/// port is identified by its owner and label together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Port {
    /// Label of the owning switch.
    pub owner: String,
    /// Driver-meaningful port name, e.g. `104/0/18` or `Gi0/1`.
    pub label: String,
}

impl Port {
    pub fn new(owner: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.label)
    }
}

/// A network interface on a node, optionally wired to one switch port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nic {
    pub label: String,
    pub mac: MacAddress,
    /// Label of the node the NIC is installed in.
    pub node: String,
    #[serde(default)]
    pub port: Option<Port>,
    #[serde(default)]
    pub attachments: Vec<NetworkAttachment>,
}

impl Nic {
    pub fn new(node: impl Into<String>, label: impl Into<String>, mac: impl AsRef<str>) -> Self {
        Self {
            label: label.into(),
            mac: MacAddress::new(mac),
            node: node.into(),
            port: None,
            attachments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: Port) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: NetworkAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_display_includes_owner() {
        assert_eq!(Port::new("brocade-01", "104/0/18").to_string(), "brocade-01:104/0/18");
    }

    #[test]
    fn ports_order_by_switch_then_label() {
        let mut ports = vec![Port::new("b", "1"), Port::new("a", "2"), Port::new("a", "1")];
        ports.sort();
        assert_eq!(ports, vec![Port::new("a", "1"), Port::new("a", "2"), Port::new("b", "1")]);
    }
}

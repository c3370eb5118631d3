use serde::{Deserialize, Serialize};

use crate::channel::Channel;

/// A link-layer segment. `network_id` is the driver-level VLAN id and means
/// nothing to humans; `label` is what operators see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub label: String,
    pub network_id: String,
    #[serde(default = "default_allocated")]
    pub allocated: bool,
}

fn default_allocated() -> bool {
    true
}

impl Network {
    pub fn new(label: impl Into<String>, network_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            network_id: network_id.into(),
            allocated: true,
        }
    }
}

/// A network currently attached to a NIC on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAttachment {
    pub channel: Channel,
    pub network: Network,
}

// ── Pending networking changes ──
//
// A `NetworkingAction` is the allocator's request; `PortChange` is what a
// driver actually has to do. Planning is pure, so every invariant is
// checked before a session is opened.

use serde::{Deserialize, Serialize};

use super::network::Network;
use super::port::{Nic, Port};
use crate::channel::{Channel, VlanId};
use crate::error::{CoreError, InvariantViolation};

/// "This NIC's channel should now carry `new_network`, or nothing."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkingAction {
    pub nic: Nic,
    /// Channel in its persisted string form; validated by [`plan`](Self::plan).
    pub channel: String,
    #[serde(default)]
    pub new_network: Option<Network>,
}

/// The device-level change an action resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortChange {
    SetNative { vlan: VlanId },
    ClearNative,
    AddTagged { vlan: VlanId },
    RemoveTagged { vlan: VlanId },
}

impl NetworkingAction {
    pub fn new(nic: Nic, channel: impl Into<String>, new_network: Option<Network>) -> Self {
        Self {
            nic,
            channel: channel.into(),
            new_network,
        }
    }

    /// Validate the channel against the target network and decide what to do.
    pub fn plan(&self) -> Result<PortChange, InvariantViolation> {
        let channel: Channel = self.channel.parse()?;
        let change = match (channel, &self.new_network) {
            (Channel::Native, Some(network)) => PortChange::SetNative {
                vlan: network_vlan(network)?,
            },
            (Channel::Native, None) => PortChange::ClearNative,
            (Channel::Tagged(vlan), Some(network)) => {
                if vlan.as_str() != network.network_id {
                    return Err(InvariantViolation::ChannelNetworkMismatch {
                        channel: self.channel.clone(),
                        network: network.label.clone(),
                        network_id: network.network_id.clone(),
                    });
                }
                PortChange::AddTagged { vlan }
            }
            (Channel::Tagged(vlan), None) => PortChange::RemoveTagged { vlan },
        };
        Ok(change)
    }

    /// The switch port the NIC is wired to.
    pub fn port(&self) -> Result<&Port, CoreError> {
        self.nic.port.as_ref().ok_or_else(|| CoreError::NicNotConnected {
            nic: format!("{}/{}", self.nic.node, self.nic.label),
        })
    }

    /// VLAN of the network the NIC's native channel carries right now,
    /// according to its attachment records.
    pub fn current_native(&self) -> Option<&str> {
        self.nic
            .attachments
            .iter()
            .find(|attachment| attachment.channel.is_native())
            .map(|attachment| attachment.network.network_id.as_str())
    }
}

fn network_vlan(network: &Network) -> Result<VlanId, InvariantViolation> {
    network
        .network_id
        .parse()
        .map_err(|_| InvariantViolation::InvalidNetworkId {
            network: network.label.clone(),
            network_id: network.network_id.clone(),
        })
}

// Brocade NOS switches over the REST/XML API.
//
// The API is stateless, so the switch is its own session and
// `disconnect` has nothing to release.

use async_trait::async_trait;
use switchyard_api::{BrocadeClient, TransportConfig};
use tracing::info;

use super::params::BrocadeParams;
use super::{PortNetworks, PortVlan, Session, ensure_owned};
use crate::error::CoreError;
use crate::model::{NetworkingAction, Port, PortChange};

#[derive(Debug, Clone)]
pub struct BrocadeSwitch {
    label: String,
    client: BrocadeClient,
}

impl BrocadeSwitch {
    pub fn new(label: &str, params: BrocadeParams, transport: &TransportConfig) -> Result<Self, CoreError> {
        let client = BrocadeClient::new(
            params.hostname,
            params.interface_type,
            params.credentials,
            transport,
        )?;
        Ok(Self::with_client(label, client))
    }

    pub fn with_client(label: &str, client: BrocadeClient) -> Self {
        Self {
            label: label.to_owned(),
            client,
        }
    }

    pub fn client(&self) -> &BrocadeClient {
        &self.client
    }
}

#[async_trait]
impl Session for BrocadeSwitch {
    fn switch_label(&self) -> &str {
        &self.label
    }

    async fn apply_networking(&mut self, action: &NetworkingAction) -> Result<(), CoreError> {
        let change = action.plan()?;
        let port = action.port()?;
        ensure_owned(&self.label, port)?;
        let interface = port.label.as_str();

        match &change {
            PortChange::SetNative { vlan } => {
                self.client.set_native_vlan(interface, vlan.as_str()).await?;
            }
            PortChange::ClearNative => self.client.remove_native_vlan(interface).await?,
            PortChange::AddTagged { vlan } => {
                self.client.add_vlan_to_trunk(interface, vlan.as_str()).await?;
            }
            PortChange::RemoveTagged { vlan } => {
                self.client.remove_vlan_from_trunk(interface, vlan.as_str()).await?;
            }
        }

        info!(switch = %self.label, port = interface, ?change, "networking action applied");
        Ok(())
    }

    async fn get_port_networks(&mut self, ports: &[Port]) -> Result<PortNetworks, CoreError> {
        let mut networks = PortNetworks::new();
        for port in ports {
            ensure_owned(&self.label, port)?;
            let trunk = self.client.get_trunk(&port.label).await?;
            networks.insert(port.clone(), PortVlan::from_trunk(&trunk)?);
        }
        Ok(networks)
    }

    async fn disconnect(&mut self) -> Result<(), CoreError> {
        Ok(())
    }
}

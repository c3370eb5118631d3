// In-memory switch.
//
// Keeps per-port VLAN state behind a shared lock so every session on the
// same switch sees the same "device". Used for dry runs of an inventory
// and by tests that exercise the reconciler and auditor.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use switchyard_api::TrunkState;
use tracing::info;

use super::{PortNetworks, PortVlan, Session, ensure_owned};
use crate::error::CoreError;
use crate::model::{NetworkingAction, Port, PortChange};

#[derive(Debug, Default)]
struct MockState {
    ports: BTreeMap<String, TrunkState>,
    sessions_opened: usize,
}

#[derive(Debug, Clone)]
pub struct MockSwitch {
    label: String,
    hostname: String,
    state: Arc<Mutex<MockState>>,
}

impl MockSwitch {
    pub fn new(label: &str, hostname: impl Into<String>) -> Self {
        Self {
            label: label.to_owned(),
            hostname: hostname.into(),
            state: Arc::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Preload a port's VLANs.
    #[must_use]
    pub fn with_port(self, label: impl Into<String>, state: TrunkState) -> Self {
        self.lock().ports.insert(label.into(), state);
        self
    }

    /// Current VLANs of a port; unconfigured ports are empty.
    pub fn port_state(&self, label: &str) -> TrunkState {
        self.lock().ports.get(label).cloned().unwrap_or_default()
    }

    /// Number of sessions opened on this switch so far.
    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    pub(crate) fn open(&self) -> Self {
        self.lock().sessions_opened += 1;
        self.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Session for MockSwitch {
    fn switch_label(&self) -> &str {
        &self.label
    }

    async fn apply_networking(&mut self, action: &NetworkingAction) -> Result<(), CoreError> {
        let change = action.plan()?;
        let port = action.port()?;
        ensure_owned(&self.label, port)?;

        {
            let mut state = self.lock();
            let trunk = state.ports.entry(port.label.clone()).or_default();
            match &change {
                PortChange::SetNative { vlan } => {
                    trunk.native_vlan = Some(vlan.to_string());
                    trunk.allowed_vlans.retain(|v| v != vlan.as_str());
                }
                PortChange::ClearNative => trunk.native_vlan = None,
                PortChange::AddTagged { vlan } => {
                    if !trunk.allowed_vlans.iter().any(|v| v == vlan.as_str()) {
                        trunk.allowed_vlans.push(vlan.to_string());
                    }
                }
                PortChange::RemoveTagged { vlan } => {
                    trunk.allowed_vlans.retain(|v| v != vlan.as_str());
                }
            }
        }

        info!(switch = %self.label, port = %port.label, ?change, "networking action applied");
        Ok(())
    }

    async fn get_port_networks(&mut self, ports: &[Port]) -> Result<PortNetworks, CoreError> {
        let mut networks = PortNetworks::new();
        for port in ports {
            ensure_owned(&self.label, port)?;
            let trunk = self.port_state(&port.label);
            networks.insert(port.clone(), PortVlan::from_trunk(&trunk)?);
        }
        Ok(networks)
    }

    async fn revert_port(&mut self, port: &Port) -> Result<(), CoreError> {
        ensure_owned(&self.label, port)?;
        self.lock().ports.remove(&port.label);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), CoreError> {
        Ok(())
    }
}

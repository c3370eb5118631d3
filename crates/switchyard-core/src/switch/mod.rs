// ── Switch capability contract ──
//
// Every driver validates its parameters statically and hands out sessions.
// A session applies networking actions and reads port state back. Drivers
// form a closed set selected by `SwitchKind`; sessions are trait objects so
// the reconciler and auditor never care which protocol is underneath.

mod brocade;
mod console;
mod mock;
pub mod params;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use switchyard_api::{TransportConfig, TrunkState};

use crate::channel::{Channel, VlanId};
use crate::error::{CoreError, InvariantViolation, ValidationError};
use crate::model::{NetworkingAction, Port};

pub use brocade::BrocadeSwitch;
pub use console::{ConsoleDriverSession, ConsoleSwitch};
pub use mock::MockSwitch;
pub use params::SwitchParams;

/// Prefix of the type URIs the allocator API uses for switch drivers.
pub const TYPE_URI_BASE: &str = "http://schema.massopencloud.org/haas/v0/switches/";

// ── SwitchKind ──────────────────────────────────────────────────────

/// Driver discriminant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SwitchKind {
    #[serde(alias = "http://schema.massopencloud.org/haas/v0/switches/nexus")]
    Nexus,
    #[serde(alias = "http://schema.massopencloud.org/haas/v0/switches/powerconnect55xx")]
    PowerConnect55xx,
    #[serde(alias = "http://schema.massopencloud.org/haas/v0/switches/brocade")]
    Brocade,
    #[serde(alias = "http://schema.massopencloud.org/haas/v0/switches/mock")]
    Mock,
}

impl SwitchKind {
    /// Resolve either the short name (`nexus`) or the full type URI.
    pub fn from_type(raw: &str) -> Option<Self> {
        raw.strip_prefix(TYPE_URI_BASE).unwrap_or(raw).parse().ok()
    }

    pub fn type_uri(self) -> String {
        format!("{TYPE_URI_BASE}{self}")
    }
}

/// Check a parameter set against a driver's schema. Never touches the network.
pub fn validate(kind: SwitchKind, parameters: &Map<String, Value>) -> Result<(), ValidationError> {
    SwitchParams::parse(kind, parameters).map(drop)
}

// ── Port state ──────────────────────────────────────────────────────

/// One VLAN configured on a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortVlan {
    pub channel: Channel,
    pub vlan: VlanId,
}

impl PortVlan {
    pub fn native(vlan: VlanId) -> Self {
        Self {
            channel: Channel::Native,
            vlan,
        }
    }

    pub fn tagged(vlan: VlanId) -> Self {
        Self {
            channel: Channel::Tagged(vlan.clone()),
            vlan,
        }
    }

    /// Native entry first, then the tagged VLANs in device order.
    pub fn from_trunk(state: &TrunkState) -> Result<Vec<Self>, CoreError> {
        let parse = |raw: &str| -> Result<VlanId, CoreError> {
            raw.parse().map_err(|e| {
                CoreError::Driver(switchyard_api::Error::protocol(format!("switch reported {e}")))
            })
        };
        let mut vlans = Vec::with_capacity(state.allowed_vlans.len() + 1);
        if let Some(native) = &state.native_vlan {
            vlans.push(Self::native(parse(native)?));
        }
        for tagged in &state.allowed_vlans {
            vlans.push(Self::tagged(parse(tagged)?));
        }
        Ok(vlans)
    }
}

/// Observed VLANs per port. Exactly one entry per requested port.
pub type PortNetworks = BTreeMap<Port, Vec<PortVlan>>;

// ── Session ─────────────────────────────────────────────────────────

/// A handle on one switch, scoped to one reconciliation or audit batch.
///
/// Sessions are exclusive: the caller must not run two of them against the
/// same switch at once.
#[async_trait]
pub trait Session: Send {
    /// Label of the switch this session talks to.
    fn switch_label(&self) -> &str;

    /// Make the NIC's channel carry `action.new_network`, or clear it.
    async fn apply_networking(&mut self, action: &NetworkingAction) -> Result<(), CoreError>;

    /// Read the VLANs configured on each of `ports` from the live device.
    async fn get_port_networks(&mut self, ports: &[Port]) -> Result<PortNetworks, CoreError>;

    /// Strip every VLAN from `port`.
    async fn revert_port(&mut self, port: &Port) -> Result<(), CoreError> {
        Err(CoreError::Unsupported {
            operation: format!("revert_port({})", port.label),
            switch: self.switch_label().to_owned(),
        })
    }

    /// Release the connection. Safe to call more than once.
    async fn disconnect(&mut self) -> Result<(), CoreError>;
}

/// Fail with `ForeignPort` unless `port` belongs to `switch`.
pub(crate) fn ensure_owned(switch: &str, port: &Port) -> Result<(), InvariantViolation> {
    if port.owner == switch {
        Ok(())
    } else {
        Err(InvariantViolation::ForeignPort {
            port: port.label.clone(),
            owner: port.owner.clone(),
            switch: switch.to_owned(),
        })
    }
}

// ── Switch ──────────────────────────────────────────────────────────

/// Driver state of a registered switch.
#[derive(Debug, Clone)]
pub enum SwitchDriver {
    Console(ConsoleSwitch),
    Brocade(BrocadeSwitch),
    Mock(MockSwitch),
}

/// A physical switch and the driver that manages it.
#[derive(Debug, Clone)]
pub struct Switch {
    label: String,
    kind: SwitchKind,
    driver: SwitchDriver,
}

impl Switch {
    /// Validate `parameters` for `kind` and build the driver.
    pub fn new(
        label: impl Into<String>,
        kind: SwitchKind,
        parameters: &Map<String, Value>,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let label = label.into();
        let params =
            SwitchParams::parse(kind, parameters).map_err(|source| CoreError::Validation {
                driver: kind.to_string(),
                source,
            })?;
        let driver = match params {
            SwitchParams::Nexus(p) => SwitchDriver::Console(ConsoleSwitch::nexus(&label, p, transport)),
            SwitchParams::PowerConnect(p) => {
                SwitchDriver::Console(ConsoleSwitch::powerconnect(&label, p, transport))
            }
            SwitchParams::Brocade(p) => SwitchDriver::Brocade(BrocadeSwitch::new(&label, p, transport)?),
            SwitchParams::Mock(p) => SwitchDriver::Mock(MockSwitch::new(&label, p.hostname)),
        };
        Ok(Self { label, kind, driver })
    }

    /// Wrap an already-built driver.
    pub fn from_driver(label: impl Into<String>, kind: SwitchKind, driver: SwitchDriver) -> Self {
        Self {
            label: label.into(),
            kind,
            driver,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> SwitchKind {
        self.kind
    }

    pub fn driver(&self) -> &SwitchDriver {
        &self.driver
    }

    /// Open a session: a console login, or a handle on the stateless driver.
    pub async fn session(&self) -> Result<Box<dyn Session>, CoreError> {
        match &self.driver {
            SwitchDriver::Console(console) => Ok(Box::new(console.connect().await?)),
            SwitchDriver::Brocade(brocade) => Ok(Box::new(brocade.clone())),
            SwitchDriver::Mock(mock) => Ok(Box::new(mock.open())),
        }
    }
}

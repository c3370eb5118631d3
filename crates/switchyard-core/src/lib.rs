// switchyard-core: Switch drivers and network reconciliation on top of switchyard-api.

//! Maps the allocator's networking records onto physical switches.
//!
//! A [`NetworkingAction`] says which network a NIC's [`Channel`] should
//! carry. The [`Reconciler`] plans it, finds the owning [`Switch`] in a
//! [`SwitchRegistry`] and applies it through a driver [`Session`]. The
//! [`Auditor`] reads the resulting port state back, one session per switch.

pub mod audit;
pub mod channel;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod switch;

// ── Primary re-exports ──────────────────────────────────────────────
pub use audit::{Auditor, PortDrift, ports_by_vlan};
pub use channel::{Channel, VlanId};
pub use error::{CoreError, InvariantViolation, ValidationError};
pub use model::{
    MacAddress, Network, NetworkAttachment, NetworkingAction, Nic, Port, PortChange,
};
pub use reconcile::{ActionOutcome, Reconciler};
pub use registry::SwitchRegistry;
pub use switch::{
    BrocadeSwitch, ConsoleDriverSession, ConsoleSwitch, MockSwitch, PortNetworks, PortVlan,
    Session, Switch, SwitchDriver, SwitchKind, validate,
};

// ── Domain records consumed from the allocator ──

mod action;
mod mac;
mod network;
mod port;

pub use action::{NetworkingAction, PortChange};
pub use mac::MacAddress;
pub use network::{Network, NetworkAttachment};
pub use port::{Nic, Port};

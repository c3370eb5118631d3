// ── Core error types ──
//
// Three kinds of failure leave this crate. Invariant violations mean the
// allocator and the switch layer disagree and must never be retried.
// Driver errors wrap `switchyard_api::Error` and are retryable when the
// transport says so. Lookup and validation errors come from bad input.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fatal ────────────────────────────────────────────────────────
    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    // ── Device errors ────────────────────────────────────────────────
    #[error("Switch driver error: {0}")]
    Driver(#[from] switchyard_api::Error),

    #[error("Operation not supported: {operation} on switch {switch}")]
    Unsupported { operation: String, switch: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid parameters for {driver} switch: {source}")]
    Validation {
        driver: String,
        #[source]
        source: ValidationError,
    },

    #[error("Switch not found: {label}")]
    SwitchNotFound { label: String },

    #[error("Switch {label} is already registered")]
    DuplicateSwitch { label: String },

    #[error("NIC {nic} is not connected to a switch port")]
    NicNotConnected { nic: String },
}

impl CoreError {
    /// Returns `true` if resubmitting the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Driver(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// The allocator handed the switch layer something it cannot mean.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("malformed channel {channel:?}, expected vlan/native or vlan/<digits>")]
    MalformedChannel { channel: String },

    #[error("channel {channel} does not match network {network} (VLAN {network_id})")]
    ChannelNetworkMismatch {
        channel: String,
        network: String,
        network_id: String,
    },

    #[error("network {network} has non-numeric VLAN id {network_id:?}")]
    InvalidNetworkId { network: String, network_id: String },

    #[error("port {port} belongs to switch {owner}, not {switch}")]
    ForeignPort {
        port: String,
        owner: String,
        switch: String,
    },
}

/// A switch parameter set that does not fit its driver's schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── Channel addressing ──
//
// A channel names an attachment point on a NIC: the untagged native VLAN
// or one tagged VLAN. The string form is persisted by the allocator, so it
// must round-trip exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

const NATIVE: &str = "vlan/native";
const PREFIX: &str = "vlan/";

// ── VlanId ──────────────────────────────────────────────────────────

/// A VLAN id as the devices spell it: one or more decimal digits.
///
/// Kept as text; leading zeros are significant to the literal comparison
/// between a channel and its network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VlanId(String);

impl VlanId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid(raw: &str) -> bool {
        !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejected VLAN id text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid VLAN id {0:?}")]
pub struct InvalidVlanId(pub String);

impl FromStr for VlanId {
    type Err = InvalidVlanId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(InvalidVlanId(s.to_owned()))
        }
    }
}

impl TryFrom<String> for VlanId {
    type Error = InvalidVlanId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&s) { Ok(Self(s)) } else { Err(InvalidVlanId(s)) }
    }
}

impl From<VlanId> for String {
    fn from(id: VlanId) -> Self {
        id.0
    }
}

// ── Channel ─────────────────────────────────────────────────────────

/// Attachment point on a NIC. `Native` sorts before every tagged channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Channel {
    Native,
    Tagged(VlanId),
}

impl Channel {
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// The VLAN id of a tagged channel.
    pub fn vlan(&self) -> Option<&VlanId> {
        match self {
            Self::Native => None,
            Self::Tagged(id) => Some(id),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str(NATIVE),
            Self::Tagged(id) => write!(f, "{PREFIX}{id}"),
        }
    }
}

impl FromStr for Channel {
    type Err = InvariantViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NATIVE {
            return Ok(Self::Native);
        }
        s.strip_prefix(PREFIX)
            .and_then(|digits| digits.parse().ok())
            .map(Self::Tagged)
            .ok_or_else(|| InvariantViolation::MalformedChannel {
                channel: s.to_owned(),
            })
    }
}

impl TryFrom<String> for Channel {
    type Error = InvariantViolation;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.to_string()
    }
}

impl From<VlanId> for Channel {
    fn from(id: VlanId) -> Self {
        Self::Tagged(id)
    }
}

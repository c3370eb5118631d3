// ── Observed VLAN state of one switch port ──
//
// Both device families report port state in their own format (XML for
// Brocade, `show running-config` text for consoles). Each parser produces
// a `TrunkState` so callers see one shape regardless of the driver.

use strum::{Display, EnumString};

/// VLAN membership of a port as observed live on the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrunkState {
    /// Untagged VLAN, if one is configured.
    pub native_vlan: Option<String>,
    /// Tagged VLANs in device order, without the native VLAN.
    pub allowed_vlans: Vec<String>,
}

impl TrunkState {
    pub fn is_empty(&self) -> bool {
        self.native_vlan.is_none() && self.allowed_vlans.is_empty()
    }
}

/// Switchport mode of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SwitchportMode {
    /// A single untagged VLAN.
    Access,
    /// Multiple tagged VLANs plus an optional native VLAN.
    Trunk,
}

/// Highest usable 802.1Q VLAN id.
pub const MAX_VLAN: u32 = 4094;

/// Expand a device VLAN list such as `1,4001-4003` into individual ids.
///
/// Blank input yields an empty list. Tokens that are neither a number nor a
/// `low-high` range, or that fall outside 1..=4094, are returned as `Err`
/// with the offending token.
pub fn expand_vlan_list(list: &str) -> Result<Vec<String>, String> {
    let vlan_id = |raw: &str, token: &str| -> Result<u32, String> {
        match raw.trim().parse::<u32>() {
            Ok(id) if (1..=MAX_VLAN).contains(&id) => Ok(id),
            _ => Err(token.to_string()),
        }
    };

    let mut vlans = Vec::new();
    for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((low, high)) = token.split_once('-') {
            let low = vlan_id(low, token)?;
            let high = vlan_id(high, token)?;
            if low > high {
                return Err(token.to_string());
            }
            vlans.extend((low..=high).map(|v| v.to_string()));
        } else if token.bytes().all(|b| b.is_ascii_digit()) {
            vlan_id(token, token)?;
            vlans.push(token.to_string());
        } else {
            return Err(token.to_string());
        }
    }
    Ok(vlans)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trip() {
        assert_eq!("trunk".parse::<SwitchportMode>().unwrap(), SwitchportMode::Trunk);
        assert_eq!(SwitchportMode::Access.to_string(), "access");
        assert!("private-vlan".parse::<SwitchportMode>().is_err());
    }

    #[test]
    fn expands_ranges() {
        assert_eq!(
            expand_vlan_list("1,4001-4003, 4050").unwrap(),
            vec!["1", "4001", "4002", "4003", "4050"]
        );
    }

    #[test]
    fn blank_list_is_empty() {
        assert!(expand_vlan_list("").unwrap().is_empty());
        assert!(expand_vlan_list(" , ").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage_tokens() {
        assert_eq!(expand_vlan_list("10,all").unwrap_err(), "all");
        assert_eq!(expand_vlan_list("20-10").unwrap_err(), "20-10");
    }

    #[test]
    fn rejects_ids_outside_the_vlan_range() {
        assert_eq!(expand_vlan_list("1-4294967295").unwrap_err(), "1-4294967295");
        assert_eq!(expand_vlan_list("10,4095").unwrap_err(), "4095");
        assert_eq!(expand_vlan_list("0").unwrap_err(), "0");
        assert_eq!(expand_vlan_list("4094").unwrap(), vec!["4094"]);
    }

    #[test]
    fn empty_state() {
        assert!(TrunkState::default().is_empty());
        let state = TrunkState {
            native_vlan: Some("10".into()),
            allowed_vlans: Vec::new(),
        };
        assert!(!state.is_empty());
    }
}

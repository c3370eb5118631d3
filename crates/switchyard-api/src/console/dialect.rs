// Command dialects for IOS-style switch CLIs.
//
// The session drives the prompt state machine; a dialect only decides which
// lines to type at each step and how to read the interface config back.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::trunk::{TrunkState, expand_vlan_list};

/// Vendor-specific command set used by [`ConsoleSession`](super::ConsoleSession).
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Commands run once at the main prompt after login.
    fn setup(&self) -> Vec<String>;

    fn configure(&self) -> &'static str {
        "configure terminal"
    }

    fn interface(&self, label: &str) -> String {
        format!("interface {label}")
    }

    /// Allow `vlan` as a tagged VLAN on the current trunk port.
    fn enable_vlan(&self, vlan: &str) -> Vec<String>;

    fn disable_vlan(&self, vlan: &str) -> Vec<String>;

    /// Make `new` the native VLAN, replacing `old` when one is attached.
    fn set_native(&self, old: Option<&str>, new: &str) -> Vec<String>;

    /// Detach the native VLAN `current`, if the caller knows one.
    fn disable_native(&self, current: Option<&str>) -> Vec<String>;

    /// Return the current port to its unconfigured trunk state.
    fn revert(&self) -> Vec<String>;

    fn show_interface(&self, label: &str) -> String {
        format!("show running-config interface {label}")
    }

    /// VLAN the device uses as a stand-in for "no native VLAN", if any.
    fn placeholder_vlan(&self) -> Option<&str> {
        None
    }

    fn parse_interface(&self, output: &str) -> Result<TrunkState, Error> {
        parse_running_config(output, self.placeholder_vlan())
    }

    /// Matches the line a device prints when it rejects a command.
    fn error_pattern(&self) -> &Regex {
        &ERROR_LINE
    }
}

/// IOS-style rejection, e.g. `% Invalid input detected at '^' marker.`
static ERROR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*% .*$").expect("valid error line regex"));

// ── Cisco Nexus ──────────────────────────────────────────────────────

/// Cisco Nexus. A trunk port always has a native VLAN, so "no native" is
/// modelled by parking the port on an otherwise unused dummy VLAN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nexus {
    pub dummy_vlan: String,
}

impl Nexus {
    pub fn new(dummy_vlan: impl Into<String>) -> Self {
        Self {
            dummy_vlan: dummy_vlan.into(),
        }
    }
}

impl Dialect for Nexus {
    fn name(&self) -> &'static str {
        "nexus"
    }

    fn setup(&self) -> Vec<String> {
        vec!["terminal length 0".into()]
    }

    fn enable_vlan(&self, vlan: &str) -> Vec<String> {
        vec![
            "switchport".into(),
            "switchport mode trunk".into(),
            format!("switchport trunk allowed vlan add {vlan}"),
        ]
    }

    fn disable_vlan(&self, vlan: &str) -> Vec<String> {
        vec![format!("switchport trunk allowed vlan remove {vlan}")]
    }

    fn set_native(&self, old: Option<&str>, new: &str) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(old) = old {
            lines.extend(self.disable_vlan(old));
        }
        lines.push(format!("switchport trunk native vlan {new}"));
        lines.extend(self.enable_vlan(new));
        lines
    }

    fn disable_native(&self, current: Option<&str>) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(current) = current {
            lines.extend(self.disable_vlan(current));
        }
        lines.push(format!("switchport trunk native vlan {}", self.dummy_vlan));
        lines
    }

    fn revert(&self) -> Vec<String> {
        vec![
            format!("switchport trunk native vlan {}", self.dummy_vlan),
            "switchport trunk allowed vlan none".into(),
        ]
    }

    fn placeholder_vlan(&self) -> Option<&str> {
        Some(&self.dummy_vlan)
    }
}

// ── Dell PowerConnect 55xx ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerConnect;

impl Dialect for PowerConnect {
    fn name(&self) -> &'static str {
        "powerconnect55xx"
    }

    fn setup(&self) -> Vec<String> {
        vec!["terminal datadump".into()]
    }

    fn enable_vlan(&self, vlan: &str) -> Vec<String> {
        vec![format!("switchport trunk allowed vlan add {vlan}")]
    }

    fn disable_vlan(&self, vlan: &str) -> Vec<String> {
        vec![format!("switchport trunk allowed vlan remove {vlan}")]
    }

    fn set_native(&self, _old: Option<&str>, new: &str) -> Vec<String> {
        vec![format!("switchport trunk native vlan {new}")]
    }

    fn disable_native(&self, _current: Option<&str>) -> Vec<String> {
        vec!["switchport trunk native vlan none".into()]
    }

    fn revert(&self) -> Vec<String> {
        vec![
            "switchport trunk native vlan none".into(),
            "switchport trunk allowed vlan remove 1-4093".into(),
        ]
    }
}

// ── Running-config parsing ───────────────────────────────────────────

static NATIVE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*switchport trunk native vlan (\d+)\s*$").expect("native pattern is valid")
});

static ALLOWED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*switchport trunk allowed vlan (?:add )?([0-9][0-9,\-]*)\s*$")
        .expect("allowed pattern is valid")
});

/// Read trunk membership out of `show running-config interface` output.
///
/// The native VLAN is never reported as tagged, and `placeholder` (the
/// Nexus dummy VLAN) is hidden entirely.
pub fn parse_running_config(output: &str, placeholder: Option<&str>) -> Result<TrunkState, Error> {
    let native_vlan = NATIVE_LINE
        .captures_iter(output)
        .last()
        .map(|caps| caps[1].to_string())
        .filter(|vlan| Some(vlan.as_str()) != placeholder);

    let mut allowed_vlans: Vec<String> = Vec::new();
    for caps in ALLOWED_LINE.captures_iter(output) {
        let vlans = expand_vlan_list(&caps[1])
            .map_err(|token| Error::protocol(format!("bad VLAN list entry {token:?}")))?;
        for vlan in vlans {
            let hidden = Some(vlan.as_str()) == placeholder
                || native_vlan.as_deref() == Some(vlan.as_str());
            if !hidden && !allowed_vlans.contains(&vlan) {
                allowed_vlans.push(vlan);
            }
        }
    }

    Ok(TrunkState {
        native_vlan,
        allowed_vlans,
    })
}

/// Dialect chosen at runtime from the switch type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleDialect {
    Nexus(Nexus),
    PowerConnect(PowerConnect),
}

impl Dialect for ConsoleDialect {
    fn name(&self) -> &'static str {
        match self {
            Self::Nexus(d) => d.name(),
            Self::PowerConnect(d) => d.name(),
        }
    }

    fn setup(&self) -> Vec<String> {
        match self {
            Self::Nexus(d) => d.setup(),
            Self::PowerConnect(d) => d.setup(),
        }
    }

    fn enable_vlan(&self, vlan: &str) -> Vec<String> {
        match self {
            Self::Nexus(d) => d.enable_vlan(vlan),
            Self::PowerConnect(d) => d.enable_vlan(vlan),
        }
    }

    fn disable_vlan(&self, vlan: &str) -> Vec<String> {
        match self {
            Self::Nexus(d) => d.disable_vlan(vlan),
            Self::PowerConnect(d) => d.disable_vlan(vlan),
        }
    }

    fn set_native(&self, old: Option<&str>, new: &str) -> Vec<String> {
        match self {
            Self::Nexus(d) => d.set_native(old, new),
            Self::PowerConnect(d) => d.set_native(old, new),
        }
    }

    fn disable_native(&self, current: Option<&str>) -> Vec<String> {
        match self {
            Self::Nexus(d) => d.disable_native(current),
            Self::PowerConnect(d) => d.disable_native(current),
        }
    }

    fn revert(&self) -> Vec<String> {
        match self {
            Self::Nexus(d) => d.revert(),
            Self::PowerConnect(d) => d.revert(),
        }
    }

    fn placeholder_vlan(&self) -> Option<&str> {
        match self {
            Self::Nexus(d) => d.placeholder_vlan(),
            Self::PowerConnect(d) => d.placeholder_vlan(),
        }
    }

    fn error_pattern(&self) -> &Regex {
        match self {
            Self::Nexus(d) => d.error_pattern(),
            Self::PowerConnect(d) => d.error_pattern(),
        }
    }
}

// ── Switch registry ──
//
// The inventory sessions are opened from. Owned by whoever builds it (the
// CLI from its config, tests by hand) and passed by reference to the
// reconciler and auditor.

use indexmap::IndexMap;

use crate::error::CoreError;
use crate::model::Port;
use crate::switch::Switch;

/// Switches keyed by label, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct SwitchRegistry {
    switches: IndexMap<String, Switch>,
}

impl SwitchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, failing on the first duplicate label.
    pub fn from_switches(switches: impl IntoIterator<Item = Switch>) -> Result<Self, CoreError> {
        let mut registry = Self::new();
        for switch in switches {
            registry.insert(switch)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, switch: Switch) -> Result<(), CoreError> {
        if self.switches.contains_key(switch.label()) {
            return Err(CoreError::DuplicateSwitch {
                label: switch.label().to_owned(),
            });
        }
        self.switches.insert(switch.label().to_owned(), switch);
        Ok(())
    }

    pub fn get(&self, label: &str) -> Result<&Switch, CoreError> {
        self.switches
            .get(label)
            .ok_or_else(|| CoreError::SwitchNotFound {
                label: label.to_owned(),
            })
    }

    /// The switch a port belongs to.
    pub fn owner_of(&self, port: &Port) -> Result<&Switch, CoreError> {
        self.get(&port.owner)
    }

    pub fn remove(&mut self, label: &str) -> Option<Switch> {
        self.switches.shift_remove(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Switch> {
        self.switches.values()
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::switch::{MockSwitch, SwitchDriver, SwitchKind};

    fn mock(label: &str) -> Switch {
        Switch::from_driver(label, SwitchKind::Mock, SwitchDriver::Mock(MockSwitch::new(label, "localhost")))
    }

    #[test]
    fn keeps_insertion_order() {
        let registry = SwitchRegistry::from_switches([mock("b"), mock("a"), mock("c")]).unwrap();
        let labels: Vec<&str> = registry.iter().map(Switch::label).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn rejects_duplicates() {
        let mut registry = SwitchRegistry::new();
        registry.insert(mock("sw0")).unwrap();
        let err = registry.insert(mock("sw0")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateSwitch { ref label } if label == "sw0"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_owner() {
        let registry = SwitchRegistry::new();
        let err = registry.owner_of(&Port::new("ghost", "1/0/1")).unwrap_err();
        assert!(matches!(err, CoreError::SwitchNotFound { .. }));
    }
}

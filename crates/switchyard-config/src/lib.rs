//! Switch inventory configuration for switchyard.
//!
//! TOML inventory, environment overrides, per-switch password resolution
//! (env var, keyring, plaintext) and translation into a
//! `switchyard_core::SwitchRegistry`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use switchyard_api::{TlsMode, TransportConfig};
use switchyard_core::{CoreError, Switch, SwitchKind, SwitchRegistry};

/// Service name under which switch passwords live in the system keyring.
pub const KEYRING_SERVICE: &str = "switchyard";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for switch '{switch}'")]
    NoCredentials { switch: String },

    #[error("switch '{label}': {source}")]
    Switch {
        label: String,
        #[source]
        source: CoreError,
    },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level inventory file.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    /// Switches keyed by label.
    #[serde(default)]
    pub switches: BTreeMap<String, SwitchEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-request (REST) and per-prompt (console) timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept self-signed management certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Custom CA for HTTPS management interfaces.
    pub ca_cert: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// One switch of the inventory.
///
/// Everything besides `type`, `password` and `password_env` is passed to
/// the driver as a named parameter and validated against its schema.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwitchEntry {
    /// Driver: short name (`nexus`) or the full type URI.
    #[serde(rename = "type")]
    pub kind: SwitchKind,

    /// Password in plaintext (prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    #[serde(flatten)]
    pub parameters: Map<String, Value>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the inventory path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "switchyard", "switchyard").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("switchyard");
            p.push("switchyard.toml");
            p
        },
        |dirs| dirs.config_dir().join("switchyard.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the inventory from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the inventory from `path` plus `SWITCHYARD_*` environment overrides.
/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading inventory");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SWITCHYARD_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize the inventory to TOML at `path`, creating parent directories.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a switch password: `password_env`, then keyring, then plaintext.
pub fn resolve_password(entry: &SwitchEntry, label: &str) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(ref env_name) = entry.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(keyring_entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{label}/password")) {
        if let Ok(secret) = keyring_entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = entry.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        switch: label.into(),
    })
}

/// Store a switch password in the system keyring.
pub fn store_password(label: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{label}/password"))
        .and_then(|entry| entry.set_password(password.expose_secret()))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Translation to core types ───────────────────────────────────────

/// Transport settings from `[defaults]`.
pub fn transport_config(defaults: &Defaults) -> TransportConfig {
    let tls = if defaults.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = defaults.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };
    TransportConfig {
        tls,
        timeout: Duration::from_secs(defaults.timeout),
    }
}

impl SwitchEntry {
    /// Driver parameters with the resolved password filled in.
    pub fn resolved_parameters(&self, label: &str) -> Result<Map<String, Value>, ConfigError> {
        let password = resolve_password(self, label)?;
        let mut parameters = self.parameters.clone();
        parameters.insert(
            "password".into(),
            Value::String(password.expose_secret().to_owned()),
        );
        Ok(parameters)
    }

    /// Schema check only; no credential lookup beyond the password itself.
    pub fn validate(&self, label: &str) -> Result<(), ConfigError> {
        let parameters = self.resolved_parameters(label)?;
        switchyard_core::validate(self.kind, &parameters).map_err(|source| ConfigError::Switch {
            label: label.into(),
            source: CoreError::Validation {
                driver: self.kind.to_string(),
                source,
            },
        })
    }
}

/// Build the switch registry described by `config`.
pub fn build_registry(config: &Config) -> Result<SwitchRegistry, ConfigError> {
    let transport = transport_config(&config.defaults);
    let mut registry = SwitchRegistry::new();
    for (label, entry) in &config.switches {
        let parameters = entry.resolved_parameters(label)?;
        let switch = Switch::new(label, entry.kind, &parameters, &transport).map_err(|source| {
            ConfigError::Switch {
                label: label.clone(),
                source,
            }
        })?;
        registry.insert(switch).map_err(|source| ConfigError::Switch {
            label: label.clone(),
            source,
        })?;
    }
    Ok(registry)
}

/// An inventory with one switch of each kind, for `config init`.
pub fn sample_config() -> Config {
    let entry = |kind, extra: &[(&str, &str)]| {
        let mut parameters = Map::new();
        parameters.insert("hostname".into(), Value::String("switch.example.org".into()));
        parameters.insert("username".into(), Value::String("admin".into()));
        for (key, value) in extra {
            parameters.insert((*key).into(), Value::String((*value).into()));
        }
        SwitchEntry {
            kind,
            password: None,
            password_env: Some("SWITCH_PASSWORD".into()),
            parameters,
        }
    };

    let mut switches = BTreeMap::new();
    switches.insert("nexus-01".into(), entry(SwitchKind::Nexus, &[("dummy_vlan", "2")]));
    switches.insert("dell-01".into(), entry(SwitchKind::PowerConnect55xx, &[]));
    switches.insert(
        "brocade-01".into(),
        entry(
            SwitchKind::Brocade,
            &[
                ("hostname", "https://switch.example.org"),
                ("interface_type", "TenGigabitEthernet"),
            ],
        ),
    );
    Config {
        defaults: Defaults::default(),
        switches,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    const INVENTORY: &str = r#"
[defaults]
timeout = 10

[switches.brocade-01]
type = "http://schema.massopencloud.org/haas/v0/switches/brocade"
hostname = "https://10.0.0.5"
username = "admin"
password = "plain"
interface_type = "TenGigabitEthernet"

[switches.leaf-3]
type = "nexus"
hostname = "10.0.0.7"
username = "admin"
password = "plain"
dummy_vlan = "2"
"#;

    #[test]
    fn loads_inventory_and_builds_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchyard.toml");
        std::fs::write(&path, INVENTORY).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.timeout, 10);
        assert_eq!(config.switches["brocade-01"].kind, SwitchKind::Brocade);

        let registry = build_registry(&config).unwrap();
        let labels: Vec<&str> = registry.iter().map(Switch::label).collect();
        assert_eq!(labels, vec!["brocade-01", "leaf-3"]);
        assert_eq!(registry.get("leaf-3").unwrap().kind(), SwitchKind::Nexus);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.defaults.timeout, 30);
        assert!(config.switches.is_empty());
    }

    #[test]
    fn schema_errors_name_the_switch() {
        let mut config = Config::default();
        let mut entry = sample_config().switches.remove("nexus-01").unwrap();
        entry.password = Some("pw".into());
        entry.password_env = None;
        entry.parameters.remove("dummy_vlan");
        config.switches.insert("leaf-9".into(), entry);

        match build_registry(&config).unwrap_err() {
            ConfigError::Switch { label, source } => {
                assert_eq!(label, "leaf-9");
                assert!(source.to_string().contains("dummy_vlan"), "{source}");
            }
            other => panic!("expected Switch error, got: {other:?}"),
        }
    }

    #[test]
    fn no_password_anywhere() {
        let entry = SwitchEntry {
            kind: SwitchKind::Mock,
            password: None,
            password_env: Some("SWITCHYARD_TEST_UNSET_PW".into()),
            parameters: Map::new(),
        };
        assert!(matches!(
            resolve_password(&entry, "switchyard-test-no-such-switch"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn env_overrides_file_and_password_env_wins() {
        Jail::expect_with(|jail| {
            jail.create_file("switchyard.toml", INVENTORY)?;
            jail.set_env("SWITCHYARD_DEFAULTS__TIMEOUT", "5");
            jail.set_env("LEAF3_PW", "from-env");

            let mut config = load_config_from(Path::new("switchyard.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.defaults.timeout, 5);

            let entry = config.switches.get_mut("leaf-3").unwrap();
            entry.password_env = Some("LEAF3_PW".into());
            let password = resolve_password(entry, "leaf-3").map_err(|e| e.to_string())?;
            assert_eq!(password.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn transport_from_defaults() {
        let defaults = Defaults {
            insecure: true,
            timeout: 7,
            ..Defaults::default()
        };
        let transport = transport_config(&defaults);
        assert_eq!(transport.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(transport.timeout, Duration::from_secs(7));
    }

    #[test]
    fn sample_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("switchyard.toml");
        save_config(&sample_config(), &path).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.switches.len(), 3);
        assert_eq!(
            config.switches["nexus-01"].parameters["dummy_vlan"],
            Value::String("2".into())
        );
    }
}

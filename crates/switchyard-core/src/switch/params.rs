// ── Driver parameter schemas ──
//
// Every driver takes a flat set of named string parameters. The schema is
// closed: a missing name, an unknown name or a non-string value is
// rejected before anything is persisted or connected. Values with a
// shape of their own (VLAN ids, the Brocade base URL) are checked too.

use serde_json::{Map, Value};
use switchyard_api::Credentials;
use switchyard_api::trunk::MAX_VLAN;
use url::Url;

use super::SwitchKind;
use crate::channel::VlanId;
use crate::error::ValidationError;

const CONSOLE_FIELDS: &[&str] = &["hostname", "username", "password"];
const NEXUS_FIELDS: &[&str] = &["hostname", "username", "password", "dummy_vlan"];
const BROCADE_FIELDS: &[&str] = &["hostname", "username", "password", "interface_type"];

/// Parameters of a console-driven switch without extra settings.
#[derive(Debug, Clone)]
pub struct ConsoleParams {
    pub hostname: String,
    pub credentials: Credentials,
}

#[derive(Debug, Clone)]
pub struct NexusParams {
    pub hostname: String,
    pub credentials: Credentials,
    /// VLAN a port's native channel is parked on when it carries nothing.
    pub dummy_vlan: String,
}

#[derive(Debug, Clone)]
pub struct BrocadeParams {
    /// Base URL of the REST API, scheme included.
    pub hostname: String,
    pub credentials: Credentials,
    /// NOS interface class of the switch's ports (`TenGigabitEthernet`, ...).
    pub interface_type: String,
}

/// Validated, typed parameters for one driver.
#[derive(Debug, Clone)]
pub enum SwitchParams {
    Nexus(NexusParams),
    PowerConnect(ConsoleParams),
    Brocade(BrocadeParams),
    Mock(ConsoleParams),
}

impl SwitchParams {
    pub fn fields(kind: SwitchKind) -> &'static [&'static str] {
        match kind {
            SwitchKind::Nexus => NEXUS_FIELDS,
            SwitchKind::Brocade => BROCADE_FIELDS,
            SwitchKind::PowerConnect55xx | SwitchKind::Mock => CONSOLE_FIELDS,
        }
    }

    pub fn parse(kind: SwitchKind, parameters: &Map<String, Value>) -> Result<Self, ValidationError> {
        let fields = Self::fields(kind);
        if let Some(extra) = parameters.keys().find(|key| !fields.contains(&key.as_str())) {
            return Err(ValidationError::new(extra, format!("not a {kind} parameter")));
        }
        let get = |name: &str| -> Result<String, ValidationError> {
            match parameters.get(name) {
                Some(Value::String(value)) => Ok(value.clone()),
                Some(other) => Err(ValidationError::new(
                    name,
                    format!("must be a string, got {}", json_type(other)),
                )),
                None => Err(ValidationError::new(name, "missing")),
            }
        };

        let hostname = get("hostname")?;
        let credentials = Credentials::new(get("username")?, get("password")?);
        let params = match kind {
            SwitchKind::Nexus => Self::Nexus(NexusParams {
                hostname,
                credentials,
                dummy_vlan: parse_dummy_vlan(get("dummy_vlan")?)?,
            }),
            SwitchKind::PowerConnect55xx => Self::PowerConnect(ConsoleParams {
                hostname,
                credentials,
            }),
            SwitchKind::Brocade => Self::Brocade(BrocadeParams {
                hostname: parse_base_url(hostname)?,
                credentials,
                interface_type: get("interface_type")?,
            }),
            SwitchKind::Mock => Self::Mock(ConsoleParams {
                hostname,
                credentials,
            }),
        };
        Ok(params)
    }
}

fn parse_dummy_vlan(raw: String) -> Result<String, ValidationError> {
    let in_range = raw
        .parse::<VlanId>()
        .ok()
        .and_then(|vlan| vlan.as_str().parse::<u32>().ok())
        .is_some_and(|id| (1..=MAX_VLAN).contains(&id));
    if !in_range {
        return Err(ValidationError::new(
            "dummy_vlan",
            format!("{raw:?} is not a VLAN id in 1-{MAX_VLAN}"),
        ));
    }
    Ok(raw)
}

/// The Brocade hostname is the REST API base: an `http` or `https` URL.
fn parse_base_url(raw: String) -> Result<String, ValidationError> {
    let url = Url::parse(&raw)
        .map_err(|e| ValidationError::new("hostname", format!("{raw:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::new(
            "hostname",
            format!("{raw:?} must use http or https"),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::new("hostname", format!("{raw:?} has no host")));
    }
    Ok(raw)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

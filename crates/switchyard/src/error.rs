//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use switchyard_config::ConfigError;
use switchyard_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the switch")]
    #[diagnostic(
        code(switchyard::connection_failed),
        help(
            "Check that the management interface is reachable from this host.\n\
             Self-signed HTTPS certificates need --insecure (-k) or defaults.ca_cert."
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{message}")]
    #[diagnostic(
        code(switchyard::timeout),
        help("Increase the timeout with --timeout or defaults.timeout in the inventory.")
    )]
    Timeout { message: String },

    #[error("Switch reported an error: {message}")]
    #[diagnostic(
        code(switchyard::device),
        help("{hint}")
    )]
    Device { message: String, hint: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("No password configured for switch '{switch}'")]
    #[diagnostic(
        code(switchyard::no_credentials),
        help(
            "Store one with: switchyard config set-password {switch}\n\
             Or set password_env / password on the switch entry."
        )
    )]
    NoCredentials { switch: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(switchyard::not_found),
        help("List available items with: switchyard {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Operation '{operation}' is not supported by switch '{switch}'")]
    #[diagnostic(
        code(switchyard::unsupported),
        help("Clear the port through the switch's own management interface.")
    )]
    Unsupported { operation: String, switch: String },

    // ── Request errors ───────────────────────────────────────────────

    #[error("Invariant violation: {message}")]
    #[diagnostic(
        code(switchyard::invariant),
        help(
            "The networking record disagrees with the switch layer.\n\
             Fix the record; retrying the same action cannot succeed."
        )
    )]
    Invariant { message: String },

    #[error("{failed} of {total} networking actions failed")]
    #[diagnostic(
        code(switchyard::actions_failed),
        help("Failed actions are listed above; retryable ones can be resubmitted.")
    )]
    ActionsFailed { failed: usize, total: usize },

    #[error("{ports} port(s) differ from the expected VLANs")]
    #[diagnostic(
        code(switchyard::drift),
        help("Re-apply the pending networking actions for the listed ports.")
    )]
    Drift { ports: usize },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(switchyard::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid parameters for switch '{label}': {reason}")]
    #[diagnostic(
        code(switchyard::invalid_switch),
        help("Run: switchyard switches validate {label}")
    )]
    InvalidSwitch { label: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No switches configured")]
    #[diagnostic(
        code(switchyard::no_config),
        help(
            "Create an inventory with: switchyard config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Inventory already exists at {path}")]
    #[diagnostic(
        code(switchyard::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error("{message}")]
    #[diagnostic(code(switchyard::config))]
    Config { message: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(switchyard::json), help("Check the file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML payload: {0}")]
    #[diagnostic(code(switchyard::yaml), help("Check the file contents and try again."))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Invariant { .. } | Self::ConfigExists { .. } | Self::Drift { .. } => {
                exit_code::CONFLICT
            }
            Self::Validation { .. } | Self::InvalidSwitch { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Invariant(violation) => CliError::Invariant {
                message: violation.to_string(),
            },

            CoreError::Driver(api) => api.into(),

            CoreError::Unsupported { operation, switch } => {
                CliError::Unsupported { operation, switch }
            }

            CoreError::Validation { driver, source } => CliError::Validation {
                field: format!("{driver}.{}", source.field),
                reason: source.reason,
            },

            CoreError::SwitchNotFound { label } => CliError::NotFound {
                resource_type: "switch".into(),
                identifier: label,
                list_command: "switches list".into(),
            },

            CoreError::DuplicateSwitch { label } => CliError::Config {
                message: format!("switch '{label}' is defined twice"),
            },

            CoreError::NicNotConnected { nic } => CliError::Validation {
                field: "nic.port".into(),
                reason: format!("NIC {nic} is not connected to a switch port"),
            },
        }
    }
}

impl From<switchyard_api::Error> for CliError {
    fn from(err: switchyard_api::Error) -> Self {
        use switchyard_api::Error;

        match err {
            Error::Timeout { .. } => CliError::Timeout {
                message: err.to_string(),
            },
            Error::Transport(_) | Error::Io(_) | Error::Tls(_) | Error::ConnectionClosed { .. } => {
                CliError::ConnectionFailed {
                    source: Box::new(err),
                }
            }
            other => {
                let hint = if other.is_transient() {
                    "The failure looks transient; resubmitting the action may succeed."
                } else {
                    "Check the port label and the switch configuration."
                };
                CliError::Device {
                    message: other.to_string(),
                    hint: hint.into(),
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { switch } => CliError::NoCredentials { switch },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Switch { label, source } => match source {
                CoreError::Validation { source, .. } => CliError::InvalidSwitch {
                    label,
                    reason: source.to_string(),
                },
                other => CliError::InvalidSwitch {
                    label,
                    reason: other.to_string(),
                },
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

//! Clap derive structures for the `switchyard` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// switchyard -- apply and audit bare-metal switch port VLANs
#[derive(Debug, Parser)]
#[command(
    name = "switchyard",
    version,
    about = "Reconcile and audit switch port VLANs from the command line",
    long_about = "Operator tooling for a switch inventory.\n\n\
        Validates switch definitions, applies networking actions through the\n\
        matching driver (Brocade REST, Nexus or PowerConnect console) and reads\n\
        port VLANs back for auditing.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Inventory file (defaults to the platform config directory)
    #[arg(long, short = 'c', env = "SWITCHYARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', env = "SWITCHYARD_OUTPUT", default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed management certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request and prompt timeout in seconds (overrides the inventory)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and validate the switch inventory
    #[command(alias = "sw")]
    Switches(SwitchesArgs),

    /// Manage the inventory file and stored passwords
    Config(ConfigArgs),

    /// Apply networking actions from a JSON or YAML file
    Apply(ApplyArgs),

    /// Read port VLANs back from the switches
    Audit(AuditArgs),

    /// Strip every VLAN from a port
    Revert(RevertArgs),
}

// ── Switches ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SwitchesArgs {
    #[command(subcommand)]
    pub command: SwitchesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SwitchesCommand {
    /// List configured switches
    #[command(alias = "ls")]
    List,

    /// Check switch parameters against their driver schema
    Validate {
        /// Only validate this switch
        label: Option<String>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a sample inventory with one switch of each kind
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Store a switch password in the system keyring (read from stdin)
    SetPassword {
        /// Switch label
        switch: String,
    },
}

// ── Apply ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// File holding one networking action or a list of them
    pub file: PathBuf,

    /// Read the touched ports back after applying
    #[arg(long)]
    pub verify: bool,
}

// ── Audit ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Ports to read, as <switch>:<port>
    #[arg(required = true)]
    pub ports: Vec<String>,

    /// List the ports sharing a VLAN with this one instead
    #[arg(long, value_name = "SWITCH:PORT")]
    pub peers_of: Option<String>,

    /// Compare against expected port VLANs from a JSON or YAML file
    #[arg(long, value_name = "FILE", conflicts_with = "peers_of")]
    pub expected: Option<PathBuf>,

    /// Group the audited ports by VLAN
    #[arg(long, conflicts_with_all = ["peers_of", "expected"])]
    pub by_vlan: bool,
}

// ── Revert ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RevertArgs {
    /// Port to clear, as <switch>:<port>
    pub port: String,
}

// In-memory IOS-style switch for tests.
//
// Speaks just enough of the CLI for the console drivers: login, the three
// prompts, trunk VLAN commands and `show running-config interface`. Every
// non-empty line it receives is recorded.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use crate::trunk::expand_vlan_list;

/// VLAN configuration of one port on a [`ScriptedSwitch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortConfig {
    pub native: Option<String>,
    pub allowed: Vec<String>,
}

#[derive(Debug, Default)]
struct DeviceState {
    commands: Vec<String>,
    ports: BTreeMap<String, PortConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Main,
    Config,
    Interface(String),
}

enum Reply {
    Output(String),
    Hangup,
}

/// A fake switch console. Clones share state, so a test can keep one
/// handle for assertions while the driver talks to another.
#[derive(Debug, Clone)]
pub struct ScriptedSwitch {
    hostname: String,
    login: Option<(String, String)>,
    state: Arc<Mutex<DeviceState>>,
}

impl ScriptedSwitch {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            login: None,
            state: Arc::default(),
        }
    }

    /// Require a username/password exchange before the first prompt.
    #[must_use]
    pub fn with_login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some((username.into(), password.into()));
        self
    }

    #[must_use]
    pub fn with_port(self, label: impl Into<String>, config: PortConfig) -> Self {
        self.lock().ports.insert(label.into(), config);
        self
    }

    /// Start a console conversation and return the client end of it.
    pub fn spawn(&self) -> DuplexStream {
        let (client, device) = tokio::io::duplex(64 * 1024);
        let hostname = self.hostname.clone();
        let login = self.login.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let _ = serve(device, hostname, login, state).await;
        });
        client
    }

    /// Every command line received so far, across all conversations.
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    pub fn port(&self, label: &str) -> PortConfig {
        self.lock().ports.get(label).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DeviceState> {
        self.state.lock().expect("scripted switch state poisoned")
    }
}

async fn serve(
    stream: DuplexStream,
    hostname: String,
    login: Option<(String, String)>,
    state: Arc<Mutex<DeviceState>>,
) -> std::io::Result<()> {
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();

    if let Some((username, password)) = login {
        writer
            .write_all(b"\r\nUser Access Verification\r\n\r\nUsername: ")
            .await?;
        let Some(user) = lines.next_line().await? else {
            return Ok(());
        };
        writer.write_all(b"Password: ").await?;
        let Some(pass) = lines.next_line().await? else {
            return Ok(());
        };
        if user.trim() != username || pass.trim() != password {
            writer.write_all(b"\r\n% Authentication failed\r\n").await?;
            writer.shutdown().await?;
            return Ok(());
        }
        writer.write_all(format!("\r\n{hostname}#").as_bytes()).await?;
    }

    let mut mode = Mode::Main;
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if command.is_empty() {
            writer
                .write_all(format!("\r\n{}", prompt(&hostname, &mode)).as_bytes())
                .await?;
            continue;
        }

        let reply = {
            let mut state = state.lock().expect("scripted switch state poisoned");
            state.commands.push(command.to_string());
            step(&mut mode, command, &mut state)
        };
        match reply {
            Reply::Output(output) => {
                let mut text = format!("{command}\r\n");
                if !output.is_empty() {
                    text.push_str(&output);
                    text.push_str("\r\n");
                }
                text.push_str(&prompt(&hostname, &mode));
                writer.write_all(text.as_bytes()).await?;
            }
            Reply::Hangup => {
                writer.shutdown().await?;
                return Ok(());
            }
        }
    }
    Ok(())
}

fn prompt(hostname: &str, mode: &Mode) -> String {
    match mode {
        Mode::Main => format!("{hostname}#"),
        Mode::Config => format!("{hostname}(config)#"),
        Mode::Interface(_) => format!("{hostname}(config-if)#"),
    }
}

fn step(mode: &mut Mode, command: &str, state: &mut DeviceState) -> Reply {
    const INVALID: &str = "% Invalid input detected";

    match (mode.clone(), command) {
        (_, "terminal length 0" | "terminal datadump") => Reply::Output(String::new()),
        (Mode::Main, "exit") => Reply::Hangup,
        (Mode::Config, "exit") | (_, "end") => {
            *mode = Mode::Main;
            Reply::Output(String::new())
        }
        (Mode::Interface(_), "exit") => {
            *mode = Mode::Config;
            Reply::Output(String::new())
        }
        (Mode::Main, "configure terminal") => {
            *mode = Mode::Config;
            Reply::Output(String::new())
        }
        (Mode::Main, show) if show.starts_with("show running-config interface ") => {
            let label = show.trim_start_matches("show running-config interface ").trim();
            Reply::Output(render(label, &state.ports.get(label).cloned().unwrap_or_default()))
        }
        (Mode::Config | Mode::Interface(_), iface) if iface.starts_with("interface ") => {
            let label = iface.trim_start_matches("interface ").trim().to_string();
            *mode = Mode::Interface(label);
            Reply::Output(String::new())
        }
        (Mode::Interface(label), line) => {
            let port = state.ports.entry(label).or_default();
            if apply_port_command(port, line) {
                Reply::Output(String::new())
            } else {
                Reply::Output(INVALID.into())
            }
        }
        _ => Reply::Output(INVALID.into()),
    }
}

fn apply_port_command(port: &mut PortConfig, line: &str) -> bool {
    if line == "switchport" || line == "switchport mode trunk" {
        return true;
    }
    if line == "switchport trunk allowed vlan none" {
        port.allowed.clear();
        return true;
    }
    if line == "switchport trunk native vlan none" {
        port.native = None;
        return true;
    }
    if let Some(list) = line.strip_prefix("switchport trunk allowed vlan add ") {
        let Ok(vlans) = expand_vlan_list(list) else {
            return false;
        };
        for vlan in vlans {
            if !port.allowed.contains(&vlan) {
                port.allowed.push(vlan);
            }
        }
        return true;
    }
    if let Some(list) = line.strip_prefix("switchport trunk allowed vlan remove ") {
        let Ok(vlans) = expand_vlan_list(list) else {
            return false;
        };
        port.allowed.retain(|vlan| !vlans.contains(vlan));
        return true;
    }
    if let Some(vlan) = line.strip_prefix("switchport trunk native vlan ") {
        if vlan.bytes().all(|b| b.is_ascii_digit()) && !vlan.is_empty() {
            port.native = Some(vlan.to_string());
            return true;
        }
    }
    false
}

fn render(label: &str, port: &PortConfig) -> String {
    let mut lines = vec![
        format!("!Command: show running-config interface {label}"),
        String::new(),
        format!("interface {label}"),
        "  switchport mode trunk".to_string(),
    ];
    if let Some(native) = &port.native {
        lines.push(format!("  switchport trunk native vlan {native}"));
    }
    if port.allowed.is_empty() {
        lines.push("  switchport trunk allowed vlan none".to_string());
    } else {
        lines.push(format!("  switchport trunk allowed vlan {}", port.allowed.join(",")));
    }
    lines.join("\r\n")
}

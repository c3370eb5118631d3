#![allow(clippy::unwrap_used)]
// Console drivers against the scripted switch from switchyard-api.

use std::time::Duration;

use pretty_assertions::assert_eq;
use switchyard_api::console::scripted::{PortConfig, ScriptedSwitch};
use switchyard_api::{Console, Credentials, PromptState, TransportConfig};
use switchyard_core::switch::params::{ConsoleParams, NexusParams};
use switchyard_core::{
    Channel, ConsoleSwitch, CoreError, Network, NetworkAttachment, NetworkingAction, Nic, Port,
    PortVlan, Session,
};

// ── Helpers ─────────────────────────────────────────────────────────

const TIMEOUT: Duration = Duration::from_secs(5);

fn credentials() -> Credentials {
    Credentials::new("admin", "secret")
}

fn powerconnect() -> ConsoleSwitch {
    let params = ConsoleParams {
        hostname: "switch1".into(),
        credentials: credentials(),
    };
    ConsoleSwitch::powerconnect("switch1", params, &TransportConfig::default())
}

fn nexus() -> ConsoleSwitch {
    let params = NexusParams {
        hostname: "leaf-3".into(),
        credentials: credentials(),
        dummy_vlan: "2".into(),
    };
    ConsoleSwitch::nexus("leaf-3", params, &TransportConfig::default())
}

fn nic(switch: &str, port: &str) -> Nic {
    Nic::new("node-7", "eth0", "de:ad:be:ef:00:07").with_port(Port::new(switch, port))
}

fn commands_after_setup(device: &ScriptedSwitch) -> Vec<String> {
    device.commands().into_iter().skip(1).collect()
}

// ── Apply ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_native_on_fresh_port() {
    let device = ScriptedSwitch::new("switch1").with_login("admin", "secret");
    let mut session = powerconnect()
        .attach(Console::new(device.spawn(), TIMEOUT))
        .await
        .unwrap();
    assert_eq!(session.main_prompt(), "switch1#");

    let action = NetworkingAction::new(
        nic("switch1", "Gi0/1"),
        "vlan/native",
        Some(Network::new("pxe", "23")),
    );
    session.apply_networking(&action).await.unwrap();

    assert_eq!(session.prompt_state(), PromptState::Config);
    assert_eq!(
        commands_after_setup(&device),
        vec![
            "configure terminal",
            "interface Gi0/1",
            "switchport trunk native vlan 23",
            "exit",
        ]
    );

    session.disconnect().await.unwrap();
    assert_eq!(session.prompt_state(), PromptState::Disconnected);
    let commands = device.commands();
    assert_eq!(&commands[commands.len() - 2..], ["end", "exit"]);
}

#[tokio::test]
async fn test_nexus_native_replace_removes_old_vlan() {
    let device = ScriptedSwitch::new("leaf-3")
        .with_login("admin", "secret")
        .with_port(
            "Ethernet1/7",
            PortConfig {
                native: Some("100".into()),
                allowed: vec!["100".into()],
            },
        );
    let mut session = nexus()
        .attach(Console::new(device.spawn(), TIMEOUT))
        .await
        .unwrap();

    let current = NetworkAttachment {
        channel: Channel::Native,
        network: Network::new("old", "100"),
    };
    let action = NetworkingAction::new(
        nic("leaf-3", "Ethernet1/7").with_attachment(current),
        "vlan/native",
        Some(Network::new("new", "200")),
    );
    session.apply_networking(&action).await.unwrap();

    let port = Port::new("leaf-3", "Ethernet1/7");
    let networks = session.get_port_networks(std::slice::from_ref(&port)).await.unwrap();
    assert_eq!(networks[&port], vec![PortVlan::native("200".parse().unwrap())]);
    session.disconnect().await.unwrap();

    assert!(
        device
            .commands()
            .contains(&"switchport trunk allowed vlan remove 100".to_string())
    );
}

#[tokio::test]
async fn test_tagged_remove_keeps_native() {
    let device = ScriptedSwitch::new("switch1")
        .with_login("admin", "secret")
        .with_port(
            "gi1/0/4",
            PortConfig {
                native: Some("23".into()),
                allowed: vec!["300".into()],
            },
        );
    let mut session = powerconnect()
        .attach(Console::new(device.spawn(), TIMEOUT))
        .await
        .unwrap();

    let action = NetworkingAction::new(nic("switch1", "gi1/0/4"), "vlan/300", None);
    session.apply_networking(&action).await.unwrap();

    let port = Port::new("switch1", "gi1/0/4");
    let networks = session.get_port_networks(std::slice::from_ref(&port)).await.unwrap();
    assert_eq!(networks[&port], vec![PortVlan::native("23".parse().unwrap())]);
    session.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_mismatch_sends_no_commands() {
    let device = ScriptedSwitch::new("switch1").with_login("admin", "secret");
    let mut session = powerconnect()
        .attach(Console::new(device.spawn(), TIMEOUT))
        .await
        .unwrap();

    let action = NetworkingAction::new(
        nic("switch1", "Gi0/1"),
        "vlan/101",
        Some(Network::new("pxe", "102")),
    );
    let err = session.apply_networking(&action).await.unwrap_err();
    assert!(matches!(err, CoreError::Invariant(_)), "got: {err:?}");
    assert!(commands_after_setup(&device).is_empty());
    assert_eq!(session.prompt_state(), PromptState::Main);
}

#[tokio::test]
async fn test_foreign_port_is_rejected() {
    let device = ScriptedSwitch::new("switch1").with_login("admin", "secret");
    let mut session = powerconnect()
        .attach(Console::new(device.spawn(), TIMEOUT))
        .await
        .unwrap();

    let action = NetworkingAction::new(nic("switch2", "Gi0/1"), "vlan/native", None);
    let err = session.apply_networking(&action).await.unwrap_err();
    assert!(matches!(err, CoreError::Invariant(_)), "got: {err:?}");
}

// ── Audit & revert ──────────────────────────────────────────────────

#[tokio::test]
async fn test_get_port_networks_one_entry_per_port() {
    let device = ScriptedSwitch::new("leaf-3")
        .with_login("admin", "secret")
        .with_port(
            "Ethernet1/1",
            PortConfig {
                native: Some("10".into()),
                allowed: vec!["10".into(), "4001".into(), "4025".into()],
            },
        )
        .with_port(
            "Ethernet1/2",
            PortConfig {
                native: Some("2".into()),
                allowed: vec![],
            },
        );
    let mut session = nexus()
        .attach(Console::new(device.spawn(), TIMEOUT))
        .await
        .unwrap();

    let ports = [Port::new("leaf-3", "Ethernet1/1"), Port::new("leaf-3", "Ethernet1/2")];
    let networks = session.get_port_networks(&ports).await.unwrap();
    assert_eq!(networks.len(), 2);
    assert_eq!(
        networks[&ports[0]],
        vec![
            PortVlan::native("10".parse().unwrap()),
            PortVlan::tagged("4001".parse().unwrap()),
            PortVlan::tagged("4025".parse().unwrap()),
        ]
    );
    assert!(networks[&ports[1]].is_empty());
    session.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_revert_port() {
    let device = ScriptedSwitch::new("switch1")
        .with_login("admin", "secret")
        .with_port(
            "gi1/0/9",
            PortConfig {
                native: Some("23".into()),
                allowed: vec!["300".into(), "301".into()],
            },
        );
    let mut session = powerconnect()
        .attach(Console::new(device.spawn(), TIMEOUT))
        .await
        .unwrap();

    session.revert_port(&Port::new("switch1", "gi1/0/9")).await.unwrap();
    session.disconnect().await.unwrap();
    assert_eq!(device.port("gi1/0/9"), PortConfig::default());
}

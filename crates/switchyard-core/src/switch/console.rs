// Console-driven switches (Cisco Nexus, Dell PowerConnect 55xx).
//
// A session is one telnet login. `apply_networking` walks the prompt state
// machine: into the port's interface mode, the dialect's VLAN commands,
// and back out to the config prompt.

use std::time::Duration;

use async_trait::async_trait;
use switchyard_api::console::connect_telnet;
use switchyard_api::{
    Console, ConsoleDialect, ConsoleSession, Credentials, Nexus, PowerConnect, PromptState,
    TransportConfig,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::params::{ConsoleParams, NexusParams};
use super::{PortNetworks, PortVlan, Session, ensure_owned};
use crate::error::CoreError;
use crate::model::{NetworkingAction, Port, PortChange};

/// Connection settings of a console-driven switch.
#[derive(Debug, Clone)]
pub struct ConsoleSwitch {
    label: String,
    hostname: String,
    credentials: Credentials,
    dialect: ConsoleDialect,
    timeout: Duration,
}

impl ConsoleSwitch {
    pub fn nexus(label: &str, params: NexusParams, transport: &TransportConfig) -> Self {
        Self {
            label: label.to_owned(),
            hostname: params.hostname,
            credentials: params.credentials,
            dialect: ConsoleDialect::Nexus(Nexus::new(params.dummy_vlan)),
            timeout: transport.timeout,
        }
    }

    pub fn powerconnect(label: &str, params: ConsoleParams, transport: &TransportConfig) -> Self {
        Self {
            label: label.to_owned(),
            hostname: params.hostname,
            credentials: params.credentials,
            dialect: ConsoleDialect::PowerConnect(PowerConnect),
            timeout: transport.timeout,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn dialect(&self) -> &ConsoleDialect {
        &self.dialect
    }

    /// Telnet to the switch and log in.
    pub async fn connect(&self) -> Result<ConsoleDriverSession<TcpStream>, CoreError> {
        let console = connect_telnet(&self.hostname, self.timeout).await?;
        self.attach(console).await
    }

    /// Log in over an already-open console stream.
    pub async fn attach<S>(&self, console: Console<S>) -> Result<ConsoleDriverSession<S>, CoreError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let session =
            ConsoleSession::open(console, self.dialect.clone(), Some(&self.credentials)).await?;
        info!(switch = %self.label, prompt = session.main_prompt(), "console session opened");
        Ok(ConsoleDriverSession {
            switch: self.label.clone(),
            session,
        })
    }
}

/// An open console login, driven through the [`Session`] contract.
pub struct ConsoleDriverSession<S> {
    switch: String,
    session: ConsoleSession<S, ConsoleDialect>,
}

impl<S> ConsoleDriverSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn prompt_state(&self) -> PromptState {
        self.session.state()
    }

    pub fn main_prompt(&self) -> &str {
        self.session.main_prompt()
    }
}

#[async_trait]
impl<S> Session for ConsoleDriverSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn switch_label(&self) -> &str {
        &self.switch
    }

    async fn apply_networking(&mut self, action: &NetworkingAction) -> Result<(), CoreError> {
        let change = action.plan()?;
        let port = action.port()?;
        ensure_owned(&self.switch, port)?;

        self.session.enter_if_prompt(&port.label).await?;
        match &change {
            PortChange::SetNative { vlan } => {
                self.session
                    .set_native(action.current_native(), vlan.as_str())
                    .await?;
            }
            PortChange::ClearNative => {
                self.session.disable_native(action.current_native()).await?;
            }
            PortChange::AddTagged { vlan } => self.session.enable_vlan(vlan.as_str()).await?,
            PortChange::RemoveTagged { vlan } => self.session.disable_vlan(vlan.as_str()).await?,
        }
        self.session.exit_if_prompt().await?;

        info!(switch = %self.switch, port = %port.label, ?change, "networking action applied");
        Ok(())
    }

    async fn get_port_networks(&mut self, ports: &[Port]) -> Result<PortNetworks, CoreError> {
        let mut networks = PortNetworks::new();
        for port in ports {
            ensure_owned(&self.switch, port)?;
            let trunk = self.session.show_port(&port.label).await?;
            debug!(switch = %self.switch, port = %port.label, ?trunk, "port state read");
            networks.insert(port.clone(), PortVlan::from_trunk(&trunk)?);
        }
        Ok(networks)
    }

    async fn revert_port(&mut self, port: &Port) -> Result<(), CoreError> {
        ensure_owned(&self.switch, port)?;
        self.session.enter_if_prompt(&port.label).await?;
        self.session.revert().await?;
        self.session.exit_if_prompt().await?;
        info!(switch = %self.switch, port = %port.label, "port reverted");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), CoreError> {
        if self.session.state() == PromptState::Disconnected {
            return Ok(());
        }
        self.session.return_to_main().await?;
        self.session.disconnect().await?;
        Ok(())
    }
}

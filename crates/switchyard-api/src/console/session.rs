// Prompt-tracking session over an IOS-style switch console.
//
// The session knows which of the three CLI modes the device is in and
// refuses transitions that do not exist (e.g. entering an interface from
// inside another interface). Those are caller bugs and panic; device and
// transport trouble comes back as `Error`.

use std::sync::LazyLock;

use regex::Regex;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use super::dialect::Dialect;
use super::prompt::Prompts;
use super::stream::Console;
use crate::auth::Credentials;
use crate::error::Error;
use crate::trunk::TrunkState;

static USERNAME_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(user ?name|login):").expect("username pattern is valid"));
static PASSWORD_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)password:").expect("password pattern is valid"));
static FIRST_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("#").expect("first prompt pattern is valid"));

/// CLI mode the device is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Main,
    Config,
    Interface,
    Disconnected,
}

/// An open, logged-in console on one switch.
pub struct ConsoleSession<S, D> {
    console: Console<S>,
    dialect: D,
    prompts: Prompts,
    state: PromptState,
}

impl<S, D> ConsoleSession<S, D>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    D: Dialect,
{
    /// Log in (when `credentials` is given), learn the prompts and run the
    /// dialect's setup commands. The session starts at the main prompt.
    pub async fn open(
        mut console: Console<S>,
        dialect: D,
        credentials: Option<&Credentials>,
    ) -> Result<Self, Error> {
        if let Some(credentials) = credentials {
            login(&mut console, credentials).await?;
        }
        let prompts = Prompts::discover(&mut console).await?;
        debug!(prompt = prompts.main_text(), dialect = dialect.name(), "console session open");

        let mut session = Self {
            console,
            dialect,
            prompts,
            state: PromptState::Main,
        };
        for line in session.dialect.setup() {
            session.command(&line, PromptState::Main).await?;
        }
        Ok(session)
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    pub fn main_prompt(&self) -> &str {
        self.prompts.main_text()
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Enter configuration mode for `interface`, from Main or Config.
    pub async fn enter_if_prompt(&mut self, interface: &str) -> Result<(), Error> {
        assert!(
            matches!(self.state, PromptState::Main | PromptState::Config),
            "cannot enter interface {interface} from {:?}",
            self.state
        );
        if self.state == PromptState::Main {
            let configure = self.dialect.configure();
            self.command(configure, PromptState::Config).await?;
        }
        let line = self.dialect.interface(interface);
        self.command(&line, PromptState::Interface).await?;
        Ok(())
    }

    /// Leave interface configuration, back to the config prompt.
    pub async fn exit_if_prompt(&mut self) -> Result<(), Error> {
        assert_eq!(
            self.state,
            PromptState::Interface,
            "exit_if_prompt outside interface mode"
        );
        self.command("exit", PromptState::Config).await?;
        Ok(())
    }

    pub async fn enable_vlan(&mut self, vlan: &str) -> Result<(), Error> {
        let lines = self.dialect.enable_vlan(vlan);
        self.interface_commands(&lines).await
    }

    pub async fn disable_vlan(&mut self, vlan: &str) -> Result<(), Error> {
        let lines = self.dialect.disable_vlan(vlan);
        self.interface_commands(&lines).await
    }

    /// Set the native VLAN, detaching `old` first where the dialect needs it.
    pub async fn set_native(&mut self, old: Option<&str>, new: &str) -> Result<(), Error> {
        let lines = self.dialect.set_native(old, new);
        self.interface_commands(&lines).await
    }

    pub async fn disable_native(&mut self, current: Option<&str>) -> Result<(), Error> {
        let lines = self.dialect.disable_native(current);
        self.interface_commands(&lines).await
    }

    /// Strip all VLANs from the current interface.
    pub async fn revert(&mut self) -> Result<(), Error> {
        let lines = self.dialect.revert();
        self.interface_commands(&lines).await
    }

    /// Read the trunk configuration of `interface` from the running config.
    pub async fn show_port(&mut self, interface: &str) -> Result<TrunkState, Error> {
        self.return_to_main().await?;
        let line = self.dialect.show_interface(interface);
        let output = self.command(&line, PromptState::Main).await?;
        self.dialect.parse_interface(&output)
    }

    /// Leave any configuration mode.
    pub async fn return_to_main(&mut self) -> Result<(), Error> {
        match self.state {
            PromptState::Interface | PromptState::Config => {
                self.command("end", PromptState::Main).await?;
            }
            PromptState::Main => {}
            PromptState::Disconnected => panic!("console session already disconnected"),
        }
        Ok(())
    }

    /// Log out from the main prompt and close the stream. Idempotent.
    pub async fn disconnect(&mut self) -> Result<(), Error> {
        if self.state == PromptState::Disconnected {
            return Ok(());
        }
        assert_eq!(
            self.state,
            PromptState::Main,
            "disconnect requires the main prompt"
        );
        self.console.send_line("exit").await?;
        self.state = PromptState::Disconnected;
        if let Err(e) = self.console.expect_eof().await {
            warn!(error = %e, "switch did not hang up after exit");
        }
        self.console.shutdown().await?;
        info!(prompt = self.prompts.main_text(), "console session closed");
        Ok(())
    }

    async fn interface_commands(&mut self, lines: &[String]) -> Result<(), Error> {
        assert_eq!(
            self.state,
            PromptState::Interface,
            "port commands require interface mode"
        );
        for line in lines {
            self.command(line, PromptState::Interface).await?;
        }
        Ok(())
    }

    /// Send one line and wait for the prompt of `next`. Returns the output
    /// printed in between, command echo included.
    ///
    /// A device error line before the prompt fails the command with
    /// [`Error::Protocol`]; the session is still at `next` afterwards.
    async fn command(&mut self, line: &str, next: PromptState) -> Result<String, Error> {
        debug!(line, "console command");
        self.console.send_line(line).await?;
        let found = self.console.expect(self.prompts.pattern(next)).await?;
        self.state = next;
        if let Some(rejection) = self.dialect.error_pattern().find(&found.before) {
            let reason = rejection.as_str().trim();
            warn!(line, reason, "switch rejected command");
            return Err(Error::protocol(format!("switch rejected {line:?}: {reason}")));
        }
        Ok(found.before)
    }
}

async fn login<S>(console: &mut Console<S>, credentials: &Credentials) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    console.expect(&USERNAME_PROMPT).await?;
    console.send_line(&credentials.username).await?;
    console.expect(&PASSWORD_PROMPT).await?;
    console.send_line(credentials.password()).await?;
    console.expect(&FIRST_PROMPT).await?;
    Ok(())
}

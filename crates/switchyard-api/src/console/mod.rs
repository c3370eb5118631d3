//! Interactive CLI consoles for Cisco Nexus and Dell PowerConnect switches.
//!
//! [`Console`] is the expect engine over a byte stream, [`ConsoleSession`]
//! tracks which prompt the device is at, and a [`Dialect`] supplies the
//! vendor's command lines.

mod dialect;
mod prompt;
mod session;
mod stream;

#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use dialect::{ConsoleDialect, Dialect, Nexus, PowerConnect, parse_running_config};
pub use prompt::Prompts;
pub use session::{ConsoleSession, PromptState};
pub use stream::{Console, Expected, connect_telnet};

// switchyard-api: Async device protocol clients for HaaS-managed switches

//! Wire-level access to physical switches.
//!
//! - [`brocade`]: Brocade NOS REST/XML interface configuration.
//! - [`console`]: expect-style CLI sessions for Cisco Nexus and Dell
//!   PowerConnect 55xx, over telnet or any async stream.
//!
//! Nothing here knows about networks, NICs or channels. That mapping lives
//! in `switchyard-core`.

pub mod auth;
pub mod brocade;
pub mod console;
pub mod error;
pub mod transport;
pub mod trunk;

pub use auth::Credentials;
pub use brocade::BrocadeClient;
pub use console::{Console, ConsoleDialect, ConsoleSession, Dialect, Nexus, PowerConnect, PromptState};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use trunk::{SwitchportMode, TrunkState};

//! Listener side of the Simple General Broadcaster
//!
//! Accepts one connection at a time, checks the sender against the IP
//! whitelist, reads a single framed message and maps it to a local command.

pub mod data;
pub mod error;
pub mod listener;
pub mod logging;
pub mod router;
pub mod whitelist;

pub use error::{Result, ServerError};
pub use listener::{ConnectionListener, ListenerConfig, Outcome};
pub use router::{CommandLauncher, CommandRouter, CommandTable, RouteOutcome, ShellLauncher};
pub use whitelist::Whitelist;

//! Shared protocol and configuration for the Simple General Broadcaster
//!
//! Provides subnet template enumeration, the `<|...|EOF|>` framing codec, and the
//! settings file used by both the client and the listener.

pub mod error;
pub mod frame;
pub mod network;
pub mod settings;
pub mod subnet;

pub use error::{CoreError, Result};
pub use frame::{Flag, Frame, FrameCodec};
pub use settings::{ClientSettings, ServerSettings, Settings, SettingsLoader};
pub use subnet::{Hosts, SubnetTemplate};

//! Settings file shared by the client and the listener

pub mod loader;
pub mod schema;

pub use loader::SettingsLoader;
pub use schema::{ClientSettings, ServerSettings, Settings};

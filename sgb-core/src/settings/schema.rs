//! Settings schema types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Port both sides use unless told otherwise
pub const DEFAULT_PORT: u16 = 62300;

/// Complete settings file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Broadcaster defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSettings {
    #[serde(default = "default_port")]
    pub default_port: u16,
    #[serde(default = "default_subnet")]
    pub default_subnet: String,
    /// Upper bound on concurrent outbound connection attempts
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_subnet() -> String {
    "192.168.1.0".to_string()
}

fn default_max_in_flight() -> usize {
    256
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            default_port: default_port(),
            default_subnet: default_subnet(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the command table, whitelist and logs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_commands_file")]
    pub commands_file: String,
    #[serde(default = "default_whitelist_file")]
    pub whitelist_file: String,
    #[serde(default = "default_receive_timeout_secs")]
    pub receive_timeout_secs: u64,
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    #[serde(default = "default_max_frame_length")]
    pub max_frame_length: usize,
    /// Content written to a missing command table on startup
    #[serde(default = "default_seed_commands")]
    pub seed_commands: String,
    /// Content written to a missing whitelist on startup
    #[serde(default = "default_seed_whitelist")]
    pub seed_whitelist: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_commands_file() -> String {
    "commands.cfg".to_string()
}

fn default_whitelist_file() -> String {
    "ip-whitelist.cfg".to_string()
}

fn default_receive_timeout_secs() -> u64 {
    10
}

fn default_read_buffer_size() -> usize {
    1024
}

fn default_max_frame_length() -> usize {
    crate::frame::DEFAULT_MAX_FRAME_LENGTH
}

fn default_seed_commands() -> String {
    "# Map a message to a command line: <message> -=> <command>\n# hello -=> echo hello\n"
        .to_string()
}

fn default_seed_whitelist() -> String {
    "# One IPv4 address per line\n127.0.0.1\n".to_string()
}

impl ServerSettings {
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_secs(self.receive_timeout_secs)
    }

    pub fn commands_path(&self) -> PathBuf {
        self.data_dir.join(&self.commands_file)
    }

    pub fn whitelist_path(&self) -> PathBuf {
        self.data_dir.join(&self.whitelist_file)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            data_dir: default_data_dir(),
            commands_file: default_commands_file(),
            whitelist_file: default_whitelist_file(),
            receive_timeout_secs: default_receive_timeout_secs(),
            read_buffer_size: default_read_buffer_size(),
            max_frame_length: default_max_frame_length(),
            seed_commands: default_seed_commands(),
            seed_whitelist: default_seed_whitelist(),
        }
    }
}

//! Error types for protocol and settings operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid subnet template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Frame exceeds {max} bytes without a terminator")]
    FrameTooLong { max: usize },

    #[error("Failed to load settings from {path}: {source}")]
    SettingsLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("No IPv4 address found for the local machine")]
    NoLocalAddress,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn invalid_template(template: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

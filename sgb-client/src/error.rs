//! Error types for broadcasting

use std::net::SocketAddr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Failed to send to {addr}: {source}")]
    SendFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

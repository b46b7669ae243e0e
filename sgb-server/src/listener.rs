//! Sequential connection listener
//!
//! Each accepted connection goes through
//! `Accepted -> WhitelistChecked -> Reading -> {Completed | TimedOut | Rejected}`
//! and is fully handled, reply included, before the next `accept`. Nothing here
//! spawns per-connection tasks.

use crate::error::{Result, ServerError};
use crate::router::CommandRouter;
use crate::whitelist::Whitelist;
use futures_util::{SinkExt, StreamExt};
use sgb_core::{Flag, Frame, FrameCodec, ServerSettings};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

/// Pause after a failed `accept` (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Per-connection limits and the whitelist location
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub whitelist_path: PathBuf,
    /// Ceiling on the read phase of one connection
    pub receive_timeout: Duration,
    pub read_buffer_size: usize,
    pub max_frame_length: usize,
}

impl ListenerConfig {
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            whitelist_path: settings.whitelist_path(),
            receive_timeout: settings.receive_timeout(),
            read_buffer_size: settings.read_buffer_size,
            max_frame_length: settings.max_frame_length,
        }
    }
}

/// How one connection ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Frame read, `OK` sent, cleaned message handed to the router
    Completed { peer: SocketAddr, message: String },
    /// Sender not whitelisted, `BLOCKED` sent
    Blocked { peer: SocketAddr },
    /// No terminator within the receive timeout, `TIMEOUT` sent
    TimedOut { peer: SocketAddr },
    /// Peer went away, sent a malformed or oversized frame, or an I/O error hit
    Failed { peer: SocketAddr, reason: String },
}

pub struct ConnectionListener {
    listener: TcpListener,
    config: ListenerConfig,
    router: CommandRouter,
}

impl ConnectionListener {
    pub async fn bind(
        addr: SocketAddr,
        config: ListenerConfig,
        router: CommandRouter,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            config,
            router,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve connections forever, one at a time
    pub async fn run(&self) -> Result<()> {
        info!("Running server on {}", self.local_addr()?);

        loop {
            debug!("Waiting for a connection...");
            if let Err(e) = self.serve_one().await {
                warn!("Accept failed: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }

    /// Accept one connection and handle it to the end
    ///
    /// Only a failed `accept` is an error; every per-connection problem is
    /// reported through the returned [`Outcome`].
    pub async fn serve_one(&self) -> Result<Outcome> {
        let (stream, peer) = self.listener.accept().await?;
        let outcome = self.handle(stream, peer).await;

        match &outcome {
            Outcome::Completed { peer, message } => {
                info!("Message received from {}: {:?}", peer.ip(), message)
            }
            Outcome::Blocked { peer } => warn!("Connection from {} was blocked.", peer.ip()),
            Outcome::TimedOut { peer } => {
                warn!("Socket from {} timed out, closing connection.", peer.ip())
            }
            Outcome::Failed { peer, reason } => {
                warn!("Connection from {} failed: {}", peer.ip(), reason)
            }
        }

        if let Outcome::Completed { message, .. } = &outcome {
            if let Err(e) = self.router.route(message) {
                error!("Refusing to route {:?}: {}", message, e);
            }
        }

        Ok(outcome)
    }

    async fn handle(&self, stream: TcpStream, peer: SocketAddr) -> Outcome {
        info!("Connection received from {}", peer.ip());

        let mut framed = Framed::with_capacity(
            stream,
            FrameCodec::with_max_length(self.config.max_frame_length),
            self.config.read_buffer_size,
        );

        // Re-read on every connection so edits apply without a restart
        let whitelist = Whitelist::load(&self.config.whitelist_path).unwrap_or_else(|e| {
            error!("{}; blocking all senders", e);
            Whitelist::default()
        });

        if !whitelist.contains(peer.ip()) {
            reply(&mut framed, Flag::Blocked).await;
            return Outcome::Blocked { peer };
        }
        info!("Connection from {} accepted.", peer.ip());

        match tokio::time::timeout(self.config.receive_timeout, framed.next()).await {
            Err(_) => {
                reply(&mut framed, Flag::Timeout).await;
                Outcome::TimedOut { peer }
            }
            Ok(None) => Outcome::Failed {
                peer,
                reason: "connection closed before a message arrived".to_string(),
            },
            Ok(Some(Err(e))) => Outcome::Failed {
                peer,
                reason: e.to_string(),
            },
            Ok(Some(Ok(frame))) => {
                debug!(
                    "Received {} byte payload with flags {:?}",
                    frame.payload.len(),
                    frame.flags
                );
                reply(&mut framed, Flag::Ok).await;
                Outcome::Completed {
                    peer,
                    message: frame.payload.trim().to_string(),
                }
            }
        }
    }
}

/// Send a one-flag reply and close the connection; failures only get logged
async fn reply(framed: &mut Framed<TcpStream, FrameCodec>, flag: Flag) {
    if let Err(e) = framed.send(Frame::reply(flag.clone())).await {
        debug!("Failed to send {} reply: {}", flag, e);
        return;
    }
    if let Err(e) = framed.close().await {
        debug!("Failed to close connection after {} reply: {}", flag, e);
    }
}

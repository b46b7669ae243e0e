//! Broadcast dispatch loop
//!
//! Walks the target addresses in order and hands each one to its own task that
//! connects, sends the framed message and closes without reading a reply. A
//! semaphore bounds how many attempts are in flight. The cancellation token is
//! checked before every new attempt; attempts already started always finish.

use crate::error::{ClientError, Result};
use crate::observer::DispatchObserver;
use sgb_core::frame::encode;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Summary of one dispatch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Addresses for which an attempt was started
    pub attempted: usize,
    /// Whether the loop stopped early because of cancellation
    pub cancelled: bool,
}

pub struct BroadcastDispatcher {
    max_in_flight: usize,
    observer: Arc<dyn DispatchObserver>,
}

impl BroadcastDispatcher {
    pub fn new(max_in_flight: usize, observer: Arc<dyn DispatchObserver>) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            observer,
        }
    }

    /// Send `message` to every address, stopping early once `cancel` fires
    ///
    /// Per-address failures are logged and reported to the observer, never
    /// returned. Resolves once every started attempt has completed.
    pub async fn dispatch<I>(
        &self,
        addresses: I,
        port: u16,
        message: &str,
        cancel: &CancellationToken,
    ) -> DispatchReport
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        let wire: Arc<[u8]> = encode(message).into();
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut in_flight = JoinSet::new();
        let mut report = DispatchReport::default();

        for addr in addresses {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            self.observer.mention(addr);
            report.attempted += 1;

            let observer = Arc::clone(&self.observer);
            let wire = Arc::clone(&wire);
            in_flight.spawn(async move {
                let _permit = permit;
                let target = SocketAddr::from((addr, port));
                if let Err(e) = send_frame(target, &wire).await {
                    debug!("{}", e);
                    observer.failed(addr, &e);
                }
            });

            while let Some(joined) = in_flight.try_join_next() {
                log_join_error(joined);
            }
        }

        if report.cancelled {
            info!(
                "Broadcast cancelled after {} attempt(s), waiting for {} in flight",
                report.attempted,
                in_flight.len()
            );
        }

        while let Some(joined) = in_flight.join_next().await {
            log_join_error(joined);
        }

        self.observer.finished(&report);
        report
    }
}

fn log_join_error(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        warn!("Send task ended abnormally: {}", e);
    }
}

/// Open a fresh connection, write one encoded frame and close
pub async fn send_frame(target: SocketAddr, wire: &[u8]) -> Result<()> {
    let mut stream = TcpStream::connect(target)
        .await
        .map_err(|source| ClientError::ConnectFailed {
            addr: target,
            source,
        })?;

    stream
        .write_all(wire)
        .await
        .map_err(|source| ClientError::SendFailed {
            addr: target,
            source,
        })?;

    if let Err(e) = stream.shutdown().await {
        debug!("Shutdown of connection to {} failed: {}", target, e);
    }
    debug!("Message delivered to {}", target);
    Ok(())
}

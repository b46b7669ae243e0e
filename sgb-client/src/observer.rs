//! Progress reporting for a broadcast

use crate::dispatch::DispatchReport;
use crate::error::ClientError;
use std::net::Ipv4Addr;

/// Receives progress from the dispatcher
///
/// `mention` is called on the dispatch loop itself, before the attempt for that
/// address is issued. `failed` is called from the attempt's own task.
pub trait DispatchObserver: Send + Sync {
    /// An address is about to be contacted
    fn mention(&self, addr: Ipv4Addr);

    /// An attempt could not connect or send
    fn failed(&self, _addr: Ipv4Addr, _error: &ClientError) {}

    /// The dispatch loop ended and every started attempt has completed
    fn finished(&self, _report: &DispatchReport) {}
}

/// Prints progress to stdout for console mode
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl DispatchObserver for ConsoleObserver {
    fn mention(&self, addr: Ipv4Addr) {
        println!("Sending message to {addr}...");
    }

    fn finished(&self, report: &DispatchReport) {
        if report.cancelled {
            println!("Broadcasting stopped after {} address(es).", report.attempted);
        }
        println!("Broadcasting finished.");
    }
}

//! Sender IP whitelist

use crate::error::{Result, ServerError};
use std::collections::HashSet;
use std::fs;
use std::net::IpAddr;
use std::path::Path;

/// Set of sender addresses allowed to have their messages routed
///
/// Entries are matched as exact strings against the peer's address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    entries: HashSet<String>,
}

impl Whitelist {
    /// Parse one address per line; blank lines and `#` comments are ignored
    pub fn parse(contents: &str) -> Self {
        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { entries }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&contents))
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        self.entries.contains(&addr.to_canonical().to_string())
    }
}

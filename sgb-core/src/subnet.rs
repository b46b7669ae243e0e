//! Subnet template parsing and host enumeration
//!
//! A template is a dotted IPv4 address where a `0` in the third and/or fourth
//! octet marks a wildcard. Enumeration walks every wildcard position through the
//! usable host range `1..=254`, producing the cross-product when more than one
//! octet is wildcarded.

use crate::error::{CoreError, Result};
use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// First usable host value for a wildcard octet
pub const FIRST_HOST: u8 = 1;
/// Last usable host value for a wildcard octet (255 is broadcast)
pub const LAST_HOST: u8 = 254;

const HOSTS_PER_OCTET: usize = (LAST_HOST - FIRST_HOST + 1) as usize;

/// Octet positions (zero-based) that may act as wildcards
const WILDCARD_POSITIONS: [usize; 2] = [2, 3];

/// A parsed subnet template such as `192.168.1.0` or `10.0.0.0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubnetTemplate {
    octets: [u8; 4],
}

impl SubnetTemplate {
    /// Build a template from raw octets, applying the same checks as parsing
    pub fn from_octets(octets: [u8; 4]) -> Result<Self> {
        if octets[0] == 0 {
            return Err(CoreError::invalid_template(
                &Ipv4Addr::from(octets).to_string(),
                "first octet must be non-zero",
            ));
        }
        Ok(Self { octets })
    }

    /// Zero-based positions of the wildcarded octets, in enumeration order
    pub fn wildcard_positions(&self) -> Vec<usize> {
        WILDCARD_POSITIONS
            .iter()
            .copied()
            .filter(|&pos| self.octets[pos] == 0)
            .collect()
    }

    /// A template is broadcastable when at least the last octet is a wildcard
    pub fn is_broadcastable(&self) -> bool {
        self.octets[3] == 0
    }

    /// Number of addresses `hosts()` will yield
    pub fn host_count(&self) -> usize {
        HOSTS_PER_OCTET.pow(self.wildcard_positions().len() as u32)
    }

    /// The CIDR network covered by a template whose wildcards are trailing
    ///
    /// Returns `None` for templates with a wildcard only in the third octet
    /// (`192.168.0.5`), which do not describe a contiguous network.
    pub fn network(&self) -> Option<Ipv4Net> {
        let trailing = self.octets.iter().rev().take(2).take_while(|&&o| o == 0).count();
        let wildcards = self.wildcard_positions().len();
        if trailing != wildcards {
            return None;
        }
        let prefix = 32 - 8 * trailing as u8;
        Ipv4Net::new(Ipv4Addr::from(self.octets), prefix)
            .ok()
            .map(|net| net.trunc())
    }

    /// Lazily enumerate every concrete host address the template covers
    ///
    /// Each call starts a fresh enumeration.
    pub fn hosts(&self) -> Hosts {
        let wildcards = self.wildcard_positions();
        let mut first = self.octets;
        for &pos in &wildcards {
            first[pos] = FIRST_HOST;
        }

        Hosts {
            remaining: HOSTS_PER_OCTET.pow(wildcards.len() as u32),
            wildcards,
            next: Some(first),
        }
    }
}

impl FromStr for SubnetTemplate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 4 {
            return Err(CoreError::invalid_template(text, "expected four octets"));
        }

        let mut octets = [0u8; 4];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoreError::invalid_template(
                    text,
                    format!("octet {part:?} is not a number"),
                ));
            }
            *slot = part.parse::<u8>().map_err(|_| {
                CoreError::invalid_template(text, format!("octet {part} is out of range 0-255"))
            })?;
        }

        Self::from_octets(octets)
    }
}

impl fmt::Display for SubnetTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Ipv4Addr::from(self.octets))
    }
}

impl IntoIterator for &SubnetTemplate {
    type Item = Ipv4Addr;
    type IntoIter = Hosts;

    fn into_iter(self) -> Hosts {
        self.hosts()
    }
}

/// Iterator over the hosts of a [`SubnetTemplate`]
///
/// Works like an odometer over the wildcard positions, the last octet turning
/// fastest.
#[derive(Debug, Clone)]
pub struct Hosts {
    wildcards: Vec<usize>,
    next: Option<[u8; 4]>,
    remaining: usize,
}

impl Hosts {
    fn advance(&self, mut octets: [u8; 4]) -> Option<[u8; 4]> {
        for &pos in self.wildcards.iter().rev() {
            if octets[pos] < LAST_HOST {
                octets[pos] += 1;
                return Some(octets);
            }
            octets[pos] = FIRST_HOST;
        }
        None
    }
}

impl Iterator for Hosts {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Ipv4Addr> {
        let current = self.next?;
        self.next = self.advance(current);
        self.remaining -= 1;
        Some(Ipv4Addr::from(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Hosts {}

//! Operator input validation
//!
//! Everything is checked before any socket is opened. The raw strings come from
//! the command line or the interactive prompt.

use crate::error::{ClientError, Result};
use sgb_core::SubnetTemplate;
use std::fmt;
use std::net::Ipv4Addr;

/// Unvalidated operator input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    pub port: String,
    pub subnet: Option<String>,
    pub ip: Option<String>,
    pub message: String,
}

/// Where a message goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every host of a subnet template
    Broadcast(SubnetTemplate),
    /// A single host
    Single(Ipv4Addr),
}

impl Target {
    /// The addresses to contact, in order
    pub fn addresses(&self) -> Box<dyn Iterator<Item = Ipv4Addr> + Send> {
        match self {
            Target::Broadcast(template) => Box::new(template.hosts()),
            Target::Single(ip) => Box::new(std::iter::once(*ip)),
        }
    }

    pub fn host_count(&self) -> usize {
        match self {
            Target::Broadcast(template) => template.host_count(),
            Target::Single(_) => 1,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Broadcast(template) => match template.network() {
                Some(net) => write!(f, "{template} ({net})"),
                None => write!(f, "{template}"),
            },
            Target::Single(ip) => write!(f, "{ip}"),
        }
    }
}

/// Validated operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInputs {
    pub target: Target,
    pub port: u16,
    pub message: String,
}

impl RawInputs {
    /// Validate all fields, preferring an explicit IP over the subnet
    pub fn validate(&self) -> Result<ClientInputs> {
        let port = parse_port(&self.port)?;
        let message = parse_message(&self.message)?;

        let target = match (&self.ip, &self.subnet) {
            (Some(ip), _) => Target::Single(parse_ip(ip)?),
            (None, Some(subnet)) => Target::Broadcast(parse_subnet(subnet)?),
            (None, None) => {
                return Err(ClientError::Validation(
                    "either a subnet or an IP address is required".to_string(),
                ))
            }
        };

        Ok(ClientInputs {
            target,
            port,
            message,
        })
    }
}

/// A decimal port number in `1..=65535`
pub fn parse_port(text: &str) -> Result<u16> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::Validation(format!("port {text:?} is not a number")));
    }
    match text.parse::<u16>() {
        Ok(0) | Err(_) => Err(ClientError::Validation(format!(
            "port {text} is out of range 1-65535"
        ))),
        Ok(port) => Ok(port),
    }
}

/// A subnet template whose last octet is a wildcard
pub fn parse_subnet(text: &str) -> Result<SubnetTemplate> {
    let template: SubnetTemplate = text
        .parse()
        .map_err(|e: sgb_core::CoreError| ClientError::Validation(e.to_string()))?;

    if !template.is_broadcastable() {
        return Err(ClientError::Validation(format!(
            "subnet {template} must end in .0"
        )));
    }
    Ok(template)
}

/// A plain IPv4 host address on a local range
pub fn parse_ip(text: &str) -> Result<Ipv4Addr> {
    let text = text.trim();
    let ip: Ipv4Addr = text
        .parse()
        .map_err(|_| ClientError::Validation(format!("{text:?} is not an IPv4 address")))?;

    if ip.octets()[0] == 0 || ip.is_broadcast() {
        return Err(ClientError::Validation(format!(
            "{ip} is not a usable host address"
        )));
    }
    Ok(ip)
}

/// A message with at least one non-whitespace character, trimmed
pub fn parse_message(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation("message is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(port: &str, subnet: Option<&str>, ip: Option<&str>, message: &str) -> RawInputs {
        RawInputs {
            port: port.to_string(),
            subnet: subnet.map(str::to_string),
            ip: ip.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_valid_broadcast() {
        let inputs = raw("62300", Some("192.168.1.0"), None, "  restart ")
            .validate()
            .unwrap();

        assert_eq!(inputs.port, 62300);
        assert_eq!(inputs.message, "restart");
        assert_eq!(inputs.target.host_count(), 254);
        assert_eq!(inputs.target.to_string(), "192.168.1.0 (192.168.1.0/24)");
    }

    #[test]
    fn test_ip_takes_precedence_over_subnet() {
        let inputs = raw("8000", Some("192.168.1.0"), Some("192.168.0.7"), "hi")
            .validate()
            .unwrap();

        assert_eq!(inputs.target, Target::Single(Ipv4Addr::new(192, 168, 0, 7)));
        let addrs: Vec<Ipv4Addr> = inputs.target.addresses().collect();
        assert_eq!(addrs, vec![Ipv4Addr::new(192, 168, 0, 7)]);
    }

    #[test]
    fn test_rejects_bad_port() {
        for port in ["", "abc", "-1", "0", "65536", "12a"] {
            assert!(
                matches!(parse_port(port), Err(ClientError::Validation(_))),
                "expected port {port:?} to be rejected"
            );
        }
        assert_eq!(parse_port("65535").unwrap(), 65535);
    }

    #[test]
    fn test_rejects_non_broadcast_subnet() {
        assert!(parse_subnet("192.168.1.5").is_err());
        assert!(parse_subnet("192.168.1").is_err());
        assert!(parse_subnet("10.0.0.0").is_ok());
    }

    #[test]
    fn test_rejects_bad_ip() {
        assert!(parse_ip("192.168.1").is_err());
        assert!(parse_ip("0.1.2.3").is_err());
        assert!(parse_ip("255.255.255.255").is_err());
        assert!(parse_ip("10.0.0.300").is_err());
        assert_eq!(parse_ip(" 10.0.0.3 ").unwrap(), Ipv4Addr::new(10, 0, 0, 3));
    }

    #[test]
    fn test_rejects_blank_message() {
        let result = raw("62300", Some("192.168.1.0"), None, "   ").validate();
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_requires_a_target() {
        assert!(raw("62300", None, None, "hi").validate().is_err());
    }
}

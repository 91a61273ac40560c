//! Interface-definition parser
//!
//! The input is a single `iface eth0 inet static` stanza followed by an
//! `iface eth0 inet6 static` stanza, one `keyword value` pair per line:
//!
//! ```text
//! iface eth0 inet static
//!     address 192.0.2.10
//!     netmask 255.255.255.0
//!     broadcast 192.0.2.255
//!     gateway 192.0.2.1
//!     # dns
//!     dns-nameservers 192.0.2.53
//!
//! iface eth0 inet6 static
//!     address 2001:db8::10
//!     netmask 64
//!     gateway 2001:db8::1
//! ```
//!
//! Values are taken by line position, not by keyword.

use super::extract::{SectionEnd, extract_field, extract_section};
use super::{Ipv4Config, Ipv6Config, NetworkConfig};
use crate::ProvisionError;
use crate::error::ExtractionError;
use tracing::debug;

/// Start of the IPv4 stanza
pub const IPV4_MARKER: &str = "iface eth0 inet static";

/// Start of the IPv6 stanza
pub const IPV6_MARKER: &str = "iface eth0 inet6 static";

/// Trait for interface-definition parsers
pub trait InterfaceParser {
    /// Parse raw interface-definition text into a [`NetworkConfig`]
    fn parse(&self, raw: &str) -> Result<NetworkConfig, ProvisionError>;
}

/// Line-positional parser for the config-drive interface format
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalParser;

impl PositionalParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_ipv4(&self, section: &str) -> Result<Ipv4Config, ProvisionError> {
        let lines: Vec<&str> = section.lines().collect();

        // Line 4 is a separator and is never read.
        Ok(Ipv4Config {
            address: value_at(&lines, 0, "ipv4 address")?,
            netmask: value_at(&lines, 1, "ipv4 netmask")?,
            broadcast: value_at(&lines, 2, "ipv4 broadcast")?,
            gateway: value_at(&lines, 3, "ipv4 gateway")?,
            dns: value_at(&lines, 5, "ipv4 dns")?,
        })
    }

    fn parse_ipv6(&self, section: &str) -> Result<Ipv6Config, ProvisionError> {
        let lines: Vec<&str> = section.lines().collect();

        Ok(Ipv6Config {
            address: value_at(&lines, 0, "ipv6 address")?,
            netmask: value_at(&lines, 1, "ipv6 netmask")?,
            gateway: value_at(&lines, 2, "ipv6 gateway")?,
        })
    }
}

impl InterfaceParser for PositionalParser {
    fn parse(&self, raw: &str) -> Result<NetworkConfig, ProvisionError> {
        let ipv4_section = extract_section(raw, IPV4_MARKER, SectionEnd::Marker(IPV6_MARKER));
        let ipv6_section = extract_section(raw, IPV6_MARKER, SectionEnd::EndOfText);

        let config = NetworkConfig {
            ipv4: self.parse_ipv4(ipv4_section.trim())?,
            ipv6: self.parse_ipv6(ipv6_section.trim())?,
        };

        debug!("Parsed network config: {:?}", config);
        Ok(config)
    }
}

/// Parse interface-definition text with the default positional parser
pub fn parse_interfaces(raw: &str) -> Result<NetworkConfig, ProvisionError> {
    PositionalParser::new().parse(raw)
}

fn value_at(lines: &[&str], index: usize, field: &str) -> Result<String, ProvisionError> {
    let line = lines.get(index).ok_or_else(|| {
        ProvisionError::extraction(field, ExtractionError::MissingLine { index })
    })?;

    extract_field(line)
        .map(str::to_string)
        .map_err(|e| ProvisionError::extraction(field, e))
}

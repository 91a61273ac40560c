//! Network configuration module
//!
//! Handles the static single-interface configuration carried on the config
//! drive: parsing the interface-definition file, rendering the sysconfig
//! files, and applying routes.

pub mod apply;
pub mod extract;
pub mod parser;
pub mod render;

use serde::{Deserialize, Serialize};

/// The only interface this agent configures
pub const INTERFACE: &str = "eth0";

/// Structured network configuration for [`INTERFACE`]
///
/// Values are opaque tokens copied from the interface-definition file; none
/// of them are validated as addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub ipv4: Ipv4Config,
    pub ipv6: Ipv6Config,
}

/// IPv4 block of the interface definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Config {
    pub address: String,
    pub netmask: String,
    pub broadcast: String,
    pub gateway: String,
    /// Parsed for completeness; nothing downstream renders it
    pub dns: String,
}

/// IPv6 block of the interface definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv6Config {
    pub address: String,
    pub netmask: String,
    pub gateway: String,
}

//! Network configuration renderer
//!
//! Converts a [`NetworkConfig`] into the SUSE-style sysconfig files
//! (`ifcfg-eth0`, `ifroute-eth0`), the hosts file, a console status report
//! and the default-route commands. Every output is a pure function of the
//! config, the hostname and the timestamp passed in.

use super::{INTERFACE, NetworkConfig};
use crate::modules::hostname::short_hostname;
use chrono::NaiveDateTime;
use std::fmt::{self, Write};

/// First line of every generated file
pub const HEADER: &str = "### Generated by configdrive-init";

/// Interface config file name
pub const IFCFG_FILE: &str = "ifcfg-eth0";

/// Route config file name
pub const IFROUTE_FILE: &str = "ifroute-eth0";

const TIMESTAMP_FORMAT: &str = "%a %d %b %Y %H:%M";

/// Address family of a route command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

/// A default route to install via the `ip` tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCommand {
    pub family: IpFamily,
    pub gateway: String,
    pub device: &'static str,
}

impl RouteCommand {
    /// Arguments for the `ip` binary
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(8);
        if self.family == IpFamily::V6 {
            args.push("-6".to_string());
        }
        args.extend(
            ["route", "add", "default", "via", self.gateway.as_str(), "dev", self.device]
                .iter()
                .map(|s| s.to_string()),
        );
        args
    }
}

impl fmt::Display for RouteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ip {}", self.args().join(" "))
    }
}

/// Everything derived from one [`NetworkConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNetwork {
    /// Contents of `ifcfg-eth0`
    pub iface_file: String,
    /// Contents of `ifroute-eth0`
    pub route_file: String,
    /// Contents of the hosts file
    pub hosts_file: String,
    /// Human-readable summary for the console
    pub status_report: String,
    /// IPv4 then IPv6 default route
    pub route_commands: Vec<RouteCommand>,
}

/// Render all outputs for `config`
pub fn render(
    config: &NetworkConfig,
    hostname: &str,
    generated_at: NaiveDateTime,
) -> RenderedNetwork {
    let stamp = generated_at.format(TIMESTAMP_FORMAT).to_string();

    RenderedNetwork {
        iface_file: render_iface_file(config, &stamp),
        route_file: render_route_file(config, &stamp),
        hosts_file: render_hosts_file(config, hostname, &stamp),
        status_report: render_status_report(config, &stamp),
        route_commands: route_commands(config),
    }
}

fn render_iface_file(config: &NetworkConfig, stamp: &str) -> String {
    let mut content = String::new();

    writeln!(content, "{HEADER}").unwrap();
    writeln!(content, "#{stamp}").unwrap();
    writeln!(content, "#device: {INTERFACE}").unwrap();
    writeln!(content, "BOOTPROTO='static'").unwrap();
    writeln!(content, "MTU=''").unwrap();
    writeln!(content, "STARTMODE='auto'").unwrap();
    writeln!(content, "UNIQUE=''").unwrap();
    writeln!(content, "USERCONTROL='no'").unwrap();

    // Point-to-point host route: the parsed netmask is intentionally unused.
    writeln!(content, "IPADDR='{}/32'", config.ipv4.address).unwrap();
    writeln!(content, "NETMASK='255.255.255.255'").unwrap();
    writeln!(content, "BROADCAST='{}'", config.ipv4.broadcast).unwrap();
    writeln!(content, "REMOTE_IPADDR='{}'", config.ipv4.gateway).unwrap();
    writeln!(content, "GATEWAY='{}'", config.ipv4.gateway).unwrap();

    writeln!(
        content,
        "IPADDR_0='{}/{}'",
        config.ipv6.address, config.ipv6.netmask
    )
    .unwrap();
    writeln!(content, "GATEWAY_0='{}'", config.ipv6.gateway).unwrap();
    writeln!(content, "#NETMASK_0=''").unwrap();

    content
}

fn render_route_file(config: &NetworkConfig, stamp: &str) -> String {
    let mut content = String::new();

    writeln!(content, "{HEADER}").unwrap();
    writeln!(content, "#{stamp}").unwrap();
    writeln!(content, "default {} dev {INTERFACE}", config.ipv4.gateway).unwrap();

    content
}

fn render_hosts_file(config: &NetworkConfig, hostname: &str, stamp: &str) -> String {
    let short = short_hostname(hostname);
    let mut content = String::new();

    writeln!(content, "{HEADER}").unwrap();
    writeln!(content, "#{stamp}").unwrap();
    writeln!(content, "127.0.0.1\tlocalhost").unwrap();
    writeln!(content).unwrap();
    writeln!(content, "{}\t{hostname} {short}", config.ipv4.address).unwrap();
    writeln!(content, "{}\t{hostname} {short}", config.ipv6.address).unwrap();
    writeln!(content).unwrap();
    writeln!(content, "::1             ip6-localhost ip6-loopback").unwrap();
    writeln!(content, "fe00::0         ip6-localnet").unwrap();
    writeln!(content, "ff00::0         ip6-mcastprefix").unwrap();
    writeln!(content, "ff02::1         ip6-allnodes").unwrap();
    writeln!(content, "ff02::2         ip6-allrouters").unwrap();
    writeln!(content, "ff02::3         ip6-allhosts").unwrap();

    content
}

fn render_status_report(config: &NetworkConfig, stamp: &str) -> String {
    let mut content = String::new();

    writeln!(content, "Deployed following config {stamp}").unwrap();
    writeln!(content, "IPADDRESS_4={}", config.ipv4.address).unwrap();
    writeln!(content, "NETMASK_4={}", config.ipv4.netmask).unwrap();
    writeln!(content, "GATEWAY_4={}", config.ipv4.gateway).unwrap();
    writeln!(content, "IPADDRESS_6={}", config.ipv6.address).unwrap();
    writeln!(content, "NETMASK_6={}", config.ipv6.netmask).unwrap();
    writeln!(content, "GATEWAY_6={}", config.ipv6.gateway).unwrap();

    content
}

fn route_commands(config: &NetworkConfig) -> Vec<RouteCommand> {
    vec![
        RouteCommand {
            family: IpFamily::V4,
            gateway: config.ipv4.gateway.clone(),
            device: INTERFACE,
        },
        RouteCommand {
            family: IpFamily::V6,
            gateway: config.ipv6.gateway.clone(),
            device: INTERFACE,
        },
    ]
}

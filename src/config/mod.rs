//! Agent configuration
//!
//! Every path and binary the agent touches can be overridden from a YAML
//! file. Missing keys fall back to the defaults of a SUSE-style image with a
//! `config-2` labelled config drive.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the agent configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/configdrive-init.yaml";

/// Main agent configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Config drive device and mount location
    pub drive: DriveConfig,

    /// Network file locations and service
    pub network: NetworkPaths,

    /// Files written on the target system
    pub paths: SystemPaths,

    /// External binaries
    pub commands: CommandPaths,
}

/// Config drive settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Block device holding the config drive
    pub device: PathBuf,

    /// Directory under which the mount point is created
    pub mount_root: PathBuf,

    /// Fixed mount point name; a random one is used when unset
    pub mount_name: Option<String>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/disk/by-label/config-2"),
            mount_root: PathBuf::from("/tmp"),
            mount_name: None,
        }
    }
}

/// Network configuration output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPaths {
    /// Directory receiving `ifcfg-eth0` and `ifroute-eth0`
    pub config_dir: PathBuf,

    /// Service restarted at the end of the run
    pub service: String,
}

impl Default for NetworkPaths {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/etc/sysconfig/network"),
            service: "network.service".to_string(),
        }
    }
}

/// System files touched by the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemPaths {
    /// Run-once marker
    pub marker: PathBuf,
    pub hosts: PathBuf,
    pub hostname: PathBuf,
    /// Directory receiving `authorized_keys`
    pub ssh_dir: PathBuf,
}

impl Default for SystemPaths {
    fn default() -> Self {
        Self {
            marker: PathBuf::from("/var/lib/bo/cloud_init"),
            hosts: PathBuf::from("/etc/hosts"),
            hostname: PathBuf::from("/etc/HOSTNAME"),
            ssh_dir: PathBuf::from("/root/.ssh"),
        }
    }
}

/// Locations of external binaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandPaths {
    pub mount: String,
    pub umount: String,
    pub ip: String,
    pub systemctl: String,
}

impl Default for CommandPaths {
    fn default() -> Self {
        Self {
            mount: "/usr/bin/mount".to_string(),
            umount: "/usr/bin/umount".to_string(),
            ip: "/sbin/ip".to_string(),
            systemctl: "/usr/bin/systemctl".to_string(),
        }
    }
}

impl AgentConfig {
    /// Parse agent config from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}

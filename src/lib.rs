//! configdrive-init library
//!
//! A minimal first-boot provisioning agent for VMs that receive their
//! configuration on an OpenStack-format config drive.
//!
//! # Design Principles
//!
//! - **Safety First**: No unsafe code (`#![forbid(unsafe_code)]`)
//! - **Run Once**: A marker file gates the whole pass
//! - **Testable Side Effects**: Every external command goes through an
//!   injected [`command::CommandExecutor`]
//! - **Explicit Failures**: Every failure mode is a [`ProvisionError`]
//!   variant, never a process abort

pub mod command;
pub mod config;
pub mod datasources;
pub mod modules;
pub mod mount;
pub mod network;
pub mod provision;
pub mod state;

mod error;

pub use error::{ExtractionError, ProvisionError};
pub use network::NetworkConfig;
pub use provision::{ProvisionReport, Provisioner};

use std::collections::BTreeMap;

/// Instance metadata read from the config drive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceMetadata {
    pub instance_id: Option<String>,
    /// Fully qualified hostname as given by the metadata
    pub hostname: String,
    /// SSH public keys by key name
    pub public_keys: BTreeMap<String, String>,
    /// Interface-definition file, relative to the drive's `openstack/` directory
    pub network_config_path: Option<String>,
}

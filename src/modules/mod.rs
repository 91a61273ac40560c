//! System configuration modules
//!
//! Each module writes one piece of system state during the provisioning
//! pass.

pub mod hostname;
pub mod hosts;
pub mod ssh_keys;

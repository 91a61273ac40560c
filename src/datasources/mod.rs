//! Instance data sources
//!
//! The agent reads everything from an OpenStack-format config drive.

pub mod openstack;

//! Hostname configuration module

use crate::ProvisionError;
use std::path::Path;
use tracing::debug;

/// Host part of a possibly fully qualified name
pub fn short_hostname(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or(hostname)
}

/// Write the short hostname to the hostname file
pub async fn write_hostname(path: &Path, hostname: &str) -> Result<(), ProvisionError> {
    let short = short_hostname(hostname);
    debug!("Setting hostname to: {}", short);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, format!("{short}\n")).await?;

    Ok(())
}

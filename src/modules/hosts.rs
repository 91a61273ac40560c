//! Hosts file module

use crate::ProvisionError;
use std::path::Path;
use tracing::debug;

/// Replace the hosts file with rendered content
pub async fn write_hosts(path: &Path, content: &str) -> Result<(), ProvisionError> {
    debug!("Writing hosts file: {}", path.display());

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;

    Ok(())
}

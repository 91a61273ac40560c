//! Run-once marker handling
//!
//! The agent provisions a VM exactly once. Completion is recorded by a
//! marker file whose existence alone blocks later runs.

use crate::ProvisionError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Run-once marker file
#[derive(Debug, Clone)]
pub struct RunMarker {
    path: PathBuf,
}

impl RunMarker {
    /// Create a marker handle for `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Marker file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether provisioning already completed
    pub fn is_present(&self) -> bool {
        self.path.exists()
    }

    /// Fail with [`ProvisionError::AlreadyProvisioned`] if the marker exists
    pub fn check(&self) -> Result<(), ProvisionError> {
        let present = self.is_present();
        debug!(
            "Run marker check: {} -> {}",
            self.path.display(),
            if present { "skip" } else { "run" }
        );

        if present {
            Err(ProvisionError::AlreadyProvisioned(
                self.path.display().to_string(),
            ))
        } else {
            Ok(())
        }
    }

    /// Record that provisioning completed
    pub async fn mark_done(&self) -> Result<(), ProvisionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&self.path, b"true").await?;
        info!("Created run marker: {}", self.path.display());
        Ok(())
    }

    /// Remove the marker so the next boot provisions again.
    ///
    /// Returns whether a marker was removed.
    pub async fn clear(&self) -> Result<bool, ProvisionError> {
        if !self.is_present() {
            return Ok(false);
        }

        fs::remove_file(&self.path).await?;
        info!("Removed run marker: {}", self.path.display());
        Ok(true)
    }
}

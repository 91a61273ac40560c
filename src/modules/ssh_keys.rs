//! SSH key configuration module

use crate::ProvisionError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Install `keys` as the `authorized_keys` file inside `ssh_dir`.
///
/// Returns the path written, or `None` when there were no keys.
pub async fn install_authorized_keys(
    ssh_dir: &Path,
    keys: &[String],
) -> Result<Option<PathBuf>, ProvisionError> {
    if keys.is_empty() {
        return Ok(None);
    }

    info!("Installing {} SSH keys into {}", keys.len(), ssh_dir.display());

    if !ssh_dir.exists() {
        debug!("Creating SSH directory: {:?}", ssh_dir);
        fs::create_dir_all(ssh_dir).await?;

        // Set permissions to 700
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(ssh_dir, std::fs::Permissions::from_mode(0o700)).await?;
        }
    }

    let authorized_keys_path = ssh_dir.join("authorized_keys");
    let content = keys
        .iter()
        .map(|k| k.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        + "\n";
    fs::write(&authorized_keys_path, &content).await?;

    // Set permissions to 600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(
            &authorized_keys_path,
            std::fs::Permissions::from_mode(0o600),
        )
        .await?;
    }

    Ok(Some(authorized_keys_path))
}

//! Config drive mounting
//!
//! The drive is mounted on a fresh directory under the configured mount
//! root and unmounted again once provisioning has read what it needs.

use crate::ProvisionError;
use crate::command::{CommandExecutor, argv};
use crate::config::{CommandPaths, DriveConfig};
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// A mounted config drive
#[derive(Debug)]
pub struct MountedDrive {
    mount_point: PathBuf,
}

impl MountedDrive {
    /// Root of the mounted drive
    pub fn path(&self) -> &Path {
        &self.mount_point
    }

    /// Unmount the drive and remove its mount point.
    ///
    /// A mount point that cannot be removed is left behind with a warning.
    pub async fn unmount(
        self,
        executor: &dyn CommandExecutor,
        commands: &CommandPaths,
    ) -> Result<(), ProvisionError> {
        let output = executor
            .run(&argv(&commands.umount, [path_arg(&self.mount_point)]))
            .await?;

        if !output.is_silent_success() {
            return Err(ProvisionError::Mount(format!(
                "failed to unmount {}: {}",
                self.mount_point.display(),
                output.output_report()
            )));
        }

        remove_mount_point(&self.mount_point).await;
        info!("Unmounted config drive from {}", self.mount_point.display());
        Ok(())
    }
}

/// Mount the config drive described by `drive`
pub async fn mount_config_drive(
    executor: &dyn CommandExecutor,
    drive: &DriveConfig,
    commands: &CommandPaths,
) -> Result<MountedDrive, ProvisionError> {
    let name = drive
        .mount_name
        .clone()
        .unwrap_or_else(random_mount_name);
    let mount_point = drive.mount_root.join(name);

    debug!("Creating mount point {}", mount_point.display());
    fs::create_dir_all(&mount_point).await?;

    let output = executor
        .run(&argv(
            &commands.mount,
            [path_arg(&drive.device), path_arg(&mount_point)],
        ))
        .await?;

    if !output.is_silent_success() {
        // Best effort: the device may be half-mounted.
        let _ = executor
            .run(&argv(&commands.umount, [path_arg(&mount_point)]))
            .await;
        remove_mount_point(&mount_point).await;

        return Err(ProvisionError::Mount(format!(
            "failed to mount {} at {}: {}",
            drive.device.display(),
            mount_point.display(),
            output.output_report()
        )));
    }

    info!(
        "Mounted config drive {} at {}",
        drive.device.display(),
        mount_point.display()
    );
    Ok(MountedDrive { mount_point })
}

/// Eight random uppercase letters
pub fn random_mount_name() -> String {
    let mut rng = rand::rng();
    (0..8)
        .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
        .collect()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

async fn remove_mount_point(mount_point: &Path) {
    if let Err(e) = fs::remove_dir(mount_point).await {
        warn!(
            "Could not remove mount point {}: {}",
            mount_point.display(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::command::mock::MockExecutor;
    use tempfile::TempDir;

    fn drive_config(root: &Path) -> DriveConfig {
        DriveConfig {
            device: PathBuf::from("/dev/sr0"),
            mount_root: root.to_path_buf(),
            mount_name: Some("DRIVE".to_string()),
        }
    }

    #[test]
    fn test_random_mount_name() {
        let name = random_mount_name();
        assert_eq!(name.len(), 8);
        assert!(name.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn test_mount_and_unmount() {
        let temp = TempDir::new().unwrap();
        let executor = MockExecutor::new();
        let commands = CommandPaths::default();

        let drive = mount_config_drive(&executor, &drive_config(temp.path()), &commands)
            .await
            .unwrap();
        let mount_point = temp.path().join("DRIVE");
        assert_eq!(drive.path(), mount_point.as_path());
        assert!(mount_point.is_dir());

        drive.unmount(&executor, &commands).await.unwrap();
        assert!(!mount_point.exists());

        let point = mount_point.display().to_string();
        assert_eq!(
            executor.command_lines(),
            vec![
                format!("/usr/bin/mount /dev/sr0 {point}"),
                format!("/usr/bin/umount {point}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_mount_failure_cleans_up() {
        let temp = TempDir::new().unwrap();
        let executor = MockExecutor::new().with_response(
            "/usr/bin/mount",
            CommandOutput::failure(32, "mount: /dev/sr0: no medium found"),
        );

        let err = mount_config_drive(
            &executor,
            &drive_config(temp.path()),
            &CommandPaths::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProvisionError::Mount(_)));
        assert!(err.to_string().contains("no medium found"));
        assert!(!temp.path().join("DRIVE").exists());
    }

    #[tokio::test]
    async fn test_mount_stdout_is_failure() {
        let temp = TempDir::new().unwrap();
        let executor = MockExecutor::new().with_response(
            "/usr/bin/mount",
            CommandOutput {
                stdout: "mount: unexpected chatter".to_string(),
                status: Some(0),
                ..Default::default()
            },
        );

        let result = mount_config_drive(
            &executor,
            &drive_config(temp.path()),
            &CommandPaths::default(),
        )
        .await;
        assert!(matches!(result, Err(ProvisionError::Mount(_))));
    }

    #[tokio::test]
    async fn test_mount_read_only_warning_succeeds() {
        let temp = TempDir::new().unwrap();
        let executor = MockExecutor::new().with_response(
            "/usr/bin/mount",
            CommandOutput {
                stderr: "mount: /tmp/DRIVE: WARNING: source write-protected, mounted read-only."
                    .to_string(),
                status: Some(0),
                ..Default::default()
            },
        );

        let drive = mount_config_drive(
            &executor,
            &drive_config(temp.path()),
            &CommandPaths::default(),
        )
        .await
        .unwrap();
        assert_eq!(drive.path(), temp.path().join("DRIVE").as_path());
    }

    #[test]
    fn test_random_mount_names_differ() {
        let names: std::collections::HashSet<String> =
            (0..16).map(|_| random_mount_name()).collect();
        assert!(names.len() > 1);
    }

    #[tokio::test]
    async fn test_unmount_failure() {
        let temp = TempDir::new().unwrap();
        let executor = MockExecutor::new()
            .with_response("/usr/bin/umount", CommandOutput::failure(32, "target is busy"));
        let commands = CommandPaths::default();

        let drive = mount_config_drive(&executor, &drive_config(temp.path()), &commands)
            .await
            .unwrap();
        let err = drive.unmount(&executor, &commands).await.unwrap_err();
        assert!(err.to_string().contains("target is busy"));
    }
}

//! External command execution
//!
//! Everything that shells out (mount, umount, ip, systemctl) goes through a
//! [`CommandExecutor`], so the provisioning pass can run against a
//! [`mock::MockExecutor`] in tests without touching the host.

pub mod mock;

use crate::ProvisionError;
use async_trait::async_trait;
use tracing::debug;

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal
    pub status: Option<i32>,
}

impl CommandOutput {
    /// Successful, silent output
    pub fn success() -> Self {
        Self {
            status: Some(0),
            ..Default::default()
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            status: Some(code),
        }
    }

    /// Whether the command exited with status 0
    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// Exited with status 0 and printed nothing on stdout.
    ///
    /// Stderr is ignored: `mount` warns there about read-only media even
    /// when it succeeds.
    pub fn is_silent_success(&self) -> bool {
        self.is_success() && self.stdout.trim().is_empty()
    }

    /// Combined output, useful for error messages
    pub fn output_report(&self) -> String {
        let mut report = match self.status {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        };

        if !self.stdout.trim().is_empty() {
            report += &format!("; stdout: {}", self.stdout.trim());
        }
        if !self.stderr.trim().is_empty() {
            report += &format!("; stderr: {}", self.stderr.trim());
        }

        report
    }
}

/// Trait for running external commands
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `argv` (program followed by its arguments) and capture its output
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, ProvisionError>;
}

/// Executor that spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, ProvisionError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ProvisionError::Command("empty command line".to_string()))?;

        debug!("Running command: {}", argv.join(" "));

        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| ProvisionError::Command(format!("{program}: {e}")))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code(),
        })
    }
}

/// Run a command that must succeed without printing anything.
///
/// Output on stdout or a non-zero status is reported as a
/// [`ProvisionError::Command`].
pub async fn run_silent(
    executor: &dyn CommandExecutor,
    argv: &[String],
) -> Result<(), ProvisionError> {
    let output = executor.run(argv).await?;

    if output.is_silent_success() {
        Ok(())
    } else {
        Err(ProvisionError::Command(format!(
            "`{}` {}",
            argv.join(" "),
            output.output_report()
        )))
    }
}

/// Build an argv from a program path and string-like arguments
pub fn argv<I, S>(program: &str, args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    std::iter::once(program.to_string())
        .chain(args.into_iter().map(Into::into))
        .collect()
}

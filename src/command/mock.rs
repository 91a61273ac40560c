//! Mock command executor for testing
//!
//! Records every command line it is asked to run and answers with scripted
//! output. Unscripted commands succeed silently.

use super::{CommandExecutor, CommandOutput};
use crate::ProvisionError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock command executor
///
/// # Example
/// ```
/// use configdrive_init::command::CommandOutput;
/// use configdrive_init::command::mock::MockExecutor;
///
/// let mock = MockExecutor::new()
///     .with_response("/sbin/ip -6", CommandOutput::failure(2, "Network is unreachable"));
/// ```
#[derive(Debug, Default)]
pub struct MockExecutor {
    responses: Vec<(String, CommandOutput)>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockExecutor {
    /// Create a mock that succeeds silently for every command
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer with `output` for command lines starting with `prefix`.
    ///
    /// The first matching prefix wins.
    pub fn with_response(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.responses.push((prefix.to_string(), output));
        self
    }

    /// Command lines run so far, in order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Command lines run so far, joined with spaces
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|argv| argv.join(" ")).collect()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, ProvisionError> {
        if argv.is_empty() {
            return Err(ProvisionError::Command("empty command line".to_string()));
        }

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(argv.to_vec());
        }

        let line = argv.join(" ");
        let output = self
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(CommandOutput::success);

        Ok(output)
    }
}

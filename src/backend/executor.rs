//! Child process execution
//!
//! The [`Executor`] trait is the seam between the orchestration logic and
//! the operating system. [`ProcessExecutor`] spawns real processes; tests
//! substitute a recording implementation.

use std::collections::BTreeMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::command::CommandSpec;
use crate::common::{Error, Result};

/// Runs one external command to completion
#[async_trait]
pub trait Executor: Send {
    /// Run the command with `env` applied on top of the inherited
    /// environment and return its exit code (`None` when killed by a signal)
    async fn execute(
        &mut self,
        command: &CommandSpec,
        env: &BTreeMap<String, String>,
    ) -> Result<Option<i32>>;
}

/// Executor spawning real child processes
///
/// The child shares the terminal's stdout/stderr so backend output streams
/// live. There is no timeout: a hung backend stalls the run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(
        &mut self,
        command: &CommandSpec,
        env: &BTreeMap<String, String>,
    ) -> Result<Option<i32>> {
        let program = which::which(&command.program).map_err(|e| Error::ExecutableNotFound {
            program: command.program.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Spawning {}", command);

        let status = Command::new(&program)
            .args(&command.args)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::Spawn {
                program: program.display().to_string(),
                error: e.to_string(),
            })?;

        Ok(status.code())
    }
}

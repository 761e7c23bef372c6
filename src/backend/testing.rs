//! Recording executor used by unit tests

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::command::CommandSpec;
use super::executor::Executor;
use crate::common::{Error, Result};

/// One observed invocation
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub command: CommandSpec,
    pub env: BTreeMap<String, String>,
}

type CallHook = Box<dyn FnMut(usize, &CommandSpec) + Send>;

/// Records every command instead of spawning it
///
/// Calls are numbered from 1. A call fails with exit code 1 when its number
/// was registered with [`fail_on_call`](Self::fail_on_call).
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    pub calls: Vec<RecordedCall>,
    fail_on: Vec<usize>,
    spawn_error_on: Vec<usize>,
    on_call: Option<CallHook>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_on.push(call);
        self
    }

    pub fn spawn_error_on_call(mut self, call: usize) -> Self {
        self.spawn_error_on.push(call);
        self
    }

    /// Run a side effect (such as writing a state file) during each call
    pub fn on_call(mut self, hook: impl FnMut(usize, &CommandSpec) + Send + 'static) -> Self {
        self.on_call = Some(Box::new(hook));
        self
    }

    /// Value passed for `-v TEST_DATA_FILE:<value>` in each call
    pub fn data_files(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| {
                call.command
                    .args
                    .iter()
                    .find_map(|arg| arg.strip_prefix("TEST_DATA_FILE:"))
                    .map(str::to_string)
            })
            .collect()
    }

    /// Test case passed with `--test` in each Robot Framework call
    pub fn test_cases(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| {
                let args = &call.command.args;
                args.iter()
                    .position(|arg| arg == "--test")
                    .and_then(|i| args.get(i + 1))
                    .cloned()
            })
            .collect()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn execute(
        &mut self,
        command: &CommandSpec,
        env: &BTreeMap<String, String>,
    ) -> Result<Option<i32>> {
        self.calls.push(RecordedCall {
            command: command.clone(),
            env: env.clone(),
        });
        let call = self.calls.len();

        if let Some(hook) = self.on_call.as_mut() {
            hook(call, command);
        }

        if self.spawn_error_on.contains(&call) {
            return Err(Error::Spawn {
                program: command.program.clone(),
                error: "simulated spawn failure".to_string(),
            });
        }

        Ok(Some(if self.fail_on.contains(&call) { 1 } else { 0 }))
    }
}

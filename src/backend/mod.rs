//! Backend invocation
//!
//! A backend is an external test-execution engine run as a child process.
//! Backends are a closed set selected by the task's `framework` string;
//! anything unrecognised is kept as [`BackendKind::Unknown`] and reported
//! as a failure at invocation time without spawning a process.

pub mod command;
pub mod executor;

#[cfg(test)]
pub(crate) mod testing;

use serde::Deserialize;
use std::fmt;

use crate::common::config::Executables;
use crate::common::Error;
use crate::environment::RunContext;

pub use command::{CommandSpec, Invocation};
pub use executor::{Executor, ProcessExecutor};

/// Supported test-execution backends
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum BackendKind {
    /// Robot Framework (`robot`)
    RobotFramework,
    /// Micro Focus UFT batch runner
    Uft,
    /// Any other framework name from the configuration
    Unknown(String),
}

impl BackendKind {
    /// Name as written in the configuration
    pub fn config_name(&self) -> &str {
        match self {
            BackendKind::RobotFramework => "Robot Framework",
            BackendKind::Uft => "UFT",
            BackendKind::Unknown(name) => name,
        }
    }

    /// Build the command for this backend, or `None` for unknown backends
    pub fn command(&self, executables: &Executables, inv: &Invocation<'_>) -> Option<CommandSpec> {
        match self {
            BackendKind::RobotFramework => Some(command::robot_framework(executables, inv)),
            BackendKind::Uft => Some(command::uft(executables, inv)),
            BackendKind::Unknown(_) => None,
        }
    }
}

impl From<String> for BackendKind {
    fn from(name: String) -> Self {
        match name.trim() {
            "Robot Framework" => BackendKind::RobotFramework,
            "UFT" => BackendKind::Uft,
            _ => BackendKind::Unknown(name),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Result of a single backend invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// Process exited with status zero
    Passed,
    /// Process exited non-zero (`None` when terminated by a signal)
    Failed { code: Option<i32> },
    /// Process could not be started
    SpawnFailed(String),
    /// Framework name is not a supported backend; nothing was spawned
    UnknownBackend(String),
}

impl InvokeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvokeOutcome::Passed)
    }
}

impl fmt::Display for InvokeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeOutcome::Passed => f.write_str("passed"),
            InvokeOutcome::Failed { code: Some(code) } => {
                write!(f, "backend exited with status {}", code)
            }
            InvokeOutcome::Failed { code: None } => f.write_str("backend terminated by signal"),
            InvokeOutcome::SpawnFailed(reason) => f.write_str(reason),
            InvokeOutcome::UnknownBackend(name) => {
                write!(f, "{}", Error::UnknownBackend(name.clone()))
            }
        }
    }
}

/// Run one test case of a task through its backend and wait for it
pub async fn invoke<E: Executor + ?Sized>(
    executor: &mut E,
    executables: &Executables,
    ctx: &RunContext,
    inv: &Invocation<'_>,
) -> InvokeOutcome {
    let Some(command) = inv.task.framework.command(executables, inv) else {
        let name = inv.task.framework.config_name().to_string();
        tracing::error!("Unknown framework: {}", name);
        return InvokeOutcome::UnknownBackend(name);
    };

    tracing::debug!(
        test_case = inv.test_case,
        data_file = inv.data_file,
        "Invoking {}",
        command
    );

    match executor.execute(&command, ctx.vars()).await {
        Ok(Some(0)) => InvokeOutcome::Passed,
        Ok(code) => InvokeOutcome::Failed { code },
        Err(e) => {
            tracing::error!("{}", e);
            InvokeOutcome::SpawnFailed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingExecutor;
    use super::*;
    use crate::common::config::Config;
    use std::path::Path;

    fn config(framework: &str) -> Config {
        Config::from_yaml_str(&format!(
            r#"
output_temp_file: state.yaml
test_data_file: data.xlsx
tasks:
  t:
    test_path: suite.robot
    test_cases: [Case]
    framework: {}
    report_path: out/t
"#,
            framework
        ))
        .unwrap()
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(
            BackendKind::from("Robot Framework".to_string()),
            BackendKind::RobotFramework
        );
        assert_eq!(BackendKind::from("UFT".to_string()), BackendKind::Uft);
        assert_eq!(
            BackendKind::from("robot".to_string()),
            BackendKind::Unknown("robot".to_string())
        );
        assert_eq!(BackendKind::Uft.to_string(), "UFT");
    }

    #[tokio::test]
    async fn test_zero_exit_passes() {
        let config = config("Robot Framework");
        let inv = Invocation {
            task: &config.tasks["t"],
            test_case: "Case",
            data_file: "data.xlsx",
            report_dir: Path::new("out/t_task1"),
        };
        let mut executor = RecordingExecutor::new();
        let ctx = RunContext::new();

        let outcome = invoke(&mut executor, &config.executables, &ctx, &inv).await;
        assert_eq!(outcome, InvokeOutcome::Passed);
        assert_eq!(executor.calls.len(), 1);
        assert_eq!(executor.calls[0].command.program, "robot");
    }

    #[tokio::test]
    async fn test_non_zero_exit_fails() {
        let config = config("UFT");
        let inv = Invocation {
            task: &config.tasks["t"],
            test_case: "Case",
            data_file: "data.xlsx",
            report_dir: Path::new("out/t_task1"),
        };
        let mut executor = RecordingExecutor::new().fail_on_call(1);
        let ctx = RunContext::new();

        let outcome = invoke(&mut executor, &config.executables, &ctx, &inv).await;
        assert_eq!(outcome, InvokeOutcome::Failed { code: Some(1) });
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_unknown_backend_spawns_nothing() {
        let config = config("Cypress");
        let inv = Invocation {
            task: &config.tasks["t"],
            test_case: "Case",
            data_file: "data.xlsx",
            report_dir: Path::new("out/t_task1"),
        };
        let mut executor = RecordingExecutor::new();
        let ctx = RunContext::new();

        let outcome = invoke(&mut executor, &config.executables, &ctx, &inv).await;
        assert_eq!(outcome, InvokeOutcome::UnknownBackend("Cypress".to_string()));
        assert!(executor.calls.is_empty());
        assert!(outcome.to_string().contains("Cypress"));
    }

    #[tokio::test]
    async fn test_spawn_error_is_a_failure() {
        let config = config("Robot Framework");
        let inv = Invocation {
            task: &config.tasks["t"],
            test_case: "Case",
            data_file: "data.xlsx",
            report_dir: Path::new("out/t_task1"),
        };
        let mut executor = RecordingExecutor::new().spawn_error_on_call(1);
        let ctx = RunContext::new();

        let outcome = invoke(&mut executor, &config.executables, &ctx, &inv).await;
        assert!(matches!(outcome, InvokeOutcome::SpawnFailed(_)));
    }
}

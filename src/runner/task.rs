//! Task runner
//!
//! Runs every test case of a task, `iteration_no` times, stopping at the
//! first failed invocation. The side-channel state is merged after every
//! iteration, including the one that failed.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::backend::{self, BackendKind, Executor, InvokeOutcome, Invocation};
use crate::common::config::{Executables, Task};
use crate::common::paths;
use crate::environment::{self, RunContext};

/// Everything needed to run one task for one data file
#[derive(Debug, Clone, Copy)]
pub struct TaskRun<'a> {
    pub key: &'a str,
    pub task: &'a Task,
    pub data_file: &'a str,
    pub suffix: usize,
    pub state_file: &'a Path,
    pub executables: &'a Executables,
}

/// Result of running a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Passed {
        iterations: u32,
        invocations: usize,
    },
    Failed {
        iteration: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        test_case: Option<String>,
        reason: String,
    },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Passed { .. })
    }
}

/// Run a task for one data file
pub async fn run_task<E: Executor + ?Sized>(
    executor: &mut E,
    ctx: &mut RunContext,
    run: &TaskRun<'_>,
) -> TaskOutcome {
    if let BackendKind::Unknown(name) = &run.task.framework {
        let outcome = InvokeOutcome::UnknownBackend(name.clone());
        tracing::error!(task = run.key, "{}", outcome);
        println!("  {} {}", "✗".red(), outcome);
        return TaskOutcome::Failed {
            iteration: 1,
            test_case: None,
            reason: outcome.to_string(),
        };
    }

    let report_dir = paths::task_report_dir(&run.task.report_path, run.suffix);
    if let Err(e) = paths::ensure_dir(&report_dir) {
        tracing::error!(
            "Cannot create report directory '{}': {}",
            report_dir.display(),
            e
        );
        return TaskOutcome::Failed {
            iteration: 1,
            test_case: None,
            reason: format!(
                "cannot create report directory '{}': {}",
                report_dir.display(),
                e
            ),
        };
    }

    let total = run.task.iteration_no;
    let mut invocations = 0;

    for iteration in 1..=total {
        let mut failure: Option<(&str, InvokeOutcome)> = None;

        for test_case in &run.task.test_cases {
            println!(
                "  Running: {}, Iteration: {}/{}, Test Data File: {}",
                test_case.white(),
                iteration,
                total,
                run.data_file.dimmed()
            );

            let inv = Invocation {
                task: run.task,
                test_case,
                data_file: run.data_file,
                report_dir: &report_dir,
            };

            let outcome = backend::invoke(executor, run.executables, ctx, &inv).await;
            invocations += 1;

            if outcome.is_success() {
                println!("  {} {}", "✓".green(), test_case.dimmed());
            } else {
                println!("  {} Test case {} failed: {}", "✗".red(), test_case, outcome);
                failure = Some((test_case.as_str(), outcome));
                break;
            }
        }

        merge_state(run.state_file, ctx);

        if let Some((test_case, outcome)) = failure {
            tracing::warn!(
                task = run.key,
                data_file = run.data_file,
                iteration,
                "Test case '{}' failed: {}",
                test_case,
                outcome
            );
            return TaskOutcome::Failed {
                iteration,
                test_case: Some(test_case.to_string()),
                reason: outcome.to_string(),
            };
        }
    }

    TaskOutcome::Passed {
        iterations: total,
        invocations,
    }
}

/// Merge the side-channel file; a malformed file is logged and skipped
fn merge_state(state_file: &Path, ctx: &mut RunContext) {
    if let Err(e) = environment::propagate(state_file, ctx) {
        tracing::warn!("{}", e);
    }
}

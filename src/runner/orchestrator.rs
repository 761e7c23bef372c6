//! Orchestration loop
//!
//! data files (outer) → global iterations → tasks in declared order.
//! A failed task ends its pass; the next pass or data file still runs, and
//! every data file's reports are exported once all of its passes finish.

use colored::Colorize;

use super::summary::{DataFileSummary, PassOutcome, PassSummary, RunSummary, TaskSummary};
use super::task::{run_task, TaskRun};
use crate::backend::Executor;
use crate::common::config::Config;
use crate::environment::RunContext;
use crate::report;

/// Drives a whole run over one configuration
pub struct Orchestrator<'a, E> {
    config: &'a Config,
    executor: E,
    ctx: RunContext,
}

impl<'a, E: Executor> Orchestrator<'a, E> {
    pub fn new(config: &'a Config, executor: E) -> Self {
        Self {
            config,
            executor,
            ctx: RunContext::for_state_file(&config.output_temp_file),
        }
    }

    /// Environment accumulated so far
    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run every data file and return what happened
    pub async fn run(&mut self) -> RunSummary {
        let config = self.config;
        let mut summary = RunSummary::default();

        for (index, data_file) in config.test_data_files.iter().enumerate() {
            let suffix = index + 1;

            println!(
                "\n{} {} {}",
                "========= Running for Test Data File:".blue().bold(),
                data_file.white().bold(),
                "=========".blue().bold()
            );

            let mut passes = Vec::new();
            for iteration in 1..=config.task_iteration {
                passes.push(self.run_pass(data_file, suffix, iteration).await);
            }

            let report_dir = config.report_dir(suffix);
            let export_dir = config.export_dir(suffix);
            let (export, export_error) = match report::export_reports(&report_dir, &export_dir) {
                Ok(export) => {
                    tracing::info!(
                        "Exported {} result file(s) and {} image(s) to {}",
                        export.merged_sources,
                        export.images_copied,
                        export_dir.display()
                    );
                    (Some(export), None)
                }
                Err(e) => {
                    tracing::error!("Report export for '{}' failed: {}", data_file, e);
                    (None, Some(e.to_string()))
                }
            };

            summary.data_files.push(DataFileSummary {
                data_file: data_file.clone(),
                suffix,
                passes,
                report_dir,
                export_dir,
                export,
                export_error,
            });
        }

        summary
    }

    /// One pass over the task list; stops at the first failed task
    async fn run_pass(&mut self, data_file: &str, suffix: usize, iteration: u32) -> PassSummary {
        let config = self.config;
        let mut tasks = Vec::new();

        for (key, task) in &config.tasks {
            println!(
                "\n{} {}: {}",
                "Executing".cyan(),
                key,
                task.display_name(key).white().bold()
            );

            let run = TaskRun {
                key,
                task,
                data_file,
                suffix,
                state_file: &config.output_temp_file,
                executables: &config.executables,
            };
            let outcome = run_task(&mut self.executor, &mut self.ctx, &run).await;
            let failed = !outcome.is_success();

            tasks.push(TaskSummary {
                key: key.clone(),
                outcome,
            });

            if failed {
                println!(
                    "{} {}",
                    "Stopping further tasks for:".yellow(),
                    data_file
                );
                return PassSummary {
                    iteration,
                    outcome: PassOutcome::Stopped { task: key.clone() },
                    tasks,
                };
            }
        }

        PassSummary {
            iteration,
            outcome: PassOutcome::Completed,
            tasks,
        }
    }
}

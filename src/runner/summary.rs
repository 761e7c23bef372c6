//! Run summary
//!
//! Collected by the orchestrator, printed at the end of a run and written
//! as JSON next to the exported reports.

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use super::task::TaskOutcome;
use crate::common::Result;
use crate::report::ExportSummary;

/// Outcome of one pass over the task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassOutcome {
    /// Every task passed
    Completed,
    /// A task failed and the remaining tasks were skipped
    Stopped { task: String },
}

/// One task's result within a pass
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub key: String,
    pub outcome: TaskOutcome,
}

/// One global iteration over the task list for a data file
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub iteration: u32,
    pub outcome: PassOutcome,
    pub tasks: Vec<TaskSummary>,
}

/// Everything that happened for one data file
#[derive(Debug, Clone, Serialize)]
pub struct DataFileSummary {
    pub data_file: String,
    pub suffix: usize,
    pub passes: Vec<PassSummary>,
    pub report_dir: PathBuf,
    pub export_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_error: Option<String>,
}

impl DataFileSummary {
    pub fn has_failures(&self) -> bool {
        self.passes
            .iter()
            .any(|p| matches!(p.outcome, PassOutcome::Stopped { .. }))
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub data_files: Vec<DataFileSummary>,
}

impl RunSummary {
    /// Whether any pass stopped on a failed task
    pub fn has_failures(&self) -> bool {
        self.data_files.iter().any(DataFileSummary::has_failures)
    }

    /// Write the summary as pretty JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Print a per-data-file overview
    pub fn print(&self) {
        println!("\n{}", "Summary:".cyan().bold());
        for file in &self.data_files {
            let mark = if file.has_failures() {
                "✗".red()
            } else {
                "✓".green()
            };
            let stopped = file
                .passes
                .iter()
                .filter(|p| matches!(p.outcome, PassOutcome::Stopped { .. }))
                .count();
            println!(
                "  {} [{}] {} ({} of {} passes stopped)",
                mark,
                file.suffix,
                file.data_file.white().bold(),
                stopped,
                file.passes.len()
            );
            match (&file.export, &file.export_error) {
                (Some(export), _) => {
                    println!(
                        "      exported {} result file(s), {} image(s) to {}",
                        export.merged_sources,
                        export.images_copied,
                        file.export_dir.display().to_string().dimmed()
                    );
                    for skipped in &export.skipped_sources {
                        println!(
                            "      {} {}",
                            "unreadable result skipped:".yellow(),
                            skipped.display()
                        );
                    }
                }
                (None, Some(err)) => println!("      {} {}", "export failed:".red(), err),
                (None, None) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_file(outcomes: Vec<PassOutcome>) -> DataFileSummary {
        DataFileSummary {
            data_file: "d.xlsx".to_string(),
            suffix: 1,
            passes: outcomes
                .into_iter()
                .enumerate()
                .map(|(i, outcome)| PassSummary {
                    iteration: i as u32 + 1,
                    outcome,
                    tasks: Vec::new(),
                })
                .collect(),
            report_dir: PathBuf::from("r/1"),
            export_dir: PathBuf::from("e/1"),
            export: None,
            export_error: None,
        }
    }

    #[test]
    fn test_failure_detection() {
        let mut summary = RunSummary::default();
        summary
            .data_files
            .push(data_file(vec![PassOutcome::Completed]));
        assert!(!summary.has_failures());

        summary.data_files.push(data_file(vec![
            PassOutcome::Completed,
            PassOutcome::Stopped {
                task: "t2".to_string(),
            },
        ]));
        assert!(summary.has_failures());
    }

    #[test]
    fn test_json_shape() {
        let summary = RunSummary {
            data_files: vec![data_file(vec![PassOutcome::Stopped {
                task: "login".to_string(),
            }])],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run-summary.json");
        summary.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let pass = &value["data_files"][0]["passes"][0];
        assert_eq!(pass["outcome"]["status"], "stopped");
        assert_eq!(pass["outcome"]["task"], "login");
        assert!(value["data_files"][0].get("export").is_none());
    }
}

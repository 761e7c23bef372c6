//! Report aggregation
//!
//! Turns the raw report tree backends leave behind for one data file into
//! an export directory holding a single combined xUnit report and a flat
//! copy of every screenshot.

pub mod robot;
pub mod xunit;

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::common::paths;
use crate::common::Result;

/// Result file name written by Robot Framework
pub const RESULT_FILE_NAME: &str = "output.xml";

/// File name of the combined report in the export directory
pub const MERGED_FILE_NAME: &str = "outputxunit.xml";

/// Screenshot extensions (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// What one export produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Number of result files merged
    pub merged_sources: usize,
    /// Combined report, when at least one result file was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_report: Option<PathBuf>,
    /// Number of images copied
    pub images_copied: usize,
    /// Result files that could not be read and were left out of the merge
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_sources: Vec<PathBuf>,
}

/// Export a report directory into an export directory
///
/// The export directory is created if needed. A missing report directory
/// produces an empty export rather than an error. Images are copied before
/// merging, and an unreadable result file is skipped so the remaining
/// results are still merged.
pub fn export_reports(report_dir: &Path, export_dir: &Path) -> Result<ExportSummary> {
    paths::ensure_dir(export_dir)?;

    let result_files = collect_files(report_dir, |path| {
        path.file_name().is_some_and(|name| name == RESULT_FILE_NAME)
    })?;
    let images = collect_files(report_dir, is_image)?;

    let mut summary = ExportSummary::default();

    for image in &images {
        let Some(name) = image.file_name() else {
            continue;
        };
        std::fs::copy(image, export_dir.join(name))?;
        summary.images_copied += 1;
    }

    let mut suites = Vec::with_capacity(result_files.len());
    for path in result_files {
        match robot::read_output(&path) {
            Ok(suite) => suites.push(suite),
            Err(e) => {
                tracing::warn!("Skipping result file: {}", e);
                summary.skipped_sources.push(path);
            }
        }
    }

    if !suites.is_empty() {
        let dest = export_dir.join(MERGED_FILE_NAME);
        xunit::write_combined(&suites, &dest)?;

        tracing::debug!("Merged {} result file(s) into {}", suites.len(), dest.display());
        summary.merged_sources = suites.len();
        summary.merged_report = Some(dest);
    }

    Ok(summary)
}

/// Recursively collect files under `dir` matching `filter`, in path order
fn collect_files(dir: &Path, filter: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && filter(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

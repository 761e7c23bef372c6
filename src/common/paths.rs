//! Report and export directory layout
//!
//! Backends write into `{report_path}_task{suffix}`; the aggregator reads
//! `{report_root}/{suffix}` and writes `{export_root}/{suffix}`.

use std::io;
use std::path::{Path, PathBuf};

/// Default root of raw backend reports
pub const DEFAULT_REPORT_ROOT: &str = "./E2E_Adbreak_Automation/reports";

/// Default root of exported reports
pub const DEFAULT_EXPORT_ROOT: &str = "./E2E_Adbreak_Automation/exported_reports";

/// File name of the run summary written under the export root
pub const SUMMARY_FILE_NAME: &str = "run-summary.json";

/// Placeholder in a task's `report_path` replaced by the data-file suffix
pub const SUFFIX_PLACEHOLDER: &str = "{suffix}";

/// Report directory a task writes into for one data file
///
/// The suffix is appended to the template as text, so `reports/login`
/// becomes `reports/login_task1`. A `{suffix}` placeholder is substituted
/// first, which lets `reports/{suffix}/login` land under the report root
/// the aggregator reads.
pub fn task_report_dir(report_path: &str, suffix: usize) -> PathBuf {
    let suffix = suffix.to_string();
    let base = report_path.replace(SUFFIX_PLACEHOLDER, &suffix);
    PathBuf::from(format!("{}_task{}", base, suffix))
}

/// Directory keyed by a data-file suffix under a root
pub fn suffix_dir(root: &Path, suffix: usize) -> PathBuf {
    root.join(suffix.to_string())
}

/// Ensure a directory exists, creating parents as needed
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_report_dir_appends_suffix() {
        assert_eq!(
            task_report_dir("./reports/login", 3),
            PathBuf::from("./reports/login_task3")
        );
    }

    #[test]
    fn test_task_report_dir_substitutes_placeholder() {
        assert_eq!(
            task_report_dir("out/reports/{suffix}/login", 2),
            PathBuf::from("out/reports/2/login_task2")
        );
    }

    #[test]
    fn test_suffix_dir() {
        assert_eq!(
            suffix_dir(Path::new(DEFAULT_EXPORT_ROOT), 1),
            PathBuf::from("./E2E_Adbreak_Automation/exported_reports/1")
        );
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}

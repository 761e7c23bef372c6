//! Run configuration handling
//!
//! The run configuration is a YAML document (TOML when the file extension is
//! `.toml`) describing the test-data files, the global iteration count and
//! the ordered task list.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};

use super::paths;
use super::{Error, Result};
use crate::backend::BackendKind;

/// Main configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Side-channel state file written by backends after each run
    pub output_temp_file: PathBuf,

    /// Test-data file identifiers, in execution order
    #[serde(rename = "test_data_file", deserialize_with = "data_file_list")]
    pub test_data_files: Vec<String>,

    /// Number of passes over the task list per data file
    #[serde(default = "default_iteration")]
    pub task_iteration: u32,

    /// Tasks keyed by task id, in declared order
    #[serde(default)]
    pub tasks: IndexMap<String, Task>,

    /// Root of the per-data-file report directories
    #[serde(default = "default_report_root")]
    pub report_root: PathBuf,

    /// Root of the per-data-file export directories
    #[serde(default = "default_export_root")]
    pub export_root: PathBuf,

    /// Backend executables
    #[serde(default)]
    pub executables: Executables,

    /// Exit with a failure status when any pass stopped on a failed task
    #[serde(default)]
    pub strict_exit: bool,

    /// Directory for the persistent run log
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

/// A configured unit of work: test cases run through one backend
#[derive(Debug, Deserialize, Clone)]
pub struct Task {
    /// Display name (defaults to the task key)
    #[serde(default)]
    pub name: Option<String>,

    /// Base directory for backends that resolve tests relative to a root
    #[serde(default)]
    pub root_path: PathBuf,

    /// Test suite or test path handed to the backend
    pub test_path: String,

    /// Test case identifiers, in execution order
    #[serde(default)]
    pub test_cases: Vec<String>,

    /// Backend that executes this task
    pub framework: BackendKind,

    /// Tags selecting tests inside the suite
    #[serde(default, rename = "Tags", alias = "tags")]
    pub tags: Option<Vec<String>>,

    /// Variables injected into the backend
    #[serde(default, rename = "Variables", alias = "variables")]
    pub variables: Option<IndexMap<String, ScalarValue>>,

    /// How many times the task's test cases are repeated
    #[serde(default = "default_iteration")]
    pub iteration_no: u32,

    /// Extra command-line argument appended to the backend command
    #[serde(default)]
    pub argument: Option<String>,

    /// Report directory template; the data-file suffix is appended
    pub report_path: String,
}

impl Task {
    /// Name used in progress messages
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(key)
    }

    /// Tags, empty when none are configured
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    /// Variables in declared order
    pub fn variables(&self) -> impl Iterator<Item = (&String, &ScalarValue)> {
        self.variables.iter().flat_map(|vars| vars.iter())
    }
}

/// A scalar configuration value rendered as a string on the command line
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Float(x) => write!(f, "{}", x),
            ScalarValue::Text(s) => f.write_str(s),
        }
    }
}

/// Backend executables
#[derive(Debug, Deserialize, Clone)]
pub struct Executables {
    /// Robot Framework runner
    #[serde(default = "default_robot")]
    pub robot: String,

    /// UFT batch runner
    #[serde(default = "default_uft")]
    pub uft: String,
}

impl Default for Executables {
    fn default() -> Self {
        Self {
            robot: default_robot(),
            uft: default_uft(),
        }
    }
}

fn default_iteration() -> u32 {
    1
}

fn default_report_root() -> PathBuf {
    PathBuf::from(paths::DEFAULT_REPORT_ROOT)
}

fn default_export_root() -> PathBuf {
    PathBuf::from(paths::DEFAULT_EXPORT_ROOT)
}

fn default_robot() -> String {
    "robot".to_string()
}

fn default_uft() -> String {
    "uft_batch_runner".to_string()
}

/// Accepts either `"a.xlsx, b.xlsx"` or a list of identifiers
fn data_file_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DataFiles {
        Joined(String),
        List(Vec<String>),
    }

    let files = match DataFiles::deserialize(deserializer)? {
        DataFiles::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        DataFiles::List(list) => list,
    };

    Ok(files
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect())
}

impl Config {
    /// Load the run configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };

        config.map_err(|e| match e {
            Error::Config(reason) => Error::config_parse(path, reason),
            other => other,
        })
    }

    /// Parse and validate a YAML configuration
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.test_data_files.is_empty() {
            return Err(Error::Config(
                "'test_data_file' must name at least one data file".to_string(),
            ));
        }

        if self.task_iteration == 0 {
            return Err(Error::Config(
                "'task_iteration' must be a positive integer".to_string(),
            ));
        }

        for (key, task) in &self.tasks {
            if task.iteration_no == 0 {
                return Err(Error::Config(format!(
                    "Task '{}': 'iteration_no' must be a positive integer",
                    key
                )));
            }
        }

        Ok(())
    }

    /// Report directory for a data-file suffix
    pub fn report_dir(&self, suffix: usize) -> PathBuf {
        paths::suffix_dir(&self.report_root, suffix)
    }

    /// Export directory for a data-file suffix
    pub fn export_dir(&self, suffix: usize) -> PathBuf {
        paths::suffix_dir(&self.export_root, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
output_temp_file: ./temp.yaml
test_data_file: data_a.xlsx, data_b.xlsx
task_iteration: 2
tasks:
  task2:
    name: Book ad break
    root_path: C:/uft
    test_path: Booking
    test_cases: [Book]
    framework: UFT
    Tags: []
    report_path: ./reports/uft
  task1:
    name: Login
    root_path: .
    test_path: suites/login.robot
    test_cases: [Valid Login, Invalid Login]
    framework: Robot Framework
    Tags: [smoke]
    Variables:
      BROWSER: chrome
      RETRIES: 3
    iteration_no: 2
    argument: --dryrun
    report_path: ./reports/login
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.output_temp_file, PathBuf::from("./temp.yaml"));
        assert_eq!(config.test_data_files, vec!["data_a.xlsx", "data_b.xlsx"]);
        assert_eq!(config.task_iteration, 2);
        assert_eq!(config.report_root, PathBuf::from(paths::DEFAULT_REPORT_ROOT));
        assert_eq!(config.executables.robot, "robot");
        assert!(!config.strict_exit);

        // Declared order is preserved
        let keys: Vec<&str> = config.tasks.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["task2", "task1"]);

        let login = &config.tasks["task1"];
        assert_eq!(login.framework, BackendKind::RobotFramework);
        assert_eq!(login.iteration_no, 2);
        assert_eq!(login.tags(), ["smoke".to_string()]);
        let vars: Vec<String> = login
            .variables()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect();
        assert_eq!(vars, vec!["BROWSER:chrome", "RETRIES:3"]);

        let booking = &config.tasks["task2"];
        assert_eq!(booking.framework, BackendKind::Uft);
        assert_eq!(booking.iteration_no, 1);
        assert_eq!(booking.variables().count(), 0);
    }

    #[test]
    fn test_data_file_list_forms() {
        let config = Config::from_yaml_str(
            "output_temp_file: t.yaml\ntest_data_file: [one.csv, ' two.csv ']\n",
        )
        .unwrap();
        assert_eq!(config.test_data_files, vec!["one.csv", "two.csv"]);
        assert_eq!(config.task_iteration, 1);
        assert!(config.tasks.is_empty());

        let config =
            Config::from_yaml_str("output_temp_file: t.yaml\ntest_data_file: 'a,b, ,c'\n")
                .unwrap();
        assert_eq!(config.test_data_files, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_framework_is_kept() {
        let config = Config::from_yaml_str(
            r#"
output_temp_file: t.yaml
test_data_file: d1
tasks:
  t:
    test_path: x
    framework: Selenium
    report_path: r
"#,
        )
        .unwrap();
        assert_eq!(
            config.tasks["t"].framework,
            BackendKind::Unknown("Selenium".to_string())
        );
        assert_eq!(config.tasks["t"].display_name("t"), "t");
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let err = Config::from_yaml_str(
            "output_temp_file: t.yaml\ntest_data_file: d1\ntask_iteration: 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("task_iteration"));
    }

    #[test]
    fn test_rejects_missing_data_files() {
        assert!(Config::from_yaml_str("output_temp_file: t.yaml\ntest_data_file: ''\n").is_err());
    }

    #[test]
    fn test_toml_config() {
        let config = Config::from_toml_str(
            r#"
output_temp_file = "state.yaml"
test_data_file = "d1, d2"
strict_exit = true
report_root = "out/reports"
export_root = "out/exported"

[executables]
robot = "/opt/robot/bin/robot"

[tasks.smoke]
test_path = "suites/smoke.robot"
test_cases = ["Smoke"]
framework = "Robot Framework"
report_path = "out/reports/1/smoke"
"#,
        )
        .unwrap();
        assert!(config.strict_exit);
        assert_eq!(config.executables.robot, "/opt/robot/bin/robot");
        assert_eq!(config.executables.uft, "uft_batch_runner");
        assert_eq!(config.report_dir(2), PathBuf::from("out/reports/2"));
        assert_eq!(config.export_dir(1), PathBuf::from("out/exported/1"));
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "tasks: [").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }
}

//! Backend command construction
//!
//! One builder per backend. Builders are pure so the exact argument
//! vectors can be checked without spawning anything.

use std::fmt;
use std::path::Path;

use crate::common::config::{Executables, Task};

/// Variable carrying the current data-file identifier into a backend
pub const DATA_FILE_VARIABLE: &str = "TEST_DATA_FILE";

/// xUnit file name Robot Framework is asked to write next to its output
pub const XUNIT_FILE_NAME: &str = "outputxunit.xml";

/// A fully resolved external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Inputs for building one backend command
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub task: &'a Task,
    pub test_case: &'a str,
    pub data_file: &'a str,
    pub report_dir: &'a Path,
}

/// `robot -d <dir> -x outputxunit.xml [-v K:V].. -v TEST_DATA_FILE:<file> --test <case> <test_path> [argument]`
///
/// Task tags are not passed to the backend.
pub fn robot_framework(executables: &Executables, inv: &Invocation<'_>) -> CommandSpec {
    let mut args = vec![
        "-d".to_string(),
        inv.report_dir.display().to_string(),
        "-x".to_string(),
        XUNIT_FILE_NAME.to_string(),
    ];

    for (key, value) in inv.task.variables() {
        args.push("-v".to_string());
        args.push(format!("{}:{}", key, value));
    }

    args.push("-v".to_string());
    args.push(format!("{}:{}", DATA_FILE_VARIABLE, inv.data_file));
    args.push("--test".to_string());
    args.push(inv.test_case.to_string());
    args.push(inv.task.test_path.clone());

    if let Some(argument) = &inv.task.argument {
        args.push(argument.clone());
    }

    CommandSpec {
        program: executables.robot.clone(),
        args,
    }
}

/// `uft_batch_runner -test <root>/<test_path> -report <dir> -v TEST_DATA_FILE:<file> [argument]`
pub fn uft(executables: &Executables, inv: &Invocation<'_>) -> CommandSpec {
    let test = inv.task.root_path.join(&inv.task.test_path);

    let mut args = vec![
        "-test".to_string(),
        test.display().to_string(),
        "-report".to_string(),
        inv.report_dir.display().to_string(),
        "-v".to_string(),
        format!("{}:{}", DATA_FILE_VARIABLE, inv.data_file),
    ];

    if let Some(argument) = &inv.task.argument {
        args.push(argument.clone());
    }

    CommandSpec {
        program: executables.uft.clone(),
        args,
    }
}

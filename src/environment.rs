//! Run context and environment propagation
//!
//! Backends persist runtime-discovered values (ids created by one test,
//! consumed by the next) into a side-channel state file. After every task
//! iteration the file is merged into the [`RunContext`], whose variables are
//! applied to every later backend process.

use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::Value;

use crate::common::{Error, Result};

/// Variable exposing the side-channel file path to backends
pub const STATE_FILE_VARIABLE: &str = "temp_yaml_file";

/// Environment overrides accumulated over a run
///
/// Owned by the orchestrator and threaded explicitly into every invocation.
/// Later values for a key overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    vars: BTreeMap<String, String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with the side-channel path
    pub fn for_state_file(state_file: &Path) -> Self {
        let mut ctx = Self::new();
        ctx.set(STATE_FILE_VARIABLE, state_file.display().to_string());
        ctx
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }
}

/// Merge the side-channel state file into the context
///
/// A missing or empty file is a no-op. Returns the number of variables set.
pub fn propagate(state_file: &Path, ctx: &mut RunContext) -> Result<usize> {
    let content = match std::fs::read_to_string(state_file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("{} does not exist.", state_file.display());
            return Ok(0);
        }
        Err(e) => return Err(Error::file_read(state_file, e)),
    };

    if content.trim().is_empty() {
        tracing::info!(
            "No data found in {} to set as environment variables.",
            state_file.display()
        );
        return Ok(0);
    }

    let document: Value =
        serde_yaml::from_str(&content).map_err(|e| Error::state_file(state_file, e))?;

    let mapping = match document {
        Value::Null => {
            tracing::info!(
                "No data found in {} to set as environment variables.",
                state_file.display()
            );
            return Ok(0);
        }
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(Error::state_file(
                state_file,
                "top level must be a key/value mapping",
            ))
        }
    };

    let mut count = 0;
    for (key, value) in mapping {
        let key = render(&key).map_err(|e| Error::state_file(state_file, e))?;
        let value = render(&value).map_err(|e| Error::state_file(state_file, e))?;
        tracing::info!("Set environment variable: {}={}", key, value);
        ctx.set(key, value);
        count += 1;
    }

    Ok(count)
}

/// Render a YAML value as an environment string
///
/// Scalars keep their textual form; sequences and mappings become JSON.
/// A null value becomes an empty string.
fn render(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => render(&tagged.value)?,
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(value)?,
    })
}

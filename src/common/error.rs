//! Error types for the orchestrator
//!
//! Errors stay inside a component. Component boundaries report plain
//! outcome values so one failing backend never aborts the run.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the orchestrator
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file '{path}': {reason}")]
    ConfigParse { path: String, reason: String },

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Backend Errors ===
    #[error("Unknown backend '{0}'. Supported backends: 'Robot Framework', 'UFT'")]
    UnknownBackend(String),

    #[error("Backend executable '{program}' not found: {reason}")]
    ExecutableNotFound { program: String, reason: String },

    #[error("Failed to launch '{program}': {error}")]
    Spawn { program: String, error: String },

    // === State File Errors ===
    #[error("Invalid state file '{path}': {reason}")]
    StateFile { path: String, reason: String },

    // === Report Errors ===
    #[error("Failed to process result file '{path}': {reason}")]
    ResultParse { path: String, reason: String },

    #[error("Report export error: {0}")]
    Report(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a config parse error for a file
    pub fn config_parse(path: &Path, reason: impl ToString) -> Self {
        Self::ConfigParse {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &Path, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a state file error
    pub fn state_file(path: &Path, reason: impl ToString) -> Self {
        Self::StateFile {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a result parse error
    pub fn result_parse(path: &Path, reason: impl ToString) -> Self {
        Self::ResultParse {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

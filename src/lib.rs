//! E2E Orchestrator - sequential end-to-end test driver
//!
//! Runs configured test tasks through external backends (Robot Framework,
//! UFT) for every test-data file, carries runtime state between runs and
//! exports one consolidated report tree per data file.

pub mod backend;
pub mod common;
pub mod environment;
pub mod report;
pub mod runner;

// Re-export commonly used types
pub use common::config::Config;
pub use common::{Error, Result};
pub use environment::RunContext;
pub use runner::{Orchestrator, RunSummary};

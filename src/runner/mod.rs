//! Run execution
//!
//! The orchestrator walks data files, global iterations and tasks in
//! order. Each level reports an explicit outcome to the level above:
//! a failed test case ends its task, a failed task ends its pass.

mod orchestrator;
mod summary;
mod task;

pub use orchestrator::Orchestrator;
pub use summary::{DataFileSummary, PassOutcome, PassSummary, RunSummary, TaskSummary};
pub use task::{run_task, TaskOutcome, TaskRun};

//! Command-line workflow support

pub mod orchestration;

pub use orchestration::{
    Change, Mode, ReleaseOrchestrator, ReleaseSummary, Stage, WorkflowResult,
};

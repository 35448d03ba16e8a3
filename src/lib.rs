//! taxopipe - sequential external-command pipelines for taxonomic profiling

pub mod cli;
pub mod core;
pub mod execution;
pub mod process;
pub mod workflows;

// Re-export commonly used types
pub use crate::core::{CommandSpec, ExecutionStatus, MissingPolicy, Pipeline, Precondition, Step, StepState};
pub use crate::execution::{ExecutionEngine, ExecutionEvent, ExecutionResult, PipelineError, RunReport, StepFailure};
pub use crate::process::{CommandRunner, ProcessError, ProcessOutput, SubprocessRunner};
pub use crate::workflows::WorkflowConfig;

//! Pipeline execution engine

pub mod engine;
pub mod executor;

pub use engine::{ExecutionEngine, ExecutionEvent, PipelineError, RunReport};
pub use executor::{StepExecutor, ExecutionResult, StepFailure};

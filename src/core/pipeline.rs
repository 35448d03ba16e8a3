//! Pipeline domain model

use crate::core::{
    condition::{MissingPolicy, Precondition},
    state::{PipelineState, StepState},
    step::{CommandSpec, Step},
};
use serde::Serialize;
use std::path::PathBuf;

/// An ordered, fixed sequence of steps
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Directory created before the first step runs
    pub output_dir: Option<PathBuf>,

    /// Steps in declared (and execution) order
    pub steps: Vec<Step>,

    /// Execution state
    pub state: PipelineState,
}

/// Serializable view of one step, used by dry runs and `validate --json`
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub id: String,
    pub name: String,
    pub command: CommandSpec,
    pub precondition: Option<Precondition>,
    pub on_missing: MissingPolicy,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_dir: None,
            steps: Vec::new(),
            state: PipelineState::new(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Append a step at the end of the pipeline
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.push(step);
        self
    }

    /// Get a step by ID
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Get a mutable step by ID
    pub fn step_mut(&mut self, id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == id)
    }

    /// Step IDs in execution order
    pub fn execution_order(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    /// IDs of steps whose process was launched, in order
    pub fn executed_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.state.was_executed())
            .map(|s| s.id.as_str())
            .collect()
    }

    /// IDs of skipped steps, in order
    pub fn skipped_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| matches!(s.state, StepState::Skipped { .. }))
            .map(|s| s.id.as_str())
            .collect()
    }

    /// Reset all step states so the pipeline can be executed again
    pub fn reset(&mut self) {
        for step in &mut self.steps {
            step.state = StepState::Pending;
        }
        self.state = PipelineState::new();
    }

    /// The ordered plan, without touching the filesystem
    pub fn plan(&self) -> Vec<PlannedStep> {
        self.steps
            .iter()
            .map(|s| PlannedStep {
                id: s.id.clone(),
                name: s.name.clone(),
                command: s.command.clone(),
                precondition: s.precondition.clone(),
                on_missing: s.on_missing,
            })
            .collect()
    }
}

//! Step executor - runs individual steps through a command runner

use crate::{
    core::Step,
    process::CommandRunner,
};
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

/// Outcome of a step whose process exited with status 0
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub step_id: String,
    pub exit_code: i32,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub duration: Duration,
}

/// A step did not succeed; the pipeline halts
#[derive(Debug, Clone, Error)]
#[error("step '{step_name}' ({step_id}) failed: {reason}\n  command: {command}")]
pub struct StepFailure {
    pub step_id: String,
    pub step_name: String,
    /// Rendered command line
    pub command: String,
    /// `None` when no exit status exists (spawn error, signal, unmet precondition)
    pub exit_code: Option<i32>,
    /// Whether a process was launched for the step
    pub spawned: bool,
    pub reason: String,
}

impl StepFailure {
    /// The step's process ran and did not exit with status 0
    pub fn exited(step: &Step, exit_code: Option<i32>, reason: impl Into<String>) -> Self {
        Self::build(step, exit_code, true, reason.into())
    }

    /// No process was launched (spawn error or unmet precondition)
    pub fn not_started(step: &Step, reason: impl Into<String>) -> Self {
        Self::build(step, None, false, reason.into())
    }

    fn build(step: &Step, exit_code: Option<i32>, spawned: bool, reason: String) -> Self {
        Self {
            step_id: step.id.clone(),
            step_name: step.name.clone(),
            command: step.command.to_string(),
            exit_code,
            spawned,
            reason,
        }
    }
}

/// Executes a single step
pub struct StepExecutor<R> {
    runner: R,
}

impl<R: CommandRunner> StepExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Run the step's command to completion
    ///
    /// The command is logged before it is spawned. Any outcome other than
    /// exit status 0 becomes a [`StepFailure`].
    pub async fn run_step(&self, step: &Step) -> Result<ExecutionResult, StepFailure> {
        info!("Running step {}: {}", step.id, step.command);

        let started = Instant::now();
        let output = self
            .runner
            .run(&step.command, step.capture_output)
            .await
            .map_err(|e| {
                error!("Step {} could not run: {}", step.id, e);
                StepFailure::not_started(step, e.to_string())
            })?;
        let duration = started.elapsed();

        match output.exit_code {
            Some(0) => {
                debug!("Step {} finished in {:?}", step.id, duration);
                Ok(ExecutionResult {
                    step_id: step.id.clone(),
                    exit_code: 0,
                    stdout: output.stdout,
                    stderr: output.stderr,
                    duration,
                })
            }
            Some(code) => {
                let mut reason = format!("exited with code {}", code);
                if let Some(stderr) = output.stderr.as_deref().map(str::trim) {
                    if !stderr.is_empty() {
                        reason.push_str(&format!(": {}", stderr));
                    }
                }
                error!("Step {} {}", step.id, reason);
                Err(StepFailure::exited(step, Some(code), reason))
            }
            None => {
                error!("Step {} was terminated by a signal", step.id);
                Err(StepFailure::exited(step, None, "terminated by signal"))
            }
        }
    }
}

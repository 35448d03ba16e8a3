//! Main execution engine - runs a pipeline top to bottom, halting on the first failure

use crate::{
    core::{ExecutionStatus, MissingPolicy, Pipeline, StepState},
    execution::{ExecutionResult, StepExecutor, StepFailure},
    process::CommandRunner,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        pipeline_name: String,
        total_steps: usize,
    },
    StepStarted {
        step_id: String,
        index: usize,
        command: String,
    },
    StepSkipped {
        step_id: String,
        reason: String,
    },
    StepCompleted {
        step_id: String,
        duration: Duration,
    },
    StepFailed {
        step_id: String,
        error: String,
    },
    PipelineCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Reasons a pipeline run stops early
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    StepFailed(#[from] StepFailure),

    #[error("failed to create output directory {}: {}", .path.display(), .source)]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// The failing step, when the error came from one
    pub fn step_failure(&self) -> Option<&StepFailure> {
        match self {
            PipelineError::StepFailed(failure) => Some(failure),
            PipelineError::OutputDir { .. } => None,
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub execution_id: Uuid,
    pub pipeline_name: String,
    /// One entry per executed step, in order
    pub results: Vec<ExecutionResult>,
    /// IDs of steps skipped because their precondition was unmet
    pub skipped: Vec<String>,
    pub duration: Duration,
}

/// Main pipeline execution engine
pub struct ExecutionEngine<R> {
    executor: StepExecutor<R>,
    event_handlers: Vec<EventHandler>,
}

impl<R: CommandRunner> ExecutionEngine<R> {
    pub fn new(runner: R) -> Self {
        Self {
            executor: StepExecutor::new(runner),
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute the entire pipeline
    ///
    /// Steps run strictly one after another in declared order. A step with
    /// an unmet precondition is skipped (or fails, per its policy). The
    /// first failure stops the run; later steps stay `Pending`.
    pub async fn execute(&self, pipeline: &mut Pipeline) -> Result<RunReport, PipelineError> {
        if pipeline.state.status != ExecutionStatus::Pending {
            pipeline.reset();
        }

        let execution_id = pipeline.state.execution_id;
        let started = Instant::now();

        info!("Starting pipeline execution: {} ({})", pipeline.name, execution_id);
        self.emit_event(ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name: pipeline.name.clone(),
            total_steps: pipeline.steps.len(),
        });

        pipeline.state.start(pipeline.steps.len());

        if let Some(dir) = pipeline.output_dir.clone() {
            if let Err(source) = tokio::fs::create_dir_all(&dir).await {
                error!("Cannot create output directory {}: {}", dir.display(), source);
                self.finish(pipeline, ExecutionStatus::Failed);
                return Err(PipelineError::OutputDir { path: dir, source });
            }
        }

        let mut results = Vec::new();
        let mut skipped = Vec::new();

        for index in 0..pipeline.steps.len() {
            let step = pipeline.steps[index].clone();
            pipeline.state.current_step = Some(index);

            if let Some(condition) = step.unmet_precondition() {
                let reason = condition.unmet_reason();
                match step.on_missing {
                    MissingPolicy::Skip => {
                        warn!("Skipping step {}: {}", step.id, reason);
                        pipeline.steps[index].state = StepState::Skipped {
                            reason: reason.clone(),
                        };
                        pipeline.state.skipped_steps += 1;
                        self.emit_event(ExecutionEvent::StepSkipped {
                            step_id: step.id.clone(),
                            reason,
                        });
                        skipped.push(step.id);
                        continue;
                    }
                    MissingPolicy::Fail => {
                        error!("Step {} cannot run: {}", step.id, reason);
                        let failure = StepFailure::not_started(&step, reason);
                        return Err(self.halt(pipeline, index, failure));
                    }
                }
            }

            pipeline.steps[index].state = StepState::Running {
                started_at: chrono::Utc::now(),
            };
            self.emit_event(ExecutionEvent::StepStarted {
                step_id: step.id.clone(),
                index,
                command: step.command.to_string(),
            });

            match self.executor.run_step(&step).await {
                Ok(result) => {
                    let completed_at = chrono::Utc::now();
                    let started_at = match pipeline.steps[index].state {
                        StepState::Running { started_at } => started_at,
                        _ => completed_at,
                    };
                    pipeline.steps[index].state = StepState::Completed {
                        exit_code: result.exit_code,
                        started_at,
                        completed_at,
                    };
                    pipeline.state.completed_steps += 1;
                    self.emit_event(ExecutionEvent::StepCompleted {
                        step_id: step.id.clone(),
                        duration: result.duration,
                    });
                    results.push(result);
                }
                Err(failure) => return Err(self.halt(pipeline, index, failure)),
            }
        }

        self.finish(pipeline, ExecutionStatus::Completed);
        info!(
            "Pipeline execution finished: {} ({} run, {} skipped)",
            pipeline.name,
            results.len(),
            skipped.len()
        );

        Ok(RunReport {
            execution_id,
            pipeline_name: pipeline.name.clone(),
            results,
            skipped,
            duration: started.elapsed(),
        })
    }

    /// Record a step failure and stop the pipeline
    fn halt(&self, pipeline: &mut Pipeline, index: usize, failure: StepFailure) -> PipelineError {
        pipeline.steps[index].state = StepState::Failed {
            error: failure.reason.clone(),
            exit_code: failure.exit_code,
            spawned: failure.spawned,
            failed_at: chrono::Utc::now(),
        };
        self.emit_event(ExecutionEvent::StepFailed {
            step_id: failure.step_id.clone(),
            error: failure.reason.clone(),
        });
        self.finish(pipeline, ExecutionStatus::Failed);
        PipelineError::StepFailed(failure)
    }

    fn finish(&self, pipeline: &mut Pipeline, status: ExecutionStatus) {
        match status {
            ExecutionStatus::Completed => pipeline.state.complete(),
            _ => pipeline.state.fail(),
        }
        self.emit_event(ExecutionEvent::PipelineCompleted {
            execution_id: pipeline.state.execution_id,
            status,
        });
    }
}

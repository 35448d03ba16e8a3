//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Pipeline has not started
    Pending,
    /// Pipeline is currently running
    Running,
    /// Every mandatory step succeeded
    Completed,
    /// A step failed and the pipeline halted
    Failed,
}

/// State of a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StepState {
    /// Step has not been reached
    Pending,
    /// Step's process is running
    Running {
        started_at: DateTime<Utc>,
    },
    /// Process exited with status 0
    Completed {
        exit_code: i32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Process failed, could not be spawned, or a mandatory precondition was unmet
    Failed {
        error: String,
        exit_code: Option<i32>,
        /// Whether the process was launched; false for spawn errors and unmet preconditions
        spawned: bool,
        failed_at: DateTime<Utc>,
    },
    /// Precondition unmet, step skipped
    Skipped {
        reason: String,
    },
}

impl StepState {
    /// Whether a process was actually launched for this step
    pub fn was_executed(&self) -> bool {
        match self {
            StepState::Completed { .. } => true,
            StepState::Failed { spawned, .. } => *spawned,
            _ => false,
        }
    }
}

/// Overall pipeline state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Unique execution ID
    pub execution_id: Uuid,

    /// Current execution status
    pub status: ExecutionStatus,

    /// When execution started
    pub started_at: Option<DateTime<Utc>>,

    /// When execution completed/failed
    pub completed_at: Option<DateTime<Utc>>,

    /// Total number of steps
    pub total_steps: usize,

    /// Number of completed steps
    pub completed_steps: usize,

    /// Number of skipped steps
    pub skipped_steps: usize,

    /// Index of the step currently running
    pub current_step: Option<usize>,
}

impl PipelineState {
    /// Create a new pipeline state
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            total_steps: 0,
            completed_steps: 0,
            skipped_steps: 0,
            current_step: None,
        }
    }

    /// Mark pipeline as started
    pub fn start(&mut self, total_steps: usize) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
        self.total_steps = total_steps;
    }

    /// Mark pipeline as completed
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.current_step = None;
    }

    /// Mark pipeline as failed; `current_step` keeps pointing at the failed step
    pub fn fail(&mut self) {
        self.status = ExecutionStatus::Failed;
        self.completed_at = Some(Utc::now());
    }

    /// Calculate progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        (self.completed_steps + self.skipped_steps) as f64 / self.total_steps as f64
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

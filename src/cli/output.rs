//! CLI output formatting

use crate::{
    core::{ExecutionStatus, PipelineState, PlannedStep, StepState},
    execution::ExecutionEvent,
};
use console::Emoji;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a step state for display
pub fn format_step_state(state: &StepState) -> String {
    match state {
        StepState::Pending => style("PENDING").dim().to_string(),
        StepState::Running { .. } => style("RUNNING").yellow().to_string(),
        StepState::Completed { .. } => style("COMPLETED").green().to_string(),
        StepState::Failed { .. } => style("FAILED").red().to_string(),
        StepState::Skipped { .. } => style("SKIPPED").dim().to_string(),
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name,
            total_steps,
        } => format!(
            "{} Starting pipeline {} ({} steps, {})",
            ROCKET,
            style(pipeline_name).bold(),
            total_steps,
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted {
            step_id,
            index,
            command,
        } => format!(
            "\n{} [{}] {}\n   {}",
            SPINNER,
            index + 1,
            style(step_id).cyan(),
            style(command).dim()
        ),
        ExecutionEvent::StepSkipped { step_id, reason } => {
            format!("{} {} skipped: {}", WARN, style(step_id).yellow(), style(reason).dim())
        }
        ExecutionEvent::StepCompleted { step_id, duration } => format!(
            "{} {} ({})",
            CHECK,
            style(step_id).green(),
            style(format_duration(*duration)).dim()
        ),
        ExecutionEvent::StepFailed { step_id, error } => {
            format!("{} {}: {}", CROSS, style(step_id).red(), style(error).dim())
        }
        ExecutionEvent::PipelineCompleted {
            execution_id,
            status,
        } => format!(
            "{} Pipeline ({}) {}",
            INFO,
            style(&execution_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

/// Format the ordered plan of a pipeline, one numbered step per block
pub fn format_plan(plan: &[PlannedStep]) -> String {
    let mut out = String::new();
    for (i, step) in plan.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {} {}\n     {}\n",
            i + 1,
            style(&step.id).cyan(),
            style(format!("({})", step.name)).dim(),
            step.command
        ));
        if let Some(condition) = &step.precondition {
            out.push_str(&format!(
                "     {} {} (on missing: {:?})\n",
                style("if").dim(),
                condition,
                step.on_missing
            ));
        }
    }
    out
}

/// Format how far a run got, e.g. "3/5 steps (60%)"
pub fn format_progress(state: &PipelineState) -> String {
    format!(
        "{}/{} steps ({:.0}%)",
        state.completed_steps + state.skipped_steps,
        state.total_steps,
        state.progress() * 100.0
    )
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

//! Test utility functions for taxopipe
#![allow(dead_code)]

use taxopipe::core::config::PipelineConfig;
use taxopipe::core::{CommandSpec, ExecutionStatus, Pipeline, StepState};
use taxopipe::execution::{ExecutionEngine, ExecutionEvent, PipelineError, RunReport};
use taxopipe::process::{CommandRunner, ProcessError, ProcessOutput};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock runner that exits with scripted codes and records every invocation
///
/// Programs exit 0 unless scripted otherwise. Programs listed in
/// `missing` behave like tools that are not installed.
#[derive(Clone, Default)]
pub struct MockRunner {
    exit_codes: Arc<HashMap<String, i32>>,
    missing: Arc<Vec<String>>,
    invocations: Arc<Mutex<Vec<CommandSpec>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` exit with `code`
    pub fn exit_with(mut self, program: &str, code: i32) -> Self {
        Arc::make_mut(&mut self.exit_codes).insert(program.to_string(), code);
        self
    }

    /// Make spawning `program` fail
    pub fn not_installed(mut self, program: &str) -> Self {
        Arc::make_mut(&mut self.missing).push(program.to_string());
        self
    }

    /// Every command the runner was asked to run, in order
    pub fn invocations(&self) -> Vec<CommandSpec> {
        self.invocations.lock().unwrap().clone()
    }

    /// Program names of every invocation, in order
    pub fn programs(&self) -> Vec<String> {
        self.invocations().into_iter().map(|c| c.program).collect()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &CommandSpec, capture: bool) -> Result<ProcessOutput, ProcessError> {
        if self.missing.contains(&command.program) {
            return Err(ProcessError::Spawn {
                program: command.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            });
        }

        self.invocations.lock().unwrap().push(command.clone());
        let code = self.exit_codes.get(&command.program).copied().unwrap_or(0);

        Ok(ProcessOutput {
            exit_code: Some(code),
            stdout: capture.then(|| format!("{} output\n", command.program)),
            stderr: capture.then(String::new),
        })
    }
}

/// Test result from running a pipeline
#[derive(Debug)]
pub struct PipelineTestResult {
    pub pipeline: Pipeline,
    pub outcome: Result<RunReport, PipelineError>,
    pub invocations: Vec<CommandSpec>,
    pub events: Vec<ExecutionEvent>,
}

impl PipelineTestResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok() && self.pipeline.state.status == ExecutionStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.outcome.is_err() && self.pipeline.state.status == ExecutionStatus::Failed
    }

    /// Step IDs whose command reached the runner, in order
    pub fn executed(&self) -> Vec<String> {
        self.pipeline
            .executed_steps()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn skipped(&self) -> Vec<String> {
        self.pipeline
            .skipped_steps()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn failed_step(&self) -> Option<String> {
        self.outcome
            .as_ref()
            .err()
            .and_then(|e| e.step_failure())
            .map(|f| f.step_id.clone())
    }

    pub fn step_state(&self, step_id: &str) -> &StepState {
        &self
            .pipeline
            .step(step_id)
            .unwrap_or_else(|| panic!("Step '{}' not found", step_id))
            .state
    }
}

/// Run a pipeline against a mock runner
pub async fn run_pipeline_with_mock(mut pipeline: Pipeline, runner: MockRunner) -> PipelineTestResult {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let mut engine = ExecutionEngine::new(runner.clone());
    engine.add_event_handler(move |event| sink.lock().unwrap().push(event));

    let outcome = engine.execute(&mut pipeline).await;
    let events = events.lock().unwrap().clone();

    PipelineTestResult {
        pipeline,
        outcome,
        invocations: runner.invocations(),
        events,
    }
}

/// Parse a pipeline from YAML string
pub fn pipeline_from_yaml(yaml: &str) -> Pipeline {
    PipelineConfig::from_yaml(yaml)
        .unwrap_or_else(|e| panic!("Failed to parse pipeline YAML: {}", e))
        .to_pipeline()
}

/// Pipeline of steps named after their program: `a` runs program `a`, and so on
pub fn letters_pipeline(ids: &[&str]) -> Pipeline {
    let mut yaml = String::from("name: \"Letters\"\nsteps:\n");
    for id in ids {
        yaml.push_str(&format!("  - id: \"{0}\"\n    program: \"{0}\"\n", id));
    }
    pipeline_from_yaml(&yaml)
}

pub fn assert_pipeline_completed(result: &PipelineTestResult) {
    assert!(
        result.is_success(),
        "Pipeline should be completed, got {:?} / {:?}",
        result.pipeline.state.status,
        result.outcome.as_ref().err()
    );
}

pub fn assert_pipeline_failed(result: &PipelineTestResult) {
    assert!(
        result.is_failed(),
        "Pipeline should have failed, got {:?}",
        result.pipeline.state.status
    );
}

/// Assert exactly these steps launched a process, in this order
pub fn assert_execution_order(result: &PipelineTestResult, expected: &[&str]) {
    assert_eq!(
        result.executed(),
        expected,
        "Expected execution order: {:?}\nActual: {:?}",
        expected,
        result.executed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_runner_records_invocations() {
        let runner = MockRunner::new().exit_with("b", 3);
        let result = run_pipeline_with_mock(letters_pipeline(&["a", "b"]), runner).await;

        assert_pipeline_failed(&result);
        assert_eq!(result.invocations.len(), 2);
        assert_eq!(result.failed_step(), Some("b".to_string()));
    }

    #[tokio::test]
    async fn test_letters_pipeline() {
        let result = run_pipeline_with_mock(letters_pipeline(&["x", "y", "z"]), MockRunner::new()).await;
        assert_pipeline_completed(&result);
        assert_execution_order(&result, &["x", "y", "z"]);
    }
}

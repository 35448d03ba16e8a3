//! Test: Success Chain - all steps run once, in declared order

use crate::helpers::*;
use taxopipe::core::ExecutionStatus;
use taxopipe::execution::ExecutionEngine;

/// A(0), B(0): success, order [A, B]
#[tokio::test]
async fn test_two_step_chain() {
    let runner = MockRunner::new();
    let result = run_pipeline_with_mock(letters_pipeline(&["a", "b"]), runner.clone()).await;

    assert_pipeline_completed(&result);
    assert_execution_order(&result, &["a", "b"]);
    assert_eq!(runner.programs(), vec!["a", "b"]);

    let report = result.outcome.as_ref().unwrap();
    let ids: Vec<_> = report.results.iter().map(|r| r.step_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(report.results.iter().all(|r| r.exit_code == 0));
}

/// Declaration order wins over alphabetical order
#[tokio::test]
async fn test_declared_order_is_kept() {
    let runner = MockRunner::new();
    let result = run_pipeline_with_mock(letters_pipeline(&["zeta", "alpha", "mu"]), runner.clone()).await;

    assert_pipeline_completed(&result);
    assert_eq!(runner.programs(), vec!["zeta", "alpha", "mu"]);
}

/// Arguments and variables reach the runner intact
#[tokio::test]
async fn test_rendered_arguments_reach_runner() {
    let yaml = r#"
name: "Test: Arguments"
output_dir: "{{ root }}/kraken"
variables:
  root: "/scratch/run1"
  db: "/db/k2 standard"
steps:
  - id: "classify"
    program: "kraken2"
    args: ["--db", "{{ db }}", "--report", "{{ output_dir }}/AB1_report.txt"]
"#;
    let mut pipeline = pipeline_from_yaml(yaml);
    // keep the test away from the real filesystem
    pipeline.output_dir = None;

    let runner = MockRunner::new();
    let result = run_pipeline_with_mock(pipeline, runner.clone()).await;

    assert_pipeline_completed(&result);
    let invocations = runner.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0].args,
        vec!["--db", "/db/k2 standard", "--report", "/scratch/run1/kraken/AB1_report.txt"]
    );
}

/// Captured output lands in the execution result
#[tokio::test]
async fn test_captured_output_in_report() {
    let yaml = r#"
name: "Test: Capture"
steps:
  - id: "check"
    program: "qiime"
    args: ["--help"]
    capture_output: true
  - id: "streamed"
    program: "biom"
"#;
    let result = run_pipeline_with_mock(pipeline_from_yaml(yaml), MockRunner::new()).await;

    let report = result.outcome.as_ref().unwrap();
    assert_eq!(report.results[0].stdout.as_deref(), Some("qiime output\n"));
    assert!(report.results[1].stdout.is_none());
}

/// Re-running issues every step again; nothing is memoized
#[tokio::test]
async fn test_rerun_is_not_memoized() {
    let runner = MockRunner::new();
    let engine = ExecutionEngine::new(runner.clone());
    let mut pipeline = letters_pipeline(&["a", "b", "c"]);

    engine.execute(&mut pipeline).await.unwrap();
    engine.execute(&mut pipeline).await.unwrap();

    assert_eq!(runner.programs(), vec!["a", "b", "c", "a", "b", "c"]);
    assert_eq!(pipeline.state.status, ExecutionStatus::Completed);
    assert_eq!(pipeline.state.completed_steps, 3);
}

/// An empty pipeline succeeds without running anything
#[tokio::test]
async fn test_empty_pipeline() {
    let runner = MockRunner::new();
    let result = run_pipeline_with_mock(pipeline_from_yaml("name: \"Empty\"\nsteps: []\n"), runner.clone()).await;

    assert_pipeline_completed(&result);
    assert!(runner.invocations().is_empty());
}

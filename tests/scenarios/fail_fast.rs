//! Test: Fail-fast - the first failing step halts the pipeline

use crate::helpers::*;
use taxopipe::core::StepState;
use taxopipe::execution::ExecutionEvent;

/// A(0), B(1), C(0): A and B run, C never does
#[tokio::test]
async fn test_middle_step_failure_halts_pipeline() {
    let runner = MockRunner::new().exit_with("b", 1);
    let result = run_pipeline_with_mock(letters_pipeline(&["a", "b", "c"]), runner).await;

    assert_pipeline_failed(&result);
    assert_execution_order(&result, &["a", "b"]);
    assert_eq!(result.failed_step(), Some("b".to_string()));
    assert!(matches!(result.step_state("c"), StepState::Pending));

    let failure = result.outcome.as_ref().unwrap_err().step_failure().unwrap();
    assert_eq!(failure.step_name, "b");
    assert_eq!(failure.command, "b");
    assert_eq!(failure.exit_code, Some(1));
}

/// For every k, failing step k runs exactly steps 1..=k
#[tokio::test]
async fn test_failure_at_every_position() {
    let ids = ["s1", "s2", "s3", "s4", "s5"];
    for k in 0..ids.len() {
        let runner = MockRunner::new().exit_with(ids[k], 2);
        let result = run_pipeline_with_mock(letters_pipeline(&ids), runner).await;

        assert_pipeline_failed(&result);
        assert_execution_order(&result, &ids[..=k]);
        for later in &ids[k + 1..] {
            assert!(
                matches!(result.step_state(later), StepState::Pending),
                "step {} should not have run when {} failed",
                later,
                ids[k]
            );
        }
    }
}

/// A tool that is not installed collapses into the same step failure
#[tokio::test]
async fn test_missing_tool_is_step_failure() {
    let runner = MockRunner::new().not_installed("b");
    let result = run_pipeline_with_mock(letters_pipeline(&["a", "b", "c"]), runner.clone()).await;

    assert_pipeline_failed(&result);
    assert_eq!(result.failed_step(), Some("b".to_string()));
    assert_eq!(runner.programs(), vec!["a"]);

    let failure = result.outcome.as_ref().unwrap_err().step_failure().unwrap();
    assert_eq!(failure.exit_code, None);
    assert!(failure.reason.contains("failed to spawn 'b'"));
}

/// The error message names the step and the command
#[tokio::test]
async fn test_failure_message_names_step_and_command() {
    let yaml = r#"
name: "Test: Failure Message"
steps:
  - id: "convert"
    name: "BIOM to TSV"
    program: "biom"
    args: ["convert", "-i", "missing table.biom", "--to-tsv"]
"#;
    let runner = MockRunner::new().exit_with("biom", 1);
    let result = run_pipeline_with_mock(pipeline_from_yaml(yaml), runner).await;

    let message = result.outcome.as_ref().unwrap_err().to_string();
    assert!(message.contains("BIOM to TSV"), "{}", message);
    assert!(message.contains("biom convert -i 'missing table.biom' --to-tsv"), "{}", message);
    assert!(message.contains("exited with code 1"), "{}", message);
}

#[tokio::test]
async fn test_failure_events() {
    let runner = MockRunner::new().exit_with("a", 5);
    let result = run_pipeline_with_mock(letters_pipeline(&["a", "b"]), runner).await;

    let failed: Vec<_> = result
        .events
        .iter()
        .filter_map(|e| match e {
            ExecutionEvent::StepFailed { step_id, error } => Some((step_id.clone(), error.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![("a".to_string(), "exited with code 5".to_string())]);

    let started = result
        .events
        .iter()
        .filter(|e| matches!(e, ExecutionEvent::StepStarted { .. }))
        .count();
    assert_eq!(started, 1);
}

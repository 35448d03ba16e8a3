//! Runs commands as child processes of the current process

use crate::core::CommandSpec;
use crate::process::{CommandRunner, ProcessError, ProcessOutput};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Spawns real OS processes via `tokio::process`
///
/// Without capture the child inherits stdout/stderr, so tool progress goes
/// straight to the terminal. stdin is always closed.
#[derive(Debug, Clone, Default)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SubprocessRunner {
    async fn run(&self, command: &CommandSpec, capture: bool) -> Result<ProcessOutput, ProcessError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if capture {
            let child = cmd
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|source| spawn_error(command, source))?;

            let output = child
                .wait_with_output()
                .await
                .map_err(|source| wait_error(command, source))?;

            debug!(
                "{} returned {} bytes of stdout, {} bytes of stderr",
                command.program,
                output.stdout.len(),
                output.stderr.len()
            );

            return Ok(ProcessOutput {
                exit_code: output.status.code(),
                stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
                stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            });
        }

        let mut child = cmd
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| spawn_error(command, source))?;

        let status = child
            .wait()
            .await
            .map_err(|source| wait_error(command, source))?;

        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout: None,
            stderr: None,
        })
    }
}

fn spawn_error(command: &CommandSpec, source: std::io::Error) -> ProcessError {
    ProcessError::Spawn {
        program: command.program.clone(),
        source,
    }
}

fn wait_error(command: &CommandSpec, source: std::io::Error) -> ProcessError {
    ProcessError::Wait {
        program: command.program.clone(),
        source,
    }
}

//! Process boundary: spawning external tools

pub mod subprocess;

use crate::core::CommandSpec;
use async_trait::async_trait;
use thiserror::Error;

pub use subprocess::SubprocessRunner;

/// Errors raised before a process produced an exit status
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// How a finished process exited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,

    /// Captured stdout (only when capture was requested)
    pub stdout: Option<String>,

    /// Captured stderr (only when capture was requested)
    pub stderr: Option<String>,
}

impl ProcessOutput {
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for running commands - allows substituting the OS process layer in tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion
    async fn run(&self, command: &CommandSpec, capture: bool) -> Result<ProcessOutput, ProcessError>;
}

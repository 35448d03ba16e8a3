//! Step precondition model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Check gating whether a step runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    /// Step runs only when the file exists (required input)
    FileExists(PathBuf),
    /// Step runs only when the file is absent (e.g. fetch-once downloads)
    FileAbsent(PathBuf),
}

impl Precondition {
    /// Evaluate the precondition against the filesystem
    pub fn is_met(&self) -> bool {
        match self {
            Precondition::FileExists(path) => path.exists(),
            Precondition::FileAbsent(path) => !path.exists(),
        }
    }

    /// Human-readable explanation of why the precondition is unmet
    pub fn unmet_reason(&self) -> String {
        match self {
            Precondition::FileExists(path) => {
                format!("required file not found: {}", path.display())
            }
            Precondition::FileAbsent(path) => {
                format!("file already present: {}", path.display())
            }
        }
    }
}

impl std::fmt::Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precondition::FileExists(path) => write!(f, "requires {}", path.display()),
            Precondition::FileAbsent(path) => write!(f, "unless {} exists", path.display()),
        }
    }
}

/// What to do when a step's precondition is unmet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Log a warning and move on to the next step
    #[default]
    Skip,
    /// Halt the pipeline with a step failure
    Fail,
}

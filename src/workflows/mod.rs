//! Built-in workflows assembled from typed configuration
//!
//! A workflow file names its `kind` and carries that workflow's settings:
//!
//! ```yaml
//! kind: kraken2-wgs
//! kraken_db: /db/kraken2-standard-db
//! input_dir: /data/wgs
//! output_dir: results
//! samples: [AB1, CD2]
//! taxonkit_data_dir: /db/taxdump
//! ```

pub mod kraken2;
pub mod qiime2;

use crate::core::Pipeline;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use kraken2::Kraken2Config;
pub use qiime2::Qiime2Config;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum WorkflowConfig {
    #[serde(rename = "kraken2-wgs")]
    Kraken2Wgs(Kraken2Config),

    #[serde(rename = "qiime2-16s")]
    Qiime2Amplicon(Qiime2Config),
}

impl WorkflowConfig {
    /// Load a workflow configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a workflow configuration
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: WorkflowConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            WorkflowConfig::Kraken2Wgs(config) => config.validate(),
            WorkflowConfig::Qiime2Amplicon(config) => config.validate(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowConfig::Kraken2Wgs(_) => "kraken2-wgs",
            WorkflowConfig::Qiime2Amplicon(_) => "qiime2-16s",
        }
    }

    pub fn to_pipeline(&self) -> Pipeline {
        match self {
            WorkflowConfig::Kraken2Wgs(config) => config.build(),
            WorkflowConfig::Qiime2Amplicon(config) => config.build(),
        }
    }
}

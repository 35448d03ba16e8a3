//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{RunCommand, ValidateCommand, WorkflowCommand};
use std::ffi::OsString;

/// Sequential runner for external bioinformatics tool pipelines
#[derive(Debug, Parser, Clone)]
#[command(name = "taxopipe")]
#[command(version)]
#[command(about = "Runs external bioinformatics tools as a fail-fast sequential pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a pipeline defined step by step in YAML
    Run(RunCommand),

    /// Run a built-in workflow (kraken2-wgs, qiime2-16s)
    Workflow(WorkflowCommand),

    /// Validate a pipeline or workflow configuration
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

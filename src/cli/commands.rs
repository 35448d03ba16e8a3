//! CLI command definitions

use clap::Args;

/// Run a pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Print the commands without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Run a built-in workflow
#[derive(Debug, Args, Clone)]
pub struct WorkflowCommand {
    /// Path to workflow YAML file
    #[arg(short, long)]
    pub file: String,

    /// Print the commands without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Validate a configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to YAML file
    #[arg(short, long)]
    pub file: String,

    /// Treat the file as a built-in workflow configuration
    #[arg(long)]
    pub workflow: bool,

    /// Print the resolved plan as JSON
    #[arg(long)]
    pub json: bool,
}

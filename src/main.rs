use anyhow::{Context, Result};
use taxopipe::cli::commands::{RunCommand, ValidateCommand, WorkflowCommand};
use taxopipe::cli::output::*;
use taxopipe::cli::{Cli, Command};
use taxopipe::core::config::PipelineConfig;
use taxopipe::{ExecutionEngine, Pipeline, SubprocessRunner, WorkflowConfig};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Workflow(cmd) => run_workflow(cmd).await?,
        Command::Validate(cmd) => validate(cmd)?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let config = PipelineConfig::from_file(&cmd.file)
        .context("Failed to load pipeline config")?;

    println!("{} Loaded pipeline: {}", INFO, style(&config.name).bold());

    let pipeline = config.to_pipeline();
    execute(pipeline, cmd.dry_run).await
}

async fn run_workflow(cmd: &WorkflowCommand) -> Result<()> {
    let config = WorkflowConfig::from_file(&cmd.file)
        .context("Failed to load workflow config")?;

    println!("{} Loaded workflow: {}", INFO, style(config.kind()).bold());

    let pipeline = config.to_pipeline();
    execute(pipeline, cmd.dry_run).await
}

async fn execute(mut pipeline: Pipeline, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("{} Dry run, {} steps:\n", INFO, pipeline.steps.len());
        print!("{}", format_plan(&pipeline.plan()));
        return Ok(());
    }

    let mut engine = ExecutionEngine::new(SubprocessRunner::new());
    engine.add_event_handler(|event| {
        println!("{}", format_execution_event(&event));
    });

    println!();
    let result = engine.execute(&mut pipeline).await;

    match result {
        Ok(report) => {
            println!(
                "\n{} {} completed {} ({} steps run, {} skipped, {})",
                CHECK,
                style(&pipeline.name).bold(),
                style("successfully").green(),
                report.results.len(),
                report.skipped.len(),
                format_duration(report.duration)
            );
            Ok(())
        }
        Err(e) => {
            println!(
                "\n{} {} {} after {}",
                CROSS,
                style(&pipeline.name).bold(),
                style("failed").red(),
                format_progress(&pipeline.state)
            );
            for step in &pipeline.steps {
                println!("  {:<28} {}", step.id, format_step_state(&step.state));
            }
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn validate(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating {}...", INFO, cmd.file);

    let loaded = if cmd.workflow {
        WorkflowConfig::from_file(&cmd.file).map(|w| w.to_pipeline())
    } else {
        PipelineConfig::from_file(&cmd.file).map(|c| c.to_pipeline())
    };

    match loaded {
        Ok(pipeline) => {
            println!("{} Configuration is valid!", CHECK);
            println!("  Name: {}", style(&pipeline.name).bold());
            println!("  Steps: {}", style(pipeline.steps.len()).cyan());
            if let Some(dir) = &pipeline.output_dir {
                println!("  Output: {}", style(dir.display()).dim());
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&pipeline.plan())?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

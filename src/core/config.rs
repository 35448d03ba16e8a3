//! Pipeline configuration from YAML

use crate::core::{
    condition::MissingPolicy,
    step::{render_template, CommandSpec, Step},
    Pipeline,
};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Name of the variable that always resolves to the pipeline's output directory
pub const OUTPUT_DIR_VARIABLE: &str = "output_dir";

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([^{}\s]+)\s*\}\}";

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Pipeline version (optional)
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Directory created before the first step runs
    #[serde(default)]
    pub output_dir: Option<String>,

    /// Values substituted into `{{ name }}` placeholders
    #[serde(default)]
    variables: HashMap<String, Value>,

    /// Pipeline steps, run in this order
    pub steps: Vec<StepConfig>,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique step identifier
    pub id: String,

    /// Human-readable step name (defaults to the id)
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Executable to run
    pub program: String,

    /// Argument vector
    #[serde(default)]
    pub args: Vec<String>,

    /// Only run when this file exists
    #[serde(default)]
    pub requires: Option<String>,

    /// Only run when this file does not exist
    #[serde(default)]
    pub unless_exists: Option<String>,

    /// What to do when the precondition is unmet
    #[serde(default)]
    pub on_missing: MissingPolicy,

    /// Capture stdout/stderr instead of streaming them
    #[serde(default)]
    pub capture_output: bool,
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen_ids = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                anyhow::bail!("Step with empty ID");
            }
            if !seen_ids.insert(&step.id) {
                anyhow::bail!("Duplicate step ID: {}", step.id);
            }
            if step.program.trim().is_empty() {
                anyhow::bail!("Step '{}' has an empty program", step.id);
            }
            if step.requires.is_some() && step.unless_exists.is_some() {
                anyhow::bail!(
                    "Step '{}' declares both 'requires' and 'unless_exists'",
                    step.id
                );
            }
        }

        let placeholder = Regex::new(PLACEHOLDER_PATTERN)?;

        // variables are substituted in a single pass, so they cannot refer to each other
        let mut names: Vec<_> = self.variables.keys().collect();
        names.sort();
        for name in names {
            let value = scalar_to_string(&self.variables[name]);
            if let Some(caps) = placeholder.captures(&value) {
                anyhow::bail!(
                    "Variable '{}' refers to '{}'; variable values cannot contain placeholders",
                    name,
                    &caps[1]
                );
            }
        }

        let variables = self.variables_as_string_map();

        if let Some(dir) = &self.output_dir {
            check_resolved(&placeholder, "output_dir", &render_template(dir, &variables))?;
        }

        for step in &self.steps {
            let fields = std::iter::once(&step.program)
                .chain(step.args.iter())
                .chain(step.requires.iter())
                .chain(step.unless_exists.iter());
            for field in fields {
                let location = format!("step '{}'", step.id);
                check_resolved(&placeholder, &location, &render_template(field, &variables))?;
            }
        }

        Ok(())
    }

    /// Variables as strings, including the built-in `output_dir`
    pub fn variables_as_string_map(&self) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = self
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), scalar_to_string(v)))
            .collect();

        let output_dir = self
            .output_dir
            .as_ref()
            .map(|dir| render_template(dir, &vars))
            .unwrap_or_else(|| ".".to_string());
        vars.insert(OUTPUT_DIR_VARIABLE.to_string(), output_dir);

        vars
    }

    /// Convert config to a Pipeline domain model
    pub fn to_pipeline(&self) -> Pipeline {
        let variables = self.variables_as_string_map();

        let mut pipeline = Pipeline::new(self.name.clone());
        if let Some(dir) = &self.output_dir {
            pipeline.output_dir = Some(render_template(dir, &variables).into());
        }

        for config in &self.steps {
            let command = CommandSpec {
                program: config.program.clone(),
                args: config.args.clone(),
            }
            .render(&variables);

            let mut step = Step::new(config.id.clone(), command)
                .with_name(config.name.clone().unwrap_or_else(|| config.id.clone()))
                .on_missing(config.on_missing)
                .capture_output(config.capture_output);

            if let Some(path) = &config.requires {
                step = step.requires(render_template(path, &variables));
            } else if let Some(path) = &config.unless_exists {
                step = step.unless_exists(render_template(path, &variables));
            }

            pipeline.push(step);
        }

        pipeline
    }
}

fn check_resolved(placeholder: &Regex, location: &str, rendered: &str) -> Result<()> {
    if let Some(caps) = placeholder.captures(rendered) {
        anyhow::bail!(
            "Unresolved variable '{}' in {} (write placeholders as '{{{{ name }}}}')",
            &caps[1],
            location
        );
    }
    Ok(())
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
    }
}

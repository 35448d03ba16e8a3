//! Step domain model

use crate::core::{
    condition::{MissingPolicy, Precondition},
    state::StepState,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An external program plus its argument vector
///
/// Arguments are passed to the OS as-is; nothing is interpreted by a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Executable name or path
    pub program: String,

    /// Arguments, one element per argv entry
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Substitute `{{ name }}` placeholders in the program and every argument
    pub fn render(&self, variables: &HashMap<String, String>) -> CommandSpec {
        CommandSpec {
            program: render_template(&self.program, variables),
            args: self
                .args
                .iter()
                .map(|a| render_template(a, variables))
                .collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    /// Shell-quoted rendering, for logs and dry runs only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Replace variables in the form {{ variable_name }}
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in variables {
        let placeholder = format!("{{{{ {} }}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}

/// A single step in a pipeline
#[derive(Debug, Clone)]
pub struct Step {
    /// Unique step identifier
    pub id: String,

    /// Human-readable step name
    pub name: String,

    /// Fully materialized command
    pub command: CommandSpec,

    /// Optional gate evaluated right before the step would run
    pub precondition: Option<Precondition>,

    /// Behaviour when the precondition is unmet
    pub on_missing: MissingPolicy,

    /// Capture stdout/stderr instead of streaming them to the terminal
    pub capture_output: bool,

    /// Runtime state
    pub state: StepState,
}

impl Step {
    pub fn new(id: impl Into<String>, command: CommandSpec) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            command,
            precondition: None,
            on_missing: MissingPolicy::Skip,
            capture_output: false,
            state: StepState::Pending,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run only if `path` exists; skip otherwise
    pub fn requires(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.precondition = Some(Precondition::FileExists(path.into()));
        self
    }

    /// Run only if `path` does not exist yet
    pub fn unless_exists(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.precondition = Some(Precondition::FileAbsent(path.into()));
        self
    }

    pub fn on_missing(mut self, policy: MissingPolicy) -> Self {
        self.on_missing = policy;
        self
    }

    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// The unmet precondition, if the step has one
    pub fn unmet_precondition(&self) -> Option<&Precondition> {
        self.precondition.as_ref().filter(|p| !p.is_met())
    }
}

//! Job specs, constructed jobs and their task inputs
//!
//! A [`JobSpec`] is the static description of one analyst: persona, task
//! template and expected output. A [`Job`] is what a spec becomes once its
//! template has been checked and its capability handles attached. Jobs are
//! immutable after construction, so one instance can serve any number of
//! concurrent executions.

use crate::{Error, Kind, Result, Tool};
use minijinja::{Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Who the analyst is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Role title
    pub role: String,
    /// What the analyst is trying to achieve
    pub goal: String,
    /// Background text that shapes the voice of the answer
    pub backstory: String,
}

impl Persona {
    /// Create a persona
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }
}

/// Static template a job is built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Kind this spec belongs to
    pub kind: Kind,
    /// Analyst persona
    pub persona: Persona,
    /// Task description, a MiniJinja template over [`TaskInputs`]
    pub task_description: String,
    /// Description of the expected output
    pub expected_output: String,
    /// Upper bound on reasoning iterations
    pub max_iterations: usize,
    /// Whether the analyst may hand work to another analyst
    pub allow_delegation: bool,
}

/// How a job's task description is turned into text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTemplate {
    /// Rendered with MiniJinja in strict-undefined mode
    Jinja(String),
    /// Used verbatim; rendering cannot fail
    Literal(String),
}

impl TaskTemplate {
    /// The raw template source
    pub fn source(&self) -> &str {
        match self {
            TaskTemplate::Jinja(s) | TaskTemplate::Literal(s) => s,
        }
    }
}

/// Which construction path produced a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobVariant {
    /// Fully configured specialist
    Specialist,
    /// Degraded job explaining that the analysis is unavailable
    Fallback,
    /// Last-resort job with a static one-line task
    Minimal,
}

/// Inputs a job is rendered with
///
/// Optional fields are omitted from the template context when `None`, so a
/// template that references them fails to render instead of printing blanks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInputs {
    pub ticker: String,
    pub topic: String,
    pub current_year: String,
    pub search_scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// A job's task after rendering, ready to hand to a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTask {
    pub kind: Kind,
    pub persona: Persona,
    pub description: String,
    pub expected_output: String,
}

impl RenderedTask {
    /// System prompt derived from the persona
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {role}.\n\n{backstory}\n\nYour personal goal is: {goal}",
            role = self.persona.role,
            backstory = self.persona.backstory.trim(),
            goal = self.persona.goal,
        )
    }

    /// User prompt carrying the task and the expected output
    pub fn user_prompt(&self) -> String {
        format!(
            "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            self.description.trim(),
            self.expected_output.trim(),
        )
    }
}

/// A constructed, reusable unit of work
pub struct Job {
    kind: Kind,
    variant: JobVariant,
    persona: Persona,
    task: TaskTemplate,
    expected_output: String,
    max_iterations: usize,
    allow_delegation: bool,
    tools: Vec<Arc<dyn Tool>>,
}

impl Job {
    /// Build a job from a spec, checking that its task template compiles
    pub fn from_spec(spec: JobSpec, tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        check_template(&spec.task_description)?;

        Ok(Self {
            kind: spec.kind,
            variant: JobVariant::Specialist,
            persona: spec.persona,
            task: TaskTemplate::Jinja(spec.task_description),
            expected_output: spec.expected_output,
            max_iterations: spec.max_iterations.max(1),
            allow_delegation: spec.allow_delegation,
            tools,
        })
    }

    /// Build a job whose task text is used verbatim
    ///
    /// Never fails and attaches no tools.
    pub fn literal(
        kind: Kind,
        persona: Persona,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            variant: JobVariant::Minimal,
            persona,
            task: TaskTemplate::Literal(description.into()),
            expected_output: expected_output.into(),
            max_iterations: 1,
            allow_delegation: false,
            tools: Vec::new(),
        }
    }

    /// Override the construction variant
    pub fn with_variant(mut self, variant: JobVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Kind this job was built for
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Construction path that produced this job
    pub fn variant(&self) -> JobVariant {
        self.variant
    }

    /// Whether this job is a fallback or minimal stand-in
    pub fn is_degraded(&self) -> bool {
        self.variant != JobVariant::Specialist
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn task(&self) -> &TaskTemplate {
        &self.task
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn allow_delegation(&self) -> bool {
        self.allow_delegation
    }

    /// Capability handles attached to this job
    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Look up an attached capability handle by name
    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Render the task for one execution
    pub fn render(&self, inputs: &TaskInputs) -> Result<RenderedTask> {
        let description = match &self.task {
            TaskTemplate::Literal(text) => text.clone(),
            TaskTemplate::Jinja(source) => strict_env()
                .render_str(source, inputs)
                .map_err(|e| Error::RenderFailed(format!("{} task: {e}", self.kind)))?,
        };
        trace!(kind = %self.kind, variant = ?self.variant, "Rendered task");

        Ok(RenderedTask {
            kind: self.kind,
            persona: self.persona.clone(),
            description,
            expected_output: self.expected_output.clone(),
        })
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("kind", &self.kind)
            .field("variant", &self.variant)
            .field("role", &self.persona.role)
            .field("max_iterations", &self.max_iterations)
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

fn strict_env() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

fn check_template(source: &str) -> Result<()> {
    strict_env()
        .template_from_str(source)
        .map(|_| ())
        .map_err(|e| Error::ConstructionFailed(format!("invalid task template: {e}")))
}

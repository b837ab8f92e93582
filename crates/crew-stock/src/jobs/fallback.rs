//! Degraded jobs for kinds whose normal construction failed

use crew_core::{Job, JobSpec, JobVariant, Kind, Persona};
use tracing::{error, warn};

const LABEL_MARKER: &str = "{label}";

const FALLBACK_TASK: &str = "The system could not prepare a specialized analyst for {label}. \
Explain briefly that detailed {label} cannot be performed right now, \
but offer some general guidance about what this analysis typically involves for the ticker {{ ticker }}.\n\n\
Keep your response helpful and informative, explaining what investors should generally look for in {label}.";

const FALLBACK_OUTPUT: &str = "A brief explanation that detailed {label} cannot be performed right now, \
along with general information about what this type of analysis typically covers and what investors should consider.";

/// Builds jobs that explain an analysis is unavailable
///
/// [`FallbackFactory::build`] never fails. If the degraded job itself cannot
/// be built, a minimal job with a static one-line task is returned instead.
#[derive(Debug, Clone)]
pub struct FallbackFactory {
    task_template: String,
}

impl Default for FallbackFactory {
    fn default() -> Self {
        Self {
            task_template: FALLBACK_TASK.to_string(),
        }
    }
}

impl FallbackFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the degraded task template; `{label}` is substituted before compiling
    pub fn with_task_template(mut self, template: impl Into<String>) -> Self {
        self.task_template = template.into();
        self
    }

    /// Build the degraded job for `kind`, described to the user as `label`
    pub fn build(&self, kind: Kind, label: &str) -> Job {
        let spec = JobSpec {
            kind,
            persona: Persona::new(
                "Financial Analyst",
                format!("Provide basic {label}"),
                format!("You're an experienced financial analyst who can provide basic {label}."),
            ),
            task_description: self.task_template.replace(LABEL_MARKER, label),
            expected_output: FALLBACK_OUTPUT.replace(LABEL_MARKER, label),
            max_iterations: 1,
            allow_delegation: false,
        };

        match Job::from_spec(spec, Vec::new()) {
            Ok(job) => {
                warn!(%kind, label, "Using fallback job");
                job.with_variant(JobVariant::Fallback)
            }
            Err(e) => {
                error!(%kind, label, error = %e, "Fallback job failed, using minimal job");
                minimal(kind, label)
            }
        }
    }
}

/// Last-resort job; construction cannot fail
pub fn minimal(kind: Kind, label: &str) -> Job {
    Job::literal(
        kind,
        Persona::new(
            "Basic Analyst",
            "Provide minimal response",
            "Basic analyst with limited capabilities.",
        ),
        format!("Provide a basic message about {label} being unavailable."),
        format!("A simple message explaining that {label} is temporarily unavailable."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_core::TaskInputs;

    fn inputs() -> TaskInputs {
        TaskInputs {
            ticker: "TSLA".to_string(),
            ..TaskInputs::default()
        }
    }

    #[test]
    fn test_fallback_job_mentions_label_and_ticker() {
        let job = FallbackFactory::new().build(Kind::Technical, "technical analysis");
        assert_eq!(job.variant(), JobVariant::Fallback);
        assert!(job.tools().is_empty());

        let task = job.render(&inputs()).unwrap();
        assert!(task.description.contains("detailed technical analysis cannot be performed right now"));
        assert!(task.description.contains("for the ticker TSLA"));
        assert_eq!(task.persona.goal, "Provide basic technical analysis");
    }

    #[test]
    fn test_broken_template_falls_through_to_minimal() {
        let factory = FallbackFactory::new().with_task_template("{label} for {{ ticker ");
        let job = factory.build(Kind::Risk, "risk assessment");

        assert_eq!(job.variant(), JobVariant::Minimal);
        let task = job.render(&TaskInputs::default()).unwrap();
        assert_eq!(
            task.description,
            "Provide a basic message about risk assessment being unavailable."
        );
    }

    #[test]
    fn test_label_with_template_syntax_is_contained() {
        let job = FallbackFactory::new().build(Kind::Chat, "chat {{ analysis");
        assert_eq!(job.variant(), JobVariant::Minimal);
        assert!(job.render(&inputs()).is_ok());
    }
}

//! Job construction per kind

use crate::config::CrewConfig;
use crate::error::{CrewError, Result};
use crate::jobs::{FallbackFactory, templates};
use async_trait::async_trait;
use crew_core::{Job, Kind};
use crew_tools::SharedTools;
use std::sync::Arc;
use tracing::{info, warn};

/// Turns a kind into a runnable job
///
/// Implementations never fail: construction errors are absorbed into a
/// degraded job.
#[async_trait]
pub trait JobFactory: Send + Sync {
    async fn build(&self, kind: Kind) -> Arc<Job>;
}

/// Builds fully configured jobs from the kind templates
pub struct JobBuilder {
    config: Arc<CrewConfig>,
    tools: Arc<SharedTools>,
    fallback: FallbackFactory,
}

impl JobBuilder {
    pub fn new(config: Arc<CrewConfig>, tools: Arc<SharedTools>) -> Self {
        Self {
            config,
            tools,
            fallback: FallbackFactory::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackFactory) -> Self {
        self.fallback = fallback;
        self
    }

    /// Build the specialist job, surfacing construction errors
    pub fn try_build(&self, kind: Kind) -> Result<Job> {
        let construction = |e: crew_core::Error| CrewError::Construction {
            kind,
            reason: e.to_string(),
        };

        let tools = self.tools.analysis_tools().map_err(construction)?;
        let spec = templates::spec(kind, self.config.iterations_for(kind));
        Job::from_spec(spec, tools).map_err(construction)
    }
}

#[async_trait]
impl JobFactory for JobBuilder {
    async fn build(&self, kind: Kind) -> Arc<Job> {
        match self.try_build(kind) {
            Ok(job) => {
                info!(%kind, role = %job.persona().role, "Built job");
                Arc::new(job)
            }
            Err(e) => {
                warn!(%kind, error = %e, "Job construction failed");
                Arc::new(self.fallback.build(kind, kind.fallback_label()))
            }
        }
    }
}

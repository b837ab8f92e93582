//! Request-facing service
//!
//! [`StockCrew`] validates requests, then hands them to the registry,
//! executor and batch orchestrator. Validation and configuration problems
//! are the only errors it returns; everything that goes wrong while a job
//! runs comes back as placeholder text inside the result.

use crate::config::CrewConfig;
use crate::engine::{
    BatchMode, BatchOrchestrator, BatchResult, ExecutionRequest, ExecutionResult, Executor,
    PreloadedAnalysis, assemble,
};
use crate::error::{CrewError, Result};
use crate::jobs::{JobBuilder, JobFactory, JobRegistry};
use crew_core::{DescriptorProvider, Kind, ReasoningBackend};
use crew_tools::SharedTools;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

const TICKER_PATTERN: &str = r"^\^?[A-Z0-9][A-Z0-9.\-=]{0,14}$";

static TICKER_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(TICKER_PATTERN));

/// Trim and upper-case a ticker, rejecting anything that is not a symbol
pub fn normalize_ticker(ticker: &str) -> Result<String> {
    let ticker = ticker.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(CrewError::Validation("ticker is required".to_string()));
    }

    let re = TICKER_RE
        .as_ref()
        .map_err(|e| CrewError::Other(e.to_string()))?;
    if !re.is_match(&ticker) {
        return Err(CrewError::Validation(format!(
            "'{ticker}' is not a valid ticker symbol"
        )));
    }
    Ok(ticker)
}

/// Stock analysis service
pub struct StockCrew {
    config: Arc<CrewConfig>,
    registry: Arc<JobRegistry>,
    executor: Executor,
    orchestrator: BatchOrchestrator,
    descriptors: Arc<dyn DescriptorProvider>,
}

impl StockCrew {
    /// Wire the service with the production job builder
    pub fn new(
        config: CrewConfig,
        backend: Arc<dyn ReasoningBackend>,
        descriptors: Arc<dyn DescriptorProvider>,
    ) -> Self {
        let config = Arc::new(config);
        let tools = Arc::new(SharedTools::new(config.tools_config()));
        let factory = Arc::new(JobBuilder::new(Arc::clone(&config), tools));
        Self::assemble_parts(config, factory, backend, descriptors)
    }

    /// Wire the service with a custom job factory
    pub fn with_factory(
        config: CrewConfig,
        factory: Arc<dyn JobFactory>,
        backend: Arc<dyn ReasoningBackend>,
        descriptors: Arc<dyn DescriptorProvider>,
    ) -> Self {
        Self::assemble_parts(Arc::new(config), factory, backend, descriptors)
    }

    fn assemble_parts(
        config: Arc<CrewConfig>,
        factory: Arc<dyn JobFactory>,
        backend: Arc<dyn ReasoningBackend>,
        descriptors: Arc<dyn DescriptorProvider>,
    ) -> Self {
        let registry = Arc::new(JobRegistry::new(factory));
        let executor = Executor::new(backend, config.job_timeout);
        let orchestrator = BatchOrchestrator::new(
            Arc::clone(&registry),
            executor.clone(),
            Arc::clone(&descriptors),
            config.pacing_delay,
        );

        info!(
            backend = %executor.backend_name(),
            descriptors = %descriptors.name(),
            timeout_secs = config.job_timeout.as_secs(),
            "Stock crew ready"
        );

        Self {
            config,
            registry,
            executor,
            orchestrator,
            descriptors,
        }
    }

    pub fn config(&self) -> &CrewConfig {
        &self.config
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Run one analysis kind for a ticker
    pub async fn analyze(&self, kind: Kind, ticker: &str) -> Result<ExecutionResult> {
        if kind.is_chat() {
            return Err(CrewError::Validation(
                "chat requires a question; use ask instead".to_string(),
            ));
        }
        let ticker = normalize_ticker(ticker)?;

        let request = ExecutionRequest::new(ticker, self.config.search_scope(kind));
        let job = self.registry.get_or_create(kind).await;
        Ok(self.executor.run(job, &request).await)
    }

    /// Answer a question about a ticker using earlier analyses as context
    ///
    /// The descriptor lookup is best effort, and skipped when there is no
    /// preloaded analysis since the context would not include it.
    pub async fn ask(
        &self,
        ticker: &str,
        question: &str,
        preloaded: Option<PreloadedAnalysis>,
    ) -> Result<ExecutionResult> {
        let ticker = normalize_ticker(ticker)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(CrewError::Validation("question is required".to_string()));
        }

        let preloaded = preloaded.unwrap_or_default();
        let descriptor = if preloaded.is_empty() {
            None
        } else {
            match self.descriptors.lookup(&ticker).await {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    debug!(%ticker, error = %e, "Descriptor unavailable for chat context");
                    None
                }
            }
        };
        let context = assemble(&preloaded, descriptor.as_ref(), &ticker);

        let request = ExecutionRequest::new(ticker, self.config.search_scope(Kind::Chat))
            .with_question(question)
            .with_preloaded(preloaded)
            .with_context(context);
        let job = self.registry.get_or_create(Kind::Chat).await;
        Ok(self.executor.run(job, &request).await)
    }

    /// Run every analysis kind for a ticker
    pub async fn full_analysis(&self, ticker: &str, mode: BatchMode) -> Result<BatchResult> {
        self.full_analysis_of(ticker, &Kind::ANALYSES, mode).await
    }

    /// Run the given analysis kinds for a ticker
    pub async fn full_analysis_of(
        &self,
        ticker: &str,
        kinds: &[Kind],
        mode: BatchMode,
    ) -> Result<BatchResult> {
        let ticker = normalize_ticker(ticker)?;
        if kinds.is_empty() {
            return Err(CrewError::Validation(
                "at least one analysis kind is required".to_string(),
            ));
        }
        if kinds.iter().any(|k| k.is_chat()) {
            return Err(CrewError::Validation(
                "chat cannot be part of a batch".to_string(),
            ));
        }

        let request = ExecutionRequest::new(ticker, self.config.batch_search_scope.clone());
        Ok(self.orchestrator.run(&request, kinds, mode).await)
    }
}

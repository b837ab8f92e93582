//! Multi-kind batches
//!
//! A batch runs a set of kinds for one ticker, either all at once (each job
//! independently bounded by the executor's budget) or one after another with
//! a pacing delay. The result always holds exactly one entry per requested
//! kind; no single job's failure affects the others or the batch itself.

use crate::engine::executor::{ExecutionRequest, ExecutionResult, Executor};
use crate::jobs::JobRegistry;
use crew_core::{Descriptor, DescriptorProvider, Kind};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// How the jobs of a batch are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// Every job at once
    #[default]
    Concurrent,
    /// One job at a time, with a pacing delay between jobs
    Sequential,
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchMode::Concurrent => f.write_str("concurrent"),
            BatchMode::Sequential => f.write_str("sequential"),
        }
    }
}

impl FromStr for BatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" | "parallel" => Ok(BatchMode::Concurrent),
            "sequential" => Ok(BatchMode::Sequential),
            other => Err(format!("unknown batch mode '{other}'")),
        }
    }
}

/// Everything one batch produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: Uuid,
    pub ticker: String,
    pub mode: BatchMode,
    /// Markdown overview built from the descriptor
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<Descriptor>,
    pub results: BTreeMap<Kind, ExecutionResult>,
}

impl BatchResult {
    pub fn new(ticker: impl Into<String>, mode: BatchMode) -> Self {
        let ticker = ticker.into();
        Self {
            batch_id: Uuid::new_v4(),
            summary: basic_summary(None, &ticker),
            ticker,
            mode,
            descriptor: None,
            results: BTreeMap::new(),
        }
    }

    pub fn get(&self, kind: Kind) -> Option<&ExecutionResult> {
        self.results.get(&kind)
    }

    /// Number of jobs that produced an analysis
    pub fn succeeded(&self) -> usize {
        self.results.values().filter(|r| r.is_ok()).count()
    }
}

/// Markdown overview shown before the analyses arrive
pub fn basic_summary(descriptor: Option<&Descriptor>, ticker: &str) -> String {
    match descriptor {
        Some(d) => format!(
            "# {name} ({ticker})\n\n\
             ## Basic Information\n\
             - **Sector:** {sector}\n\
             - **Industry:** {industry}\n\
             - **Market Cap:** {cap}\n\n\
             Analysis is being performed. Please check individual tabs for detailed results.\n",
            name = d.name,
            sector = d.sector,
            industry = d.industry,
            cap = d.market_cap_display(),
        ),
        None => format!("# Analysis for {ticker}\nPerforming comprehensive analysis..."),
    }
}

/// Runs several kinds for one ticker
pub struct BatchOrchestrator {
    registry: Arc<JobRegistry>,
    executor: Executor,
    descriptors: Arc<dyn DescriptorProvider>,
    pacing_delay: Duration,
}

impl BatchOrchestrator {
    pub fn new(
        registry: Arc<JobRegistry>,
        executor: Executor,
        descriptors: Arc<dyn DescriptorProvider>,
        pacing_delay: Duration,
    ) -> Self {
        Self {
            registry,
            executor,
            descriptors,
            pacing_delay,
        }
    }

    /// Run `kinds` for the request's ticker
    ///
    /// Duplicate kinds run once; the order of first appearance is the
    /// execution order in sequential mode.
    pub async fn run(
        &self,
        request: &ExecutionRequest,
        kinds: &[Kind],
        mode: BatchMode,
    ) -> BatchResult {
        let mut ordered: Vec<Kind> = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            if !ordered.contains(&kind) {
                ordered.push(kind);
            }
        }
        self.run_batch(Uuid::new_v4(), request, &ordered, mode).await
    }

    #[instrument(
        name = "batch",
        skip(self, request, kinds, mode),
        fields(ticker = %request.ticker, mode = %mode, jobs = kinds.len())
    )]
    async fn run_batch(
        &self,
        batch_id: Uuid,
        request: &ExecutionRequest,
        kinds: &[Kind],
        mode: BatchMode,
    ) -> BatchResult {
        let started = Instant::now();

        let descriptor = match self.descriptors.lookup(&request.ticker).await {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                warn!(
                    provider = %self.descriptors.name(),
                    error = %e,
                    "Descriptor lookup failed, using generic summary"
                );
                None
            }
        };

        let results = match mode {
            BatchMode::Concurrent => self.run_concurrent(request, kinds).await,
            BatchMode::Sequential => self.run_sequential(request, kinds).await,
        };

        let batch = BatchResult {
            batch_id,
            ticker: request.ticker.clone(),
            mode,
            summary: basic_summary(descriptor.as_ref(), &request.ticker),
            descriptor,
            results: results.into_iter().map(|r| (r.kind, r)).collect(),
        };

        info!(
            succeeded = batch.succeeded(),
            total = batch.results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch complete"
        );
        batch
    }

    async fn run_concurrent(
        &self,
        request: &ExecutionRequest,
        kinds: &[Kind],
    ) -> Vec<ExecutionResult> {
        let runs = kinds.iter().map(|&kind| async move {
            let job = self.registry.get_or_create(kind).await;
            self.executor.run(job, request).await
        });
        join_all(runs).await
    }

    async fn run_sequential(
        &self,
        request: &ExecutionRequest,
        kinds: &[Kind],
    ) -> Vec<ExecutionResult> {
        let mut results = Vec::with_capacity(kinds.len());
        for (i, &kind) in kinds.iter().enumerate() {
            if i > 0 && !self.pacing_delay.is_zero() {
                debug!(
                    next = %kind,
                    delay_ms = self.pacing_delay.as_millis() as u64,
                    "Pacing before next job"
                );
                tokio::time::sleep(self.pacing_delay).await;
            }
            let job = self.registry.get_or_create(kind).await;
            results.push(self.executor.run(job, request).await);
        }
        results
    }
}

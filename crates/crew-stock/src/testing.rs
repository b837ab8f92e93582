//! Scripted collaborators shared by the unit tests

use crate::jobs::{JobFactory, templates};
use async_trait::async_trait;
use crew_core::{
    BackendOutput, Descriptor, DescriptorProvider, Error, Job, Kind, ReasoningBackend, Result,
    TaskInputs, TaskReport,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Builds template jobs without tools and counts builds per kind
pub struct CountingFactory {
    delay: Duration,
    builds: Mutex<HashMap<Kind, usize>>,
}

impl CountingFactory {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            builds: Mutex::new(HashMap::new()),
        }
    }

    pub fn builds(&self, kind: Kind) -> usize {
        self.builds.lock().unwrap().get(&kind).copied().unwrap_or(0)
    }

    pub fn total_builds(&self) -> usize {
        self.builds.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl JobFactory for CountingFactory {
    async fn build(&self, kind: Kind) -> Arc<Job> {
        *self.builds.lock().unwrap().entry(kind).or_default() += 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Arc::new(Job::from_spec(templates::spec(kind, 1), Vec::new()).unwrap())
    }
}

/// What the scripted backend does for one kind
#[derive(Debug, Clone)]
pub enum Script {
    /// Return a report with this raw output
    Reply(String),
    /// Return the rendered task description as plain text
    Echo,
    /// Sleep, then reply
    Slow(Duration, String),
    /// Never complete
    Hang,
    Fail(String),
    /// Return an empty report
    Empty,
    Panic,
}

/// Backend whose behavior is scripted per kind
pub struct ScriptedBackend {
    scripts: HashMap<Kind, Script>,
    default: Script,
    calls: AtomicUsize,
    seen: Mutex<Vec<(Kind, TaskInputs)>>,
}

impl ScriptedBackend {
    pub fn new(default: Script) -> Self {
        Self {
            scripts: HashMap::new(),
            default,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, kind: Kind, script: Script) -> Self {
        self.scripts.insert(kind, script);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Kinds and inputs in call order
    pub fn seen(&self) -> Vec<(Kind, TaskInputs)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn execute(&self, job: &Job, inputs: &TaskInputs) -> Result<BackendOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((job.kind(), inputs.clone()));

        let script = self.scripts.get(&job.kind()).unwrap_or(&self.default).clone();
        match script {
            Script::Reply(text) => Ok(BackendOutput::Report(TaskReport::with_output(text))),
            Script::Echo => Ok(BackendOutput::Text(job.render(inputs)?.description)),
            Script::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(BackendOutput::Text(text))
            }
            Script::Hang => std::future::pending().await,
            Script::Fail(msg) => Err(Error::ExecutionFailed(msg)),
            Script::Empty => Ok(BackendOutput::Report(TaskReport::default())),
            Script::Panic => panic!("scripted backend panic"),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Descriptor provider with a fixed answer that counts lookups
pub struct StaticDescriptors {
    descriptor: Option<Descriptor>,
    lookups: AtomicUsize,
}

impl StaticDescriptors {
    pub fn found(descriptor: Descriptor) -> Self {
        Self {
            descriptor: Some(descriptor),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            descriptor: None,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DescriptorProvider for StaticDescriptors {
    async fn lookup(&self, ticker: &str) -> Result<Descriptor> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.descriptor
            .clone()
            .ok_or_else(|| Error::DescriptorUnavailable {
                ticker: ticker.to_string(),
                reason: "not found".to_string(),
            })
    }

    fn name(&self) -> &str {
        "static"
    }
}

pub fn apple() -> Descriptor {
    Descriptor::new("Apple Inc.", "Technology", "Consumer Electronics")
        .with_market_cap(2_891_240_000_000.0)
}

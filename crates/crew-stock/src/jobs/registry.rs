//! Process-wide job cache

use crate::jobs::JobFactory;
use crew_core::{Job, Kind};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Caches one job per kind for the life of the process
///
/// Each kind has its own [`OnceCell`], so concurrent first requests for a
/// kind wait on a single construction while other kinds proceed
/// independently. Entries are never evicted.
pub struct JobRegistry {
    factory: Arc<dyn JobFactory>,
    slots: [OnceCell<Arc<Job>>; Kind::COUNT],
}

impl JobRegistry {
    pub fn new(factory: Arc<dyn JobFactory>) -> Self {
        Self {
            factory,
            slots: std::array::from_fn(|_| OnceCell::new()),
        }
    }

    /// The job for `kind`, building it on first use
    pub async fn get_or_create(&self, kind: Kind) -> Arc<Job> {
        let slot = &self.slots[kind.index()];
        if let Some(job) = slot.get() {
            return Arc::clone(job);
        }

        let job = slot
            .get_or_init(|| async {
                debug!(%kind, "Constructing job");
                self.factory.build(kind).await
            })
            .await;
        Arc::clone(job)
    }

    /// The job for `kind` if it has been built
    pub fn get(&self, kind: Kind) -> Option<Arc<Job>> {
        self.slots[kind.index()].get().map(Arc::clone)
    }

    /// Kinds with a cached job, in registry order
    pub fn built_kinds(&self) -> Vec<Kind> {
        Kind::ALL
            .into_iter()
            .filter(|k| self.slots[k.index()].initialized())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingFactory;
    use std::time::Duration;

    #[tokio::test]
    async fn test_repeated_calls_return_same_instance() {
        let factory = Arc::new(CountingFactory::new(Duration::ZERO));
        let registry = JobRegistry::new(factory.clone());

        for kind in Kind::ALL {
            let a = registry.get_or_create(kind).await;
            let b = registry.get_or_create(kind).await;
            assert!(Arc::ptr_eq(&a, &b));
            assert_eq!(a.kind(), kind);
        }
        assert_eq!(factory.total_builds(), Kind::COUNT);
        assert_eq!(registry.built_kinds(), Kind::ALL.to_vec());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_access_builds_once() {
        let factory = Arc::new(CountingFactory::new(Duration::from_millis(50)));
        let registry = Arc::new(JobRegistry::new(factory.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.get_or_create(Kind::Risk).await })
            })
            .collect();

        let jobs: Vec<Arc<Job>> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(factory.builds(Kind::Risk), 1);
        assert!(jobs.iter().all(|j| Arc::ptr_eq(j, &jobs[0])));
    }

    #[tokio::test]
    async fn test_get_before_build_is_none() {
        let registry = JobRegistry::new(Arc::new(CountingFactory::new(Duration::ZERO)));
        assert!(registry.get(Kind::Chat).is_none());
        registry.get_or_create(Kind::Chat).await;
        assert!(registry.get(Kind::Chat).is_some());
        assert_eq!(registry.built_kinds(), vec![Kind::Chat]);
    }
}

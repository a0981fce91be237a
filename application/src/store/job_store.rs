use chrono::Utc;
use delve_domain::{DomainError, JobId, JobStatus, ResearchJob, ResearchRequest, ResearchStrategy};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No job found for id {0}")]
    NotFound(JobId),

    /// The mutator rejected the change (e.g. an invalid status transition)
    #[error(transparent)]
    Rejected(#[from] DomainError),
}

/// Filter for `JobStore::list`
#[derive(Debug, Clone, Copy, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub strategy: Option<ResearchStrategy>,
}

impl JobFilter {
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_strategy(mut self, strategy: ResearchStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    fn matches(&self, job: &ResearchJob) -> bool {
        self.status.is_none_or(|s| job.status == s)
            && self.strategy.is_none_or(|s| job.strategy == s)
    }
}

type SharedJob = Arc<RwLock<ResearchJob>>;

#[derive(Default)]
struct Index {
    by_id: HashMap<JobId, SharedJob>,
    /// Creation order, for `list`
    order: Vec<SharedJob>,
}

/// Thread-safe home for all job records
#[derive(Default)]
pub struct JobStore {
    index: RwLock<Index>,
    sequence: AtomicU64,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an identifier and insert a new Pending record
    pub fn create(&self, strategy: ResearchStrategy, input: ResearchRequest) -> JobId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = JobId::new(format!(
            "{}-research-{}-{}-{}",
            strategy.as_str(),
            input.story_id,
            Utc::now().timestamp_millis(),
            sequence,
        ));

        let job = Arc::new(RwLock::new(ResearchJob::new(id.clone(), strategy, input)));
        let mut index = self.index.write().expect("job index lock poisoned");
        index.by_id.insert(id.clone(), Arc::clone(&job));
        index.order.push(job);
        id
    }

    /// Snapshot of the current record
    pub fn get(&self, id: &JobId) -> Result<ResearchJob, StoreError> {
        let job = self.shared(id)?;
        let job = job.read().expect("job record lock poisoned");
        Ok(job.clone())
    }

    /// Apply a mutation atomically with respect to readers and other writers
    /// of the same record.
    ///
    /// The mutator must leave the record unchanged when it returns an error;
    /// the `ResearchJob` methods uphold this by validating before mutating.
    pub fn update(
        &self,
        id: &JobId,
        mutate: impl FnOnce(&mut ResearchJob) -> Result<(), DomainError>,
    ) -> Result<(), StoreError> {
        let job = self.shared(id)?;
        let mut job = job.write().expect("job record lock poisoned");
        mutate(&mut job)?;
        Ok(())
    }

    /// Snapshot all matching records in creation order
    pub fn list(&self, filter: &JobFilter) -> Vec<ResearchJob> {
        let index = self.index.read().expect("job index lock poisoned");
        index
            .order
            .iter()
            .map(|job| job.read().expect("job record lock poisoned").clone())
            .filter(|job| filter.matches(job))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.read().expect("job index lock poisoned").order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shared(&self, id: &JobId) -> Result<SharedJob, StoreError> {
        let index = self.index.read().expect("job index lock poisoned");
        index
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

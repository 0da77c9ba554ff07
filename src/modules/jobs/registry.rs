use super::model::JobRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("job {0} is already registered")]
    AlreadyExists(Uuid),
}

/// In-memory index of live jobs. Every operation is one critical section,
/// so a record can be handed out by `take` or `sweep` but never by both.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<Uuid, JobRecord>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, JobRecord>> {
        // The map holds plain data; a panic elsewhere cannot leave it half-updated.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn put(&self, record: JobRecord) -> Result<(), RegistryError> {
        let mut jobs = self.lock();
        if jobs.contains_key(&record.id) {
            return Err(RegistryError::AlreadyExists(record.id));
        }
        jobs.insert(record.id, record);
        Ok(())
    }

    pub fn take(&self, id: &Uuid) -> Option<JobRecord> {
        self.lock().remove(id)
    }

    /// Copy of a live record, left in place.
    pub fn peek(&self, id: &Uuid) -> Option<JobRecord> {
        self.lock().get(id).cloned()
    }

    pub fn sweep(&self, ttl: time::Duration, now: OffsetDateTime) -> Vec<JobRecord> {
        let mut jobs = self.lock();
        let expired: Vec<Uuid> = jobs
            .values()
            .filter(|r| r.is_expired(ttl, now))
            .map(|r| r.id)
            .collect();

        expired.iter().filter_map(|id| jobs.remove(id)).collect()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

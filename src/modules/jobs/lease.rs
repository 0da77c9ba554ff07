use super::model::JobRecord;
use crate::infrastructure::storage::local::BlobStore;
use tracing::info;

/// Exclusive hold on a job taken out of the registry. Its files are deleted
/// when the lease is dropped, whichever way the holder finishes.
pub struct JobLease {
    store: BlobStore,
    record: JobRecord,
}

impl JobLease {
    pub fn new(store: BlobStore, record: JobRecord) -> Self {
        Self { store, record }
    }

    pub fn record(&self) -> &JobRecord {
        &self.record
    }
}

impl Drop for JobLease {
    fn drop(&mut self) {
        // Input and output both live in the identity directory.
        self.store.purge_detached(self.record.id);
        info!("🧹 Released job {}", self.record.id);
    }
}

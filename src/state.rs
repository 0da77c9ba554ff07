use crate::config::settings::AppConfig;
use crate::infrastructure::audio::AudioProcessor;
use crate::infrastructure::storage::local::BlobStore;
use crate::modules::jobs::JobRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: BlobStore,
    pub jobs: JobRegistry,
    pub processor: Arc<dyn AudioProcessor>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        storage: BlobStore,
        jobs: JobRegistry,
        processor: Arc<dyn AudioProcessor>,
    ) -> Self {
        Self {
            config,
            storage,
            jobs,
            processor,
        }
    }
}

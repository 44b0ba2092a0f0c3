use app_config::AppConfig;
use app_redis::SessionStore;
use app_store::BankStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn BankStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn BankStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            store,
            sessions,
        }
    }

    /// Configured page-size ceiling for listings.
    pub fn max_page_size(&self) -> u32 {
        self.config.max_page_size
    }
}

#[cfg(feature = "testing")]
impl AppState {
    /// State over in-memory stores, for router tests.
    pub fn in_memory(config: AppConfig) -> (Self, Arc<app_store::memory::MemoryStore>) {
        let store = Arc::new(app_store::memory::MemoryStore::default());
        let sessions = Arc::new(app_redis::memory::MemorySessions::default());
        (Self::new(config, store.clone(), sessions), store)
    }
}

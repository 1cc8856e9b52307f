//! Portal Composition Root
//!
//! Builds the process-wide collaborators, the cache, the service container and
//! the domain stores, and owns them until shutdown.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{Cache, SystemClock};
use crate::config::Config;
use crate::container::Container;
use crate::domains::{create_domain_stores, DomainEnv};
use crate::error::{PortalError, Result};
use crate::external::{
    BroadcastBus, ErrorReporter, FilePersistence, MemoryPersistence, Persistence, TracingReporter,
};
use crate::services::{register_services, SyncOutbox, OUTBOX};
use crate::store::{Action, Store, StoreEnv, StoreManager};
use crate::tasks::spawn_sweep_task;

/// Cache shared between the admin API and the sweep task.
pub type SharedCache = Arc<tokio::sync::RwLock<Cache<Value>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Portal ==
/// Everything the portal core owns for the life of the process.
pub struct Portal {
    config: Config,
    cache: SharedCache,
    container: Mutex<Container>,
    stores: RwLock<StoreManager>,
    bus: Arc<BroadcastBus>,
    reporter: Arc<dyn ErrorReporter>,
    sweep: Mutex<Option<JoinHandle<()>>>,
}

impl Portal {
    // == Init ==
    /// Builds the portal with tracing-based reporting and the persistence
    /// backend selected by `config.persistence_dir`.
    ///
    /// Must be called from within a tokio runtime; the cache sweep is spawned on it.
    pub fn init(config: Config) -> Result<Self> {
        let persistence: Arc<dyn Persistence> = match &config.persistence_dir {
            Some(dir) => Arc::new(FilePersistence::new(dir)?),
            None => Arc::new(MemoryPersistence::new()),
        };
        Self::with_collaborators(
            config,
            Arc::new(TracingReporter),
            persistence,
            Arc::new(BroadcastBus::new()),
        )
    }

    /// Builds the portal around explicit collaborators.
    pub fn with_collaborators(
        config: Config,
        reporter: Arc<dyn ErrorReporter>,
        persistence: Arc<dyn Persistence>,
        bus: Arc<BroadcastBus>,
    ) -> Result<Self> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(PortalError::Internal(
                "portal must be started inside a tokio runtime".into(),
            ));
        }

        let cache_config = config.cache_config();
        let sweep_interval = cache_config.sweep_interval;
        let cache: SharedCache = Arc::new(tokio::sync::RwLock::new(Cache::with_collaborators(
            cache_config,
            Arc::new(SystemClock),
            reporter.clone(),
        )));

        let mut container = Container::new();
        register_services(&mut container, reporter.clone(), persistence, bus.clone());

        let mut stores = StoreManager::new(StoreEnv::new(reporter.clone(), bus.clone()));
        let domain_env = DomainEnv::from_container(&mut container, config.log_actions)?;
        create_domain_stores(&mut stores, &mut container, &domain_env)?;

        let sweep = spawn_sweep_task(cache.clone(), sweep_interval);
        info!(
            stores = ?stores.store_names(),
            services = container.service_ids().count(),
            "portal initialised"
        );

        Ok(Self {
            config,
            cache,
            container: Mutex::new(container),
            stores: RwLock::new(stores),
            bus,
            reporter,
            sweep: Mutex::new(Some(sweep)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn bus(&self) -> &Arc<BroadcastBus> {
        &self.bus
    }

    pub fn reporter(&self) -> &Arc<dyn ErrorReporter> {
        &self.reporter
    }

    // == Stores ==
    pub fn store_names(&self) -> Vec<String> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .store_names()
    }

    pub fn get_store<S, A>(&self, name: &str) -> Result<Store<S, A>>
    where
        S: Send + Sync + 'static,
        A: Action,
    {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_store(name)
    }

    pub fn state_json(&self, name: &str) -> Result<Value> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state_json(name)
    }

    pub fn dispatch_json(&self, name: &str, action: Value) -> Result<()> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dispatch_json(name, action)
    }

    // == Services ==
    /// Resolves a service from the container.
    pub fn resolve<T: std::any::Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        lock(&self.container).get_as::<T>(id)
    }

    pub fn outbox(&self) -> Result<Arc<SyncOutbox>> {
        self.resolve(OUTBOX)
    }

    // == Shutdown ==
    pub fn is_running(&self) -> bool {
        lock(&self.sweep).is_some()
    }

    /// Stops the sweep task and releases every store and service. Idempotent.
    pub fn shutdown(&self) {
        let Some(sweep) = lock(&self.sweep).take() else {
            return;
        };
        sweep.abort();
        warn!("cache sweep task aborted");

        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear_stores();
        lock(&self.container).clear();
        info!("portal shut down");
    }
}

impl Drop for Portal {
    fn drop(&mut self) {
        if let Some(sweep) = lock(&self.sweep).take() {
            sweep.abort();
        }
    }
}

//! Startup/shutdown wiring for the to-do core.
//!
//! # Responsibility
//! - Own the store, worker pool and notifier for the process lifetime.
//! - Hand out the service and sync coordinator built on them.
//!
//! # Invariants
//! - Exactly one store instance backs every service call.
//! - `shutdown` drains queued work before closing the store.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::events::{ChangeEvent, ChangeNotifier};
use crate::remote::{HttpSeedFetcher, SeedSource};
use crate::runtime::{Executor, MainContext, WorkerPool};
use crate::service::task_service::TaskService;
use crate::store::TaskStore;
use crate::sync::SyncCoordinator;
use crossbeam_channel::Receiver;
use log::info;
use std::sync::Arc;

/// Assembled core instance.
pub struct TodoCore {
    store: Arc<TaskStore>,
    pool: Arc<WorkerPool>,
    notifier: Arc<ChangeNotifier>,
    service: TaskService,
    sync: SyncCoordinator,
}

impl TodoCore {
    /// Opens the configured store and uses the HTTP seed fetcher.
    ///
    /// Returns the core plus the main context its completions are posted to.
    pub fn open(config: &CoreConfig) -> CoreResult<(Self, MainContext)> {
        let config = config.clone().validated()?;
        let fetcher = HttpSeedFetcher::new(
            config.seed_endpoint.clone(),
            config.http_connect_timeout(),
            config.http_read_timeout(),
        );
        Self::with_seed_source(&config, Arc::new(fetcher))
    }

    /// Same as [`TodoCore::open`] with a caller-provided seed source.
    pub fn with_seed_source(
        config: &CoreConfig,
        source: Arc<dyn SeedSource>,
    ) -> CoreResult<(Self, MainContext)> {
        let config = config.clone().validated()?;
        let store = Arc::new(match &config.db_path {
            Some(path) => TaskStore::open(path)?,
            None => TaskStore::open_in_memory()?,
        });
        let pool = Arc::new(WorkerPool::new(config.worker_count).map_err(|err| {
            CoreError::Unavailable(format!("failed to spawn worker pool: {err}"))
        })?);

        let main = MainContext::new();
        let executor = Executor::new(Arc::clone(&pool), main.handle());
        let notifier = Arc::new(ChangeNotifier::new());
        let service = TaskService::new(Arc::clone(&store), executor.clone(), Arc::clone(&notifier));
        let sync = SyncCoordinator::new(Arc::clone(&store), source, executor, Arc::clone(&notifier));

        info!(
            "event=core_open module=app status=ok storage={} workers={}",
            if config.db_path.is_some() { "file" } else { "memory" },
            pool.size()
        );
        Ok((
            Self {
                store,
                pool,
                notifier,
                service,
                sync,
            },
            main,
        ))
    }

    pub fn service(&self) -> &TaskService {
        &self.service
    }

    pub fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// Subscribes to data-changed events.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    /// Stops the worker pool, then closes the store.
    ///
    /// Completions already posted stay queued on the main context.
    pub fn shutdown(&self) -> CoreResult<()> {
        self.pool.shutdown();
        self.store.close()?;
        info!("event=core_shutdown module=app status=ok");
        Ok(())
    }
}

//! Local-first to-do core.
//! This crate owns task persistence, seed sync and the asynchronous service
//! API consumed by presentation layers.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod runtime;
pub mod service;
pub mod store;
pub mod sync;

pub use app::TodoCore;
pub use config::{ConfigError, CoreConfig};
pub use error::{CoreError, CoreResult};
pub use events::{ChangeEvent, ChangeNotifier};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{now_epoch_ms, validate_title, Task, TaskId, TaskValidationError};
pub use remote::{HttpSeedFetcher, NetworkError, SeedSource};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use runtime::{Executor, MainContext, MainHandle, WorkerPool};
pub use service::task_service::TaskService;
pub use store::{SeedMergeReport, StoreError, TaskStore};
pub use sync::{SyncCoordinator, SyncReport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

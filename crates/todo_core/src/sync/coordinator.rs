//! Seed merge coordinator.
//!
//! # Responsibility
//! - Deliver the local task list, then fetch and merge seed tasks off the main context.
//! - Latch the cold-start sync so it runs once per coordinator.
//!
//! # Invariants
//! - A merge either inserts every new id or nothing (one transaction).
//! - `start` delivers local tasks before the merge result.
//! - `ChangeEvent::Seeded` is published only when rows were inserted.

use crate::error::CoreResult;
use crate::events::{ChangeEvent, ChangeNotifier};
use crate::model::task::Task;
use crate::remote::SeedSource;
use crate::runtime::Executor;
use crate::store::TaskStore;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of one seed merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Items returned by the seed source.
    pub fetched: usize,
    /// Items stored because their id was new.
    pub inserted: usize,
    /// Items ignored because a record with that id already existed.
    pub skipped: usize,
}

#[derive(Clone)]
struct SeedMerge {
    store: Arc<TaskStore>,
    source: Arc<dyn SeedSource>,
    notifier: Arc<ChangeNotifier>,
}

impl SeedMerge {
    fn run(&self) -> CoreResult<SyncReport> {
        let tasks = self.source.fetch_seed_tasks().map_err(|err| {
            warn!("event=seed_sync module=sync status=error stage=fetch error={err}");
            err
        })?;
        let merge = self.store.insert_all_if_absent(&tasks)?;
        let report = SyncReport {
            fetched: tasks.len(),
            inserted: merge.inserted,
            skipped: merge.skipped,
        };
        if report.inserted > 0 {
            self.notifier.publish(ChangeEvent::Seeded {
                inserted: report.inserted,
            });
        }
        info!(
            "event=seed_sync module=sync status=ok fetched={} inserted={} skipped={}",
            report.fetched, report.inserted, report.skipped
        );
        Ok(report)
    }
}

/// Merges remote seed data into the local store.
pub struct SyncCoordinator {
    store: Arc<TaskStore>,
    merge: SeedMerge,
    executor: Executor,
    started: AtomicBool,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<TaskStore>,
        source: Arc<dyn SeedSource>,
        executor: Executor,
        notifier: Arc<ChangeNotifier>,
    ) -> Self {
        Self {
            merge: SeedMerge {
                store: Arc::clone(&store),
                source,
                notifier,
            },
            store,
            executor,
            started: AtomicBool::new(false),
        }
    }

    /// Delivers the current local task list.
    pub fn load_local(&self, done: impl FnOnce(CoreResult<Vec<Task>>) + Send + 'static) {
        let store = Arc::clone(&self.store);
        self.executor.execute(move || Ok(store.list_all()?), done);
    }

    /// Fetches seed tasks and inserts the ones whose id is not stored yet.
    ///
    /// Safe to call repeatedly; an unchanged payload inserts nothing new.
    pub fn sync_once(&self, done: impl FnOnce(CoreResult<SyncReport>) + Send + 'static) {
        let merge = self.merge.clone();
        self.executor.execute(move || merge.run(), done);
    }

    /// Cold-start entry: loads local tasks, then syncs on the first call only.
    ///
    /// The sync is submitted after `on_local` ran, so local tasks are always
    /// delivered before the merge result. Returns whether a sync was scheduled.
    pub fn start(
        &self,
        on_local: impl FnOnce(CoreResult<Vec<Task>>) + Send + 'static,
        on_sync: impl FnOnce(CoreResult<SyncReport>) + Send + 'static,
    ) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            self.load_local(on_local);
            return false;
        }

        let merge = self.merge.clone();
        let executor = self.executor.clone();
        self.load_local(move |local| {
            on_local(local);
            executor.execute(move || merge.run(), on_sync);
        });
        true
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

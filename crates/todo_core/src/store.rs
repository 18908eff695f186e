//! Process-wide task store.
//!
//! # Responsibility
//! - Own the single SQLite connection with explicit open/close lifecycle.
//! - Serialize every store operation behind one lock (single writer).
//! - Run the seed merge inside one transaction.
//!
//! # Invariants
//! - No component mutates task rows except through this surface.
//! - A failed operation leaves no partial write visible.
//! - After `close()` every operation fails with `StoreError::Closed`.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::Task;
use crate::repo::task_repo::{RepoError, SqliteTaskRepository, TaskRepository};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    /// The store was closed by its owner.
    Closed,
    /// A previous operation panicked while holding the connection lock.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Closed => write!(f, "task store is closed"),
            Self::Poisoned => write!(f, "task store lock is poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Closed | Self::Poisoned => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Outcome of merging a batch of seed tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedMergeReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Thread-safe owner of the task database.
pub struct TaskStore {
    conn: Mutex<Option<Connection>>,
}

impl TaskStore {
    /// Opens (or creates) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Closes the underlying connection. Idempotent.
    pub fn close(&self) -> StoreResult<()> {
        let mut guard = self.lock()?;
        if let Some(conn) = guard.take() {
            if let Err((_, err)) = conn.close() {
                warn!("event=store_close module=store status=error error={err}");
                return Err(err.into());
            }
            info!("event=store_close module=store status=ok");
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    pub fn upsert(&self, task: &Task) -> StoreResult<()> {
        self.run("upsert", |repo| repo.upsert(task))
    }

    pub fn insert_if_absent(&self, task: &Task) -> StoreResult<bool> {
        self.run("insert_if_absent", |repo| repo.insert_if_absent(task))
    }

    pub fn update(&self, task: &Task) -> StoreResult<bool> {
        self.run("update", |repo| repo.update(task))
    }

    pub fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        self.run("delete_by_id", |repo| repo.delete_by_id(id))
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<Task>> {
        self.run("get", |repo| repo.get(id))
    }

    pub fn list_all(&self) -> StoreResult<Vec<Task>> {
        self.run("list_all", |repo| repo.list_all())
    }

    pub fn search(&self, needle: &str) -> StoreResult<Vec<Task>> {
        self.run("search", |repo| repo.search(needle))
    }

    pub fn clear_all(&self) -> StoreResult<usize> {
        self.run("clear_all", |repo| repo.clear_all())
    }

    pub fn count(&self) -> StoreResult<u64> {
        self.run("count", |repo| repo.count())
    }

    /// Inserts every task whose id is not stored yet, in one transaction.
    pub fn insert_all_if_absent(&self, tasks: &[Task]) -> StoreResult<SeedMergeReport> {
        let started_at = Instant::now();
        let mut guard = self.lock()?;
        let conn = guard.as_mut().ok_or(StoreError::Closed)?;

        let tx = conn.transaction()?;
        let mut report = SeedMergeReport::default();
        {
            let repo = SqliteTaskRepository::new(&tx);
            for task in tasks {
                if repo.insert_if_absent(task)? {
                    report.inserted += 1;
                } else {
                    report.skipped += 1;
                }
            }
        }
        tx.commit()?;

        info!(
            "event=seed_merge module=store status=ok inserted={} skipped={} duration_ms={}",
            report.inserted,
            report.skipped,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    fn run<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&SqliteTaskRepository<'_>) -> Result<T, RepoError>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let result = f(&SqliteTaskRepository::new(conn));
        match &result {
            Ok(_) => debug!(
                "event=store_op module=store op={op} status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=store_op module=store op={op} status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result.map_err(StoreError::from)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Option<Connection>>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

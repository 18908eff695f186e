//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide upsert/insert-if-absent/update/delete/list/search over `tasks`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - At most one row per `id` (primary key).
//! - List and search order is `created_at DESC, id ASC`.
//! - `insert_if_absent` never touches an existing row.

use crate::db::{fold_for_search, DbError, FOLD_CASE_FN};
use crate::model::task::{Task, TaskId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    created_at,
    is_completed,
    owner_id
FROM tasks";

const TASK_ORDER_SQL: &str = "ORDER BY created_at DESC, id ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store operation contract for task records.
pub trait TaskRepository {
    /// Inserts the task or replaces every non-key field of the existing row,
    /// including `created_at` as provided by the caller.
    fn upsert(&self, task: &Task) -> RepoResult<()>;
    /// Inserts only when no row has `task.id`. Returns whether a row was added.
    fn insert_if_absent(&self, task: &Task) -> RepoResult<bool>;
    /// Updates title, description and completion of an existing row.
    /// Returns `false` when the id is unknown.
    fn update(&self, task: &Task) -> RepoResult<bool>;
    /// Returns whether a row was removed.
    fn delete_by_id(&self, id: &str) -> RepoResult<bool>;
    fn get(&self, id: &str) -> RepoResult<Option<Task>>;
    fn list_all(&self) -> RepoResult<Vec<Task>>;
    /// Case- and accent-insensitive substring match on title or description.
    fn search(&self, needle: &str) -> RepoResult<Vec<Task>>;
    /// Removes every row and returns how many were deleted.
    fn clear_all(&self) -> RepoResult<usize>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed task repository over a borrowed connection.
///
/// The connection must come from [`crate::db::open_db`] or
/// [`crate::db::open_db_in_memory`] so that `fold_case` is registered.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_tasks(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn upsert(&self, task: &Task) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                created_at,
                is_completed,
                owner_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                created_at = excluded.created_at,
                is_completed = excluded.is_completed,
                owner_id = excluded.owner_id;",
            params![
                task.id.as_str(),
                task.title.as_str(),
                task.description.as_str(),
                task.created_at,
                bool_to_int(task.is_completed),
                task.owner_id,
            ],
        )?;

        Ok(())
    }

    fn insert_if_absent(&self, task: &Task) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                created_at,
                is_completed,
                owner_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO NOTHING;",
            params![
                task.id.as_str(),
                task.title.as_str(),
                task.description.as_str(),
                task.created_at,
                bool_to_int(task.is_completed),
                task.owner_id,
            ],
        )?;

        Ok(inserted > 0)
    }

    fn update(&self, task: &Task) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                is_completed = ?3
             WHERE id = ?4;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                bool_to_int(task.is_completed),
                task.id.as_str(),
            ],
        )?;

        Ok(changed > 0)
    }

    fn delete_by_id(&self, id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get(&self, id: &str) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Task>> {
        self.query_tasks(&format!("{TASK_SELECT_SQL} {TASK_ORDER_SQL};"), [])
    }

    fn search(&self, needle: &str) -> RepoResult<Vec<Task>> {
        let folded = fold_for_search(needle);
        self.query_tasks(
            &format!(
                "{TASK_SELECT_SQL}
                 WHERE instr({FOLD_CASE_FN}(title), ?1) > 0
                    OR instr({FOLD_CASE_FN}(description), ?1) > 0
                 {TASK_ORDER_SQL};"
            ),
            [folded.as_str()],
        )
    }

    fn clear_all(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM tasks;", [])?)
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get::<_, i64>(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;
    if id.is_empty() {
        return Err(RepoError::InvalidData("empty id in tasks.id".to_string()));
    }

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in tasks.is_completed"
            )));
        }
    };

    Ok(Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        is_completed,
        owner_id: row.get("owner_id")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

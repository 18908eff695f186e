//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted entity and its construction paths.
//! - Own title validation used at the edit boundary.
//!
//! # Invariants
//! - `id` is unique and immutable; seeded tasks derive it from the remote id.
//! - `created_at` is never mutated by update or toggle paths.
//! - Storage does not validate titles; services call `validate_title`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier of a task.
///
/// UUID v4 text for locally created tasks, decimal remote id for seeded ones.
pub type TaskId = String;

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub is_completed: bool,
    /// Remote owner; only set for seeded tasks.
    pub owner_id: Option<i64>,
}

impl Task {
    /// Creates a new, not completed task with a generated id and current time.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(
            Uuid::new_v4().to_string(),
            title,
            description,
            now_epoch_ms(),
        )
    }

    /// Creates a task with caller-provided identity and creation time.
    ///
    /// Used by seed and import paths where identity already exists.
    pub fn with_id(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            created_at,
            is_completed: false,
            owner_id: None,
        }
    }

    /// Returns a copy with completion flipped; identity fields are kept.
    pub fn toggled(&self) -> Self {
        Self {
            is_completed: !self.is_completed,
            ..self.clone()
        }
    }
}

/// Validation failure for user-provided task input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Rejects titles that are empty after trimming whitespace.
pub fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

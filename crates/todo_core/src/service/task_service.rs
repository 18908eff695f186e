//! Task use-case service.
//!
//! # Responsibility
//! - Provide create/edit/toggle/remove/find/list entry points.
//! - Enforce title validation at the edit boundary.
//! - Emit a `ChangeEvent` after every mutation that changed stored state.
//!
//! # Invariants
//! - Every operation runs on the worker pool; completions run on the main
//!   context and carry either a value or a `CoreError`.
//! - Edit and toggle never change `id`, `created_at` or `owner_id`.
//! - A validation failure performs no store access at all.

use crate::error::CoreResult;
use crate::events::{ChangeEvent, ChangeNotifier};
use crate::model::task::{validate_title, Task, TaskId};
use crate::runtime::Executor;
use crate::store::TaskStore;
use std::sync::Arc;

/// Asynchronous facade over the task store.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<TaskStore>,
    executor: Executor,
    notifier: Arc<ChangeNotifier>,
}

impl TaskService {
    pub fn new(store: Arc<TaskStore>, executor: Executor, notifier: Arc<ChangeNotifier>) -> Self {
        Self {
            store,
            executor,
            notifier,
        }
    }

    /// Creates a task with a fresh id and the current timestamp.
    pub fn create(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        done: impl FnOnce(CoreResult<Task>) + Send + 'static,
    ) {
        let title = title.into();
        let description = description.into();
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);

        self.executor.execute(
            move || {
                validate_title(&title)?;
                let task = Task::new(title, description);
                store.upsert(&task)?;
                notifier.publish(ChangeEvent::Created {
                    id: task.id.clone(),
                });
                Ok(task)
            },
            done,
        );
    }

    /// Replaces title and description of an existing task.
    ///
    /// Completes with `Ok(None)` when no task has `id`.
    pub fn edit(
        &self,
        id: impl Into<TaskId>,
        title: impl Into<String>,
        description: impl Into<String>,
        done: impl FnOnce(CoreResult<Option<Task>>) + Send + 'static,
    ) {
        let id = id.into();
        let title = title.into();
        let description = description.into();
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);

        self.executor.execute(
            move || {
                validate_title(&title)?;
                let Some(mut task) = store.get(&id)? else {
                    return Ok(None);
                };
                task.title = title;
                task.description = description;
                Ok(write_update(&store, &notifier, task)?)
            },
            done,
        );
    }

    /// Flips completion of the matching task; `Ok(None)` when absent.
    pub fn toggle_completion(
        &self,
        id: impl Into<TaskId>,
        done: impl FnOnce(CoreResult<Option<Task>>) + Send + 'static,
    ) {
        let id = id.into();
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);

        self.executor.execute(
            move || {
                let Some(task) = store.get(&id)? else {
                    return Ok(None);
                };
                Ok(write_update(&store, &notifier, task.toggled())?)
            },
            done,
        );
    }

    /// Deletes by id; completes with whether a task was removed.
    pub fn remove(
        &self,
        id: impl Into<TaskId>,
        done: impl FnOnce(CoreResult<bool>) + Send + 'static,
    ) {
        let id = id.into();
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);

        self.executor.execute(
            move || {
                let removed = store.delete_by_id(&id)?;
                if removed {
                    notifier.publish(ChangeEvent::Deleted { id });
                }
                Ok(removed)
            },
            done,
        );
    }

    /// Searches title and description; an empty query lists everything.
    pub fn find(
        &self,
        query: impl Into<String>,
        done: impl FnOnce(CoreResult<Vec<Task>>) + Send + 'static,
    ) {
        let query = query.into();
        let store = Arc::clone(&self.store);

        self.executor.execute(
            move || {
                if query.is_empty() {
                    return Ok(store.list_all()?);
                }
                Ok(store.search(&query)?)
            },
            done,
        );
    }

    /// Lists every task, newest first.
    pub fn list(&self, done: impl FnOnce(CoreResult<Vec<Task>>) + Send + 'static) {
        let store = Arc::clone(&self.store);
        self.executor.execute(move || Ok(store.list_all()?), done);
    }

    /// Removes every task; completes with the number removed.
    pub fn clear_all(&self, done: impl FnOnce(CoreResult<usize>) + Send + 'static) {
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);

        self.executor.execute(
            move || {
                let removed = store.clear_all()?;
                if removed > 0 {
                    notifier.publish(ChangeEvent::Cleared { removed });
                }
                Ok(removed)
            },
            done,
        );
    }
}

// A concurrent delete between read and write makes this a no-op.
fn write_update(
    store: &TaskStore,
    notifier: &ChangeNotifier,
    task: Task,
) -> crate::store::StoreResult<Option<Task>> {
    if !store.update(&task)? {
        return Ok(None);
    }
    notifier.publish(ChangeEvent::Updated {
        id: task.id.clone(),
    });
    Ok(Some(task))
}

//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the task record store operation contract.
//! - Isolate SQLite query details from service and sync orchestration.
//!
//! # Invariants
//! - Lenient writes (`update`, `delete_by_id`) report "nothing changed" as a
//!   value, not as an error.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod task_repo;

//! Domain model for the to-do core.
//!
//! # Responsibility
//! - Define the canonical `Task` record shared by storage, sync and service.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` that is never reused.
//! - `created_at` is fixed at creation time.

pub mod task;

//! Off-main-thread execution with main-context completion delivery.
//!
//! # Responsibility
//! - Run store and network work on a small fixed worker pool.
//! - Marshal every completion back to the single `MainContext`.
//!
//! # Invariants
//! - At most `MAX_WORKERS` operations run concurrently.
//! - Completions never run on a worker thread.
//! - Submitted work runs to completion; there is no cancellation.

mod executor;
mod main_context;
mod worker_pool;

pub use executor::Executor;
pub use main_context::{MainContext, MainHandle};
pub use worker_pool::{Job, WorkerPool, MAX_WORKERS};

//! Core use-case services.
//!
//! # Responsibility
//! - Expose the asynchronous task API used by presentation code.
//! - Keep presentation layers decoupled from storage and threading details.

pub mod task_service;

//! Local-first seed synchronization.
//!
//! # Responsibility
//! - Show local tasks first, then merge remote seed tasks in the background.
//!
//! # Invariants
//! - Seeding is insert-if-absent; local records always win.
//! - A failed fetch leaves local state untouched.

pub mod coordinator;

pub use coordinator::{SyncCoordinator, SyncReport};

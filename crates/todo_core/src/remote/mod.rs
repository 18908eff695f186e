//! Remote seed data sources.
//!
//! # Responsibility
//! - Fetch the fixed remote task collection and map it to `Task`.
//!
//! # Invariants
//! - A fetch is one request and one terminal result; no internal retries.
//! - Seeded task ids are derived from remote ids, so refetching is idempotent.

pub mod seed_fetcher;

pub use seed_fetcher::{HttpSeedFetcher, NetworkError, SeedSource, DEFAULT_SEED_ENDPOINT};

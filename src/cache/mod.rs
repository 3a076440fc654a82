//! Query caching
//!
//! Keyed, timestamped query results served stale-while-revalidate, with
//! per-key request deduplication and prefix invalidation.

mod entry;
mod query_cache;

pub use entry::{QueryEntry, QueryOptions, QueryStatus};
pub use query_cache::{CacheEvent, CacheStats, QueryCache};

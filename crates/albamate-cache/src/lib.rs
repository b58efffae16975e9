#![forbid(unsafe_code)]

//! Keyed, versioned query cache holding client-side projections of backend
//! entities.
//!
//! Layout: `key.rs` (typed cache keys and invalidation patterns), `store.rs`
//! (the shared [`QueryCache`] store).
//!
//! The cache is a shared, mutable, process-wide resource: every holder of a
//! [`QueryCache`] clone reads and writes the same entries through a single
//! mutex. Writes bump a cache-wide version counter so interleaved updates
//! from independent components stay observable. Invalidation never drops a
//! value; it marks the entry stale so read-through callers refetch while
//! renders keep something to show.

pub mod key;
pub mod store;

pub use key::{CacheKey, KeyPattern, ListKey};
pub use store::{Cached, CachedList, CacheView, QueryCache, ScrapPatch};

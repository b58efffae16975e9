//! Scrap state synchronization between the query cache and the remote
//! bookmark service.
//!
//! Layout: `reader.rs` (cache-priority scrap resolution), `toggle.rs` (the
//! optimistic toggle controller), `readthrough.rs` (stale-aware fetch
//! wrapper around an [`albamate_core::AlbaDirectory`]).
//!
//! The toggle path is deliberately optimistic: the cache is patched before
//! the backend confirms, then either invalidated (convergence via refetch)
//! or rolled back. Between the optimistic write and confirmation, different
//! cached views of the same form may transiently diverge; the inconsistency
//! window is bounded by the round trip of the in-flight request.

pub mod reader;
pub mod readthrough;
pub mod toggle;

pub use reader::ScrapStateReader;
pub use readthrough::CachedDirectory;
pub use toggle::{ToggleController, ToggleOutcome};

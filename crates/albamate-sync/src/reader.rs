//! Cache-priority resolution of the scrap pair for one form.

use albamate_cache::QueryCache;
use albamate_core::{FormId, ScrapSnapshot};

/// Resolves the authoritative-as-known `(is_scrapped, scrap_count)` pair for
/// a form from the shared cache.
///
/// Strict priority, first match wins: the detail entry (or its optimistic
/// stub), then any matching item across every page of every cached list,
/// then the caller-supplied fallback. The reader never fails and has no side
/// effects, so it is safe to call on every render.
#[derive(Clone)]
pub struct ScrapStateReader {
    cache: QueryCache,
}

impl ScrapStateReader {
    /// Construct a reader over the shared cache.
    #[must_use]
    pub fn new(cache: QueryCache) -> Self {
        Self { cache }
    }

    /// Resolve the scrap pair for `form_id`, falling back to `fallback`
    /// when no cache entry mentions the form.
    ///
    /// Stale entries still resolve; staleness only matters to read-through
    /// fetching, not to state resolution.
    #[must_use]
    pub fn resolve(&self, form_id: FormId, fallback: ScrapSnapshot) -> ScrapSnapshot {
        if let Some(detail) = self.cache.get_detail(form_id) {
            return detail.value.scrap_snapshot();
        }
        if let Some(stub) = self.cache.scrap_stub(form_id) {
            return stub.value;
        }
        if let Some(snapshot) = self.cache.find_in_lists(form_id) {
            return snapshot;
        }
        fallback
    }
}

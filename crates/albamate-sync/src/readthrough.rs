//! Stale-aware read-through access to the listing backend.

use std::sync::Arc;

use albamate_cache::{CachedList, ListKey, QueryCache};
use albamate_core::{AlbaDetail, AlbaDirectory, AlbaSummary, BookmarkResult, FormId, ListParams};
use tracing::debug;

/// Wraps an [`AlbaDirectory`] with the shared cache: fresh entries are
/// served locally, stale or missing entries are refetched and re-primed.
///
/// This is the convergence half of the toggle protocol — after a successful
/// toggle invalidates the affected families, the next read through this
/// wrapper pulls server truth back into the cache.
pub struct CachedDirectory<D> {
    cache: QueryCache,
    directory: Arc<D>,
}

impl<D> CachedDirectory<D>
where
    D: AlbaDirectory,
{
    /// Construct a read-through wrapper over shared handles.
    #[must_use]
    pub fn new(cache: QueryCache, directory: Arc<D>) -> Self {
        Self { cache, directory }
    }

    /// Detail view of a form, refetching when the cached entry is stale.
    pub async fn detail(&self, form_id: FormId) -> BookmarkResult<AlbaDetail> {
        if let Some(cached) = self.cache.get_detail(form_id) {
            if !cached.stale {
                return Ok(cached.value);
            }
            debug!(form_id = form_id.0, "detail entry stale, refetching");
        }
        let detail = self.directory.detail(form_id).await?;
        self.cache.set_detail(detail.clone());
        Ok(detail)
    }

    /// First page (or all cached pages) of a filtered listing.
    pub async fn list(&self, params: &ListParams) -> BookmarkResult<CachedList> {
        let key = ListKey::from(params);
        if let Some(cached) = self.cache.get_list(&key) {
            if !cached.stale {
                return Ok(cached.value);
            }
            debug!(key = key.as_str(), "list entry stale, refetching");
        }
        let page = self.directory.list(params).await?;
        self.cache.set_list(key, page.clone());
        Ok(CachedList::from_page(page))
    }

    /// Fetch the next page of a listing, if the cached tail advertises one.
    /// Returns the full cached list after the append, or `None` when the
    /// listing is exhausted or not cached yet.
    pub async fn load_more(&self, params: &ListParams) -> BookmarkResult<Option<CachedList>> {
        let key = ListKey::from(params);
        let Some(cursor) = self
            .cache
            .get_list(&key)
            .and_then(|cached| cached.value.next_cursor())
        else {
            return Ok(None);
        };

        let next_params = ListParams {
            cursor: Some(cursor),
            ..params.clone()
        };
        let page = self.directory.list(&next_params).await?;
        self.cache.append_page(&key, page);
        Ok(self.cache.get_list(&key).map(|cached| cached.value))
    }

    /// The current actor's scrapped forms, read through the cache.
    pub async fn my_scraps(&self) -> BookmarkResult<Vec<AlbaSummary>> {
        if let Some(cached) = self.cache.get_my_scraps() {
            if !cached.stale {
                return Ok(cached.value);
            }
        }
        let items = self.directory.my_scraps().await?;
        self.cache.set_my_scraps(items.clone());
        Ok(items)
    }

    /// The current actor's own listings, read through the cache.
    pub async fn my_listings(&self) -> BookmarkResult<Vec<AlbaSummary>> {
        if let Some(cached) = self.cache.get_my_listings() {
            if !cached.stale {
                return Ok(cached.value);
            }
        }
        let items = self.directory.my_listings().await?;
        self.cache.set_my_listings(items.clone());
        Ok(items)
    }
}

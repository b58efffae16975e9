//! Shared query-cache store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use albamate_core::{AlbaDetail, AlbaPage, AlbaSummary, FormId, ScrapSnapshot};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::key::{CacheKey, KeyPattern, ListKey};

/// A value read out of the cache, together with its write version and
/// staleness flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    /// The cached value.
    pub value: T,
    /// Cache-wide version assigned by the write that produced the value.
    pub version: u64,
    /// Whether the entry has been invalidated since that write.
    pub stale: bool,
}

/// All pages fetched so far for one list key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CachedList {
    /// Pages in fetch order.
    pub pages: Vec<AlbaPage>,
}

impl CachedList {
    /// Wrap a single freshly fetched page.
    #[must_use]
    pub fn from_page(page: AlbaPage) -> Self {
        Self { pages: vec![page] }
    }

    /// Find an item by form id across all pages.
    #[must_use]
    pub fn find(&self, form_id: FormId) -> Option<&AlbaSummary> {
        self.pages
            .iter()
            .flat_map(|page| page.items.iter())
            .find(|item| item.id == form_id)
    }

    /// Cursor of the last fetched page, if it advertises a successor.
    #[must_use]
    pub fn next_cursor(&self) -> Option<i64> {
        self.pages.last().and_then(|page| page.next_cursor)
    }
}

/// Scrap-state change applied to every cached view of one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapPatch {
    /// New scrap flag for the current actor.
    pub is_scrapped: bool,
    /// Signed count delta, clamped at zero on application.
    pub delta: i32,
}

impl ScrapPatch {
    /// Convenience constructor.
    #[must_use]
    pub const fn new(is_scrapped: bool, delta: i32) -> Self {
        Self { is_scrapped, delta }
    }
}

/// Canonical post-write view returned by [`QueryCache::update_scrap`].
///
/// Write operations return the new canonical values so callers never have to
/// re-derive state from a second read.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheView {
    /// Entry the write landed on.
    pub key: CacheKey,
    /// Scrap pair after the write.
    pub snapshot: ScrapSnapshot,
    /// Version assigned to the write.
    pub version: u64,
}

struct Entry<T> {
    value: T,
    version: u64,
    updated_at: DateTime<Utc>,
    stale: bool,
}

impl<T> Entry<T> {
    fn new(value: T, version: u64) -> Self {
        Self {
            value,
            version,
            updated_at: Utc::now(),
            stale: false,
        }
    }

    fn touch(&mut self, version: u64) {
        self.version = version;
        self.updated_at = Utc::now();
        self.stale = false;
    }
}

struct CacheInner {
    details: HashMap<FormId, Entry<AlbaDetail>>,
    /// Scrap pairs written optimistically for forms whose detail document has
    /// not been fetched yet. Cleared when the full detail arrives.
    stubs: HashMap<FormId, Entry<ScrapSnapshot>>,
    lists: HashMap<ListKey, Entry<CachedList>>,
    my_scraps: Option<Entry<Vec<AlbaSummary>>>,
    my_listings: Option<Entry<Vec<AlbaSummary>>>,
}

impl Default for CacheInner {
    fn default() -> Self {
        Self {
            details: HashMap::new(),
            stubs: HashMap::new(),
            lists: HashMap::new(),
            my_scraps: None,
            my_listings: None,
        }
    }
}

/// Shared, mutable query cache.
///
/// Cloning is cheap and every clone addresses the same entries. There is no
/// locking beyond the single internal mutex; concurrent writers from
/// different components interleave, and the version counter makes that
/// interleaving observable.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Mutex<CacheInner>>,
    versions: Arc<AtomicU64>,
}

impl QueryCache {
    /// Construct an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            versions: Arc::new(AtomicU64::new(1)),
        }
    }

    fn next_version(&self) -> u64 {
        self.versions.fetch_add(1, Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        self.inner.lock().expect("cache mutex poisoned")
    }

    /// Read the detail entry for a form, if one has been fetched.
    ///
    /// Scrap stubs are deliberately excluded: a stub carries only the scrap
    /// pair, not a renderable document. Use [`Self::scrap_stub`] for those.
    #[must_use]
    pub fn get_detail(&self, form_id: FormId) -> Option<Cached<AlbaDetail>> {
        let inner = self.lock();
        inner.details.get(&form_id).map(|entry| Cached {
            value: entry.value.clone(),
            version: entry.version,
            stale: entry.stale,
        })
    }

    /// Read the optimistic scrap stub for a form, if one exists.
    #[must_use]
    pub fn scrap_stub(&self, form_id: FormId) -> Option<Cached<ScrapSnapshot>> {
        let inner = self.lock();
        inner.stubs.get(&form_id).map(|entry| Cached {
            value: entry.value,
            version: entry.version,
            stale: entry.stale,
        })
    }

    /// Read all cached pages for a list key.
    #[must_use]
    pub fn get_list(&self, key: &ListKey) -> Option<Cached<CachedList>> {
        let inner = self.lock();
        inner.lists.get(key).map(|entry| Cached {
            value: entry.value.clone(),
            version: entry.version,
            stale: entry.stale,
        })
    }

    /// Read the cached `myScraps` aggregate.
    #[must_use]
    pub fn get_my_scraps(&self) -> Option<Cached<Vec<AlbaSummary>>> {
        let inner = self.lock();
        inner.my_scraps.as_ref().map(|entry| Cached {
            value: entry.value.clone(),
            version: entry.version,
            stale: entry.stale,
        })
    }

    /// Read the cached `myListings` aggregate.
    #[must_use]
    pub fn get_my_listings(&self) -> Option<Cached<Vec<AlbaSummary>>> {
        let inner = self.lock();
        inner.my_listings.as_ref().map(|entry| Cached {
            value: entry.value.clone(),
            version: entry.version,
            stale: entry.stale,
        })
    }

    /// Store a freshly fetched detail document, superseding any stub.
    pub fn set_detail(&self, detail: AlbaDetail) -> u64 {
        let version = self.next_version();
        let mut inner = self.lock();
        inner.stubs.remove(&detail.id);
        match inner.details.entry(detail.id) {
            std::collections::hash_map::Entry::Occupied(mut occupied) => {
                occupied.get_mut().value = detail;
                occupied.get_mut().touch(version);
            }
            std::collections::hash_map::Entry::Vacant(vacant) => {
                vacant.insert(Entry::new(detail, version));
            }
        }
        version
    }

    /// Replace the cached pages for a list key with a single fresh page.
    pub fn set_list(&self, key: ListKey, page: AlbaPage) -> u64 {
        let version = self.next_version();
        let mut inner = self.lock();
        inner
            .lists
            .insert(key, Entry::new(CachedList::from_page(page), version));
        version
    }

    /// Append a follow-up page to an existing list entry, creating the entry
    /// when the first page arrives out of order.
    pub fn append_page(&self, key: &ListKey, page: AlbaPage) -> u64 {
        let version = self.next_version();
        let mut inner = self.lock();
        match inner.lists.get_mut(key) {
            Some(entry) => {
                entry.value.pages.push(page);
                entry.touch(version);
            }
            None => {
                inner
                    .lists
                    .insert(key.clone(), Entry::new(CachedList::from_page(page), version));
            }
        }
        version
    }

    /// Store the `myScraps` aggregate.
    pub fn set_my_scraps(&self, items: Vec<AlbaSummary>) -> u64 {
        let version = self.next_version();
        let mut inner = self.lock();
        inner.my_scraps = Some(Entry::new(items, version));
        version
    }

    /// Store the `myListings` aggregate.
    pub fn set_my_listings(&self, items: Vec<AlbaSummary>) -> u64 {
        let version = self.next_version();
        let mut inner = self.lock();
        inner.my_listings = Some(Entry::new(items, version));
        version
    }

    /// Apply a scrap patch to every cached view of one form: the detail
    /// entry (or a stub when no detail has been fetched) and every matching
    /// item on every page of every list entry.
    ///
    /// Returns the canonical post-write views, one per entry touched. The
    /// aggregates are not patched here; they are only ever invalidated and
    /// refetched, matching their read-only projection role.
    pub fn update_scrap(&self, form_id: FormId, patch: ScrapPatch) -> Vec<CacheView> {
        let version = self.next_version();
        let mut inner = self.lock();
        let mut views = Vec::new();

        if let Some(entry) = inner.details.get_mut(&form_id) {
            let next = entry.value.scrap_snapshot().apply(patch.is_scrapped, patch.delta);
            entry.value.is_scrapped = next.is_scrapped;
            entry.value.scrap_count = next.scrap_count;
            entry.touch(version);
            views.push(CacheView {
                key: CacheKey::Detail(form_id),
                snapshot: next,
                version,
            });
        } else {
            let next = match inner.stubs.get_mut(&form_id) {
                Some(entry) => {
                    let next = entry.value.apply(patch.is_scrapped, patch.delta);
                    entry.value = next;
                    entry.touch(version);
                    next
                }
                None => {
                    let next = ScrapSnapshot::default().apply(patch.is_scrapped, patch.delta);
                    inner.stubs.insert(form_id, Entry::new(next, version));
                    next
                }
            };
            views.push(CacheView {
                key: CacheKey::Detail(form_id),
                snapshot: next,
                version,
            });
        }

        for (key, entry) in &mut inner.lists {
            let mut touched = None;
            for page in &mut entry.value.pages {
                for item in page.items.iter_mut().filter(|item| item.id == form_id) {
                    let current = item
                        .scrap_snapshot()
                        .unwrap_or_default();
                    let next = current.apply(patch.is_scrapped, patch.delta);
                    item.is_scrapped = Some(next.is_scrapped);
                    item.scrap_count = Some(next.scrap_count);
                    touched = Some(next);
                }
            }
            if let Some(snapshot) = touched {
                entry.touch(version);
                views.push(CacheView {
                    key: CacheKey::List(key.clone()),
                    snapshot,
                    version,
                });
            }
        }

        debug!(
            form_id = form_id.0,
            views = views.len(),
            version,
            "applied scrap patch"
        );
        views
    }

    /// Mark every entry matching the pattern as stale, forcing the next
    /// read-through access to refetch. Values are kept so renders have
    /// something to show in the meantime. Returns the number of entries
    /// marked.
    pub fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let mut inner = self.lock();
        let mut marked = 0;

        for (form_id, entry) in &mut inner.details {
            if pattern.matches(&CacheKey::Detail(*form_id)) && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        for (form_id, entry) in &mut inner.stubs {
            if pattern.matches(&CacheKey::Detail(*form_id)) && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        for (key, entry) in &mut inner.lists {
            if pattern.matches(&CacheKey::List(key.clone())) && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        if let Some(entry) = inner.my_scraps.as_mut() {
            if pattern.matches(&CacheKey::MyScraps) && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        if let Some(entry) = inner.my_listings.as_mut() {
            if pattern.matches(&CacheKey::MyListings) && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }

        debug!(?pattern, marked, "invalidated cache entries");
        marked
    }

    /// Scan every page of every cached list for an item with this form id
    /// that carries a concrete scrap flag. Guest-mode items without scrap
    /// fields are skipped. Which list answers first is unspecified when
    /// several contain the form; after convergence they agree anyway.
    #[must_use]
    pub fn find_in_lists(&self, form_id: FormId) -> Option<ScrapSnapshot> {
        let inner = self.lock();
        inner
            .lists
            .values()
            .flat_map(|entry| entry.value.pages.iter())
            .flat_map(|page| page.items.iter())
            .filter(|item| item.id == form_id)
            .find_map(AlbaSummary::scrap_snapshot)
    }

    /// Timestamp of the most recent write to the detail entry of a form,
    /// useful for staleness diagnostics.
    #[must_use]
    pub fn detail_updated_at(&self, form_id: FormId) -> Option<DateTime<Utc>> {
        let inner = self.lock();
        inner.details.get(&form_id).map(|entry| entry.updated_at)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use albamate_core::ListParams;
    use albamate_test_support::fixtures;

    use super::*;

    fn primed_cache() -> (QueryCache, ListKey) {
        let cache = QueryCache::new();
        let key = ListKey::from(&ListParams::default());
        cache.set_detail(fixtures::detail(42, false, 10));
        cache.set_list(key.clone(), fixtures::page(&[(42, false, 10), (7, true, 3)]));
        (cache, key)
    }

    #[test]
    fn update_scrap_fans_out_to_detail_and_lists() {
        let (cache, key) = primed_cache();

        let views = cache.update_scrap(FormId(42), ScrapPatch::new(true, 1));
        assert_eq!(views.len(), 2);
        assert!(views
            .iter()
            .all(|view| view.snapshot == ScrapSnapshot::new(true, 11)));

        let detail = cache.get_detail(FormId(42)).expect("detail cached");
        assert_eq!(detail.value.scrap_snapshot(), ScrapSnapshot::new(true, 11));

        let list = cache.get_list(&key).expect("list cached");
        let item = list.value.find(FormId(42)).expect("item present");
        assert_eq!(item.scrap_snapshot(), Some(ScrapSnapshot::new(true, 11)));
        // The unrelated item is untouched.
        let other = list.value.find(FormId(7)).expect("other item present");
        assert_eq!(other.scrap_snapshot(), Some(ScrapSnapshot::new(true, 3)));
    }

    #[test]
    fn update_scrap_creates_stub_when_detail_missing() {
        let cache = QueryCache::new();
        let views = cache.update_scrap(FormId(5), ScrapPatch::new(true, 1));
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].snapshot, ScrapSnapshot::new(true, 1));
        assert!(cache.get_detail(FormId(5)).is_none());
        let stub = cache.scrap_stub(FormId(5)).expect("stub created");
        assert_eq!(stub.value, ScrapSnapshot::new(true, 1));
    }

    #[test]
    fn set_detail_supersedes_stub() {
        let cache = QueryCache::new();
        cache.update_scrap(FormId(5), ScrapPatch::new(true, 1));
        cache.set_detail(fixtures::detail(5, true, 6));
        assert!(cache.scrap_stub(FormId(5)).is_none());
        let detail = cache.get_detail(FormId(5)).expect("detail cached");
        assert_eq!(detail.value.scrap_snapshot(), ScrapSnapshot::new(true, 6));
    }

    #[test]
    fn scrap_count_never_goes_negative() {
        let (cache, key) = primed_cache();
        // Large negative delta, e.g. a conflict correction landing twice.
        cache.update_scrap(FormId(42), ScrapPatch::new(false, -100));
        let list = cache.get_list(&key).expect("list cached");
        let item = list.value.find(FormId(42)).expect("item present");
        assert_eq!(item.scrap_snapshot(), Some(ScrapSnapshot::new(false, 0)));
    }

    #[test]
    fn invalidate_targets_all_four_families() {
        let (cache, key) = primed_cache();
        cache.set_my_scraps(vec![fixtures::summary(42, true, 10)]);
        cache.set_my_listings(vec![fixtures::summary(9, false, 0)]);

        let marked = cache.invalidate(&KeyPattern::DetailOf(FormId(42)))
            + cache.invalidate(&KeyPattern::AllLists)
            + cache.invalidate(&KeyPattern::Aggregates);
        assert_eq!(marked, 4);

        assert!(cache.get_detail(FormId(42)).expect("detail").stale);
        assert!(cache.get_list(&key).expect("list").stale);
        assert!(cache.get_my_scraps().expect("scraps").stale);
        assert!(cache.get_my_listings().expect("listings").stale);
    }

    #[test]
    fn invalidation_keeps_values_readable() {
        let (cache, _) = primed_cache();
        cache.invalidate(&KeyPattern::All);
        let detail = cache.get_detail(FormId(42)).expect("value survives");
        assert!(detail.stale);
        assert_eq!(detail.value.scrap_snapshot(), ScrapSnapshot::new(false, 10));
    }

    #[test]
    fn writes_clear_staleness_and_advance_versions() {
        let (cache, _) = primed_cache();
        cache.invalidate(&KeyPattern::DetailOf(FormId(42)));
        let stale = cache.get_detail(FormId(42)).expect("detail");
        let version = cache.set_detail(fixtures::detail(42, true, 11));
        let fresh = cache.get_detail(FormId(42)).expect("detail");
        assert!(!fresh.stale);
        assert!(version > stale.version);
        assert_eq!(fresh.version, version);
    }

    #[test]
    fn append_page_extends_pagination() {
        let cache = QueryCache::new();
        let key = ListKey::from(&ListParams::default());
        cache.set_list(key.clone(), fixtures::page_with_cursor(&[(1, false, 0)], Some(1)));
        cache.append_page(&key, fixtures::page(&[(2, false, 0)]));
        let list = cache.get_list(&key).expect("list cached");
        assert_eq!(list.value.pages.len(), 2);
        assert_eq!(list.value.next_cursor(), None);
        assert!(list.value.find(FormId(2)).is_some());
    }
}

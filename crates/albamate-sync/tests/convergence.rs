//! End-to-end convergence scenarios: toggle, invalidate, refetch.

use std::sync::Arc;

use albamate_cache::{ListKey, QueryCache};
use albamate_core::{BookmarkError, FormId, ListParams, ScrapSnapshot};
use albamate_events::NoticeBus;
use albamate_sync::{CachedDirectory, ToggleController, ToggleOutcome};
use albamate_test_support::{fixtures, mocks};

struct World {
    cache: QueryCache,
    bookmarks: Arc<mocks::FakeBookmarkService>,
    directory: Arc<mocks::FakeDirectory>,
    notices: NoticeBus,
    controller: ToggleController<mocks::FakeSession, mocks::FakeBookmarkService>,
}

fn world() -> World {
    let cache = QueryCache::new();
    let bookmarks = Arc::new(mocks::FakeBookmarkService::new());
    let directory = Arc::new(mocks::FakeDirectory::new());
    let notices = NoticeBus::new();
    let controller = ToggleController::new(
        cache.clone(),
        Arc::new(mocks::FakeSession::authenticated()),
        bookmarks.clone(),
        notices.clone(),
    );
    World {
        cache,
        bookmarks,
        directory,
        notices,
        controller,
    }
}

#[tokio::test]
async fn add_toggle_converges_to_server_truth() {
    let w = world();
    let reader = CachedDirectory::new(w.cache.clone(), w.directory.clone());

    // Initial server state: form 42 unscrapped with count 10.
    w.directory.put_detail(fixtures::detail(42, false, 10));
    w.directory.queue_page(fixtures::page(&[(42, false, 10)]));
    let _ = reader.detail(FormId(42)).await.expect("primed detail");
    let _ = reader.list(&ListParams::default()).await.expect("primed list");

    let outcome = w.controller.toggle(FormId(42)).await;
    assert_eq!(outcome, ToggleOutcome::Confirmed { is_scrapped: true });

    // The optimistic write is already visible.
    let optimistic = w.cache.get_detail(FormId(42)).expect("detail cached");
    assert_eq!(
        optimistic.value.scrap_snapshot(),
        ScrapSnapshot::new(true, 11)
    );
    assert!(optimistic.stale);

    // The server confirms the same state on refetch.
    w.directory.put_detail(fixtures::detail(42, true, 11));
    let refetched = reader.detail(FormId(42)).await.expect("refetched");
    assert_eq!(refetched.scrap_snapshot(), ScrapSnapshot::new(true, 11));
    assert_eq!(w.directory.detail_calls(), 2);

    let fresh = w.cache.get_detail(FormId(42)).expect("detail cached");
    assert!(!fresh.stale);
}

#[tokio::test]
async fn failed_remove_rolls_back_and_notifies() {
    let w = world();
    let mut stream = w.notices.subscribe(None);

    w.cache.set_detail(fixtures::detail(42, true, 11));
    w.cache.set_list(
        ListKey::from(&ListParams::default()),
        fixtures::page(&[(42, true, 11)]),
    );
    w.bookmarks.queue_remove(Err(BookmarkError::transport(
        std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"),
    )));

    let outcome = w.controller.toggle(FormId(42)).await;
    assert_eq!(outcome, ToggleOutcome::RolledBack);

    // Every view is back at the pre-toggle pair.
    let detail = w.cache.get_detail(FormId(42)).expect("detail cached");
    assert_eq!(detail.value.scrap_snapshot(), ScrapSnapshot::new(true, 11));
    let list = w
        .cache
        .get_list(&ListKey::from(&ListParams::default()))
        .expect("list cached");
    let item = list.value.find(FormId(42)).expect("item present");
    assert_eq!(item.scrap_snapshot(), Some(ScrapSnapshot::new(true, 11)));

    // Nothing went stale: the failed toggle must not force refetches.
    assert!(!detail.stale);
    assert!(!list.stale);

    let notice = stream.next().await.expect("failure notice");
    assert_eq!(notice.notice.kind(), "toggle_failed");
}

#[tokio::test]
async fn independent_controllers_race_but_refetch_resolves() {
    // Two components toggling the same form concurrently are not mutually
    // excluded; the cache may transiently skew, but invalidation-driven
    // refetch restores server truth.
    let cache = QueryCache::new();
    let bookmarks = Arc::new(mocks::FakeBookmarkService::new());
    let directory = Arc::new(mocks::FakeDirectory::new());
    let session = Arc::new(mocks::FakeSession::authenticated());
    let notices = NoticeBus::new();

    directory.put_detail(fixtures::detail(42, false, 10));
    cache.set_detail(fixtures::detail(42, false, 10));

    let card = ToggleController::new(
        cache.clone(),
        session.clone(),
        bookmarks.clone(),
        notices.clone(),
    );
    let floating = ToggleController::new(cache.clone(), session, bookmarks.clone(), notices);

    // Both see "unscrapped" and both add; the server ends at scrapped.
    let first = card.toggle(FormId(42)).await;
    assert_eq!(first, ToggleOutcome::Confirmed { is_scrapped: true });
    // The second controller resolves the already-updated cache, so it
    // removes; with interleaved in-flight requests both could have added.
    let second = floating.toggle(FormId(42)).await;
    assert_eq!(second, ToggleOutcome::Confirmed { is_scrapped: false });
    assert_eq!(bookmarks.add_calls() + bookmarks.remove_calls(), 2);

    // Whatever the interleaving left behind, refetch converges.
    directory.put_detail(fixtures::detail(42, false, 10));
    let reader = CachedDirectory::new(cache.clone(), directory);
    let refetched = reader.detail(FormId(42)).await.expect("refetched");
    assert_eq!(refetched.scrap_snapshot(), ScrapSnapshot::new(false, 10));
}

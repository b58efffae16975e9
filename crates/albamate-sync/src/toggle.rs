//! Optimistic scrap toggle controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use albamate_cache::{KeyPattern, QueryCache, ScrapPatch};
use albamate_core::{BookmarkError, BookmarkResult, BookmarkService, FormId, ScrapSnapshot, SessionProvider};
use albamate_events::{Notice, NoticeBus};
use tracing::{info, warn};

use crate::reader::ScrapStateReader;

/// Terminal state of one toggle operation.
///
/// Per toggle the lifecycle is `Idle → OptimisticallyApplied → {Confirmed |
/// ConflictCorrected | RolledBack} → Idle`; nothing is persisted, so a
/// process restart loses any in-flight operation and the reader falls back
/// to cache or server truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The backend confirmed the intended state.
    Confirmed {
        /// Scrap flag after confirmation.
        is_scrapped: bool,
    },
    /// The backend reported the form already scrapped; a corrective removal
    /// was issued and the final state is unscrapped.
    ConflictCorrected,
    /// The remote call failed; the optimistic write was reverted.
    RolledBack,
    /// The actor holds no session; nothing was mutated and the caller
    /// should redirect to sign-in.
    Unauthenticated,
    /// Another toggle by this controller instance was in flight; this call
    /// was dropped.
    Skipped,
}

/// Releases the single-flight flag on every exit path, including panics in
/// intermediate steps.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

enum ConfirmKind {
    Added,
    Removed,
    Corrected,
}

/// Orchestrates a single scrap toggle: snapshot, optimistic write, remote
/// mutation, reconcile, resync.
///
/// Single-flight per controller instance: re-entrant calls while one toggle
/// is in flight are dropped. There is no cross-instance coordination — two
/// controllers toggling the same form can interleave their writes, and the
/// resulting transient count skew resolves on the next invalidation-driven
/// refetch.
pub struct ToggleController<S, B> {
    cache: QueryCache,
    reader: ScrapStateReader,
    session: Arc<S>,
    bookmarks: Arc<B>,
    notices: NoticeBus,
    fallback: ScrapSnapshot,
    in_flight: AtomicBool,
}

impl<S, B> ToggleController<S, B>
where
    S: SessionProvider,
    B: BookmarkService,
{
    /// Construct a controller over shared handles.
    #[must_use]
    pub fn new(
        cache: QueryCache,
        session: Arc<S>,
        bookmarks: Arc<B>,
        notices: NoticeBus,
    ) -> Self {
        Self {
            reader: ScrapStateReader::new(cache.clone()),
            cache,
            session,
            bookmarks,
            notices,
            fallback: ScrapSnapshot::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Override the fallback pair used when no cache entry mentions the
    /// form (component-local default or last-known local state).
    #[must_use]
    pub fn with_fallback(mut self, fallback: ScrapSnapshot) -> Self {
        self.fallback = fallback;
        self
    }

    /// Toggle the scrap state of `form_id`.
    ///
    /// All remote failures are absorbed here: the returned outcome plus the
    /// notices published on the bus are the only signals callers get, and
    /// none of them block rendering.
    pub async fn toggle(&self, form_id: FormId) -> ToggleOutcome {
        if !self.session.is_authenticated().await {
            info!(form_id = form_id.0, "toggle requested without a session");
            return ToggleOutcome::Unauthenticated;
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return ToggleOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let was = self.reader.resolve(form_id, self.fallback);
        let intended = !was.is_scrapped;
        let delta: i32 = if intended { 1 } else { -1 };

        self.cache
            .update_scrap(form_id, ScrapPatch::new(intended, delta));

        match self.confirm(form_id, was).await {
            Ok(kind) => {
                self.resync(form_id);
                match kind {
                    ConfirmKind::Added => {
                        info!(form_id = form_id.0, "scrap added");
                        self.notices.publish(Notice::ScrapAdded { form_id });
                        ToggleOutcome::Confirmed { is_scrapped: true }
                    }
                    ConfirmKind::Removed => {
                        info!(form_id = form_id.0, "scrap removed");
                        self.notices.publish(Notice::ScrapRemoved { form_id });
                        ToggleOutcome::Confirmed { is_scrapped: false }
                    }
                    ConfirmKind::Corrected => {
                        info!(form_id = form_id.0, "scrap conflict corrected into removal");
                        self.notices.publish(Notice::ScrapCorrected { form_id });
                        ToggleOutcome::ConflictCorrected
                    }
                }
            }
            Err(error) => {
                // Revert the optimistic write exactly.
                self.cache
                    .update_scrap(form_id, ScrapPatch::new(was.is_scrapped, -delta));

                if error.is_unauthenticated() {
                    warn!(form_id = form_id.0, %error, "session expired during toggle");
                    self.session.sign_out().await;
                    self.notices.publish(Notice::SessionExpired);
                } else {
                    warn!(form_id = form_id.0, %error, "scrap toggle failed, rolled back");
                    self.notices.publish(Notice::ToggleFailed {
                        form_id,
                        message: error.to_string(),
                    });
                }
                ToggleOutcome::RolledBack
            }
        }
    }

    /// Run the remote leg of the toggle. The session refresh is a
    /// precondition of the mutation; any refresh failure counts as expiry.
    async fn confirm(&self, form_id: FormId, was: ScrapSnapshot) -> BookmarkResult<ConfirmKind> {
        if let Err(error) = self.session.refresh().await {
            return Err(match error {
                BookmarkError::Unauthenticated { .. } => error,
                other => BookmarkError::Unauthenticated {
                    reason: other.to_string(),
                },
            });
        }

        if was.is_scrapped {
            self.bookmarks.remove_scrap(form_id).await?;
            return Ok(ConfirmKind::Removed);
        }

        match self.bookmarks.add_scrap(form_id).await {
            Ok(()) => Ok(ConfirmKind::Added),
            Err(error) if error.is_conflict() => {
                // The server already had the scrap: treat the toggle as a
                // removal. Undo the optimistic +1 and go one further to
                // reach the true state.
                self.bookmarks.remove_scrap(form_id).await?;
                self.cache
                    .update_scrap(form_id, ScrapPatch::new(false, -2));
                Ok(ConfirmKind::Corrected)
            }
            Err(error) => Err(error),
        }
    }

    /// Invalidate every cache family that may hold a projection of the
    /// form. The optimistic write is a best-effort approximation; this is
    /// the convergence mechanism.
    fn resync(&self, form_id: FormId) {
        self.cache.invalidate(&KeyPattern::DetailOf(form_id));
        self.cache.invalidate(&KeyPattern::AllLists);
        self.cache.invalidate(&KeyPattern::Aggregates);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use albamate_cache::ListKey;
    use albamate_core::ListParams;
    use albamate_test_support::{fixtures, mocks};

    use super::*;

    struct Harness {
        cache: QueryCache,
        session: Arc<mocks::FakeSession>,
        bookmarks: Arc<mocks::FakeBookmarkService>,
        notices: NoticeBus,
        controller: Arc<ToggleController<mocks::FakeSession, mocks::FakeBookmarkService>>,
    }

    fn harness() -> Harness {
        let cache = QueryCache::new();
        let session = Arc::new(mocks::FakeSession::authenticated());
        let bookmarks = Arc::new(mocks::FakeBookmarkService::new());
        let notices = NoticeBus::new();
        let controller = Arc::new(ToggleController::new(
            cache.clone(),
            session.clone(),
            bookmarks.clone(),
            notices.clone(),
        ));
        Harness {
            cache,
            session,
            bookmarks,
            notices,
            controller,
        }
    }

    fn snapshot_of(cache: &QueryCache, id: i64) -> ScrapSnapshot {
        cache
            .get_detail(FormId(id))
            .map(|cached| cached.value.scrap_snapshot())
            .expect("detail cached")
    }

    #[tokio::test]
    async fn successful_add_confirms_and_invalidates() {
        let h = harness();
        h.cache.set_detail(fixtures::detail(42, false, 10));
        h.cache.set_list(
            ListKey::from(&ListParams::default()),
            fixtures::page(&[(42, false, 10)]),
        );
        h.cache.set_my_scraps(vec![]);

        let outcome = h.controller.toggle(FormId(42)).await;
        assert_eq!(outcome, ToggleOutcome::Confirmed { is_scrapped: true });
        assert_eq!(h.bookmarks.add_calls(), 1);
        assert_eq!(h.session.refresh_calls(), 1);
        assert_eq!(snapshot_of(&h.cache, 42), ScrapSnapshot::new(true, 11));

        // All families holding this form are stale after the resync.
        assert!(h.cache.get_detail(FormId(42)).expect("detail").stale);
        assert!(h
            .cache
            .get_list(&ListKey::from(&ListParams::default()))
            .expect("list")
            .stale);
        assert!(h.cache.get_my_scraps().expect("aggregate").stale);
    }

    #[tokio::test]
    async fn successful_remove_publishes_removed_notice() {
        let h = harness();
        let mut stream = h.notices.subscribe(None);
        h.cache.set_detail(fixtures::detail(42, true, 11));

        let outcome = h.controller.toggle(FormId(42)).await;
        assert_eq!(outcome, ToggleOutcome::Confirmed { is_scrapped: false });
        assert_eq!(h.bookmarks.remove_calls(), 1);
        assert_eq!(h.bookmarks.add_calls(), 0);
        assert_eq!(snapshot_of(&h.cache, 42), ScrapSnapshot::new(false, 10));

        let notice = stream.next().await.expect("notice published");
        assert_eq!(notice.notice, Notice::ScrapRemoved { form_id: FormId(42) });
    }

    #[tokio::test]
    async fn network_failure_rolls_back_exactly() {
        let h = harness();
        let mut stream = h.notices.subscribe(None);
        h.cache.set_detail(fixtures::detail(42, false, 5));
        h.bookmarks.queue_add(Err(BookmarkError::transport(
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
        )));

        let outcome = h.controller.toggle(FormId(42)).await;
        assert_eq!(outcome, ToggleOutcome::RolledBack);
        assert_eq!(snapshot_of(&h.cache, 42), ScrapSnapshot::new(false, 5));

        let notice = stream.next().await.expect("notice published");
        assert_eq!(notice.notice.kind(), "toggle_failed");
        assert!(!h.session.signed_out());
    }

    #[tokio::test]
    async fn conflict_corrects_to_unscrapped_netting_minus_one() {
        let h = harness();
        h.cache.set_detail(fixtures::detail(42, false, 10));
        h.bookmarks.queue_add(Err(BookmarkError::Conflict {
            form_id: FormId(42),
        }));

        let outcome = h.controller.toggle(FormId(42)).await;
        assert_eq!(outcome, ToggleOutcome::ConflictCorrected);
        // Corrective removal was issued: optimistic +1, then -2 to land one
        // below the pre-toggle count, matching the server's removal.
        assert_eq!(h.bookmarks.remove_calls(), 1);
        assert_eq!(snapshot_of(&h.cache, 42), ScrapSnapshot::new(false, 9));
    }

    #[tokio::test]
    async fn failed_corrective_removal_rolls_back() {
        let h = harness();
        h.cache.set_detail(fixtures::detail(42, false, 10));
        h.bookmarks.queue_add(Err(BookmarkError::Conflict {
            form_id: FormId(42),
        }));
        h.bookmarks.queue_remove(Err(BookmarkError::Backend {
            status: 500,
            message: None,
        }));

        let outcome = h.controller.toggle(FormId(42)).await;
        assert_eq!(outcome, ToggleOutcome::RolledBack);
        assert_eq!(snapshot_of(&h.cache, 42), ScrapSnapshot::new(false, 10));
    }

    #[tokio::test]
    async fn refresh_failure_signs_out_and_rolls_back() {
        let h = harness();
        let mut stream = h.notices.subscribe(None);
        h.cache.set_detail(fixtures::detail(42, false, 10));
        h.session.queue_refresh(Err(BookmarkError::Unauthenticated {
            reason: "refresh token expired".into(),
        }));

        let outcome = h.controller.toggle(FormId(42)).await;
        assert_eq!(outcome, ToggleOutcome::RolledBack);
        assert_eq!(snapshot_of(&h.cache, 42), ScrapSnapshot::new(false, 10));
        assert!(h.session.signed_out());
        assert_eq!(h.bookmarks.add_calls(), 0);

        let notice = stream.next().await.expect("notice published");
        assert_eq!(notice.notice, Notice::SessionExpired);
    }

    #[tokio::test]
    async fn guest_toggle_mutates_nothing() {
        let cache = QueryCache::new();
        cache.set_detail(fixtures::detail(42, false, 10));
        let session = Arc::new(mocks::FakeSession::guest());
        let bookmarks = Arc::new(mocks::FakeBookmarkService::new());
        let controller = ToggleController::new(
            cache.clone(),
            session,
            bookmarks.clone(),
            NoticeBus::new(),
        );

        let outcome = controller.toggle(FormId(42)).await;
        assert_eq!(outcome, ToggleOutcome::Unauthenticated);
        assert_eq!(bookmarks.add_calls(), 0);
        let detail = cache.get_detail(FormId(42)).expect("detail");
        assert_eq!(detail.value.scrap_snapshot(), ScrapSnapshot::new(false, 10));
        assert!(!detail.stale);
    }

    #[tokio::test]
    async fn second_toggle_while_in_flight_is_skipped() {
        let h = harness();
        h.cache.set_detail(fixtures::detail(42, false, 10));
        h.bookmarks.set_call_delay(Duration::from_millis(50));

        let first = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.toggle(FormId(42)).await })
        };
        // Give the first toggle time to reach its remote call.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = h.controller.toggle(FormId(42)).await;
        assert_eq!(second, ToggleOutcome::Skipped);

        let first = first.await.expect("task completed");
        assert_eq!(first, ToggleOutcome::Confirmed { is_scrapped: true });
        assert_eq!(h.bookmarks.add_calls(), 1);
    }

    #[tokio::test]
    async fn toggle_without_any_cache_entry_uses_fallback() {
        let h = harness();
        let outcome = h.controller.toggle(FormId(7)).await;
        // Fallback is unscrapped, so the toggle is an add.
        assert_eq!(outcome, ToggleOutcome::Confirmed { is_scrapped: true });
        assert_eq!(h.bookmarks.add_calls(), 1);
        let stub = h.cache.scrap_stub(FormId(7)).expect("stub written");
        assert_eq!(stub.value, ScrapSnapshot::new(true, 1));
    }
}

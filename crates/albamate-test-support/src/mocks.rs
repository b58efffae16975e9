//! Fake service implementations with scripted outcomes and call counters.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use albamate_core::{
    AlbaDetail, AlbaDirectory, AlbaPage, AlbaSummary, BookmarkError, BookmarkResult,
    BookmarkService, FormId, ListParams, SessionProvider,
};
use async_trait::async_trait;

/// Fake [`BookmarkService`] that pops scripted outcomes per operation and
/// counts calls. When no outcome is queued the call succeeds.
#[derive(Default)]
pub struct FakeBookmarkService {
    add_outcomes: Mutex<VecDeque<BookmarkResult<()>>>,
    remove_outcomes: Mutex<VecDeque<BookmarkResult<()>>>,
    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    call_delay: Mutex<Option<Duration>>,
}

impl FakeBookmarkService {
    /// Construct a fake that succeeds on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next `add_scrap` call.
    pub fn queue_add(&self, outcome: BookmarkResult<()>) {
        self.add_outcomes
            .lock()
            .expect("outcome queue poisoned")
            .push_back(outcome);
    }

    /// Queue the outcome of the next `remove_scrap` call.
    pub fn queue_remove(&self, outcome: BookmarkResult<()>) {
        self.remove_outcomes
            .lock()
            .expect("outcome queue poisoned")
            .push_back(outcome);
    }

    /// Delay every call by `duration`, keeping the operation in flight long
    /// enough for re-entrancy tests to observe it.
    pub fn set_call_delay(&self, duration: Duration) {
        *self.call_delay.lock().expect("delay poisoned") = Some(duration);
    }

    /// Number of `add_scrap` calls observed.
    #[must_use]
    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    /// Number of `remove_scrap` calls observed.
    #[must_use]
    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    async fn apply_delay(&self) {
        let delay = *self.call_delay.lock().expect("delay poisoned");
        if let Some(duration) = delay {
            tokio::time::sleep(duration).await;
        }
    }
}

#[async_trait]
impl BookmarkService for FakeBookmarkService {
    async fn add_scrap(&self, _form_id: FormId) -> BookmarkResult<()> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_delay().await;
        self.add_outcomes
            .lock()
            .expect("outcome queue poisoned")
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn remove_scrap(&self, _form_id: FormId) -> BookmarkResult<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_delay().await;
        self.remove_outcomes
            .lock()
            .expect("outcome queue poisoned")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// Fake [`SessionProvider`] with a switchable authenticated flag and
/// scripted refresh outcomes.
pub struct FakeSession {
    authenticated: AtomicBool,
    refresh_outcomes: Mutex<VecDeque<BookmarkResult<()>>>,
    refresh_calls: AtomicUsize,
    signed_out: AtomicBool,
}

impl FakeSession {
    /// An authenticated session whose refreshes succeed.
    #[must_use]
    pub fn authenticated() -> Self {
        Self {
            authenticated: AtomicBool::new(true),
            refresh_outcomes: Mutex::new(VecDeque::new()),
            refresh_calls: AtomicUsize::new(0),
            signed_out: AtomicBool::new(false),
        }
    }

    /// A guest session.
    #[must_use]
    pub fn guest() -> Self {
        let session = Self::authenticated();
        session.authenticated.store(false, Ordering::SeqCst);
        session
    }

    /// Queue the outcome of the next refresh.
    pub fn queue_refresh(&self, outcome: BookmarkResult<()>) {
        self.refresh_outcomes
            .lock()
            .expect("refresh queue poisoned")
            .push_back(outcome);
    }

    /// Number of refreshes observed.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Whether `sign_out` was invoked.
    #[must_use]
    pub fn signed_out(&self) -> bool {
        self.signed_out.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for FakeSession {
    async fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn refresh(&self) -> BookmarkResult<()> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_outcomes
            .lock()
            .expect("refresh queue poisoned")
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn sign_out(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
        self.signed_out.store(true, Ordering::SeqCst);
    }
}

/// Fake [`AlbaDirectory`] serving stored values and counting fetches, so
/// tests can assert that invalidation actually triggers refetches.
#[derive(Default)]
pub struct FakeDirectory {
    details: Mutex<HashMap<FormId, AlbaDetail>>,
    pages: Mutex<VecDeque<AlbaPage>>,
    my_scraps: Mutex<Vec<AlbaSummary>>,
    my_listings: Mutex<Vec<AlbaSummary>>,
    detail_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl FakeDirectory {
    /// Construct an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the detail served for a form.
    pub fn put_detail(&self, detail: AlbaDetail) {
        self.details
            .lock()
            .expect("details poisoned")
            .insert(detail.id, detail);
    }

    /// Queue a page served by the next `list` call.
    pub fn queue_page(&self, page: AlbaPage) {
        self.pages.lock().expect("pages poisoned").push_back(page);
    }

    /// Replace the `myScraps` aggregate.
    pub fn put_my_scraps(&self, items: Vec<AlbaSummary>) {
        *self.my_scraps.lock().expect("scraps poisoned") = items;
    }

    /// Replace the `myListings` aggregate.
    pub fn put_my_listings(&self, items: Vec<AlbaSummary>) {
        *self.my_listings.lock().expect("listings poisoned") = items;
    }

    /// Number of `detail` fetches observed.
    #[must_use]
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Number of `list` fetches observed.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlbaDirectory for FakeDirectory {
    async fn detail(&self, form_id: FormId) -> BookmarkResult<AlbaDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .expect("details poisoned")
            .get(&form_id)
            .cloned()
            .ok_or(BookmarkError::Backend {
                status: 404,
                message: Some(format!("form {form_id} not found")),
            })
    }

    async fn list(&self, _params: &ListParams) -> BookmarkResult<AlbaPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .expect("pages poisoned")
            .pop_front()
            .ok_or(BookmarkError::Backend {
                status: 404,
                message: Some("no more pages".to_string()),
            })
    }

    async fn my_scraps(&self) -> BookmarkResult<Vec<AlbaSummary>> {
        Ok(self.my_scraps.lock().expect("scraps poisoned").clone())
    }

    async fn my_listings(&self) -> BookmarkResult<Vec<AlbaSummary>> {
        Ok(self.my_listings.lock().expect("listings poisoned").clone())
    }
}

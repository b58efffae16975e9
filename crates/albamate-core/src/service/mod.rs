//! Service traits implemented by remote adapters and consumed by the
//! synchronizer.

use async_trait::async_trait;

use crate::error::BookmarkResult;
use crate::model::{AlbaDetail, AlbaPage, AlbaSummary, FormId, ListParams};

/// Remote scrap mutations.
///
/// `add_scrap` reports a typed conflict when the form is already scrapped by
/// the current actor. `remove_scrap` is idempotent in intent: the backend
/// accepts removal of an already-unscrapped form, and callers do not check
/// defensively.
#[async_trait]
pub trait BookmarkService: Send + Sync {
    /// Scrap a form for the current actor.
    async fn add_scrap(&self, form_id: FormId) -> BookmarkResult<()>;

    /// Remove the current actor's scrap from a form.
    async fn remove_scrap(&self, form_id: FormId) -> BookmarkResult<()>;
}

/// Read access to the listing backend.
#[async_trait]
pub trait AlbaDirectory: Send + Sync {
    /// Fetch the detail view of a single form.
    async fn detail(&self, form_id: FormId) -> BookmarkResult<AlbaDetail>;

    /// Fetch one page of the filtered listing.
    async fn list(&self, params: &ListParams) -> BookmarkResult<AlbaPage>;

    /// Fetch the current actor's scrapped forms.
    async fn my_scraps(&self) -> BookmarkResult<Vec<AlbaSummary>>;

    /// Fetch the current actor's own listings.
    async fn my_listings(&self) -> BookmarkResult<Vec<AlbaSummary>>;
}

/// Seam to the third-party session layer.
///
/// Session internals (token issuance, renewal transport) are out of scope;
/// the synchronizer only needs the three operations below.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Whether the actor currently holds a usable session.
    async fn is_authenticated(&self) -> bool;

    /// Refresh the session ahead of a mutation. Failure is treated as
    /// session expiry by callers.
    async fn refresh(&self) -> BookmarkResult<()>;

    /// Drop the session after a terminal authentication failure.
    async fn sign_out(&self);
}

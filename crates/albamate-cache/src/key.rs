//! Typed cache keys and invalidation patterns.

use albamate_core::{FormId, ListParams};
use serde::{Deserialize, Serialize};

/// Discriminator for one family of paginated list entries.
///
/// Built from the canonical form of [`ListParams`], which excludes the
/// cursor: every page fetched for the same filter set lands under one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListKey(String);

impl ListKey {
    /// Raw canonical form, mainly useful for logging.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ListParams> for ListKey {
    fn from(params: &ListParams) -> Self {
        Self(params.canonical())
    }
}

/// Address of one cached projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Detail view of a single form.
    Detail(FormId),
    /// One family of paginated listing pages.
    List(ListKey),
    /// The current actor's scrapped forms.
    MyScraps,
    /// The current actor's own listings.
    MyListings,
}

impl CacheKey {
    /// Family discriminator used in logs and pattern matching.
    #[must_use]
    pub const fn family(&self) -> &'static str {
        match self {
            Self::Detail(_) => "detail",
            Self::List(_) => "list",
            Self::MyScraps => "myScraps",
            Self::MyListings => "myListings",
        }
    }
}

/// Pattern selecting cache entries for invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    /// Exactly one key.
    Exact(CacheKey),
    /// The detail entry (and any scrap stub) of one form.
    DetailOf(FormId),
    /// Every list entry regardless of filter parameters.
    AllLists,
    /// Both aggregate views (`myScraps` and `myListings`).
    Aggregates,
    /// Every entry in the cache.
    All,
}

impl KeyPattern {
    /// Whether `key` falls under this pattern.
    #[must_use]
    pub fn matches(&self, key: &CacheKey) -> bool {
        match self {
            Self::Exact(exact) => exact == key,
            Self::DetailOf(form_id) => matches!(key, CacheKey::Detail(id) if id == form_id),
            Self::AllLists => matches!(key, CacheKey::List(_)),
            Self::Aggregates => matches!(key, CacheKey::MyScraps | CacheKey::MyListings),
            Self::All => true,
        }
    }
}

//! Core domain types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a job-listing form as assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub i64);

impl std::fmt::Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for FormId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// The `(isScrapped, scrapCount)` pair a cache view holds for one form.
///
/// The remote service is the authoritative source; clients only ever hold a
/// cached projection of this pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScrapSnapshot {
    /// Whether the current actor has scrapped the form.
    pub is_scrapped: bool,
    /// Aggregate scrap count across all actors.
    pub scrap_count: u32,
}

impl ScrapSnapshot {
    /// Convenience constructor.
    #[must_use]
    pub const fn new(is_scrapped: bool, scrap_count: u32) -> Self {
        Self {
            is_scrapped,
            scrap_count,
        }
    }

    /// Apply a scrap-state change with a count delta, clamping the count at
    /// zero. The clamp is the client-side guard for the non-negativity
    /// invariant; the server remains free to disagree on the exact value.
    #[must_use]
    pub fn apply(self, is_scrapped: bool, delta: i32) -> Self {
        let scrap_count = if delta.is_negative() {
            self.scrap_count.saturating_sub(delta.unsigned_abs())
        } else {
            self.scrap_count.saturating_add(delta.unsigned_abs())
        };
        Self {
            is_scrapped,
            scrap_count,
        }
    }
}

/// Sort orders accepted by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OrderBy {
    /// Newest listings first.
    #[default]
    MostRecent,
    /// Highest hourly wage first.
    HighestWage,
    /// Most applications first.
    MostApplied,
    /// Most scraps first.
    MostScrapped,
}

impl OrderBy {
    /// Wire value used in query strings and cache keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MostRecent => "mostRecent",
            Self::HighestWage => "highestWage",
            Self::MostApplied => "mostApplied",
            Self::MostScrapped => "mostScrapped",
        }
    }
}

/// Filter and pagination parameters for the listing endpoint.
///
/// The canonical string form doubles as the list cache-key discriminator, so
/// two parameter sets that would hit the same backend query share one cache
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Page size requested from the backend.
    pub limit: u32,
    /// Cursor of the last item of the previous page, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<i64>,
    /// Sort order.
    #[serde(default)]
    pub order_by: OrderBy,
    /// Free-text search keyword.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Restrict to public listings when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    /// Restrict to listings still recruiting when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recruiting: Option<bool>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: 10,
            cursor: None,
            order_by: OrderBy::default(),
            keyword: None,
            is_public: None,
            is_recruiting: None,
        }
    }
}

impl ListParams {
    /// Canonical key form, independent of the cursor so every page of the
    /// same filter set maps to the same cache entry.
    #[must_use]
    pub fn canonical(&self) -> String {
        let mut key = format!("limit={}&orderBy={}", self.limit, self.order_by.as_str());
        if let Some(keyword) = &self.keyword {
            key.push_str("&keyword=");
            key.push_str(keyword);
        }
        if let Some(is_public) = self.is_public {
            key.push_str(if is_public {
                "&isPublic=true"
            } else {
                "&isPublic=false"
            });
        }
        if let Some(is_recruiting) = self.is_recruiting {
            key.push_str(if is_recruiting {
                "&isRecruiting=true"
            } else {
                "&isRecruiting=false"
            });
        }
        key
    }
}

/// One item of a paginated listing response.
///
/// Guest responses omit the scrap fields entirely, which is why both are
/// optional here; resolution logic must skip items without a concrete
/// `is_scrapped` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbaSummary {
    /// Form identifier.
    pub id: FormId,
    /// Listing title.
    pub title: String,
    /// Workplace location as displayed to applicants.
    pub workplace: String,
    /// Hourly wage in won.
    pub wage: u32,
    /// Recruitment window start.
    pub recruitment_start: DateTime<Utc>,
    /// Recruitment window end.
    pub recruitment_end: DateTime<Utc>,
    /// Whether the listing is publicly visible.
    pub is_public: bool,
    /// Number of applications received.
    pub application_count: u32,
    /// Whether the current actor scrapped this form; absent for guests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_scrapped: Option<bool>,
    /// Aggregate scrap count; absent for guests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrap_count: Option<u32>,
}

impl AlbaSummary {
    /// The scrap pair for this item, when the response included one.
    #[must_use]
    pub fn scrap_snapshot(&self) -> Option<ScrapSnapshot> {
        self.is_scrapped
            .map(|is_scrapped| ScrapSnapshot::new(is_scrapped, self.scrap_count.unwrap_or(0)))
    }
}

/// Detail view of a single form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbaDetail {
    /// Form identifier.
    pub id: FormId,
    /// Identifier of the owner who posted the listing.
    pub owner_id: i64,
    /// Listing title.
    pub title: String,
    /// Full job description.
    pub description: String,
    /// Preferred qualifications, free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred: Option<String>,
    /// Workplace location.
    pub workplace: String,
    /// Hourly wage in won.
    pub wage: u32,
    /// Recruitment window start.
    pub recruitment_start: DateTime<Utc>,
    /// Recruitment window end.
    pub recruitment_end: DateTime<Utc>,
    /// Whether the listing is publicly visible.
    pub is_public: bool,
    /// Number of applications received.
    pub application_count: u32,
    /// Whether the current actor scrapped this form.
    pub is_scrapped: bool,
    /// Aggregate scrap count.
    pub scrap_count: u32,
}

impl AlbaDetail {
    /// The scrap pair currently held by this detail projection.
    #[must_use]
    pub const fn scrap_snapshot(&self) -> ScrapSnapshot {
        ScrapSnapshot::new(self.is_scrapped, self.scrap_count)
    }
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbaPage {
    /// Items on this page.
    pub items: Vec<AlbaSummary>,
    /// Cursor for the next page; `None` when exhausted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<i64>,
}

//! Sample domain values for unit tests.

use albamate_core::{AlbaDetail, AlbaPage, AlbaSummary, FormId};
use chrono::{TimeZone, Utc};

/// A detail document with the given scrap pair and otherwise fixed fields.
#[must_use]
pub fn detail(id: i64, is_scrapped: bool, scrap_count: u32) -> AlbaDetail {
    AlbaDetail {
        id: FormId(id),
        owner_id: 1_000,
        title: format!("Listing {id}"),
        description: "Weekend shift, flexible hours.".to_string(),
        preferred: None,
        workplace: "Mapo-gu".to_string(),
        wage: 11_000,
        recruitment_start: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        recruitment_end: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        is_public: true,
        application_count: 4,
        is_scrapped,
        scrap_count,
    }
}

/// A list item with the given scrap pair.
#[must_use]
pub fn summary(id: i64, is_scrapped: bool, scrap_count: u32) -> AlbaSummary {
    AlbaSummary {
        id: FormId(id),
        title: format!("Listing {id}"),
        workplace: "Mapo-gu".to_string(),
        wage: 11_000,
        recruitment_start: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        recruitment_end: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        is_public: true,
        application_count: 4,
        is_scrapped: Some(is_scrapped),
        scrap_count: Some(scrap_count),
    }
}

/// A list item as served to guests, with no scrap fields at all.
#[must_use]
pub fn guest_summary(id: i64) -> AlbaSummary {
    AlbaSummary {
        is_scrapped: None,
        scrap_count: None,
        ..summary(id, false, 0)
    }
}

/// A terminal page holding the given `(id, is_scrapped, scrap_count)` items.
#[must_use]
pub fn page(items: &[(i64, bool, u32)]) -> AlbaPage {
    page_with_cursor(items, None)
}

/// A page with an explicit next cursor.
#[must_use]
pub fn page_with_cursor(items: &[(i64, bool, u32)], next_cursor: Option<i64>) -> AlbaPage {
    AlbaPage {
        items: items
            .iter()
            .map(|&(id, is_scrapped, scrap_count)| summary(id, is_scrapped, scrap_count))
            .collect(),
        next_cursor,
    }
}

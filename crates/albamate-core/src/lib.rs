//! Backend-agnostic domain types and service contracts for the Albamate
//! scrap synchronizer.

pub mod error;
pub mod model;
pub mod service;

pub use error::{BookmarkError, BookmarkResult};
pub use model::{
    AlbaDetail, AlbaPage, AlbaSummary, FormId, ListParams, OrderBy, ScrapSnapshot,
};
pub use service::{AlbaDirectory, BookmarkService, SessionProvider};

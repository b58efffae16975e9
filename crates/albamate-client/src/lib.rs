#![forbid(unsafe_code)]

//! HTTP adapter for the Albamate REST backend.
//!
//! Layout: `config.rs` (client configuration), `rest.rs` (the reqwest-backed
//! [`albamate_core::BookmarkService`] / [`albamate_core::AlbaDirectory`]
//! implementation), `session.rs` (a token-holding
//! [`albamate_core::SessionProvider`]).
//!
//! Wire-level error classification lives entirely in this crate: status
//! codes and error bodies are mapped into the typed
//! [`albamate_core::BookmarkError`] kinds, and layers above never see
//! response text.

pub mod config;
pub mod rest;
pub mod session;

pub use config::ClientConfig;
pub use rest::RestClient;
pub use session::StaticSession;

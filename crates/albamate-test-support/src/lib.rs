#![forbid(unsafe_code)]

//! Shared test helpers used across unit suites.
//! Layout: fixtures.rs (sample domain values), mocks.rs (fake services with
//! scripted outcomes and call counters).

pub mod fixtures;
pub mod mocks;

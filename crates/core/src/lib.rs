//! Domain logic for grail progress tracking.
//!
//! This crate has no database dependencies. Everything here operates on
//! plain values loaded by the caller, so it can be unit tested without a
//! running Postgres instance.

pub mod achievements;
pub mod api_keys;
pub mod catalog;
pub mod error;
pub mod grail;
pub mod hashing;
pub mod progress;
pub mod statistics;
pub mod types;

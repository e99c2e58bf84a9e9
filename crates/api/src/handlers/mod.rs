//! Request handlers.
//!
//! Handlers extract the caller, delegate to the engines or to the
//! repositories in `grail_db`, and map errors via [`crate::error::AppError`].

pub mod achievements;
pub mod progress;
pub mod statistics;
pub mod user;

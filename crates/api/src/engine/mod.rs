//! Sync and achievement engines.
//!
//! [`sync`] reconciles a client snapshot into the user's stored progress
//! inside one transaction. [`achievements`] then evaluates the achievement
//! catalog against the committed snapshot.

pub mod achievements;
pub mod sync;

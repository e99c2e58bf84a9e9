//! Row models and DTOs, one module per table group.

pub mod achievement;
pub mod progress;
pub mod statistics;
pub mod sync_log;
pub mod user;

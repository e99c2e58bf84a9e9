//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads
//! accept any Postgres executor so they work both on the pool and inside a
//! transaction; writes that belong to the sync transaction take
//! `&mut PgConnection`.

pub mod achievement_repo;
pub mod progress_repo;
pub mod statistics_repo;
pub mod sync_log_repo;
pub mod user_repo;

pub use achievement_repo::AchievementRepo;
pub use progress_repo::ProgressRepo;
pub use statistics_repo::StatisticsRepo;
pub use sync_log_repo::SyncLogRepo;
pub use user_repo::UserRepo;

//! City Votes Tools Library
//!
//! Batch utilities around the city-voting application: stable city ids,
//! vote file snapshots, the JSON to SQLite vote migration and a synthetic
//! vote traffic generator.

pub mod backup;
pub mod city_ids;
pub mod config;
pub mod generator;
pub mod logging;
pub mod sqlite_persistence;
pub mod votes;

// Re-export commonly used types for convenience
pub use backup::{BackupManager, RestoreOutcome, SnapshotReport, VoteFileKind};
pub use city_ids::{assign_city_ids_in_file, derive_city_id, CityIdError};
pub use config::{AppConfig, CliConfig, FileConfig};
pub use generator::{HttpVoteSubmitter, VoteGenerator, VoteSubmitter};
pub use votes::{migrate, MigrationError, MigrationReport, SqliteVoteStore};

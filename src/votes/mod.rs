mod migration;
mod models;
mod schema;
mod sqlite_vote_store;

pub use migration::{
    load_sources, migrate, run_migration, MigrationError, MigrationReport, MigrationSettings,
};
pub use models::*;
pub use schema::{CITY_VOTES_TABLE, USER_VOTES_TABLE, VOTES_SCHEMA};
pub use sqlite_vote_store::{ImportStats, SqliteVoteStore};

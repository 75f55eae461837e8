//! One-way migration of the JSON vote files into the SQLite vote database.

use super::models::{AggregateVotes, UserVoteSets, VoteSources, VoteStoreCounts};
use super::sqlite_vote_store::{ImportStats, SqliteVoteStore};
use crate::backup::{BackupManager, SnapshotReport, VoteFileKind};
use crate::config::AppConfig;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("{kind} source file not found: {path:?}")]
    MissingSource { kind: VoteFileKind, path: PathBuf },

    #[error("Failed to read {kind} source file {path:?}: {source}")]
    UnreadableSource {
        kind: VoteFileKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {kind} source file {path:?}: {source}")]
    MalformedSource {
        kind: VoteFileKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Migration failed, no changes were kept: {0:#}")]
    Database(anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub votes_file: PathBuf,
    pub user_votes_file: PathBuf,
    pub db_path: PathBuf,
    pub placeholder_vote_type: String,
}

impl From<&AppConfig> for MigrationSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            votes_file: config.votes_file.clone(),
            user_votes_file: config.user_votes_file.clone(),
            db_path: config.db_path.clone(),
            placeholder_vote_type: config.placeholder_vote_type.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub cities_in_source: usize,
    pub users_in_source: usize,
    pub import: ImportStats,
    pub placeholder_vote_type: String,
    pub counts: VoteStoreCounts,
    pub snapshot: Option<SnapshotReport>,
}

impl MigrationReport {
    pub fn log(&self) {
        info!("Cities migrated: {}", self.import.city_votes_upserted);
        info!("User votes migrated: {}", self.import.user_votes_upserted);
        if self.import.unresolved_user_votes > 0 {
            warn!(
                "User votes skipped (city has no aggregate counts): {}",
                self.import.unresolved_user_votes
            );
        }
        info!("");
        info!("Database contains:");
        info!("  {} cities", self.counts.city_rows);
        info!("  {} users", self.counts.distinct_users);
        info!("  {} user votes", self.counts.user_vote_rows);
    }
}

/// Snapshots the live files into the migration backup directory, then migrates.
/// A failed snapshot is logged and doesn't prevent the migration.
pub fn migrate(config: &AppConfig) -> Result<MigrationReport, MigrationError> {
    let backup = BackupManager::new(
        &config.votes_file,
        &config.user_votes_file,
        &config.migration_backup_dir,
    );
    info!("Creating snapshots of the JSON vote files...");
    let snapshot = backup.snapshot();
    snapshot.log();

    let mut report = run_migration(&MigrationSettings::from(config))?;
    report.snapshot = Some(snapshot);
    Ok(report)
}

/// Loads both sources and imports them in a single transaction.
///
/// Both files are read and parsed before the database is opened, so a missing
/// or malformed source leaves the database untouched (not even created).
pub fn run_migration(settings: &MigrationSettings) -> Result<MigrationReport, MigrationError> {
    let sources = load_sources(&settings.votes_file, &settings.user_votes_file)?;
    info!("Found cities with votes: {}", sources.votes.len());
    info!("Found users with votes: {}", sources.user_votes.len());

    warn!(
        "The JSON sources don't record which choice a user made, every migrated user vote gets vote_type '{}'",
        settings.placeholder_vote_type
    );

    let mut store = SqliteVoteStore::open(&settings.db_path).map_err(MigrationError::Database)?;
    let import = store
        .import(&sources, &settings.placeholder_vote_type)
        .map_err(MigrationError::Database)?;
    let counts = store.counts().map_err(MigrationError::Database)?;

    Ok(MigrationReport {
        cities_in_source: sources.votes.len(),
        users_in_source: sources.user_votes.len(),
        import,
        placeholder_vote_type: settings.placeholder_vote_type.clone(),
        counts,
        snapshot: None,
    })
}

pub fn load_sources(votes_file: &Path, user_votes_file: &Path) -> Result<VoteSources, MigrationError> {
    // Existence of both is checked before parsing either
    for (kind, path) in [
        (VoteFileKind::Votes, votes_file),
        (VoteFileKind::UserVotes, user_votes_file),
    ] {
        if !path.exists() {
            return Err(MigrationError::MissingSource {
                kind,
                path: path.to_path_buf(),
            });
        }
    }

    let votes: AggregateVotes = read_json(VoteFileKind::Votes, votes_file)?;
    let user_votes: UserVoteSets = read_json(VoteFileKind::UserVotes, user_votes_file)?;
    Ok(VoteSources { votes, user_votes })
}

fn read_json<T: DeserializeOwned>(kind: VoteFileKind, path: &Path) -> Result<T, MigrationError> {
    let content =
        std::fs::read_to_string(path).map_err(|source| MigrationError::UnreadableSource {
            kind,
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| MigrationError::MalformedSource {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

//! Timestamped snapshots of the live vote files.
//!
//! A snapshot copies `votes.json` and `user_votes.json` into a backup directory
//! as `<kind>_<YYYYMMDD_HHMMSS>.json`. Restoring picks the greatest timestamp
//! of each kind and copies it back over the live file.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The two live files the voting backend keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteFileKind {
    /// Aggregate counts per cityId.
    Votes,
    /// The cityIds each user voted on.
    UserVotes,
}

impl VoteFileKind {
    pub const ALL: [VoteFileKind; 2] = [VoteFileKind::Votes, VoteFileKind::UserVotes];

    pub fn prefix(&self) -> &'static str {
        match self {
            VoteFileKind::Votes => "votes",
            VoteFileKind::UserVotes => "user_votes",
        }
    }

    pub fn snapshot_file_name(&self, timestamp: &NaiveDateTime) -> String {
        format!(
            "{}_{}.json",
            self.prefix(),
            timestamp.format(SNAPSHOT_TIMESTAMP_FORMAT)
        )
    }

    /// Returns the timestamp encoded in `file_name` if it is a snapshot of this kind.
    pub fn parse_snapshot_name(&self, file_name: &str) -> Option<NaiveDateTime> {
        let stamp = file_name
            .strip_prefix(self.prefix())?
            .strip_prefix('_')?
            .strip_suffix(".json")?;
        // chrono accepts non-padded fields, the name must be the exact fixed width
        if stamp.len() != 15 {
            return None;
        }
        NaiveDateTime::parse_from_str(stamp, SNAPSHOT_TIMESTAMP_FORMAT).ok()
    }

    fn entries_label(&self) -> &'static str {
        match self {
            VoteFileKind::Votes => "Cities with votes",
            VoteFileKind::UserVotes => "Users with votes",
        }
    }
}

impl fmt::Display for VoteFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotResult {
    Copied {
        destination: PathBuf,
        /// Top-level entries of the copied JSON document, None if it didn't parse.
        entries: Option<usize>,
    },
    Missing,
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct FileSnapshot {
    pub kind: VoteFileKind,
    pub source: PathBuf,
    pub result: SnapshotResult,
}

#[derive(Debug, Clone)]
pub struct SnapshotReport {
    pub timestamp: NaiveDateTime,
    pub backup_dir: PathBuf,
    pub files: Vec<FileSnapshot>,
}

impl SnapshotReport {
    /// Destination of the snapshot of `kind`, if that copy succeeded.
    pub fn path_for(&self, kind: VoteFileKind) -> Option<&Path> {
        self.files
            .iter()
            .find(|file| file.kind == kind)
            .and_then(|file| match &file.result {
                SnapshotResult::Copied { destination, .. } => Some(destination.as_path()),
                _ => None,
            })
    }

    pub fn copied_count(&self) -> usize {
        self.files
            .iter()
            .filter(|file| matches!(file.result, SnapshotResult::Copied { .. }))
            .count()
    }

    pub fn log(&self) {
        for file in &self.files {
            match &file.result {
                SnapshotResult::Copied {
                    destination,
                    entries,
                } => {
                    info!("Copied {:?} -> {:?}", file.source, destination);
                    if let Some(entries) = entries {
                        info!("  {}: {}", file.kind.entries_label(), entries);
                    }
                }
                SnapshotResult::Missing => warn!("File not found: {:?}", file.source),
                SnapshotResult::Failed { reason } => {
                    error!("Failed to copy {:?}: {}", file.source, reason)
                }
            }
        }
        info!("Snapshots saved in {:?}", self.backup_dir);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    Restored { votes: PathBuf, user_votes: PathBuf },
    NotFound { reason: String },
}

pub struct BackupManager {
    votes_file: PathBuf,
    user_votes_file: PathBuf,
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(
        votes_file: impl Into<PathBuf>,
        user_votes_file: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            votes_file: votes_file.into(),
            user_votes_file: user_votes_file.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn live_path(&self, kind: VoteFileKind) -> &Path {
        match kind {
            VoteFileKind::Votes => &self.votes_file,
            VoteFileKind::UserVotes => &self.user_votes_file,
        }
    }

    /// Snapshots both live files using the current local time.
    pub fn snapshot(&self) -> SnapshotReport {
        self.snapshot_at(Local::now().naive_local())
    }

    /// Snapshots both live files. A missing or uncopyable file is recorded in
    /// the report and doesn't stop the other one from being copied.
    pub fn snapshot_at(&self, timestamp: NaiveDateTime) -> SnapshotReport {
        let dir_error = fs::create_dir_all(&self.backup_dir)
            .err()
            .map(|e| format!("Cannot create backup directory {:?}: {}", self.backup_dir, e));

        let files = VoteFileKind::ALL
            .iter()
            .map(|&kind| {
                let source = self.live_path(kind).to_path_buf();
                let result = match &dir_error {
                    _ if !source.exists() => SnapshotResult::Missing,
                    Some(reason) => SnapshotResult::Failed {
                        reason: reason.clone(),
                    },
                    None => {
                        let destination =
                            self.backup_dir.join(kind.snapshot_file_name(&timestamp));
                        match fs::copy(&source, &destination) {
                            Ok(_) => SnapshotResult::Copied {
                                entries: count_entries(&destination),
                                destination,
                            },
                            Err(e) => SnapshotResult::Failed {
                                reason: e.to_string(),
                            },
                        }
                    }
                };
                FileSnapshot {
                    kind,
                    source,
                    result,
                }
            })
            .collect();

        SnapshotReport {
            timestamp,
            backup_dir: self.backup_dir.clone(),
            files,
        }
    }

    /// Finds the snapshot of `kind` with the greatest timestamp.
    pub fn latest_snapshot(&self, kind: VoteFileKind) -> Result<Option<PathBuf>> {
        if !self.backup_dir.is_dir() {
            return Ok(None);
        }
        let entries = fs::read_dir(&self.backup_dir)
            .with_context(|| format!("Failed to list backup directory {:?}", self.backup_dir))?;

        let mut latest: Option<(NaiveDateTime, PathBuf)> = None;
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(timestamp) = file_name
                .to_str()
                .and_then(|name| kind.parse_snapshot_name(name))
            else {
                continue;
            };
            if latest.as_ref().map_or(true, |(best, _)| timestamp > *best) {
                latest = Some((timestamp, entry.path()));
            }
        }
        Ok(latest.map(|(_, path)| path))
    }

    /// Copies the latest snapshot of each kind back over the live files.
    /// Nothing is restored unless both kinds have a snapshot.
    pub fn restore_latest(&self) -> Result<RestoreOutcome> {
        if !self.backup_dir.is_dir() {
            return Ok(RestoreOutcome::NotFound {
                reason: format!("Backup directory {:?} not found", self.backup_dir),
            });
        }

        let (Some(votes), Some(user_votes)) = (
            self.latest_snapshot(VoteFileKind::Votes)?,
            self.latest_snapshot(VoteFileKind::UserVotes)?,
        ) else {
            return Ok(RestoreOutcome::NotFound {
                reason: format!("No snapshots found in {:?}", self.backup_dir),
            });
        };

        for (kind, snapshot) in [
            (VoteFileKind::Votes, &votes),
            (VoteFileKind::UserVotes, &user_votes),
        ] {
            let live = self.live_path(kind);
            if let Some(parent) = live.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
            fs::copy(snapshot, live)
                .with_context(|| format!("Failed to restore {:?} to {:?}", snapshot, live))?;
        }

        Ok(RestoreOutcome::Restored { votes, user_votes })
    }
}

fn count_entries(path: &Path) -> Option<usize> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<serde_json::Value>(&content).ok()? {
        serde_json::Value::Object(map) => Some(map.len()),
        serde_json::Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

use super::models::{CityVotesRow, UserVoteRow, VoteSources, VoteStoreCounts};
use super::schema::{UPSERT_CITY_VOTES_SQL, UPSERT_USER_VOTE_SQL, VOTES_SCHEMA};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

/// What a single import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub city_votes_upserted: usize,
    pub user_votes_upserted: usize,
    /// User votes pointing at a cityId that has no aggregate counts.
    pub unresolved_user_votes: usize,
}

pub struct SqliteVoteStore {
    conn: Connection,
}

impl SqliteVoteStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        info!("Opening vote database at {:?}", path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open vote database {:?}", path))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Creates the schema if needed and upserts every source record, all in one
    /// transaction. On error nothing from this call is kept.
    pub fn import(&mut self, sources: &VoteSources, vote_type: &str) -> Result<ImportStats> {
        let tx = self.conn.transaction()?;

        VOTES_SCHEMA
            .create_if_absent(&tx)
            .context("Failed to create vote tables")?;
        VOTES_SCHEMA
            .validate(&tx)
            .context("Vote database has an incompatible schema")?;

        let mut stats = ImportStats::default();
        {
            let mut upsert_city = tx.prepare(UPSERT_CITY_VOTES_SQL)?;
            for (city_id, counts) in &sources.votes {
                upsert_city
                    .execute(params![
                        city_id,
                        counts.likes,
                        counts.dislikes,
                        counts.dont_know
                    ])
                    .with_context(|| format!("Failed to upsert votes of {}", city_id))?;
                stats.city_votes_upserted += 1;
            }

            let mut upsert_user_vote = tx.prepare(UPSERT_USER_VOTE_SQL)?;
            for (user_id, city_ids) in &sources.user_votes {
                for city_id in city_ids {
                    if !sources.is_resolvable(city_id) {
                        debug!(
                            "Skipping vote of {} for unknown city {}",
                            user_id, city_id
                        );
                        stats.unresolved_user_votes += 1;
                        continue;
                    }
                    upsert_user_vote
                        .execute(params![user_id, city_id, vote_type])
                        .with_context(|| {
                            format!("Failed to upsert vote of {} for {}", user_id, city_id)
                        })?;
                    stats.user_votes_upserted += 1;
                }
            }
        }

        tx.commit()?;
        Ok(stats)
    }

    pub fn counts(&self) -> Result<VoteStoreCounts> {
        let count = |sql: &str| -> Result<usize> {
            let value: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(value as usize)
        };
        Ok(VoteStoreCounts {
            city_rows: count("SELECT COUNT(*) FROM city_votes")?,
            distinct_users: count("SELECT COUNT(DISTINCT user_id) FROM user_votes")?,
            user_vote_rows: count("SELECT COUNT(*) FROM user_votes")?,
        })
    }

    pub fn get_city_votes(&self, city_id: &str) -> Result<Option<CityVotesRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT city_id, likes, dislikes, dont_know FROM city_votes WHERE city_id = ?1",
                params![city_id],
                |row| {
                    Ok(CityVotesRow {
                        city_id: row.get(0)?,
                        likes: row.get(1)?,
                        dislikes: row.get(2)?,
                        dont_know: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_city_votes(&self) -> Result<Vec<CityVotesRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT city_id, likes, dislikes, dont_know FROM city_votes ORDER BY city_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CityVotesRow {
                    city_id: row.get(0)?,
                    likes: row.get(1)?,
                    dislikes: row.get(2)?,
                    dont_know: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All user votes ordered by (user_id, city_id).
    pub fn list_user_votes(&self) -> Result<Vec<UserVoteRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, city_id, vote_type FROM user_votes ORDER BY user_id, city_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(UserVoteRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    city_id: row.get(2)?,
                    vote_type: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

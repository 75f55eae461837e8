//! SQLite schema of the vote database.
//!
//! `city_votes` holds one row of aggregate counters per city, `user_votes` at
//! most one vote per (user, city) pair.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, Schema, SqlType, Table, CURRENT_TIMESTAMP};

pub const CITY_VOTES_TABLE: Table = Table {
    name: "city_votes",
    columns: &[
        sqlite_column!("city_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("likes", &SqlType::Integer, default_value = Some("0")),
        sqlite_column!("dislikes", &SqlType::Integer, default_value = Some("0")),
        sqlite_column!("dont_know", &SqlType::Integer, default_value = Some("0")),
        sqlite_column!(
            "created_at",
            &SqlType::Datetime,
            default_value = Some(CURRENT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Datetime,
            default_value = Some(CURRENT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

pub const USER_VOTES_TABLE: Table = Table {
    name: "user_votes",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!("city_id", &SqlType::Text, non_null = true),
        sqlite_column!("vote_type", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Datetime,
            default_value = Some(CURRENT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_user_votes_user_id", "user_id"),
        ("idx_user_votes_city_id", "city_id"),
    ],
    unique_constraints: &[&["user_id", "city_id"]],
};

pub const VOTES_SCHEMA: Schema = Schema {
    tables: &[CITY_VOTES_TABLE, USER_VOTES_TABLE],
};

/// Last write wins on the counters, `created_at` survives re-runs.
pub const UPSERT_CITY_VOTES_SQL: &str = "INSERT INTO city_votes (city_id, likes, dislikes, dont_know)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT(city_id) DO UPDATE SET
        likes = excluded.likes,
        dislikes = excluded.dislikes,
        dont_know = excluded.dont_know,
        updated_at = CURRENT_TIMESTAMP";

/// Keeps the row id of an existing (user_id, city_id) vote.
pub const UPSERT_USER_VOTE_SQL: &str = "INSERT INTO user_votes (user_id, city_id, vote_type)
     VALUES (?1, ?2, ?3)
     ON CONFLICT(user_id, city_id) DO UPDATE SET vote_type = excluded.vote_type";

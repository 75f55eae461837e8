use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vote categories accepted by the vote-submission endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Liked,
    Disliked,
    DontKnow,
}

impl VoteType {
    /// Same order as the generator weights: like, dislike, dont_know.
    pub const ALL: [VoteType; 3] = [VoteType::Liked, VoteType::Disliked, VoteType::DontKnow];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Liked => "liked",
            VoteType::Disliked => "disliked",
            VoteType::DontKnow => "dont_know",
        }
    }
}

/// Aggregate counters for one city as stored in `votes.json`.
/// Missing counters read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateCounts {
    pub likes: i64,
    pub dislikes: i64,
    pub dont_know: i64,
}

/// `votes.json`: cityId -> counters.
pub type AggregateVotes = BTreeMap<String, AggregateCounts>;

/// `user_votes.json`: user id -> cityIds the user voted on, without the choice made.
pub type UserVoteSets = BTreeMap<String, Vec<String>>;

/// Both JSON sources of a migration, parsed.
#[derive(Debug, Clone, Default)]
pub struct VoteSources {
    pub votes: AggregateVotes,
    pub user_votes: UserVoteSets,
}

impl VoteSources {
    /// A user vote can only be migrated if its city has aggregate counts.
    pub fn is_resolvable(&self, city_id: &str) -> bool {
        self.votes.contains_key(city_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityVotesRow {
    pub city_id: String,
    pub likes: i64,
    pub dislikes: i64,
    pub dont_know: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserVoteRow {
    pub id: i64,
    pub user_id: String,
    pub city_id: String,
    pub vote_type: String,
}

/// Row counts reported after a migration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteStoreCounts {
    pub city_rows: usize,
    pub distinct_users: usize,
    pub user_vote_rows: usize,
}

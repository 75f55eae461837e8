//! Shared constants for end-to-end tests

// ============================================================================
// Sample cities
// ============================================================================

pub const PARIS_ID: &str = "city_paris_7798";

pub const LYON_ID: &str = "city_lyon_0042";

/// Referenced by a user vote but absent from votes.json
pub const UNKNOWN_CITY_ID: &str = "city_unknown_0000";

// ============================================================================
// Sample users
// ============================================================================

pub const USER_A: &str = "user-a";

pub const USER_B: &str = "user-b";

// ============================================================================
// Sample files
// ============================================================================

pub const SAMPLE_VOTES_JSON: &str = r#"{
  "city_paris_7798": {"likes": 5, "dislikes": 2, "dont_know": 1},
  "city_lyon_0042": {"likes": 0, "dislikes": 3, "dont_know": 0}
}"#;

pub const SAMPLE_USER_VOTES_JSON: &str = r#"{
  "user-a": ["city_paris_7798", "city_lyon_0042"],
  "user-b": ["city_paris_7798"]
}"#;

pub const SAMPLE_CITIES_JSON: &str = r#"[
  {"name": "Paris", "country": "France", "population": 2102650},
  {"name": "Saint-Denis", "country": "France"},
  {"name": "Москва", "country": "Russia"}
]"#;

//! End-to-end tests for the JSON to SQLite vote migration
//!
//! Every test runs against real files in a temporary workspace.

mod common;

use city_votes_tools::migrate;
use city_votes_tools::votes::{
    run_migration, CityVotesRow, MigrationError, SqliteVoteStore, VOTES_SCHEMA,
};
use common::{TestWorkspace, LYON_ID, PARIS_ID, UNKNOWN_CITY_ID, USER_A, USER_B};
use rusqlite::Connection;

fn city(city_id: &str, likes: i64, dislikes: i64, dont_know: i64) -> CityVotesRow {
    CityVotesRow {
        city_id: city_id.to_string(),
        likes,
        dislikes,
        dont_know,
    }
}

// =============================================================================
// Happy path
// =============================================================================

#[test]
fn test_migrate_writes_aggregates_and_user_votes() {
    let workspace = TestWorkspace::with_sample_votes();

    let report = migrate(&workspace.config).unwrap();

    assert_eq!(report.cities_in_source, 2);
    assert_eq!(report.users_in_source, 2);
    assert_eq!(report.import.city_votes_upserted, 2);
    assert_eq!(report.import.user_votes_upserted, 3);
    assert_eq!(report.import.unresolved_user_votes, 0);
    assert_eq!(report.counts.city_rows, 2);
    assert_eq!(report.counts.distinct_users, 2);
    assert_eq!(report.counts.user_vote_rows, 3);

    let store = SqliteVoteStore::open(workspace.db_path()).unwrap();
    assert_eq!(
        store.list_city_votes().unwrap(),
        vec![city(LYON_ID, 0, 3, 0), city(PARIS_ID, 5, 2, 1)]
    );

    let user_votes = store.list_user_votes().unwrap();
    let pairs: Vec<(&str, &str)> = user_votes
        .iter()
        .map(|v| (v.user_id.as_str(), v.city_id.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![(USER_A, LYON_ID), (USER_A, PARIS_ID), (USER_B, PARIS_ID)]
    );
    assert!(user_votes.iter().all(|v| v.vote_type == "like"));
}

#[test]
fn test_single_city_single_user() {
    let workspace = TestWorkspace::new();
    workspace.write_votes(r#"{"city_paris_7798": {"likes": 5, "dislikes": 2, "dont_know": 1}}"#);
    workspace.write_user_votes(r#"{"u1": ["city_paris_7798"]}"#);

    let report = run_migration(&workspace.migration_settings()).unwrap();

    assert_eq!(report.counts.city_rows, 1);
    assert_eq!(report.counts.distinct_users, 1);
    assert_eq!(report.counts.user_vote_rows, 1);

    let store = SqliteVoteStore::open(workspace.db_path()).unwrap();
    assert_eq!(
        store.get_city_votes(PARIS_ID).unwrap(),
        Some(city(PARIS_ID, 5, 2, 1))
    );
}

#[test]
fn test_missing_counters_default_to_zero() {
    let workspace = TestWorkspace::new();
    workspace.write_votes(r#"{"city_lyon_0042": {"likes": 4}}"#);
    workspace.write_user_votes("{}");

    run_migration(&workspace.migration_settings()).unwrap();

    let store = SqliteVoteStore::open(workspace.db_path()).unwrap();
    assert_eq!(
        store.get_city_votes(LYON_ID).unwrap(),
        Some(city(LYON_ID, 4, 0, 0))
    );
}

#[test]
fn test_user_vote_for_unknown_city_is_skipped() {
    let workspace = TestWorkspace::new();
    workspace.write_votes(r#"{"city_paris_7798": {"likes": 1, "dislikes": 0, "dont_know": 0}}"#);
    workspace.write_user_votes(&format!(
        r#"{{"{}": ["{}", "{}"]}}"#,
        USER_A, PARIS_ID, UNKNOWN_CITY_ID
    ));

    let report = run_migration(&workspace.migration_settings()).unwrap();

    assert_eq!(report.import.user_votes_upserted, 1);
    assert_eq!(report.import.unresolved_user_votes, 1);
    assert_eq!(report.counts.user_vote_rows, 1);

    let store = SqliteVoteStore::open(workspace.db_path()).unwrap();
    assert!(store
        .list_user_votes()
        .unwrap()
        .iter()
        .all(|v| v.city_id != UNKNOWN_CITY_ID));
}

#[test]
fn test_configured_placeholder_vote_type() {
    let workspace = TestWorkspace::with_sample_votes();
    let mut settings = workspace.migration_settings();
    settings.placeholder_vote_type = "liked".to_string();

    let report = run_migration(&settings).unwrap();
    assert_eq!(report.placeholder_vote_type, "liked");

    let store = SqliteVoteStore::open(workspace.db_path()).unwrap();
    assert!(store
        .list_user_votes()
        .unwrap()
        .iter()
        .all(|v| v.vote_type == "liked"));
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_rerun_converges_to_latest_sources() {
    let workspace = TestWorkspace::with_sample_votes();
    run_migration(&workspace.migration_settings()).unwrap();
    let first_ids: Vec<i64> = SqliteVoteStore::open(workspace.db_path())
        .unwrap()
        .list_user_votes()
        .unwrap()
        .iter()
        .map(|v| v.id)
        .collect();

    workspace.write_votes(
        r#"{
          "city_paris_7798": {"likes": 9, "dislikes": 2, "dont_know": 1},
          "city_lyon_0042": {"likes": 0, "dislikes": 3, "dont_know": 0}
        }"#,
    );
    let report = run_migration(&workspace.migration_settings()).unwrap();

    assert_eq!(report.counts.city_rows, 2);
    assert_eq!(report.counts.user_vote_rows, 3);

    let store = SqliteVoteStore::open(workspace.db_path()).unwrap();
    assert_eq!(
        store.get_city_votes(PARIS_ID).unwrap(),
        Some(city(PARIS_ID, 9, 2, 1))
    );
    let second_ids: Vec<i64> = store.list_user_votes().unwrap().iter().map(|v| v.id).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn test_duplicate_city_in_user_list_stored_once() {
    let workspace = TestWorkspace::new();
    workspace.write_votes(r#"{"city_paris_7798": {"likes": 1, "dislikes": 0, "dont_know": 0}}"#);
    workspace.write_user_votes(r#"{"u1": ["city_paris_7798", "city_paris_7798"]}"#);

    let report = run_migration(&workspace.migration_settings()).unwrap();

    assert_eq!(report.counts.user_vote_rows, 1);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_source_aborts_before_database_is_created() {
    let workspace = TestWorkspace::new();
    workspace.write_votes(r#"{"city_paris_7798": {"likes": 1, "dislikes": 0, "dont_know": 0}}"#);

    let result = migrate(&workspace.config);

    assert!(matches!(result, Err(MigrationError::MissingSource { .. })));
    assert!(!workspace.db_path().exists());
}

#[test]
fn test_malformed_source_leaves_existing_database_untouched() {
    let workspace = TestWorkspace::with_sample_votes();
    run_migration(&workspace.migration_settings()).unwrap();

    workspace.write_votes("{ not json");
    let result = run_migration(&workspace.migration_settings());

    assert!(matches!(result, Err(MigrationError::MalformedSource { .. })));
    let store = SqliteVoteStore::open(workspace.db_path()).unwrap();
    assert_eq!(store.counts().unwrap().city_rows, 2);
}

#[test]
fn test_failed_import_keeps_no_partial_writes() {
    let workspace = TestWorkspace::with_sample_votes();
    {
        let conn = Connection::open(workspace.db_path()).unwrap();
        VOTES_SCHEMA.create_if_absent(&conn).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_lyon BEFORE INSERT ON user_votes
             WHEN NEW.city_id = 'city_lyon_0042'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();
    }

    let result = run_migration(&workspace.migration_settings());

    assert!(matches!(result, Err(MigrationError::Database(_))));
    let counts = SqliteVoteStore::open(workspace.db_path())
        .unwrap()
        .counts()
        .unwrap();
    assert_eq!(counts.city_rows, 0);
    assert_eq!(counts.user_vote_rows, 0);
}

#[test]
fn test_incompatible_existing_table_is_reported() {
    let workspace = TestWorkspace::with_sample_votes();
    {
        let conn = Connection::open(workspace.db_path()).unwrap();
        conn.execute_batch("CREATE TABLE city_votes (city_id TEXT PRIMARY KEY, score REAL);")
            .unwrap();
    }

    let result = run_migration(&workspace.migration_settings());

    let Err(MigrationError::Database(error)) = result else {
        panic!("Expected a database error");
    };
    assert!(format!("{:#}", error).contains("likes"));
}

// =============================================================================
// Snapshots taken by migrate
// =============================================================================

#[test]
fn test_migrate_snapshots_sources_first() {
    let workspace = TestWorkspace::with_sample_votes();

    let report = migrate(&workspace.config).unwrap();

    let snapshot = report.snapshot.expect("migrate always snapshots");
    assert_eq!(snapshot.copied_count(), 2);
    let names = workspace.list_dir(&workspace.config.migration_backup_dir);
    assert_eq!(names.len(), 2);
    assert!(names.iter().any(|n| n.starts_with("votes_")));
    assert!(names.iter().any(|n| n.starts_with("user_votes_")));
    // The regular backup directory is left alone
    assert!(workspace.list_dir(&workspace.config.backup_dir).is_empty());
}

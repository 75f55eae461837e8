//! Temporary workspaces with vote files on disk

use city_votes_tools::config::{AppConfig, CliConfig};
use city_votes_tools::votes::MigrationSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::constants::{SAMPLE_CITIES_JSON, SAMPLE_USER_VOTES_JSON, SAMPLE_VOTES_JSON};

pub struct TestWorkspace {
    pub config: AppConfig,
    // Keeps the directory alive for the duration of the test
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// An empty workspace, no vote file exists yet.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();

        let cli = CliConfig {
            cities_file: Some(root.join("cities.json")),
            votes_file: Some(root.join("backend").join("votes.json")),
            user_votes_file: Some(root.join("backend").join("user_votes.json")),
            db_path: Some(root.join("backend").join("votes.db")),
            backup_dir: Some(root.join("vote_backups")),
            migration_backup_dir: Some(root.join("json_backups")),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, None).expect("Failed to resolve config");

        Self {
            config,
            _temp_dir: temp_dir,
        }
    }

    /// A workspace with the sample votes.json and user_votes.json written.
    pub fn with_sample_votes() -> Self {
        let workspace = Self::new();
        workspace.write_votes(SAMPLE_VOTES_JSON);
        workspace.write_user_votes(SAMPLE_USER_VOTES_JSON);
        workspace
    }

    pub fn root(&self) -> &Path {
        self._temp_dir.path()
    }

    pub fn write_votes(&self, content: &str) {
        write_file(&self.config.votes_file, content);
    }

    pub fn write_user_votes(&self, content: &str) {
        write_file(&self.config.user_votes_file, content);
    }

    pub fn write_cities(&self, content: &str) {
        write_file(&self.config.cities_file, content);
    }

    pub fn write_sample_cities(&self) {
        self.write_cities(SAMPLE_CITIES_JSON);
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("Failed to read file")
    }

    pub fn migration_settings(&self) -> MigrationSettings {
        MigrationSettings::from(&self.config)
    }

    /// Sorted file names in `dir`, empty if it doesn't exist.
    pub fn list_dir(&self, dir: &Path) -> Vec<String> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn db_path(&self) -> PathBuf {
        self.config.db_path.clone()
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Data locations (can override CLI)
    pub cities_file: Option<String>,
    pub votes_file: Option<String>,
    pub user_votes_file: Option<String>,
    pub db_path: Option<String>,
    pub backup_dir: Option<String>,
    pub migration_backup_dir: Option<String>,

    // Migration
    pub placeholder_vote_type: Option<String>,

    // Feature configs
    pub generator: Option<GeneratorConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api_url: Option<String>,
    pub votes_per_city: Option<u32>,
    pub like_weight: Option<f64>,
    pub dislike_weight: Option<f64>,
    pub dont_know_weight: Option<f64>,
    pub delay_ms: Option<u64>,
    pub timeout_sec: Option<u64>,
    pub attach_user_id: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

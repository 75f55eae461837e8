mod file_config;

pub use file_config::{FileConfig, GeneratorConfig};

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CITIES_FILE: &str = "cities.json";
pub const DEFAULT_VOTES_FILE: &str = "backend/votes.json";
pub const DEFAULT_USER_VOTES_FILE: &str = "backend/user_votes.json";
pub const DEFAULT_DB_PATH: &str = "backend/votes.db";
pub const DEFAULT_BACKUP_DIR: &str = "vote_backups";
pub const DEFAULT_MIGRATION_BACKUP_DIR: &str = "json_backups";
/// Vote type written for every migrated per-user vote. The JSON sources do
/// not record which choice a user made.
pub const DEFAULT_PLACEHOLDER_VOTE_TYPE: &str = "like";
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/vote";

/// Options shared by every binary, flattened into each command line.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to a TOML config file. Values in the file take precedence.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// JSON array of city objects.
    #[clap(long)]
    pub cities_file: Option<PathBuf>,

    /// JSON object mapping cityId to aggregate vote counts.
    #[clap(long)]
    pub votes_file: Option<PathBuf>,

    /// JSON object mapping user id to the cityIds that user voted on.
    #[clap(long)]
    pub user_votes_file: Option<PathBuf>,

    /// Path to the SQLite database produced by the migration.
    #[clap(long)]
    pub db_path: Option<PathBuf>,

    /// Directory holding snapshots taken by backup-votes.
    #[clap(long)]
    pub backup_dir: Option<PathBuf>,

    /// Directory holding snapshots taken right before a migration.
    #[clap(long)]
    pub migration_backup_dir: Option<PathBuf>,
}

impl CommonArgs {
    pub fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            cities_file: self.cities_file.clone(),
            votes_file: self.votes_file.clone(),
            user_votes_file: self.user_votes_file.clone(),
            db_path: self.db_path.clone(),
            backup_dir: self.backup_dir.clone(),
            migration_backup_dir: self.migration_backup_dir.clone(),
            ..Default::default()
        }
    }

    /// Loads the optional config file and resolves it against `cli`.
    pub fn resolve(&self, cli: &CliConfig) -> Result<AppConfig> {
        let file_config = match &self.config {
            Some(path) => Some(FileConfig::load(path)?),
            None => None,
        };
        AppConfig::resolve(cli, file_config)
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub cities_file: Option<PathBuf>,
    pub votes_file: Option<PathBuf>,
    pub user_votes_file: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub migration_backup_dir: Option<PathBuf>,
    pub api_url: Option<String>,
    pub votes_per_city: Option<u32>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cities_file: PathBuf,
    pub votes_file: PathBuf,
    pub user_votes_file: PathBuf,
    pub db_path: PathBuf,
    pub backup_dir: PathBuf,
    pub migration_backup_dir: PathBuf,
    pub placeholder_vote_type: String,

    pub generator: GeneratorSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present, CLI values override defaults.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let pick = |file_value: Option<String>, cli_value: &Option<PathBuf>, default: &str| {
            file_value
                .map(PathBuf::from)
                .or_else(|| cli_value.clone())
                .unwrap_or_else(|| PathBuf::from(default))
        };

        let cities_file = pick(file.cities_file, &cli.cities_file, DEFAULT_CITIES_FILE);
        let votes_file = pick(file.votes_file, &cli.votes_file, DEFAULT_VOTES_FILE);
        let user_votes_file = pick(
            file.user_votes_file,
            &cli.user_votes_file,
            DEFAULT_USER_VOTES_FILE,
        );
        let db_path = pick(file.db_path, &cli.db_path, DEFAULT_DB_PATH);
        let backup_dir = pick(file.backup_dir, &cli.backup_dir, DEFAULT_BACKUP_DIR);
        let migration_backup_dir = pick(
            file.migration_backup_dir,
            &cli.migration_backup_dir,
            DEFAULT_MIGRATION_BACKUP_DIR,
        );

        let placeholder_vote_type = file
            .placeholder_vote_type
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_VOTE_TYPE.to_string());
        if placeholder_vote_type.trim().is_empty() {
            bail!("placeholder_vote_type must not be empty");
        }

        // Generator settings - merge file config with CLI and defaults
        let gen_file = file.generator.unwrap_or_default();
        let defaults = GeneratorSettings::default();
        let weights = VoteWeights {
            like: gen_file.like_weight.unwrap_or(defaults.weights.like),
            dislike: gen_file.dislike_weight.unwrap_or(defaults.weights.dislike),
            dont_know: gen_file
                .dont_know_weight
                .unwrap_or(defaults.weights.dont_know),
        };
        weights.validate()?;

        let generator = GeneratorSettings {
            api_url: gen_file
                .api_url
                .or_else(|| cli.api_url.clone())
                .unwrap_or(defaults.api_url),
            votes_per_city: gen_file
                .votes_per_city
                .or(cli.votes_per_city)
                .unwrap_or(defaults.votes_per_city),
            weights,
            delay_ms: gen_file
                .delay_ms
                .or(cli.delay_ms)
                .unwrap_or(defaults.delay_ms),
            timeout_sec: gen_file.timeout_sec.unwrap_or(defaults.timeout_sec),
            attach_user_id: gen_file.attach_user_id.unwrap_or(defaults.attach_user_id),
        };

        Ok(Self {
            cities_file,
            votes_file,
            user_votes_file,
            db_path,
            backup_dir,
            migration_backup_dir,
            placeholder_vote_type,
            generator,
        })
    }
}

/// Relative weights of the three vote categories drawn by the generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteWeights {
    pub like: f64,
    pub dislike: f64,
    pub dont_know: f64,
}

impl VoteWeights {
    pub fn as_array(&self) -> [f64; 3] {
        [self.like, self.dislike, self.dont_know]
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("like", self.like),
            ("dislike", self.dislike),
            ("dont_know", self.dont_know),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                bail!("Invalid {} weight: {}", name, weight);
            }
        }
        if self.as_array().iter().sum::<f64>() <= 0.0 {
            bail!("At least one vote weight must be positive");
        }
        Ok(())
    }
}

impl Default for VoteWeights {
    fn default() -> Self {
        Self {
            like: 0.4,
            dislike: 0.3,
            dont_know: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub api_url: String,
    pub votes_per_city: u32,
    pub weights: VoteWeights,
    /// Pause after every submission, keeps the target server from being flooded.
    pub delay_ms: u64,
    pub timeout_sec: u64,
    pub attach_user_id: bool,
}

impl GeneratorSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            votes_per_city: 100,
            weights: VoteWeights::default(),
            delay_ms: 10,
            timeout_sec: 30,
            attach_user_id: true,
        }
    }
}

//! Vote Migration Tool
//!
//! Snapshots the JSON vote files and migrates them into the SQLite vote
//! database. With the `backup` action only the snapshot is taken.

use anyhow::Result;
use city_votes_tools::backup::BackupManager;
use city_votes_tools::config::CommonArgs;
use city_votes_tools::logging::init_logging;
use city_votes_tools::votes::{migrate, MigrationError};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    /// Snapshot the JSON files, then migrate them.
    Migrate,
    /// Only snapshot the JSON files.
    Backup,
}

#[derive(Parser, Debug)]
#[command(name = "city-votes-migrate")]
#[command(about = "Migrate votes.json and user_votes.json into the SQLite vote database")]
struct CliArgs {
    #[arg(value_enum, default_value_t = Action::Migrate)]
    action: Action,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging()?;

    let config = args.common.resolve(&args.common.to_cli_config())?;

    if args.action == Action::Backup {
        let backup = BackupManager::new(
            &config.votes_file,
            &config.user_votes_file,
            &config.migration_backup_dir,
        );
        info!("Creating snapshots of the JSON vote files...");
        backup.snapshot().log();
        return Ok(());
    }

    info!("Vote Migration");
    info!("==============");
    info!("Votes file: {}", config.votes_file.display());
    info!("User votes file: {}", config.user_votes_file.display());
    info!("Output database: {}", config.db_path.display());

    match migrate(&config) {
        Ok(report) => {
            report.log();
            info!("");
            info!("Migration completed successfully!");
            info!("Database: {}", config.db_path.display());
        }
        Err(e @ MigrationError::MissingSource { .. }) => {
            error!("{}", e);
            error!("Nothing was migrated.");
        }
        Err(e) => error!("{}", e),
    }

    Ok(())
}

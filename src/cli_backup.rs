use anyhow::Result;
use city_votes_tools::backup::{BackupManager, RestoreOutcome};
use city_votes_tools::config::CommonArgs;
use city_votes_tools::logging::init_logging;
use clap::{Parser, ValueEnum};
use tracing::{error, info};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    /// Snapshot the live vote files.
    Backup,
    /// Copy the latest snapshots back over the live vote files.
    Restore,
}

#[derive(Parser, Debug)]
#[command(name = "backup-votes")]
#[command(about = "Snapshot or restore the JSON vote files")]
struct CliArgs {
    #[arg(value_enum, default_value_t = Action::Backup)]
    action: Action,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging()?;

    let config = args.common.resolve(&args.common.to_cli_config())?;
    let manager = BackupManager::new(
        &config.votes_file,
        &config.user_votes_file,
        &config.backup_dir,
    );

    match args.action {
        Action::Backup => {
            info!("Creating a snapshot of the vote files...");
            let report = manager.snapshot();
            report.log();
            if report.copied_count() == report.files.len() {
                info!("It is now safe to redeploy.");
            }
        }
        Action::Restore => {
            info!("Restoring the latest snapshot...");
            match manager.restore_latest() {
                Ok(RestoreOutcome::Restored { votes, user_votes }) => {
                    info!("Restored {}", votes.display());
                    info!("Restored {}", user_votes.display());
                }
                Ok(RestoreOutcome::NotFound { reason }) => error!("{}", reason),
                Err(e) => error!("Restore failed: {:#}", e),
            }
        }
    }

    Ok(())
}

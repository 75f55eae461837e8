use anyhow::Result;
use city_votes_tools::city_ids::assign_city_ids_in_file;
use city_votes_tools::config::CommonArgs;
use city_votes_tools::logging::init_logging;
use clap::Parser;
use tracing::{error, info};

const EXAMPLES_SHOWN: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "assign-city-ids")]
#[command(about = "Add a stable cityId to every city in the city collection")]
struct CliArgs {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging()?;

    let config = args.common.resolve(&args.common.to_cli_config())?;

    match assign_city_ids_in_file(&config.cities_file) {
        Ok(assigned) => {
            info!("Assigned {} cityIds", assigned.len());
            info!("Updated {}", config.cities_file.display());
            info!("");
            info!("Examples:");
            for (name, city_id) in assigned.iter().take(EXAMPLES_SHOWN) {
                info!("  {}: {}", name, city_id);
            }
        }
        Err(e) => {
            error!("{}", e);
            error!("{} was not modified", config.cities_file.display());
        }
    }

    Ok(())
}

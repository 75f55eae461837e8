use anyhow::Result;
use city_votes_tools::city_ids::load_city_refs;
use city_votes_tools::config::CommonArgs;
use city_votes_tools::generator::{HttpVoteSubmitter, VoteGenerator};
use city_votes_tools::logging::init_logging;
use clap::Parser;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "random-votes")]
#[command(about = "Send randomly distributed votes for every city to a running vote endpoint")]
struct CliArgs {
    /// Vote-submission endpoint.
    #[clap(long)]
    api_url: Option<String>,

    /// Number of votes sent per city.
    #[clap(long)]
    votes_per_city: Option<u32>,

    /// Pause between two submissions, in milliseconds.
    #[clap(long)]
    delay_ms: Option<u64>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging()?;

    let mut cli = args.common.to_cli_config();
    cli.api_url = args.api_url.clone();
    cli.votes_per_city = args.votes_per_city;
    cli.delay_ms = args.delay_ms;
    let config = args.common.resolve(&cli)?;
    let settings = config.generator;

    let cities = match load_city_refs(&config.cities_file) {
        Ok(cities) => cities,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };

    info!(
        "Sending {} votes per city to {}",
        settings.votes_per_city, settings.api_url
    );
    let submitter = HttpVoteSubmitter::new(settings.api_url.clone(), settings.timeout_sec)?;
    let mut generator = VoteGenerator::new(submitter, rand::rng(), settings)?;
    let report = generator.run(&cities);

    if report.cities_skipped > 0 {
        warn!("Cities without cityId skipped: {}", report.cities_skipped);
    }
    info!(
        "Done: {} cities, {} votes accepted, {} rejected, {} failed",
        report.cities_processed, report.accepted, report.rejected, report.failed
    );

    Ok(())
}

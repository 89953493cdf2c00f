//! SG Hawker bot
//!
//! Answers queries about Singapore hawker-centre locations, cleaning
//! schedules, and proximity to MRT/LRT stations.
//!
//! Subcommands:
//! - `serve` - load the datasets and answer chat events over stdio
//! - `fetch-venues` - pull the paginated venue API into a flat cache file
//! - `build-distances` - generate the venue-to-station distance table

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use hawker_bot::{ChatEvent, Dispatcher, Reply};
use hawker_bot::format;
use hawker_data::{
    build_distance_table, dedup_distance_rows, load_snapshot, read_json_file, read_stations_csv,
    validate_raw_records, venues_from_flat, write_json_file, DatasetSource, DatastoreClient,
    FlatVenueRecord, VENUE_RESOURCE_LINK,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Published flat datasets the bot loads at startup.
const VENUE_DATA_URL: &str =
    "https://raw.githubusercontent.com/darensin01/SGHawkerBot/main/hawker_data.json";
const DISTANCE_DATA_URL: &str =
    "https://raw.githubusercontent.com/darensin01/SGHawkerBot/main/mrt_hawker_distances.json";

#[derive(Parser)]
#[command(name = "hawkerbot")]
#[command(about = "Singapore hawker centre chat bot", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the datasets and answer chat events over stdio
    Serve(ServeArgs),

    /// Pull the paginated venue API and write the flat venue cache file
    #[command(name = "fetch-venues")]
    FetchVenues(FetchVenuesArgs),

    /// Generate the venue-to-station distance table from a stations CSV
    #[command(name = "build-distances")]
    BuildDistances(BuildDistancesArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Venue dataset: a URL or a local JSON file
    #[arg(long, default_value = VENUE_DATA_URL)]
    venues: String,

    /// Distance dataset: a URL or a local JSON file
    #[arg(long, default_value = DISTANCE_DATA_URL)]
    distances: String,

    /// Rebuild the snapshot every N seconds; omit to never refresh
    #[arg(long)]
    refresh_secs: Option<u64>,
}

#[derive(Args)]
struct FetchVenuesArgs {
    /// Where to write the flat venue JSON
    #[arg(long, default_value = "hawker_data.json")]
    out: PathBuf,
}

#[derive(Args)]
struct BuildDistancesArgs {
    /// Station coordinates CSV (STN_NAME, STN_NO, lat, long)
    #[arg(long, default_value = "mrt_data.csv")]
    stations: PathBuf,

    /// Flat venue JSON, as written by fetch-venues
    #[arg(long, default_value = "hawker_data.json")]
    venues: PathBuf,

    /// Where to write the distance JSON
    #[arg(long, default_value = "mrt_hawker_distances.json")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging goes to stderr only; stdout carries the transport replies.
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::FetchVenues(args) => fetch_venues(args).await,
        Commands::BuildDistances(args) => build_distances(args),
    }
}

/// Run the stdio transport loop: one JSON chat event in per line, one JSON
/// reply out per line. A refresh tick rebuilds the snapshot off to the side
/// and swaps it in whole; a failed refresh keeps the previous snapshot.
async fn serve(args: ServeArgs) -> Result<()> {
    let client = DatastoreClient::default();
    let venue_source = DatasetSource::from_spec(&args.venues);
    let distance_source = DatasetSource::from_spec(&args.distances);

    let snapshot = load_snapshot(&client, &venue_source, &distance_source)
        .await
        .context("initial dataset load")?;
    let mut dispatcher = Dispatcher::new(Arc::new(snapshot));
    log::info!("SG Hawker bot ready");

    let mut refresh = args.refresh_secs.map(|secs| {
        let period = Duration::from_secs(secs);
        tokio::time::interval_at(tokio::time::Instant::now() + period, period)
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read event line")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = match serde_json::from_str::<ChatEvent>(&line) {
                    Ok(event) => dispatcher.handle(&event),
                    Err(err) => {
                        log::warn!("Unparseable event line: {err}");
                        Reply::text(format::unknown())
                    }
                };
                let mut payload = serde_json::to_string(&reply).context("serialize reply")?;
                payload.push('\n');
                stdout.write_all(payload.as_bytes()).await?;
                stdout.flush().await?;
            }
            _ = tick(&mut refresh) => {
                match load_snapshot(&client, &venue_source, &distance_source).await {
                    Ok(snapshot) => {
                        dispatcher.set_snapshot(Arc::new(snapshot));
                        log::info!("Snapshot refreshed");
                    }
                    Err(err) => {
                        log::warn!("Refresh failed, keeping the previous snapshot: {err}");
                    }
                }
            }
        }
    }

    log::info!("SG Hawker bot stopped");
    Ok(())
}

/// Await the next refresh tick, or pend forever when refresh is off.
async fn tick(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn fetch_venues(args: FetchVenuesArgs) -> Result<()> {
    let client = DatastoreClient::default();
    let values = client
        .fetch_all_records(VENUE_RESOURCE_LINK)
        .await
        .context("fetch venue records")?;

    let records = validate_raw_records(&values);
    if records.is_empty() {
        bail!("no valid venue records fetched");
    }

    write_json_file(&args.out, &records).context("write venue cache")?;
    log::info!("Wrote {} venue records to {}", records.len(), args.out.display());
    Ok(())
}

fn build_distances(args: BuildDistancesArgs) -> Result<()> {
    let stations = read_stations_csv(&args.stations).context("read stations CSV")?;
    if stations.is_empty() {
        bail!("no stations in {}", args.stations.display());
    }

    let flat: Vec<FlatVenueRecord> = read_json_file(&args.venues).context("read venue cache")?;
    let venues = venues_from_flat(flat);
    if venues.is_empty() {
        bail!("no valid venues in {}", args.venues.display());
    }

    let rows = dedup_distance_rows(build_distance_table(&venues, &stations));
    write_json_file(&args.out, &rows).context("write distance table")?;
    log::info!("Wrote {} distance rows to {}", rows.len(), args.out.display());
    Ok(())
}

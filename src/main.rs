use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use futures::{StreamExt as _, stream};
use log::{info, warn};
use tokio::io::BufReader;

mod classifier;
mod config;
mod monitor;
mod observation;
mod source;
mod triggers;

/// Classify wireless telemetry by proximity and raise watch-list alerts.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// TOML config file (thresholds, watch list, stream settings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// NDJSON file of observation records, or `-` for stdin. Without it a
    /// synthetic feed is generated.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Delay between packets, overriding the config file
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many packets
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Seed for the synthetic feed, overriding the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let app_config = match &args.config {
        Some(path) => config::AppConfig::load(path)?,
        None => config::AppConfig::default(),
    };
    let mut settings = app_config.resolve()?;
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    if settings.watch_list.is_empty() {
        warn!("Watch list is empty, no alerts will be raised");
    } else {
        info!("Watching {} devices", settings.watch_list.len());
    }

    let limit = args.count.unwrap_or(usize::MAX);
    let interval_ms = args.interval_ms.map(Duration::from_millis);

    let packets = match &args.input {
        Some(path) if path.as_os_str() == "-" => {
            info!("Reading observations from stdin");
            let interval = interval_ms.or(settings.interval).unwrap_or_default();
            let lines = source::ndjson(BufReader::new(tokio::io::stdin()));
            source::paced(lines.take(limit), interval).boxed()
        }
        Some(path) => {
            info!("Reading observations from {}", path.display());
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening input {}", path.display()))?;
            let interval = interval_ms.or(settings.interval).unwrap_or_default();
            let lines = source::ndjson(BufReader::new(file));
            source::paced(lines.take(limit), interval).boxed()
        }
        None => {
            info!("--- Wireless Signal Monitor Started (synthetic feed) ---");
            let interval = interval_ms
                .or(settings.interval)
                .unwrap_or(Duration::from_millis(config::DEFAULT_INTERVAL_MS));
            let feed = source::MockFeed::new(
                source::default_templates(),
                settings.jitter_db,
                settings.seed,
            );
            let records = feed
                .take(limit)
                .map(Ok::<_, observation::MalformedObservation>);
            source::paced(stream::iter(records), interval).boxed()
        }
    };

    let core = monitor::Monitor::new(settings);
    core.run(packets).await;

    Ok(())
}

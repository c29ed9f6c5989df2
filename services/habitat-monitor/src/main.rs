//! Habitat monitor.
//!
//! Run-once driver that:
//! - Picks an endangered species (registry file, downloaded on first run)
//! - Looks up where it has been observed
//! - Walks satellite imagery for that location at the revisit cadence
//! - Writes each image and its NDVI raster as PNG

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use habitat_common::Coordinate;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use habitat_monitor::config::MonitorConfig;
use habitat_monitor::pipeline::{self, RunSelection};

#[derive(Parser, Debug)]
#[command(name = "habitat-monitor")]
#[command(about = "Satellite NDVI time series for endangered species locations")]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "HABITAT_CONFIG", default_value = "config/monitor.yaml")]
    config: PathBuf,

    /// Scientific name to analyse (default: first species in the registry file)
    #[arg(short, long)]
    species: Option<String>,

    /// Location as "lat,lon" (skips the occurrence lookup)
    #[arg(long)]
    location: Option<String>,

    /// Which occurrence location to analyse
    #[arg(long)]
    location_index: Option<usize>,

    /// First date of the monitoring window (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Last date of the monitoring window (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    /// Directory for PNG output
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Imagery provider API key
    #[arg(long, env = "IMAGERY_API_KEY", hide_env_values = true)]
    imagery_api_key: Option<String>,

    /// Endangered species registry token
    #[arg(long, env = "REDLIST_TOKEN", hide_env_values = true)]
    redlist_token: Option<String>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (json or pretty)
    #[arg(long)]
    log_format: Option<String>,

    /// Log the species' recorded habitats before fetching imagery
    #[arg(long)]
    habitats: bool,
}

impl Args {
    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(index) = self.location_index {
            config.run.location_index = index;
        }
        if let Some(start) = &self.start {
            config.run.start_date = start.clone();
        }
        if let Some(end) = &self.end {
            config.run.end_date = end.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.run.output_dir = dir.clone();
        }
        if let Some(key) = &self.imagery_api_key {
            config.imagery.source.api_key = key.clone();
        }
        if let Some(token) = &self.redlist_token {
            config.redlist.token = token.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.to_lowercase();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.to_lowercase();
        }
    }

    fn selection(&self) -> Result<RunSelection> {
        let location = self
            .location
            .as_deref()
            .map(Coordinate::from_pair_string)
            .transpose()
            .context("Invalid --location")?;

        Ok(RunSelection {
            species: self.species.clone(),
            location,
            show_habitats: self.habitats,
        })
    }
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    if format == "pretty" {
        tracing::subscriber::set_global_default(builder.pretty().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config_found = args.config.exists();
    let mut config = if config_found {
        MonitorConfig::read(&args.config)?
    } else {
        MonitorConfig::default()
    };
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging.level, &config.logging.format)?;

    if !config_found {
        warn!(path = %args.config.display(), "Config file not found, using defaults");
    }

    info!("Starting habitat monitor");

    let selection = args.selection()?;
    let summary = pipeline::run(&config, &selection).await?;

    info!(
        species = %summary.species,
        images = summary.samples.len(),
        "Done"
    );

    Ok(())
}

mod angles;
mod config;
mod coordinates;
mod error;
mod look;
mod observer;
mod report;
mod rotation;
mod satellite;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use config::Config;
use look::compute_observer_view;
use rotation::build_rotation_basis;
use observer::Observer;
use satellite::SatelliteTelemetry;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Shows where to look for the International Space Station.
#[derive(Debug, Parser)]
#[command(version, about, allow_negative_numbers = true)]
struct Cli {
    /// Configuration file (defaults to the per-user config, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Observer latitude in degrees, overriding config and IP geolocation
    #[arg(long, requires = "lon")]
    lat: Option<f64>,

    /// Observer longitude in degrees
    #[arg(long, requires = "lat")]
    lon: Option<f64>,

    /// Observer altitude in meters
    #[arg(long)]
    alt: Option<f64>,

    /// NORAD catalog number of the satellite to look at
    #[arg(short, long)]
    satellite_id: Option<u32>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Keep refreshing every `display.refresh_secs` seconds
    #[arg(short, long)]
    watch: bool,

    /// Stop watching after this many updates
    #[arg(
        short = 'n',
        long,
        requires = "watch",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    count: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref()).context("loading configuration")?;

    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(config.sources.timeout_secs))
        .user_agent(concat!("isslook/", env!("CARGO_PKG_VERSION")))
        .build();

    let observer = resolve_observer(&cli, &config, &agent).context("resolving observer location")?;
    let satellite_id = cli.satellite_id.unwrap_or(config.sources.satellite_id);

    if !cli.watch {
        return look_once(&cli, &config, &agent, &observer, satellite_id);
    }

    let mut updates = 0;
    loop {
        if let Err(e) = look_once(&cli, &config, &agent, &observer, satellite_id) {
            log::warn!("update failed: {:#}", e);
        }
        updates += 1;
        if cli.count.is_some_and(|count| updates >= count) {
            return Ok(());
        }
        std::thread::sleep(Duration::from_secs(config.display.refresh_secs));
    }
}

fn resolve_observer(cli: &Cli, config: &Config, agent: &ureq::Agent) -> Result<Observer> {
    let mut observer = match (cli.lat, cli.lon, &config.observer) {
        (Some(lat), Some(lon), _) => Observer::new("Command line".to_string(), lat, lon, 0.0),
        (_, _, Some(configured)) => Observer::from_config(configured),
        _ => Observer::from_ip(agent, &config.sources.geolocation_url)?,
    };
    if let Some(alt) = cli.alt {
        observer.altitude = alt;
    }

    // A pole observer has no local frame, so no lookup can succeed
    observer
        .position()
        .validate()
        .and_then(|_| build_rotation_basis(observer.longitude, observer.latitude))
        .with_context(|| format!("observer {}", observer.name))?;
    Ok(observer)
}

fn look_once(
    cli: &Cli,
    config: &Config,
    agent: &ureq::Agent,
    observer: &Observer,
    satellite_id: u32,
) -> Result<()> {
    let telemetry = SatelliteTelemetry::fetch(agent, &config.sources.telemetry_url, satellite_id)
        .context("fetching satellite telemetry")?;

    let view = compute_observer_view(&observer.position(), &telemetry.position())
        .context("computing look angles")?;

    match cli.format {
        OutputFormat::Text => print!(
            "{}",
            report::render_text(observer, &telemetry, &view, config.display.precision)?
        ),
        OutputFormat::Json => println!("{}", report::render_json(observer, &telemetry, &view)?),
    }

    Ok(())
}

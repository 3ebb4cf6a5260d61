//! snowplow cli - Pittsburgh snow plow tracker

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use argopt::{cmd_group, subcmd};
use env_logger::Env;
use log::info;
use time::OffsetDateTime;

use snowplow::sources::{ArcGisSource, Nominatim};
use snowplow::{CheckOptions, Configs, HistoryOptions, NearOptions};

/// CLI of snowplow - Track the City of Pittsburgh snow plows
#[cmd_group(commands = [status, near, check, history])]
fn main() -> Result<(), String> {}

/// Show the current plows status
#[subcmd]
fn status(
    /// Only show moving plows
    #[opt(long)]
    active: bool,
    /// Configuration file. Default: .snowplow.yaml, ~/.snowplow.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    let conf = setup(config)?;
    let mut source = feature_source(&conf)?;

    let report = snowplow::status(&mut source, active, OffsetDateTime::now_utc())
        .map_err(|e| e.to_string())?;
    print!("{}", report);

    Ok(())
}

/// Find plows near a location
#[subcmd]
fn near(
    /// Address, ZIP code, neighborhood, `lat,lon` or vehicle ID
    location: String,
    /// Search radius in miles
    #[opt(short, long, default_value = "2")]
    radius: f64,
    /// Max results
    #[opt(short = 'n', long, default_value = "10")]
    limit: usize,
    /// Configuration file. Default: .snowplow.yaml, ~/.snowplow.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    let conf = setup(config)?;
    let mut source = feature_source(&conf)?;
    let geocoder = Nominatim::new(&conf.endpoints.geocoder).map_err(|e| e.to_string())?;

    let options = NearOptions { radius, limit };
    let report = snowplow::near(
        &mut source,
        &geocoder,
        &location,
        &options,
        OffsetDateTime::now_utc(),
    )
    .map_err(|e| e.to_string())?;
    print!("{}", report);

    Ok(())
}

/// Check if a street was plowed
#[subcmd]
fn check(
    /// Street address to check. Default: the configured one
    address: Option<String>,
    /// Hours to look back
    #[opt(short = 't', long, default_value = "12")]
    hours: u32,
    /// Radius in feet
    #[opt(short, long, default_value = "200")]
    radius: f64,
    /// Configuration file. Default: .snowplow.yaml, ~/.snowplow.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    let conf = setup(config)?.with_tools_fallback(&tools_paths());
    let mut source = feature_source(&conf)?;
    let geocoder = Nominatim::new(&conf.endpoints.geocoder).map_err(|e| e.to_string())?;

    if address.is_none() {
        if let Some(default) = &conf.default_address {
            eprintln!("Using default address: {}\n", default);
        }
    }

    let options = CheckOptions { hours, radius };
    let report = snowplow::check(
        &mut source,
        &geocoder,
        address.as_deref(),
        conf.default_address.as_deref(),
        &options,
        OffsetDateTime::now_utc(),
    )
    .map_err(|e| e.to_string())?;
    print!("{}", report);

    Ok(())
}

/// Show a vehicle route history
#[subcmd]
fn history(
    /// Vehicle ID, eg.: PW-110
    vehicle: String,
    /// Hours to show
    #[opt(short = 't', long, default_value = "6")]
    hours: u32,
    /// Also write the route to this GPX file
    #[opt(long)]
    gpx: Option<String>,
    /// GPX track segments duration, in minutes
    #[opt(long, default_value = "5")]
    segment: u8,
    /// Configuration file. Default: .snowplow.yaml, ~/.snowplow.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    let conf = setup(config)?;
    let mut source = feature_source(&conf)?;

    let options = HistoryOptions { hours };
    let report = snowplow::history(&mut source, &vehicle, &options, OffsetDateTime::now_utc())
        .map_err(|e| e.to_string())?;

    // The report is printed only once the export succeeded
    if let Some(path) = gpx {
        let destination = File::create(&path)
            .map_err(|e| format!("Failed on create the destination file: {}", e))?;

        snowplow::write_route(
            &report.vehicle,
            &report.points,
            segment,
            BufWriter::new(destination),
        )
        .map_err(|e| e.to_string())?;
        info!("route written to {}", path);
    }

    print!("{}", report);

    Ok(())
}

/// Start the logging and load the current config
fn setup(provided: Option<String>) -> Result<Configs, String> {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("warn")).try_init();

    let mut options = vec![];

    if let Some(sprovided) = provided {
        options.push(PathBuf::from(sprovided));
    }

    options.push(PathBuf::from(".snowplow.yaml"));

    if let Some(home) = dirs::home_dir() {
        options.push(home.join(".snowplow.yaml"));
    }

    Configs::load(&options)
}

/// Workspace documents that may hold a default address
fn tools_paths() -> Vec<PathBuf> {
    let mut paths = vec![];

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join("clawd").join("TOOLS.md"));
    }

    paths.push(PathBuf::from("TOOLS.md"));

    if let Ok(workspace) = env::var("CLAWDBOT_WORKSPACE") {
        if !workspace.is_empty() {
            paths.push(PathBuf::from(workspace).join("TOOLS.md"));
        }
    }

    paths
}

fn feature_source(conf: &Configs) -> Result<ArcGisSource, String> {
    ArcGisSource::new(
        &conf.endpoints.vehicles,
        &conf.endpoints.history,
        Duration::from_secs(conf.timeout),
    )
    .map_err(|e| e.to_string())
}

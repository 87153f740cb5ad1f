use std::{path::PathBuf, time::Instant};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{DatasetArgs, MapsArgs, SearchArgs},
    geo::LatLng,
    report::{navigation_url, route_feature_collection, InfoPanel},
    resolver::{prefilter, select_place, NearestStopResolver, DEFAULT_PREFILTER_SIZE},
    server::AppState,
    stops::StopSet,
};
mod config;
mod geo;
mod maps;
mod report;
mod resolver;
mod server;
mod stops;

#[derive(Parser)]
#[command(name = "stopfinder", about = "Find the nearest public-transport stop on foot")]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find the stop with the shortest walk from a place and route to it
    Nearest {
        /// Place to search for, e.g. a hotel name
        place: Option<String>,
        /// Latitude of the starting point, instead of a place search
        #[arg(long, requires = "lng", conflicts_with = "place", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of the starting point, instead of a place search
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Write the walking route as GeoJSON to this path
        #[arg(long)]
        route_out: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        dataset: DatasetArgs,
        #[command(flatten)]
        maps: MapsArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// List the straight-line closest stops without calling any service
    Candidates {
        /// Latitude of the starting point
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the starting point
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        /// How many stops to list
        #[arg(long, default_value_t = DEFAULT_PREFILTER_SIZE)]
        limit: usize,
        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// Serve nearest-stop lookups over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        address: String,
        /// Port to listen on
        #[arg(short, long, env = "SERVER_PORT", default_value_t = 8080)]
        port: u16,
        #[command(flatten)]
        dataset: DatasetArgs,
        #[command(flatten)]
        maps: MapsArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_stops(dataset: &DatasetArgs) -> anyhow::Result<StopSet> {
    let now = Instant::now();
    let stops = StopSet::read(&dataset.stops)?;
    info!("Read {} stops in {:?}", stops.len(), now.elapsed());
    Ok(stops)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Nearest {
            place,
            lat,
            lng,
            route_out,
            json,
            dataset,
            maps,
            search,
        } => {
            let stops = read_stops(&dataset)?;
            let client = maps.client()?;

            let (place, origin) = match (lat, lng, place) {
                (Some(lat), Some(lng), _) => (None, LatLng::new(lat, lng)),
                (_, _, Some(query)) => {
                    let place = select_place(&client, &query).await?;
                    let origin = place.location;
                    (Some(place), origin)
                }
                _ => return Err(anyhow!("Give a place to search for, or --lat and --lng")),
            };

            let now = Instant::now();
            let resolver = NearestStopResolver::new(&client, search.resolver_config());
            let resolution = resolver.resolve(origin, &stops.stops).await?;
            info!("Resolved nearest stop in {:?}", now.elapsed());

            let link = navigation_url(origin, resolution.nearest.stop.location);
            let collection = route_feature_collection(&resolution);

            if let Some(path) = route_out {
                std::fs::write(&path, serde_json::to_string(&collection)?)
                    .with_context(|| format!("Failed to write route to {}", path.display()))?;
                info!("Wrote route to {}", path.display());
            }

            let panel = InfoPanel::new(&resolution);
            if json {
                let output = json!({
                    "place": place,
                    "origin": origin,
                    "stop": resolution.nearest.stop,
                    "nearest": resolution.nearest,
                    "panel": panel,
                    "navigation_url": link,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                if let Some(place) = place {
                    println!("{} ({})", place.name, place.location);
                }
                println!("{}", panel.render(search.lang));
                println!("{link}");
            }
        }
        Command::Candidates {
            lat,
            lng,
            limit,
            dataset,
        } => {
            let stops = read_stops(&dataset)?;
            let origin = LatLng::new(lat, lng);
            if !origin.is_valid() {
                return Err(anyhow!("Coordinates out of range: {origin}"));
            }

            for candidate in prefilter(origin, &stops.stops, limit) {
                println!(
                    "{:>8.3} km  {}  ({})",
                    candidate.distance_km, candidate.stop.name, candidate.stop.location
                );
            }
        }
        Command::Serve {
            address,
            port,
            dataset,
            maps,
            search,
        } => {
            let stops = read_stops(&dataset)?;
            if stops.is_empty() {
                warn!("Stop dataset is empty, every lookup will fail");
            }

            let state = AppState {
                stops,
                maps: maps.client()?,
                config: search.resolver_config(),
                lang: search.lang,
            };
            server::run(state, address, port).await?;
        }
    }

    Ok(())
}

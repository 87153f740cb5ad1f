use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Context};
use clap::{builder::TypedValueParser, Args};

use crate::{
    geo::LatLng,
    maps::google::{GoogleMapsClient, LocationBias, DEFAULT_BASE_URL},
    report::Language,
    resolver::{ResolverConfig, DEFAULT_PREFILTER_SIZE, MAX_BATCH_SIZE},
};

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Path to the GeoJSON stop dataset
    #[arg(long, env = "STOPFINDER_STOPS", default_value = "stops.geojson")]
    pub stops: PathBuf,
}

/// Options for subcommands that call the mapping platform.
#[derive(Args, Debug, Clone)]
pub struct MapsArgs {
    /// Google Maps Platform API key
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Base URL of the Maps web services
    #[arg(long, env = "GOOGLE_MAPS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub maps_base_url: String,
    /// Timeout for each request to the mapping platform
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
    /// Latitude that place searches are biased towards
    #[arg(long, default_value_t = 36.67726010874127, allow_negative_numbers = true)]
    pub bias_lat: f64,
    /// Longitude that place searches are biased towards
    #[arg(long, default_value_t = -4.493653914698043, allow_negative_numbers = true)]
    pub bias_lng: f64,
    /// Radius of the search bias in metres, 0 disables it
    #[arg(long, default_value_t = 20_000)]
    pub bias_radius_m: u32,
}

impl MapsArgs {
    pub fn client(&self) -> anyhow::Result<GoogleMapsClient> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("An API key is required (--api-key or GOOGLE_MAPS_API_KEY)"))?;

        let bias = (self.bias_radius_m > 0).then(|| LocationBias {
            center: LatLng::new(self.bias_lat, self.bias_lng),
            radius_m: self.bias_radius_m,
        });

        GoogleMapsClient::new(
            &self.maps_base_url,
            api_key,
            Duration::from_secs(self.timeout_secs),
            bias,
        )
        .context("Failed to build HTTP client")
    }
}

/// Options controlling the nearest-stop search.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Number of straight-line closest stops sent to the distance matrix
    #[arg(long, default_value_t = DEFAULT_PREFILTER_SIZE, value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize))]
    pub prefilter_size: usize,
    /// Destinations per distance matrix request
    #[arg(long, default_value_t = MAX_BATCH_SIZE, value_parser = clap::value_parser!(u64).range(1..=MAX_BATCH_SIZE as u64).map(|v| v as usize))]
    pub batch_size: usize,
    /// Language of the info panel
    #[arg(long, value_enum, default_value_t = Language::Es)]
    pub lang: Language,
}

impl SearchArgs {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            prefilter_size: self.prefilter_size,
            batch_size: self.batch_size,
        }
    }
}

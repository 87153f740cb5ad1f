use std::time::Duration;

use itertools::Itertools;
use reqwest::{Client, Url};
use tracing::debug;

use super::response::{
    parse_directions, parse_distance_matrix, parse_find_place, DirectionsResponse,
    DistanceMatrixResponse, FindPlaceResponse,
};
use super::{Directions, DistanceMatrix, MapsError, MatrixElement, Place, PlaceSearch, WalkingRoute};
use crate::geo::LatLng;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Circle that place searches are biased towards.
#[derive(Debug, Clone, Copy)]
pub struct LocationBias {
    pub center: LatLng,
    pub radius_m: u32,
}

/// HTTP client for the Google Maps Platform web services.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    client: Client,
    base_url: String,
    api_key: String,
    bias: Option<LocationBias>,
}

impl GoogleMapsClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        bias: Option<LocationBias>,
    ) -> Result<Self, MapsError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bias,
        })
    }

    fn url(&self, service: &str, params: &[(&str, String)]) -> Result<Url, MapsError> {
        let mut url = Url::parse(&format!("{}/{}/json", self.base_url, service))
            .map_err(|err| MapsError::Malformed(format!("failed to build URL: {err}")))?;

        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("key", &self.api_key);

        Ok(url)
    }

    fn find_place_params(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("input", query.to_string()),
            ("inputtype", "textquery".to_string()),
            ("fields", "geometry,name".to_string()),
        ];
        if let Some(bias) = self.bias {
            params.push((
                "locationbias",
                format!("circle:{}@{}", bias.radius_m, bias.center),
            ));
        }
        params
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, MapsError> {
        let response = self.client.get(url).send().await.map_err(MapsError::Http)?;
        response.json().await.map_err(MapsError::Json)
    }
}

fn distance_matrix_params(origin: LatLng, destinations: &[LatLng]) -> Vec<(&'static str, String)> {
    vec![
        ("origins", origin.to_string()),
        ("destinations", destinations.iter().join("|")),
        ("mode", "walking".to_string()),
        ("units", "metric".to_string()),
    ]
}

fn directions_params(origin: LatLng, destination: LatLng) -> Vec<(&'static str, String)> {
    vec![
        ("origin", origin.to_string()),
        ("destination", destination.to_string()),
        ("mode", "walking".to_string()),
    ]
}

impl PlaceSearch for GoogleMapsClient {
    async fn find_place(&self, query: &str) -> Result<Place, MapsError> {
        let params = self.find_place_params(query);

        debug!(query, "find place");
        let resp: FindPlaceResponse = self.get(self.url("place/findplacefromtext", &params)?).await?;
        parse_find_place(resp, query)
    }
}

impl DistanceMatrix for GoogleMapsClient {
    async fn walking_distances(
        &self,
        origin: LatLng,
        destinations: &[LatLng],
    ) -> Result<Vec<MatrixElement>, MapsError> {
        if destinations.is_empty() {
            return Ok(Vec::new());
        }

        let params = distance_matrix_params(origin, destinations);

        debug!(%origin, destinations = destinations.len(), "distance matrix");
        let resp: DistanceMatrixResponse = self.get(self.url("distancematrix", &params)?).await?;
        parse_distance_matrix(resp, destinations.len())
    }
}

impl Directions for GoogleMapsClient {
    async fn walking_route(
        &self,
        origin: LatLng,
        destination: LatLng,
    ) -> Result<WalkingRoute, MapsError> {
        let params = directions_params(origin, destination);

        debug!(%origin, %destination, "directions");
        let resp: DirectionsResponse = self.get(self.url("directions", &params)?).await?;
        parse_directions(resp)
    }
}

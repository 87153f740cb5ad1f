use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    geo::{haversine_km, LatLng},
    maps::{Directions, DistanceMatrix, MapsError, Place, PlaceSearch, TextValue, WalkingRoute},
    stops::stop::{Candidate, Stop},
};

pub const DEFAULT_PREFILTER_SIZE: usize = 15;
/// Destinations accepted by a single distance matrix request.
pub const MAX_BATCH_SIZE: usize = 25;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid place selection: {0}")]
    InvalidPlace(String),
    #[error("place search failed: {0}")]
    PlaceSearch(#[source] MapsError),
    #[error("no stops data available")]
    NoStops,
    #[error("no nearest stop found")]
    NoReachableStop,
    #[error("distance matrix request failed: {0}")]
    DistanceMatrix(#[source] MapsError),
    #[error("failed to load directions: {0}")]
    Directions(#[source] MapsError),
}

#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    pub prefilter_size: usize,
    pub batch_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefilter_size: DEFAULT_PREFILTER_SIZE,
            batch_size: MAX_BATCH_SIZE,
        }
    }
}

/// The stop with the shortest walking distance, as reported by the distance matrix.
#[derive(Debug, Clone, Serialize)]
pub struct NearestStop {
    pub stop: Stop,
    pub distance: TextValue,
    pub duration: Option<TextValue>,
    pub straight_line_km: f64,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub origin: LatLng,
    pub nearest: NearestStop,
    pub route: WalkingRoute,
}

/// The `limit` stops closest to `origin` in a straight line, nearest first.
/// Equidistant stops keep their dataset order.
pub fn prefilter(origin: LatLng, stops: &[Stop], limit: usize) -> Vec<Candidate<'_>> {
    stops
        .iter()
        .map(|stop| Candidate {
            stop,
            distance_km: haversine_km(origin, stop.location),
        })
        .sorted_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
        .take(limit)
        .collect()
}

/// Turns a free-text query into a selected place.
pub async fn select_place<P: PlaceSearch>(search: &P, query: &str) -> Result<Place, ResolveError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ResolveError::InvalidPlace("empty query".to_owned()));
    }

    let place = search.find_place(query).await.map_err(|e| match e {
        MapsError::NoPlace(q) => ResolveError::InvalidPlace(format!("no match for {q:?}")),
        other => ResolveError::PlaceSearch(other),
    })?;

    info!(name = %place.name, location = %place.location, "selected place");
    Ok(place)
}

pub struct NearestStopResolver<'a, M> {
    maps: &'a M,
    config: ResolverConfig,
}

impl<'a, M> NearestStopResolver<'a, M>
where
    M: DistanceMatrix + Directions,
{
    pub fn new(maps: &'a M, config: ResolverConfig) -> Self {
        Self { maps, config }
    }

    /// Finds the prefiltered stop with the shortest walking distance from `origin`.
    ///
    /// Candidates are sent to the distance matrix in batches, one request at a
    /// time. The first failed request aborts the search.
    pub async fn nearest(&self, origin: LatLng, stops: &[Stop]) -> Result<NearestStop, ResolveError> {
        if !origin.is_valid() {
            return Err(ResolveError::InvalidPlace(format!(
                "coordinates out of range: {origin}"
            )));
        }

        if stops.is_empty() {
            error!("no stops data available");
            return Err(ResolveError::NoStops);
        }

        let candidates = prefilter(origin, stops, self.config.prefilter_size);
        let batch_size = self.config.batch_size.clamp(1, MAX_BATCH_SIZE);

        let mut best: Option<NearestStop> = None;

        for (batch_no, batch) in candidates.chunks(batch_size).enumerate() {
            let destinations = batch.iter().map(|c| c.stop.location).collect::<Vec<_>>();

            let elements = self
                .maps
                .walking_distances(origin, &destinations)
                .await
                .map_err(|e| {
                    error!(batch = batch_no, "distance matrix request failed: {e}");
                    ResolveError::DistanceMatrix(e)
                })?;

            for (candidate, element) in batch.iter().zip(elements) {
                let Some(distance) = element.distance else {
                    debug!(stop = %candidate.stop.name, "no walking distance");
                    continue;
                };

                if best
                    .as_ref()
                    .map_or(true, |b| distance.value < b.distance.value)
                {
                    best = Some(NearestStop {
                        stop: candidate.stop.clone(),
                        distance,
                        duration: element.duration,
                        straight_line_km: candidate.distance_km,
                    });
                }
            }
        }

        match best {
            Some(nearest) => {
                info!(
                    stop = %nearest.stop.name,
                    metres = nearest.distance.value,
                    "found nearest stop"
                );
                Ok(nearest)
            }
            None => {
                error!("no nearest stop found");
                Err(ResolveError::NoReachableStop)
            }
        }
    }

    /// Finds the nearest stop and the walking route to it.
    pub async fn resolve(&self, origin: LatLng, stops: &[Stop]) -> Result<Resolution, ResolveError> {
        let nearest = self.nearest(origin, stops).await?;

        let route = self
            .maps
            .walking_route(origin, nearest.stop.location)
            .await
            .map_err(|e| {
                error!("failed to load directions: {e}");
                ResolveError::Directions(e)
            })?;

        Ok(Resolution {
            origin,
            nearest,
            route,
        })
    }
}

//! Collaborators provided by the external mapping platform.
//!
//! The resolver only talks to these traits; [`google::GoogleMapsClient`] is the
//! production implementation and tests substitute in-memory fakes.

pub mod error;
pub mod google;
mod response;

use geo_types::LineString;
use serde::Serialize;

use crate::geo::LatLng;
pub use error::MapsError;

/// A measured quantity together with the service's own display text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextValue {
    pub text: String,
    pub value: u64,
}

/// One origin/destination cell of a distance matrix. Distance is in metres,
/// duration in seconds; both are absent when the pair could not be routed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatrixElement {
    pub distance: Option<TextValue>,
    pub duration: Option<TextValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkingRoute {
    pub distance: TextValue,
    pub duration: TextValue,
    pub start: LatLng,
    pub end: LatLng,
    pub path: LineString<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub location: LatLng,
}

#[allow(async_fn_in_trait)]
pub trait PlaceSearch {
    async fn find_place(&self, query: &str) -> Result<Place, MapsError>;
}

#[allow(async_fn_in_trait)]
pub trait DistanceMatrix {
    /// Walking distances from `origin` to each destination, in destination order.
    async fn walking_distances(
        &self,
        origin: LatLng,
        destinations: &[LatLng],
    ) -> Result<Vec<MatrixElement>, MapsError>;
}

#[allow(async_fn_in_trait)]
pub trait Directions {
    async fn walking_route(
        &self,
        origin: LatLng,
        destination: LatLng,
    ) -> Result<WalkingRoute, MapsError>;
}

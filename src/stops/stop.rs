use serde::Serialize;

use crate::geo::LatLng;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub name: String,
    pub location: LatLng,
}

impl Stop {
    pub fn new(name: String, location: LatLng) -> Self {
        Self { name, location }
    }
}

/// A stop paired with its straight-line distance from the search origin.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub stop: &'a Stop,
    pub distance_km: f64,
}

use std::fmt;

use geo_types::Point;
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Formats as `lat,lng`, the form every Maps web service and deep link expects.
impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl From<LatLng> for Point {
    fn from(value: LatLng) -> Self {
        Point::new(value.lng, value.lat)
    }
}

impl From<Point> for LatLng {
    fn from(value: Point) -> Self {
        LatLng::new(value.y(), value.x())
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const MALAGA: LatLng = LatLng {
        lat: 36.72016,
        lng: -4.42034,
    };
    const TORREMOLINOS: LatLng = LatLng {
        lat: 36.62035,
        lng: -4.49976,
    };

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(haversine_km(MALAGA, MALAGA), 0.0);
        assert_eq!(haversine_km(TORREMOLINOS, TORREMOLINOS), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_km(MALAGA, TORREMOLINOS);
        let back = haversine_km(TORREMOLINOS, MALAGA);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn matches_known_distance() {
        // Roughly 13 km between the two town centres.
        let d = haversine_km(MALAGA, TORREMOLINOS);
        assert!((12.5..13.5).contains(&d), "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_km(LatLng::new(0.0, 0.0), LatLng::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn display_is_lat_comma_lng() {
        assert_eq!(LatLng::new(36.5, -4.25).to_string(), "36.5,-4.25");
    }

    #[test]
    fn point_conversion_swaps_axes() {
        let point: Point = MALAGA.into();
        assert_eq!(point.x(), MALAGA.lng);
        assert_eq!(point.y(), MALAGA.lat);
        assert_eq!(LatLng::from(point), MALAGA);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(MALAGA.is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::NAN).is_valid());
    }
}

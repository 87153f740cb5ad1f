use geo_types::LineString;
use serde::Deserialize;

use super::{MapsError, MatrixElement, Place, TextValue, WalkingRoute};
use crate::geo::LatLng;

const OK: &str = "OK";
const ZERO_RESULTS: &str = "ZERO_RESULTS";
const POLYLINE_PRECISION: u32 = 5;

#[derive(Deserialize)]
pub(super) struct GoogleTextValue {
    pub(super) text: String,
    pub(super) value: u64,
}

impl From<GoogleTextValue> for TextValue {
    fn from(v: GoogleTextValue) -> Self {
        TextValue {
            text: v.text,
            value: v.value,
        }
    }
}

#[derive(Deserialize)]
pub(super) struct GoogleLatLng {
    pub(super) lat: f64,
    pub(super) lng: f64,
}

impl From<GoogleLatLng> for LatLng {
    fn from(v: GoogleLatLng) -> Self {
        LatLng::new(v.lat, v.lng)
    }
}

#[derive(Deserialize)]
pub(super) struct DistanceMatrixResponse {
    pub(super) status: String,
    pub(super) error_message: Option<String>,
    #[serde(default)]
    pub(super) rows: Vec<MatrixRow>,
}

#[derive(Deserialize)]
pub(super) struct MatrixRow {
    pub(super) elements: Vec<GoogleMatrixElement>,
}

#[derive(Deserialize)]
pub(super) struct GoogleMatrixElement {
    pub(super) status: String,
    pub(super) distance: Option<GoogleTextValue>,
    pub(super) duration: Option<GoogleTextValue>,
}

#[derive(Deserialize)]
pub(super) struct DirectionsResponse {
    pub(super) status: String,
    pub(super) error_message: Option<String>,
    #[serde(default)]
    pub(super) routes: Vec<GoogleRoute>,
}

#[derive(Deserialize)]
pub(super) struct GoogleRoute {
    pub(super) legs: Vec<GoogleLeg>,
    pub(super) overview_polyline: Option<EncodedPolyline>,
}

#[derive(Deserialize)]
pub(super) struct GoogleLeg {
    pub(super) distance: GoogleTextValue,
    pub(super) duration: GoogleTextValue,
    pub(super) start_location: GoogleLatLng,
    pub(super) end_location: GoogleLatLng,
}

#[derive(Deserialize)]
pub(super) struct EncodedPolyline {
    pub(super) points: String,
}

#[derive(Deserialize)]
pub(super) struct FindPlaceResponse {
    pub(super) status: String,
    pub(super) error_message: Option<String>,
    #[serde(default)]
    pub(super) candidates: Vec<PlaceCandidate>,
}

#[derive(Deserialize)]
pub(super) struct PlaceCandidate {
    pub(super) name: Option<String>,
    pub(super) geometry: Option<PlaceGeometry>,
}

#[derive(Deserialize)]
pub(super) struct PlaceGeometry {
    pub(super) location: GoogleLatLng,
}

fn check_status(status: String, error_message: Option<String>) -> Result<(), MapsError> {
    if status == OK {
        Ok(())
    } else {
        Err(MapsError::Status {
            status,
            message: error_message,
        })
    }
}

pub(super) fn parse_distance_matrix(
    resp: DistanceMatrixResponse,
    expected: usize,
) -> Result<Vec<MatrixElement>, MapsError> {
    check_status(resp.status, resp.error_message)?;

    let row = resp
        .rows
        .into_iter()
        .next()
        .ok_or_else(|| MapsError::Malformed("distance matrix has no rows".to_owned()))?;

    if row.elements.len() != expected {
        return Err(MapsError::Malformed(format!(
            "expected {expected} matrix elements, got {}",
            row.elements.len()
        )));
    }

    Ok(row
        .elements
        .into_iter()
        .map(|element| {
            if element.status != OK {
                return MatrixElement::default();
            }
            MatrixElement {
                distance: element.distance.map(TextValue::from),
                duration: element.duration.map(TextValue::from),
            }
        })
        .collect())
}

pub(super) fn parse_directions(resp: DirectionsResponse) -> Result<WalkingRoute, MapsError> {
    check_status(resp.status, resp.error_message)?;

    let route = resp
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| MapsError::Malformed("directions returned no routes".to_owned()))?;

    let path = match &route.overview_polyline {
        Some(encoded) => polyline::decode_polyline(&encoded.points, POLYLINE_PRECISION)
            .map_err(|e| MapsError::Malformed(format!("bad polyline: {e}")))?,
        None => LineString::new(Vec::new()),
    };

    let leg = route
        .legs
        .into_iter()
        .next()
        .ok_or_else(|| MapsError::Malformed("route has no legs".to_owned()))?;

    Ok(WalkingRoute {
        distance: leg.distance.into(),
        duration: leg.duration.into(),
        start: leg.start_location.into(),
        end: leg.end_location.into(),
        path,
    })
}

pub(super) fn parse_find_place(resp: FindPlaceResponse, query: &str) -> Result<Place, MapsError> {
    if resp.status == ZERO_RESULTS {
        return Err(MapsError::NoPlace(query.to_owned()));
    }
    check_status(resp.status, resp.error_message)?;

    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| MapsError::NoPlace(query.to_owned()))?;

    let geometry = candidate
        .geometry
        .ok_or_else(|| MapsError::NoPlace(query.to_owned()))?;

    Ok(Place {
        name: candidate.name.unwrap_or_else(|| query.to_owned()),
        location: geometry.location.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(json: &str) -> DistanceMatrixResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn distance_matrix_keeps_element_order() {
        let resp = matrix(
            r#"{
                "status": "OK",
                "origin_addresses": ["Calle Larios"],
                "destination_addresses": ["A", "B", "C"],
                "rows": [{ "elements": [
                    { "status": "OK", "distance": { "text": "1,2 km", "value": 1210 }, "duration": { "text": "16 min", "value": 960 } },
                    { "status": "ZERO_RESULTS" },
                    { "status": "OK", "distance": { "text": "350 m", "value": 350 }, "duration": { "text": "5 min", "value": 290 } }
                ]}]
            }"#,
        );

        let elements = parse_distance_matrix(resp, 3).unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].distance.as_ref().map(|d| d.value), Some(1210));
        assert_eq!(elements[1], MatrixElement::default());
        assert_eq!(elements[2].duration.as_ref().map(|d| d.text.as_str()), Some("5 min"));
    }

    #[test]
    fn distance_matrix_status_is_an_error() {
        let resp = matrix(
            r#"{ "status": "OVER_QUERY_LIMIT", "error_message": "slow down", "rows": [] }"#,
        );

        match parse_distance_matrix(resp, 1) {
            Err(MapsError::Status { status, message }) => {
                assert_eq!(status, "OVER_QUERY_LIMIT");
                assert_eq!(message.as_deref(), Some("slow down"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn distance_matrix_with_wrong_width_is_malformed() {
        let resp = matrix(
            r#"{ "status": "OK", "rows": [{ "elements": [{ "status": "NOT_FOUND" }] }] }"#,
        );
        assert!(matches!(
            parse_distance_matrix(resp, 2),
            Err(MapsError::Malformed(_))
        ));
    }

    #[test]
    fn directions_take_first_leg_verbatim() {
        let resp: DirectionsResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "routes": [{
                    "summary": "Calle Larios",
                    "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" },
                    "legs": [{
                        "distance": { "text": "0,4 km", "value": 412 },
                        "duration": { "text": "6 min", "value": 355 },
                        "start_location": { "lat": 36.7195, "lng": -4.4211 },
                        "end_location": { "lat": 36.7201, "lng": -4.4203 }
                    }]
                }]
            }"#,
        )
        .unwrap();

        let route = parse_directions(resp).unwrap();
        assert_eq!(route.distance.text, "0,4 km");
        assert_eq!(route.duration.text, "6 min");
        assert_eq!(route.start, LatLng::new(36.7195, -4.4211));
        assert_eq!(route.end, LatLng::new(36.7201, -4.4203));

        // The reference polyline from the encoding documentation.
        let coords: Vec<_> = route.path.coords().map(|c| (c.y, c.x)).collect();
        assert_eq!(coords.len(), 3);
        assert!((coords[0].0 - 38.5).abs() < 1e-9 && (coords[0].1 + 120.2).abs() < 1e-9);
        assert!((coords[2].0 - 43.252).abs() < 1e-9 && (coords[2].1 + 126.453).abs() < 1e-9);
    }

    #[test]
    fn directions_without_routes_is_malformed() {
        let resp: DirectionsResponse =
            serde_json::from_str(r#"{ "status": "OK", "routes": [] }"#).unwrap();
        assert!(matches!(parse_directions(resp), Err(MapsError::Malformed(_))));
    }

    #[test]
    fn directions_not_found_is_status_error() {
        let resp: DirectionsResponse =
            serde_json::from_str(r#"{ "status": "NOT_FOUND", "routes": [] }"#).unwrap();
        assert!(matches!(
            parse_directions(resp),
            Err(MapsError::Status { .. })
        ));
    }

    #[test]
    fn find_place_returns_first_candidate() {
        let resp: FindPlaceResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "candidates": [{
                    "name": "Hotel Molina Lario",
                    "geometry": { "location": { "lat": 36.7198, "lng": -4.4197 } }
                }]
            }"#,
        )
        .unwrap();

        let place = parse_find_place(resp, "molina lario").unwrap();
        assert_eq!(place.name, "Hotel Molina Lario");
        assert_eq!(place.location, LatLng::new(36.7198, -4.4197));
    }

    #[test]
    fn find_place_without_geometry_is_no_place() {
        let resp: FindPlaceResponse = serde_json::from_str(
            r#"{ "status": "OK", "candidates": [{ "name": "Somewhere" }] }"#,
        )
        .unwrap();
        assert!(matches!(
            parse_find_place(resp, "somewhere"),
            Err(MapsError::NoPlace(_))
        ));
    }

    #[test]
    fn find_place_zero_results_is_no_place() {
        let resp: FindPlaceResponse =
            serde_json::from_str(r#"{ "status": "ZERO_RESULTS", "candidates": [] }"#).unwrap();
        match parse_find_place(resp, "atlantis") {
            Err(MapsError::NoPlace(query)) => assert_eq!(query, "atlantis"),
            other => panic!("unexpected {other:?}"),
        }
    }
}

use std::fmt;

use clap::ValueEnum;
use geo_types::Point;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use serde::{Deserialize, Serialize};

use crate::{geo::LatLng, resolver::Resolution};

const NAVIGATION_BASE: &str = "https://www.google.com/maps/dir/?api=1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

struct Labels {
    nearest_stop: &'static str,
    distance: &'static str,
    walking_time: &'static str,
}

impl Language {
    fn labels(self) -> Labels {
        match self {
            Language::Es => Labels {
                nearest_stop: "Parada más cercana",
                distance: "Distancia",
                walking_time: "Tiempo estimado caminando",
            },
            Language::En => Labels {
                nearest_stop: "Nearest stop",
                distance: "Distance",
                walking_time: "Estimated walking time",
            },
        }
    }
}

/// The nearest stop summary. Distance and duration are the directions
/// service's own text, untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoPanel {
    pub stop_name: String,
    pub distance: String,
    pub duration: String,
}

impl InfoPanel {
    pub fn new(resolution: &Resolution) -> Self {
        Self {
            stop_name: resolution.nearest.stop.name.clone(),
            distance: resolution.route.distance.text.clone(),
            duration: resolution.route.duration.text.clone(),
        }
    }

    pub fn render(&self, language: Language) -> String {
        let labels = language.labels();
        format!(
            "{}: {}\n{}: {}\n{}: {}",
            labels.nearest_stop,
            self.stop_name,
            labels.distance,
            self.distance,
            labels.walking_time,
            self.duration
        )
    }
}

impl fmt::Display for InfoPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Language::default()))
    }
}

/// Deep link that opens walking navigation in Google Maps.
pub fn navigation_url(origin: LatLng, destination: LatLng) -> String {
    format!("{NAVIGATION_BASE}&origin={origin}&destination={destination}&travelmode=walking")
}

fn properties(pairs: impl IntoIterator<Item = (&'static str, JsonValue)>) -> JsonObject {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Origin, nearest stop and walking path as a FeatureCollection ready to drop
/// onto a map. The two markers sit where the directions service snapped the
/// leg ends.
pub fn route_feature_collection(resolution: &Resolution) -> FeatureCollection {
    let nearest = &resolution.nearest;
    let route = &resolution.route;

    let origin = feature(
        Geometry::new(Value::from(&Point::from(route.start))),
        properties([("role", JsonValue::from("origin"))]),
    );

    let stop = feature(
        Geometry::new(Value::from(&Point::from(route.end))),
        properties([
            ("role", JsonValue::from("stop")),
            ("name", JsonValue::from(nearest.stop.name.clone())),
            ("distance_m", JsonValue::from(nearest.distance.value)),
        ]),
    );

    let path = feature(
        Geometry::new(Value::from(&route.path)),
        properties([
            ("role", JsonValue::from("route")),
            ("distance", JsonValue::from(route.distance.text.clone())),
            ("duration", JsonValue::from(route.duration.text.clone())),
        ]),
    );

    FeatureCollection {
        bbox: None,
        features: vec![origin, stop, path],
        foreign_members: None,
    }
}

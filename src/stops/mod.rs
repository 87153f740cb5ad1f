pub mod stop;

use std::path::Path;

use anyhow::{anyhow, Context};
use geojson::{Feature, GeoJson, Value};
use tracing::{info, warn};

use crate::{geo::LatLng, stops::stop::Stop};

const NAME_PROPERTY: &str = "Name";

/// The immutable stop dataset, loaded once per session.
#[derive(Debug, Default)]
pub struct StopSet {
    pub stops: Vec<Stop>,
}

impl StopSet {
    pub fn read<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stop dataset {}", path.display()))?;

        let set = Self::from_geojson_str(&contents)
            .with_context(|| format!("Invalid stop dataset {}", path.display()))?;
        info!(path = %path.display(), stops = set.len(), "loaded stop dataset");

        Ok(set)
    }

    pub fn from_geojson_str(s: &str) -> anyhow::Result<Self> {
        let geojson = s.parse::<GeoJson>().context("Not valid GeoJSON")?;

        let collection = match geojson {
            GeoJson::FeatureCollection(collection) => collection,
            _ => return Err(anyhow!("Stop dataset must be a FeatureCollection")),
        };

        let stops = collection
            .features
            .iter()
            .enumerate()
            .filter_map(|(idx, feature)| match parse_feature(feature) {
                Ok(stop) => Some(stop),
                Err(e) => {
                    warn!(feature = idx, "skipping stop: {e}");
                    None
                }
            })
            .collect();

        Ok(Self { stops })
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

fn parse_feature(feature: &Feature) -> anyhow::Result<Stop> {
    let geometry = feature.geometry.as_ref().context("Feature has no geometry")?;

    let location = match &geometry.value {
        Value::Point(position) if position.len() >= 2 => LatLng::new(position[1], position[0]),
        _ => return Err(anyhow!("Geometry is not a point")),
    };

    if !location.is_valid() {
        return Err(anyhow!("Coordinates out of range: {location}"));
    }

    let name = feature
        .property(NAME_PROPERTY)
        .and_then(|v| v.as_str())
        .context("Feature has no Name property")?
        .to_owned();

    Ok(Stop::new(name, location))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const DATASET: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-4.4203, 36.7201] },
                "properties": { "Name": "Alameda Principal" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-4.4995, 36.6203] },
                "properties": { "Name": "Torremolinos Centro" }
            }
        ]
    }"#;

    #[test]
    fn parses_points_as_lng_lat() {
        let set = StopSet::from_geojson_str(DATASET).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.stops[0].name, "Alameda Principal");
        assert_eq!(set.stops[0].location, LatLng::new(36.7201, -4.4203));
        assert_eq!(set.stops[1].name, "Torremolinos Centro");
    }

    #[test]
    fn skips_unusable_features() {
        let dataset = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] },
                    "properties": { "Name": "Not a stop" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-4.42, 36.72] },
                    "properties": { "Other": "no name" }
                },
                {
                    "type": "Feature",
                    "geometry": null,
                    "properties": { "Name": "Nowhere" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-4.42, 36.72] },
                    "properties": { "Name": "Kept" }
                }
            ]
        }"#;

        let set = StopSet::from_geojson_str(dataset).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.stops[0].name, "Kept");
    }

    #[test]
    fn empty_collection_loads_as_empty() {
        let set =
            StopSet::from_geojson_str(r#"{ "type": "FeatureCollection", "features": [] }"#)
                .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn rejects_non_collections() {
        let single = r#"{ "type": "Point", "coordinates": [-4.42, 36.72] }"#;
        assert!(StopSet::from_geojson_str(single).is_err());
        assert!(StopSet::from_geojson_str("not json").is_err());
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATASET.as_bytes()).unwrap();

        let set = StopSet::read(file.path()).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StopSet::read(dir.path().join("stops.geojson")).is_err());
    }
}

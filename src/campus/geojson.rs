// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::Position;

/// Minimal model of a [GeoJSON](https://geojson.org/) FeatureCollection.
///
/// Features are kept as raw JSON and interpreted one by one with
/// [BuildingFeature::from], so that a single malformed feature
/// doesn't prevent reading the whole collection.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Value>,
}

/// A building footprint record, as consumed by
/// [CampusGraph::load](super::CampusGraph::load).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildingFeature {
    /// Kind of the map feature, only "college" features are buildings.
    pub kind: Option<String>,

    pub name: Option<String>,

    /// Short code of the building, e.g. "A".
    pub reference: Option<String>,

    pub geometry_type: Option<String>,

    /// Vertices of the outer ring, as (lon, lat) positions.
    /// `None` if the coordinates couldn't be parsed.
    pub vertices: Option<Vec<Position>>,
}

impl From<&Value> for BuildingFeature {
    /// Picks the building fields out of a GeoJSON Feature.
    /// Fields of unexpected types are left as `None`.
    fn from(feature: &Value) -> Self {
        let properties = feature.get("properties").and_then(Value::as_object);
        let prop = |key: &str| properties.and_then(|p| property(p, key));
        let geometry = feature.get("geometry").filter(|g| g.is_object());

        Self {
            kind: prop("building"),
            name: prop("name"),
            reference: prop("ref"),
            geometry_type: geometry
                .and_then(|g| g.get("type"))
                .and_then(Value::as_str)
                .map(str::to_string),
            vertices: geometry
                .and_then(|g| g.get("coordinates"))
                .and_then(outer_ring),
        }
    }
}

impl FeatureCollection {
    /// Converts all features into [BuildingFeature] records.
    pub fn building_features(&self) -> impl Iterator<Item = BuildingFeature> + '_ {
        self.features.iter().map(BuildingFeature::from)
    }
}

/// Returns a string or numeric property as a string.
fn property(properties: &Map<String, Value>, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses the outer ring of Polygon coordinates (`[[[lon, lat], ...], ...]`).
fn outer_ring(coordinates: &Value) -> Option<Vec<Position>> {
    coordinates
        .as_array()?
        .first()?
        .as_array()?
        .iter()
        .map(|vertex| match vertex.as_array()?.as_slice() {
            [lon, lat, ..] => Some(Position::new(lon.as_f64()?, lat.as_f64()?)),
            _ => None,
        })
        .collect()
}

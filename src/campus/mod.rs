// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Routing between campus buildings.

use std::time::Duration;

use serde::Serialize;

use crate::proximity::{self, Uniform};
use crate::{
    centroid, find_route, Graph, Haversine, Node, Position, RouteError, DEFAULT_STEP_LIMIT,
};

mod document;
mod geojson;

pub use document::{BuildingRecord, CampusDocument, CampusSummary, EdgeRecord};
pub use geojson::{BuildingFeature, FeatureCollection};

/// Default maximum distance between centroids of linked buildings, in meters.
pub const DEFAULT_MAX_DISTANCE: f64 = 250.0;

/// Average walking speed, in meters per second.
pub const WALKING_SPEED: f64 = 1.4;

/// Value of the `building` tag which marks actual buildings among map features.
pub const BUILDING_KIND: &str = "college";

/// Details of a campus building, used as the `kind` of campus graph [Nodes](Node).
///
/// The node id is derived from the reference with [normalize_id],
/// and the node position is the [centroid] of the footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub name: String,
    pub reference: String,

    /// Outer ring of the building outline, as (lon, lat) positions.
    /// Kept for presentation only, routing uses the node position.
    pub footprint: Vec<Position>,
}

/// Turns a building reference into a node id: "Lab 2" → "lab_2".
pub fn normalize_id(reference: &str) -> String {
    reference.trim().to_lowercase().replace(' ', "_")
}

/// Graph of campus buildings, linked when their centroids are close enough,
/// with routes measured in meters.
#[derive(Debug, Clone)]
pub struct CampusGraph {
    graph: Graph<Building, Haversine>,
    step_limit: usize,
}

impl Default for CampusGraph {
    fn default() -> Self {
        Self {
            graph: Graph::default(),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl CampusGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of buildings expanded by a single route search.
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Returns the underlying graph.
    pub fn graph(&self) -> &Graph<Building, Haversine> {
        &self.graph
    }

    /// Returns the number of buildings.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Returns an iterator over all buildings, in the order they were loaded.
    pub fn buildings(&self) -> impl Iterator<Item = &Node<Building>> {
        self.graph.iter()
    }

    /// Retrieves a building by its id.
    pub fn get_building(&self, id: &str) -> Option<&Node<Building>> {
        self.graph.get_node(id)
    }

    /// Adds buildings from footprint records.
    ///
    /// Records which aren't buildings (see [BUILDING_KIND]) are ignored.
    /// Invalid building records are logged and skipped, as are buildings
    /// with an id which was already loaded. Returns the number of added buildings.
    pub fn load<I: IntoIterator<Item = BuildingFeature>>(&mut self, features: I) -> usize {
        let mut loaded = 0;

        for f in features {
            match self.add_feature(f) {
                Ok(true) => loaded += 1,
                Ok(false) => {}
                Err(e) => log::warn!("skipping building: {e}"),
            }
        }

        log::info!("loaded {loaded} buildings");
        loaded
    }

    /// Adds buildings from a GeoJSON FeatureCollection, see [CampusGraph::load].
    pub fn load_geojson(&mut self, collection: &FeatureCollection) -> usize {
        self.load(collection.building_features())
    }

    fn add_feature(&mut self, f: BuildingFeature) -> Result<bool, InvalidBuilding> {
        if f.kind.as_deref() != Some(BUILDING_KIND) {
            return Ok(false);
        }

        let (name, reference) = match (f.name, f.reference) {
            (Some(name), Some(reference)) => (name, reference),
            (Some(name), None) => (name.clone(), name),
            (None, Some(reference)) => (reference.clone(), reference),
            (None, None) => return Err(InvalidBuilding::Untagged),
        };

        let geometry_type = f.geometry_type.unwrap_or_default();
        if geometry_type != "Polygon" {
            return Err(InvalidBuilding::UnsupportedGeometry(reference, geometry_type));
        }

        let footprint = f
            .vertices
            .filter(|v| v.iter().all(is_valid_lon_lat))
            .ok_or_else(|| InvalidBuilding::InvalidCoordinates(reference.clone()))?;

        let position =
            centroid(&footprint).ok_or_else(|| InvalidBuilding::EmptyFootprint(reference.clone()))?;

        let id = normalize_id(&reference);
        let node = Node::new(
            id.clone(),
            position,
            Building {
                name,
                reference,
                footprint,
            },
        );

        self.graph
            .insert_node(node)
            .map(|_| true)
            .ok_or(InvalidBuilding::DuplicateId(id))
    }

    /// Links all pairs of buildings whose centroids are at most
    /// `max_distance_meters` apart. Returns the number of created links.
    pub fn connect_nearby(&mut self, max_distance_meters: f64) -> usize {
        let created = proximity::connect_nearby(&mut self.graph, max_distance_meters, &Uniform);
        log::info!("linked {created} pairs of buildings within {max_distance_meters} m");
        created
    }

    /// Links two buildings regardless of their distance.
    /// Buildings are identified as in [CampusGraph::resolve_reference].
    ///
    /// Returns `Ok(false)` if the buildings were already linked.
    pub fn connect_manual(&mut self, a: &str, b: &str) -> Result<bool, RouteError> {
        let a_id = self.resolve_owned(a)?;
        let b_id = self.resolve_owned(b)?;
        self.graph.connect(&a_id, &b_id)
    }

    fn resolve_owned(&self, reference: &str) -> Result<String, RouteError> {
        self.resolve_reference(reference)
            .map(str::to_string)
            .ok_or_else(|| RouteError::Unresolved(reference.to_string()))
    }

    /// Maps free-form text to a building id, trying in order:
    /// 1. an exact id match (also after [normalize_id]),
    /// 2. a case-insensitive match of the reference,
    /// 3. a case-insensitive substring of the name.
    ///
    /// If several buildings match at the same step, the one loaded first wins.
    pub fn resolve_reference(&self, text: &str) -> Option<&str> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.graph
            .get_node(&needle)
            .or_else(|| self.graph.get_node(&normalize_id(&needle)))
            .or_else(|| {
                self.graph
                    .iter()
                    .find(|n| n.kind.reference.to_lowercase() == needle)
            })
            .or_else(|| {
                self.graph
                    .iter()
                    .find(|n| n.kind.name.to_lowercase().contains(&needle))
            })
            .map(|n| n.id.as_str())
    }

    /// Finds the shortest route between two buildings,
    /// identified as in [CampusGraph::resolve_reference].
    pub fn route(&self, origin: &str, destination: &str) -> Result<CampusRoute, RouteError> {
        let from = self
            .resolve_reference(origin)
            .ok_or_else(|| RouteError::Unresolved(origin.to_string()))?;
        let to = self
            .resolve_reference(destination)
            .ok_or_else(|| RouteError::Unresolved(destination.to_string()))?;

        let path = find_route(&self.graph, from, to, self.step_limit)
            .map_err(|e| RouteError::from_search(e, from, to))?;

        if path.is_empty() {
            log::debug!("no route between buildings {from} and {to}");
            return Err(RouteError::NoRoute {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let route = CampusRoute {
            total_distance_meters: self.graph.path_cost(&path),
            path: path.into_iter().map(BuildingSummary::from).collect(),
        };
        log::debug!(
            "route {from} → {to}: {} buildings, {:.1} m",
            route.path.len(),
            route.total_distance_meters
        );
        Ok(route)
    }
}

fn is_valid_lon_lat(p: &Position) -> bool {
    p.is_finite() && (-180.0..=180.0).contains(&p.x) && (-90.0..=90.0).contains(&p.y)
}

#[derive(Debug)]
enum InvalidBuilding {
    Untagged,
    UnsupportedGeometry(String, String),
    InvalidCoordinates(String),
    EmptyFootprint(String),
    DuplicateId(String),
}

impl std::fmt::Display for InvalidBuilding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Untagged => write!(f, "building without a name or reference"),
            Self::UnsupportedGeometry(reference, type_) => {
                write!(f, "{reference}: unsupported geometry type {type_:?}")
            }
            Self::InvalidCoordinates(reference) => write!(f, "{reference}: invalid coordinates"),
            Self::EmptyFootprint(reference) => write!(f, "{reference}: empty footprint"),
            Self::DuplicateId(id) => write!(f, "duplicate building id {id}"),
        }
    }
}

impl std::error::Error for InvalidBuilding {}

/// Presentation of a building on a [CampusRoute].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSummary {
    pub id: String,
    pub name: String,
    pub reference: String,
    pub centroid: Position,
}

impl From<&Node<Building>> for BuildingSummary {
    fn from(n: &Node<Building>) -> Self {
        Self {
            id: n.id.clone(),
            name: n.kind.name.clone(),
            reference: n.kind.reference.clone(),
            centroid: n.position,
        }
    }
}

/// Route between two buildings, from the origin to the destination (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusRoute {
    pub path: Vec<BuildingSummary>,
    pub total_distance_meters: f64,
}

impl CampusRoute {
    /// Time needed to walk the route at [WALKING_SPEED].
    pub fn estimated_walking_time(&self) -> Duration {
        Duration::from_secs_f64(self.total_distance_meters / WALKING_SPEED)
    }

    /// Human-readable directions, one per building on the route.
    pub fn instructions(&self) -> Vec<String> {
        match self.path.as_slice() {
            [] => vec![],
            [only] => vec![format!("You are already at {}", only.name)],
            [first, middle @ .., last] => std::iter::once(format!("Start at {}", first.name))
                .chain(middle.iter().map(|b| format!("Continue to {}", b.name)))
                .chain(std::iter::once(format!("Arrive at {}", last.name)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{read_json_from_buffer, FileFormat};
    use crate::Metric;

    const CAMPUS: &[u8] = include_bytes!("test_fixtures/campus.geojson");
    const CAMPUS_GZ: &[u8] = include_bytes!("test_fixtures/campus.geojson.gz");

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b) as f64).abs() < 1e-6,
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    fn load_campus(data: &[u8], format: FileFormat) -> CampusGraph {
        let collection: FeatureCollection = read_json_from_buffer(data, format).unwrap();
        let mut g = CampusGraph::new();
        g.load_geojson(&collection);
        g
    }

    fn campus() -> CampusGraph {
        let mut g = load_campus(CAMPUS, FileFormat::Json);
        g.connect_nearby(DEFAULT_MAX_DISTANCE);
        g
    }

    fn distance(g: &CampusGraph, a: &str, b: &str) -> f64 {
        Haversine::distance(
            g.get_building(a).unwrap().position,
            g.get_building(b).unwrap().position,
        )
    }

    fn route_refs(route: &CampusRoute) -> Vec<&str> {
        route.path.iter().map(|b| b.reference.as_str()).collect()
    }

    #[test]
    fn load_skips_invalid_features() {
        let g = load_campus(CAMPUS, FileFormat::Json);

        let ids: Vec<_> = g.buildings().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "l", "lab_2", "gymnasium"]);

        let gym = g.get_building("gymnasium").unwrap();
        assert_eq!(gym.kind.name, "Gymnasium");
        assert_eq!(gym.kind.reference, "Gymnasium");
        assert_eq!(gym.kind.footprint.len(), 5);
        assert_eq!(gym.position, centroid(&gym.kind.footprint).unwrap());
    }

    #[test]
    fn malformed_features_do_not_drop_collection() {
        // The fixture ends with features with a null geometry type,
        // non-object properties and geometry, and a bare string
        let collection: FeatureCollection =
            read_json_from_buffer(CAMPUS, FileFormat::Json).unwrap();
        assert_eq!(collection.features.len(), 17);

        let mut g = CampusGraph::new();
        assert_eq!(g.load_geojson(&collection), 6);
        assert!(g.get_building("t").is_none());
        assert!(g.get_building("q").is_none());
    }

    #[test]
    fn load_gzipped() {
        let plain = load_campus(CAMPUS, FileFormat::Json);
        let gz = load_campus(CAMPUS_GZ, FileFormat::Unknown);
        assert_eq!(plain.graph(), gz.graph());
    }

    #[test]
    fn load_skips_duplicates() {
        let building = |name: &str, lon: f64| BuildingFeature {
            kind: Some(BUILDING_KIND.to_string()),
            name: Some(name.to_string()),
            reference: Some("Lab 2".to_string()),
            geometry_type: Some("Polygon".to_string()),
            vertices: Some(vec![Position::new(lon, 10.0)]),
        };

        let mut g = CampusGraph::new();
        assert_eq!(g.load([building("first", 1.0), building("second", 2.0)]), 1);
        assert_eq!(g.get_building("lab_2").unwrap().kind.name, "first");
    }

    #[test]
    fn load_rejects_out_of_range_coordinates() {
        let mut g = CampusGraph::new();
        let loaded = g.load([BuildingFeature {
            kind: Some(BUILDING_KIND.to_string()),
            reference: Some("Z".to_string()),
            geometry_type: Some("Polygon".to_string()),
            vertices: Some(vec![Position::new(10.0, 95.0)]),
            ..Default::default()
        }]);
        assert_eq!(loaded, 0);
        assert!(g.is_empty());
    }

    #[test]
    fn nearby_buildings_are_linked() {
        let g = campus();

        // A-B and B-C are ~150 m apart, A-C ~287 m, everything else is kilometers away
        assert!(distance(&g, "a", "b") < DEFAULT_MAX_DISTANCE);
        assert!(distance(&g, "b", "c") < DEFAULT_MAX_DISTANCE);
        assert!(distance(&g, "a", "c") > DEFAULT_MAX_DISTANCE);

        let edges: Vec<_> = g
            .graph()
            .edges()
            .map(|(a, b, _)| (a.id.as_str(), b.id.as_str()))
            .collect();
        assert_eq!(edges, vec![("a", "b"), ("b", "c")]);

        for (a, b, cost) in g.graph().edges() {
            assert_almost_eq!(cost, Haversine::distance(a.position, b.position));
        }
    }

    #[test]
    fn route_through_intermediate_building() {
        let g = campus();
        let route = g.route("A", "C").unwrap();

        assert_eq!(route_refs(&route), vec!["A", "B", "C"]);
        assert_almost_eq!(
            route.total_distance_meters,
            distance(&g, "a", "b") + distance(&g, "b", "c")
        );
        assert!(route.total_distance_meters > distance(&g, "a", "c"));
        assert_eq!(route.path[1].name, "Building B");
        assert_eq!(route.path[1].centroid, g.get_building("b").unwrap().position);

        let back = g.route("c", "a").unwrap();
        assert_eq!(route_refs(&back), vec!["C", "B", "A"]);
        assert_almost_eq!(back.total_distance_meters, route.total_distance_meters);
    }

    #[test]
    fn route_to_itself() {
        let g = campus();
        let route = g.route("Building B", "b").unwrap();
        assert_eq!(route_refs(&route), vec!["B"]);
        assert_eq!(route.total_distance_meters, 0.0);
        assert_eq!(route.instructions(), vec!["You are already at Building B"]);
    }

    #[test]
    fn route_between_distant_buildings() {
        let g = campus();
        assert_eq!(
            g.route("A", "L"),
            Err(RouteError::NoRoute {
                from: "a".to_string(),
                to: "l".to_string()
            })
        );
        assert_eq!(
            g.route("A", "Atlantis"),
            Err(RouteError::Unresolved("Atlantis".to_string()))
        );
    }

    #[test]
    fn step_limit_is_reported() {
        let g = campus().with_step_limit(1);
        assert_eq!(
            g.route("A", "C"),
            Err(RouteError::StepLimitExceeded {
                from: "a".to_string(),
                to: "c".to_string()
            })
        );
    }

    #[test]
    fn manual_links() {
        let mut g = campus();

        assert_eq!(g.connect_manual("Central Library", "lab 2"), Ok(true));
        assert_eq!(g.connect_manual("L", "Lab 2"), Ok(false));
        assert_eq!(g.connect_manual("lab_2", "l"), Ok(false));
        assert_eq!(g.graph().get_edges("l").len(), 1);
        assert_eq!(g.graph().edge_count(), 3);

        assert_eq!(
            g.connect_manual("L", "Atlantis"),
            Err(RouteError::Unresolved("Atlantis".to_string()))
        );

        let route = g.route("L", "Lab 2").unwrap();
        assert_eq!(route_refs(&route), vec!["L", "Lab 2"]);
        assert_almost_eq!(route.total_distance_meters, distance(&g, "l", "lab_2"));
    }

    #[test]
    fn resolve_reference() {
        let g = campus();

        assert_eq!(g.resolve_reference("a"), Some("a"));
        assert_eq!(g.resolve_reference("  B "), Some("b"));
        assert_eq!(g.resolve_reference("lab_2"), Some("lab_2"));
        assert_eq!(g.resolve_reference("Lab 2"), Some("lab_2"));
        assert_eq!(g.resolve_reference("science"), Some("c"));
        assert_eq!(g.resolve_reference("LIBRARY"), Some("l"));

        // Ambiguous substrings resolve to the first loaded building
        assert_eq!(g.resolve_reference("building"), Some("a"));
        assert_eq!(g.resolve_reference("center"), Some("c"));

        assert_eq!(g.resolve_reference("atlantis"), None);
        assert_eq!(g.resolve_reference(""), None);
        assert_eq!(g.resolve_reference("   "), None);
    }

    #[test]
    fn instructions_and_walking_time() {
        let g = campus();
        let route = g.route("A", "C").unwrap();

        assert_eq!(
            route.instructions(),
            vec![
                "Start at Building A",
                "Continue to Building B",
                "Arrive at Science Center"
            ]
        );

        let secs = route.estimated_walking_time().as_secs_f64();
        assert_almost_eq!(secs * WALKING_SPEED, route.total_distance_meters);
    }

    #[test]
    fn route_serialization() {
        let g = campus();
        let route = g.route("A", "B").unwrap();
        let json = serde_json::to_value(&route).unwrap();

        assert_eq!(json["path"][0]["id"], "a");
        assert_eq!(json["path"][1]["reference"], "B");
        assert!(json["path"][1]["centroid"].is_array());
        assert!(json["totalDistanceMeters"].as_f64().unwrap() > 100.0);
    }
}

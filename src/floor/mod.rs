// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Routing inside a single building floor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::proximity;
use crate::{find_route, Euclidean, Graph, Node, Position, RouteError, DEFAULT_STEP_LIMIT};

mod document;
mod profile;

pub use document::{EdgeRecord, FloorDocument, NodeRecord};
pub use profile::{Factor, FloorProfile, WALKING_PROFILE};

/// Default maximum distance between linked floor nodes, in floor-plan pixels.
pub const DEFAULT_FLOOR_MAX_DISTANCE: f64 = 150.0;

/// Type of a point on a floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Waypoint on a corridor
    Corridor,

    /// Entrance to a room
    Door,

    /// Exit from the building
    Exit,

    /// Center of a room, reachable through its doors
    RoomCenter,
}

impl NodeKind {
    /// Infers the kind of a node from the prefix of its id,
    /// e.g. "Door_1014_1" → [NodeKind::Door].
    pub fn from_id(id: &str) -> Option<Self> {
        if id.starts_with("Node_") {
            Some(Self::Corridor)
        } else if id.starts_with("Door_") {
            Some(Self::Door)
        } else if id.starts_with("Exit_") || id.starts_with("Entrance_") {
            Some(Self::Exit)
        } else if id.starts_with("Room_") {
            Some(Self::RoomCenter)
        } else {
            None
        }
    }
}

/// Kind of floor graph [Nodes](Node).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub kind: NodeKind,

    /// Room the node belongs to, e.g. "Room_1014".
    /// Set for doors and room centers only.
    pub room: Option<String>,
}

/// Graph of a single building floor, with routes measured in floor-plan pixels.
#[derive(Debug, Clone)]
pub struct FloorGraph {
    floor: String,
    graph: Graph<Place, Euclidean>,
    step_limit: usize,
}

impl FloorGraph {
    pub fn new<S: Into<String>>(floor: S) -> Self {
        Self {
            floor: floor.into(),
            graph: Graph::default(),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Sets the maximum number of nodes expanded by a single route search.
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Name of the floor, e.g. "A1".
    pub fn floor(&self) -> &str {
        &self.floor
    }

    /// Returns the underlying graph.
    pub fn graph(&self) -> &Graph<Place, Euclidean> {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Adds a node to the floor.
    ///
    /// Room centers without an explicit room belong to the room named by their own id.
    /// Returns false (and logs a warning) if the position is not finite
    /// or a node with the same id already exists.
    pub fn add_node<S: Into<String>>(
        &mut self,
        id: S,
        position: Position,
        kind: NodeKind,
        room: Option<String>,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> bool {
        let id = id.into();
        if !position.is_finite() {
            log::warn!("floor {}: skipping node {id}: invalid position", self.floor);
            return false;
        }

        let room = match (kind, room) {
            (NodeKind::RoomCenter, None) => Some(id.clone()),
            (_, room) => room,
        };

        let mut node = Node::new(id, position, Place { kind, room });
        node.metadata = metadata;

        let id = node.id.clone();
        let added = self.graph.insert_node(node).is_some();
        if !added {
            log::warn!("floor {}: skipping node {id}: duplicate id", self.floor);
        }
        added
    }

    /// Links all pairs of nodes allowed by the profile, see [proximity::connect_nearby].
    /// Returns the number of created links.
    pub fn connect_nearby(&mut self, max_distance: f64, profile: &FloorProfile) -> usize {
        let created = proximity::connect_nearby(&mut self.graph, max_distance, profile);
        log::info!(
            "floor {}: linked {created} pairs of nodes with the {} profile",
            self.floor,
            profile.name
        );
        created
    }

    /// Links two nodes with given ids, regardless of their distance.
    ///
    /// Returns `Ok(false)` if the nodes were already linked.
    pub fn connect_manual(&mut self, a: &str, b: &str) -> Result<bool, RouteError> {
        self.graph.connect(a, b)
    }

    /// Summarizes the connectivity of the floor graph.
    pub fn validate(&self) -> Validation {
        let isolated: Vec<String> = self
            .graph
            .iter()
            .filter(|n| self.graph.get_edges(&n.id).is_empty())
            .map(|n| n.id.clone())
            .collect();

        let mut nodes_per_kind: BTreeMap<NodeKind, usize> = BTreeMap::default();
        for n in self.graph.iter() {
            *nodes_per_kind.entry(n.kind.kind).or_default() += 1;
        }

        let total_nodes = self.graph.len();
        let total_edges = self.graph.edge_count();
        let average_degree = if total_nodes == 0 {
            0.0
        } else {
            (2 * total_edges) as f64 / total_nodes as f64
        };

        Validation {
            total_nodes,
            total_edges,
            isolated_nodes: isolated.len(),
            isolated,
            nodes_per_kind,
            average_degree,
        }
    }

    /// Finds the shortest route between two nodes or rooms.
    ///
    /// Both endpoints may be node ids or room names (e.g. "Room_1014").
    /// A room is entered and left through its door closest to the other end of the route:
    /// the destination door is picked first, closest to the origin
    /// (for an origin room, its center), and then the origin door,
    /// closest to the picked destination. Rooms without doors are reached
    /// through their center node.
    pub fn route(&self, origin: &str, destination: &str) -> Result<FloorRoute, RouteError> {
        let origin_endpoint = self
            .endpoint(origin)
            .ok_or_else(|| RouteError::Unresolved(origin.to_string()))?;
        let destination_endpoint = self
            .endpoint(destination)
            .ok_or_else(|| RouteError::Unresolved(destination.to_string()))?;

        let to = destination_endpoint
            .resolve(&self.graph, origin_endpoint.anchor(&self.graph))
            .ok_or_else(|| RouteError::Unresolved(destination.to_string()))?;
        let from = origin_endpoint
            .resolve(&self.graph, to.position)
            .ok_or_else(|| RouteError::Unresolved(origin.to_string()))?;

        let path = find_route(&self.graph, &from.id, &to.id, self.step_limit)
            .map_err(|e| RouteError::from_search(e, &from.id, &to.id))?;

        if path.is_empty() {
            log::debug!("floor {}: no route between {} and {}", self.floor, from.id, to.id);
            return Err(RouteError::NoRoute {
                from: from.id.clone(),
                to: to.id.clone(),
            });
        }

        let route = FloorRoute {
            floor: self.floor.clone(),
            origin: from.id.clone(),
            destination: to.id.clone(),
            total_distance_pixels: self.graph.path_cost(&path),
            path: path.into_iter().map(NodeSummary::from).collect(),
        };
        log::debug!(
            "floor {}: route {} → {}: {} nodes, {:.1} px",
            self.floor,
            route.origin,
            route.destination,
            route.path.len(),
            route.total_distance_pixels
        );
        Ok(route)
    }

    fn endpoint<'g>(&'g self, reference: &'g str) -> Option<Endpoint<'g>> {
        let reference = reference.trim();
        let node = self.graph.get_node(reference);

        let room = match node {
            Some(n) if n.kind.kind != NodeKind::RoomCenter => return Some(Endpoint::Node(n)),
            Some(n) => n.kind.room.as_deref().unwrap_or(n.id.as_str()),
            None => reference,
        };

        let center = node.or_else(|| {
            self.graph.iter().find(|n| {
                n.kind.kind == NodeKind::RoomCenter && n.kind.room.as_deref() == Some(room)
            })
        });

        let has_doors = self.graph.iter().any(|n| is_door_of(n, room));
        if center.is_none() && !has_doors {
            return None;
        }

        Some(Endpoint::Room { room, center })
    }
}

fn is_door_of(n: &Node<Place>, room: &str) -> bool {
    n.kind.kind == NodeKind::Door && n.kind.room.as_deref() == Some(room)
}

/// Route endpoint, before picking the door of a room.
enum Endpoint<'g> {
    Node(&'g Node<Place>),
    Room {
        room: &'g str,
        center: Option<&'g Node<Place>>,
    },
}

impl<'g> Endpoint<'g> {
    /// Position representing the endpoint when choosing the door of the other endpoint.
    fn anchor(&self, g: &'g Graph<Place, Euclidean>) -> Position {
        match *self {
            Endpoint::Node(n) => n.position,
            Endpoint::Room { room, center } => center
                .or_else(|| g.iter().find(|n| is_door_of(n, room)))
                .map(|n| n.position)
                .unwrap_or_default(),
        }
    }

    /// Picks the actual node of the endpoint - for rooms, the door closest to `toward`.
    fn resolve(&self, g: &'g Graph<Place, Euclidean>, toward: Position) -> Option<&'g Node<Place>> {
        match *self {
            Endpoint::Node(n) => Some(n),
            Endpoint::Room { room, center } => g
                .find_nearest_node(toward, |n| is_door_of(n, room))
                .or(center),
        }
    }
}

/// Connectivity report of a [FloorGraph].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub isolated_nodes: usize,

    /// Ids of nodes without any links
    #[serde(default)]
    pub isolated: Vec<String>,

    #[serde(default)]
    pub nodes_per_kind: BTreeMap<NodeKind, usize>,

    pub average_degree: f64,
}

/// Presentation of a node on a [FloorRoute].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
}

impl From<&Node<Place>> for NodeSummary {
    fn from(n: &Node<Place>) -> Self {
        Self {
            id: n.id.clone(),
            kind: n.kind.kind,
            x: n.position.x,
            y: n.position.y,
        }
    }
}

/// Route between two nodes of a floor.
///
/// `origin` and `destination` are the ids of the first and last node of the path,
/// which for room endpoints are the chosen doors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorRoute {
    pub floor: String,
    pub origin: String,
    pub destination: String,
    pub path: Vec<NodeSummary>,
    pub total_distance_pixels: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{read_json_from_buffer, FileFormat};

    const FLOOR_A1: &[u8] = include_bytes!("test_fixtures/floor_a1.json");

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

    fn floor() -> FloorGraph {
        let doc: FloorDocument = read_json_from_buffer(FLOOR_A1, FileFormat::Json).unwrap();
        FloorGraph::from_document(&doc)
    }

    fn path_ids(route: &FloorRoute) -> Vec<&str> {
        route.path.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn kind_from_id() {
        assert_eq!(NodeKind::from_id("Node_H1_01"), Some(NodeKind::Corridor));
        assert_eq!(NodeKind::from_id("Door_1014_2"), Some(NodeKind::Door));
        assert_eq!(NodeKind::from_id("Exit_North"), Some(NodeKind::Exit));
        assert_eq!(NodeKind::from_id("Entrance_1"), Some(NodeKind::Exit));
        assert_eq!(NodeKind::from_id("Room_1014"), Some(NodeKind::RoomCenter));
        assert_eq!(NodeKind::from_id("Stairs_1"), None);
        assert_eq!(NodeKind::from_id("node_1"), None);
    }

    #[test]
    fn nearest_door_is_chosen() {
        let g = floor();
        let route = g.route("Node_1", "Room_101").unwrap();

        assert_eq!(path_ids(&route), vec!["Node_1", "Door_101_1"]);
        assert_eq!(route.origin, "Node_1");
        assert_eq!(route.destination, "Door_101_1");
        assert_almost_eq!(route.total_distance_pixels, 10.0);
        assert_eq!(route.path[1].kind, NodeKind::Door);
        assert_eq!(route.floor, "A1");
    }

    #[test]
    fn door_depends_on_direction() {
        let g = floor();

        let east = g.route("Node_4", "Room_102").unwrap();
        assert_eq!(path_ids(&east), vec!["Node_4", "Node_3", "Door_102_E"]);

        let west = g.route("Node_1", "Room_102").unwrap();
        assert_eq!(path_ids(&west), vec!["Node_1", "Node_2", "Door_102_W"]);
        assert_almost_eq!(west.total_distance_pixels, 100.0 + 500_f64.sqrt());

        let leaving = g.route("Room_102", "Node_4").unwrap();
        assert_eq!(path_ids(&leaving), vec!["Door_102_E", "Node_3", "Node_4"]);
    }

    #[test]
    fn room_to_room() {
        let g = floor();
        let route = g.route("Room_101", "Room_102").unwrap();
        assert_eq!(
            path_ids(&route),
            vec!["Door_101_1", "Node_1", "Node_2", "Door_102_W"]
        );
        assert_almost_eq!(route.total_distance_pixels, 10.0 + 100.0 + 500_f64.sqrt());
    }

    #[test]
    fn room_to_itself() {
        let g = floor();
        let route = g.route("Room_101", "Room_101").unwrap();
        assert_eq!(route.path.len(), 1);
        assert_eq!(route.total_distance_pixels, 0.0);
    }

    #[test]
    fn room_without_doors() {
        let g = floor();
        assert_eq!(
            g.route("Node_1", "Room_103"),
            Err(RouteError::NoRoute {
                from: "Node_1".to_string(),
                to: "Room_103".to_string()
            })
        );
    }

    #[test]
    fn unresolved_references() {
        let g = floor();
        assert_eq!(
            g.route("Node_1", "Room_104"),
            Err(RouteError::Unresolved("Room_104".to_string()))
        );
        assert_eq!(
            g.route("Node_9", "Room_101"),
            Err(RouteError::Unresolved("Node_9".to_string()))
        );
    }

    #[test]
    fn room_reached_only_through_doors() {
        let mut g = FloorGraph::new("B2");
        let add = |g: &mut FloorGraph, id: &str, x: f64, kind: NodeKind, room: Option<&str>| {
            g.add_node(
                id,
                Position::new(x, 0.0),
                kind,
                room.map(str::to_string),
                BTreeMap::default(),
            )
        };
        assert!(add(&mut g, "Node_1", 0.0, NodeKind::Corridor, None));
        assert!(add(&mut g, "Door_7", 50.0, NodeKind::Door, Some("Lab")));
        assert!(!add(&mut g, "Door_7", 60.0, NodeKind::Door, Some("Lab")));
        assert!(!add(&mut g, "Node_2", f64::NAN, NodeKind::Corridor, None));
        g.connect_nearby(DEFAULT_FLOOR_MAX_DISTANCE, &WALKING_PROFILE);

        // A room with doors but no center node
        let route = g.route("Node_1", "Lab").unwrap();
        assert_eq!(path_ids(&route), vec!["Node_1", "Door_7"]);
        assert_eq!(route.destination, "Door_7");
    }

    #[test]
    fn proximity_links_match_document() {
        let doc: FloorDocument = read_json_from_buffer(FLOOR_A1, FileFormat::Json).unwrap();
        let expected = floor();

        let mut g = FloorGraph::new("A1");
        for (id, n) in &doc.nodes {
            g.add_node(
                id.as_str(),
                Position::new(n.x, n.y),
                n.kind.or_else(|| NodeKind::from_id(id)).unwrap(),
                n.associated_room.clone(),
                n.metadata.clone(),
            );
        }
        assert_eq!(g.connect_nearby(100.0, &WALKING_PROFILE), 12);

        let links = |g: &FloorGraph| {
            let mut links: Vec<_> = g
                .graph()
                .edges()
                .map(|(a, b, _)| {
                    let mut pair = [a.id.clone(), b.id.clone()];
                    pair.sort();
                    pair
                })
                .collect();
            links.sort();
            links
        };
        assert_eq!(links(&g), links(&expected));
    }

    #[test]
    fn manual_links() {
        let mut g = floor();
        assert_eq!(g.connect_manual("Node_4", "Room_103"), Ok(true));
        assert_eq!(g.connect_manual("Room_103", "Node_4"), Ok(false));
        assert_eq!(
            g.connect_manual("Node_4", "Room_104"),
            Err(RouteError::Unresolved("Room_104".to_string()))
        );

        let route = g.route("Node_3", "Room_103").unwrap();
        assert_eq!(path_ids(&route), vec!["Node_3", "Node_4", "Room_103"]);
        assert_almost_eq!(
            route.total_distance_pixels,
            100.0 + (100_f64.powi(2) + 200_f64.powi(2)).sqrt()
        );
    }

    #[test]
    fn validate() {
        let v = floor().validate();
        assert_eq!(v.total_nodes, 12);
        assert_eq!(v.total_edges, 12);
        assert_eq!(v.isolated_nodes, 1);
        assert_eq!(v.isolated, vec!["Room_103"]);
        assert_eq!(v.nodes_per_kind[&NodeKind::Corridor], 4);
        assert_eq!(v.nodes_per_kind[&NodeKind::Door], 4);
        assert_eq!(v.nodes_per_kind[&NodeKind::Exit], 1);
        assert_eq!(v.nodes_per_kind[&NodeKind::RoomCenter], 3);
        assert_almost_eq!(v.average_degree, 2.0);

        let empty = FloorGraph::new("X").validate();
        assert_eq!(empty.average_degree, 0.0);
        assert!(empty.nodes_per_kind.is_empty());
    }

    #[test]
    fn route_serialization() {
        let route = floor().route("Exit_1", "Room_101").unwrap();
        let json = serde_json::to_value(&route).unwrap();

        assert_eq!(json["origin"], "Exit_1");
        assert_eq!(json["destination"], "Door_101_1");
        assert_eq!(json["path"][0]["kind"], "exit");
        assert_eq!(json["path"][1]["x"], 0.0);
        assert_almost_eq!(json["totalDistancePixels"].as_f64().unwrap(), 60.0);
    }
}

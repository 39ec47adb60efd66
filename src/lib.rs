// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Campus wayfinding: routing between buildings and inside building floors.
//!
//! Buildings are loaded from [GeoJSON](https://geojson.org/) footprints into a
//! [campus graph](campus::CampusGraph), where nearby buildings are linked and routes are
//! measured in meters. Each building floor has its own [floor graph](floor::FloorGraph)
//! of corridor waypoints, doors, exits and room centers, measured in floor-plan pixels.
//! Both use the same undirected [Graph] and the same A* search.
//!
//! # Example
//!
//! ```no_run
//! let options = wayfinder::navigator::Options {
//!     campus_geojson: Some("data/campus.geojson".into()),
//!     floors_dir: Some("data/floors".into()),
//!     ..Default::default()
//! };
//! let navigator = wayfinder::navigator::Navigator::load(&options);
//!
//! let route = navigator.route("A", "M").expect("failed to find route");
//! println!("Route: {:?}", route);
//!
//! let indoor = navigator
//!     .route_in_building("Node_H1_01", "Room_1014", "A1")
//!     .expect("failed to find indoor route");
//! println!("Indoor route: {:?}", indoor);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod astar;
pub mod campus;
mod distance;
mod error;
pub mod floor;
mod graph;
pub mod navigator;
pub mod proximity;
pub mod reader;

pub use astar::{find_route, find_route_with, AStarError, DEFAULT_STEP_LIMIT};
pub use distance::{centroid, earth_distance, euclidean_distance, Euclidean, Haversine, Metric};
pub use error::{DocumentError, RouteError};
pub use graph::Graph;

/// A point in the coordinate space of a [Graph].
///
/// In the campus graph `x` is the longitude and `y` the latitude;
/// in floor graphs both are floor-plan pixels.
/// Serialized as a two-element `[x, y]` array.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Position {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

/// Represents an element of the [Graph].
///
/// `kind` carries whatever the graph needs to tell nodes apart
/// (building details in the campus graph, node type and room in floor graphs),
/// and `metadata` is free-form data passed through from the input files.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<K> {
    pub id: String,
    pub position: Position,
    pub kind: K,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl<K> Node<K> {
    pub fn new<S: Into<String>>(id: S, position: Position, kind: K) -> Self {
        Self {
            id: id.into(),
            position,
            kind,
            metadata: BTreeMap::default(),
        }
    }
}

/// Represents one direction of an undirected connection of a [Node].
///
/// `to` is the index of the other node in its [Graph] (see [Graph::node]),
/// and `cost` is the metric distance between both nodes. The graph always stores
/// the reverse direction with the same cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: usize,
    pub cost: f64,
}

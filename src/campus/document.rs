// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::{Building, CampusGraph};
use crate::{Node, Position};

/// Persisted form of a [CampusGraph] with its proximity and manual links.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusDocument {
    #[serde(default)]
    pub buildings: Vec<BuildingRecord>,

    #[serde(default)]
    pub edges: Vec<EdgeRecord>,

    #[serde(default)]
    pub summary: CampusSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub id: String,
    pub name: String,
    pub reference: String,
    pub centroid: Position,

    #[serde(default)]
    pub footprint: Vec<Position>,
}

/// An undirected link between two buildings.
///
/// The distance is informational; when loading, it is recomputed from the centroids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,

    #[serde(default)]
    pub distance_meters: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampusSummary {
    pub buildings: usize,
    pub edges: usize,

    /// Number of buildings without any links.
    pub isolated: usize,
}

impl CampusGraph {
    /// Dumps all buildings and links into a [CampusDocument].
    pub fn to_document(&self) -> CampusDocument {
        let buildings: Vec<_> = self
            .buildings()
            .map(|n| BuildingRecord {
                id: n.id.clone(),
                name: n.kind.name.clone(),
                reference: n.kind.reference.clone(),
                centroid: n.position,
                footprint: n.kind.footprint.clone(),
            })
            .collect();

        let edges: Vec<_> = self
            .graph
            .edges()
            .map(|(a, b, cost)| EdgeRecord {
                from: a.id.clone(),
                to: b.id.clone(),
                distance_meters: cost,
            })
            .collect();

        let isolated = self
            .buildings()
            .filter(|n| self.graph.get_edges(&n.id).is_empty())
            .count();

        CampusDocument {
            summary: CampusSummary {
                buildings: buildings.len(),
                edges: edges.len(),
                isolated,
            },
            buildings,
            edges,
        }
    }

    /// Recreates a [CampusGraph] from a [CampusDocument].
    ///
    /// Buildings with duplicate ids or non-finite centroids and links naming
    /// unknown buildings are logged and skipped.
    pub fn from_document(doc: &CampusDocument) -> Self {
        let mut g = Self::default();

        for b in &doc.buildings {
            if !b.centroid.is_finite() {
                log::warn!("skipping building {}: invalid centroid", b.id);
                continue;
            }

            let node = Node::new(
                b.id.clone(),
                b.centroid,
                Building {
                    name: b.name.clone(),
                    reference: b.reference.clone(),
                    footprint: b.footprint.clone(),
                },
            );
            if g.graph.insert_node(node).is_none() {
                log::warn!("skipping building {}: duplicate id", b.id);
            }
        }

        for e in &doc.edges {
            if let Err(err) = g.graph.connect(&e.from, &e.to) {
                log::warn!("skipping link {} - {}: {err}", e.from, e.to);
            }
        }

        log::info!(
            "loaded campus graph with {} buildings and {} links",
            g.graph.len(),
            g.graph.edge_count()
        );
        g
    }
}

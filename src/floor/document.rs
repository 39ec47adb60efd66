// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{FloorGraph, NodeKind, Validation};
use crate::Position;

/// Persisted form of a [FloorGraph], as produced by floor-plan extraction tools.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorDocument {
    #[serde(default)]
    pub floor: String,

    #[serde(default)]
    pub nodes: BTreeMap<String, NodeRecord>,

    #[serde(default)]
    pub edges: Vec<EdgeRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub x: f64,
    pub y: f64,

    /// Inferred from the node id with [NodeKind::from_id] if missing.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_room: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// An undirected link between two floor nodes.
///
/// The weight is informational; when loading, it is recomputed from node positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,

    #[serde(default)]
    pub weight: f64,
}

impl FloorGraph {
    /// Dumps all nodes and links into a [FloorDocument], including a [Validation] report.
    pub fn to_document(&self) -> FloorDocument {
        let nodes = self
            .graph
            .iter()
            .map(|n| {
                let record = NodeRecord {
                    x: n.position.x,
                    y: n.position.y,
                    kind: Some(n.kind.kind),
                    associated_room: n.kind.room.clone(),
                    metadata: n.metadata.clone(),
                };
                (n.id.clone(), record)
            })
            .collect();

        let edges = self
            .graph
            .edges()
            .map(|(a, b, cost)| EdgeRecord {
                from: a.id.clone(),
                to: b.id.clone(),
                weight: cost,
            })
            .collect();

        FloorDocument {
            floor: self.floor.clone(),
            nodes,
            edges,
            validation: Some(self.validate()),
        }
    }

    /// Recreates a [FloorGraph] from a [FloorDocument].
    ///
    /// Nodes are added in the order of their ids. Nodes of unknown type
    /// and links naming unknown nodes are logged and skipped.
    /// The embedded validation report is ignored.
    pub fn from_document(doc: &FloorDocument) -> Self {
        let mut g = Self::new(doc.floor.as_str());

        for (id, n) in &doc.nodes {
            let Some(kind) = n.kind.or_else(|| NodeKind::from_id(id)) else {
                log::warn!("floor {}: skipping node {id}: unknown type", doc.floor);
                continue;
            };

            g.add_node(
                id.as_str(),
                Position::new(n.x, n.y),
                kind,
                n.associated_room.clone(),
                n.metadata.clone(),
            );
        }

        for e in &doc.edges {
            if let Err(err) = g.graph.connect(&e.from, &e.to) {
                log::warn!("floor {}: skipping link {} - {}: {err}", doc.floor, e.from, e.to);
            }
        }

        log::info!(
            "loaded floor {} with {} nodes and {} links",
            g.floor,
            g.graph.len(),
            g.graph.edge_count()
        );
        g
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{read_json_from_buffer, write_json_to_io, FileFormat};
    use pretty_assertions::assert_eq;

    const FLOOR_A1: &[u8] = include_bytes!("test_fixtures/floor_a1.json");

    fn document() -> FloorDocument {
        read_json_from_buffer(FLOOR_A1, FileFormat::Json).unwrap()
    }

    #[test]
    fn types_are_inferred() {
        let g = FloorGraph::from_document(&document());

        let exit = g.graph().get_node("Exit_1").unwrap();
        assert_eq!(exit.kind.kind, NodeKind::Exit);
        assert_eq!(exit.kind.room, None);
        assert_eq!(exit.metadata["label"], "Main entrance");

        let corridor = g.graph().get_node("Node_3").unwrap();
        assert_eq!(corridor.kind.kind, NodeKind::Corridor);

        let door = g.graph().get_node("Door_102_W").unwrap();
        assert_eq!(door.kind.room.as_deref(), Some("Room_102"));
    }

    #[test]
    fn embedded_validation_matches() {
        let doc = document();
        let g = FloorGraph::from_document(&doc);
        assert_eq!(Some(g.validate()), doc.validation);
    }

    #[test]
    fn round_trip() {
        let g = FloorGraph::from_document(&document());
        let doc = g.to_document();

        let mut buf = Vec::default();
        write_json_to_io(&mut buf, FileFormat::JsonBz2, &doc).unwrap();
        let read: FloorDocument = read_json_from_buffer(&buf, FileFormat::Unknown).unwrap();
        assert_eq!(read, doc);

        let reloaded = FloorGraph::from_document(&read);
        assert_eq!(reloaded.to_document(), doc);

        for (origin, destination) in [
            ("Node_1", "Room_101"),
            ("Node_4", "Room_102"),
            ("Room_101", "Room_102"),
            ("Exit_1", "Node_4"),
            ("Node_1", "Room_103"),
        ] {
            assert_eq!(
                reloaded.route(origin, destination),
                g.route(origin, destination)
            );
        }
    }

    #[test]
    fn invalid_records_are_skipped() {
        let doc: FloorDocument = serde_json::from_str(
            r#"{
                "floor": "B2",
                "nodes": {
                    "Node_1": {"x": 0, "y": 0},
                    "Stairs_1": {"x": 5, "y": 5},
                    "Lift": {"x": 10, "y": 0, "type": "corridor"}
                },
                "edges": [
                    {"from": "Node_1", "to": "Lift", "weight": 999},
                    {"from": "Node_1", "to": "Stairs_1", "weight": 7.07}
                ]
            }"#,
        )
        .unwrap();

        let g = FloorGraph::from_document(&doc);
        assert_eq!(g.floor(), "B2");
        assert_eq!(g.len(), 2);
        assert_eq!(g.graph().edge_count(), 1);
        assert_eq!(g.graph().get_edge("Node_1", "Lift"), 10.0);
    }
}

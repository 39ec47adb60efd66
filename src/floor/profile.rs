// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{NodeKind, Place};
use crate::proximity::Linkage;

/// Describes which nodes of a floor plan may be linked by
/// [FloorGraph::connect_nearby](super::FloorGraph::connect_nearby).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorProfile<'a> {
    /// Human readable name of the profile. Not used for linking.
    pub name: &'a str,

    /// Pairs of node kinds which may be linked based on their distance.
    ///
    /// Two nodes are linked if their distance is not greater than the
    /// maximum distance multiplied by the first matching [Factor].
    /// Pairs of kinds without a matching factor are never linked by proximity.
    pub factors: &'a [Factor],

    /// Always link every door to the room center of its own room, regardless of the distance.
    pub link_doors_to_rooms: bool,
}

/// Multiplier of the maximum link distance for a pair of node kinds.
/// The order of `a` and `b` doesn't matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor {
    pub a: NodeKind,
    pub b: NodeKind,

    /// Must be a finite number not less than zero.
    pub factor: f64,
}

/// Default profile for walking around a floor:
/// corridors are linked with each other and with exits at the full distance,
/// doors are linked with corridors only when a bit closer,
/// and each door leads into the center of its room.
pub const WALKING_PROFILE: FloorProfile<'static> = FloorProfile {
    name: "walking",
    factors: &[
        Factor {
            a: NodeKind::Corridor,
            b: NodeKind::Corridor,
            factor: 1.0,
        },
        Factor {
            a: NodeKind::Corridor,
            b: NodeKind::Door,
            factor: 0.8,
        },
        Factor {
            a: NodeKind::Corridor,
            b: NodeKind::Exit,
            factor: 1.0,
        },
    ],
    link_doors_to_rooms: true,
};

impl Linkage<Place> for FloorProfile<'_> {
    fn factor(&self, a: &Place, b: &Place) -> Option<f64> {
        self.factors.iter().find_map(|f| {
            if (f.a == a.kind && f.b == b.kind) || (f.a == b.kind && f.b == a.kind) {
                Some(f.factor)
            } else {
                None
            }
        })
    }

    fn is_forced(&self, a: &Place, b: &Place) -> bool {
        if !self.link_doors_to_rooms {
            return false;
        }

        let (door, center) = match (a.kind, b.kind) {
            (NodeKind::Door, NodeKind::RoomCenter) => (a, b),
            (NodeKind::RoomCenter, NodeKind::Door) => (b, a),
            _ => return false,
        };
        door.room.is_some() && door.room == center.room
    }
}

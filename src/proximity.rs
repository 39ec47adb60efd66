// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Automatic creation of edges between nearby nodes.

use crate::{Graph, Metric};

/// Decides which pairs of nodes may be linked by [connect_nearby],
/// based on the `kind` of both nodes.
pub trait Linkage<K> {
    /// Returns the multiplier of the maximum distance applicable to a pair of nodes,
    /// or `None` if such nodes must never be linked based on their proximity.
    ///
    /// Must be symmetric: `factor(a, b) == factor(b, a)`.
    fn factor(&self, a: &K, b: &K) -> Option<f64>;

    /// Returns true if two nodes must be linked regardless of their distance.
    fn is_forced(&self, _a: &K, _b: &K) -> bool {
        false
    }
}

/// [Linkage] which allows linking any two nodes within the maximum distance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Uniform;

impl<K> Linkage<K> for Uniform {
    fn factor(&self, _a: &K, _b: &K) -> Option<f64> {
        Some(1.0)
    }
}

/// Links every pair of distinct nodes of the graph which are
/// forced to be linked by `linkage`, or whose distance is not greater than
/// `max_distance` multiplied by the pair's [Linkage::factor].
///
/// Already connected pairs are left untouched.
/// Returns the number of created edges.
///
/// Every pair of nodes is checked, so this function is only suitable for graphs
/// with up to a few thousand nodes.
pub fn connect_nearby<K, M, L>(g: &mut Graph<K, M>, max_distance: f64, linkage: &L) -> usize
where
    M: Metric,
    L: Linkage<K>,
{
    if !max_distance.is_finite() || max_distance < 0.0 {
        log::warn!("invalid maximum link distance {max_distance} - only forced links will be made");
    }

    let mut pairs = Vec::default();
    for i in 0..g.len() {
        let a = g.node(i);
        for j in (i + 1)..g.len() {
            let b = g.node(j);

            let linked = linkage.is_forced(&a.kind, &b.kind)
                || linkage
                    .factor(&a.kind, &b.kind)
                    .map(|factor| M::distance(a.position, b.position) <= max_distance * factor)
                    .unwrap_or(false);

            if linked {
                pairs.push((i, j));
            }
        }
    }

    pairs
        .into_iter()
        .filter(|&(i, j)| g.connect_at(i, j))
        .count()
}

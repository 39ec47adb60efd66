// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::{AStarError, Edge, Graph, Metric, Node};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: usize,
    cost: f64,
    score: f64,
    seq: u64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores (and earlier insertions on equal scores)
        // are considered better ("higher"), and Rust's BinaryHeap is a max-heap.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn reconstruct_path<'g, K, M: Metric>(
    g: &'g Graph<K, M>,
    came_from: &HashMap<usize, usize>,
    mut last: usize,
) -> Vec<&'g Node<K>> {
    let mut path = vec![g.node(last)];

    while let Some(&idx) = came_from.get(&last) {
        path.push(g.node(idx));
        last = idx;
    }

    path.reverse();
    path
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two nodes in the provided graph,
/// estimating the remaining cost with the straight-line distance of the graph's [Metric].
///
/// See [find_route_with] for details.
pub fn find_route<'g, K, M: Metric>(
    g: &'g Graph<K, M>,
    from_id: &str,
    to_id: &str,
    step_limit: usize,
) -> Result<Vec<&'g Node<K>>, AStarError> {
    find_route_with(g, from_id, to_id, step_limit, |a, b| {
        M::distance(a.position, b.position)
    })
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two nodes in the provided graph.
///
/// Returns the nodes of the route, starting with `from_id` and ending with `to_id`,
/// or an empty vector if there is no route between the two nodes.
///
/// `heuristic(node, goal)` must never overestimate the cost of reaching the goal
/// from the node, otherwise the returned route might not be the shortest one.
/// Nodes are never expanded twice. When two candidates are equally promising,
/// the one discovered earlier is expanded first, so the result is deterministic.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [AStarError::StepLimitExceeded]. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn find_route_with<'g, K, M, H>(
    g: &'g Graph<K, M>,
    from_id: &str,
    to_id: &str,
    step_limit: usize,
    heuristic: H,
) -> Result<Vec<&'g Node<K>>, AStarError>
where
    M: Metric,
    H: Fn(&Node<K>, &Node<K>) -> f64,
{
    let from = g
        .index_of(from_id)
        .ok_or_else(|| AStarError::InvalidReference(from_id.to_string()))?;
    let to = g
        .index_of(to_id)
        .ok_or_else(|| AStarError::InvalidReference(to_id.to_string()))?;
    let to_node = g.node(to);

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<usize, usize> = HashMap::default();
    let mut known_costs: HashMap<usize, f64> = HashMap::default();
    let mut closed: HashSet<usize> = HashSet::default();
    let mut seq: u64 = 0;
    let mut steps: usize = 0;

    queue.push(QueueItem {
        at: from,
        cost: 0.0,
        score: heuristic(g.node(from), to_node),
        seq,
    });
    known_costs.insert(from, 0.0);

    while let Some(item) = queue.pop() {
        if item.at == to {
            return Ok(reconstruct_path(g, &came_from, to));
        }

        // A node might be queued multiple times; only its first (cheapest) entry counts.
        if !closed.insert(item.at) {
            continue;
        }

        steps += 1;
        if steps > step_limit {
            return Err(AStarError::StepLimitExceeded);
        }

        for &Edge {
            to: neighbor_id,
            cost: edge_cost,
        } in g.edges_at(item.at)
        {
            if closed.contains(&neighbor_id) {
                continue;
            }

            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + edge_cost;
            if neighbor_cost
                >= known_costs
                    .get(&neighbor_id)
                    .cloned()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            // Push the new item into the queue
            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            seq += 1;
            queue.push(QueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
                score: neighbor_cost + heuristic(g.node(neighbor_id), to_node),
                seq,
            });
        }
    }

    Ok(vec![])
}

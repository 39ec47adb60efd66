// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::{Edge, Metric, Node, Position, RouteError};

/// Represents a walkable network as a set of [Nodes](Node) and undirected,
/// weighted [Edges](Edge) between them.
///
/// Nodes are kept in insertion order and are never removed, so node indices
/// stay valid for the lifetime of the graph. Edge costs are always computed
/// with the graph's [Metric] from the positions of both endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph<K, M> {
    nodes: Vec<(Node<K>, Vec<Edge>)>,
    index: HashMap<String, usize>,
    metric: PhantomData<M>,
}

impl<K, M> Default for Graph<K, M> {
    fn default() -> Self {
        Self {
            nodes: Vec::default(),
            index: HashMap::default(),
            metric: PhantomData,
        }
    }
}

impl<K, M: Metric> Graph<K, M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node<K>> {
        self.nodes.iter().map(|(node, _)| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: &str) -> Option<&Node<K>> {
        self.index.get(id).map(|&idx| &self.nodes[idx].0)
    }

    /// Returns the index of a [Node] with the provided id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Retrieves a [Node] by its index.
    ///
    /// Panics if `idx` is out of bounds; valid indices come from [Graph::index_of],
    /// [Graph::insert_node] or [Edge::to].
    pub fn node(&self, idx: usize) -> &Node<K> {
        &self.nodes[idx].0
    }

    /// Adds a new [Node] to the graph and returns its index.
    ///
    /// Returns `None` and leaves the graph unchanged if a node with the same id
    /// already exists, as replacing its position would break the cost invariant
    /// of its edges.
    pub fn insert_node(&mut self, node: Node<K>) -> Option<usize> {
        if self.index.contains_key(&node.id) {
            return None;
        }

        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push((node, Vec::default()));
        Some(idx)
    }

    /// Finds the closest [Node] to the given position among the nodes accepted by `filter`.
    ///
    /// If multiple nodes are equally close, the one inserted first is returned.
    /// This function requires computing the distance to every [Node] in the graph,
    /// and is not suitable for large graphs.
    pub fn find_nearest_node<F>(&self, position: Position, filter: F) -> Option<&Node<K>>
    where
        F: Fn(&Node<K>) -> bool,
    {
        self.iter()
            .filter(|nd| filter(nd))
            .map(|nd| (M::distance(position, nd.position), nd))
            .fold(None, |best: Option<(f64, &Node<K>)>, (dist, nd)| match best {
                Some((best_dist, _)) if best_dist <= dist => best,
                _ => Some((dist, nd)),
            })
            .map(|(_, nd)| nd)
    }

    /// Gets all [Edges](Edge) of a node with a given id.
    pub fn get_edges(&self, id: &str) -> &[Edge] {
        self.index_of(id)
            .map(|idx| self.edges_at(idx))
            .unwrap_or_default()
    }

    /// Gets all [Edges](Edge) of a node with a given index.
    pub fn edges_at(&self, idx: usize) -> &[Edge] {
        self.nodes
            .get(idx)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Returns an iterator over the neighbors of a node with a given id.
    pub fn neighbors<'g>(&'g self, id: &str) -> impl Iterator<Item = &'g Node<K>> + 'g {
        self.get_edges(id).iter().map(|e| self.node(e.to))
    }

    /// Gets the cost of an [Edge] between two nodes.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: &str, to_id: &str) -> f64 {
        match (self.index_of(from_id), self.index_of(to_id)) {
            (Some(from), Some(to)) => self.edge_cost_at(from, to),
            _ => f64::INFINITY,
        }
    }

    pub(crate) fn edge_cost_at(&self, from: usize, to: usize) -> f64 {
        self.edges_at(from)
            .iter()
            .find_map(|e| if e.to == to { Some(e.cost) } else { None })
            .unwrap_or(f64::INFINITY)
    }

    /// Returns the number of undirected edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|(_, e)| e.len()).sum::<usize>() / 2
    }

    /// Returns an iterator over all undirected edges, each reported once,
    /// as `(node, other node, cost)`. The first node always precedes
    /// the other one in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&Node<K>, &Node<K>, f64)> {
        self.nodes.iter().enumerate().flat_map(move |(idx, (node, edges))| {
            edges
                .iter()
                .filter(move |e| e.to > idx)
                .map(move |e| (node, self.node(e.to), e.cost))
        })
    }

    /// Connects two nodes with given ids.
    ///
    /// Returns `Ok(true)` if a new edge was created, and `Ok(false)` if the nodes were
    /// already connected or both ids refer to the same node.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<bool, RouteError> {
        let a = self
            .index_of(a)
            .ok_or_else(|| RouteError::Unresolved(a.to_string()))?;
        let b = self
            .index_of(b)
            .ok_or_else(|| RouteError::Unresolved(b.to_string()))?;
        Ok(self.connect_at(a, b))
    }

    /// Connects two nodes with given indices, see [Graph::connect].
    pub(crate) fn connect_at(&mut self, a: usize, b: usize) -> bool {
        if a == b || self.edges_at(a).iter().any(|e| e.to == b) {
            return false;
        }

        let cost = M::distance(self.nodes[a].0.position, self.nodes[b].0.position);
        self.nodes[a].1.push(Edge { to: b, cost });
        self.nodes[b].1.push(Edge { to: a, cost });
        true
    }

    /// Sums up the costs of edges between consecutive nodes of a path.
    ///
    /// Returns [f64::INFINITY] if any two consecutive nodes are not connected.
    pub fn path_cost(&self, path: &[&Node<K>]) -> f64 {
        path.windows(2)
            .map(|pair| self.get_edge(&pair[0].id, &pair[1].id))
            .fold(0.0, |total, cost| total + cost)
    }
}

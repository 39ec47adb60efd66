// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Position;

/// Mean radius of Earth, in meters.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6_371_008.8;

/// Mean diameter of Earth, in meters.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the `haversine formula <https://en.wikipedia.org/wiki/Haversine_formula>`_.
/// Returns the result in meters.
pub fn earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    // Rounding might push h slightly above 1 for antipodal points
    EARTH_DIAMETER * h.sqrt().min(1.0).asin()
}

/// Straight-line distance between two points on a plane.
pub fn euclidean_distance(a: Position, b: Position) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Returns the arithmetic mean of the provided vertices, or `None` for an empty slice.
///
/// This is not the area-weighted centroid of a polygon - every vertex counts the same,
/// including the closing vertex of a ring if it is repeated.
pub fn centroid(vertices: &[Position]) -> Option<Position> {
    if vertices.is_empty() {
        return None;
    }

    let n = vertices.len() as f64;
    let (sum_x, sum_y) = vertices
        .iter()
        .fold((0.0, 0.0), |(x, y), v| (x + v.x, y + v.y));

    Some(Position {
        x: sum_x / n,
        y: sum_y / n,
    })
}

/// Distance function of a coordinate space.
///
/// Edge costs of a [Graph](crate::Graph) are always computed with its metric,
/// and the default A* heuristic is the metric distance to the goal. Any metric
/// satisfying the triangle inequality yields a consistent heuristic.
pub trait Metric {
    fn distance(a: Position, b: Position) -> f64;
}

/// Great-circle distance in meters, for positions where `x` is the longitude
/// and `y` is the latitude.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Haversine;

impl Metric for Haversine {
    #[inline]
    fn distance(a: Position, b: Position) -> f64 {
        earth_distance(a.y, a.x, b.y, b.x)
    }
}

/// Planar distance, for positions in pixels of a floor plan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Euclidean;

impl Metric for Euclidean {
    #[inline]
    fn distance(a: Position, b: Position) -> f64 {
        euclidean_distance(a, b)
    }
}

// src/math/algorithms/clipping.rs

//! # Half-Plane Clipping
//!
//! Convex cells are clipped against half-planes with the Sutherland-Hodgman
//! scheme. Every edge of a cell remembers which half-plane produced it, so a
//! Voronoi cell built from perpendicular bisectors knows which neighbour owns
//! each of its edges.

use crate::math::{
    types::{Bounds2D, Point2D},
    utils::{constants, simple_geometry},
};
use geo::{LineString, Polygon};

/// A closed half-plane `{ x : normal · (x - anchor) <= 0 }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfPlane {
    pub anchor: Point2D,
    pub normal: Point2D,
}

impl HalfPlane {
    /// The half-plane of points at least as close to `site` as to `other`
    /// (bounded by the perpendicular bisector of the two).
    pub fn bisector(site: Point2D, other: Point2D) -> Self {
        Self {
            anchor: Point2D {
                x: 0.5 * (site.x + other.x),
                y: 0.5 * (site.y + other.y),
            },
            normal: Point2D {
                x: other.x - site.x,
                y: other.y - site.y,
            },
        }
    }

    /// Signed distance scaled by |normal|; negative inside.
    #[inline]
    fn signed_value(&self, p: Point2D) -> f64 {
        self.normal.x * (p.x - self.anchor.x) + self.normal.y * (p.y - self.anchor.y)
    }
}

/// A convex polygon (CCW) whose edge `i` runs from `vertices[i]` to
/// `vertices[i + 1]` and was produced by the half-plane tagged `sources[i]`.
/// `None` marks edges of the initial frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvexCell {
    pub vertices: Vec<Point2D>,
    pub sources: Vec<Option<usize>>,
}

impl ConvexCell {
    /// Starts a cell from an axis-aligned frame.
    pub fn from_bounds(bounds: &Bounds2D) -> Self {
        Self {
            vertices: bounds.corners().to_vec(),
            sources: vec![None; 4],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    pub fn area(&self) -> f64 {
        simple_geometry::signed_area(&self.vertices).abs()
    }

    /// Tags of all edges longer than `min_length`, deduplicated and sorted.
    pub fn edge_sources(&self, min_length: f64) -> Vec<usize> {
        let n = self.vertices.len();
        let mut tags: Vec<usize> = (0..n)
            .filter(|&i| {
                simple_geometry::distance(self.vertices[i], self.vertices[(i + 1) % n]) > min_length
            })
            .filter_map(|i| self.sources[i])
            .collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.vertices.clone()), vec![])
    }
}

/// Performs half-plane clipping with a tolerance for points on the clip line.
pub struct PolygonClipper {
    tolerance: f64,
}

impl Default for PolygonClipper {
    /// Default: `tolerance = constants::EPSILON`
    fn default() -> Self {
        Self {
            tolerance: constants::EPSILON,
        }
    }
}

impl PolygonClipper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance, relative to the half-plane normal length. Must be non-negative.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    /// Clips `cell` against `plane`; edges created along the clip line get `tag`.
    ///
    /// Returns an empty cell if nothing of `cell` lies inside the half-plane.
    pub fn clip_half_plane(&self, cell: &ConvexCell, plane: &HalfPlane, tag: usize) -> ConvexCell {
        let n = cell.vertices.len();
        if n < 3 {
            return ConvexCell::default();
        }
        let scale = (plane.normal.x * plane.normal.x + plane.normal.y * plane.normal.y).sqrt();
        let limit = self.tolerance * scale;

        let mut result = ConvexCell {
            vertices: Vec::with_capacity(n + 1),
            sources: Vec::with_capacity(n + 1),
        };

        // `s` is the start of the current edge, `e` its end
        let mut s_index = n - 1;
        for e_index in 0..n {
            let s = cell.vertices[s_index];
            let e = cell.vertices[e_index];
            let s_value = plane.signed_value(s);
            let e_value = plane.signed_value(e);
            let s_inside = s_value <= limit;
            let e_inside = e_value <= limit;

            if e_inside {
                if !s_inside {
                    // Edge (s, e) enters: the piece up to e still belongs to the old edge
                    result.vertices.push(Self::intersection(s, e, s_value, e_value));
                    result.sources.push(cell.sources[s_index]);
                }
                result.vertices.push(e);
                result.sources.push(cell.sources[e_index]);
            } else if s_inside {
                // Edge (s, e) exits: the following edge runs along the clip line
                result.vertices.push(Self::intersection(s, e, s_value, e_value));
                result.sources.push(Some(tag));
            }
            s_index = e_index;
        }

        if result.vertices.len() < 3 {
            return ConvexCell::default();
        }
        result
    }

    fn intersection(s: Point2D, e: Point2D, s_value: f64, e_value: f64) -> Point2D {
        let t = s_value / (s_value - e_value);
        Point2D {
            x: s.x + (e.x - s.x) * t,
            y: s.y + (e.y - s.y) * t,
        }
    }
}

// src/math/algorithms/triangulation.rs

use crate::math::{
    error::{MathError, MathResult},
    types::{Point2D, PointSet, SpadePoint, from_spade_point, to_spade_point},
    utils::simple_geometry,
};
use spade::{DelaunayTriangulation, HasPosition, Triangulation as _};
use std::collections::HashMap;
use tracing::debug;

/// Vertex-Typ für Spade, der den Index des Eingabepunktes mitführt.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SiteVertex {
    position: SpadePoint,
    index: usize,
}

impl HasPosition for SiteVertex {
    type Scalar = f64;

    fn position(&self) -> SpadePoint {
        self.position
    }
}

/// Ein Delaunay-Dreieck über Punktindizes (CCW-orientiert).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [usize; 3],
    /// Indizes der drei Kanten in `Triangulation::edges`, Kante k verbindet vertices[k] und vertices[(k+1)%3]
    pub edges: [usize; 3],
    pub circumradius: f64,
    pub longest_edge: f64,
}

/// Eine ungerichtete Delaunay-Kante mit Länge und inzidenten Dreiecken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Kleinerer Punktindex
    pub a: usize,
    /// Größerer Punktindex
    pub b: usize,
    pub length: f64,
    pub triangles: [Option<usize>; 2],
}

impl Edge {
    /// Iterator über die (ein oder zwei) inzidenten Dreiecke.
    pub fn incident_triangles(&self) -> impl Iterator<Item = usize> + '_ {
        self.triangles.iter().flatten().copied()
    }

    /// Kante der konvexen Hülle (nur ein inzidentes Dreieck)
    pub fn is_hull_edge(&self) -> bool {
        self.triangles[1].is_none()
    }
}

/// Read-only Delaunay-Triangulation einer `PointSet`.
///
/// Wird mit `spade` aufgebaut und anschließend in eine indexbasierte Struktur
/// übersetzt, damit Alpha-Shape, Voronoi und Statistik mit stabilen Punktindizes
/// arbeiten können.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<Point2D>,
    triangles: Vec<Triangle>,
    edges: Vec<Edge>,
    neighbors: Vec<Vec<usize>>,
    on_hull: Vec<bool>,
    nearest: Vec<f64>,
}

impl Triangulation {
    /// Trianguliert die Punktmenge.
    ///
    /// Schlägt mit `DegenerateInput` fehl, wenn weniger als drei verschiedene Punkte
    /// existieren, Punkte doppelt vorkommen oder alle Punkte kollinear sind.
    pub fn build(point_set: &PointSet) -> MathResult<Self> {
        let points = point_set.points().to_vec();
        let distinct = point_set.distinct_count();
        if distinct < 3 {
            return Err(MathError::DegenerateInput {
                reason: format!("triangulation needs 3 distinct points, got {}", distinct),
            });
        }
        if distinct < points.len() {
            return Err(MathError::DegenerateInput {
                reason: format!(
                    "{} of {} points are coincident with another point",
                    points.len() - distinct,
                    points.len()
                ),
            });
        }

        let sites: Vec<SiteVertex> = points
            .iter()
            .enumerate()
            .map(|(index, p)| SiteVertex {
                position: to_spade_point(*p),
                index,
            })
            .collect();

        let delaunay: DelaunayTriangulation<SiteVertex> = DelaunayTriangulation::bulk_load_stable(sites)
            .map_err(|e| MathError::DegenerateInput {
                reason: format!("spade bulk_load_stable failed: {:?}", e),
            })?;

        if delaunay.num_inner_faces() == 0 {
            return Err(MathError::DegenerateInput {
                reason: format!("all {} points are collinear", points.len()),
            });
        }

        let mut triangles = Vec::with_capacity(delaunay.num_inner_faces());
        let mut edges: Vec<Edge> = Vec::new();
        let mut edge_lookup: HashMap<(usize, usize), usize> = HashMap::new();

        for face in delaunay.inner_faces() {
            let [mut i, j, mut k] = face.vertices().map(|v| v.data().index);
            let positions = face.vertices().map(|v| from_spade_point(v.position()));
            if simple_geometry::orient(positions[0], positions[1], positions[2]) < 0.0 {
                std::mem::swap(&mut i, &mut k);
            }
            let vertices = [i, j, k];
            let triangle_index = triangles.len();

            let mut edge_indices = [0usize; 3];
            let mut longest_edge: f64 = 0.0;
            for slot in 0..3 {
                let (u, v) = (vertices[slot], vertices[(slot + 1) % 3]);
                let key = (u.min(v), u.max(v));
                let edge_index = *edge_lookup.entry(key).or_insert_with(|| {
                    edges.push(Edge {
                        a: key.0,
                        b: key.1,
                        length: simple_geometry::distance(points[key.0], points[key.1]),
                        triangles: [None, None],
                    });
                    edges.len() - 1
                });
                let edge = &mut edges[edge_index];
                if edge.triangles[0].is_none() {
                    edge.triangles[0] = Some(triangle_index);
                } else {
                    edge.triangles[1] = Some(triangle_index);
                }
                longest_edge = longest_edge.max(edge.length);
                edge_indices[slot] = edge_index;
            }

            triangles.push(Triangle {
                vertices,
                edges: edge_indices,
                circumradius: simple_geometry::circumradius(
                    points[vertices[0]],
                    points[vertices[1]],
                    points[vertices[2]],
                ),
                longest_edge,
            });
        }

        let mut neighbors = vec![Vec::new(); points.len()];
        let mut on_hull = vec![false; points.len()];
        let mut nearest = vec![f64::INFINITY; points.len()];
        for edge in &edges {
            neighbors[edge.a].push(edge.b);
            neighbors[edge.b].push(edge.a);
            nearest[edge.a] = nearest[edge.a].min(edge.length);
            nearest[edge.b] = nearest[edge.b].min(edge.length);
            if edge.is_hull_edge() {
                on_hull[edge.a] = true;
                on_hull[edge.b] = true;
            }
        }
        for list in neighbors.iter_mut() {
            list.sort_unstable();
        }

        debug!(
            "Triangulation: {} points, {} triangles, {} edges, {} hull points",
            points.len(),
            triangles.len(),
            edges.len(),
            on_hull.iter().filter(|h| **h).count()
        );

        Ok(Self {
            points,
            triangles,
            edges,
            neighbors,
            on_hull,
            nearest,
        })
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Point2D {
        self.points[index]
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Delaunay-Nachbarn eines Punktes, aufsteigend sortiert
    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.neighbors[index]
    }

    /// Liegt der Punkt auf der konvexen Hülle (unbeschränkte Voronoi-Zelle)?
    pub fn is_hull_point(&self, index: usize) -> bool {
        self.on_hull[index]
    }

    /// Findet die Kante zwischen zwei Punkten, falls sie existiert.
    pub fn edge_between(&self, a: usize, b: usize) -> Option<&Edge> {
        let (a, b) = (a.min(b), a.max(b));
        self.neighbors[a]
            .binary_search(&b)
            .ok()
            .and_then(|_| self.edges.iter().find(|e| e.a == a && e.b == b))
    }

    /// Abstand zum nächsten Nachbarn. Der nächste Nachbar ist immer ein Delaunay-Nachbar.
    pub fn nearest_neighbor_distance(&self, index: usize) -> f64 {
        self.nearest[index]
    }

    pub fn nearest_neighbor_distances(&self) -> &[f64] {
        &self.nearest
    }

    /// Mittlerer Nächste-Nachbar-Abstand (ICD), Standardwert für Alpha.
    pub fn mean_nearest_neighbor_distance(&self) -> f64 {
        self.nearest.iter().sum::<f64>() / self.nearest.len() as f64
    }

    /// Längste Kante der Triangulation
    pub fn longest_edge(&self) -> f64 {
        self.edges.iter().map(|e| e.length).fold(0.0, f64::max)
    }
}

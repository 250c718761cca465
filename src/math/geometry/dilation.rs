// src/math/geometry/dilation.rs

//! Äußerer Offset (Minkowski-Summe mit einer Kreisscheibe) von Polygonen.
//!
//! Die Scheibe wird durch ein umschriebenes regelmäßiges n-Eck angenähert,
//! damit der Offset die exakte Pufferzone stets vollständig enthält. Das
//! Ergebnis ist die Vereinigung aus Polygon, einem Rechteck entlang jeder
//! Ringkante und einem n-Eck um jeden Ringpunkt. Einzelne Strecken und
//! Punkte außerhalb der Polygone werden auf dieselbe Weise aufgedickt.

use crate::math::{
    error::{MathError, MathResult},
    geometry::boundary::Boundary,
    types::Point2D,
    utils::{constants, simple_geometry},
};
use geo::{Area, BooleanOps, LineString, MultiPolygon, Polygon};
use tracing::{debug, warn};

/// Dilatiert Polygone um einen festen Abstand.
#[derive(Debug, Clone)]
pub struct BoundaryDilator {
    distance: f64,
    segments: usize,
}

impl BoundaryDilator {
    /// `distance` in Pixeln; 0.0 ist die Identität.
    pub fn new(distance: f64) -> MathResult<Self> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(MathError::invalid(
                "dilation_factor",
                format!("must be a finite, non-negative length, got {}", distance),
            ));
        }
        Ok(Self {
            distance,
            segments: constants::CIRCLE_SEGMENTS,
        })
    }

    /// Anzahl der Seiten der Kreisapproximation (mindestens 8).
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments.max(8);
        self
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Dilatiert ein einzelnes Polygon. Das Ergebnis ist wieder ein einfaches Polygon.
    pub fn dilate_polygon(&self, polygon: &Polygon<f64>) -> MathResult<Polygon<f64>> {
        if self.distance == 0.0 {
            return Ok(polygon.clone());
        }
        let merged = self.dilate_pieces(std::slice::from_ref(polygon));
        let mut pieces = merged.0;
        if pieces.len() > 1 {
            warn!(
                "BoundaryDilator: dilation produced {} pieces, keeping the largest",
                pieces.len()
            );
        }
        pieces.sort_by(|a, b| b.unsigned_area().total_cmp(&a.unsigned_area()));
        pieces.into_iter().next().ok_or_else(|| MathError::DegenerateInput {
            reason: "dilation of polygon produced an empty result".to_string(),
        })
    }

    /// Dilatiert alle Polygone; überlappende Säume verschmelzen.
    pub fn dilate(&self, boundary: &Boundary) -> MathResult<Boundary> {
        if self.distance == 0.0 {
            return Ok(boundary.clone());
        }
        let source_area = boundary.area();
        let merged = self.dilate_pieces(boundary.polygons());
        let result = Boundary::new(merged)?;
        debug!(
            "BoundaryDilator: distance {:.3}, {} -> {} polygon(s), area {:.1} -> {:.1}",
            self.distance,
            boundary.polygons().len(),
            result.polygons().len(),
            source_area,
            result.area()
        );
        Ok(result)
    }

    /// Wie [`dilate`](Self::dilate), schließt aber zusätzlich Strecken
    /// (z. B. lose Kanten des Alpha-Komplexes) und Einzelpunkte ein.
    ///
    /// Bei Abstand 0 können Strecken und Punkte keine Fläche bilden; sind
    /// welche vorhanden, schlägt das mit `IncompleteBoundary` fehl.
    pub fn dilate_covering(
        &self,
        boundary: &Boundary,
        segments: &[(Point2D, Point2D)],
        points: &[Point2D],
    ) -> MathResult<Boundary> {
        if segments.is_empty() && points.is_empty() {
            return self.dilate(boundary);
        }
        if self.distance == 0.0 {
            return Err(MathError::IncompleteBoundary {
                reason: format!(
                    "{} point(s) and {} edge(s) outside the alpha polygons cannot be covered without dilation",
                    points.len(),
                    segments.len()
                ),
            });
        }
        let mut pieces = vec![self.dilate_pieces(boundary.polygons())];
        for &(a, b) in segments {
            if let Some(rect) = self.edge_rectangle(a, b) {
                pieces.push(MultiPolygon::new(vec![rect]));
            }
            pieces.push(MultiPolygon::new(vec![self.vertex_disk(a)]));
            pieces.push(MultiPolygon::new(vec![self.vertex_disk(b)]));
        }
        for &p in points {
            pieces.push(MultiPolygon::new(vec![self.vertex_disk(p)]));
        }
        let result = Boundary::new(Self::union_all(pieces))?;
        debug!(
            "BoundaryDilator: distance {:.3}, {} polygon(s) + {} edge(s) + {} point(s) -> {} polygon(s), area {:.1}",
            self.distance,
            boundary.polygons().len(),
            segments.len(),
            points.len(),
            result.polygons().len(),
            result.area()
        );
        Ok(result)
    }

    fn dilate_pieces(&self, polygons: &[Polygon<f64>]) -> MultiPolygon<f64> {
        let mut pieces: Vec<MultiPolygon<f64>> = Vec::new();
        for polygon in polygons {
            pieces.push(MultiPolygon::new(vec![polygon.clone()]));
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                let coords = Self::open_ring(ring);
                let n = coords.len();
                for i in 0..n {
                    let (a, b) = (coords[i], coords[(i + 1) % n]);
                    if let Some(rect) = self.edge_rectangle(a, b) {
                        pieces.push(MultiPolygon::new(vec![rect]));
                    }
                    pieces.push(MultiPolygon::new(vec![self.vertex_disk(a)]));
                }
            }
        }
        Self::union_all(pieces)
    }

    /// Paarweise Vereinigung als balancierter Baum.
    fn union_all(mut pieces: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
        while pieces.len() > 1 {
            let mut next = Vec::with_capacity(pieces.len().div_ceil(2));
            let mut iter = pieces.into_iter();
            while let Some(first) = iter.next() {
                match iter.next() {
                    Some(second) => next.push(first.union(&second)),
                    None => next.push(first),
                }
            }
            pieces = next;
        }
        pieces.pop().unwrap_or_else(|| MultiPolygon::new(vec![]))
    }

    fn open_ring(ring: &LineString<f64>) -> Vec<Point2D> {
        let mut coords = ring.0.clone();
        if coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }
        coords
    }

    /// Rechteck der halben Breite `distance` um die Kante (CCW).
    fn edge_rectangle(&self, a: Point2D, b: Point2D) -> Option<Polygon<f64>> {
        let length = simple_geometry::distance(a, b);
        if length <= constants::EPSILON {
            return None;
        }
        let nx = -(b.y - a.y) / length * self.distance;
        let ny = (b.x - a.x) / length * self.distance;
        let corners = vec![
            Point2D { x: a.x - nx, y: a.y - ny },
            Point2D { x: b.x - nx, y: b.y - ny },
            Point2D { x: b.x + nx, y: b.y + ny },
            Point2D { x: a.x + nx, y: a.y + ny },
        ];
        Some(Polygon::new(LineString::from(corners), vec![]))
    }

    /// Umschriebenes regelmäßiges n-Eck um `center`.
    fn vertex_disk(&self, center: Point2D) -> Polygon<f64> {
        let radius = self.distance / (constants::PI / self.segments as f64).cos();
        let corners: Vec<Point2D> = (0..self.segments)
            .map(|k| {
                let angle = constants::TAU * k as f64 / self.segments as f64;
                Point2D {
                    x: center.x + radius * angle.cos(),
                    y: center.y + radius * angle.sin(),
                }
            })
            .collect();
        Polygon::new(LineString::from(corners), vec![])
    }
}

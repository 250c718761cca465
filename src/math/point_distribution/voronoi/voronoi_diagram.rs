// src/math/point_distribution/voronoi/voronoi_diagram.rs

use crate::math::{
    types::{Bounds2D, Point2D},
    utils::simple_geometry,
};
use geo::{LineString, MultiPolygon, Polygon};

/// Repräsentiert eine einzelne Zelle in einem Voronoi-Diagramm.
#[derive(Debug, Clone)]
pub struct VoronoiCell {
    /// Index des Generatorpunktes in der Eingabe
    pub id: usize,
    /// Der Generatorpunkt (Site), der diese Zelle definiert.
    pub generator: Point2D,
    /// Eckpunkte der ungeclippten Zelle (CCW), beschnitten nur durch den Rechenrahmen.
    pub vertices: Vec<Point2D>,
    /// Schnitt der Zelle mit der Boundary.
    pub region: MultiPolygon<f64>,
    /// IDs der Nachbarn, die eine Voronoi-Kante positiver Länge beisteuern
    pub neighbor_ids: Vec<usize>,
    pub unclipped_area: f64,
    /// Fläche des geclippten Bereichs
    pub area: f64,
    /// Generator liegt auf der konvexen Hülle, die Zelle ist eigentlich unbeschränkt.
    pub is_unbounded: bool,
    /// Unbeschränkt oder durch die Boundary beschnitten.
    pub edge_affected: bool,
}

impl VoronoiCell {
    pub fn neighbor_count(&self) -> usize {
        self.neighbor_ids.len()
    }

    /// Zelle fließt in die Statistik ein
    pub fn is_bound(&self) -> bool {
        !self.edge_affected
    }

    /// Umfang der ungeclippten Zelle
    pub fn perimeter(&self) -> f64 {
        let n = self.vertices.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| simple_geometry::distance(self.vertices[i], self.vertices[(i + 1) % n]))
            .sum()
    }

    pub fn unclipped_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.vertices.clone()), vec![])
    }
}

/// Alle Zellen einer Analyse, eine pro Eingabepunkt und in Eingabereihenfolge.
#[derive(Debug, Clone, Default)]
pub struct VoronoiDiagram {
    pub cells: Vec<VoronoiCell>,
    /// Rahmen, in dem die ungeclippten Zellen konstruiert wurden
    pub frame: Option<Bounds2D>,
}

impl VoronoiDiagram {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, id: usize) -> Option<&VoronoiCell> {
        self.cells.get(id)
    }

    pub fn bound_cells(&self) -> impl Iterator<Item = &VoronoiCell> + '_ {
        self.cells.iter().filter(|c| c.is_bound())
    }

    pub fn bound_count(&self) -> usize {
        self.bound_cells().count()
    }

    /// Summe der geclippten Flächen; entspricht der Boundary-Fläche.
    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(|c| c.area).sum()
    }

    /// Jedes Nachbarpaar genau einmal, mit `a < b`.
    pub fn neighbor_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self
            .cells
            .iter()
            .flat_map(|c| c.neighbor_ids.iter().map(move |&n| (c.id.min(n), c.id.max(n))))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

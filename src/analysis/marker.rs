// src/analysis/marker.rs

use crate::math::point_distribution::voronoi::{VoronoiCell, VoronoiDiagram};
use serde::{Deserialize, Serialize};

/// Welche Information pro Zelle an einen Renderer weitergegeben wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    #[default]
    None,
    Index,
    Neighbors,
    Point,
}

/// Beschreibung einer Zellmarkierung. Farben und Symbole wählt der Aufrufer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Marker {
    None,
    Index(usize),
    Neighbors(usize),
    Point,
}

impl Marker {
    pub fn for_cell(kind: MarkerKind, cell: &VoronoiCell) -> Self {
        match kind {
            MarkerKind::None => Marker::None,
            MarkerKind::Index => Marker::Index(cell.id),
            MarkerKind::Neighbors => Marker::Neighbors(cell.neighbor_count()),
            MarkerKind::Point => Marker::Point,
        }
    }
}

/// Ein Marker pro Zelle, in Zellreihenfolge.
pub fn markers(kind: MarkerKind, diagram: &VoronoiDiagram) -> Vec<Marker> {
    diagram.cells.iter().map(|cell| Marker::for_cell(kind, cell)).collect()
}

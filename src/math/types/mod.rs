// src/math/types/mod.rs
pub mod bounds;
pub mod point_set;

pub use bounds::*;
pub use point_set::*;

// Re-export häufig verwendete externe Typen
pub use geo::{Coord, MultiPolygon, Polygon};
pub use spade::Point2;

// Einheitliche Typen für das gesamte Modul
pub type Point2D = Coord<f64>;
pub type SpadePoint = Point2<f64>;

/// Konvertiert einen geo-Coord in einen Spade-Punkt.
pub fn to_spade_point(p: Point2D) -> SpadePoint {
    SpadePoint::new(p.x, p.y)
}

/// Konvertiert einen Spade-Punkt in einen geo-Coord.
pub fn from_spade_point(p: SpadePoint) -> Point2D {
    Point2D { x: p.x, y: p.y }
}

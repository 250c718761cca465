// src/math/point_distribution/voronoi/mod.rs

pub mod analyzer;
pub mod voronoi_diagram; // Enthält VoronoiCell und VoronoiDiagram

pub use self::analyzer::VoronoiAnalyzer;
pub use self::voronoi_diagram::{VoronoiCell, VoronoiDiagram};

// src/math/point_distribution/mod.rs

// Deklaration der verschiedenen Punktverteilungs-Methoden/Module
pub mod density;
pub mod sampling;
pub mod voronoi;

// Re-Exporte der wichtigsten Elemente aus den Untermodulen
pub use self::density::{DensityEstimator, DensityField, RegionOfInterest};
pub use self::sampling::PointSampler;
pub use self::voronoi::{VoronoiAnalyzer, VoronoiCell, VoronoiDiagram};

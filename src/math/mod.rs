// src/math/mod.rs

pub mod algorithms;
pub mod error;
pub mod geometry;
pub mod point_distribution;
pub mod scalar_field;
pub mod types;
pub mod utils;

// Re-exports für einfache Verwendung
pub use error::{MathError, MathResult};
pub use types::*;

// Öffentliche API
pub mod prelude {
    pub use super::{
        algorithms::{Contour, Triangulation},
        error::{MathError, MathResult},
        geometry::{AlphaCriterion, AlphaShape, AlphaShapeBuilder, Boundary, BoundaryDilator},
        point_distribution::{
            DensityEstimator, DensityField, PointSampler, RegionOfInterest, VoronoiAnalyzer, VoronoiCell,
            VoronoiDiagram,
        },
        scalar_field::ScalarField2D,
        types::*,
    };
}

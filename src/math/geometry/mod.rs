// src/math/geometry/mod.rs

// Deklaration der Haupt-Geometriemodule
pub mod alpha_shape;
pub mod boundary;
pub mod dilation;

// Re-Exporte für einen schnellen Zugriff auf die Kern-Geometrietypen
pub use self::alpha_shape::{AlphaCriterion, AlphaShape, AlphaShapeBuilder};
pub use self::boundary::Boundary;
pub use self::dilation::BoundaryDilator;

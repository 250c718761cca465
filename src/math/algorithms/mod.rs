// src/math/algorithms/mod.rs

// Deklaration der verschiedenen Algorithmus-Kategorien
pub mod clipping; // Konvexe Zellen gegen Halbebenen
pub mod marching_squares;
pub mod triangulation;

pub use self::clipping::{ConvexCell, HalfPlane, PolygonClipper};
pub use self::marching_squares::{Contour, MarchingSquares};
pub use self::triangulation::{Edge, Triangle, Triangulation};

// src/math/geometry/alpha_shape/mod.rs

pub mod boundary_trace; // Zerlegung der Randkanten in geschlossene Zyklen
pub mod builder;

pub use self::boundary_trace::trace_cycles;
pub use self::builder::{AlphaCriterion, AlphaShape, AlphaShapeBuilder};

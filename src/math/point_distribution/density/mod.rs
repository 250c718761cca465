// src/math/point_distribution/density/mod.rs

pub mod estimator;
pub mod field; // DensityGrid, DensityField, RegionOfInterest

pub use self::estimator::DensityEstimator;
pub use self::field::{DensityField, DensityGrid, IsoContour, RegionOfInterest};

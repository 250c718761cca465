// ./src/lib.rs

// Eigene Module deklarieren
pub mod analysis;
pub mod math;

pub mod prelude {
    pub use crate::analysis::{
        AnalysisConfig, AnalysisReport, BoundarySelection, Marker, MarkerKind, MosaicAnalysis,
        MosaicStatistics, RandomReference,
    };
    pub use crate::math::prelude::*;
}

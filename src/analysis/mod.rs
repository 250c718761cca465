// src/analysis/mod.rs

pub mod config;
pub mod marker;
pub mod pipeline;
pub mod reference;
pub mod statistics;

pub use self::config::{AnalysisConfig, BoundarySelection, LengthSetting, ResolvedConfig};
pub use self::marker::{Marker, MarkerKind};
pub use self::pipeline::{AnalysisReport, MosaicAnalysis};
pub use self::reference::{RandomReference, ReferenceSummary};
pub use self::statistics::{AveragedStatistics, MeanStd, MosaicStatistics};

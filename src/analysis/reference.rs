// src/analysis/reference.rs

//! Zufallsreferenz: dieselbe Analyse auf mehreren zufälligen Mosaiken
//! gleicher Zellzahl und Dichte, gemittelt. Dient als Vergleich, ob ein
//! gemessenes Mosaik regelmäßiger als Zufall ist.

use crate::analysis::{
    config::AnalysisConfig,
    pipeline::MosaicAnalysis,
    statistics::{AveragedStatistics, MosaicStatistics},
};
use crate::math::{
    error::{MathError, MathResult},
    point_distribution::sampling::PointSampler,
    types::PointSet,
};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct RandomReference {
    pub iterations: usize,
    pub cell_count: usize,
    /// Zellen/mm²
    pub density_per_mm2: f64,
    pub microns_per_pixel: f64,
    /// Mindestabstand in µm; 0 ergibt reine Gleichverteilung
    pub min_separation_um: f64,
    pub config: AnalysisConfig,
}

impl Default for RandomReference {
    fn default() -> Self {
        Self {
            iterations: 10,
            cell_count: 100,
            density_per_mm2: 1000.0,
            microns_per_pixel: 1.0,
            min_separation_um: 0.0,
            config: AnalysisConfig::default(),
        }
    }
}

/// Einzelläufe und ihr Mittel.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceSummary {
    /// Seitenlänge des quadratischen Bildfelds in Pixeln
    pub side_px: f64,
    pub runs: Vec<MosaicStatistics>,
    pub average: AveragedStatistics,
}

impl RandomReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_cells(mut self, count: usize) -> Self {
        self.cell_count = count;
        self
    }

    pub fn with_density(mut self, density_per_mm2: f64) -> Self {
        self.density_per_mm2 = density_per_mm2;
        self
    }

    pub fn with_scale(mut self, microns_per_pixel: f64) -> Self {
        self.microns_per_pixel = microns_per_pixel;
        self
    }

    pub fn with_min_separation(mut self, min_separation_um: f64) -> Self {
        self.min_separation_um = min_separation_um;
        self
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if self.iterations == 0 {
            return Err(MathError::invalid("iterations", "must be at least 1"));
        }
        if self.cell_count < 3 {
            return Err(MathError::InsufficientData {
                operation: "RandomReference".to_string(),
                expected: 3,
                actual: self.cell_count,
            });
        }
        if !(self.min_separation_um.is_finite() && self.min_separation_um >= 0.0) {
            return Err(MathError::invalid(
                "min_separation",
                format!("must be a finite, non-negative length, got {}", self.min_separation_um),
            ));
        }
        PointSampler::auto_dimension(self.cell_count, self.density_per_mm2, self.microns_per_pixel)?;
        self.config.validate()
    }

    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> MathResult<ReferenceSummary> {
        self.validate()?;
        let side_px = PointSampler::auto_dimension(self.cell_count, self.density_per_mm2, self.microns_per_pixel)?;
        // Mindestabstand auf ganze Pixel gerundet
        let min_separation_px = (self.min_separation_um / self.microns_per_pixel).round();
        info!(
            "RandomReference: {} x {} cells in {:.0} x {:.0} px, separation {} px",
            self.iterations, self.cell_count, side_px, side_px, min_separation_px
        );

        let mut runs = Vec::with_capacity(self.iterations);
        for iteration in 0..self.iterations {
            let points = if min_separation_px > 0.0 {
                PointSampler::with_min_separation(self.cell_count, side_px, side_px, min_separation_px, rng)?
            } else {
                PointSampler::uniform(self.cell_count, side_px, side_px, rng)?
            };
            let point_set = PointSet::new(points, side_px, side_px, self.microns_per_pixel, 0)?;
            let report = MosaicAnalysis::run(&point_set, &self.config)?;
            debug!(
                "RandomReference: run {} has {} bound cells, NNRI {:?}",
                iteration, report.statistics.bound_cell_count, report.statistics.nnri
            );
            runs.push(report.statistics);
        }

        let average = MosaicStatistics::average(&runs).ok_or_else(|| MathError::InsufficientData {
            operation: "RandomReference".to_string(),
            expected: 1,
            actual: 0,
        })?;
        Ok(ReferenceSummary { side_px, runs, average })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};

    fn small_reference() -> RandomReference {
        RandomReference::new()
            .with_iterations(3)
            .with_cells(150)
            .with_config(AnalysisConfig::new().with_grid_density(40))
    }

    #[test]
    fn test_random_reference_averages_runs() {
        let summary = small_reference().run(&mut StdRng::seed_from_u64(4)).unwrap();
        // 150 Zellen bei 1000/mm² -> 0.15 mm²
        assert_eq!(summary.side_px, 387.0);
        assert_eq!(summary.runs.len(), 3);
        assert_eq!(summary.average.runs, 3);
        assert_relative_eq!(summary.average.cell_count, 150.0);

        let nn_means: Vec<f64> = summary.runs.iter().map(|s| s.nearest_neighbor_um.unwrap().mean).collect();
        assert_relative_eq!(
            summary.average.nearest_neighbor_um.unwrap().mean,
            nn_means.iter().sum::<f64>() / 3.0,
            max_relative = 1e-12
        );
        let nnri = summary.average.nnri.unwrap();
        assert!((1.3..3.0).contains(&nnri), "nnri {}", nnri);
    }

    #[test]
    fn test_min_separation_raises_regularity() {
        let random = small_reference().run(&mut StdRng::seed_from_u64(6)).unwrap();
        let spaced = small_reference()
            .with_min_separation(20.0)
            .run(&mut StdRng::seed_from_u64(6))
            .unwrap();
        assert!(spaced.runs.iter().all(|s| s.nearest_neighbor_um.unwrap().mean >= 20.0));
        assert!(spaced.average.nnri.unwrap() > random.average.nnri.unwrap());
    }

    #[test]
    fn test_reference_is_reproducible() {
        let reference = small_reference().with_iterations(2);
        let a = reference.run(&mut StdRng::seed_from_u64(13)).unwrap();
        let b = reference.run(&mut StdRng::seed_from_u64(13)).unwrap();
        assert_eq!(a.average, b.average);
    }

    #[test]
    fn test_invalid_reference() {
        let mut rng = StdRng::seed_from_u64(1);
        for reference in [
            RandomReference::new().with_iterations(0),
            RandomReference::new().with_density(0.0),
            RandomReference::new().with_scale(-1.0),
            RandomReference::new().with_min_separation(f64::NAN),
            RandomReference::new().with_config(AnalysisConfig::new().with_cutoff(2.0)),
        ] {
            assert!(matches!(reference.run(&mut rng), Err(MathError::InvalidParameter { .. })));
        }
        assert!(matches!(
            RandomReference::new().with_cells(2).run(&mut rng),
            Err(MathError::InsufficientData { .. })
        ));
    }
}

// src/analysis/pipeline.rs

use crate::analysis::{
    config::{AnalysisConfig, BoundarySelection, ResolvedConfig},
    marker::{Marker, MarkerKind, markers},
    statistics::MosaicStatistics,
};
use crate::math::{
    algorithms::triangulation::Triangulation,
    error::MathResult,
    geometry::{alpha_shape::AlphaShape, boundary::Boundary},
    point_distribution::{
        density::DensityField,
        voronoi::{VoronoiAnalyzer, VoronoiDiagram},
    },
    types::PointSet,
};
use tracing::{debug, info};

/// Alle Zwischenergebnisse einer Analyse.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub config: ResolvedConfig,
    pub triangulation: Triangulation,
    /// Unverändertes Ergebnis der Alpha-Shape, vor Auswahl und Dilatation
    pub alpha_shape: AlphaShape,
    /// Ausgewählte und dilatierte Boundary
    pub boundary: Boundary,
    pub voronoi: VoronoiDiagram,
    pub density: DensityField,
    pub statistics: MosaicStatistics,
}

impl AnalysisReport {
    pub fn markers(&self, kind: MarkerKind) -> Vec<Marker> {
        markers(kind, &self.voronoi)
    }
}

pub struct MosaicAnalysis;

impl MosaicAnalysis {
    pub fn run(point_set: &PointSet, config: &AnalysisConfig) -> MathResult<AnalysisReport> {
        config.validate()?;
        info!(
            "MosaicAnalysis: {} points, {:.1} x {:.1} px",
            point_set.len(),
            point_set.width(),
            point_set.height()
        );

        let triangulation = Triangulation::build(point_set)?;
        let resolved = config.resolve(&triangulation)?;

        let alpha_shape = resolved.alpha_builder().build(&triangulation)?;
        let selected = match resolved.boundary_selection {
            BoundarySelection::All => alpha_shape.polygons().to_vec(),
            BoundarySelection::Largest => vec![alpha_shape.primary().clone()],
        };
        debug!(
            "MosaicAnalysis: {:?} selects {} of {} polygon(s)",
            resolved.boundary_selection,
            selected.len(),
            alpha_shape.len()
        );
        let selected = Boundary::from_polygons(selected)?;
        let dilator = resolved.dilator()?;
        let boundary = match resolved.boundary_selection {
            // Jeder Punkt muss in der Boundary liegen, auch außerhalb der Alpha-Polygone
            BoundarySelection::All => {
                let segments: Vec<_> = alpha_shape
                    .stray_edges()
                    .iter()
                    .map(|&(a, b)| (triangulation.point(a), triangulation.point(b)))
                    .collect();
                let loose: Vec<_> = alpha_shape
                    .uncovered()
                    .iter()
                    .map(|&i| triangulation.point(i))
                    .collect();
                dilator.dilate_covering(&selected, &segments, &loose)?
            }
            BoundarySelection::Largest => dilator.dilate(&selected)?,
        };

        let voronoi = VoronoiAnalyzer::new().analyze(&triangulation, &boundary)?;
        let density = resolved
            .density_estimator()
            .estimate(point_set, Some(&boundary))?;
        let statistics = MosaicStatistics::compute(point_set, &triangulation, &voronoi, &boundary);

        info!(
            "MosaicAnalysis: {} of {} cells bound, boundary area {:.1} µm², density {:.1} cells/mm²",
            statistics.bound_cell_count,
            statistics.cell_count,
            statistics.estimated_area_um2,
            statistics.estimated_density_per_mm2
        );

        Ok(AnalysisReport {
            config: resolved,
            triangulation,
            alpha_shape,
            boundary,
            voronoi,
            density,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{error::MathError, point_distribution::sampling::PointSampler};
    use approx::assert_relative_eq;
    use geo::{Area, coord};
    use rand::{SeedableRng, rngs::StdRng};

    fn grid(nx: usize, ny: usize, spacing: f64, offset: (f64, f64)) -> Vec<(f64, f64)> {
        let mut points = Vec::new();
        for j in 0..ny {
            for i in 0..nx {
                points.push((offset.0 + i as f64 * spacing, offset.1 + j as f64 * spacing));
            }
        }
        points
    }

    fn random_set(count: usize, size: f64, seed: u64) -> PointSet {
        let mut rng = StdRng::seed_from_u64(seed);
        PointSet::new(PointSampler::uniform(count, size, size, &mut rng).unwrap(), size, size, 1.0, 0).unwrap()
    }

    #[test]
    fn test_grid_with_default_config() {
        let set = PointSet::from_pairs(grid(3, 3, 10.0, (10.0, 10.0)), 40.0, 40.0, 1.0).unwrap();
        let report = MosaicAnalysis::run(&set, &AnalysisConfig::new().with_grid_density(40)).unwrap();

        assert_relative_eq!(report.config.alpha, 10.0, epsilon = 1e-9);
        assert_relative_eq!(report.config.dilation, 5.0, epsilon = 1e-9);
        assert_eq!(report.alpha_shape.len(), 1);
        assert_relative_eq!(report.alpha_shape.area(), 400.0, epsilon = 1e-6);

        // Quadrat 20 x 20, um 5 erweitert: 400 + 80 * 5 + pi * 25
        let expected = 400.0 + 400.0 + std::f64::consts::PI * 25.0;
        assert_relative_eq!(report.boundary.area(), expected, max_relative = 0.01);

        assert_eq!(report.voronoi.len(), 9);
        assert_eq!(report.statistics.cell_count, 9);
        let clipped: f64 = report.voronoi.cells.iter().map(|c| c.region.unsigned_area()).sum();
        assert_relative_eq!(clipped, report.boundary.area(), max_relative = 1e-4);
    }

    #[test]
    fn test_boundary_selection() {
        let mut points = grid(4, 4, 10.0, (10.0, 10.0));
        points.extend(grid(3, 3, 10.0, (120.0, 120.0)));
        let set = PointSet::from_pairs(points, 160.0, 160.0, 1.0).unwrap();
        let config = AnalysisConfig::new().with_grid_density(60);

        let all = MosaicAnalysis::run(&set, &config).unwrap();
        assert_eq!(all.alpha_shape.len(), 2);
        assert_eq!(all.boundary.polygons().len(), 2);

        let largest = MosaicAnalysis::run(&set, &config.clone().with_selection(BoundarySelection::Largest)).unwrap();
        assert_eq!(largest.alpha_shape.len(), 2);
        assert_eq!(largest.boundary.polygons().len(), 1);
        assert!(largest.boundary.area() < all.boundary.area());
        // Zellen des verworfenen Clusters liegen außerhalb und gelten als randbeeinflusst
        assert!(largest.voronoi.cells[16..].iter().all(|c| c.edge_affected));
    }

    #[test]
    fn test_random_mosaic_end_to_end() {
        let set = random_set(200, 500.0, 3);
        let report = MosaicAnalysis::run(&set, &AnalysisConfig::new().with_grid_density(80)).unwrap();

        assert_eq!(report.voronoi.len(), 200);
        assert!(report.statistics.bound_cell_count > 0);
        assert!(report.statistics.nnri.is_some());
        assert!(report.density.roi.node_count > 0);
        assert_eq!(report.density.contours.len(), 10);

        let clipped: f64 = report.voronoi.cells.iter().map(|c| c.region.unsigned_area()).sum();
        assert_relative_eq!(clipped, report.boundary.area(), max_relative = 1e-4);

        let neighbors = report.markers(MarkerKind::Neighbors);
        assert_eq!(neighbors.len(), 200);
    }

    #[test]
    fn test_default_boundary_covers_every_point() {
        for seed in [1, 3, 5, 9] {
            let set = random_set(500, 1000.0, seed);
            let report = MosaicAnalysis::run(&set, &AnalysisConfig::new().with_grid_density(60)).unwrap();
            assert!(!report.alpha_shape.uncovered().is_empty());
            let outside = set.points().iter().filter(|p| !report.boundary.contains_point(**p)).count();
            assert_eq!(outside, 0, "seed {}: {} points outside the boundary", seed, outside);
            assert!(report.voronoi.cells.iter().all(|c| c.area > 0.0));
        }
    }

    #[test]
    fn test_zero_dilation_with_loose_points_is_incomplete() {
        let mut points = grid(3, 3, 10.0, (10.0, 10.0));
        points.push((90.0, 90.0));
        let set = PointSet::from_pairs(points, 100.0, 100.0, 1.0).unwrap();
        let config = AnalysisConfig::new().with_alpha(10.0).with_grid_density(30);

        let err = MosaicAnalysis::run(&set, &config.clone().with_dilation(0.0)).unwrap_err();
        assert!(matches!(err, MathError::IncompleteBoundary { .. }));

        let report = MosaicAnalysis::run(&set, &config.clone().with_dilation(2.0)).unwrap();
        assert_eq!(report.boundary.polygons().len(), 2);
        assert!(report.boundary.contains_point(coord! { x: 90.0, y: 90.0 }));
        // Largest verwirft den Ausreißer bewusst
        let largest = MosaicAnalysis::run(&set, &config.with_dilation(0.0).with_selection(BoundarySelection::Largest)).unwrap();
        assert!(!largest.boundary.contains_point(coord! { x: 90.0, y: 90.0 }));
    }

    #[test]
    fn test_run_is_deterministic() {
        let set = random_set(120, 300.0, 8);
        let config = AnalysisConfig::new().with_grid_density(50);
        let a = MosaicAnalysis::run(&set, &config).unwrap();
        let b = MosaicAnalysis::run(&set, &config).unwrap();
        assert_eq!(a.statistics, b.statistics);
        assert_eq!(a.boundary, b.boundary);
        assert_eq!(a.density, b.density);
    }

    #[test]
    fn test_invalid_config_fails_early() {
        let set = random_set(30, 100.0, 1);
        let err = MosaicAnalysis::run(&set, &AnalysisConfig::new().with_alpha(0.0)).unwrap_err();
        assert!(matches!(err, MathError::InvalidParameter { .. }));
    }

    #[test]
    fn test_tiny_alpha_is_empty_boundary() {
        let set = random_set(30, 100.0, 1);
        let err = MosaicAnalysis::run(&set, &AnalysisConfig::new().with_alpha(1e-3)).unwrap_err();
        assert!(matches!(err, MathError::EmptyBoundary { .. }));
    }
}

// src/math/point_distribution/voronoi/analyzer.rs

use crate::math::{
    algorithms::{
        clipping::{ConvexCell, HalfPlane, PolygonClipper},
        triangulation::Triangulation,
    },
    error::{MathError, MathResult},
    geometry::boundary::Boundary,
    point_distribution::voronoi::voronoi_diagram::{VoronoiCell, VoronoiDiagram},
    types::{Bounds2D, PointSet},
    utils::{constants, simple_geometry},
};
use geo::Area;
use tracing::{debug, info};

/// Baut das Voronoi-Diagramm einer Punktmenge und beschneidet jede Zelle
/// mit der Boundary.
///
/// Jede Zelle entsteht aus einem großzügigen Rahmen, der nacheinander mit den
/// Mittelsenkrechten zu allen Delaunay-Nachbarn geschnitten wird. So bleibt
/// pro Kante bekannt, welcher Nachbar sie erzeugt hat.
#[derive(Debug, Clone)]
pub struct VoronoiAnalyzer {
    area_tolerance: f64,
}

impl Default for VoronoiAnalyzer {
    fn default() -> Self {
        Self {
            area_tolerance: constants::AREA_TOLERANCE,
        }
    }
}

impl VoronoiAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative Toleranz, ab der eine Zelle als beschnitten gilt.
    pub fn with_area_tolerance(mut self, tolerance: f64) -> Self {
        self.area_tolerance = tolerance.max(0.0);
        self
    }

    /// Trianguliert zuerst und analysiert dann.
    pub fn analyze_point_set(&self, point_set: &PointSet, boundary: &Boundary) -> MathResult<VoronoiDiagram> {
        let distinct = point_set.distinct_count();
        if distinct < 2 {
            return Err(MathError::InsufficientData {
                operation: "voronoi analysis".to_string(),
                expected: 2,
                actual: distinct,
            });
        }
        let triangulation = Triangulation::build(point_set)?;
        self.analyze(&triangulation, boundary)
    }

    pub fn analyze(&self, triangulation: &Triangulation, boundary: &Boundary) -> MathResult<VoronoiDiagram> {
        let points = triangulation.points();
        let mut frame = Bounds2D::from_points_iter(points.iter().copied()).ok_or_else(|| {
            MathError::InsufficientData {
                operation: "voronoi analysis".to_string(),
                expected: 2,
                actual: 0,
            }
        })?;
        if let Some(bounds) = boundary.bounds() {
            frame = frame.union(&bounds);
        }
        let frame = frame.expand(frame.diagonal().max(1.0));
        let min_edge_length = constants::EPSILON * frame.diagonal();

        let clipper = PolygonClipper::new();
        let mut cells = Vec::with_capacity(points.len());

        for (id, &site) in points.iter().enumerate() {
            let mut cell = ConvexCell::from_bounds(&frame);
            for &neighbor in triangulation.neighbors(id) {
                let plane = HalfPlane::bisector(site, points[neighbor]);
                cell = clipper.clip_half_plane(&cell, &plane, neighbor);
                if cell.is_empty() {
                    break;
                }
            }
            if cell.is_empty() {
                return Err(MathError::DegenerateInput {
                    reason: format!("voronoi cell of point #{} collapsed during clipping", id),
                });
            }

            let unclipped_area = cell.area();
            let region = boundary.clip(&cell.to_polygon());
            let area = region.unsigned_area();
            let is_unbounded = triangulation.is_hull_point(id);
            let trimmed = area < unclipped_area - self.area_tolerance * unclipped_area.max(1.0);

            cells.push(VoronoiCell {
                id,
                generator: site,
                neighbor_ids: cell.edge_sources(min_edge_length),
                vertices: cell.vertices,
                region,
                unclipped_area,
                area,
                is_unbounded,
                edge_affected: is_unbounded || trimmed,
            });
        }

        let diagram = VoronoiDiagram {
            cells,
            frame: Some(frame),
        };
        let bound = diagram.bound_count();
        debug!(
            "VoronoiAnalyzer: frame {}, clipped area {:.1} of boundary {:.1}",
            frame,
            diagram.total_area(),
            boundary.area()
        );
        info!(
            "VoronoiAnalyzer: {} cells, {} bound, {} edge-affected",
            diagram.len(),
            bound,
            diagram.len() - bound
        );
        if let Some((mean, _)) = simple_geometry::mean_std(
            &diagram.bound_cells().map(|c| c.neighbor_count() as f64).collect::<Vec<_>>(),
        ) {
            debug!("VoronoiAnalyzer: mean neighbour count of bound cells {:.2}", mean);
        }
        Ok(diagram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geometry::{alpha_shape::AlphaShapeBuilder, dilation::BoundaryDilator};
    use crate::math::point_distribution::sampling::PointSampler;
    use approx::assert_relative_eq;
    use geo::coord;
    use rand::{SeedableRng, rngs::StdRng};

    fn grid_set() -> PointSet {
        let mut pairs = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                pairs.push((10.0 + 10.0 * i as f64, 10.0 + 10.0 * j as f64));
            }
        }
        PointSet::from_pairs(pairs, 40.0, 40.0, 1.0).unwrap()
    }

    fn square(min: f64, max: f64) -> Boundary {
        Boundary::from_polygon(
            Bounds2D::from_points(coord! { x: min, y: min }, coord! { x: max, y: max }).to_polygon(),
        )
        .unwrap()
    }

    #[test]
    fn test_grid_center_cell() {
        let diagram = VoronoiAnalyzer::new().analyze_point_set(&grid_set(), &square(0.0, 40.0)).unwrap();
        assert_eq!(diagram.len(), 9);
        let center = diagram.cell(4).unwrap();
        assert!(!center.is_unbounded);
        assert!(center.is_bound());
        assert_eq!(center.neighbor_ids, vec![1, 3, 5, 7]);
        assert_relative_eq!(center.area, 100.0, epsilon = 1e-4);
        assert_relative_eq!(center.unclipped_area, 100.0, epsilon = 1e-6);
        assert_relative_eq!(center.perimeter(), 40.0, epsilon = 1e-6);
        assert_relative_eq!(center.unclipped_polygon().unsigned_area(), 100.0, epsilon = 1e-6);
        assert_eq!(diagram.bound_count(), 1);
        assert!(diagram.cells.iter().filter(|c| c.id != 4).all(|c| c.edge_affected && c.is_unbounded));
        assert_relative_eq!(diagram.total_area(), 1600.0, epsilon = 1e-3);
        assert_eq!(diagram.neighbor_pairs().len(), 12);
    }

    #[test]
    fn test_trimmed_interior_cell_is_edge_affected() {
        let diagram = VoronoiAnalyzer::new().analyze_point_set(&grid_set(), &square(18.0, 40.0)).unwrap();
        let center = diagram.cell(4).unwrap();
        assert!(!center.is_unbounded);
        assert!(center.edge_affected);
        assert_relative_eq!(center.area, 49.0, epsilon = 1e-4);
        assert_relative_eq!(center.unclipped_area, 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_area_tolerance_decides_trimming() {
        // Beschnitt von 100 auf 49 liegt innerhalb von 60 % Toleranz
        let lenient = VoronoiAnalyzer::new()
            .with_area_tolerance(0.6)
            .analyze_point_set(&grid_set(), &square(18.0, 40.0))
            .unwrap();
        assert!(!lenient.cell(4).unwrap().edge_affected);
        let strict = VoronoiAnalyzer::new()
            .with_area_tolerance(0.4)
            .analyze_point_set(&grid_set(), &square(18.0, 40.0))
            .unwrap();
        assert!(strict.cell(4).unwrap().edge_affected);
        // Randzellen bleiben unabhängig von der Toleranz randbeeinflusst
        assert!(lenient.cell(0).unwrap().edge_affected);
    }

    #[test]
    fn test_cells_partition_boundary() {
        let mut rng = StdRng::seed_from_u64(7);
        let set = PointSet::new(PointSampler::uniform(150, 500.0, 500.0, &mut rng).unwrap(), 500.0, 500.0, 1.0, 0).unwrap();
        let tri = Triangulation::build(&set).unwrap();
        let shape = AlphaShapeBuilder::new()
            .with_alpha(2.0 * tri.mean_nearest_neighbor_distance())
            .build(&tri)
            .unwrap();
        let boundary = Boundary::from_polygons(shape.polygons().to_vec()).unwrap();
        let boundary = BoundaryDilator::new(0.5 * tri.mean_nearest_neighbor_distance())
            .unwrap()
            .dilate(&boundary)
            .unwrap();

        let diagram = VoronoiAnalyzer::new().analyze(&tri, &boundary).unwrap();
        assert_eq!(diagram.len(), set.len());
        assert_relative_eq!(diagram.total_area(), boundary.area(), max_relative = 1e-4);
        for cell in &diagram.cells {
            assert!(cell.area <= cell.unclipped_area * (1.0 + 1e-6));
            assert!(cell.neighbor_count() >= 2);
        }
    }

    #[test]
    fn test_uniform_mosaic_mean_area() {
        let mut rng = StdRng::seed_from_u64(42);
        let set = PointSet::new(PointSampler::uniform(500, 1000.0, 1000.0, &mut rng).unwrap(), 1000.0, 1000.0, 1.0, 0).unwrap();
        let diagram = VoronoiAnalyzer::new().analyze_point_set(&set, &square(0.0, 1000.0)).unwrap();
        let areas: Vec<f64> = diagram.bound_cells().map(|c| c.area).collect();
        let (mean, _) = simple_geometry::mean_std(&areas).unwrap();
        assert!((mean - 2000.0).abs() < 0.2 * 2000.0, "mean bound area {}", mean);
        let neighbors: Vec<f64> = diagram.bound_cells().map(|c| c.neighbor_count() as f64).collect();
        let (mean_neighbors, _) = simple_geometry::mean_std(&neighbors).unwrap();
        assert!((mean_neighbors - 6.0).abs() < 0.5);
    }

    #[test]
    fn test_identical_points_are_insufficient() {
        let set = PointSet::from_pairs([(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)], 10.0, 10.0, 1.0).unwrap();
        let err = VoronoiAnalyzer::new().analyze_point_set(&set, &square(0.0, 10.0)).unwrap_err();
        assert!(matches!(err, MathError::InsufficientData { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        let set = PointSet::new(PointSampler::uniform(60, 200.0, 200.0, &mut rng).unwrap(), 200.0, 200.0, 1.0, 0).unwrap();
        let a = VoronoiAnalyzer::new().analyze_point_set(&set, &square(0.0, 200.0)).unwrap();
        let b = VoronoiAnalyzer::new().analyze_point_set(&set, &square(0.0, 200.0)).unwrap();
        for (x, y) in a.cells.iter().zip(&b.cells) {
            assert_eq!(x.neighbor_ids, y.neighbor_ids);
            assert_eq!(x.area, y.area);
        }
    }
}

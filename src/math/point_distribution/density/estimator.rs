// src/math/point_distribution/density/estimator.rs

use crate::math::{
    algorithms::marching_squares::MarchingSquares,
    error::{MathError, MathResult},
    geometry::boundary::Boundary,
    point_distribution::density::field::{DensityField, DensityGrid, IsoContour},
    types::PointSet,
    utils::constants,
};
use nalgebra::{Matrix2, Vector2};
use tracing::{debug, info};

/// Gaußsche Kerndichteschätzung auf einem regelmäßigen Gitter.
///
/// Die Kernkovarianz ist `bandwidth² * Datenkovarianz`; `bandwidth`
/// ist also ein Anteil der Datenstreuung und keine absolute Länge.
#[derive(Debug, Clone)]
pub struct DensityEstimator {
    /// Anteil der Datenstreuung
    pub bandwidth: f64,
    /// Knoten entlang der längeren Bildseite
    pub resolution: usize,
    pub contour_levels: usize,
    /// Anteil des Maximums in [0, 1]
    pub cutoff: f64,
}

impl Default for DensityEstimator {
    fn default() -> Self {
        Self {
            bandwidth: 0.1,
            resolution: 200,
            contour_levels: 10,
            cutoff: 0.4,
        }
    }
}

impl DensityEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_contour_levels(mut self, levels: usize) -> Self {
        self.contour_levels = levels;
        self
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if !(self.bandwidth.is_finite() && self.bandwidth > 0.0) {
            return Err(MathError::invalid(
                "pdf_bandwidth",
                format!("must be positive, got {}", self.bandwidth),
            ));
        }
        if self.resolution < 2 {
            return Err(MathError::invalid(
                "grid_density",
                format!("needs at least 2 nodes, got {}", self.resolution),
            ));
        }
        if !(0.0..=1.0).contains(&self.cutoff) {
            return Err(MathError::invalid(
                "cutoff",
                format!("must lie in [0, 1], got {}", self.cutoff),
            ));
        }
        Ok(())
    }

    /// Konturniveaus `k / (levels + 1)` für `k = 1..=levels`.
    pub fn levels(&self) -> Vec<f64> {
        let step = 1.0 / (self.contour_levels + 1) as f64;
        (1..=self.contour_levels).map(|k| k as f64 * step).collect()
    }

    /// Schätzt die Dichte. Mit `boundary` werden nur Knoten innerhalb der
    /// Boundary in die Region of Interest aufgenommen.
    pub fn estimate(&self, point_set: &PointSet, boundary: Option<&Boundary>) -> MathResult<DensityField> {
        self.validate()?;
        let kernel = Kernel::fit(point_set, self.bandwidth)?;

        let (nx, ny) = self.grid_shape(point_set.width(), point_set.height());
        let dx = point_set.width() / (nx - 1) as f64;
        let dy = point_set.height() / (ny - 1) as f64;

        let mut pdf = Vec::with_capacity(nx * ny);
        for y in 0..ny {
            for x in 0..nx {
                pdf.push(kernel.evaluate(point_set, x as f64 * dx, y as f64 * dy));
            }
        }

        let peak = pdf.iter().copied().fold(0.0, f64::max);
        if !(peak > 0.0 && peak.is_finite()) {
            return Err(MathError::DegenerateInput {
                reason: "density vanishes on every grid node".to_string(),
            });
        }

        // pdf ist pro Pixel² und integriert zu 1
        let scale = point_set.to_density_per_mm2(point_set.len() as f64);
        let absolute: Vec<f64> = pdf.iter().map(|p| p * scale).collect();
        let grid = DensityGrid {
            nx,
            ny,
            dx,
            dy,
            values: pdf.iter().map(|p| p / peak).collect(),
        };

        let contours: Vec<IsoContour> = self
            .levels()
            .into_iter()
            .map(|level| IsoContour {
                level,
                lines: MarchingSquares::new(&grid, level).extract(),
            })
            .collect();
        let roi = DensityField::threshold(&grid, &absolute, self.cutoff, boundary);

        debug!(
            "DensityEstimator: {}x{} grid, bandwidth {}, peak {:.1} cells/mm², {} contour levels",
            nx,
            ny,
            self.bandwidth,
            peak * scale,
            contours.len()
        );
        info!(
            "DensityEstimator: ROI at cutoff {} covers {} nodes ({:.1} px²)",
            self.cutoff, roi.node_count, roi.area
        );

        Ok(DensityField {
            grid,
            absolute,
            contours,
            roi,
        })
    }

    /// Die längere Seite erhält `resolution` Knoten, die kürzere anteilig (mindestens 2).
    fn grid_shape(&self, width: f64, height: f64) -> (usize, usize) {
        let long = width.max(height);
        let short = width.min(height);
        let other = ((self.resolution as f64 * short / long).round() as usize).max(2);
        if width >= height {
            (self.resolution, other)
        } else {
            (other, self.resolution)
        }
    }
}

/// Gaußkern mit voller Kovarianz.
struct Kernel {
    inverse: Matrix2<f64>,
    /// 1 / (n * 2π * sqrt(det))
    norm: f64,
}

impl Kernel {
    fn fit(point_set: &PointSet, bandwidth: f64) -> MathResult<Self> {
        let n = point_set.len();
        if n < 2 {
            return Err(MathError::InsufficientData {
                operation: "kernel density estimation".to_string(),
                expected: 2,
                actual: n,
            });
        }
        let mean = point_set
            .points()
            .iter()
            .fold(Vector2::zeros(), |acc: Vector2<f64>, p| acc + Vector2::new(p.x, p.y))
            / n as f64;
        let covariance = point_set
            .points()
            .iter()
            .map(|p| {
                let d = Vector2::new(p.x, p.y) - mean;
                d * d.transpose()
            })
            .fold(Matrix2::zeros(), |acc: Matrix2<f64>, m| acc + m)
            / (n - 1) as f64;

        let kernel = covariance * (bandwidth * bandwidth);
        let det = kernel.determinant();
        let trace = kernel.trace();
        if !(det > constants::EPSILON * trace * trace) {
            return Err(MathError::DegenerateInput {
                reason: format!("sample covariance is singular (det {:.3e}); points are collinear", det),
            });
        }
        let inverse = kernel.try_inverse().ok_or_else(|| MathError::DegenerateInput {
            reason: "kernel covariance is not invertible".to_string(),
        })?;

        Ok(Self {
            inverse,
            norm: 1.0 / (n as f64 * constants::TAU * det.sqrt()),
        })
    }

    fn evaluate(&self, point_set: &PointSet, x: f64, y: f64) -> f64 {
        let sum: f64 = point_set
            .points()
            .iter()
            .map(|p| {
                let d = Vector2::new(x - p.x, y - p.y);
                let mahalanobis = d.dot(&(self.inverse * d));
                (-0.5 * mahalanobis).exp()
            })
            .sum();
        sum * self.norm
    }
}

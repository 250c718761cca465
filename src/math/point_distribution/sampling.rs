// src/math/point_distribution/sampling.rs

//! Zufällige Referenzmosaike: gleichverteilte Punkte, optional mit Mindestabstand.

use crate::math::{
    error::{MathError, MathResult},
    types::Point2D,
    utils::{constants, simple_geometry},
};
use rand::Rng;
use tracing::debug;

/// Obergrenze der Versuche pro Punkt beim Rejection Sampling.
const MAX_ATTEMPTS_PER_POINT: usize = 10_000;

pub struct PointSampler;

impl PointSampler {
    /// `count` Punkte gleichverteilt in [0, width) x [0, height).
    pub fn uniform<R: Rng + ?Sized>(
        count: usize,
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> MathResult<Vec<Point2D>> {
        Self::validate_dimensions(width, height)?;
        Ok((0..count)
            .map(|_| Point2D {
                x: rng.random_range(0.0..width),
                y: rng.random_range(0.0..height),
            })
            .collect())
    }

    /// Rejection Sampling: jeder neue Punkt hält mindestens `min_separation`
    /// Abstand zu allen bisherigen Punkten.
    ///
    /// Findet sich nach einer festen Zahl von Versuchen kein Platz mehr, ist
    /// der Abstand für Anzahl und Fläche zu groß (`InvalidParameter`).
    pub fn with_min_separation<R: Rng + ?Sized>(
        count: usize,
        width: f64,
        height: f64,
        min_separation: f64,
        rng: &mut R,
    ) -> MathResult<Vec<Point2D>> {
        Self::validate_dimensions(width, height)?;
        if !(min_separation.is_finite() && min_separation >= 0.0) {
            return Err(MathError::invalid(
                "min_separation",
                format!("must be a finite, non-negative length, got {}", min_separation),
            ));
        }
        let min_sq = min_separation * min_separation;
        let mut points: Vec<Point2D> = Vec::with_capacity(count);
        let mut attempts_total = 0usize;

        while points.len() < count {
            let mut placed = false;
            for _ in 0..MAX_ATTEMPTS_PER_POINT {
                attempts_total += 1;
                let candidate = Point2D {
                    x: rng.random_range(0.0..width),
                    y: rng.random_range(0.0..height),
                };
                if points
                    .iter()
                    .all(|p| simple_geometry::distance_sq(*p, candidate) >= min_sq)
                {
                    points.push(candidate);
                    placed = true;
                    break;
                }
            }
            if !placed {
                return Err(MathError::invalid(
                    "min_separation",
                    format!(
                        "could not place point {} of {} with separation {} in {} x {}",
                        points.len() + 1,
                        count,
                        min_separation,
                        width,
                        height
                    ),
                ));
            }
        }

        debug!(
            "PointSampler: {} points with separation {:.3} after {} attempts",
            count, min_separation, attempts_total
        );
        Ok(points)
    }

    /// Seitenlänge (Pixel) des Quadrats, das `count` Zellen bei der Dichte
    /// `density_per_mm2` fasst.
    pub fn auto_dimension(count: usize, density_per_mm2: f64, microns_per_pixel: f64) -> MathResult<f64> {
        if !(density_per_mm2.is_finite() && density_per_mm2 > 0.0) {
            return Err(MathError::invalid(
                "density",
                format!("must be positive, got {}", density_per_mm2),
            ));
        }
        if !(microns_per_pixel.is_finite() && microns_per_pixel > 0.0) {
            return Err(MathError::invalid(
                "microns_per_pixel",
                format!("must be positive, got {}", microns_per_pixel),
            ));
        }
        let per_square_pixel =
            density_per_mm2 / constants::SQUARE_MICRONS_PER_SQUARE_MM * microns_per_pixel * microns_per_pixel;
        Ok((count as f64 / per_square_pixel).sqrt().round())
    }

    /// Leere Bereiche lassen `random_range` in Panik geraten.
    fn validate_dimensions(width: f64, height: f64) -> MathResult<()> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(())
        } else {
            Err(MathError::invalid(
                "dimensions",
                format!("sampling area must be positive and finite, got {} x {}", width, height),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_uniform_stays_in_rectangle() {
        let mut rng = StdRng::seed_from_u64(1);
        let points = PointSampler::uniform(200, 30.0, 10.0, &mut rng).unwrap();
        assert_eq!(points.len(), 200);
        assert!(points.iter().all(|p| (0.0..30.0).contains(&p.x) && (0.0..10.0).contains(&p.y)));
    }

    #[test]
    fn test_uniform_is_reproducible() {
        let a = PointSampler::uniform(20, 10.0, 10.0, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = PointSampler::uniform(20, 10.0, 10.0, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_min_separation_is_respected() {
        let mut rng = StdRng::seed_from_u64(5);
        let points = PointSampler::with_min_separation(50, 100.0, 100.0, 5.0, &mut rng).unwrap();
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                assert!(simple_geometry::distance(points[i], points[j]) >= 5.0);
            }
        }
    }

    #[test]
    fn test_impossible_separation_fails() {
        let mut rng = StdRng::seed_from_u64(5);
        let err = PointSampler::with_min_separation(10, 10.0, 10.0, 20.0, &mut rng).unwrap_err();
        assert!(matches!(err, MathError::InvalidParameter { .. }));
    }

    #[test]
    fn test_empty_area_is_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        for (width, height) in [(0.0, 10.0), (10.0, 0.0), (-5.0, 10.0), (f64::NAN, 10.0), (10.0, f64::INFINITY)] {
            let err = PointSampler::uniform(5, width, height, &mut rng).unwrap_err();
            assert!(matches!(err, MathError::InvalidParameter { ref name, .. } if name == "dimensions"));
            let err = PointSampler::with_min_separation(5, width, height, 1.0, &mut rng).unwrap_err();
            assert!(matches!(err, MathError::InvalidParameter { ref name, .. } if name == "dimensions"));
        }
        // Null Punkte in einer gültigen Fläche sind erlaubt
        assert!(PointSampler::uniform(0, 1.0, 1.0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_auto_dimension() {
        // 1000 Zellen bei 1000/mm² brauchen 1 mm² = 1000 x 1000 µm
        assert_eq!(PointSampler::auto_dimension(1000, 1000.0, 1.0).unwrap(), 1000.0);
        assert_eq!(PointSampler::auto_dimension(1000, 1000.0, 2.0).unwrap(), 500.0);
        assert!(PointSampler::auto_dimension(10, 0.0, 1.0).is_err());
    }
}

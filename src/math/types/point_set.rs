// src/math/types/point_set.rs

use crate::math::{
    error::{MathError, MathResult},
    types::{Bounds2D, Point2D},
    utils::constants,
};
use std::collections::HashSet;
use tracing::debug;

/// Unveränderliche Menge von Zellzentren eines Präparats.
///
/// Die Reihenfolge der Punkte entspricht der Eingabereihenfolge und dient als
/// stabiler Index für alle abgeleiteten Strukturen (Triangulation, Voronoi-Zellen).
/// Eine optionale Rotation um Vielfache von 90° wird genau einmal beim Erstellen
/// angewendet.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    points: Vec<Point2D>,
    width: f64,
    height: f64,
    microns_per_pixel: f64,
    rotation: u8,
}

impl PointSet {
    /// Erstellt eine neue Punktmenge und validiert sie.
    ///
    /// * `width`, `height` - Bildgröße in Pixeln (vor der Rotation)
    /// * `microns_per_pixel` - Skalierung für physikalische Einheiten
    /// * `rotation` - Anzahl der 90°-Drehungen (0–3)
    pub fn new(
        points: Vec<Point2D>,
        width: f64,
        height: f64,
        microns_per_pixel: f64,
        rotation: u8,
    ) -> MathResult<Self> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(MathError::invalid(
                "dimensions",
                format!("sample dimensions must be positive, got {} x {}", width, height),
            ));
        }
        if !(microns_per_pixel.is_finite() && microns_per_pixel > 0.0) {
            return Err(MathError::invalid(
                "microns_per_pixel",
                format!("must be positive, got {}", microns_per_pixel),
            ));
        }
        if rotation > 3 {
            return Err(MathError::invalid(
                "rotation",
                format!("rotation count must be in 0..=3, got {}", rotation),
            ));
        }
        if points.len() < 3 {
            return Err(MathError::InsufficientData {
                operation: "point set construction".to_string(),
                expected: 3,
                actual: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(MathError::invalid(
                "points",
                format!("point #{} has non-finite coordinates", index),
            ));
        }

        let (points, width, height) = Self::rotate(points, width, height, rotation);

        let sample = Bounds2D::from_points(Point2D { x: 0.0, y: 0.0 }, Point2D { x: width, y: height });
        if let Some(index) = points.iter().position(|p| !sample.contains_point(*p)) {
            return Err(MathError::invalid(
                "points",
                format!(
                    "point #{} ({:.3}, {:.3}) lies outside the sample {}",
                    index, points[index].x, points[index].y, sample
                ),
            ));
        }

        debug!(
            "PointSet: {} points in {:.1} x {:.1} px ({} µm/px, rotation {})",
            points.len(),
            width,
            height,
            microns_per_pixel,
            rotation
        );

        Ok(Self {
            points,
            width,
            height,
            microns_per_pixel,
            rotation,
        })
    }

    /// Bequemer Konstruktor aus (x, y)-Paaren, ohne Rotation.
    pub fn from_pairs<I>(pairs: I, width: f64, height: f64, microns_per_pixel: f64) -> MathResult<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let points = pairs.into_iter().map(|(x, y)| Point2D { x, y }).collect();
        Self::new(points, width, height, microns_per_pixel, 0)
    }

    /// Dreht jede Koordinate `steps` mal um 90°: (x, y) -> (y, width - x); Breite und Höhe tauschen.
    fn rotate(mut points: Vec<Point2D>, mut width: f64, mut height: f64, steps: u8) -> (Vec<Point2D>, f64, f64) {
        for _ in 0..steps {
            for p in points.iter_mut() {
                *p = Point2D { x: p.y, y: width - p.x };
            }
            std::mem::swap(&mut width, &mut height);
        }
        (points, width, height)
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Point2D {
        self.points[index]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Breite nach Anwendung der Rotation
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Höhe nach Anwendung der Rotation
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn microns_per_pixel(&self) -> f64 {
        self.microns_per_pixel
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Rechteck der gesamten Bildfläche: [0, width] x [0, height]
    pub fn sample_bounds(&self) -> Bounds2D {
        Bounds2D::from_points(
            Point2D { x: 0.0, y: 0.0 },
            Point2D {
                x: self.width,
                y: self.height,
            },
        )
    }

    /// Anzahl paarweise verschiedener Koordinaten
    pub fn distinct_count(&self) -> usize {
        self.points
            .iter()
            .map(|p| (p.x.to_bits(), p.y.to_bits()))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Länge in Pixeln -> Mikrometer
    pub fn to_microns(&self, pixels: f64) -> f64 {
        pixels * self.microns_per_pixel
    }

    /// Fläche in Pixel² -> µm²
    pub fn to_square_microns(&self, square_pixels: f64) -> f64 {
        square_pixels * self.microns_per_pixel * self.microns_per_pixel
    }

    /// Dichte pro Pixel² -> Zellen pro mm²
    pub fn to_density_per_mm2(&self, per_square_pixel: f64) -> f64 {
        per_square_pixel / (self.microns_per_pixel * self.microns_per_pixel)
            * constants::SQUARE_MICRONS_PER_SQUARE_MM
    }
}

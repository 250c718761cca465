// src/math/types/bounds.rs

use crate::math::types::*;
use geo::{LineString, Polygon};
use std::fmt;

/// 2D Bounding Box (Axis-Aligned Bounding Box) in Pixelkoordinaten
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2D {
    pub min: Point2D,
    pub max: Point2D,
}

impl Bounds2D {
    /// Erstellt eine Bounding Box aus zwei beliebigen Punkten
    pub fn from_points(p1: Point2D, p2: Point2D) -> Self {
        Self {
            min: Point2D {
                x: p1.x.min(p2.x),
                y: p1.y.min(p2.y),
            },
            max: Point2D {
                x: p1.x.max(p2.x),
                y: p1.y.max(p2.y),
            },
        }
    }

    /// Erstellt eine Bounding Box die alle Punkte umschließt
    pub fn from_points_iter<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2D>,
    {
        let mut points_iter = points.into_iter();
        let first_point = points_iter.next()?;

        let mut bounds = Self {
            min: first_point,
            max: first_point,
        };
        for point in points_iter {
            bounds.expand_to_include_point(point);
        }

        Some(bounds)
    }

    /// Breite der Bounding Box
    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    /// Höhe der Bounding Box
    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }

    /// Länge der Diagonale
    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    /// Fläche der Bounding Box
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Prüft ob ein Punkt in der Bounding Box liegt
    pub fn contains_point(&self, point: Point2D) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Erweitert die Bounding Box um einen Punkt
    pub fn expand_to_include_point(&mut self, point: Point2D) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Vereinigt zwei Bounding Boxes
    pub fn union(&self, other: &Bounds2D) -> Self {
        let mut result = *self;
        result.expand_to_include_point(other.min);
        result.expand_to_include_point(other.max);
        result
    }

    /// Erweitert die Bounding Box um einen Margin
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min: Point2D {
                x: self.min.x - margin,
                y: self.min.y - margin,
            },
            max: Point2D {
                x: self.max.x + margin,
                y: self.max.y + margin,
            },
        }
    }

    /// Erzeugt die vier Eckpunkte der Bounding Box (CCW)
    pub fn corners(&self) -> [Point2D; 4] {
        [
            self.min,                                        // unten links
            Point2D { x: self.max.x, y: self.min.y },        // unten rechts
            self.max,                                        // oben rechts
            Point2D { x: self.min.x, y: self.max.y },        // oben links
        ]
    }

    /// Die Bounding Box als geo-Polygon
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.corners().to_vec()), vec![])
    }
}

impl fmt::Display for Bounds2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bounds2D(({:.3}, {:.3}) to ({:.3}, {:.3}))",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{Area, coord};

    #[test]
    fn test_bounds_from_points_iter() {
        let bounds = Bounds2D::from_points_iter([
            coord! { x: 3.0, y: -1.0 },
            coord! { x: -2.0, y: 4.0 },
            coord! { x: 1.0, y: 1.0 },
        ])
        .unwrap();
        assert_eq!(bounds.min, coord! { x: -2.0, y: -1.0 });
        assert_eq!(bounds.max, coord! { x: 3.0, y: 4.0 });
        assert_relative_eq!(bounds.area(), 25.0);
        assert!(Bounds2D::from_points_iter(std::iter::empty()).is_none());
    }

    #[test]
    fn test_bounds_polygon_is_ccw() {
        let bounds = Bounds2D::from_points(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 3.0 });
        assert_relative_eq!(bounds.to_polygon().signed_area(), 6.0);
        // Reihenfolge der Eckpunkte spielt keine Rolle
        let swapped = Bounds2D::from_points(coord! { x: 2.0, y: 3.0 }, coord! { x: 0.0, y: 0.0 });
        assert_eq!(swapped, bounds);
    }
}

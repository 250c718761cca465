// src/math/geometry/boundary.rs

use crate::math::{
    error::{MathError, MathResult},
    types::{Bounds2D, Point2D},
};
use geo::{Area, BooleanOps, BoundingRect, Intersects, MultiPolygon, Point, Polygon};

/// Die Region, auf die sich alle nachgelagerten Statistiken beziehen.
///
/// Immer ein Multi-Polygon, damit getrennte Cluster gemeinsam behandelt werden.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    shape: MultiPolygon<f64>,
}

impl Boundary {
    pub fn new(shape: MultiPolygon<f64>) -> MathResult<Self> {
        if shape.0.is_empty() || shape.unsigned_area() <= 0.0 {
            return Err(MathError::DegenerateInput {
                reason: "boundary has no area".to_string(),
            });
        }
        Ok(Self { shape })
    }

    pub fn from_polygon(polygon: Polygon<f64>) -> MathResult<Self> {
        Self::new(MultiPolygon::new(vec![polygon]))
    }

    pub fn from_polygons(polygons: Vec<Polygon<f64>>) -> MathResult<Self> {
        Self::new(MultiPolygon::new(polygons))
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.shape.0
    }

    pub fn as_multi_polygon(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    pub fn area(&self) -> f64 {
        self.shape.unsigned_area()
    }

    /// Punkt im Inneren oder auf dem Rand
    pub fn contains_point(&self, point: Point2D) -> bool {
        self.shape.intersects(&Point::from(point))
    }

    pub fn bounds(&self) -> Option<Bounds2D> {
        self.shape
            .bounding_rect()
            .map(|rect| Bounds2D::from_points(rect.min(), rect.max()))
    }

    /// Schnitt eines Polygons mit der Boundary.
    pub fn clip(&self, polygon: &Polygon<f64>) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon.clone()]).intersection(&self.shape)
    }
}

// src/math/scalar_field.rs

use crate::math::types::Point2D;

/// Trait für ein zweidimensionales Skalarfeld auf einem regelmäßigen Gitter.
/// Ermöglicht es Algorithmen wie Marching Squares, auf verschiedenen
/// Feldimplementierungen zu operieren.
pub trait ScalarField2D {
    /// Anzahl der Gitterknoten in x-Richtung.
    fn width(&self) -> usize;

    /// Anzahl der Gitterknoten in y-Richtung.
    fn height(&self) -> usize;

    /// Abstand benachbarter Knoten (dx, dy) in Weltkoordinaten.
    fn spacing(&self) -> (f64, f64);

    /// Weltkoordinate des Knotens (0, 0).
    fn origin(&self) -> Point2D {
        Point2D { x: 0.0, y: 0.0 }
    }

    /// Skalarwert am Knoten (x_idx, y_idx). Indizes außerhalb liefern 0.0.
    fn get_value(&self, x_idx: usize, y_idx: usize) -> f64;

    /// Konvertiert einen Knotenindex in Weltkoordinaten.
    fn node_to_world(&self, x_idx: usize, y_idx: usize) -> Point2D {
        let (dx, dy) = self.spacing();
        let origin = self.origin();
        Point2D {
            x: origin.x + x_idx as f64 * dx,
            y: origin.y + y_idx as f64 * dy,
        }
    }

    /// Fläche, die ein einzelner Knoten repräsentiert.
    fn node_area(&self) -> f64 {
        let (dx, dy) = self.spacing();
        dx * dy
    }
}

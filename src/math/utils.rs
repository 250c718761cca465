// src/math/utils.rs

/// Mathematische Konstanten
pub mod constants {
    pub const EPSILON: f64 = 1e-9;
    /// Relative Toleranz für Flächenvergleiche (geclippte vs. ungeclippte Zelle)
    pub const AREA_TOLERANCE: f64 = 1e-6;
    /// Seitenzahl der Kreisapproximation beim Dilatieren
    pub const CIRCLE_SEGMENTS: usize = 32;
    pub const SQUARE_MICRONS_PER_SQUARE_MM: f64 = 1_000_000.0;
    pub const TAU: f64 = std::f64::consts::TAU;
    pub const PI: f64 = std::f64::consts::PI;
}

/// Vergleichsfunktionen mit Toleranz
pub mod comparison {
    use super::constants::EPSILON;

    /// Prüft ob zwei Floats (nahezu) gleich sind
    pub fn nearly_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    /// Inverse lineare Interpolation
    pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
        if nearly_equal(a, b) {
            0.5
        } else {
            (value - a) / (b - a)
        }
    }
}

/// Geometrische Hilfsfunktionen (einfach, ohne komplexe Strukturen)
pub mod simple_geometry {
    use geo::Coord;

    pub fn distance_sq(p1: Coord<f64>, p2: Coord<f64>) -> f64 {
        (p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)
    }

    pub fn distance(p1: Coord<f64>, p2: Coord<f64>) -> f64 {
        distance_sq(p1, p2).sqrt()
    }

    /// 2D-Kreuzprodukt von (b - a) und (c - a); > 0 bedeutet Linksdrehung
    pub fn orient(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }

    /// Vorzeichenbehaftete Fläche eines (offenen) Rings, CCW positiv
    pub fn signed_area(ring: &[Coord<f64>]) -> f64 {
        if ring.len() < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..ring.len() {
            let p1 = ring[i];
            let p2 = ring[(i + 1) % ring.len()];
            sum += p1.x * p2.y - p2.x * p1.y;
        }
        0.5 * sum
    }

    /// Umkreisradius eines Dreiecks (a*b*c / 4A). Unendlich für degenerierte Dreiecke.
    pub fn circumradius(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
        let ab = distance(a, b);
        let bc = distance(b, c);
        let ca = distance(c, a);
        let double_area = orient(a, b, c).abs();
        if double_area <= f64::EPSILON * (ab * bc).max(f64::MIN_POSITIVE) {
            return f64::INFINITY;
        }
        ab * bc * ca / (2.0 * double_area)
    }

    /// Mittelwert und Populations-Standardabweichung
    pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some((mean, variance.sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::simple_geometry::*;
    use approx::assert_relative_eq;
    use geo::coord;

    #[test]
    fn test_circumradius_right_triangle() {
        let r = circumradius(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 0.0, y: 10.0 },
        );
        assert_relative_eq!(r, 50.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_circumradius_collinear_is_infinite() {
        let r = circumradius(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 2.0, y: 2.0 },
        );
        assert!(r.is_infinite());
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 2.0, y: 0.0 },
            coord! { x: 2.0, y: 2.0 },
            coord! { x: 0.0, y: 2.0 },
        ];
        assert_relative_eq!(signed_area(&ccw), 4.0);
        let mut cw = ccw.to_vec();
        cw.reverse();
        assert_relative_eq!(signed_area(&cw), -4.0);
    }

    #[test]
    fn test_mean_std() {
        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(mean, 5.0);
        assert_relative_eq!(std, 2.0);
        assert!(mean_std(&[]).is_none());
    }
}

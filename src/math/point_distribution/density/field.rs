// src/math/point_distribution/density/field.rs

use crate::math::{
    algorithms::marching_squares::{Contour, MarchingSquares},
    geometry::boundary::Boundary,
    scalar_field::ScalarField2D,
    types::Point2D,
};
use geo::{BooleanOps, LineString, MultiLineString};

/// Regelmäßiges Gitter über [0, width] x [0, height] mit einem Wert pro Knoten.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub nx: usize,
    pub ny: usize,
    pub dx: f64,
    pub dy: f64,
    /// Zeilenweise (Index `y * nx + x`)
    pub values: Vec<f64>,
}

impl DensityGrid {
    #[inline]
    pub fn index(&self, x_idx: usize, y_idx: usize) -> usize {
        y_idx * self.nx + x_idx
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

impl ScalarField2D for DensityGrid {
    fn width(&self) -> usize {
        self.nx
    }

    fn height(&self) -> usize {
        self.ny
    }

    fn spacing(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    fn get_value(&self, x_idx: usize, y_idx: usize) -> f64 {
        if x_idx >= self.nx || y_idx >= self.ny {
            return 0.0;
        }
        self.values[self.index(x_idx, y_idx)]
    }
}

/// Konturlinien eines Niveaus
#[derive(Debug, Clone, PartialEq)]
pub struct IsoContour {
    pub level: f64,
    pub lines: Vec<Contour>,
}

/// Bereich mit normierter Dichte >= `cutoff`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOfInterest {
    pub cutoff: f64,
    /// Ein Eintrag pro Gitterknoten
    pub mask: Vec<bool>,
    pub node_count: usize,
    /// Knotenanzahl mal Knotenfläche (Pixel²)
    pub area: f64,
    /// Kontur auf dem Cutoff-Niveau. Mit Boundary auf diese beschnitten;
    /// ohne Boundary die rohe Isolinie, die am Gitterrand offen endet.
    pub outline: Vec<Contour>,
    /// Mittlere absolute Dichte der Knoten im Bereich (Zellen/mm²)
    pub mean_density: Option<f64>,
}

/// Ergebnis der Dichteschätzung.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityField {
    /// Auf Maximum 1 normierte Dichte
    pub grid: DensityGrid,
    /// Absolute Dichte in Zellen/mm², gleiche Indizierung wie `grid.values`
    pub absolute: Vec<f64>,
    pub contours: Vec<IsoContour>,
    pub roi: RegionOfInterest,
}

impl DensityField {
    pub fn levels(&self) -> Vec<f64> {
        self.contours.iter().map(|c| c.level).collect()
    }

    pub fn node_position(&self, x_idx: usize, y_idx: usize) -> Point2D {
        self.grid.node_to_world(x_idx, y_idx)
    }

    pub fn normalized_at(&self, x_idx: usize, y_idx: usize) -> f64 {
        self.grid.get_value(x_idx, y_idx)
    }

    /// Absolute Dichte (Zellen/mm²); 0 außerhalb des Gitters.
    pub fn absolute_at(&self, x_idx: usize, y_idx: usize) -> f64 {
        if x_idx >= self.grid.nx || y_idx >= self.grid.ny {
            return 0.0;
        }
        self.absolute[self.grid.index(x_idx, y_idx)]
    }

    pub fn peak_density(&self) -> f64 {
        self.absolute.iter().copied().fold(0.0, f64::max)
    }

    /// Wertet den Bereich für einen anderen Cutoff neu aus, ohne die Dichte neu zu schätzen.
    pub fn region_of_interest(&self, cutoff: f64, boundary: Option<&Boundary>) -> RegionOfInterest {
        Self::threshold(&self.grid, &self.absolute, cutoff, boundary)
    }

    pub(crate) fn threshold(
        grid: &DensityGrid,
        absolute: &[f64],
        cutoff: f64,
        boundary: Option<&Boundary>,
    ) -> RegionOfInterest {
        let mut mask = vec![false; grid.values.len()];
        let mut density_sum = 0.0;
        let mut node_count = 0usize;
        for y in 0..grid.ny {
            for x in 0..grid.nx {
                let index = grid.index(x, y);
                if grid.values[index] < cutoff {
                    continue;
                }
                if let Some(boundary) = boundary {
                    if !boundary.contains_point(grid.node_to_world(x, y)) {
                        continue;
                    }
                }
                mask[index] = true;
                node_count += 1;
                density_sum += absolute[index];
            }
        }

        let isoline = MarchingSquares::new(grid, cutoff).extract();
        RegionOfInterest {
            cutoff,
            mask,
            node_count,
            area: node_count as f64 * grid.node_area(),
            outline: match boundary {
                Some(boundary) => Self::clip_outline(isoline, boundary),
                None => isoline,
            },
            mean_density: (node_count > 0).then(|| density_sum / node_count as f64),
        }
    }

    /// Teile der Isolinie innerhalb der Boundary. Ringe, die ganz innen
    /// liegen, bleiben geschlossen.
    fn clip_outline(isoline: Vec<Contour>, boundary: &Boundary) -> Vec<Contour> {
        let lines: Vec<LineString<f64>> = isoline
            .into_iter()
            .map(|contour| {
                let mut coords = contour.vertices;
                if contour.is_closed {
                    if let Some(&first) = coords.first() {
                        coords.push(first);
                    }
                }
                LineString::from(coords)
            })
            .collect();
        boundary
            .as_multi_polygon()
            .clip(&MultiLineString::new(lines), false)
            .into_iter()
            .filter(|line| line.0.len() >= 2)
            .map(|line| {
                let mut contour = Contour {
                    vertices: line.0,
                    is_closed: false,
                };
                if contour.vertices.len() > 3 && contour.vertices.first() == contour.vertices.last() {
                    contour.vertices.pop();
                    contour.close();
                }
                contour
            })
            .collect()
    }
}

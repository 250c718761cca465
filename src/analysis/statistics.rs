// src/analysis/statistics.rs

//! Kennzahlen eines Mosaiks. Mittelwerte beziehen sich auf die gebundenen
//! (nicht randbeeinflussten) Zellen; Längen in µm, Flächen in µm².

use crate::math::{
    algorithms::triangulation::Triangulation,
    geometry::boundary::Boundary,
    point_distribution::voronoi::VoronoiDiagram,
    types::PointSet,
    utils::{constants, simple_geometry},
};
use serde::Serialize;
use tracing::debug;

/// Mittelwert und Populations-Standardabweichung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
}

impl MeanStd {
    pub fn of(values: &[f64]) -> Option<Self> {
        simple_geometry::mean_std(values).map(|(mean, std)| Self { mean, std })
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            mean: self.mean * factor,
            std: self.std * factor,
        }
    }

    /// Regularitätsindex mean / std; `None` bei verschwindender Streuung.
    pub fn regularity_index(&self) -> Option<f64> {
        (self.std > 0.0).then(|| self.mean / self.std)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicStatistics {
    pub cell_count: usize,
    pub bound_cell_count: usize,
    /// Fläche der Boundary
    pub estimated_area_um2: f64,
    /// Alle Zellen bezogen auf die Boundary-Fläche (Zellen/mm²)
    pub estimated_density_per_mm2: f64,
    /// Abstände zwischen Voronoi-Nachbarn, sobald einer der beiden gebunden ist
    pub icd_um: Option<MeanStd>,
    pub nearest_neighbor_um: Option<MeanStd>,
    pub voronoi_area_um2: Option<MeanStd>,
    pub neighbor_count: Option<MeanStd>,
    pub total_bound_area_um2: f64,
    pub bound_density_per_mm2: Option<f64>,
    pub nnri: Option<f64>,
    pub vdri: Option<f64>,
    pub alt_nnri: Option<f64>,
}

impl MosaicStatistics {
    pub fn compute(
        point_set: &PointSet,
        triangulation: &Triangulation,
        diagram: &VoronoiDiagram,
        boundary: &Boundary,
    ) -> Self {
        let mpp = point_set.microns_per_pixel();
        let bound: Vec<bool> = diagram.cells.iter().map(|c| c.is_bound()).collect();
        let bound_cell_count = bound.iter().filter(|b| **b).count();

        let estimated_area_um2 = point_set.to_square_microns(boundary.area());
        let estimated_density_per_mm2 =
            diagram.len() as f64 / estimated_area_um2 * constants::SQUARE_MICRONS_PER_SQUARE_MM;

        let icds: Vec<f64> = diagram
            .neighbor_pairs()
            .into_iter()
            .filter(|&(a, b)| bound[a] || bound[b])
            .map(|(a, b)| simple_geometry::distance(triangulation.point(a), triangulation.point(b)))
            .collect();
        let nearest: Vec<f64> = diagram
            .bound_cells()
            .map(|c| triangulation.nearest_neighbor_distance(c.id))
            .collect();
        let areas: Vec<f64> = diagram.bound_cells().map(|c| c.area).collect();
        let neighbors: Vec<f64> = diagram.bound_cells().map(|c| c.neighbor_count() as f64).collect();

        let icd_um = MeanStd::of(&icds).map(|s| s.scaled(mpp));
        let nearest_neighbor_um = MeanStd::of(&nearest).map(|s| s.scaled(mpp));
        let voronoi_area_um2 = MeanStd::of(&areas).map(|s| s.scaled(mpp * mpp));
        let neighbor_count = MeanStd::of(&neighbors);

        let total_bound_area_um2 = point_set.to_square_microns(areas.iter().sum());
        let bound_density_per_mm2 = (total_bound_area_um2 > 0.0).then(|| {
            bound_cell_count as f64 / total_bound_area_um2 * constants::SQUARE_MICRONS_PER_SQUARE_MM
        });

        let alt_nnri = nearest_neighbor_um.and_then(|nn| {
            (bound_cell_count > 0 && total_bound_area_um2 > 0.0)
                .then(|| nn.mean / (0.5 * (total_bound_area_um2 / bound_cell_count as f64).sqrt()))
        });

        let statistics = Self {
            cell_count: diagram.len(),
            bound_cell_count,
            estimated_area_um2,
            estimated_density_per_mm2,
            icd_um,
            nearest_neighbor_um,
            voronoi_area_um2,
            neighbor_count,
            total_bound_area_um2,
            bound_density_per_mm2,
            nnri: nearest_neighbor_um.and_then(|s| s.regularity_index()),
            vdri: voronoi_area_um2.and_then(|s| s.regularity_index()),
            alt_nnri,
        };
        debug!("MosaicStatistics: {:?}", statistics);
        statistics
    }

    /// Feldweises arithmetisches Mittel mehrerer Läufe. Optionale Felder
    /// mitteln nur über die Läufe, in denen sie gesetzt sind.
    ///
    /// `None` bei leerer Eingabe.
    pub fn average(runs: &[MosaicStatistics]) -> Option<AveragedStatistics> {
        if runs.is_empty() {
            return None;
        }
        let mean = |f: &dyn Fn(&MosaicStatistics) -> f64| runs.iter().map(f).sum::<f64>() / runs.len() as f64;
        let mean_opt = |f: &dyn Fn(&MosaicStatistics) -> Option<f64>| {
            let values: Vec<f64> = runs.iter().filter_map(f).collect();
            (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
        };
        let mean_pair = |f: &dyn Fn(&MosaicStatistics) -> Option<MeanStd>| {
            let mean = mean_opt(&|s| f(s).map(|v| v.mean))?;
            let std = mean_opt(&|s| f(s).map(|v| v.std))?;
            Some(MeanStd { mean, std })
        };

        Some(AveragedStatistics {
            runs: runs.len(),
            cell_count: mean(&|s| s.cell_count as f64),
            bound_cell_count: mean(&|s| s.bound_cell_count as f64),
            estimated_area_um2: mean(&|s| s.estimated_area_um2),
            estimated_density_per_mm2: mean(&|s| s.estimated_density_per_mm2),
            icd_um: mean_pair(&|s| s.icd_um),
            nearest_neighbor_um: mean_pair(&|s| s.nearest_neighbor_um),
            voronoi_area_um2: mean_pair(&|s| s.voronoi_area_um2),
            neighbor_count: mean_pair(&|s| s.neighbor_count),
            total_bound_area_um2: mean(&|s| s.total_bound_area_um2),
            bound_density_per_mm2: mean_opt(&|s| s.bound_density_per_mm2),
            nnri: mean_opt(&|s| s.nnri),
            vdri: mean_opt(&|s| s.vdri),
            alt_nnri: mean_opt(&|s| s.alt_nnri),
        })
    }
}

/// Mittelwerte von [`MosaicStatistics`] über mehrere Mosaike, z. B. eine
/// Zufallsreferenz. Zählwerte sind hier Gleitkommazahlen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AveragedStatistics {
    pub runs: usize,
    pub cell_count: f64,
    pub bound_cell_count: f64,
    pub estimated_area_um2: f64,
    pub estimated_density_per_mm2: f64,
    pub icd_um: Option<MeanStd>,
    pub nearest_neighbor_um: Option<MeanStd>,
    pub voronoi_area_um2: Option<MeanStd>,
    pub neighbor_count: Option<MeanStd>,
    pub total_bound_area_um2: f64,
    pub bound_density_per_mm2: Option<f64>,
    pub nnri: Option<f64>,
    pub vdri: Option<f64>,
    pub alt_nnri: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{
        point_distribution::{sampling::PointSampler, voronoi::VoronoiAnalyzer},
        types::Bounds2D,
    };
    use approx::assert_relative_eq;
    use geo::coord;
    use rand::{SeedableRng, rngs::StdRng};

    fn analyze(set: &PointSet, boundary: &Boundary) -> MosaicStatistics {
        let tri = Triangulation::build(set).unwrap();
        let diagram = VoronoiAnalyzer::new().analyze(&tri, boundary).unwrap();
        MosaicStatistics::compute(set, &tri, &diagram, boundary)
    }

    fn square(size: f64) -> Boundary {
        Boundary::from_polygon(Bounds2D::from_points(coord! { x: 0.0, y: 0.0 }, coord! { x: size, y: size }).to_polygon())
            .unwrap()
    }

    #[test]
    fn test_grid_statistics() {
        let mut pairs = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                pairs.push((10.0 + 10.0 * i as f64, 10.0 + 10.0 * j as f64));
            }
        }
        let set = PointSet::from_pairs(pairs, 40.0, 40.0, 2.0).unwrap();
        let stats = analyze(&set, &square(40.0));

        assert_eq!(stats.cell_count, 9);
        assert_eq!(stats.bound_cell_count, 1);
        assert_relative_eq!(stats.estimated_area_um2, 6400.0, max_relative = 1e-6);
        assert_relative_eq!(stats.estimated_density_per_mm2, 1406.25, max_relative = 1e-6);

        let icd = stats.icd_um.unwrap();
        assert_relative_eq!(icd.mean, 20.0, epsilon = 1e-9);
        assert_relative_eq!(icd.std, 0.0, epsilon = 1e-9);
        assert_relative_eq!(stats.nearest_neighbor_um.unwrap().mean, 20.0);
        assert_relative_eq!(stats.voronoi_area_um2.unwrap().mean, 400.0, max_relative = 1e-6);
        assert_relative_eq!(stats.neighbor_count.unwrap().mean, 4.0);
        assert_relative_eq!(stats.bound_density_per_mm2.unwrap(), 2500.0, max_relative = 1e-6);
        assert_relative_eq!(stats.alt_nnri.unwrap(), 2.0, max_relative = 1e-6);
        // Keine Streuung -> kein Regularitätsindex
        assert!(stats.nnri.is_none());
        assert!(stats.vdri.is_none());
    }

    #[test]
    fn test_random_mosaic_regularity() {
        let mut rng = StdRng::seed_from_u64(21);
        let points = PointSampler::uniform(300, 600.0, 600.0, &mut rng).unwrap();
        let set = PointSet::new(points, 600.0, 600.0, 1.0, 0).unwrap();
        let stats = analyze(&set, &square(600.0));
        assert!(stats.bound_cell_count > 150);
        // Zufallsmosaike haben einen NNRI um 1.9 und VDRI um 2
        let nnri = stats.nnri.unwrap();
        assert!((1.4..2.6).contains(&nnri), "nnri {}", nnri);
        let vdri = stats.vdri.unwrap();
        assert!((1.4..3.0).contains(&vdri), "vdri {}", vdri);
    }

    #[test]
    fn test_average_of_runs() {
        let mut pairs = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                pairs.push((10.0 + 10.0 * i as f64, 10.0 + 10.0 * j as f64));
            }
        }
        let set = PointSet::from_pairs(pairs, 40.0, 40.0, 1.0).unwrap();
        let first = analyze(&set, &square(40.0));
        let mut second = first.clone();
        second.cell_count = 12;
        second.bound_cell_count = 2;
        second.nearest_neighbor_um = Some(MeanStd { mean: 14.0, std: 3.0 });
        second.nnri = Some(4.0);

        let avg = MosaicStatistics::average(&[first.clone(), second]).unwrap();
        assert_eq!(avg.runs, 2);
        assert_relative_eq!(avg.cell_count, 10.5);
        assert_relative_eq!(avg.bound_cell_count, 1.5);
        assert_relative_eq!(avg.estimated_area_um2, first.estimated_area_um2);
        let nn = avg.nearest_neighbor_um.unwrap();
        assert_relative_eq!(nn.mean, 12.0);
        assert_relative_eq!(nn.std, 1.5);
        // Nur ein Lauf hat einen NNRI
        assert_eq!(avg.nnri, Some(4.0));
        assert!(avg.vdri.is_none());

        assert!(MosaicStatistics::average(&[]).is_none());
    }

    #[test]
    fn test_regularity_index() {
        assert_eq!(MeanStd { mean: 4.0, std: 2.0 }.regularity_index(), Some(2.0));
        assert_eq!(MeanStd { mean: 4.0, std: 0.0 }.regularity_index(), None);
        assert!(MeanStd::of(&[]).is_none());
    }
}

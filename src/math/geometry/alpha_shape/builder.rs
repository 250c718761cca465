// src/math/geometry/alpha_shape/builder.rs

use crate::math::{
    algorithms::triangulation::Triangulation,
    error::{MathError, MathResult},
    geometry::alpha_shape::boundary_trace::trace_cycles,
    types::Point2D,
    utils::simple_geometry,
};
use geo::{Area, Contains, InteriorPoint, LineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Kriterium, nach dem ein Delaunay-Dreieck in die Alpha-Shape aufgenommen wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaCriterion {
    /// Umkreisradius kleiner als Alpha.
    ///
    /// Alpha >= längste Kante liefert hier *nicht* zwingend die konvexe
    /// Hülle: flache Dreiecke haben einen Umkreisradius weit über ihrer
    /// längsten Kante, bei (0,0), (100,0), (50,1) etwa R ≈ 1250 gegenüber 100.
    #[default]
    Circumradius,
    /// Alle drei Kanten höchstens Alpha lang. Mit Alpha >= längster Kante
    /// ergibt sich die konvexe Hülle.
    EdgeLength,
}

impl AlphaCriterion {
    fn accepts(&self, circumradius: f64, longest_edge: f64, alpha: f64) -> bool {
        match self {
            AlphaCriterion::Circumradius => circumradius < alpha,
            AlphaCriterion::EdgeLength => longest_edge <= alpha,
        }
    }

    /// Einzelne Kante im Alpha-Komplex: der kleinste Umkreis einer Kante hat
    /// den Radius length / 2.
    fn accepts_edge(&self, length: f64, alpha: f64) -> bool {
        match self {
            AlphaCriterion::Circumradius => 0.5 * length < alpha,
            AlphaCriterion::EdgeLength => length <= alpha,
        }
    }
}

/// Ergebnis der Alpha-Shape-Konstruktion.
#[derive(Debug, Clone)]
pub struct AlphaShape {
    alpha: f64,
    criterion: AlphaCriterion,
    /// Absteigend nach Fläche sortiert, nie leer.
    polygons: Vec<Polygon<f64>>,
    retained_triangles: Vec<usize>,
    uncovered: Vec<usize>,
    stray_edges: Vec<(usize, usize)>,
}

impl AlphaShape {
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn criterion(&self) -> AlphaCriterion {
        self.criterion
    }

    /// Alle Polygone, größtes zuerst.
    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    /// Das Polygon mit der größten Fläche.
    pub fn primary(&self) -> &Polygon<f64> {
        // Konstruktion garantiert mindestens ein Polygon
        &self.polygons[0]
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Indizes der behaltenen Dreiecke in der Triangulation.
    pub fn retained_triangles(&self) -> &[usize] {
        &self.retained_triangles
    }

    /// Punkte, die zu keinem behaltenen Dreieck gehören.
    pub fn uncovered(&self) -> &[usize] {
        &self.uncovered
    }

    /// Kanten des Alpha-Komplexes ohne behaltenes Dreieck, die einen nicht
    /// abgedeckten Punkt berühren. Punktindizes `(a, b)` mit `a < b`.
    pub fn stray_edges(&self) -> &[(usize, usize)] {
        &self.stray_edges
    }

    pub fn area(&self) -> f64 {
        self.polygons.iter().map(|p| p.unsigned_area()).sum()
    }

    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(self.polygons.clone())
    }
}

/// Baut Alpha-Shapes aus einer Delaunay-Triangulation.
///
/// Ohne explizites Alpha wird der mittlere Nächste-Nachbar-Abstand (ICD)
/// verwendet.
#[derive(Debug, Clone)]
pub struct AlphaShapeBuilder {
    alpha: Option<f64>,
    criterion: AlphaCriterion,
    keep_holes: bool,
}

impl Default for AlphaShapeBuilder {
    fn default() -> Self {
        Self {
            alpha: None,
            criterion: AlphaCriterion::Circumradius,
            keep_holes: true,
        }
    }
}

impl AlphaShapeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_criterion(mut self, criterion: AlphaCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Ob Löcher der Alpha-Komplexe als innere Ringe erhalten bleiben.
    pub fn with_holes(mut self, keep_holes: bool) -> Self {
        self.keep_holes = keep_holes;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if let Some(alpha) = self.alpha {
            if !(alpha.is_finite() && alpha > 0.0) {
                return Err(MathError::invalid(
                    "alpha",
                    format!("must be a positive finite length, got {}", alpha),
                ));
            }
        }
        Ok(())
    }

    pub fn build(&self, triangulation: &Triangulation) -> MathResult<AlphaShape> {
        self.validate()?;
        let alpha = self
            .alpha
            .unwrap_or_else(|| triangulation.mean_nearest_neighbor_distance());

        let retained: Vec<usize> = triangulation
            .triangles()
            .iter()
            .enumerate()
            .filter(|(_, t)| self.criterion.accepts(t.circumradius, t.longest_edge, alpha))
            .map(|(index, _)| index)
            .collect();

        debug!(
            "AlphaShapeBuilder: alpha {:.3} ({:?}) retains {} of {} triangles",
            alpha,
            self.criterion,
            retained.len(),
            triangulation.triangles().len()
        );

        if retained.is_empty() {
            return Err(MathError::EmptyBoundary {
                alpha,
                triangles: triangulation.triangles().len(),
            });
        }

        let boundary_edges = Self::boundary_edges(triangulation, &retained);
        let cycles = trace_cycles(triangulation.points(), &boundary_edges)?;

        let rings: Vec<Vec<Point2D>> = cycles
            .iter()
            .map(|cycle| cycle.iter().map(|&i| triangulation.point(i)).collect())
            .collect();
        let polygons = self.assemble(rings)?;

        let mut covered = vec![false; triangulation.num_points()];
        for &t in &retained {
            for v in triangulation.triangles()[t].vertices {
                covered[v] = true;
            }
        }
        let uncovered: Vec<usize> = (0..covered.len()).filter(|&i| !covered[i]).collect();
        let stray_edges = self.stray_edges(triangulation, &retained, &covered, alpha);
        if !uncovered.is_empty() {
            warn!(
                "AlphaShapeBuilder: {} of {} points lie outside the alpha polygons (alpha {:.3}), {} stray edge(s)",
                uncovered.len(),
                covered.len(),
                alpha,
                stray_edges.len()
            );
        }

        info!(
            "AlphaShapeBuilder: {} polygon(s), largest area {:.1}",
            polygons.len(),
            polygons[0].unsigned_area()
        );

        Ok(AlphaShape {
            alpha,
            criterion: self.criterion,
            polygons,
            retained_triangles: retained,
            uncovered,
            stray_edges,
        })
    }

    fn stray_edges(
        &self,
        triangulation: &Triangulation,
        retained: &[usize],
        covered: &[bool],
        alpha: f64,
    ) -> Vec<(usize, usize)> {
        let mut is_retained = vec![false; triangulation.triangles().len()];
        for &t in retained {
            is_retained[t] = true;
        }
        triangulation
            .edges()
            .iter()
            .filter(|e| !(covered[e.a] && covered[e.b]))
            .filter(|e| !e.incident_triangles().any(|t| is_retained[t]))
            .filter(|e| self.criterion.accepts_edge(e.length, alpha))
            .map(|e| (e.a, e.b))
            .collect()
    }

    /// Kanten mit genau einem behaltenen Dreieck, so orientiert, dass dieses links liegt.
    fn boundary_edges(triangulation: &Triangulation, retained: &[usize]) -> Vec<(usize, usize)> {
        let mut retained_count = vec![0u8; triangulation.edges().len()];
        for &t in retained {
            for e in triangulation.triangles()[t].edges {
                retained_count[e] += 1;
            }
        }

        let mut edges = Vec::new();
        for &t in retained {
            let triangle = &triangulation.triangles()[t];
            for slot in 0..3 {
                if retained_count[triangle.edges[slot]] == 1 {
                    // Dreiecke sind CCW, also liegt das Innere links von vertices[k] -> vertices[k+1]
                    edges.push((triangle.vertices[slot], triangle.vertices[(slot + 1) % 3]));
                }
            }
        }
        edges
    }

    /// Ordnet Löcher (CW-Ringe) der kleinsten umschließenden Hülle (CCW-Ring) zu.
    fn assemble(&self, rings: Vec<Vec<Point2D>>) -> MathResult<Vec<Polygon<f64>>> {
        let mut shells: Vec<(f64, Polygon<f64>, Vec<LineString<f64>>)> = Vec::new();
        let mut holes: Vec<Vec<Point2D>> = Vec::new();

        for ring in rings {
            let signed = simple_geometry::signed_area(&ring);
            if signed > 0.0 {
                let polygon = Polygon::new(LineString::from(ring), vec![]);
                shells.push((signed, polygon, Vec::new()));
            } else if signed < 0.0 {
                holes.push(ring);
            }
        }

        if shells.is_empty() {
            return Err(MathError::IncompleteBoundary {
                reason: "no counter-clockwise boundary cycle found".to_string(),
            });
        }

        let mut dropped = 0usize;
        for hole in holes {
            if !self.keep_holes {
                dropped += 1;
                continue;
            }
            let mut reversed = hole.clone();
            reversed.reverse();
            let inside: Option<Point<f64>> =
                Polygon::new(LineString::from(reversed), vec![]).interior_point();
            let owner = inside.and_then(|p| {
                shells
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, shell, _))| shell.contains(&p))
                    .min_by(|(_, (a, _, _)), (_, (b, _, _))| a.total_cmp(b))
                    .map(|(index, _)| index)
            });
            match owner {
                Some(index) => shells[index].2.push(LineString::from(hole)),
                None => {
                    warn!("AlphaShapeBuilder: hole with {} vertices has no enclosing shell", hole.len());
                    dropped += 1;
                }
            }
        }
        if dropped > 0 {
            debug!("AlphaShapeBuilder: {} hole(s) dropped", dropped);
        }

        let mut polygons: Vec<Polygon<f64>> = shells
            .into_iter()
            .map(|(_, shell, interiors)| Polygon::new(shell.exterior().clone(), interiors))
            .collect();
        polygons.sort_by(|a, b| b.unsigned_area().total_cmp(&a.unsigned_area()));
        Ok(polygons)
    }
}

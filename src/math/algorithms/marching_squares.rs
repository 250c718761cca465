// src/math/algorithms/marching_squares.rs

use crate::math::scalar_field::ScalarField2D;
use crate::math::types::Point2D;
use crate::math::utils::{comparison, simple_geometry};
use geo::{LineString, Polygon};
use std::collections::HashMap;

/// Repräsentiert eine extrahierte Konturlinie (Iso-Linie) aus einem Skalarfeld.
///
/// Geschlossene Konturen speichern den Startpunkt nicht doppelt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub vertices: Vec<Point2D>,
    pub is_closed: bool,
}

impl Contour {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            is_closed: false,
        }
    }

    pub fn add_vertex(&mut self, vertex: Point2D) {
        self.vertices.push(vertex);
    }

    pub fn close(&mut self) {
        if self.vertices.len() >= 3 {
            self.is_closed = true;
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Eingeschlossene Fläche; 0.0 für offene Konturen.
    pub fn area(&self) -> f64 {
        if !self.is_closed {
            return 0.0;
        }
        simple_geometry::signed_area(&self.vertices).abs()
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        let mut coords = self.vertices.clone();
        if self.is_closed {
            if let Some(first) = coords.first().copied() {
                coords.push(first);
            }
        }
        LineString::from(coords)
    }

    /// Polygon einer geschlossenen Kontur.
    pub fn to_polygon(&self) -> Option<Polygon<f64>> {
        self.is_closed
            .then(|| Polygon::new(LineString::from(self.vertices.clone()), vec![]))
    }
}

/// Kanten einer Gitterzelle. Eckenbits: 1 = (x, y), 2 = (x+1, y), 4 = (x+1, y+1), 8 = (x, y+1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellEdge {
    Bottom,
    Right,
    Top,
    Left,
}

/// Segmente je Konfiguration; Sattelfälle 5 und 10 werden über den Zellmittelwert aufgelöst.
fn segments_for(config: usize, center_inside: bool) -> &'static [(CellEdge, CellEdge)] {
    use CellEdge::*;
    match config {
        1 | 14 => &[(Left, Bottom)],
        2 | 13 => &[(Bottom, Right)],
        3 | 12 => &[(Left, Right)],
        4 | 11 => &[(Right, Top)],
        6 | 9 => &[(Bottom, Top)],
        7 | 8 => &[(Top, Left)],
        5 if center_inside => &[(Bottom, Right), (Top, Left)],
        5 => &[(Left, Bottom), (Right, Top)],
        10 if center_inside => &[(Left, Bottom), (Right, Top)],
        10 => &[(Bottom, Right), (Top, Left)],
        _ => &[],
    }
}

/// Marching Squares über einem beliebigen `ScalarField2D`.
///
/// Knoten mit Wert `>= threshold` gelten als innen. Segmente werden über
/// eindeutige Gitterkanten-IDs zu Linienzügen verkettet; Linien, die den
/// Gitterrand erreichen, bleiben offen.
pub struct MarchingSquares<'a, F: ScalarField2D + ?Sized> {
    field: &'a F,
    threshold: f64,
}

impl<'a, F: ScalarField2D + ?Sized> MarchingSquares<'a, F> {
    pub fn new(field: &'a F, threshold: f64) -> Self {
        Self { field, threshold }
    }

    /// Extrahiert alle Konturen in deterministischer Reihenfolge.
    pub fn extract(&self) -> Vec<Contour> {
        let (nx, ny) = (self.field.width(), self.field.height());
        if nx <= 1 || ny <= 1 {
            return Vec::new();
        }

        let mut points: HashMap<usize, Point2D> = HashMap::new();
        let mut segments: Vec<(usize, usize)> = Vec::new();

        for y in 0..ny - 1 {
            for x in 0..nx - 1 {
                let config = self.cell_configuration(x, y);
                if config == 0 || config == 15 {
                    continue;
                }
                let center = 0.25
                    * (self.field.get_value(x, y)
                        + self.field.get_value(x + 1, y)
                        + self.field.get_value(x + 1, y + 1)
                        + self.field.get_value(x, y + 1));
                for &(from, to) in segments_for(config, center >= self.threshold) {
                    let a = self.edge_id(x, y, from);
                    let b = self.edge_id(x, y, to);
                    points.entry(a).or_insert_with(|| self.edge_point(x, y, from));
                    points.entry(b).or_insert_with(|| self.edge_point(x, y, to));
                    segments.push((a, b));
                }
            }
        }

        Self::chain(&segments, &points)
    }

    fn cell_configuration(&self, x: usize, y: usize) -> usize {
        let mut config = 0;
        if self.field.get_value(x, y) >= self.threshold {
            config |= 1;
        }
        if self.field.get_value(x + 1, y) >= self.threshold {
            config |= 2;
        }
        if self.field.get_value(x + 1, y + 1) >= self.threshold {
            config |= 4;
        }
        if self.field.get_value(x, y + 1) >= self.threshold {
            config |= 8;
        }
        config
    }

    /// Globale ID einer Gitterkante: erst alle horizontalen, dann alle vertikalen.
    fn edge_id(&self, x: usize, y: usize, edge: CellEdge) -> usize {
        let nx = self.field.width();
        let horizontal = (nx - 1) * self.field.height();
        match edge {
            CellEdge::Bottom => y * (nx - 1) + x,
            CellEdge::Top => (y + 1) * (nx - 1) + x,
            CellEdge::Left => horizontal + y * nx + x,
            CellEdge::Right => horizontal + y * nx + x + 1,
        }
    }

    fn edge_point(&self, x: usize, y: usize, edge: CellEdge) -> Point2D {
        let ((x1, y1), (x2, y2)) = match edge {
            CellEdge::Bottom => ((x, y), (x + 1, y)),
            CellEdge::Right => ((x + 1, y), (x + 1, y + 1)),
            CellEdge::Top => ((x, y + 1), (x + 1, y + 1)),
            CellEdge::Left => ((x, y), (x, y + 1)),
        };
        let p1 = self.field.node_to_world(x1, y1);
        let p2 = self.field.node_to_world(x2, y2);
        let t = comparison::inverse_lerp(
            self.field.get_value(x1, y1),
            self.field.get_value(x2, y2),
            self.threshold,
        )
        .clamp(0.0, 1.0);
        Point2D {
            x: p1.x + (p2.x - p1.x) * t,
            y: p1.y + (p2.y - p1.y) * t,
        }
    }

    /// Verkettet Segmente zu Linienzügen: zuerst offene Linien ab Kanten mit
    /// nur einem Segment, danach die verbleibenden Ringe.
    fn chain(segments: &[(usize, usize)], points: &HashMap<usize, Point2D>) -> Vec<Contour> {
        let mut incident: HashMap<usize, Vec<usize>> = HashMap::new();
        for (index, &(a, b)) in segments.iter().enumerate() {
            incident.entry(a).or_default().push(index);
            incident.entry(b).or_default().push(index);
        }

        let mut visited = vec![false; segments.len()];
        let mut contours = Vec::new();

        let mut open_starts: Vec<usize> = incident
            .iter()
            .filter(|(_, list)| list.len() == 1)
            .map(|(edge, _)| *edge)
            .collect();
        open_starts.sort_unstable();

        for start in open_starts {
            let Some(&first) = incident.get(&start).and_then(|list| list.first()) else {
                continue;
            };
            if visited[first] {
                continue;
            }
            contours.push(Self::walk(start, first, segments, points, &incident, &mut visited));
        }

        for index in 0..segments.len() {
            if visited[index] {
                continue;
            }
            let mut contour = Self::walk(segments[index].0, index, segments, points, &incident, &mut visited);
            // Der Ring endet wieder am Start
            if contour.vertices.len() > 1 && contour.vertices.first() == contour.vertices.last() {
                contour.vertices.pop();
            }
            contour.close();
            contours.push(contour);
        }

        contours
    }

    fn walk(
        start: usize,
        first_segment: usize,
        segments: &[(usize, usize)],
        points: &HashMap<usize, Point2D>,
        incident: &HashMap<usize, Vec<usize>>,
        visited: &mut [bool],
    ) -> Contour {
        let mut contour = Contour::new();
        if let Some(p) = points.get(&start) {
            contour.add_vertex(*p);
        }
        let mut current_edge = start;
        let mut current_segment = Some(first_segment);

        while let Some(segment) = current_segment {
            visited[segment] = true;
            let (a, b) = segments[segment];
            let next_edge = if a == current_edge { b } else { a };
            if let Some(p) = points.get(&next_edge) {
                contour.add_vertex(*p);
            }
            current_edge = next_edge;
            current_segment = incident
                .get(&current_edge)
                .and_then(|list| list.iter().copied().find(|s| !visited[*s]));
        }
        contour
    }
}

// src/math/geometry/alpha_shape/boundary_trace.rs

//! Verkettet gerichtete Randkanten zu geschlossenen Zyklen.
//!
//! Jede Kante ist so orientiert, dass das behaltene Dreieck links liegt.
//! An jedem Knoten wird die ausgehende Kante gewählt, die vom Rückweg aus im
//! Uhrzeigersinn zuerst erreicht wird. Damit werden Knoten, an denen sich zwei
//! Dreiecksfächer nur berühren, in getrennte einfache Ringe aufgeteilt.

use crate::math::{
    error::{MathError, MathResult},
    types::Point2D,
    utils::constants,
};
use std::collections::BTreeMap;

/// Winkel von `from` nach `to` im Uhrzeigersinn, im Intervall (0, 2π].
fn clockwise_angle(from: Point2D, to: Point2D) -> f64 {
    let angle = (from.y.atan2(from.x) - to.y.atan2(to.x)).rem_euclid(constants::TAU);
    if angle <= 0.0 { constants::TAU } else { angle }
}

/// Zerlegt die gerichteten Kanten `(start, end)` in Zyklen von Punktindizes.
///
/// Jeder Zyklus wird ohne Wiederholung des Startpunkts zurückgegeben. Jede
/// Kante gehört zu genau einem Zyklus; bleibt ein Pfad offen oder trifft er
/// auf eine bereits verbrauchte Kante, schlägt die Funktion mit
/// `IncompleteBoundary` fehl.
pub fn trace_cycles(points: &[Point2D], edges: &[(usize, usize)]) -> MathResult<Vec<Vec<usize>>> {
    let mut outgoing: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, &(start, end)) in edges.iter().enumerate() {
        if start >= points.len() || end >= points.len() {
            return Err(MathError::IncompleteBoundary {
                reason: format!("edge #{} ({} -> {}) references a missing point", index, start, end),
            });
        }
        outgoing.entry(start).or_default().push(index);
    }

    let mut visited = vec![false; edges.len()];
    let mut cycles = Vec::new();

    for first in 0..edges.len() {
        if visited[first] {
            continue;
        }
        visited[first] = true;
        let mut cycle = vec![edges[first].0];
        let mut current = first;

        loop {
            let (previous, vertex) = edges[current];
            let back = points[previous] - points[vertex];
            let next = outgoing
                .get(&vertex)
                .into_iter()
                .flatten()
                .copied()
                .min_by(|&a, &b| {
                    let angle_a = clockwise_angle(back, points[edges[a].1] - points[vertex]);
                    let angle_b = clockwise_angle(back, points[edges[b].1] - points[vertex]);
                    angle_a.total_cmp(&angle_b)
                })
                .ok_or_else(|| MathError::IncompleteBoundary {
                    reason: format!("boundary path ends at point #{} without outgoing edge", vertex),
                })?;

            if next == first {
                break;
            }
            if visited[next] {
                return Err(MathError::IncompleteBoundary {
                    reason: format!(
                        "edge {} -> {} is claimed by two boundary cycles",
                        edges[next].0, edges[next].1
                    ),
                });
            }
            visited[next] = true;
            cycle.push(vertex);
            current = next;
        }

        cycles.push(cycle);
    }

    Ok(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::utils::simple_geometry;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2D> {
        coords.iter().map(|&(x, y)| Point2D { x, y }).collect()
    }

    fn ring(points: &[Point2D], cycle: &[usize]) -> Vec<Point2D> {
        cycle.iter().map(|&i| points[i]).collect()
    }

    #[test]
    fn test_single_square_cycle() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let cycles = trace_cycles(&points, &[(2, 3), (0, 1), (3, 0), (1, 2)]).unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec![2, 3, 0, 1]);
        assert!(simple_geometry::signed_area(&ring(&points, &cycles[0])) > 0.0);
    }

    #[test]
    fn test_pinch_vertex_splits_into_two_loops() {
        // Zwei Dreiecke, die sich nur im Punkt 0 berühren
        let points = pts(&[(0.0, 0.0), (2.0, -1.0), (2.0, 1.0), (-2.0, 1.0), (-2.0, -1.0)]);
        let edges = [(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0)];
        let cycles = trace_cycles(&points, &edges).unwrap();
        assert_eq!(cycles.len(), 2);
        for cycle in &cycles {
            assert_eq!(cycle.len(), 3);
            assert!(simple_geometry::signed_area(&ring(&points, cycle)) > 0.0);
        }
    }

    #[test]
    fn test_hole_cycle_is_clockwise() {
        let points = pts(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (0.0, 4.0),
            (1.0, 1.0),
            (3.0, 1.0),
            (3.0, 3.0),
            (1.0, 3.0),
        ]);
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0), (4, 7), (7, 6), (6, 5), (5, 4)];
        let cycles = trace_cycles(&points, &edges).unwrap();
        assert_eq!(cycles.len(), 2);
        assert!(simple_geometry::signed_area(&ring(&points, &cycles[0])) > 0.0);
        assert!(simple_geometry::signed_area(&ring(&points, &cycles[1])) < 0.0);
    }

    #[test]
    fn test_dangling_path_is_incomplete() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let err = trace_cycles(&points, &[(0, 1), (1, 2)]).unwrap_err();
        assert!(matches!(err, MathError::IncompleteBoundary { .. }));
    }
}

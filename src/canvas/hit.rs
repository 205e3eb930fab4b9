//! Hit testing of pointer positions against rendered stage geometry.

use crate::geometry::{polygon_contains, Point};
use crate::model::{AnnotationKind, InternalId};

use super::StageShape;

/// What a pointer position landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A node of the selected annotation
    Node { id: InternalId, index: usize },
    /// An edge of the selected annotation, starting at node `after`
    Edge { id: InternalId, after: usize },
    /// The body of any annotation
    Body { id: InternalId },
    Nothing,
}

/// Hit tolerances in stage units (page pixels divided by scale).
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    pub node: f64,
    pub edge: f64,
}

impl Tolerance {
    pub fn new(node_radius: f64, stroke_width: f64, scale: f64) -> Self {
        Self {
            node: node_radius / scale,
            edge: (stroke_width + node_radius) / scale,
        }
    }
}

/// Resolve `at` against `shapes`, last shape on top.
///
/// Nodes and edges are only considered on the selected shape.
pub fn hit_test(shapes: &[StageShape], at: Point, tolerance: Tolerance) -> Hit {
    if let Some(selected) = shapes.iter().find(|s| s.selected) {
        if let Some(index) = node_at(&selected.coordinates, at, tolerance.node) {
            return Hit::Node {
                id: selected.id,
                index,
            };
        }
        if selected.kind.has_editable_nodes() {
            if let Some(after) = edge_at(selected, at, tolerance.edge) {
                return Hit::Edge {
                    id: selected.id,
                    after,
                };
            }
        }
    }

    shapes
        .iter()
        .rev()
        .find(|shape| body_contains(shape, at, tolerance))
        .map_or(Hit::Nothing, |shape| Hit::Body { id: shape.id })
}

fn node_at(nodes: &[Point], at: Point, radius: f64) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.distance_to(&at) <= radius)
        .min_by(|(_, a), (_, b)| a.distance_to(&at).total_cmp(&b.distance_to(&at)))
        .map(|(index, _)| index)
}

/// Index of the first node of the closest edge within `tolerance`.
fn edge_at(shape: &StageShape, at: Point, tolerance: f64) -> Option<usize> {
    edges(&shape.coordinates, shape.kind.is_closed())
        .map(|(i, a, b)| (i, at.distance_to_segment(a, b)))
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

fn edges(nodes: &[Point], closed: bool) -> impl Iterator<Item = (usize, &Point, &Point)> {
    let n = nodes.len();
    let count = match (closed, n) {
        (_, 0 | 1) => 0,
        (true, 2) => 1,
        (true, n) => n,
        (false, n) => n - 1,
    };
    (0..count).map(move |i| (i, &nodes[i], &nodes[(i + 1) % n]))
}

fn body_contains(shape: &StageShape, at: Point, tolerance: Tolerance) -> bool {
    match shape.kind {
        AnnotationKind::Point => shape
            .coordinates
            .first()
            .is_some_and(|p| p.distance_to(&at) <= tolerance.node),
        AnnotationKind::Line => edge_at(shape, at, tolerance.edge).is_some(),
        AnnotationKind::BBox | AnnotationKind::Polygon => {
            polygon_contains(&shape.coordinates, &at) || edge_at(shape, at, tolerance.edge).is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotationStatus;

    fn shape(id: InternalId, kind: AnnotationKind, coordinates: Vec<Point>, selected: bool) -> StageShape {
        StageShape {
            id,
            kind,
            status: AnnotationStatus::Loaded,
            selected,
            coordinates,
        }
    }

    fn square(id: InternalId, selected: bool) -> StageShape {
        shape(
            id,
            AnnotationKind::Polygon,
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
            selected,
        )
    }

    const TOL: Tolerance = Tolerance { node: 4.0, edge: 8.0 };

    #[test]
    fn nodes_only_on_selected_shape() {
        let shapes = [square(0, false)];
        assert_eq!(hit_test(&shapes, Point::new(1.0, 1.0), TOL), Hit::Body { id: 0 });
        let shapes = [square(0, true)];
        assert_eq!(
            hit_test(&shapes, Point::new(1.0, 1.0), TOL),
            Hit::Node { id: 0, index: 0 }
        );
    }

    #[test]
    fn wrap_around_edge_is_found() {
        let shapes = [square(0, true)];
        assert_eq!(
            hit_test(&shapes, Point::new(2.0, 50.0), TOL),
            Hit::Edge { id: 0, after: 3 }
        );
    }

    #[test]
    fn topmost_body_wins() {
        let shapes = [square(0, false), square(1, false)];
        assert_eq!(hit_test(&shapes, Point::new(50.0, 50.0), TOL), Hit::Body { id: 1 });
    }

    #[test]
    fn line_body_is_its_stroke() {
        let line = shape(
            5,
            AnnotationKind::Line,
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            false,
        );
        let shapes = [line];
        assert_eq!(hit_test(&shapes, Point::new(50.0, 5.0), TOL), Hit::Body { id: 5 });
        assert_eq!(hit_test(&shapes, Point::new(50.0, 20.0), TOL), Hit::Nothing);
    }

    #[test]
    fn tolerance_shrinks_with_zoom() {
        let tol = Tolerance::new(4.0, 4.0, 4.0);
        assert_eq!(tol.node, 1.0);
        assert_eq!(tol.edge, 2.0);
    }
}

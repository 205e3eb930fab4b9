//! Point editor. A point has no creation phase and no node removal.

use super::{EditCore, EditEvent, Gesture, ShapeEditor};
use crate::capture::PointerCapture;
use crate::geometry::Point;
use crate::model::AnnotationKind;

#[derive(Debug)]
pub struct PointEditor {
    pub(crate) core: EditCore,
}

impl PointEditor {
    pub fn new(coordinates: Vec<Point>, scale: f64) -> Self {
        Self {
            core: EditCore::new(coordinates, scale),
        }
    }
}

impl ShapeEditor for PointEditor {
    fn kind(&self) -> AnnotationKind {
        AnnotationKind::Point
    }

    fn gesture(&self) -> &Gesture {
        &self.core.gesture
    }

    fn live_coordinates(&self) -> &[Point] {
        &self.core.coordinates
    }

    fn stored_coordinates(&self) -> Vec<Point> {
        self.core.coordinates.clone()
    }

    fn begin_node_drag(&mut self, index: usize, capture: PointerCapture) -> bool {
        self.core.begin_node_drag(index, capture)
    }

    fn begin_shape_drag(&mut self, capture: PointerCapture) -> bool {
        self.core.begin_shape_drag(capture)
    }

    fn on_move(&mut self, stage: Point, movement: Point) -> Option<EditEvent> {
        match self.core.gesture {
            Gesture::DraggingNode { index, .. } => {
                if self.core.coordinates[index] != stage {
                    self.core.coordinates[index] = stage;
                    self.core.mark_node_moved();
                }
                Some(EditEvent::NodeMoving {
                    index,
                    coordinates: self.stored_coordinates(),
                })
            }
            Gesture::DraggingShape { .. } => {
                self.core.drag_shape(movement);
                Some(EditEvent::ShapeMoving {
                    coordinates: self.stored_coordinates(),
                })
            }
            Gesture::Idle | Gesture::Creating { .. } => None,
        }
    }

    fn commit(&mut self) -> Option<EditEvent> {
        self.core.commit_drag(|c| c.to_vec())
    }

    fn cancel(&mut self) {
        self.core.cancel();
    }

    fn finish_creation(&mut self) -> Option<EditEvent> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::GlobalPointer;

    #[test]
    fn shape_drag_counter_scales_movement() {
        let pointer = GlobalPointer::new();
        let mut editor = PointEditor::new(vec![Point::new(10.0, 10.0)], 2.0);
        assert!(editor.begin_shape_drag(pointer.capture()));
        editor.on_move(Point::ZERO, Point::new(4.0, -2.0));
        let event = editor.commit();
        assert_eq!(
            event,
            Some(EditEvent::ShapeMoved {
                coordinates: vec![Point::new(12.0, 9.0)]
            })
        );
    }

    #[test]
    fn zero_movement_drag_does_not_commit() {
        let pointer = GlobalPointer::new();
        let mut editor = PointEditor::new(vec![Point::new(10.0, 10.0)], 1.0);
        editor.begin_shape_drag(pointer.capture());
        editor.on_move(Point::ZERO, Point::ZERO);
        assert_eq!(editor.commit(), None);
        assert!(editor.gesture().is_idle());
    }

    #[test]
    fn points_have_no_node_removal() {
        let mut editor = PointEditor::new(vec![Point::new(1.0, 1.0)], 1.0);
        assert_eq!(editor.remove_node(0), None);
        assert_eq!(editor.stored_coordinates().len(), 1);
    }
}

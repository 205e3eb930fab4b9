//! Bounding box editor.
//!
//! A box is stored as two opposite corners but edited as four, in the order
//! `{start, (start.x, end.y), end, (end.x, start.y)}`. Dragging a corner
//! drags the two adjacent corners along the shared axis so the shape stays a
//! rectangle. Stored corners are always normalized to (min, max).

use super::{EditCore, EditEvent, Gesture, ShapeEditor};
use crate::capture::PointerCapture;
use crate::geometry::{bbox_corners, bounding_corners, Point};
use crate::model::AnnotationKind;

#[derive(Debug)]
pub struct BoxEditor {
    pub(crate) core: EditCore,
    /// Fixed corner while the box is being created
    anchor: Point,
}

impl BoxEditor {
    /// Editor over two stored corners.
    pub fn new(corners: Vec<Point>, scale: f64) -> Self {
        let (start, end) = bounding_corners(&corners).unwrap_or_default();
        Self {
            core: EditCore::new(bbox_corners(start, end).to_vec(), scale),
            anchor: start,
        }
    }

    /// Seed two identical corners at `at`; the second follows the pointer.
    pub fn begin_creation(at: Point, scale: f64, capture: PointerCapture) -> Self {
        let mut editor = Self::new(vec![at, at], scale);
        editor.anchor = at;
        editor.core.gesture = Gesture::Creating {
            capture: Some(capture),
            moved: false,
        };
        editor
    }

    /// Move corner `index` and keep the rectangle.
    fn move_corner(&mut self, index: usize, to: Point) {
        let c = &mut self.core.coordinates;
        let prev = (index + 3) % 4;
        let next = (index + 1) % 4;
        // Even corners share x with the next corner, odd corners with the previous
        let (same_x, same_y) = if index % 2 == 0 { (next, prev) } else { (prev, next) };
        c[index] = to;
        c[same_x].x = to.x;
        c[same_y].y = to.y;
    }

    fn finish(&mut self) -> EditEvent {
        self.core.take_gesture();
        let stored = self.stored_coordinates();
        self.core.coordinates = bbox_corners(stored[0], stored[1]).to_vec();
        log::info!(
            "Bounding box finished: ({:.1}, {:.1}) - ({:.1}, {:.1})",
            stored[0].x,
            stored[0].y,
            stored[1].x,
            stored[1].y
        );
        EditEvent::CreationFinished { coordinates: stored }
    }
}

/// Normalized (min, max) corners of a four-corner box.
fn normalized(corners: &[Point]) -> Vec<Point> {
    match bounding_corners(corners) {
        Some((min, max)) => vec![min, max],
        None => Vec::new(),
    }
}

impl ShapeEditor for BoxEditor {
    fn kind(&self) -> AnnotationKind {
        AnnotationKind::BBox
    }

    fn gesture(&self) -> &Gesture {
        &self.core.gesture
    }

    fn live_coordinates(&self) -> &[Point] {
        &self.core.coordinates
    }

    fn stored_coordinates(&self) -> Vec<Point> {
        normalized(&self.core.coordinates)
    }

    fn begin_node_drag(&mut self, index: usize, capture: PointerCapture) -> bool {
        self.core.begin_node_drag(index, capture)
    }

    fn begin_shape_drag(&mut self, capture: PointerCapture) -> bool {
        self.core.begin_shape_drag(capture)
    }

    fn on_move(&mut self, stage: Point, movement: Point) -> Option<EditEvent> {
        match &mut self.core.gesture {
            Gesture::DraggingNode { index, .. } => {
                let index = *index;
                if self.core.coordinates[index] != stage {
                    self.move_corner(index, stage);
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
            Gesture::Creating { moved, .. } => {
                if stage != self.anchor {
                    *moved = true;
                }
                let (min, max) = bounding_corners(&[self.anchor, stage]).unwrap_or_default();
                self.core.coordinates = bbox_corners(min, max).to_vec();
                Some(EditEvent::CreationMoving {
                    coordinates: self.stored_coordinates(),
                })
            }
            Gesture::Idle => None,
        }
    }

    fn commit(&mut self) -> Option<EditEvent> {
        let creating_moved = match &self.core.gesture {
            Gesture::Creating { moved, .. } => Some(*moved),
            _ => None,
        };
        match creating_moved {
            // Released after dragging out the box: done
            Some(true) => Some(self.finish()),
            // Released without movement: wait for a second click
            Some(false) => {
                if let Gesture::Creating { capture, .. } = &mut self.core.gesture {
                    capture.take();
                }
                None
            }
            None => self.core.commit_drag(normalized),
        }
    }

    fn cancel(&mut self) {
        self.core.cancel();
    }

    fn finish_creation(&mut self) -> Option<EditEvent> {
        if !self.core.gesture.is_creating() {
            return None;
        }
        Some(self.finish())
    }
}

//! Line and polygon editor.
//!
//! Both are node lists in draw order; a polygon additionally closes from the
//! last node back to the first, which adds a wrap-around edge for insertion.

use super::{EditCore, EditEvent, Gesture, ShapeEditor};
use crate::capture::PointerCapture;
use crate::geometry::Point;
use crate::model::AnnotationKind;

#[derive(Debug)]
pub struct PathEditor {
    kind: AnnotationKind,
    pub(crate) core: EditCore,
}

impl PathEditor {
    pub fn new(kind: AnnotationKind, coordinates: Vec<Point>, scale: f64) -> Self {
        Self {
            kind,
            core: EditCore::new(coordinates, scale),
        }
    }

    /// Start a new path: one fixed node plus one tracking the pointer.
    pub fn begin_creation(kind: AnnotationKind, at: Point, scale: f64) -> Self {
        let mut editor = Self::new(kind, vec![at, at], scale);
        editor.core.gesture = Gesture::Creating {
            capture: None,
            moved: false,
        };
        editor
    }

    /// Reopen a finished path and append a tracking node.
    pub fn resume_creation(&mut self, at: Point) -> bool {
        if !self.core.gesture.is_idle() {
            return false;
        }
        self.core.coordinates.push(at);
        self.core.gesture = Gesture::Creating {
            capture: None,
            moved: false,
        };
        log::debug!("{} reopened with {} nodes", self.kind.name(), self.core.coordinates.len());
        true
    }

    /// Number of edges, counting the closing edge of a polygon.
    pub fn edge_count(&self) -> usize {
        let n = self.core.coordinates.len();
        match (self.kind.is_closed(), n) {
            (_, 0 | 1) => 0,
            (true, 2) => 1,
            (true, n) => n,
            (false, n) => n - 1,
        }
    }
}

impl ShapeEditor for PathEditor {
    fn kind(&self) -> AnnotationKind {
        self.kind
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
            Gesture::Creating { .. } => {
                // The last node follows the pointer; it is replaced, not appended
                if let Some(last) = self.core.coordinates.last_mut() {
                    *last = stage;
                }
                Some(EditEvent::CreationMoving {
                    coordinates: self.stored_coordinates(),
                })
            }
            Gesture::Idle => None,
        }
    }

    fn commit(&mut self) -> Option<EditEvent> {
        self.core.commit_drag(|c| c.to_vec())
    }

    fn cancel(&mut self) {
        self.core.cancel();
    }

    fn insert_node(&mut self, after: usize, at: Point) -> Option<EditEvent> {
        if !self.core.gesture.is_idle() || after >= self.edge_count() {
            log::debug!("Node insertion after {} ignored", after);
            return None;
        }
        let index = after + 1;
        self.core.coordinates.insert(index, at);
        log::debug!("{}: node inserted at {}", self.kind.name(), index);
        Some(EditEvent::NodeAdded {
            index,
            coordinates: self.stored_coordinates(),
        })
    }

    fn remove_node(&mut self, index: usize) -> Option<EditEvent> {
        if !self.core.gesture.is_idle() || index >= self.core.coordinates.len() {
            return None;
        }
        if self.core.coordinates.len() <= self.kind.min_nodes() {
            log::debug!(
                "{}: removing node {} would leave fewer than {} nodes",
                self.kind.name(),
                index,
                self.kind.min_nodes()
            );
            return None;
        }
        self.core.coordinates.remove(index);
        log::debug!("{}: node {} removed", self.kind.name(), index);
        Some(EditEvent::NodeRemoved {
            index,
            coordinates: self.stored_coordinates(),
        })
    }

    fn add_creation_node(&mut self, at: Point) -> Option<EditEvent> {
        if !self.core.gesture.is_creating() {
            return None;
        }
        if let Some(last) = self.core.coordinates.last_mut() {
            *last = at;
        }
        self.core.coordinates.push(at);
        let index = self.core.coordinates.len() - 2;
        Some(EditEvent::NodeAdded {
            index,
            coordinates: self.stored_coordinates(),
        })
    }

    fn finish_creation(&mut self) -> Option<EditEvent> {
        if !self.core.gesture.is_creating() {
            return None;
        }
        let mut nodes = self.core.coordinates.clone();
        // A confirming click lands on the node that is already tracking
        while nodes.len() > 1 && nodes[nodes.len() - 1] == nodes[nodes.len() - 2] {
            nodes.pop();
        }
        if nodes.len() < self.kind.min_nodes() {
            log::debug!(
                "{}: cannot finish with {} nodes, need {}",
                self.kind.name(),
                nodes.len(),
                self.kind.min_nodes()
            );
            return None;
        }
        self.core.coordinates = nodes;
        self.core.take_gesture();
        log::info!(
            "{} finished with {} nodes",
            self.kind.name(),
            self.core.coordinates.len()
        );
        Some(EditEvent::CreationFinished {
            coordinates: self.stored_coordinates(),
        })
    }
}

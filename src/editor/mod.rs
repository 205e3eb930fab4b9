//! Interactive editing state machines, one per annotation kind.
//!
//! Editors work on live stage coordinates. They never touch the session
//! directly: every step returns an [`EditEvent`] that the canvas feeds into
//! its reducer. Live events (`*Moving`) arrive many times per gesture, and
//! exactly one commit event ends it.
//!
//! ```text
//!            begin_node_drag          on_move*          commit
//!   Idle ────────────────────▶ DraggingNode ────────▶ (NodeMoved) ─▶ Idle
//!        ────────────────────▶ DraggingShape ───────▶ (ShapeMoved) ─▶ Idle
//!   begin_creation ──────────▶ Creating ── finish ──▶ (CreationFinished) ─▶ Idle
//! ```

mod bbox;
mod path;
mod point;

pub use bbox::BoxEditor;
pub use path::PathEditor;
pub use point::PointEditor;

use crate::capture::{GlobalPointer, PointerCapture};
use crate::geometry::Point;
use crate::model::AnnotationKind;

/// Interaction state of an editor.
///
/// Drag states own the global pointer capture, so leaving them releases it.
#[derive(Debug, Default)]
pub enum Gesture {
    #[default]
    Idle,
    DraggingNode {
        index: usize,
        moved: bool,
        capture: PointerCapture,
    },
    DraggingShape {
        /// Set by any nonzero move; read at mouse up
        moved: bool,
        capture: PointerCapture,
    },
    Creating {
        /// Held while a bounding box corner follows a pressed button
        capture: Option<PointerCapture>,
        moved: bool,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Gesture::DraggingNode { .. } | Gesture::DraggingShape { .. })
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, Gesture::Creating { .. })
    }
}

/// Event emitted by an editor. Coordinates are stage space in the stored
/// layout of the annotation kind.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    NodeMoving { index: usize, coordinates: Vec<Point> },
    ShapeMoving { coordinates: Vec<Point> },
    CreationMoving { coordinates: Vec<Point> },
    NodeMoved { index: usize, coordinates: Vec<Point> },
    ShapeMoved { coordinates: Vec<Point> },
    NodeAdded { index: usize, coordinates: Vec<Point> },
    NodeRemoved { index: usize, coordinates: Vec<Point> },
    CreationFinished { coordinates: Vec<Point> },
}

impl EditEvent {
    /// Whether this event ends a gesture and must be written to the session.
    pub fn is_commit(&self) -> bool {
        !matches!(
            self,
            EditEvent::NodeMoving { .. } | EditEvent::ShapeMoving { .. } | EditEvent::CreationMoving { .. }
        )
    }

    pub fn coordinates(&self) -> &[Point] {
        match self {
            EditEvent::NodeMoving { coordinates, .. }
            | EditEvent::ShapeMoving { coordinates }
            | EditEvent::CreationMoving { coordinates }
            | EditEvent::NodeMoved { coordinates, .. }
            | EditEvent::ShapeMoved { coordinates }
            | EditEvent::NodeAdded { coordinates, .. }
            | EditEvent::NodeRemoved { coordinates, .. }
            | EditEvent::CreationFinished { coordinates } => coordinates,
        }
    }
}

/// Capabilities shared by all shape editors.
pub trait ShapeEditor {
    fn kind(&self) -> AnnotationKind;

    fn gesture(&self) -> &Gesture;

    /// Live stage coordinates as rendered (four corners for a bounding box).
    fn live_coordinates(&self) -> &[Point];

    /// Stage coordinates in the stored layout of the kind.
    fn stored_coordinates(&self) -> Vec<Point>;

    /// Start dragging one node. Refused while creating.
    fn begin_node_drag(&mut self, index: usize, capture: PointerCapture) -> bool;

    /// Start dragging the whole shape. Refused while creating.
    fn begin_shape_drag(&mut self, capture: PointerCapture) -> bool;

    /// Pointer moved to `stage` by `movement` page pixels.
    fn on_move(&mut self, stage: Point, movement: Point) -> Option<EditEvent>;

    /// Pointer released: end the running drag.
    fn commit(&mut self) -> Option<EditEvent>;

    /// Abort the running gesture. Drags snap back to where they started.
    fn cancel(&mut self);

    /// Insert a node after `after` (right click on an edge).
    fn insert_node(&mut self, _after: usize, _at: Point) -> Option<EditEvent> {
        None
    }

    /// Remove a node (ctrl + click).
    fn remove_node(&mut self, _index: usize) -> Option<EditEvent> {
        None
    }

    /// Fix the tracking node and start a new one (right click while creating).
    fn add_creation_node(&mut self, _at: Point) -> Option<EditEvent> {
        None
    }

    /// Confirm the shape under construction.
    fn finish_creation(&mut self) -> Option<EditEvent>;

    fn is_creating(&self) -> bool {
        self.gesture().is_creating()
    }

    fn is_dragging(&self) -> bool {
        self.gesture().is_dragging()
    }
}

/// Editor for one annotation, one variant per kind.
#[derive(Debug)]
pub enum AnnotationEditor {
    Point(PointEditor),
    Line(PathEditor),
    BBox(BoxEditor),
    Polygon(PathEditor),
}

impl AnnotationEditor {
    /// Editor over existing stage coordinates (stored layout).
    pub fn new(kind: AnnotationKind, coordinates: Vec<Point>, scale: f64) -> Self {
        match kind {
            AnnotationKind::Point => AnnotationEditor::Point(PointEditor::new(coordinates, scale)),
            AnnotationKind::Line => AnnotationEditor::Line(PathEditor::new(kind, coordinates, scale)),
            AnnotationKind::BBox => AnnotationEditor::BBox(BoxEditor::new(coordinates, scale)),
            AnnotationKind::Polygon => {
                AnnotationEditor::Polygon(PathEditor::new(kind, coordinates, scale))
            }
        }
    }

    /// Editor for a shape created at `at`.
    ///
    /// A point is complete immediately; every other kind starts in the
    /// creating state with its last node tracking the pointer.
    pub fn begin_creation(kind: AnnotationKind, at: Point, scale: f64, pointer: &GlobalPointer) -> Self {
        log::debug!("Creating {} at ({:.1}, {:.1})", kind.name(), at.x, at.y);
        match kind {
            AnnotationKind::Point => AnnotationEditor::Point(PointEditor::new(vec![at], scale)),
            AnnotationKind::Line => AnnotationEditor::Line(PathEditor::begin_creation(kind, at, scale)),
            AnnotationKind::BBox => {
                AnnotationEditor::BBox(BoxEditor::begin_creation(at, scale, pointer.capture()))
            }
            AnnotationKind::Polygon => {
                AnnotationEditor::Polygon(PathEditor::begin_creation(kind, at, scale))
            }
        }
    }

    pub fn shape(&self) -> &dyn ShapeEditor {
        match self {
            AnnotationEditor::Point(e) => e as &dyn ShapeEditor,
            AnnotationEditor::Line(e) | AnnotationEditor::Polygon(e) => e as &dyn ShapeEditor,
            AnnotationEditor::BBox(e) => e as &dyn ShapeEditor,
        }
    }

    pub fn shape_mut(&mut self) -> &mut dyn ShapeEditor {
        match self {
            AnnotationEditor::Point(e) => e as &mut dyn ShapeEditor,
            AnnotationEditor::Line(e) | AnnotationEditor::Polygon(e) => e as &mut dyn ShapeEditor,
            AnnotationEditor::BBox(e) => e as &mut dyn ShapeEditor,
        }
    }

    /// Reopen a line or polygon for appending nodes. Other kinds refuse.
    pub fn resume_creation(&mut self, at: Point) -> bool {
        match self {
            AnnotationEditor::Line(e) | AnnotationEditor::Polygon(e) => e.resume_creation(at),
            AnnotationEditor::Point(_) | AnnotationEditor::BBox(_) => false,
        }
    }

    /// Update the zoom used to convert page movement into stage movement.
    pub fn set_scale(&mut self, scale: f64) {
        match self {
            AnnotationEditor::Point(e) => e.core.scale = scale,
            AnnotationEditor::Line(e) | AnnotationEditor::Polygon(e) => e.core.scale = scale,
            AnnotationEditor::BBox(e) => e.core.scale = scale,
        }
    }
}

/// State and drag mechanics shared by every editor.
#[derive(Debug)]
pub(crate) struct EditCore {
    pub(crate) coordinates: Vec<Point>,
    pub(crate) gesture: Gesture,
    /// Coordinates at the start of the running drag, restored on cancel
    pub(crate) origin: Vec<Point>,
    pub(crate) scale: f64,
}

impl EditCore {
    pub(crate) fn new(coordinates: Vec<Point>, scale: f64) -> Self {
        Self {
            coordinates,
            gesture: Gesture::Idle,
            origin: Vec::new(),
            scale,
        }
    }

    pub(crate) fn begin_node_drag(&mut self, index: usize, capture: PointerCapture) -> bool {
        if !self.gesture.is_idle() || index >= self.coordinates.len() {
            log::debug!("Node drag on {} refused in {:?}", index, self.gesture);
            return false;
        }
        self.origin = self.coordinates.clone();
        self.gesture = Gesture::DraggingNode {
            index,
            moved: false,
            capture,
        };
        log::debug!("Node drag started on node {}", index);
        true
    }

    pub(crate) fn begin_shape_drag(&mut self, capture: PointerCapture) -> bool {
        if !self.gesture.is_idle() {
            log::debug!("Shape drag refused in {:?}", self.gesture);
            return false;
        }
        self.origin = self.coordinates.clone();
        self.gesture = Gesture::DraggingShape {
            moved: false,
            capture,
        };
        log::debug!("Shape drag started");
        true
    }

    /// Offset every node by the page movement, counter-scaled.
    pub(crate) fn drag_shape(&mut self, movement: Point) {
        let offset = movement / self.scale;
        for p in &mut self.coordinates {
            *p += offset;
        }
        if let Gesture::DraggingShape { moved, .. } = &mut self.gesture {
            if movement != Point::ZERO {
                *moved = true;
            }
        }
    }

    pub(crate) fn mark_node_moved(&mut self) {
        if let Gesture::DraggingNode { moved, .. } = &mut self.gesture {
            *moved = true;
        }
    }

    /// Leave the current gesture, releasing any capture.
    pub(crate) fn take_gesture(&mut self) -> Gesture {
        std::mem::take(&mut self.gesture)
    }

    /// Shared commit for drags. Returns `None` for a drag without movement.
    pub(crate) fn commit_drag(&mut self, stored: impl Fn(&[Point]) -> Vec<Point>) -> Option<EditEvent> {
        match self.take_gesture() {
            Gesture::DraggingNode { index, moved, .. } => {
                log::debug!("Node drag ended on node {} (moved: {})", index, moved);
                moved.then(|| EditEvent::NodeMoved {
                    index,
                    coordinates: stored(&self.coordinates),
                })
            }
            Gesture::DraggingShape { moved, .. } => {
                log::debug!("Shape drag ended (moved: {})", moved);
                moved.then(|| EditEvent::ShapeMoved {
                    coordinates: stored(&self.coordinates),
                })
            }
            creating @ Gesture::Creating { .. } => {
                self.gesture = creating;
                None
            }
            Gesture::Idle => None,
        }
    }

    /// Shared cancel: drags snap back, creation is simply left.
    pub(crate) fn cancel(&mut self) {
        if self.take_gesture().is_dragging() {
            self.coordinates = std::mem::take(&mut self.origin);
            log::debug!("Drag cancelled, coordinates restored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_releases_capture() {
        let pointer = GlobalPointer::new();
        let mut editor = AnnotationEditor::new(
            AnnotationKind::Polygon,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)],
            1.0,
        );
        assert!(editor.shape_mut().begin_node_drag(1, pointer.capture()));
        assert!(pointer.is_captured());
        editor.shape_mut().on_move(Point::new(20.0, 5.0), Point::new(10.0, 5.0));
        let event = editor.shape_mut().commit();
        assert!(!pointer.is_captured());
        assert_eq!(
            event,
            Some(EditEvent::NodeMoved {
                index: 1,
                coordinates: vec![Point::new(0.0, 0.0), Point::new(20.0, 5.0), Point::new(0.0, 10.0)],
            })
        );
    }

    #[test]
    fn dropping_editor_releases_capture() {
        let pointer = GlobalPointer::new();
        {
            let mut editor = AnnotationEditor::new(AnnotationKind::Point, vec![Point::new(1.0, 1.0)], 1.0);
            assert!(editor.shape_mut().begin_shape_drag(pointer.capture()));
            assert!(pointer.is_captured());
        }
        assert!(!pointer.is_captured());
    }

    #[test]
    fn live_events_are_not_commits() {
        let live = EditEvent::ShapeMoving { coordinates: vec![] };
        let done = EditEvent::ShapeMoved { coordinates: vec![] };
        assert!(!live.is_commit());
        assert!(done.is_commit());
    }

    #[test]
    fn cancel_restores_drag_origin() {
        let pointer = GlobalPointer::new();
        let start = vec![Point::new(5.0, 5.0), Point::new(9.0, 9.0)];
        let mut editor = AnnotationEditor::new(AnnotationKind::Line, start.clone(), 1.0);
        editor.shape_mut().begin_shape_drag(pointer.capture());
        editor.shape_mut().on_move(Point::ZERO, Point::new(3.0, 3.0));
        editor.shape_mut().cancel();
        assert_eq!(editor.shape().stored_coordinates(), start);
        assert!(!pointer.is_captured());
    }
}

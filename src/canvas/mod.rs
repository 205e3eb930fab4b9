//! The annotation canvas: routes pointer and keyboard input.
//!
//! The canvas measures the image and its container, owns the viewport, the
//! session and the single active editor, and converts between page, stage
//! and percentage space at its edges. Editors report [`EditEvent`]s, which
//! [`Canvas::reduce`] writes into the session.

mod hit;

pub use hit::{hit_test, Hit, Tolerance};

use serde::Serialize;

use crate::capture::GlobalPointer;
use crate::config::SiaConfig;
use crate::constants::CAMERA_KEY_STEP;
use crate::editor::{AnnotationEditor, EditEvent};
use crate::geometry::{bbox_corners, bounding_corners, Point, Size};
use crate::keybindings::{map_key_down, map_key_up, Direction, Key, KeyAction, Modifiers};
use crate::message::HostEvent;
use crate::model::{Annotation, AnnotationKind, AnnotationMode, AnnotationStatus, ExternalAnnotation, InternalId, Label};
use crate::session::Session;
use crate::transform::{fitted_image_scale, mouse_stage_position, percentage_to_stage, stage_to_percentage};
use crate::viewport::Viewport;

/// Mouse buttons the canvas distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// An annotation as it should be drawn, in unscaled stage units.
///
/// Bounding boxes carry their four corners. The annotation being edited
/// shows its live editor geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageShape {
    pub id: InternalId,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub status: AnnotationStatus,
    pub selected: bool,
    pub coordinates: Vec<Point>,
}

/// Editor bound to the annotation it edits.
#[derive(Debug)]
struct ActiveEditor {
    id: InternalId,
    editor: AnnotationEditor,
}

#[derive(Debug)]
pub struct Canvas {
    config: SiaConfig,
    session: Session,
    viewport: Viewport,
    pointer: GlobalPointer,
    active: Option<ActiveEditor>,
    /// Natural image size in pixels
    image_size: Size,
    container_origin: Point,
    container_size: Size,
    /// Page position of the stage origin
    page_offset: Point,
    /// Drawing tool used for right-click creation
    tool: AnnotationKind,
    /// Control held: clicks insert and remove nodes
    add_mode: bool,
    camera_key: Option<Direction>,
    last_stage: Point,
}

impl Canvas {
    pub fn new(config: SiaConfig, possible_labels: Vec<Label>) -> Self {
        let session = Session::new(config.annotation_settings.clone(), possible_labels, &config.history);
        let tool = config.allowed_tools.first_allowed().unwrap_or(AnnotationKind::Point);
        Self {
            config,
            session,
            viewport: Viewport::new(),
            pointer: GlobalPointer::new(),
            active: None,
            image_size: Point::ZERO,
            container_origin: Point::ZERO,
            container_size: Point::ZERO,
            page_offset: Point::ZERO,
            tool,
            add_mode: false,
            camera_key: None,
            last_stage: Point::ZERO,
        }
    }

    /// Replace the wall clock used for annotation timing.
    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.session = self.session.with_clock(clock);
        self
    }

    /// Load host annotations and image labels. Returns how many annotations were accepted.
    pub fn load(&mut self, annotations: Vec<ExternalAnnotation>, image_labels: Vec<u32>) -> usize {
        self.session.load_image_labels(image_labels);
        self.session.load(annotations)
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn set_image_size(&mut self, size: Size) {
        log::debug!("Image size {}x{}", size.x, size.y);
        self.image_size = size;
        self.refit();
    }

    /// Container position on the page and its size.
    pub fn set_container(&mut self, origin: Point, size: Size) {
        log::debug!(
            "Container at ({:.0}, {:.0}), {}x{}",
            origin.x,
            origin.y,
            size.x,
            size.y
        );
        self.container_origin = origin;
        self.container_size = size;
        self.refit();
    }

    fn refit(&mut self) {
        let factor = fitted_image_scale(self.image_size, self.container_size);
        let canvas_size = self.image_size * factor;
        self.page_offset = if self.config.ui.image_centered {
            self.container_origin + (self.container_size - canvas_size) / 2.0
        } else {
            self.container_origin
        };
        self.viewport.set_fit(factor, canvas_size);
        self.viewport.reset();
        log::info!(
            "Fitted image at {:.3}x into {:.0}x{:.0} stage",
            factor,
            canvas_size.x,
            canvas_size.y
        );
        self.rebuild_editor();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn page_offset(&self) -> Point {
        self.page_offset
    }

    fn to_stage(&self, pct: Point) -> Point {
        percentage_to_stage(pct, self.image_size, self.viewport.canvas_size())
    }

    fn to_percentage(&self, stage: &[Point]) -> Vec<Point> {
        stage
            .iter()
            .map(|p| stage_to_percentage(*p, self.viewport.image_to_stage_factor(), self.image_size))
            .collect()
    }

    fn stage_at(&self, page: Point) -> Point {
        mouse_stage_position(
            page,
            self.page_offset,
            self.viewport.scale(),
            self.viewport.translation(),
        )
    }

    fn stage_coordinates(&self, annotation: &Annotation) -> Vec<Point> {
        let stage: Vec<Point> = annotation.coordinates.iter().map(|p| self.to_stage(*p)).collect();
        match (annotation.kind, bounding_corners(&stage)) {
            (AnnotationKind::BBox, Some((min, max))) => bbox_corners(min, max).to_vec(),
            _ => stage,
        }
    }

    /// Every annotation in draw order, in stage units.
    pub fn stage_geometry(&self) -> Vec<StageShape> {
        let selected = self.session.selected_id();
        self.session
            .annotations()
            .iter()
            .map(|annotation| {
                let coordinates = match &self.active {
                    Some(active) if active.id == annotation.internal_id => {
                        active.editor.shape().live_coordinates().to_vec()
                    }
                    _ => self.stage_coordinates(annotation),
                };
                StageShape {
                    id: annotation.internal_id,
                    kind: annotation.kind,
                    status: annotation.status,
                    selected: selected == Some(annotation.internal_id),
                    coordinates,
                }
            })
            .collect()
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        self.session.drain_events()
    }

    pub fn tool(&self) -> AnnotationKind {
        self.tool
    }

    /// Choose the drawing tool. Disabled tools are refused.
    pub fn set_tool(&mut self, kind: AnnotationKind) -> bool {
        if !self.config.allowed_tools.allows(kind) {
            log::debug!("Tool {} is not allowed", kind.name());
            return false;
        }
        self.tool = kind;
        true
    }

    pub fn is_add_mode(&self) -> bool {
        self.add_mode
    }

    pub fn camera_key(&self) -> Option<Direction> {
        self.camera_key
    }

    pub fn is_pointer_captured(&self) -> bool {
        self.pointer.is_captured()
    }

    fn editor_busy(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| !a.editor.shape().gesture().is_idle())
    }

    fn is_creating(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.editor.shape().is_creating())
    }

    /// Point the editor at the current selection, unless it is mid-gesture.
    fn rebuild_editor(&mut self) {
        if self.editor_busy() {
            return;
        }
        self.active = self.session.selected().map(|annotation| ActiveEditor {
            id: annotation.internal_id,
            editor: AnnotationEditor::new(
                annotation.kind,
                self.stage_coordinates(annotation),
                self.viewport.scale(),
            ),
        });
    }

    fn select(&mut self, id: Option<InternalId>) {
        if self.is_creating() {
            return;
        }
        self.active = None;
        self.session.select(id);
        self.rebuild_editor();
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn mouse_down(&mut self, page: Point, button: MouseButton, modifiers: Modifiers) {
        let stage = self.stage_at(page);
        self.last_stage = stage;
        match button {
            MouseButton::Middle => self.viewport.begin_camera_move(),
            MouseButton::Left => self.left_down(stage, modifiers.ctrl || self.add_mode),
            MouseButton::Right => self.right_down(stage),
        }
    }

    fn left_down(&mut self, stage: Point, ctrl: bool) {
        if self.viewport.is_camera_moving() {
            return;
        }
        if self.is_creating() {
            // Second click of a click-click bounding box
            if let Some(active) = &mut self.active {
                if active.editor.shape().kind() == AnnotationKind::BBox {
                    active.editor.shape_mut().on_move(stage, Point::ZERO);
                    let event = active.editor.shape_mut().finish_creation();
                    self.apply(event);
                }
            }
            return;
        }

        let can_edit = self.session.settings().can_edit;
        match self.hit(stage) {
            Hit::Node { id, index } if can_edit => {
                let Some(active) = self.active.as_mut().filter(|a| a.id == id) else {
                    return;
                };
                if ctrl {
                    let event = active.editor.shape_mut().remove_node(index);
                    self.apply(event);
                } else if active.editor.shape_mut().begin_node_drag(index, self.pointer.capture()) {
                    self.session.set_mode(id, AnnotationMode::Move);
                }
            }
            Hit::Edge { id, after } if can_edit && ctrl => {
                if let Some(active) = self.active.as_mut().filter(|a| a.id == id) {
                    let event = active.editor.shape_mut().insert_node(after, stage);
                    self.apply(event);
                }
            }
            Hit::Node { id, .. } | Hit::Edge { id, .. } | Hit::Body { id } => {
                if self.session.selected_id() != Some(id) {
                    self.select(Some(id));
                }
                if can_edit {
                    if let Some(active) = self.active.as_mut().filter(|a| a.id == id) {
                        if active.editor.shape_mut().begin_shape_drag(self.pointer.capture()) {
                            self.session.set_mode(id, AnnotationMode::Move);
                        }
                    }
                }
            }
            Hit::Nothing => self.select(None),
        }
    }

    fn right_down(&mut self, stage: Point) {
        if self.viewport.is_camera_moving() {
            return;
        }
        if self.is_creating() {
            if let Some(active) = &mut self.active {
                let event = active.editor.shape_mut().add_creation_node(stage);
                self.apply(event);
            }
            return;
        }
        match self.hit(stage) {
            Hit::Edge { id, after } if self.session.settings().can_edit => {
                if let Some(active) = self.active.as_mut().filter(|a| a.id == id) {
                    let event = active.editor.shape_mut().insert_node(after, stage);
                    self.apply(event);
                }
            }
            Hit::Nothing => self.start_creation(stage),
            Hit::Node { id, .. } | Hit::Edge { id, .. } | Hit::Body { id } => self.select(Some(id)),
        }
    }

    fn start_creation(&mut self, stage: Point) {
        let kind = self.tool;
        if !self.config.allowed_tools.allows(kind) || !self.session.settings().can_create {
            log::debug!("Creation of {} refused", kind.name());
            return;
        }
        if self.viewport.image_to_stage_factor() == 0.0 {
            log::debug!("Creation refused: image not measured yet");
            return;
        }
        self.session.select(None);
        self.active = None;
        let editor = AnnotationEditor::begin_creation(kind, stage, self.viewport.scale(), &self.pointer);
        let coordinates = self.to_percentage(&editor.shape().stored_coordinates());
        let Some(id) = self.session.begin_creation(kind, coordinates.clone()) else {
            return;
        };
        if kind == AnnotationKind::Point {
            self.session.finish_creation(id, coordinates);
            self.active = None;
            self.rebuild_editor();
        } else {
            self.active = Some(ActiveEditor { id, editor });
        }
    }

    pub fn mouse_move(&mut self, page: Point, movement: Point) {
        if self.viewport.is_camera_moving() {
            self.viewport.pan(movement);
            return;
        }
        let stage = self.stage_at(page);
        self.last_stage = stage;
        if let Some(active) = &mut self.active {
            let event = active.editor.shape_mut().on_move(stage, movement);
            self.apply(event);
        }
    }

    /// Global pointer release.
    pub fn mouse_up(&mut self, page: Point, button: MouseButton) {
        if button == MouseButton::Middle {
            self.viewport.end_camera_move();
            return;
        }
        self.last_stage = self.stage_at(page);
        if let Some(active) = &mut self.active {
            let event = active.editor.shape_mut().commit();
            let id = active.id;
            let creating = active.editor.shape().is_creating();
            self.apply(event);
            if !creating {
                self.session.set_mode(id, AnnotationMode::View);
            }
        }
    }

    /// Double click confirms a line or polygon under construction.
    pub fn double_click(&mut self, page: Point) {
        self.last_stage = self.stage_at(page);
        if let Some(active) = self.active.as_mut().filter(|a| a.editor.shape().is_creating()) {
            let event = active.editor.shape_mut().finish_creation();
            if event.is_none() {
                log::debug!("Double click did not finish creation");
            }
            self.apply(event);
        }
    }

    pub fn wheel(&mut self, page: Point, delta_y: f64) {
        self.viewport.zoom(delta_y, page - self.page_offset);
        let scale = self.viewport.scale();
        if let Some(active) = &mut self.active {
            active.editor.set_scale(scale);
        }
    }

    fn hit(&self, stage: Point) -> Hit {
        let tolerance = Tolerance::new(
            self.config.ui.node_radius,
            self.config.ui.stroke_width,
            self.viewport.scale(),
        );
        hit_test(&self.stage_geometry(), stage, tolerance)
    }

    // =========================================================================
    // Reducer
    // =========================================================================

    fn apply(&mut self, event: Option<EditEvent>) {
        if let Some(event) = event {
            self.reduce(event);
        }
    }

    /// Write an editor event into the session.
    pub fn reduce(&mut self, event: EditEvent) {
        let Some(id) = self.active.as_ref().map(|a| a.id) else {
            return;
        };
        if !event.is_commit() {
            return;
        }
        let coordinates = self.to_percentage(event.coordinates());
        log::trace!("Reducing {:?} for {}", event, id);
        match event {
            EditEvent::CreationFinished { .. } => {
                self.session.finish_creation(id, coordinates);
                self.rebuild_editor();
            }
            EditEvent::NodeAdded { .. } if self.is_creating() => {
                self.session.update_creation(id, coordinates);
            }
            _ => {
                self.session.commit_coordinates(id, coordinates);
                // Show the stored (clamped) geometry
                self.rebuild_editor();
            }
        }
    }

    // =========================================================================
    // Keyboard input
    // =========================================================================

    /// Handle a key press by DOM key name. Returns the recognized action.
    ///
    /// `EditLabel` and `ToggleAnnoCommentInput` open host UI, so the canvas
    /// only reports them.
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> Option<KeyAction> {
        let action = map_key_down(Key::from_dom_name(key)?, modifiers)?;
        match action {
            KeyAction::EditLabel | KeyAction::ToggleAnnoCommentInput => {}
            KeyAction::DeleteAnno => self.delete_selected(),
            KeyAction::Undo => self.time_travel(true),
            KeyAction::Redo => self.time_travel(false),
            KeyAction::TraverseAnnos => self.traverse(true),
            KeyAction::TraverseAnnosBackwards => self.traverse(false),
            KeyAction::CamMove(direction) => {
                self.camera_key = Some(direction);
                let step = match direction {
                    Direction::Up => Point::new(0.0, CAMERA_KEY_STEP),
                    Direction::Down => Point::new(0.0, -CAMERA_KEY_STEP),
                    Direction::Left => Point::new(CAMERA_KEY_STEP, 0.0),
                    Direction::Right => Point::new(-CAMERA_KEY_STEP, 0.0),
                };
                self.viewport.pan(step);
            }
            KeyAction::CamMoveStop => self.camera_key = None,
            KeyAction::CopyAnnotation => {
                self.session.copy_selected();
            }
            KeyAction::PasteAnnotation => self.paste(),
            KeyAction::ToggleImageJunk => {
                if self.config.allowed_tools.junk {
                    self.session.toggle_junk();
                }
            }
            KeyAction::RecreateAnno => self.recreate(),
            KeyAction::DeleteAnnoInCreation => self.abort_creation(),
            KeyAction::EnterAnnoAddMode => self.add_mode = true,
            KeyAction::LeaveAnnoAddMode => self.add_mode = false,
        }
        Some(action)
    }

    pub fn key_up(&mut self, key: &str) -> Option<KeyAction> {
        let action = map_key_up(Key::from_dom_name(key)?)?;
        match action {
            KeyAction::LeaveAnnoAddMode => self.add_mode = false,
            KeyAction::CamMoveStop => self.camera_key = None,
            _ => {}
        }
        Some(action)
    }

    fn delete_selected(&mut self) {
        if self.editor_busy() && !self.is_creating() {
            return;
        }
        if let Some(id) = self.session.selected_id() {
            self.active = None;
            if !self.session.delete(id) {
                self.rebuild_editor();
            }
        }
    }

    fn time_travel(&mut self, backwards: bool) {
        if self.editor_busy() {
            log::debug!("Time travel ignored during a gesture");
            return;
        }
        let travelled = if backwards {
            self.session.undo()
        } else {
            self.session.redo()
        };
        if travelled.is_some() {
            self.active = None;
            self.rebuild_editor();
        }
    }

    fn traverse(&mut self, forward: bool) {
        if self.editor_busy() {
            return;
        }
        self.active = None;
        self.session.traverse(forward);
        self.rebuild_editor();
    }

    fn paste(&mut self) {
        let allowed = self
            .session
            .clipboard()
            .is_some_and(|a| self.config.allowed_tools.allows(a.kind));
        if !allowed || self.editor_busy() {
            return;
        }
        self.active = None;
        self.session.paste();
        self.rebuild_editor();
    }

    /// Reopen the selected line or polygon to append nodes.
    fn recreate(&mut self) {
        if !self.session.settings().can_edit {
            return;
        }
        let at = self.last_stage;
        if let Some(active) = &mut self.active {
            if active.editor.resume_creation(at) {
                self.session.set_mode(active.id, AnnotationMode::Create);
            }
        }
    }

    /// Escape: drop a shape under construction, or stop reopening one.
    fn abort_creation(&mut self) {
        let Some(active) = self.active.as_mut().filter(|a| a.editor.shape().is_creating()) else {
            return;
        };
        let id = active.id;
        active.editor.shape_mut().cancel();
        self.active = None;
        if !self.session.discard_creation(id) {
            self.session.set_mode(id, AnnotationMode::View);
            self.rebuild_editor();
        }
    }

    // =========================================================================
    // Host commands
    // =========================================================================

    /// Replace labels of an annotation.
    pub fn set_labels(&mut self, id: InternalId, labels: Vec<u32>) -> bool {
        self.session.set_labels(id, labels)
    }

    pub fn set_comment(&mut self, id: InternalId, comment: Option<String>) -> bool {
        self.session.set_comment(id, comment)
    }

    pub fn set_image_labels(&mut self, labels: Vec<u32>) -> bool {
        self.session.set_image_labels(labels)
    }

    pub fn set_junk(&mut self, junk: bool) {
        if self.config.allowed_tools.junk {
            self.session.set_junk(junk);
        }
    }
}

//! Annotation session controller.
//!
//! Owns the annotation list (percentage space), the selection, id
//! allocation, undo history and the image-level state. Every mutation is
//! reported as a [`HostEvent`] queued for the host. Operations that are not
//! allowed or reference unknown ids return early without events.

mod history;
mod id_alloc;
pub mod timing;

pub use history::History;
pub use id_alloc::IdAllocator;

use std::collections::BTreeSet;

use crate::config::{AnnotationSettings, HistoryConfig};
use crate::geometry::Point;
use crate::message::{HostEvent, Notification, TimeTravelDiff};
use crate::model::{
    Annotation, AnnotationKind, AnnotationMode, AnnotationStatus, ExternalAnnotation, InternalId, Label,
};

#[derive(Debug)]
pub struct Session {
    annotations: Vec<Annotation>,
    selected: Option<InternalId>,
    ids: IdAllocator,
    history: History<Vec<Annotation>>,
    possible_labels: Vec<Label>,
    image_labels: BTreeSet<u32>,
    junk: bool,
    settings: AnnotationSettings,
    clipboard: Option<Annotation>,
    events: Vec<HostEvent>,
    /// Milliseconds source for annotation timing
    clock: fn() -> f64,
}

impl Session {
    pub fn new(settings: AnnotationSettings, possible_labels: Vec<Label>, history: &HistoryConfig) -> Self {
        Self {
            annotations: Vec::new(),
            selected: None,
            ids: IdAllocator::new(),
            history: History::new(history.max_entries),
            possible_labels,
            image_labels: BTreeSet::new(),
            junk: false,
            settings,
            clipboard: None,
            events: Vec::new(),
            clock: timing::now_ms,
        }
    }

    /// Replace the wall clock used for annotation timing.
    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.clock = clock;
        self
    }

    /// Add host-supplied annotations. Malformed ones are skipped with a
    /// warning notification. Returns how many were loaded.
    pub fn load(&mut self, initial: Vec<ExternalAnnotation>) -> usize {
        let mut loaded = 0;
        for external in initial {
            if let Err(e) = external.validate() {
                log::warn!("Skipping annotation {:?}: {}", external.id, e);
                self.emit(HostEvent::Notification(Notification::warning(
                    "Invalid annotation",
                    e.to_string(),
                )));
                continue;
            }
            let id = self.ids.allocate();
            match Annotation::from_external(id, external) {
                Ok(annotation) => {
                    self.annotations.push(annotation);
                    loaded += 1;
                }
                Err(e) => log::warn!("Skipping annotation {}: {}", id, e),
            }
        }
        log::info!("Loaded {} annotations", loaded);
        loaded
    }

    /// Set the image labels supplied by the host, without reporting them back.
    pub fn load_image_labels(&mut self, labels: impl IntoIterator<Item = u32>) {
        self.image_labels = labels.into_iter().collect();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: InternalId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.internal_id == id)
    }

    pub fn selected_id(&self) -> Option<InternalId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.selected.and_then(|id| self.annotation(id))
    }

    pub fn settings(&self) -> &AnnotationSettings {
        &self.settings
    }

    pub fn possible_labels(&self) -> &[Label] {
        &self.possible_labels
    }

    pub fn image_labels(&self) -> &BTreeSet<u32> {
        &self.image_labels
    }

    pub fn is_junk(&self) -> bool {
        self.junk
    }

    pub fn history(&self) -> &History<Vec<Annotation>> {
        &self.history
    }

    pub fn clipboard(&self) -> Option<&Annotation> {
        self.clipboard.as_ref()
    }

    /// Take the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select an annotation, or clear the selection with `None`.
    ///
    /// Timing of the previously selected annotation stops; the new one starts.
    pub fn select(&mut self, id: Option<InternalId>) -> bool {
        if id == self.selected {
            return false;
        }
        if let Some(id) = id {
            if self.index_of(id).is_none() {
                log::debug!("Select ignored: unknown annotation {}", id);
                return false;
            }
        }
        let now = (self.clock)();
        if let Some(previous) = self.selected.and_then(|p| self.index_of(p)) {
            let annotation = &mut self.annotations[previous];
            timing::stop(annotation, now);
            annotation.mode = AnnotationMode::View;
        }
        if let Some(index) = id.and_then(|i| self.index_of(i)) {
            timing::start(&mut self.annotations[index], now);
        }
        self.selected = id;
        log::debug!("Selection: {:?}", id);
        self.emit(HostEvent::SelectAnnotation(self.selected().cloned()));
        true
    }

    /// Select the next (or previous) annotation in list order, wrapping around.
    pub fn traverse(&mut self, forward: bool) -> Option<InternalId> {
        let len = self.annotations.len();
        if len == 0 {
            return None;
        }
        let current = self.selected.and_then(|id| self.index_of(id));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        let id = self.annotations[next].internal_id;
        self.select(Some(id));
        Some(id)
    }

    /// Update the transient mode of an annotation.
    pub fn set_mode(&mut self, id: InternalId, mode: AnnotationMode) {
        if let Some(index) = self.index_of(id) {
            self.annotations[index].mode = mode;
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Add a new annotation in the creating state and select it.
    pub fn begin_creation(&mut self, kind: AnnotationKind, coordinates: Vec<Point>) -> Option<InternalId> {
        if !self.settings.can_create {
            log::debug!("Creation refused: creating is not allowed");
            return None;
        }
        let id = self.ids.allocate();
        let mut annotation = Annotation::new(id, kind, coordinates, AnnotationStatus::Creating);
        annotation.mode = AnnotationMode::Create;
        self.annotations.push(annotation.clone());
        log::info!("✏️ Creating {} {}", kind.name(), id);
        self.emit(HostEvent::AnnoCreated {
            annotation,
            annotations: self.annotations.clone(),
        });
        self.select(Some(id));
        Some(id)
    }

    /// Track the coordinates of an annotation under construction.
    pub fn update_creation(&mut self, id: InternalId, coordinates: Vec<Point>) -> bool {
        match self.index_of(id) {
            Some(index) if self.annotations[index].status == AnnotationStatus::Creating => {
                self.annotations[index].coordinates = coordinates;
                true
            }
            _ => false,
        }
    }

    /// Store the final coordinates of a shape under construction.
    ///
    /// A reopened shape (recreate) reports a change instead of a creation.
    pub fn finish_creation(&mut self, id: InternalId, coordinates: Vec<Point>) -> bool {
        let Some(index) = self.index_of(id) else {
            log::debug!("Finish ignored: unknown annotation {}", id);
            return false;
        };
        let now = (self.clock)();
        let annotation = &mut self.annotations[index];
        let created = annotation.status == AnnotationStatus::Creating;
        if created {
            annotation.status = AnnotationStatus::Created;
        } else {
            annotation.mark_changed();
        }
        annotation.coordinates = coordinates;
        annotation.mode = AnnotationMode::View;
        timing::accumulate(annotation, now);
        let annotation = annotation.clone();
        log::info!("✏️ {} {} finished", annotation.kind.name(), id);
        self.push_snapshot();
        let annotations = self.annotations.clone();
        self.emit(if created {
            HostEvent::AnnoCreationFinished { annotation, annotations }
        } else {
            HostEvent::AnnoChanged { annotation, annotations }
        });
        true
    }

    /// Drop an annotation that never finished construction. No history entry.
    pub fn discard_creation(&mut self, id: InternalId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if self.annotations[index].status != AnnotationStatus::Creating {
            return false;
        }
        self.remove_at(index);
        true
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Store the committed coordinates of an edited annotation.
    pub fn commit_coordinates(&mut self, id: InternalId, coordinates: Vec<Point>) -> bool {
        if !self.settings.can_edit {
            log::debug!("Edit refused: editing is not allowed");
            return false;
        }
        let Some(index) = self.index_of(id) else {
            log::debug!("Edit ignored: unknown annotation {}", id);
            return false;
        };
        if self.annotations[index].coordinates == coordinates {
            return false;
        }
        let now = (self.clock)();
        let annotation = &mut self.annotations[index];
        annotation.coordinates = coordinates;
        annotation.mode = AnnotationMode::View;
        annotation.mark_changed();
        timing::accumulate(annotation, now);
        let annotation = annotation.clone();
        self.push_snapshot();
        self.emit(HostEvent::AnnoChanged {
            annotation,
            annotations: self.annotations.clone(),
        });
        true
    }

    /// Remove an annotation. Shapes under construction are discarded instead.
    pub fn delete(&mut self, id: InternalId) -> bool {
        let Some(index) = self.index_of(id) else {
            log::debug!("Delete ignored: unknown annotation {}", id);
            return false;
        };
        if self.annotations[index].status == AnnotationStatus::Creating {
            return self.discard_creation(id);
        }
        if !self.settings.can_edit {
            log::debug!("Delete refused: editing is not allowed");
            return false;
        }
        self.remove_at(index);
        self.push_snapshot();
        true
    }

    /// Replace the labels of an annotation.
    ///
    /// Unknown label ids are dropped. Without multiple labels only the first
    /// requested label is kept.
    pub fn set_labels(&mut self, id: InternalId, labels: impl IntoIterator<Item = u32>) -> bool {
        if !self.settings.can_label {
            log::debug!("Labeling refused: labeling is not allowed");
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let labels = self.accepted_labels(labels);
        if self.annotations[index].label_ids == labels {
            return false;
        }
        let now = (self.clock)();
        let annotation = &mut self.annotations[index];
        annotation.label_ids = labels;
        annotation.mark_changed();
        timing::accumulate(annotation, now);
        let annotation = annotation.clone();
        log::info!("🏷️ Annotation {} labels: {:?}", id, annotation.label_ids);
        self.push_snapshot();
        self.emit(HostEvent::AnnoChanged {
            annotation,
            annotations: self.annotations.clone(),
        });
        true
    }

    /// Set or clear the comment of an annotation. Empty comments clear it.
    pub fn set_comment(&mut self, id: InternalId, comment: Option<String>) -> bool {
        if !self.settings.can_edit {
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let comment = comment.filter(|c| !c.trim().is_empty());
        if self.annotations[index].comment == comment {
            return false;
        }
        let annotation = &mut self.annotations[index];
        annotation.comment = comment;
        annotation.mark_changed();
        let annotation = annotation.clone();
        self.push_snapshot();
        self.emit(HostEvent::AnnoChanged {
            annotation,
            annotations: self.annotations.clone(),
        });
        true
    }

    // =========================================================================
    // Image state
    // =========================================================================

    pub fn set_image_labels(&mut self, labels: impl IntoIterator<Item = u32>) -> bool {
        if !self.settings.can_label {
            return false;
        }
        let labels = self.accepted_labels(labels);
        if labels == self.image_labels {
            return false;
        }
        self.image_labels = labels;
        self.emit(HostEvent::ImageLabelsChanged(self.image_labels.iter().copied().collect()));
        true
    }

    pub fn set_junk(&mut self, junk: bool) {
        if self.junk != junk {
            self.junk = junk;
            log::info!("Image junk: {}", junk);
            self.emit(HostEvent::IsImageJunk(junk));
        }
    }

    /// Flip the junk flag and return the new value.
    pub fn toggle_junk(&mut self) -> bool {
        self.set_junk(!self.junk);
        self.junk
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    pub fn copy_selected(&mut self) -> bool {
        match self.selected().cloned() {
            Some(annotation) => {
                log::debug!("📋 Copied annotation {}", annotation.internal_id);
                self.clipboard = Some(annotation);
                true
            }
            None => false,
        }
    }

    /// Insert a copy of the clipboard as a new, selected annotation.
    pub fn paste(&mut self) -> Option<InternalId> {
        if !self.settings.can_create {
            return None;
        }
        let source = self.clipboard.as_ref()?;
        let id = self.ids.allocate();
        let annotation = Annotation::new(id, source.kind, source.coordinates.clone(), AnnotationStatus::Created)
            .with_labels(source.label_ids.iter().copied());
        log::debug!("📋 Pasted annotation {} from {}", id, source.internal_id);
        self.annotations.push(annotation.clone());
        self.push_snapshot();
        self.emit(HostEvent::AnnoCreated {
            annotation: annotation.clone(),
            annotations: self.annotations.clone(),
        });
        self.emit(HostEvent::AnnoCreationFinished {
            annotation,
            annotations: self.annotations.clone(),
        });
        self.select(Some(id));
        Some(id)
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn undo(&mut self) -> Option<TimeTravelDiff> {
        let snapshot = self.history.undo()?.clone();
        Some(self.travel_to(snapshot))
    }

    pub fn redo(&mut self) -> Option<TimeTravelDiff> {
        let snapshot = self.history.redo()?.clone();
        Some(self.travel_to(snapshot))
    }

    fn travel_to(&mut self, snapshot: Vec<Annotation>) -> TimeTravelDiff {
        let diff = diff_lists(&self.annotations, &snapshot);
        log::info!(
            "⏪ Time travel: {} added, {} removed, {} changed",
            diff.added_annotations.len(),
            diff.removed_annotations.len(),
            diff.changed_annotations.len()
        );
        // Editing time is not part of history: survivors keep their live timing
        let mut restored = snapshot;
        for annotation in &mut restored {
            if let Some(live) = self.annotations.iter().find(|a| a.internal_id == annotation.internal_id) {
                annotation.anno_time = live.anno_time;
                annotation.timestamp = live.timestamp;
            }
        }
        self.annotations = restored;
        for annotation in &self.annotations {
            self.ids.mark_used(annotation.internal_id);
        }
        match self.selected.and_then(|id| self.index_of(id)) {
            Some(index) => {
                let now = (self.clock)();
                let annotation = &mut self.annotations[index];
                if annotation.timestamp.is_none() {
                    timing::start(annotation, now);
                }
            }
            None if self.selected.is_some() => {
                self.selected = None;
                self.emit(HostEvent::SelectAnnotation(None));
            }
            None => {}
        }
        self.emit(HostEvent::TimeTravel(diff.clone()));
        diff
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn index_of(&self, id: InternalId) -> Option<usize> {
        self.annotations.iter().position(|a| a.internal_id == id)
    }

    fn accepted_labels(&self, labels: impl IntoIterator<Item = u32>) -> BTreeSet<u32> {
        let mut accepted = Vec::new();
        for id in labels {
            if !self.possible_labels.iter().any(|l| l.id == id) {
                log::warn!("Dropping unknown label id {}", id);
                continue;
            }
            if !accepted.contains(&id) {
                accepted.push(id);
            }
        }
        if !self.settings.can_have_multiple_labels {
            accepted.truncate(1);
        }
        accepted.into_iter().collect()
    }

    /// Remove the annotation at `index` and report it.
    fn remove_at(&mut self, index: usize) {
        let mut annotation = self.annotations.remove(index);
        annotation.status = AnnotationStatus::Deleted;
        annotation.timestamp = None;
        let id = annotation.internal_id;
        self.ids.release(id);
        if self.selected == Some(id) {
            self.selected = None;
            self.emit(HostEvent::SelectAnnotation(None));
        }
        log::info!("🗑️ Deleted {} {}", annotation.kind.name(), id);
        self.emit(HostEvent::AnnoDeleted {
            annotation,
            annotations: self.annotations.clone(),
        });
    }

    fn push_snapshot(&mut self) {
        let snapshot = self.annotations.iter().map(persisted).collect();
        self.history.push(snapshot);
    }

    fn emit(&mut self, event: HostEvent) {
        log::debug!("📤 {}", event.name());
        self.events.push(event);
    }
}

/// Copy of an annotation without transient selection state.
fn persisted(annotation: &Annotation) -> Annotation {
    Annotation {
        mode: AnnotationMode::View,
        timestamp: None,
        ..annotation.clone()
    }
}

/// Content of an annotation without its timing, for change detection.
fn content(annotation: &Annotation) -> Annotation {
    Annotation {
        anno_time: 0.0,
        ..persisted(annotation)
    }
}

/// Differences from `before` to `after`, matched by internal id.
fn diff_lists(before: &[Annotation], after: &[Annotation]) -> TimeTravelDiff {
    let mut diff = TimeTravelDiff::default();
    for new in after {
        match before.iter().find(|old| old.internal_id == new.internal_id) {
            None => diff.added_annotations.push(new.clone()),
            Some(old) if content(old) != content(new) => diff.changed_annotations.push(new.clone()),
            Some(_) => {}
        }
    }
    for old in before {
        if !after.iter().any(|new| new.internal_id == old.internal_id) {
            diff.removed_annotations.push(old.clone());
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frozen_clock() -> f64 {
        1_000.0
    }

    fn session() -> Session {
        Session::new(
            AnnotationSettings::default(),
            vec![Label::new(1, "car"), Label::new(2, "person"), Label::new(3, "tree")],
            &HistoryConfig::default(),
        )
        .with_clock(frozen_clock)
    }

    fn point(x: f64, y: f64) -> Vec<Point> {
        vec![Point::new(x, y)]
    }

    /// Create and finish a point annotation.
    fn add_point(session: &mut Session, x: f64, y: f64) -> InternalId {
        let id = session.begin_creation(AnnotationKind::Point, point(x, y)).unwrap();
        session.finish_creation(id, point(x, y));
        id
    }

    #[test]
    fn creation_lifecycle_reports_events() {
        let mut s = session();
        let id = s.begin_creation(AnnotationKind::Polygon, vec![Point::new(0.1, 0.1)]).unwrap();
        assert_eq!(s.annotation(id).unwrap().status, AnnotationStatus::Creating);
        assert!(s.history().is_empty());

        let coords = vec![Point::new(0.1, 0.1), Point::new(0.5, 0.1), Point::new(0.3, 0.4)];
        assert!(s.finish_creation(id, coords.clone()));
        let anno = s.annotation(id).unwrap();
        assert_eq!(anno.status, AnnotationStatus::Created);
        assert_eq!(anno.coordinates, coords);
        assert_eq!(s.history().len(), 1);

        let names: Vec<_> = s.drain_events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["annoCreated", "selectAnnotation", "annoCreationFinished"]);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn creation_refused_without_permission() {
        let mut s = Session::new(AnnotationSettings::read_only(), vec![], &HistoryConfig::default());
        assert_eq!(s.begin_creation(AnnotationKind::Point, point(0.5, 0.5)), None);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn edit_marks_changed_and_snapshots() {
        let mut s = session();
        let id = add_point(&mut s, 0.2, 0.2);
        assert!(s.commit_coordinates(id, point(0.3, 0.3)));
        assert_eq!(s.annotation(id).unwrap().status, AnnotationStatus::Changed);
        assert_eq!(s.history().len(), 2);
        // unchanged coordinates are not a commit
        assert!(!s.commit_coordinates(id, point(0.3, 0.3)));
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn unknown_ids_short_circuit() {
        let mut s = session();
        assert!(!s.commit_coordinates(42, point(0.1, 0.1)));
        assert!(!s.delete(42));
        assert!(!s.select(Some(42)));
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn delete_clears_selection_and_reports() {
        let mut s = session();
        let id = add_point(&mut s, 0.2, 0.2);
        s.drain_events();
        assert!(s.delete(id));
        assert_eq!(s.selected_id(), None);
        assert!(s.annotations().is_empty());
        let events = s.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            HostEvent::AnnoDeleted { annotation, annotations }
                if annotation.status == AnnotationStatus::Deleted && annotations.is_empty()
        )));
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let mut s = session();
        for i in 0..3 {
            add_point(&mut s, 0.1 * i as f64, 0.5);
        }
        s.delete(2);
        assert_eq!(add_point(&mut s, 0.9, 0.9), 3);
    }

    #[test]
    fn discarded_creation_leaves_no_history() {
        let mut s = session();
        let id = s.begin_creation(AnnotationKind::Line, point(0.1, 0.1)).unwrap();
        assert!(s.delete(id));
        assert!(s.annotations().is_empty());
        assert!(s.history().is_empty());
    }

    #[test]
    fn undo_and_redo_report_diffs() {
        let mut s = session();
        let id = add_point(&mut s, 0.2, 0.2);
        s.commit_coordinates(id, point(0.4, 0.4));

        let diff = s.undo().unwrap();
        assert_eq!(diff.changed_annotations.len(), 1);
        assert_eq!(s.annotation(id).unwrap().coordinates, point(0.2, 0.2));

        let diff = s.redo().unwrap();
        assert_eq!(diff.changed_annotations[0].coordinates, point(0.4, 0.4));
        assert_eq!(s.history().cursor(), None);
        assert!(s.redo().is_none());
    }

    #[test]
    fn undoing_a_creation_removes_it() {
        let mut s = session();
        add_point(&mut s, 0.2, 0.2);
        let second = add_point(&mut s, 0.6, 0.6);
        let diff = s.undo().unwrap();
        assert_eq!(diff.removed_annotations.len(), 1);
        assert_eq!(diff.removed_annotations[0].internal_id, second);
        assert_eq!(s.selected_id(), None);
        let events = s.drain_events();
        assert!(matches!(events.last(), Some(HostEvent::TimeTravel(_))));
    }

    #[test]
    fn edit_after_undo_prunes_redo_branch() {
        let mut s = session();
        let id = add_point(&mut s, 0.1, 0.1); // A
        s.commit_coordinates(id, point(0.2, 0.2)); // B
        s.commit_coordinates(id, point(0.3, 0.3)); // C
        s.undo();
        s.undo();
        s.commit_coordinates(id, point(0.9, 0.9)); // D
        assert_eq!(s.history().len(), 2);
        assert!(!s.history().can_redo());
        s.undo();
        assert_eq!(s.annotation(id).unwrap().coordinates, point(0.1, 0.1));
    }

    #[test]
    fn selection_does_not_count_as_change() {
        let mut s = session();
        let a = add_point(&mut s, 0.1, 0.1);
        let b = add_point(&mut s, 0.2, 0.2);
        s.select(Some(a));
        s.select(Some(b));
        let diff = s.undo().unwrap();
        assert!(diff.changed_annotations.is_empty());
        assert_eq!(diff.removed_annotations.len(), 1);
    }

    fn ticking_clock() -> f64 {
        thread_local! {
            static NOW: std::cell::Cell<f64> = const { std::cell::Cell::new(0.0) };
        }
        NOW.with(|now| {
            now.set(now.get() + 1_000.0);
            now.get()
        })
    }

    #[test]
    fn undo_keeps_editing_time_of_untouched_annotations() {
        let mut s = session().with_clock(ticking_clock);
        let a = add_point(&mut s, 0.1, 0.1);
        add_point(&mut s, 0.2, 0.2);
        for _ in 0..5 {
            s.select(Some(a));
            s.select(None);
        }
        let spent = s.annotation(a).unwrap().anno_time;
        assert!(spent >= 5.0);

        let diff = s.undo().unwrap();
        assert_eq!(diff.removed_annotations.len(), 1);
        assert!(diff.changed_annotations.is_empty());
        assert_eq!(s.annotation(a).unwrap().anno_time, spent);
    }

    #[test]
    fn undo_keeps_running_measurement_of_selection() {
        let mut s = session().with_clock(ticking_clock);
        let a = add_point(&mut s, 0.1, 0.1);
        add_point(&mut s, 0.2, 0.2);
        s.select(Some(a));
        let started = s.annotation(a).unwrap().timestamp;
        assert!(started.is_some());
        s.undo();
        assert_eq!(s.annotation(a).unwrap().timestamp, started);
    }

    #[test]
    fn labels_respect_single_label_rule() {
        let mut s = session();
        let id = add_point(&mut s, 0.5, 0.5);
        assert!(s.set_labels(id, [2, 1]));
        assert_eq!(s.annotation(id).unwrap().label_ids, BTreeSet::from([2]));
    }

    #[test]
    fn unknown_labels_are_dropped() {
        let mut s = Session::new(
            AnnotationSettings {
                can_have_multiple_labels: true,
                ..AnnotationSettings::default()
            },
            vec![Label::new(1, "car"), Label::new(2, "person")],
            &HistoryConfig::default(),
        );
        let id = s.begin_creation(AnnotationKind::Point, point(0.5, 0.5)).unwrap();
        s.finish_creation(id, point(0.5, 0.5));
        s.set_labels(id, [1, 99, 2, 1]);
        assert_eq!(s.annotation(id).unwrap().label_ids, BTreeSet::from([1, 2]));
    }

    #[test]
    fn labeling_refused_without_permission() {
        let mut s = Session::new(
            AnnotationSettings {
                can_label: false,
                ..AnnotationSettings::default()
            },
            vec![Label::new(1, "car")],
            &HistoryConfig::default(),
        );
        let id = s.begin_creation(AnnotationKind::Point, point(0.5, 0.5)).unwrap();
        assert!(!s.set_labels(id, [1]));
        assert!(!s.set_image_labels([1]));
    }

    #[test]
    fn comments_are_trimmed_to_none() {
        let mut s = session();
        let id = add_point(&mut s, 0.5, 0.5);
        assert!(s.set_comment(id, Some("occluded".into())));
        assert!(s.set_comment(id, Some("   ".into())));
        assert_eq!(s.annotation(id).unwrap().comment, None);
    }

    #[test]
    fn traverse_wraps_around() {
        let mut s = session();
        let a = add_point(&mut s, 0.1, 0.1);
        let b = add_point(&mut s, 0.2, 0.2);
        s.select(None);
        assert_eq!(s.traverse(true), Some(a));
        assert_eq!(s.traverse(true), Some(b));
        assert_eq!(s.traverse(true), Some(a));
        assert_eq!(s.traverse(false), Some(b));
    }

    #[test]
    fn paste_creates_fresh_annotation() {
        let mut s = session();
        let id = add_point(&mut s, 0.5, 0.5);
        s.set_labels(id, [3]);
        assert!(s.copy_selected());
        let pasted = s.paste().unwrap();
        assert_ne!(pasted, id);
        let anno = s.annotation(pasted).unwrap();
        assert_eq!(anno.status, AnnotationStatus::Created);
        assert_eq!(anno.external_id, None);
        assert_eq!(anno.label_ids, BTreeSet::from([3]));
        assert_eq!(s.selected_id(), Some(pasted));
    }

    #[test]
    fn junk_toggle_reports_once_per_change() {
        let mut s = session();
        assert!(s.toggle_junk());
        s.set_junk(true);
        let events = s.drain_events();
        assert_eq!(events, vec![HostEvent::IsImageJunk(true)]);
    }

    #[test]
    fn malformed_annotations_are_skipped_on_load() {
        let mut s = session();
        let good = ExternalAnnotation::new(AnnotationKind::Point, point(0.5, 0.5));
        let bad = ExternalAnnotation::new(AnnotationKind::BBox, point(0.5, 0.5));
        assert_eq!(s.load(vec![bad, good]), 1);
        assert_eq!(s.annotations()[0].internal_id, 0);
        assert!(matches!(s.drain_events().as_slice(), [HostEvent::Notification(_)]));
    }

    #[test]
    fn selection_time_is_accumulated() {
        fn late_clock() -> f64 {
            4_000.0
        }
        let mut s = session();
        let id = add_point(&mut s, 0.5, 0.5);
        s.clock = late_clock;
        s.select(None);
        assert!((s.annotation(id).unwrap().anno_time - 3.0).abs() < 1e-9);
    }

    #[test]
    fn reopened_shape_reports_change() {
        let mut s = session();
        let id = s.begin_creation(AnnotationKind::Line, point(0.1, 0.1)).unwrap();
        s.finish_creation(id, vec![Point::new(0.1, 0.1), Point::new(0.2, 0.2)]);
        s.drain_events();
        s.finish_creation(id, vec![Point::new(0.1, 0.1), Point::new(0.2, 0.2), Point::new(0.3, 0.1)]);
        assert_eq!(s.annotation(id).unwrap().status, AnnotationStatus::Changed);
        assert!(matches!(s.drain_events().as_slice(), [HostEvent::AnnoChanged { .. }]));
    }
}

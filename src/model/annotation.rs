//! Annotation types and data structures.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{BBOX_STORED_CORNERS, MIN_LINE_NODES, MIN_POLYGON_NODES};
use crate::error::SiaError;
use crate::geometry::Point;
use crate::transform::clamp_percentage;

/// Session-local identifier of an annotation.
pub type InternalId = u32;

/// Shape type of an annotation. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationKind {
    Point,
    Line,
    BBox,
    Polygon,
}

impl AnnotationKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Point => "Point",
            AnnotationKind::Line => "Line",
            AnnotationKind::BBox => "Bounding Box",
            AnnotationKind::Polygon => "Polygon",
        }
    }

    pub fn all() -> &'static [AnnotationKind] {
        &[
            AnnotationKind::Point,
            AnnotationKind::Line,
            AnnotationKind::BBox,
            AnnotationKind::Polygon,
        ]
    }

    /// Fewest nodes a finished annotation of this kind may have.
    pub fn min_nodes(&self) -> usize {
        match self {
            AnnotationKind::Point => 1,
            AnnotationKind::Line => MIN_LINE_NODES,
            AnnotationKind::BBox => BBOX_STORED_CORNERS,
            AnnotationKind::Polygon => MIN_POLYGON_NODES,
        }
    }

    /// Whether nodes can be inserted into and removed from this kind.
    pub fn has_editable_nodes(&self) -> bool {
        matches!(self, AnnotationKind::Line | AnnotationKind::Polygon)
    }

    /// Whether the last node connects back to the first.
    pub fn is_closed(&self) -> bool {
        matches!(self, AnnotationKind::Polygon | AnnotationKind::BBox)
    }
}

/// Transient UI mode of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationMode {
    Create,
    #[default]
    View,
    Move,
}

/// Lifecycle marker reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationStatus {
    /// Multi-step shape still under construction
    Creating,
    /// Construction finished this session
    Created,
    /// Supplied by the host at mount
    #[default]
    Loaded,
    /// Edited after creation or load
    Changed,
    /// Removed from the list
    Deleted,
}

/// A single annotation. Coordinates are in percentage space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub internal_id: InternalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub coordinates: Vec<Point>,
    pub label_ids: BTreeSet<u32>,
    pub mode: AnnotationMode,
    pub status: AnnotationStatus,
    /// Accumulated editing time in seconds
    pub anno_time: f64,
    /// Start of the running time measurement in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Annotation {
    /// Create a new annotation with the given shape.
    pub fn new(
        internal_id: InternalId,
        kind: AnnotationKind,
        coordinates: Vec<Point>,
        status: AnnotationStatus,
    ) -> Self {
        Self {
            internal_id,
            external_id: None,
            kind,
            coordinates,
            label_ids: BTreeSet::new(),
            mode: AnnotationMode::View,
            status,
            anno_time: 0.0,
            timestamp: None,
            comment: None,
        }
    }

    /// Add labels to the annotation.
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = u32>) -> Self {
        self.label_ids.extend(labels);
        self
    }

    /// Build an annotation from host data, validating the node count.
    ///
    /// Coordinates outside the unit square are clamped, not rejected.
    pub fn from_external(internal_id: InternalId, external: ExternalAnnotation) -> Result<Self, SiaError> {
        external.validate()?;
        Ok(Self {
            internal_id,
            external_id: external.id,
            kind: external.kind,
            coordinates: external.coordinates.into_iter().map(clamp_percentage).collect(),
            label_ids: external.label_ids.into_iter().collect(),
            mode: AnnotationMode::View,
            status: external.status,
            anno_time: external.anno_time,
            timestamp: None,
            comment: external.comment,
        })
    }

    /// Host-facing representation without session-only fields.
    pub fn to_external(&self) -> ExternalAnnotation {
        ExternalAnnotation {
            id: self.external_id.clone(),
            kind: self.kind,
            coordinates: self.coordinates.clone(),
            label_ids: self.label_ids.iter().copied().collect(),
            status: self.status,
            anno_time: self.anno_time,
            comment: self.comment.clone(),
        }
    }

    /// Mark as changed unless the annotation is still being created.
    pub fn mark_changed(&mut self) {
        if self.status != AnnotationStatus::Creating {
            self.status = AnnotationStatus::Changed;
        }
    }
}

/// Annotation as supplied by and reported to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAnnotation {
    /// Backend identity, if any
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub coordinates: Vec<Point>,
    #[serde(default)]
    pub label_ids: Vec<u32>,
    #[serde(default)]
    pub status: AnnotationStatus,
    #[serde(default)]
    pub anno_time: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ExternalAnnotation {
    pub fn new(kind: AnnotationKind, coordinates: Vec<Point>) -> Self {
        Self {
            id: None,
            kind,
            coordinates,
            label_ids: Vec::new(),
            status: AnnotationStatus::Loaded,
            anno_time: 0.0,
            comment: None,
        }
    }

    /// Check the shape invariants for this kind.
    pub fn validate(&self) -> Result<(), SiaError> {
        let count = self.coordinates.len();
        match self.kind {
            AnnotationKind::Point if count != 1 => {
                return Err(SiaError::malformed(
                    self.kind,
                    format!("expected 1 point, found {count}"),
                ));
            }
            AnnotationKind::BBox if count != BBOX_STORED_CORNERS => {
                return Err(SiaError::malformed(
                    self.kind,
                    format!("expected {BBOX_STORED_CORNERS} corners, found {count}"),
                ));
            }
            AnnotationKind::Line | AnnotationKind::Polygon if count == 0 => {
                return Err(SiaError::malformed(self.kind, "no coordinates"));
            }
            _ => {}
        }
        if let Some(bad) = self.coordinates.iter().find(|p| !p.is_finite()) {
            return Err(SiaError::malformed(
                self.kind,
                format!("non-finite coordinate ({}, {})", bad.x, bad.y),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_with_three_points_is_rejected() {
        let ext = ExternalAnnotation::new(
            AnnotationKind::BBox,
            vec![Point::new(0.1, 0.1), Point::new(0.2, 0.2), Point::new(0.3, 0.3)],
        );
        let err = Annotation::from_external(0, ext).unwrap_err();
        assert!(matches!(err, SiaError::MalformedAnnotation { kind: AnnotationKind::BBox, .. }));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let ext = ExternalAnnotation::new(AnnotationKind::Point, vec![Point::new(f64::NAN, 0.5)]);
        assert!(ext.validate().is_err());
    }

    #[test]
    fn external_coordinates_are_clamped() {
        let ext = ExternalAnnotation::new(
            AnnotationKind::Line,
            vec![Point::new(-0.5, 0.5), Point::new(0.5, 1.5)],
        );
        let anno = Annotation::from_external(7, ext).unwrap();
        assert_eq!(anno.internal_id, 7);
        assert_eq!(anno.status, AnnotationStatus::Loaded);
        assert_eq!(anno.coordinates, vec![Point::new(0.0, 0.5), Point::new(0.5, 1.0)]);
    }

    #[test]
    fn external_json_round_trip_keeps_labels_unique() {
        let json = r#"{
            "id": "db-17",
            "type": "bBox",
            "coordinates": [{"x": 0.1, "y": 0.2}, {"x": 0.4, "y": 0.6}],
            "labelIds": [3, 1, 3]
        }"#;
        let ext: ExternalAnnotation = serde_json::from_str(json).unwrap();
        let anno = Annotation::from_external(0, ext).unwrap();
        assert_eq!(anno.external_id.as_deref(), Some("db-17"));
        assert_eq!(anno.label_ids.len(), 2);
        let back = anno.to_external();
        assert_eq!(back.label_ids, vec![1, 3]);
        assert_eq!(back.kind, AnnotationKind::BBox);
    }

    #[test]
    fn mark_changed_keeps_creating() {
        let mut anno = Annotation::new(0, AnnotationKind::Polygon, vec![], AnnotationStatus::Creating);
        anno.mark_changed();
        assert_eq!(anno.status, AnnotationStatus::Creating);
        anno.status = AnnotationStatus::Created;
        anno.mark_changed();
        assert_eq!(anno.status, AnnotationStatus::Changed);
    }

    #[test]
    fn kind_node_rules() {
        assert_eq!(AnnotationKind::Polygon.min_nodes(), 3);
        assert!(AnnotationKind::Line.has_editable_nodes());
        assert!(!AnnotationKind::BBox.has_editable_nodes());
        assert!(!AnnotationKind::Line.is_closed());
    }
}

//! Events reported to the hosting application.
//!
//! The canvas queues these while it processes input; the host drains them
//! after each call. Every annotation carried here is in percentage space.

use serde::Serialize;

use crate::model::Annotation;

/// Severity of a host notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A message the host may show to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl Notification {
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: NotificationKind::Warning,
        }
    }
}

/// What an undo or redo changed, relative to the list before travelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTravelDiff {
    pub added_annotations: Vec<Annotation>,
    pub removed_annotations: Vec<Annotation>,
    pub changed_annotations: Vec<Annotation>,
}

impl TimeTravelDiff {
    pub fn is_empty(&self) -> bool {
        self.added_annotations.is_empty()
            && self.removed_annotations.is_empty()
            && self.changed_annotations.is_empty()
    }
}

/// Events sent to the host application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum HostEvent {
    /// A new annotation exists (possibly still under construction)
    AnnoCreated {
        annotation: Annotation,
        annotations: Vec<Annotation>,
    },
    /// Construction of an annotation finished
    AnnoCreationFinished {
        annotation: Annotation,
        annotations: Vec<Annotation>,
    },
    /// An existing annotation was edited
    AnnoChanged {
        annotation: Annotation,
        annotations: Vec<Annotation>,
    },
    /// An annotation was removed
    AnnoDeleted {
        annotation: Annotation,
        annotations: Vec<Annotation>,
    },
    /// Labels of the whole image changed
    ImageLabelsChanged(Vec<u32>),
    /// Junk flag of the image changed
    IsImageJunk(bool),
    /// Selection changed
    SelectAnnotation(Option<Annotation>),
    /// Undo or redo moved through history
    TimeTravel(TimeTravelDiff),
    Notification(Notification),
}

impl HostEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::AnnoCreated { .. } => "annoCreated",
            HostEvent::AnnoCreationFinished { .. } => "annoCreationFinished",
            HostEvent::AnnoChanged { .. } => "annoChanged",
            HostEvent::AnnoDeleted { .. } => "annoDeleted",
            HostEvent::ImageLabelsChanged(_) => "imageLabelsChanged",
            HostEvent::IsImageJunk(_) => "isImageJunk",
            HostEvent::SelectAnnotation(_) => "selectAnnotation",
            HostEvent::TimeTravel(_) => "timeTravel",
            HostEvent::Notification(_) => "notification",
        }
    }
}

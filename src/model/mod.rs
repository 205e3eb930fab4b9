//! Data models for the SIA annotation core.

mod annotation;
mod label;

pub use annotation::{
    Annotation, AnnotationKind, AnnotationMode, AnnotationStatus, ExternalAnnotation, InternalId,
};
pub use label::Label;

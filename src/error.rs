//! Error types for the annotation core.
//!
//! Interactive paths never return errors: invalid gestures are early returns.
//! These errors cover the host boundary, where data arrives from outside.

use thiserror::Error;

use crate::model::AnnotationKind;

/// Errors raised at the host boundary.
#[derive(Error, Debug)]
pub enum SiaError {
    /// An external annotation does not satisfy the shape invariants
    #[error("Malformed {kind:?} annotation: {message}")]
    MalformedAnnotation {
        /// Kind of the rejected annotation
        kind: AnnotationKind,
        /// Description of the violated invariant
        message: String,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration written by a newer version of the crate
    #[error("Unsupported config version: expected at most {supported}, found {found}")]
    UnsupportedConfigVersion {
        /// Highest version this build understands
        supported: u32,
        /// Version found in the file
        found: u32,
    },
}

impl SiaError {
    /// Create a malformed annotation error.
    pub fn malformed(kind: AnnotationKind, message: impl Into<String>) -> Self {
        Self::MalformedAnnotation {
            kind,
            message: message.into(),
        }
    }
}

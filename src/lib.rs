//! SIA - image annotation core
//!
//! Converts pointer and keyboard input on a zoomable image into point, line,
//! bounding box and polygon annotations stored in percentage coordinates.
//! Rendering is left to the host: the [`Canvas`] exposes stage geometry and
//! reports every change as a [`HostEvent`].

pub mod canvas;
pub mod capture;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod keybindings;
pub mod message;
pub mod model;
pub mod session;
pub mod transform;
pub mod viewport;

pub use canvas::{Canvas, MouseButton, StageShape};
pub use config::{AllowedTools, AnnotationSettings, LogLevel, SiaConfig, UiConfig};
pub use error::SiaError;
pub use geometry::{Point, Size};
pub use keybindings::{KeyAction, Modifiers};
pub use message::{HostEvent, Notification, TimeTravelDiff};
pub use model::{Annotation, AnnotationKind, AnnotationStatus, ExternalAnnotation, Label};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

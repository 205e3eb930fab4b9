//! JavaScript binding of the canvas.
//!
//! Structured data crosses the boundary as JSON strings: configuration,
//! labels and annotations in, host events and geometry out.

use wasm_bindgen::prelude::*;

use crate::canvas::{Canvas, MouseButton};
use crate::config::SiaConfig;
use crate::geometry::Point;
use crate::keybindings::Modifiers;
use crate::model::{AnnotationKind, ExternalAnnotation, Label};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// DOM `MouseEvent.button` to a canvas button.
fn mouse_button(button: u8) -> Option<MouseButton> {
    match button {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    }
}

#[wasm_bindgen]
pub struct WasmCanvas {
    inner: Canvas,
}

#[wasm_bindgen]
impl WasmCanvas {
    /// Create a canvas from a JSON config (empty for defaults) and a JSON label list.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, possible_labels_json: &str) -> Result<WasmCanvas, JsError> {
        let config = if config_json.trim().is_empty() {
            SiaConfig::default()
        } else {
            SiaConfig::from_json(config_json)?
        };
        if let Some(level) = config.log_level.to_level_filter().to_level() {
            // Already set when a second canvas is created
            let _ = console_log::init_with_level(level);
        }
        let labels: Vec<Label> = serde_json::from_str(possible_labels_json)?;
        log::info!("SIA canvas created with {} labels", labels.len());
        Ok(Self {
            inner: Canvas::new(config, labels),
        })
    }

    /// Load the initial annotations. Returns how many were accepted.
    pub fn load(&mut self, annotations_json: &str, image_labels: Vec<u32>) -> Result<u32, JsError> {
        let annotations: Vec<ExternalAnnotation> = serde_json::from_str(annotations_json)?;
        let loaded = self.inner.load(annotations, image_labels);
        Ok(loaded as u32)
    }

    pub fn set_image_size(&mut self, width: f64, height: f64) {
        self.inner.set_image_size(Point::new(width, height));
    }

    pub fn set_container(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.inner.set_container(Point::new(x, y), Point::new(width, height));
    }

    /// Select the drawing tool by type name (`point`, `line`, `bBox`, `polygon`).
    pub fn set_tool(&mut self, tool: &str) -> Result<bool, JsError> {
        let kind: AnnotationKind = serde_json::from_value(serde_json::Value::String(tool.to_string()))?;
        Ok(self.inner.set_tool(kind))
    }

    pub fn mouse_down(&mut self, x: f64, y: f64, button: u8, ctrl: bool, shift: bool) {
        if let Some(button) = mouse_button(button) {
            self.inner
                .mouse_down(Point::new(x, y), button, Modifiers { shift, ctrl });
        }
    }

    pub fn mouse_move(&mut self, x: f64, y: f64, movement_x: f64, movement_y: f64) {
        self.inner
            .mouse_move(Point::new(x, y), Point::new(movement_x, movement_y));
    }

    pub fn mouse_up(&mut self, x: f64, y: f64, button: u8) {
        if let Some(button) = mouse_button(button) {
            self.inner.mouse_up(Point::new(x, y), button);
        }
    }

    pub fn double_click(&mut self, x: f64, y: f64) {
        self.inner.double_click(Point::new(x, y));
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
        self.inner.wheel(Point::new(x, y), delta_y);
    }

    /// Returns whether the key was recognized.
    pub fn key_down(&mut self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.inner.key_down(key, Modifiers { shift, ctrl }).is_some()
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.inner.key_up(key).is_some()
    }

    pub fn set_labels(&mut self, id: u32, labels: Vec<u32>) -> bool {
        self.inner.set_labels(id, labels)
    }

    pub fn set_comment(&mut self, id: u32, comment: Option<String>) -> bool {
        self.inner.set_comment(id, comment)
    }

    pub fn set_image_labels(&mut self, labels: Vec<u32>) -> bool {
        self.inner.set_image_labels(labels)
    }

    pub fn set_junk(&mut self, junk: bool) {
        self.inner.set_junk(junk);
    }

    /// Host events queued since the last call, as a JSON array.
    pub fn drain_events(&mut self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.inner.drain_events())?)
    }

    /// Current annotations in host format, as a JSON array.
    pub fn annotations(&self) -> Result<String, JsError> {
        let external: Vec<ExternalAnnotation> = self
            .inner
            .session()
            .annotations()
            .iter()
            .map(|a| a.to_external())
            .collect();
        Ok(serde_json::to_string(&external)?)
    }

    /// Stage geometry for rendering, as a JSON array.
    pub fn stage_geometry(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.inner.stage_geometry())?)
    }

    /// Viewport transform as `[scale, translation x, translation y, offset x, offset y]`.
    pub fn stage_transform(&self) -> Vec<f64> {
        let viewport = self.inner.viewport();
        let offset = self.inner.page_offset();
        vec![
            viewport.scale(),
            viewport.translation().x,
            viewport.translation().y,
            offset.x,
            offset.y,
        ]
    }
}

//! Pan and zoom state of the annotation stage.
//!
//! The stage group is rendered as `scale(s) translate(t)`, so a stage point
//! `p` lands at `(p + t) * s` relative to the stage origin on the page.

use serde::{Deserialize, Serialize};

use crate::constants::{MIN_VISIBLE_FRACTION, PAN_BOUNCE_STEP, ZOOM_FACTOR, ZOOM_MAX, ZOOM_MIN};
use crate::geometry::{Point, Size};

/// Interaction mode of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewportMode {
    /// Pointer events go to annotations
    #[default]
    View,
    /// Pointer movement pans the camera (middle mouse held)
    CameraMove,
}

/// Scale and translation of the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Zoom level, always within `[ZOOM_MIN, ZOOM_MAX]`
    scale: f64,
    /// Translation in unscaled stage units
    translation: Point,
    /// Image pixels to stage units
    image_to_stage_factor: f64,
    /// Extent of the stage (the fitted image) in unscaled units
    canvas_size: Size,
    mode: ViewportMode,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: ZOOM_MIN,
            translation: Point::ZERO,
            image_to_stage_factor: 0.0,
            canvas_size: Point::ZERO,
            mode: ViewportMode::View,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> Point {
        self.translation
    }

    pub fn image_to_stage_factor(&self) -> f64 {
        self.image_to_stage_factor
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    /// Update the fitted geometry after the image or container was measured.
    pub fn set_fit(&mut self, image_to_stage_factor: f64, canvas_size: Size) {
        self.image_to_stage_factor = image_to_stage_factor;
        self.canvas_size = canvas_size;
    }

    /// Back to the fitted view.
    pub fn reset(&mut self) {
        self.scale = ZOOM_MIN;
        self.translation = Point::ZERO;
        self.mode = ViewportMode::View;
    }

    /// Zoom one step around a cursor.
    ///
    /// `cursor` is the pointer position relative to the stage origin on the
    /// page (page position minus page-to-stage offset). The stage point under
    /// the cursor stays under the cursor.
    pub fn zoom(&mut self, delta_y: f64, cursor: Point) {
        let direction = -delta_y.signum();
        if delta_y == 0.0 || direction.is_nan() {
            return;
        }

        let next = if direction > 0.0 {
            self.scale * ZOOM_FACTOR
        } else {
            self.scale / ZOOM_FACTOR
        }
        .clamp(ZOOM_MIN, ZOOM_MAX);

        if next <= ZOOM_MIN {
            self.scale = ZOOM_MIN;
            self.translation = Point::ZERO;
            log::debug!("🔍 Zoom reset to {:.2}x", self.scale);
            return;
        }

        let under_cursor = cursor / self.scale - self.translation;
        self.translation = cursor / next - under_cursor;
        self.scale = next;
        log::debug!(
            "🔍 Zoom {:.2}x, translation ({:.1}, {:.1})",
            self.scale,
            self.translation.x,
            self.translation.y
        );
    }

    /// Pan by a page-pixel movement.
    ///
    /// A pan that would leave less than a quarter of the visible window over
    /// the image bounces back one step inside the limit instead.
    pub fn pan(&mut self, movement: Point) {
        let candidate = self.translation + movement / self.scale;
        let visible = self.canvas_size / self.scale;
        self.translation = Point::new(
            bounce_axis(candidate.x, visible.x, self.canvas_size.x, self.scale),
            bounce_axis(candidate.y, visible.y, self.canvas_size.y, self.scale),
        );
        log::trace!(
            "Pan to ({:.1}, {:.1})",
            self.translation.x,
            self.translation.y
        );
    }

    /// Stage rectangle currently visible, as (min, max) corners.
    pub fn visible_window(&self) -> (Point, Point) {
        let min = Point::ZERO - self.translation;
        (min, min + self.canvas_size / self.scale)
    }

    pub fn begin_camera_move(&mut self) {
        if self.mode != ViewportMode::CameraMove {
            log::debug!("Camera move mode entered");
        }
        self.mode = ViewportMode::CameraMove;
    }

    pub fn end_camera_move(&mut self) {
        if self.mode != ViewportMode::View {
            log::debug!("Camera move mode left");
        }
        self.mode = ViewportMode::View;
    }

    pub fn is_camera_moving(&self) -> bool {
        self.mode == ViewportMode::CameraMove
    }
}

/// Allowed translation range for one axis and the bounced value.
fn bounce_axis(candidate: f64, visible: f64, extent: f64, scale: f64) -> f64 {
    let lo = MIN_VISIBLE_FRACTION * visible - extent;
    let hi = (1.0 - MIN_VISIBLE_FRACTION) * visible;
    let step = PAN_BOUNCE_STEP / scale;
    if candidate > hi {
        (hi - step).max(lo)
    } else if candidate < lo {
        (lo + step).min(hi)
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> Viewport {
        let mut vp = Viewport::new();
        vp.set_fit(0.5, Point::new(500.0, 400.0));
        vp
    }

    fn visible_overlap(vp: &Viewport) -> (f64, f64) {
        let (min, max) = vp.visible_window();
        let size = vp.canvas_size();
        (
            max.x.min(size.x) - min.x.max(0.0),
            max.y.min(size.y) - min.y.max(0.0),
        )
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let mut vp = fitted();
        for _ in 0..100 {
            vp.zoom(-1.0, Point::new(250.0, 200.0));
            assert!(vp.scale() <= ZOOM_MAX);
        }
        assert_eq!(vp.scale(), ZOOM_MAX);
        for _ in 0..100 {
            vp.zoom(3.0, Point::new(10.0, 10.0));
            assert!(vp.scale() >= ZOOM_MIN);
        }
        assert_eq!(vp.scale(), ZOOM_MIN);
        assert_eq!(vp.translation(), Point::ZERO);
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let mut vp = fitted();
        let cursor = Point::new(120.0, 80.0);
        vp.zoom(-1.0, cursor);
        let before = cursor / vp.scale() - vp.translation();
        vp.zoom(-1.0, cursor);
        let after = cursor / vp.scale() - vp.translation();
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert!((vp.scale() - ZOOM_FACTOR * ZOOM_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn zero_delta_is_ignored() {
        let mut vp = fitted();
        vp.zoom(0.0, Point::new(1.0, 1.0));
        assert_eq!(vp.scale(), ZOOM_MIN);
    }

    #[test]
    fn pan_divides_by_scale() {
        let mut vp = fitted();
        vp.zoom(-1.0, Point::ZERO);
        vp.pan(Point::new(-12.5, 0.0));
        assert!((vp.translation().x - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn pan_never_loses_the_image() {
        let mut vp = fitted();
        for step in 0..200 {
            vp.pan(Point::new(57.0, -33.0));
            let (ox, oy) = visible_overlap(&vp);
            let visible = vp.canvas_size() / vp.scale();
            assert!(ox >= MIN_VISIBLE_FRACTION * visible.x - 1e-9, "step {step}");
            assert!(oy >= MIN_VISIBLE_FRACTION * visible.y - 1e-9, "step {step}");
        }
        for _ in 0..10 {
            vp.zoom(-1.0, Point::new(400.0, 10.0));
        }
        for _ in 0..200 {
            vp.pan(Point::new(-300.0, 210.0));
            let (ox, oy) = visible_overlap(&vp);
            let visible = vp.canvas_size() / vp.scale();
            assert!(ox >= MIN_VISIBLE_FRACTION * visible.x - 1e-9);
            assert!(oy >= MIN_VISIBLE_FRACTION * visible.y - 1e-9);
        }
    }

    #[test]
    fn pan_past_edge_bounces_inside() {
        let mut vp = fitted();
        // hi bound for x at scale 1 is 0.75 * 500
        vp.pan(Point::new(1000.0, 0.0));
        assert!((vp.translation().x - (375.0 - PAN_BOUNCE_STEP)).abs() < 1e-9);
    }

    #[test]
    fn bounce_is_constant_on_screen_when_zoomed() {
        let mut vp = fitted();
        for _ in 0..30 {
            vp.zoom(-1.0, Point::new(0.0, 0.0));
        }
        let scale = vp.scale();
        assert_eq!(scale, ZOOM_MAX);
        let hi = (1.0 - MIN_VISIBLE_FRACTION) * vp.canvas_size().x / scale;
        vp.pan(Point::new(1.0e6, 0.0));
        let bounce_px = (hi - vp.translation().x) * scale;
        assert!((bounce_px - PAN_BOUNCE_STEP).abs() < 1e-6);
    }

    #[test]
    fn camera_mode_transitions() {
        let mut vp = fitted();
        assert!(!vp.is_camera_moving());
        vp.begin_camera_move();
        assert_eq!(vp.mode(), ViewportMode::CameraMove);
        vp.end_camera_move();
        assert_eq!(vp.mode(), ViewportMode::View);
    }
}

//! Coordinate conversions between page, stage, image-pixel and percentage space.
//!
//! The chain is strict: `page <-> stage <-> image <-> percentage`.
//!
//! - **page**: browser page pixels, as delivered by pointer events.
//! - **stage**: the unscaled SVG frame in which annotation geometry lives.
//!   Pan and zoom are applied on top as a transform, never baked in.
//! - **image**: source image pixels.
//! - **percentage**: `[0, 1]` per axis relative to the image, the only format
//!   that crosses the host boundary.
//!
//! Every function here is pure.

use crate::geometry::{Point, Size};

/// Page position to stage position, ignoring pan and zoom.
pub fn page_to_stage(page: Point, page_to_stage_offset: Point) -> Point {
    page - page_to_stage_offset
}

/// Stage position back to page pixels with the viewport transform applied.
pub fn stage_to_page(stage: Point, page_to_stage_offset: Point, scale: f64, translation: Point) -> Point {
    (stage + translation) * scale + page_to_stage_offset
}

/// Counter-scale a page position so it can be compared against shape geometry.
///
/// The stage group renders with `scale` applied, so raw pointer coordinates
/// must be divided by it before they mean anything in shape space.
pub fn anti_scaled_mouse_stage_position(page: Point, page_to_stage_offset: Point, scale: f64) -> Point {
    (page - page_to_stage_offset) / scale
}

/// Full inverse of [`stage_to_page`]: the stage point under a page position.
pub fn mouse_stage_position(
    page: Point,
    page_to_stage_offset: Point,
    scale: f64,
    translation: Point,
) -> Point {
    anti_scaled_mouse_stage_position(page, page_to_stage_offset, scale) - translation
}

/// Image pixels to stage units. Aspect ratio is preserved, so the x ratio is
/// used for both axes.
pub fn image_to_stage(image: Point, img_size: Size, canvas_size: Size) -> Point {
    if img_size.x == 0.0 {
        return Point::ZERO;
    }
    image * (canvas_size.x / img_size.x)
}

/// Percentage coordinates to image pixels.
pub fn percentage_to_image(pct: Point, img_size: Size) -> Point {
    pct.scale_by(img_size)
}

/// Percentage coordinates straight to stage units.
pub fn percentage_to_stage(pct: Point, img_size: Size, canvas_size: Size) -> Point {
    image_to_stage(percentage_to_image(pct, img_size), img_size, canvas_size)
}

/// Clamp an image-pixel point into `[0, img_size]` per axis.
pub fn clamp_to_image(image: Point, img_size: Size) -> Point {
    Point::new(
        image.x.clamp(0.0, img_size.x.max(0.0)),
        image.y.clamp(0.0, img_size.y.max(0.0)),
    )
}

/// Clamp a percentage point into the unit square.
pub fn clamp_percentage(pct: Point) -> Point {
    Point::new(pct.x.clamp(0.0, 1.0), pct.y.clamp(0.0, 1.0))
}

/// Stage units to percentage coordinates.
///
/// The image-pixel intermediate is clamped to the image, so the result always
/// lies in the unit square even when a node was dragged off the image.
/// Returns the origin while the image size is still unknown.
pub fn stage_to_percentage(stage: Point, image_to_stage_factor: f64, img_size: Size) -> Point {
    if image_to_stage_factor == 0.0 || img_size.has_zero_dimension() {
        return Point::ZERO;
    }
    let image = clamp_to_image(stage / image_to_stage_factor, img_size);
    Point::new(image.x / img_size.x, image.y / img_size.y)
}

/// Largest uniform scale fitting the image into the container.
///
/// Returns 0 when any dimension is 0, meaning "not measured yet".
pub fn fitted_image_scale(img_size: Size, container_size: Size) -> f64 {
    if img_size.has_zero_dimension() || container_size.has_zero_dimension() {
        return 0.0;
    }
    (container_size.x / img_size.x).min(container_size.y / img_size.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn page_stage_round_trip() {
        let offset = Point::new(30.0, 12.0);
        let translation = Point::new(-40.0, 7.5);
        let scale = 3.0;
        let stage = Point::new(120.0, 80.0);
        let page = stage_to_page(stage, offset, scale, translation);
        assert_close(mouse_stage_position(page, offset, scale, translation), stage);
    }

    #[test]
    fn anti_scaling_divides_by_scale() {
        let p = anti_scaled_mouse_stage_position(Point::new(110.0, 60.0), Point::new(10.0, 10.0), 2.0);
        assert_close(p, Point::new(50.0, 25.0));
        assert_close(page_to_stage(Point::new(110.0, 60.0), Point::new(10.0, 10.0)), Point::new(100.0, 50.0));
    }

    #[test]
    fn percentage_stage_round_trip() {
        let img = Point::new(1000.0, 800.0);
        let canvas = Point::new(500.0, 400.0);
        let factor = fitted_image_scale(img, canvas);
        for &(x, y) in &[(0.0, 0.0), (1.0, 1.0), (0.2, 0.25), (0.333, 0.9), (0.5, 0.0)] {
            let pct = Point::new(x, y);
            let stage = percentage_to_stage(pct, img, canvas);
            assert_close(stage_to_percentage(stage, factor, img), pct);
        }
    }

    #[test]
    fn bbox_scenario_half_scale() {
        let img = Point::new(1000.0, 800.0);
        let factor = fitted_image_scale(img, Point::new(500.0, 400.0));
        assert_eq!(factor, 0.5);
        assert_close(stage_to_percentage(Point::new(100.0, 100.0), factor, img), Point::new(0.2, 0.25));
        assert_close(stage_to_percentage(Point::new(300.0, 200.0), factor, img), Point::new(0.6, 0.5));
    }

    #[test]
    fn out_of_bounds_is_clamped() {
        let img = Point::new(1000.0, 1000.0);
        let pct = stage_to_percentage(Point::new(1100.0, -50.0), 1.0, img);
        assert_eq!(pct, Point::new(1.0, 0.0));
    }

    #[test]
    fn clamping_is_idempotent() {
        let p = clamp_percentage(Point::new(1.7, -0.2));
        assert_eq!(clamp_percentage(p), p);
        let inside = Point::new(0.4, 0.6);
        assert_eq!(clamp_percentage(inside), inside);
    }

    #[test]
    fn fitted_scale_picks_tighter_axis() {
        assert_eq!(fitted_image_scale(Point::new(1000.0, 500.0), Point::new(500.0, 500.0)), 0.5);
        assert_eq!(fitted_image_scale(Point::new(100.0, 400.0), Point::new(500.0, 200.0)), 0.5);
        assert_eq!(fitted_image_scale(Point::new(0.0, 400.0), Point::new(500.0, 200.0)), 0.0);
        assert_eq!(fitted_image_scale(Point::new(100.0, 400.0), Point::new(500.0, 0.0)), 0.0);
    }

    #[test]
    fn unmeasured_image_maps_to_origin() {
        assert_eq!(stage_to_percentage(Point::new(5.0, 5.0), 0.0, Point::new(10.0, 10.0)), Point::ZERO);
    }
}

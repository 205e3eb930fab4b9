//! Global constants for the SIA annotation core

// =============================================================================
// Viewport
// =============================================================================

/// Multiplicative zoom step applied per wheel notch
pub const ZOOM_FACTOR: f64 = 1.25;

/// Minimum stage scale (1.0 = image fitted into the container)
pub const ZOOM_MIN: f64 = 1.0;

/// Maximum stage scale
pub const ZOOM_MAX: f64 = 200.0;

/// Fraction of the visible window that must keep showing the image while panning
pub const MIN_VISIBLE_FRACTION: f64 = 0.25;

/// Distance (page pixels) the camera bounces back when a pan leaves the allowed region
pub const PAN_BOUNCE_STEP: f64 = 25.0;

/// Page pixels moved per arrow key press in camera move mode
pub const CAMERA_KEY_STEP: f64 = 10.0;

// =============================================================================
// Shapes
// =============================================================================

/// Minimum number of nodes a finished line keeps
pub const MIN_LINE_NODES: usize = 2;

/// Minimum number of nodes a finished polygon keeps
pub const MIN_POLYGON_NODES: usize = 3;

/// Number of stored corners of a bounding box
pub const BBOX_STORED_CORNERS: usize = 2;

// =============================================================================
// UI defaults
// =============================================================================

/// Default node radius in page pixels
pub const DEFAULT_NODE_RADIUS: f64 = 4.0;

/// Default stroke width in page pixels
pub const DEFAULT_STROKE_WIDTH: f64 = 4.0;

//! # Default values
//!
//! Used as initial values.

// Render resolution
pub const RENDER_WIDTH: usize = 512;
pub const RENDER_HEIGHT: usize = 512;

pub const BOUNDARY: &str = "first-face";
pub const PRESET: &str = "continuous";

pub const OUTPUT_DIR: &str = ".";
pub const FRAME_PREFIX: &str = "frame";

// Camera
pub const CAM_RADIUS: f32 = 2.5;
/// Degrees per `rotate` step when no angle is given
pub const ROTATE_STEP: f32 = 15.0;
pub const ZOOM_STEP: f32 = 0.25;

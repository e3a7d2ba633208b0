//! Renderer boundary.
//!
//! A backend receives the raw volume and the transfer lookup volume as 3D
//! textures plus a few scalar uniforms, and produces pixels.
//! [`RayCastRenderer`] is a CPU implementation of the boundary.

mod camera;
mod renderer;

use std::sync::Arc;

pub use camera::OrbitCamera;
pub use renderer::RayCastRenderer;

use crate::{transfer::TransferVolume, volumetric::VolumeGrid};

/// Which pass is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Ray marched image
    #[default]
    Composite,
    /// Exit points, colored by position
    BackFaces,
    /// Entry points, colored by position
    FrontFaces,
}

impl ViewMode {
    /// Composite -> BackFaces -> FrontFaces -> Composite
    pub fn next(self) -> ViewMode {
        match self {
            ViewMode::Composite => ViewMode::BackFaces,
            ViewMode::BackFaces => ViewMode::FrontFaces,
            ViewMode::FrontFaces => ViewMode::Composite,
        }
    }
}

/// Uniforms of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub resolution: (usize, usize),
    /// Sampling distance along the ray, unit cube space
    pub step_size: f32,
    /// Opacity scale
    pub luminance: f32,
    pub view: ViewMode,
    /// Diffuse shading from the raw volume gradient
    pub shading: bool,
    pub ray_termination: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            resolution: (512, 512),
            step_size: 1.0 / 1000.0,
            luminance: 10.0,
            view: ViewMode::Composite,
            shading: false,
            ray_termination: true,
        }
    }
}

/// Consumer of the pipeline output.
///
/// Textures are handed over as shared handles, a backend may keep them
/// across frames until new ones are uploaded.
pub trait RenderBackend: Send {
    fn upload_volume(&mut self, volume: Arc<VolumeGrid>);

    fn upload_transfer(&mut self, transfer: Arc<TransferVolume>);

    /// Render one RGB frame into `buffer`, row 0 is the top of the image.
    /// `buffer` holds `3 * width * height` bytes.
    fn render(&mut self, camera: &OrbitCamera, params: &RenderParams, buffer: &mut [u8]);
}

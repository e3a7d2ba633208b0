use std::sync::Arc;

use nalgebra::{vector, Point3, Vector3, Vector4};
use rayon::prelude::*;

use super::{OrbitCamera, RenderBackend, RenderParams, ViewMode};
use crate::{
    common::{BoundBox, Ray},
    transfer::TransferVolume,
    volumetric::VolumeGrid,
};

/// CPU ray caster.
///
/// The volume occupies the unit cube. Entry and exit points come from the
/// ray/box intersection, the composite pass marches between them and
/// accumulates color front to back. Sampling is nearest neighbour.
#[derive(Default)]
pub struct RayCastRenderer {
    volume: Option<Arc<VolumeGrid>>,
    transfer: Option<Arc<TransferVolume>>,
}

impl RayCastRenderer {
    pub fn new(volume: Arc<VolumeGrid>, transfer: Arc<TransferVolume>) -> RayCastRenderer {
        RayCastRenderer {
            volume: Some(volume),
            transfer: Some(transfer),
        }
    }

    /// Voxel containing unit cube position `pos`
    fn voxel(size: Vector3<usize>, pos: &Point3<f32>) -> (usize, usize, usize) {
        let clamp = |p: f32, n: usize| ((p * n as f32) as usize).min(n - 1);
        (
            clamp(pos.x.max(0.0), size.x),
            clamp(pos.y.max(0.0), size.y),
            clamp(pos.z.max(0.0), size.z),
        )
    }

    // central difference of the raw volume, inverted so it points out of dense regions
    fn normal(volume: &VolumeGrid, (x, y, z): (usize, usize, usize)) -> Vector3<f32> {
        let size = volume.size();
        let diff = |lo: u32, hi: u32| lo as f32 - hi as f32;
        let grad = vector![
            diff(
                volume.sample(x.saturating_sub(1), y, z),
                volume.sample((x + 1).min(size.x - 1), y, z)
            ),
            diff(
                volume.sample(x, y.saturating_sub(1), z),
                volume.sample(x, (y + 1).min(size.y - 1), z)
            ),
            diff(
                volume.sample(x, y, z.saturating_sub(1)),
                volume.sample(x, y, (z + 1).min(size.z - 1))
            )
        ];
        if grad.norm() > 0.0 {
            grad.normalize()
        } else {
            grad
        }
    }

    /// Accumulated color of one ray, channels in `[0, 1]`
    pub fn collect_light(
        &self,
        ray: &Ray,
        (t_in, t_out): (f32, f32),
        params: &RenderParams,
    ) -> Vector4<f32> {
        let mut accum = vector![0.0, 0.0, 0.0, 0.0];
        let (volume, transfer) = match (&self.volume, &self.transfer) {
            (Some(v), Some(t)) => (v, t),
            _ => return accum,
        };

        let size = transfer.size();
        let step = params.step_size.max(1e-6);
        let n_of_steps = ((t_out - t_in) / step) as usize;
        let light_source = vector![1.0, 1.0, 0.0].normalize();

        let mut pos = ray.point_from_t(t_in);
        let delta = ray.direction * step;

        for _ in 0..=n_of_steps {
            let voxel = Self::voxel(size, &pos);
            pos += delta;

            let texel = transfer.texel(voxel.0, voxel.1, voxel.2);
            if texel[3] == 0 {
                continue;
            }

            let mut rgb = vector![texel[0], texel[1], texel[2]].map(|c| c as f32 / 255.0);
            let alpha = (texel[3] as f32 / 255.0 * params.luminance * step).min(1.0);

            if params.shading {
                let n_dot_l = f32::max(Self::normal(volume, voxel).dot(&light_source), 0.0);
                rgb *= n_dot_l;
            }

            accum += (1.0 - accum.w) * vector![rgb.x * alpha, rgb.y * alpha, rgb.z * alpha, alpha];

            if params.ray_termination && accum.w > 0.99 {
                break;
            }
        }
        accum
    }

    fn pixel(&self, camera: &OrbitCamera, params: &RenderParams, x: usize, y: usize) -> [u8; 3] {
        let (w, h) = params.resolution;
        let coord = ((x as f32 + 0.5) / w as f32, (y as f32 + 0.5) / h as f32);
        let ray = camera.get_ray(coord);

        let (t_in, t_out) = match BoundBox::unit().intersect(&ray) {
            Some(t) => t,
            None => return [0, 0, 0],
        };

        let color = match params.view {
            ViewMode::Composite => self.collect_light(&ray, (t_in, t_out), params).xyz(),
            ViewMode::FrontFaces => ray.point_from_t(t_in).coords,
            ViewMode::BackFaces => ray.point_from_t(t_out).coords,
        };

        // expects black background
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
        [byte(color.x), byte(color.y), byte(color.z)]
    }
}

impl RenderBackend for RayCastRenderer {
    fn upload_volume(&mut self, volume: Arc<VolumeGrid>) {
        self.volume = Some(volume);
    }

    fn upload_transfer(&mut self, transfer: Arc<TransferVolume>) {
        self.transfer = Some(transfer);
    }

    fn render(&mut self, camera: &OrbitCamera, params: &RenderParams, buffer: &mut [u8]) {
        let (w, _) = params.resolution;
        let this = &*self;
        buffer
            .par_chunks_mut(3 * w)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(3).enumerate() {
                    px.copy_from_slice(&this.pixel(camera, params, x, y));
                }
            });
    }
}

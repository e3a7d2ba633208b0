use rayon::prelude::*;

use super::{Samples, VolumeGrid};
use crate::error::{try_alloc, Result};

// 3x3x3 mean of an interior voxel, truncated
fn neighbourhood_mean(grid: &VolumeGrid, x: usize, y: usize, z: usize) -> u32 {
    let mut sum = 0u32;
    for k in z - 1..=z + 1 {
        for j in y - 1..=y + 1 {
            for i in x - 1..=x + 1 {
                sum += grid.sample(i, j, k);
            }
        }
    }
    sum / 27
}

/// Smooth interior voxels with a 3x3x3 box filter.
/// Voxels on the boundary faces keep their value.
pub fn box_smooth(grid: &VolumeGrid) -> Result<VolumeGrid> {
    let size = grid.size();
    let count = grid.count();
    let plane = size.x * size.y;

    let mut out = try_alloc::<u32>("smooth", count)?;
    out.resize(count, 0);

    out.par_chunks_mut(plane).enumerate().for_each(|(z, slice)| {
        for y in 0..size.y {
            for x in 0..size.x {
                let border = x == 0
                    || y == 0
                    || z == 0
                    || x == size.x - 1
                    || y == size.y - 1
                    || z == size.z - 1;
                slice[y * size.x + x] = if border {
                    grid.sample(x, y, z)
                } else {
                    neighbourhood_mean(grid, x, y, z)
                };
            }
        }
    });

    // means never exceed the largest input sample, narrowing is lossless
    let samples = match grid.samples() {
        Samples::U8(_) => Samples::U8(out.into_iter().map(|v| v as u8).collect()),
        Samples::U16(_) => Samples::U16(out.into_iter().map(|v| v as u16).collect()),
    };

    log::debug!("Box filter applied to {count} voxels");
    VolumeGrid::new(size, samples)
}

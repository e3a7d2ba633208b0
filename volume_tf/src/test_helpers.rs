//! Module with helper functions
//! Saves repetition in unit tests, integration tests and benchmarks

use std::path::{Path, PathBuf};

use nalgebra::{vector, Vector3};

use crate::volumetric::{DatasetHeader, Samples, VolumeGrid};

/// Every voxel holds `value`
pub fn constant_grid(size: Vector3<usize>, value: u8) -> VolumeGrid {
    let data = vec![value; size.x * size.y * size.z];
    VolumeGrid::new(size, Samples::U8(data)).unwrap()
}

/// 2x2x2 volume, plane `z = 0` is 0 and plane `z = 1` is 255
pub fn two_face_grid() -> VolumeGrid {
    let data = vec![0, 0, 0, 0, 255, 255, 255, 255];
    VolumeGrid::new(vector![2, 2, 2], Samples::U8(data)).unwrap()
}

/// Sample grows linearly with x, `step` per voxel
pub fn ramp_grid(size: Vector3<usize>, step: u16) -> VolumeGrid {
    let mut data = Vec::with_capacity(size.x * size.y * size.z);
    for _z in 0..size.z {
        for _y in 0..size.y {
            for x in 0..size.x {
                data.push(x as u16 * step);
            }
        }
    }
    VolumeGrid::new(size, Samples::U16(data)).unwrap()
}

/// Solid ball of `value` centered in a cube of side `side`, zero outside
pub fn ball_grid(side: usize, radius: f32, value: u8) -> VolumeGrid {
    let center = (side as f32 - 1.0) / 2.0;
    let mut data = Vec::with_capacity(side * side * side);
    for z in 0..side {
        for y in 0..side {
            for x in 0..side {
                let d = vector![x as f32 - center, y as f32 - center, z as f32 - center];
                data.push(if d.norm() <= radius { value } else { 0 });
            }
        }
    }
    VolumeGrid::new(vector![side, side, side], Samples::U8(data)).unwrap()
}

/// Fresh directory under the OS temp dir, unique per test name and process
pub fn scratch_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("volume_tf-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&path);
    std::fs::create_dir_all(&path).unwrap();
    path
}

/// Write `grid` as `<name>.dat` + `<name>.raw` into `dir`, returns header path
pub fn write_dataset(dir: &Path, name: &str, grid: &VolumeGrid) -> PathBuf {
    let header = DatasetHeader {
        object_file_name: PathBuf::from(format!("{name}.raw")),
        resolution: grid.size(),
        format: grid.format(),
    };
    let header_path = dir.join(format!("{name}.dat"));
    std::fs::write(&header_path, header.to_text()).unwrap();
    std::fs::write(dir.join(&header.object_file_name), grid.to_texture_bytes()).unwrap();
    header_path
}

use nalgebra::Vector3;

/// Flat index of voxel `(x, y, z)`.
///
/// X grows fastest, then Y, then Z: `z * ny * nx + y * nx + x`.
/// Every per-voxel buffer in the crate is laid out by this function.
#[inline]
pub fn linear_index(size: Vector3<usize>, x: usize, y: usize, z: usize) -> usize {
    z * size.y * size.x + y * size.x + x
}

/// Number of voxels of a `size` grid, `None` if the product overflows `usize`.
pub fn checked_voxel_count(size: Vector3<usize>) -> Option<usize> {
    size.x.checked_mul(size.y)?.checked_mul(size.z)
}

/// Read-only scalar field sampled on a regular grid.
///
/// Implemented by the raw volume and by derived magnitude fields, so the same
/// finite difference code runs on every order of derivative.
pub trait ScalarField: Sync {
    // data dimensions
    fn size(&self) -> Vector3<usize>;

    // value at voxel, coordinates must be inside `size`
    fn value(&self, x: usize, y: usize, z: usize) -> f64;

    fn voxel_count(&self) -> usize {
        let size = self.size();
        size.x * size.y * size.z
    }
}

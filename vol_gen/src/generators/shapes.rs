use std::ops::RangeBounds;

use nalgebra::{vector, Vector3};

use super::SampleGenerator;

/// Generate volume with a number of randomly placed shapes
pub struct ShapesGenerator {
    shapes: Vec<ShapeInfo>,
}

impl ShapesGenerator {
    pub fn new(
        dims: Vector3<u32>,
        n_of_shapes: usize,
        sample: u16,
        obj_size: u32,
        seed: Option<u64>,
    ) -> ShapesGenerator {
        // objects never exceed the volume
        let size = dims.map(|d| obj_size.min(d));
        let variance = size.map(|s| s / 10);
        let sample_variance = sample / 20;

        let random_shape_gen =
            ShapeInfoGenerator::new(dims, size, variance, sample, sample_variance, seed);
        let shapes = random_shape_gen.get_shapes(n_of_shapes);
        log::debug!("Generated {} shapes", shapes.len());
        ShapesGenerator { shapes }
    }
}

impl SampleGenerator for ShapesGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u16 {
        for shape in &self.shapes {
            if shape.contains(coords) {
                let offset = coords - shape.position_low;
                let sample = shape.render_at(offset);
                if sample != 0 {
                    return sample;
                }
            }
        }
        0
    }
}

// # of enum ShapeType variants
const N_OF_SHAPE_KINDS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Cuboid,
    Sphere,
}

/// One shape in volume, bounds are inclusive
#[derive(Debug)]
pub struct ShapeInfo {
    pub position_low: Vector3<u32>,
    pub position_high: Vector3<u32>,
    pub shape_type: ShapeType,
    pub sample: u16,
}

impl ShapeInfo {
    fn contains(&self, coords: Vector3<u32>) -> bool {
        (0..3).all(|i| coords[i] >= self.position_low[i] && coords[i] <= self.position_high[i])
    }

    fn render_at(&self, offset: Vector3<u32>) -> u16 {
        match self.shape_type {
            ShapeType::Cuboid => self.sample,
            ShapeType::Sphere => self.render_sphere(offset),
        }
    }

    fn render_sphere(&self, offset: Vector3<u32>) -> u16 {
        let offset_f = offset.cast::<f32>();
        let pos_low_f = self.position_low.cast::<f32>();
        let pos_hi_f = self.position_high.cast::<f32>();

        let center = (pos_hi_f - pos_low_f) / 2.0;
        let r = (pos_hi_f.x - pos_low_f.x) / 2.0;

        if (offset_f - center).magnitude() <= r {
            self.sample
        } else {
            0
        }
    }
}

/// Generate shapes
/// Helper type
pub struct ShapeInfoGenerator {
    rng: fastrand::Rng,
    vol_dims: Vector3<u32>,
    size: Vector3<u32>,
    size_variance: Vector3<u32>,
    sample: u16,
    sample_variance: u16,
}

impl ShapeInfoGenerator {
    #[must_use]
    pub fn new(
        vol_dims: Vector3<u32>,
        size: Vector3<u32>,
        size_variance: Vector3<u32>,
        sample: u16,
        sample_variance: u16,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        Self {
            rng,
            vol_dims,
            size,
            size_variance,
            sample,
            sample_variance,
        }
    }

    fn random_shape(&self) -> ShapeType {
        match self.rng.u8(0..N_OF_SHAPE_KINDS) {
            0 => ShapeType::Cuboid,
            _ => ShapeType::Sphere,
        }
    }

    fn random_vector<R>(&self, ranges: Vector3<R>) -> Vector3<u32>
    where
        R: RangeBounds<u32> + Clone,
    {
        let rand_x = self.rng.u32(ranges[0].clone()); // Using index, .x access not working
        let rand_y = self.rng.u32(ranges[1].clone());
        let rand_z = self.rng.u32(ranges[2].clone());
        vector![rand_x, rand_y, rand_z]
    }

    pub fn get_shapes(&self, n: usize) -> Vec<ShapeInfo> {
        (0..n).map(|_| self.get_shape()).collect()
    }

    pub fn get_shape(&self) -> ShapeInfo {
        let shape_type = self.random_shape();

        let size_min = self.size.zip_map(&self.size_variance, |s, v| s.saturating_sub(v).max(1));
        let size_max = self.size.zip_map(&self.vol_dims, |s, d| s.min(d));
        let size_max = size_max.zip_map(&self.size_variance, |s, v| s.saturating_add(v));
        let size_max = size_max.zip_map(&self.vol_dims, |s, d| s.min(d));
        let size_min = size_min.zip_map(&size_max, |lo, hi| lo.min(hi));

        let size_ranges = vector![
            size_min.x..=size_max.x,
            size_min.y..=size_max.y,
            size_min.z..=size_max.z
        ];
        let size = self.random_vector(size_ranges);

        // Spawn shape in positions it fits
        let pos_ranges = vector![
            0..=(self.vol_dims.x - size.x),
            0..=(self.vol_dims.y - size.y),
            0..=(self.vol_dims.z - size.z)
        ];
        let position_low = self.random_vector(pos_ranges);

        let position_high = position_low + size - vector![1, 1, 1];

        ShapeInfo {
            position_low,
            position_high,
            shape_type,
            sample: self.random_sample(),
        }
    }

    fn random_sample(&self) -> u16 {
        // Uses saturating intrinsics, so there is no overflow
        let low = self.sample.saturating_sub(self.sample_variance).max(1);
        let high = self.sample.saturating_add(self.sample_variance).max(low);
        self.rng.u16(low..=high)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn shapes_fit_volume() {
        let dims = vector![20, 30, 10];
        let gen =
            ShapeInfoGenerator::new(dims, vector![8, 8, 8], vector![2, 2, 2], 100, 5, Some(3));
        for shape in gen.get_shapes(50) {
            for i in 0..3 {
                assert!(shape.position_low[i] <= shape.position_high[i]);
                assert!(shape.position_high[i] < dims[i]);
            }
            assert!((95..=105).contains(&shape.sample));
        }
    }

    #[test]
    fn seeded_generation_repeats() {
        let a = ShapesGenerator::new(vector![32, 32, 32], 10, 200, 8, Some(42));
        let b = ShapesGenerator::new(vector![32, 32, 32], 10, 200, 8, Some(42));
        for z in 0..32 {
            assert_eq!(
                a.sample_at(vector![16, 16, z]),
                b.sample_at(vector![16, 16, z])
            );
        }
    }

    #[test]
    fn cuboid_fills_bounds() {
        let shape = ShapeInfo {
            position_low: vector![2, 2, 2],
            position_high: vector![4, 4, 4],
            shape_type: ShapeType::Cuboid,
            sample: 9,
        };
        let gen = ShapesGenerator {
            shapes: vec![shape],
        };
        assert_eq!(gen.sample_at(vector![2, 4, 3]), 9);
        assert_eq!(gen.sample_at(vector![5, 4, 3]), 0);
    }
}

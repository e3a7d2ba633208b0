use nalgebra::Vector3;

use super::SampleGenerator;

/// Empty lower half along z, `sample` in the upper half
pub struct TwoFaceGenerator {
    sample: u16,
    split: u32,
}

impl TwoFaceGenerator {
    pub fn new(dims: Vector3<u32>, sample: u16) -> TwoFaceGenerator {
        TwoFaceGenerator {
            sample,
            split: dims.z / 2,
        }
    }
}

impl SampleGenerator for TwoFaceGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u16 {
        if coords.z < self.split {
            0
        } else {
            self.sample
        }
    }
}

/// Linear ramp along x, from 0 at `x = 0` to `max` at the last column
pub struct RampGenerator {
    max: u16,
    last: u32,
}

impl RampGenerator {
    pub fn new(dims: Vector3<u32>, max: u16) -> RampGenerator {
        RampGenerator {
            max,
            last: dims.x.saturating_sub(1),
        }
    }
}

impl SampleGenerator for RampGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u16 {
        if self.last == 0 {
            return self.max;
        }
        (coords.x as u64 * self.max as u64 / self.last as u64) as u16
    }
}

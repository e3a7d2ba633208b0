use nalgebra::Vector3;

use super::SampleGenerator;

/// Generate solid volume
/// All samples inside the padding have the same value
pub struct SolidGenerator {
    /// The sample value
    sample: u16,
    pad: u32,
    dims: Vector3<u32>,
}

impl SolidGenerator {
    pub fn new(dims: Vector3<u32>, sample: u16, pad: u32) -> SolidGenerator {
        SolidGenerator { sample, pad, dims }
    }
}

impl SampleGenerator for SolidGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u16 {
        let inside = (0..3).all(|i| coords[i] >= self.pad && coords[i] + self.pad < self.dims[i]);
        if inside {
            self.sample
        } else {
            0
        }
    }
}

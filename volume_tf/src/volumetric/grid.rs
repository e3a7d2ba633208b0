use nalgebra::Vector3;

use super::{checked_voxel_count, linear_index, ScalarField};
use crate::error::{PipelineError, Result};

/// Storage type of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 8 bit unsigned, `UCHAR` in headers
    UChar,
    /// 16 bit unsigned, `USHORT` in headers
    UShort,
}

impl SampleFormat {
    /// Parse header spelling of the format.
    pub fn from_name(name: &str) -> Option<SampleFormat> {
        match name {
            "UCHAR" => Some(SampleFormat::UChar),
            "USHORT" => Some(SampleFormat::UShort),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleFormat::UChar => "UCHAR",
            SampleFormat::UShort => "USHORT",
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::UChar => 1,
            SampleFormat::UShort => 2,
        }
    }

    /// Number of representable values.
    /// Sizes histograms and tables, independent of the observed data.
    pub fn raw_range(&self) -> usize {
        match self {
            SampleFormat::UChar => 256,
            SampleFormat::UShort => 65536,
        }
    }
}

/// Sample buffer, tagged by format
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(v) => v.len(),
            Samples::U16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            Samples::U8(_) => SampleFormat::UChar,
            Samples::U16(_) => SampleFormat::UShort,
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        match self {
            Samples::U8(v) => v[index] as u32,
            Samples::U16(v) => v[index] as u32,
        }
    }
}

/// Immutable scalar volume.
///
/// Created once from a header/raw pair (see [`super::load`]) and shared
/// read-only by every later stage.
#[derive(Clone, PartialEq)]
pub struct VolumeGrid {
    size: Vector3<usize>,
    samples: Samples,
}

impl std::fmt::Debug for VolumeGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeGrid")
            .field("size", &self.size)
            .field("format", &self.format())
            .field("samples", &self.samples.len())
            .finish()
    }
}

impl VolumeGrid {
    /// Wrap `samples` laid out by [`linear_index`].
    /// Fails if any dimension is zero or the sample count does not match.
    pub fn new(size: Vector3<usize>, samples: Samples) -> Result<VolumeGrid> {
        let expected = checked_voxel_count(size);
        if expected.map_or(true, |n| n == 0 || samples.len() != n) {
            return Err(PipelineError::Shape {
                dims: format!("{}x{}x{}", size.x, size.y, size.z),
                found: samples.len(),
            });
        }
        Ok(VolumeGrid { size, samples })
    }

    pub fn size(&self) -> Vector3<usize> {
        self.size
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn format(&self) -> SampleFormat {
        self.samples.format()
    }

    pub fn raw_range(&self) -> usize {
        self.format().raw_range()
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        linear_index(self.size, x, y, z)
    }

    /// Inverse of [`VolumeGrid::index`]
    pub fn coords(&self, index: usize) -> (usize, usize, usize) {
        let plane = self.size.x * self.size.y;
        let z = index / plane;
        let rem = index % plane;
        (rem % self.size.x, rem / self.size.x, z)
    }

    /// Sample at voxel.
    /// Coordinates must be inside the volume, checking is up to the caller.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, z: usize) -> u32 {
        debug_assert!(x < self.size.x && y < self.size.y && z < self.size.z);
        self.samples.get(self.index(x, y, z))
    }

    #[inline]
    pub fn sample_at_index(&self, index: usize) -> u32 {
        self.samples.get(index)
    }

    /// Raw little-endian bytes, as they are uploaded to a 3D texture.
    pub fn to_texture_bytes(&self) -> Vec<u8> {
        match &self.samples {
            Samples::U8(v) => v.clone(),
            Samples::U16(v) => v.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }
}

impl ScalarField for VolumeGrid {
    fn size(&self) -> Vector3<usize> {
        self.size
    }

    #[inline]
    fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        self.sample(x, y, z) as f64
    }
}

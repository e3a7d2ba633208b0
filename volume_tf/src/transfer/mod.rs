//! Mapping of voxel features to the RGBA lookup volume.

mod color;
mod opacity;

pub use color::{hsl_to_rgb, norm, ColorEmphasis, HuePolicy, HueRange, HUE_ANCHORS, RGB};
pub use opacity::{opacity, OpacityThresholds};

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::{
    common::ValueRange,
    derivative::{DerivativeFields, MagnitudeField},
    error::{try_alloc, PipelineError, Result},
    histogram::{HistogramStats, JointHistogram},
    volumetric::{linear_index, VolumeGrid},
};

/// Per-voxel quantity driving saturation or lightness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Intensity,
    Gradient,
    SecondDerivative,
    ThirdDerivative,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Intensity => "intensity",
            Feature::Gradient => "gradient",
            Feature::SecondDerivative => "df2",
            Feature::ThirdDerivative => "df3",
        }
    }
}

/// Parameters of the transfer function.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferConfig {
    pub hue: HuePolicy,
    pub hue_range: HueRange,
    pub saturation: Feature,
    pub lightness: Feature,
    pub emphasis: ColorEmphasis,
    pub thresholds: OpacityThresholds,
    /// Steepness of the opacity emphasis
    pub opacity_k: f64,
    /// Joint histogram classes with fewer voxels are made transparent
    pub rare_bucket_limit: Option<u32>,
}

impl TransferConfig {
    /// Hue follows intensity, saturation the intensity and lightness the
    /// gradient. Square root emphasis.
    /// Joint histogram classes under 100 voxels are made transparent,
    /// `rare_bucket_limit: None` turns the filter off.
    pub fn continuous() -> TransferConfig {
        TransferConfig {
            hue: HuePolicy::Continuous,
            hue_range: HueRange::default(),
            saturation: Feature::Intensity,
            lightness: Feature::Gradient,
            emphasis: ColorEmphasis::SquareRoot,
            thresholds: OpacityThresholds::default(),
            opacity_k: 0.1,
            rare_bucket_limit: Some(100),
        }
    }

    /// Six hue classes, saturation from gradient, lightness from Df2.
    pub fn discrete() -> TransferConfig {
        TransferConfig {
            hue: HuePolicy::Discrete,
            saturation: Feature::Gradient,
            lightness: Feature::SecondDerivative,
            emphasis: ColorEmphasis::Linear { gain: 1.5 },
            ..TransferConfig::continuous()
        }
    }

    fn uses_third(&self) -> bool {
        self.saturation == Feature::ThirdDerivative || self.lightness == Feature::ThirdDerivative
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig::continuous()
    }
}

/// RGBA lookup volume, 4 bytes per voxel in grid order.
#[derive(Clone, PartialEq, Eq)]
pub struct TransferVolume {
    size: Vector3<usize>,
    data: Vec<u8>,
}

impl std::fmt::Debug for TransferVolume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferVolume")
            .field("size", &self.size)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl TransferVolume {
    pub fn size(&self) -> Vector3<usize> {
        self.size
    }

    pub fn texel(&self, x: usize, y: usize, z: usize) -> [u8; 4] {
        let i = 4 * linear_index(self.size, x, y, z);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Raw bytes, ready for a RGBA8 3D texture
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of voxels with nonzero opacity
    pub fn visible_count(&self) -> usize {
        self.data.chunks_exact(4).filter(|t| t[3] != 0).count()
    }
}

// feature value lookup with its observed range
struct FeatureSource<'a> {
    field: Option<&'a MagnitudeField>,
    range: ValueRange,
}

/// Builds [`TransferVolume`]s from the analysed volume.
///
/// Borrowing the stages keeps a rebuild with a new [`TransferConfig`] cheap.
pub struct TransferFunctionBuilder<'a> {
    grid: &'a VolumeGrid,
    derivatives: &'a DerivativeFields,
    stats: &'a HistogramStats,
    joint: &'a JointHistogram,
}

impl<'a> TransferFunctionBuilder<'a> {
    pub fn new(
        grid: &'a VolumeGrid,
        derivatives: &'a DerivativeFields,
        stats: &'a HistogramStats,
        joint: &'a JointHistogram,
    ) -> TransferFunctionBuilder<'a> {
        TransferFunctionBuilder {
            grid,
            derivatives,
            stats,
            joint,
        }
    }

    fn source(&self, feature: Feature) -> Result<FeatureSource<'a>> {
        let derivatives: &'a DerivativeFields = self.derivatives;
        let field = match feature {
            Feature::Intensity => {
                return Ok(FeatureSource {
                    field: None,
                    range: self.stats.data_range(),
                })
            }
            Feature::Gradient => &derivatives.gradient,
            Feature::SecondDerivative => &derivatives.second,
            Feature::ThirdDerivative => {
                derivatives
                    .third
                    .as_ref()
                    .ok_or(PipelineError::MissingField {
                        stage: "transfer",
                        field: feature.name(),
                    })?
            }
        };
        Ok(FeatureSource {
            field: Some(field),
            range: field.range(),
        })
    }

    fn normalized(&self, source: &FeatureSource, index: usize) -> f64 {
        let value = match source.field {
            Some(field) => field.at_index(index),
            None => self.grid.sample_at_index(index),
        };
        let (low, high) = source.range.as_f32();
        norm(low as f64, high as f64, value as f64)
    }

    /// RGBA of one voxel
    fn texel(
        &self,
        config: &TransferConfig,
        saturation: &FeatureSource,
        lightness: &FeatureSource,
        index: usize,
    ) -> [u8; 4] {
        let intensity = self.grid.sample_at_index(index);
        let gradient = self.derivatives.gradient.at_index(index);
        let second = self.derivatives.second.at_index(index);
        let third = self.derivatives.third.as_ref().map(|f| f.at_index(index));

        let hue = config
            .hue_range
            .map(config.hue.base_hue(intensity, self.grid.raw_range()));
        let s = self.normalized(saturation, index);
        let l = self.normalized(lightness, index);
        let rgb = config.emphasis.apply(hsl_to_rgb(hue, s, l));

        let size = self.grid.size();
        let d = (size.x + size.y + size.z) as f64 / 3.0;
        let mut alpha = if config.thresholds.passes(gradient, second, third) {
            opacity(gradient, second, config.opacity_k, d)
        } else {
            0.0
        };
        if let Some(limit) = config.rare_bucket_limit {
            if self.joint.count_for(intensity, gradient) < limit {
                alpha = 0.0;
            }
        }

        [
            to_byte(rgb.x),
            to_byte(rgb.y),
            to_byte(rgb.z),
            to_byte(alpha),
        ]
    }

    /// Fresh RGBA volume for `config`.
    ///
    /// Each voxel depends only on its own features, slices are mapped in
    /// parallel and the output is identical for identical inputs.
    pub fn build(&self, config: &TransferConfig) -> Result<TransferVolume> {
        if config.uses_third() && self.derivatives.third.is_none() {
            return Err(PipelineError::MissingField {
                stage: "transfer",
                field: Feature::ThirdDerivative.name(),
            });
        }
        let saturation = self.source(config.saturation)?;
        let lightness = self.source(config.lightness)?;

        let size = self.grid.size();
        let len = 4 * self.grid.count();
        let plane = 4 * size.x * size.y;

        let mut data = try_alloc::<u8>("transfer", len)?;
        data.resize(len, 0);

        data.par_chunks_mut(plane)
            .enumerate()
            .for_each(|(z, slice)| {
                let first = z * size.x * size.y;
                for (offset, texel) in slice.chunks_exact_mut(4).enumerate() {
                    let rgba = self.texel(config, &saturation, &lightness, first + offset);
                    texel.copy_from_slice(&rgba);
                }
            });

        let volume = TransferVolume { size, data };
        log::info!(
            "Transfer function built ({:?} hue, hue range {}..{}), {} visible voxels",
            config.hue,
            config.hue_range.low,
            config.hue_range.high,
            volume.visible_count()
        );
        Ok(volume)
    }
}

// [0, 1] to byte, truncating
fn to_byte(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0) as u8
}

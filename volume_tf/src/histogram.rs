//! Intensity statistics of a volume.

use crate::{
    common::ValueRange,
    derivative::MagnitudeField,
    error::{try_alloc, Result},
    volumetric::VolumeGrid,
};

/// Buckets per axis of the joint histogram, deciles `0..=9` plus the maximum.
pub const JOINT_BUCKETS: usize = 11;

/// Intensity histogram, its cumulative distribution and moments.
#[derive(Debug, Clone)]
pub struct HistogramStats {
    histogram: Vec<u32>,
    cdf: Vec<f64>,
    count: usize,
    data_range: ValueRange,
    pub mean: f64,
    pub variance: f64,
    /// Coefficient of variation, zero for a volume with zero mean
    pub cv: f64,
}

impl HistogramStats {
    /// Histogram is sized by the format range, not by the observed values.
    pub fn build(grid: &VolumeGrid) -> Result<HistogramStats> {
        let range = grid.raw_range();
        let count = grid.count();

        let mut histogram = try_alloc::<u32>("histogram", range)?;
        histogram.resize(range, 0);
        let mut data_range = ValueRange::empty();

        for index in 0..count {
            let value = grid.sample_at_index(index);
            histogram[value as usize] += 1;
            data_range.extend(value);
        }

        let mut cdf = try_alloc::<f64>("histogram", range)?;
        let mut total = 0u64;
        for &bin in &histogram {
            total += bin as u64;
            cdf.push(total as f64 / count as f64);
        }

        let n = count as f64;
        let mean = histogram
            .iter()
            .enumerate()
            .map(|(i, &h)| i as f64 * h as f64)
            .sum::<f64>()
            / n;
        let variance = histogram
            .iter()
            .enumerate()
            .map(|(i, &h)| h as f64 * (i as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        let cv = if mean == 0.0 {
            0.0
        } else {
            variance.sqrt() / mean
        };

        let stats = HistogramStats {
            histogram,
            cdf,
            count,
            data_range,
            mean,
            variance,
            cv,
        };

        let (window_low, window_high) = stats.intensity_window();
        log::info!(
            "Histogram: data {}..={}, mean {:.3}, std-dev {:.3}, cv {:.3}, \
             peak bin {}, window {:.4}..{:.4}",
            data_range.low,
            data_range.high,
            stats.mean,
            stats.std_dev(),
            stats.cv,
            stats.max_frequency(),
            window_low,
            window_high
        );

        Ok(stats)
    }

    pub fn histogram(&self) -> &[u32] {
        &self.histogram
    }

    /// `cdf()[i]` is the share of voxels with intensity `<= i`
    pub fn cdf(&self) -> &[f64] {
        &self.cdf
    }

    /// Number of voxels counted
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Observed min and max intensity
    pub fn data_range(&self) -> ValueRange {
        self.data_range
    }

    /// Size of the largest bin
    pub fn max_frequency(&self) -> u32 {
        self.histogram.iter().copied().max().unwrap_or(0)
    }

    /// Intensity window with `count / 64` voxels cut from each tail.
    ///
    /// Walks in from both ends until one bin alone holds the remaining tail
    /// budget. Bounds are normalized by the histogram length.
    pub fn intensity_window(&self) -> (f32, f32) {
        let budget = (self.count / 64) as u32;
        let len = self.histogram.len();

        let mut amount = budget;
        let mut low = 0;
        for (i, &bin) in self.histogram.iter().enumerate() {
            if bin >= amount {
                low = i;
                break;
            }
            amount -= bin;
        }

        let mut amount = budget;
        let mut high = len - 1;
        for (i, &bin) in self.histogram.iter().enumerate().rev() {
            if bin >= amount {
                high = i;
                break;
            }
            amount -= bin;
        }

        (low as f32 / len as f32, high as f32 / len as f32)
    }
}

/// Decile bucket of `value` in `0..=max`, the maximum itself lands in bucket 10.
pub fn joint_bucket(value: u32, max: u32) -> usize {
    if max == 0 {
        return 0;
    }
    let t = (value as f32 / max as f32 * 10.0) as usize;
    t.min(JOINT_BUCKETS - 1)
}

/// Intensity x gradient histogram.
///
/// Every bucket also sums the distances between successive member voxels
/// (positions normalized to the unit cube, scan order x, y, z with z fastest,
/// starting from the origin). Scattered classes accumulate a long path,
/// clustered ones a short one.
#[derive(Debug, Clone, PartialEq)]
pub struct JointHistogram {
    counts: [[u32; JOINT_BUCKETS]; JOINT_BUCKETS],
    spatial: [[f64; JOINT_BUCKETS]; JOINT_BUCKETS],
    intensity_max: u32,
    gradient_max: u32,
}

impl JointHistogram {
    pub fn build(
        grid: &VolumeGrid,
        stats: &HistogramStats,
        gradient: &MagnitudeField,
    ) -> JointHistogram {
        let size = grid.size();
        let intensity_max = stats.data_range().high;
        let gradient_max = gradient.range().high;

        let mut counts = [[0; JOINT_BUCKETS]; JOINT_BUCKETS];
        let mut spatial = [[0.0; JOINT_BUCKETS]; JOINT_BUCKETS];
        let mut previous = [[[0.0f64; 3]; JOINT_BUCKETS]; JOINT_BUCKETS];

        // order matters for the path lengths, stays serial
        for x in 0..size.x {
            for y in 0..size.y {
                for z in 0..size.z {
                    let i = joint_bucket(grid.sample(x, y, z), intensity_max);
                    let j = joint_bucket(gradient.get(x, y, z), gradient_max);

                    let pos = [
                        x as f64 / size.x as f64,
                        y as f64 / size.y as f64,
                        z as f64 / size.z as f64,
                    ];
                    let prev = previous[i][j];
                    let dist = ((pos[0] - prev[0]).powi(2)
                        + (pos[1] - prev[1]).powi(2)
                        + (pos[2] - prev[2]).powi(2))
                    .sqrt();

                    counts[i][j] += 1;
                    spatial[i][j] += dist;
                    previous[i][j] = pos;
                }
            }
        }

        let occupied = counts.iter().flatten().filter(|&&c| c > 0).count();
        log::debug!("Joint histogram: {} of 121 buckets occupied", occupied);

        JointHistogram {
            counts,
            spatial,
            intensity_max,
            gradient_max,
        }
    }

    /// Voxels with intensity decile `i` and gradient decile `j`
    pub fn count(&self, i: usize, j: usize) -> u32 {
        self.counts[i][j]
    }

    pub fn spatial(&self, i: usize, j: usize) -> f64 {
        self.spatial[i][j]
    }

    /// Bucket count of the class a voxel with these features falls in
    pub fn count_for(&self, intensity: u32, gradient: u32) -> u32 {
        let i = joint_bucket(intensity, self.intensity_max);
        let j = joint_bucket(gradient, self.gradient_max);
        self.counts[i][j]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().map(|&c| c as u64).sum()
    }
}

#[cfg(test)]
mod test {

    use nalgebra::vector;

    use super::*;
    use crate::{
        derivative::{BoundaryPolicy, DerivativeOrder},
        test_helpers::{ball_grid, constant_grid, ramp_grid, two_face_grid},
    };

    #[test]
    fn constant_histogram() {
        let grid = constant_grid(vector![4, 4, 4], 9);
        let stats = HistogramStats::build(&grid).unwrap();

        assert_eq!(stats.histogram().len(), 256);
        assert_eq!(stats.histogram()[9], 64);
        assert_eq!(stats.histogram().iter().filter(|&&h| h != 0).count(), 1);
        assert_eq!(stats.max_frequency(), 64);
        assert_eq!(stats.mean, 9.0);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.cv, 0.0);
        assert_eq!(stats.data_range(), ValueRange::seed(9));
        assert_eq!(stats.cdf()[8], 0.0);
        assert_eq!(stats.cdf()[9], 1.0);
    }

    #[test]
    fn two_face_moments() {
        let grid = two_face_grid();
        let stats = HistogramStats::build(&grid).unwrap();

        assert!((stats.mean - 127.5).abs() < 1e-9);
        assert!((stats.variance - 127.5 * 127.5).abs() < 1e-6);
        assert!((stats.cv - 1.0).abs() < 1e-9);
        assert_eq!(stats.count(), 8);
        assert!((stats.cdf()[0] - 0.5).abs() < 1e-12);
        assert!((stats.cdf()[254] - 0.5).abs() < 1e-12);
        assert!((stats.cdf()[255] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_volume_has_zero_cv() {
        let grid = constant_grid(vector![2, 3, 4], 0);
        let stats = HistogramStats::build(&grid).unwrap();
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.cv, 0.0);
    }

    #[test]
    fn wide_format_histogram() {
        let grid = ramp_grid(vector![8, 2, 2], 1000);
        let stats = HistogramStats::build(&grid).unwrap();
        assert_eq!(stats.histogram().len(), 65536);
        assert_eq!(stats.histogram()[7000], 4);
        assert_eq!(stats.data_range(), ValueRange { low: 0, high: 7000 });
        assert!((stats.cdf()[65535] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn window_cuts_tails() {
        // 128 voxels, tail budget of two
        let grid = ramp_grid(vector![128, 1, 1], 1);
        let stats = HistogramStats::build(&grid).unwrap();
        let (low, high) = stats.intensity_window();
        assert_eq!(low, 1.0 / 65536.0);
        assert_eq!(high, 126.0 / 65536.0);

        // fewer than 64 voxels, nothing cut
        let grid = constant_grid(vector![2, 2, 2], 40);
        let stats = HistogramStats::build(&grid).unwrap();
        assert_eq!(stats.intensity_window(), (0.0, 255.0 / 256.0));
    }

    #[test]
    fn buckets() {
        assert_eq!(joint_bucket(0, 255), 0);
        assert_eq!(joint_bucket(25, 255), 0);
        assert_eq!(joint_bucket(26, 255), 1);
        assert_eq!(joint_bucket(255, 255), 10);
        assert_eq!(joint_bucket(12, 0), 0);
    }

    #[test]
    fn joint_counts_every_voxel() {
        let grid = ball_grid(8, 2.5, 180);
        let stats = HistogramStats::build(&grid).unwrap();
        let gradient =
            MagnitudeField::compute(&grid, DerivativeOrder::First, BoundaryPolicy::FirstFace)
                .unwrap();
        let joint = JointHistogram::build(&grid, &stats, &gradient);

        assert_eq!(joint.total(), 512);
        // ball interior: full intensity, no gradient
        assert!(joint.count(10, 0) > 0);
        assert_eq!(joint.count_for(180, 0), joint.count(10, 0));
    }

    #[test]
    fn spatial_path_in_scan_order() {
        // single class: path walks z fastest from the origin
        let grid = constant_grid(vector![1, 1, 4], 5);
        let stats = HistogramStats::build(&grid).unwrap();
        let gradient =
            MagnitudeField::compute(&grid, DerivativeOrder::First, BoundaryPolicy::FirstFace)
                .unwrap();
        let joint = JointHistogram::build(&grid, &stats, &gradient);

        assert_eq!(joint.count(10, 0), 4);
        // 0, 0.25, 0.5, 0.75
        assert!((joint.spatial(10, 0) - 0.75).abs() < 1e-12);
    }
}

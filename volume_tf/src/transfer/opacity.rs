/// Minimal derivative magnitudes of a visible voxel.
/// Voxels below any of them are fully transparent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityThresholds {
    pub gradient: u32,
    pub second: u32,
    /// Only checked when the third derivative field was computed
    pub third: Option<u32>,
}

impl Default for OpacityThresholds {
    fn default() -> Self {
        OpacityThresholds {
            gradient: 20,
            second: 10,
            third: Some(10),
        }
    }
}

impl OpacityThresholds {
    pub fn passes(&self, gradient: u32, second: u32, third: Option<u32>) -> bool {
        if gradient < self.gradient || second < self.second {
            return false;
        }
        match (self.third, third) {
            (Some(limit), Some(value)) => value >= limit,
            _ => true,
        }
    }
}

/// Opacity law, result in `[0, 1]`.
///
/// `Ra = -Df2 / gradient` goes through `o = 1 - e^(-Ra)`, then is rescaled
/// against `q = ln(d)` where `d` is the mean side length of the volume:
/// `(e^(-k(1 - o)) - e^(-q)) / (1 - e^(-q))`. Square root brightens faint
/// features.
pub fn opacity(gradient: u32, second: u32, k: f64, characteristic_size: f64) -> f64 {
    if gradient == 0 {
        return 0.0;
    }
    let ra = -(second as f64) / gradient as f64;
    let o = 1.0 - (-ra).exp();

    let floor = (-characteristic_size.ln()).exp();
    let emphasis = (-k * (1.0 - o)).exp();
    let denom = 1.0 - floor;
    let o = if denom.abs() < 1e-4 {
        emphasis
    } else {
        (emphasis - floor) / denom
    };

    o.clamp(0.0, 1.0).sqrt()
}

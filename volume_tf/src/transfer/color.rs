use nalgebra::{vector, Vector3};

pub type RGB = Vector3<f64>;

/// Maps `x` from `[min, max]` to `[0, 1]`.
///
/// When the interval is degenerate (`|max - min| < 1e-4`) `max` is returned
/// as is, no division happens.
pub fn norm(min: f64, max: f64, x: f64) -> f64 {
    if (max - min).abs() < 1e-4 {
        max
    } else {
        (x - min) / (max - min)
    }
}

/// Hue in degrees, saturation and lightness to RGB.
/// Saturation and lightness are clamped to `[0, 1]` first.
#[allow(clippy::many_single_char_names)]
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> RGB {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let h = h.rem_euclid(360.0) / 60.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    vector![r + m, g + m, b + m]
}

/// How the base hue of a voxel is picked from its intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuePolicy {
    /// `intensity / range * 360`
    Continuous,
    /// One of six anchors, by the sixth of the range the intensity falls in
    Discrete,
}

pub const HUE_ANCHORS: [f64; 6] = [30.0, 90.0, 150.0, 210.0, 270.0, 330.0];

impl HuePolicy {
    /// Base hue in degrees, `range` is the raw range of the sample format.
    pub fn base_hue(&self, intensity: u32, range: usize) -> f64 {
        let value = intensity as f64;
        let range = range as f64;
        match self {
            HuePolicy::Continuous => value / range * 360.0,
            HuePolicy::Discrete => {
                // upper bounds are inclusive
                let sixth = (1..6)
                    .find(|&k| value <= range * k as f64 / 6.0)
                    .unwrap_or(6);
                HUE_ANCHORS[sixth - 1]
            }
        }
    }
}

/// Interval of hues the base hue is squeezed into, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueRange {
    pub low: f64,
    pub high: f64,
}

impl HueRange {
    pub fn new(low: f64, high: f64) -> HueRange {
        HueRange { low, high }
    }

    pub fn map(&self, hue: f64) -> f64 {
        self.low + hue / 360.0 * (self.high - self.low)
    }
}

impl Default for HueRange {
    fn default() -> Self {
        HueRange::new(0.0, 360.0)
    }
}

/// Post processing of the RGB channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorEmphasis {
    /// Square root of every channel
    SquareRoot,
    /// Channel times `gain`, clamped to 1
    Linear { gain: f64 },
}

impl ColorEmphasis {
    pub fn apply(&self, rgb: RGB) -> RGB {
        match *self {
            ColorEmphasis::SquareRoot => rgb.map(|c| c.max(0.0).sqrt()),
            ColorEmphasis::Linear { gain } => rgb.map(|c| (c * gain).clamp(0.0, 1.0)),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn close(a: RGB, b: RGB) -> bool {
        (a - b).abs().max() < 1e-9
    }

    #[test]
    fn norm_bounds() {
        assert_eq!(norm(10.0, 20.0, 10.0), 0.0);
        assert_eq!(norm(10.0, 20.0, 20.0), 1.0);
        assert_eq!(norm(10.0, 20.0, 15.0), 0.5);
    }

    #[test]
    fn norm_degenerate_returns_max() {
        assert_eq!(norm(5.0, 5.0, 5.0), 5.0);
        assert_eq!(norm(5.0, 5.00001, 3.0), 5.00001);
        assert_eq!(norm(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn primary_colors() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), vector![1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(120.0, 1.0, 0.5), vector![0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(240.0, 1.0, 0.5), vector![0.0, 0.0, 1.0]));
        assert!(close(hsl_to_rgb(360.0, 1.0, 0.5), vector![1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(60.0, 1.0, 0.5), vector![1.0, 1.0, 0.0]));
    }

    #[test]
    fn gray_and_extremes() {
        assert!(close(hsl_to_rgb(200.0, 0.0, 0.3), vector![0.3, 0.3, 0.3]));
        assert!(close(hsl_to_rgb(90.0, 1.0, 0.0), RGB::zeros()));
        assert!(close(hsl_to_rgb(90.0, 1.0, 1.0), vector![1.0, 1.0, 1.0]));
        // out of range inputs are clamped
        assert!(close(hsl_to_rgb(0.0, 77.0, 0.5), vector![1.0, 0.0, 0.0]));
    }

    #[test]
    fn continuous_hue() {
        assert_eq!(HuePolicy::Continuous.base_hue(0, 256), 0.0);
        assert_eq!(HuePolicy::Continuous.base_hue(128, 256), 180.0);
    }

    #[test]
    fn discrete_hue_anchors() {
        let p = HuePolicy::Discrete;
        assert_eq!(p.base_hue(0, 256), 30.0);
        // 256 / 6 = 42.67
        assert_eq!(p.base_hue(42, 256), 30.0);
        assert_eq!(p.base_hue(43, 256), 90.0);
        assert_eq!(p.base_hue(128, 256), 150.0);
        assert_eq!(p.base_hue(129, 256), 210.0);
        assert_eq!(p.base_hue(255, 256), 330.0);
        assert_eq!(p.base_hue(60000, 65536), 330.0);
    }

    #[test]
    fn hue_range_mapping() {
        let full = HueRange::default();
        assert_eq!(full.map(123.0), 123.0);

        let narrow = HueRange::new(100.0, 200.0);
        assert_eq!(narrow.map(0.0), 100.0);
        assert_eq!(narrow.map(180.0), 150.0);
        assert_eq!(narrow.map(360.0), 200.0);
    }

    #[test]
    fn emphasis() {
        let rgb = vector![0.25, 0.81, 1.0];
        assert!(close(ColorEmphasis::SquareRoot.apply(rgb), vector![0.5, 0.9, 1.0]));
        assert!(close(
            ColorEmphasis::Linear { gain: 1.5 }.apply(rgb),
            vector![0.375, 1.0, 1.0]
        ));
    }
}

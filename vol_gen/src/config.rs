use std::{path::PathBuf, str::FromStr};

use clap::ArgMatches;
use nalgebra::{vector, Vector3};
use volume_tf::volumetric::SampleFormat;

/// Parse single value of argument `key`
fn parse_value<T>(args: &ArgMatches, key: &str) -> Result<T, String>
where
    T: FromStr,
{
    let raw = args
        .value_of(key)
        .ok_or_else(|| format!("missing argument --{key}"))?;
    raw.parse::<T>()
        .map_err(|_| format!("cannot parse --{key} value {raw:?}"))
}

/// Transform `Values` into `Vector`
fn values_to_vector3<T>(args: &ArgMatches, key: &str) -> Result<Vector3<T>, String>
where
    T: FromStr + Copy,
{
    let vals = args
        .values_of(key)
        .ok_or_else(|| format!("missing argument --{key}"))?
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| format!("cannot parse --{key} value {v:?}"))
        })
        .collect::<Result<Vec<T>, String>>()?;
    match vals[..] {
        [x, y, z] => Ok(vector![x, y, z]),
        _ => Err(format!("--{key} takes three values")),
    }
}

/// App configuration
/// Config is built from args parsed by `clap`
#[derive(Debug)]
pub struct Config {
    /// Dimensions of volume
    pub dims: Vector3<u32>,
    /// Type of generator to be used
    pub generator: GeneratorConfig,
    pub format: SampleFormat,
    /// Header file, raw file gets the same stem
    pub header_path: PathBuf,
    /// Optional seed for RNG, to replicate results
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_args(args: &ArgMatches) -> Result<Config, String> {
        let dims = values_to_vector3(args, "dims")?;

        let format_name: String = parse_value(args, "format")?;
        let format = SampleFormat::from_name(&format_name)
            .ok_or_else(|| format!("unknown format {format_name}"))?;

        let generator = GeneratorConfig::from_args(args)?;
        if let Some(sample) = generator.sample() {
            let max = format.raw_range() - 1;
            if sample as usize > max {
                return Err(format!("sample {sample} does not fit {format_name} (max {max})"));
            }
        }

        let header_path = args
            .value_of_os("output-file")
            .map(PathBuf::from)
            .ok_or("missing output file")?;

        let seed = match args.value_of("seed") {
            Some(_) => Some(parse_value(args, "seed")?),
            None => None,
        };

        Ok(Config {
            dims,
            generator,
            format,
            header_path,
            seed,
        })
    }

    /// Raw file written next to the header
    pub fn raw_path(&self) -> PathBuf {
        self.header_path.with_extension("raw")
    }
}

/// Settings specific to generator variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorConfig {
    /// Randomly placed cuboids and spheres
    Shapes {
        n_of_shapes: usize,
        sample: u16,
        obj_size: u32,
    },
    /// Solid block with empty border
    Solid { sample: u16, pad: u32 },
    /// Lower half along z empty, upper half `sample`
    TwoFace { sample: u16 },
    /// Linear ramp along x, `0..=sample`
    Ramp { sample: u16 },
}

impl GeneratorConfig {
    pub fn from_args(args: &ArgMatches) -> Result<GeneratorConfig, String> {
        let name: String = parse_value(args, "generator")?;
        let sample = || parse_value::<u16>(args, "sample");

        let generator = match name.as_str() {
            "shapes" => GeneratorConfig::Shapes {
                n_of_shapes: parse_value(args, "n-of-shapes")?,
                sample: sample()?,
                obj_size: parse_value(args, "object-size")?,
            },
            "solid" => GeneratorConfig::Solid {
                sample: sample()?,
                pad: parse_value(args, "pad")?,
            },
            "two-face" => GeneratorConfig::TwoFace { sample: sample()? },
            "ramp" => GeneratorConfig::Ramp { sample: sample()? },
            other => return Err(format!("unknown generator {other}")),
        };
        Ok(generator)
    }

    pub fn sample(&self) -> Option<u16> {
        match *self {
            GeneratorConfig::Shapes { sample, .. }
            | GeneratorConfig::Solid { sample, .. }
            | GeneratorConfig::TwoFace { sample }
            | GeneratorConfig::Ramp { sample } => Some(sample),
        }
    }
}

use std::{error::Error, fs, io::Write};

use byteorder::{ByteOrder, LittleEndian};
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::{vector, Vector3};
use rayon::prelude::*;
use volume_tf::volumetric::SampleFormat;

use crate::{
    config::{Config, GeneratorConfig},
    file::open_create_file,
    header::generate_header,
};

mod shapes;
mod solid;
mod split;

// Generates one sample at a time, at any location
pub trait SampleGenerator: Sync {
    fn sample_at(&self, coords: Vector3<u32>) -> u16;
}

pub fn get_sample_generator(config: &Config) -> Box<dyn SampleGenerator> {
    match config.generator {
        GeneratorConfig::Shapes {
            n_of_shapes,
            sample,
            obj_size,
        } => Box::new(shapes::ShapesGenerator::new(
            config.dims,
            n_of_shapes,
            sample,
            obj_size,
            config.seed,
        )),
        GeneratorConfig::Solid { sample, pad } => {
            Box::new(solid::SolidGenerator::new(config.dims, sample, pad))
        }
        GeneratorConfig::TwoFace { sample } => {
            Box::new(split::TwoFaceGenerator::new(config.dims, sample))
        }
        GeneratorConfig::Ramp { sample } => {
            Box::new(split::RampGenerator::new(config.dims, sample))
        }
    }
}

/// Samples of the whole volume in file order, x fastest.
/// Slices along z are generated in parallel.
pub fn generate_samples(sg: &dyn SampleGenerator, dims: Vector3<u32>) -> Vec<u16> {
    let plane = (dims.x * dims.y) as usize;
    let mut samples = vec![0; plane * dims.z as usize];

    let progress = ProgressBar::new(dims.z as u64);
    progress.set_style(
        ProgressStyle::default_bar().template("{bar:40} {pos}/{len} slices, eta {eta}"),
    );

    samples
        .par_chunks_mut(plane)
        .enumerate()
        .for_each(|(z, slice)| {
            for y in 0..dims.y {
                for x in 0..dims.x {
                    slice[(y * dims.x + x) as usize] = sg.sample_at(vector![x, y, z as u32]);
                }
            }
            progress.inc(1);
        });

    progress.finish_and_clear();
    samples
}

/// Serialize samples, `USHORT` is little-endian
pub fn encode_samples(samples: &[u16], format: SampleFormat) -> Vec<u8> {
    match format {
        SampleFormat::UChar => samples.iter().map(|&s| s as u8).collect(),
        SampleFormat::UShort => {
            let mut bytes = vec![0; samples.len() * 2];
            LittleEndian::write_u16_into(samples, &mut bytes);
            bytes
        }
    }
}

pub fn generate_vol(config: &Config) -> Result<(), Box<dyn Error>> {
    let gen = get_sample_generator(config);

    let samples = generate_samples(gen.as_ref(), config.dims);
    let bytes = encode_samples(&samples, config.format);

    if let Some(dir) = config.header_path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let raw_path = config.raw_path();
    let mut raw = open_create_file(&raw_path)?;
    raw.write_all(&bytes)?;

    let header = generate_header(config);
    let mut file = open_create_file(&config.header_path)?;
    file.write_all(header.to_text().as_bytes())?;

    log::info!(
        "Generating finished, {} bytes in {:?}, header {:?}",
        bytes.len(),
        raw_path,
        config.header_path
    );
    Ok(())
}

#[cfg(test)]
mod test {

    use std::path::PathBuf;

    use volume_tf::volumetric;

    use super::*;

    #[test]
    fn encoding() {
        assert_eq!(encode_samples(&[1, 255], SampleFormat::UChar), vec![1, 255]);
        assert_eq!(
            encode_samples(&[1, 0x1234], SampleFormat::UShort),
            vec![1, 0, 0x34, 0x12]
        );
    }

    #[test]
    fn generated_volume_loads() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("vol_gen-test-{}", std::process::id()));
        let cfg = Config {
            dims: vector![4, 3, 2],
            generator: GeneratorConfig::Ramp { sample: 300 },
            format: SampleFormat::UShort,
            header_path: dir.join("ramp.dat"),
            seed: None,
        };
        generate_vol(&cfg).unwrap();

        let grid = volumetric::load(&cfg.header_path).unwrap();
        assert_eq!(grid.size(), vector![4, 3, 2]);
        assert_eq!(grid.sample(0, 1, 1), 0);
        assert_eq!(grid.sample(3, 2, 1), 300);
        assert_eq!(cfg.raw_path(), dir.join(PathBuf::from("ramp.raw")));
    }
}

use std::path::PathBuf;

use clap::ArgMatches;
use volume_tf::{derivative::BoundaryPolicy, transfer::TransferConfig, PipelineOptions};

use crate::defaults;

/// Viewer configuration
#[derive(Debug)]
pub struct Config {
    pub header_path: PathBuf,
    pub options: PipelineOptions,
    pub resolution: (usize, usize),
    pub shading: bool,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_args(args: &ArgMatches) -> Result<Config, String> {
        let header_path = args
            .value_of("header")
            .map(PathBuf::from)
            .ok_or("Missing dataset header")?;

        let boundary = match args.value_of("boundary").unwrap_or(defaults::BOUNDARY) {
            "first-face" => BoundaryPolicy::FirstFace,
            "all-axes" => BoundaryPolicy::AllAxes,
            other => return Err(format!("Unknown boundary policy {other}")),
        };

        let transfer = match args.value_of("preset").unwrap_or(defaults::PRESET) {
            "continuous" => TransferConfig::continuous(),
            "discrete" => TransferConfig::discrete(),
            other => return Err(format!("Unknown preset {other}")),
        };

        let resolution = match args.values_of("resolution") {
            Some(vals) => {
                let vals = vals
                    .map(|v| v.parse::<usize>().map_err(|e| format!("Resolution: {e}")))
                    .collect::<Result<Vec<_>, _>>()?;
                match vals[..] {
                    [w, h] if w > 0 && h > 0 => (w, h),
                    _ => return Err("Resolution needs two positive values".into()),
                }
            }
            None => (defaults::RENDER_WIDTH, defaults::RENDER_HEIGHT),
        };

        let options = PipelineOptions {
            boundary,
            third_order: !args.is_present("no-third-order"),
            smooth: args.is_present("smooth"),
            transfer,
        };

        Ok(Config {
            header_path,
            options,
            resolution,
            shading: args.is_present("shading"),
            output_dir: PathBuf::from(args.value_of("output-dir").unwrap_or(defaults::OUTPUT_DIR)),
        })
    }
}

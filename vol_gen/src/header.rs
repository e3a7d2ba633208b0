use std::path::PathBuf;

use nalgebra::vector;
use volume_tf::volumetric::DatasetHeader;

use crate::config::Config;

/// Header describing the generated raw file.
/// The raw file is referenced by name only, it lives next to the header.
pub fn generate_header(cfg: &Config) -> DatasetHeader {
    let raw_path = cfg.raw_path();
    let object_file_name = raw_path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or(raw_path);

    DatasetHeader {
        object_file_name,
        resolution: vector![
            cfg.dims.x as usize,
            cfg.dims.y as usize,
            cfg.dims.z as usize
        ],
        format: cfg.format,
    }
}

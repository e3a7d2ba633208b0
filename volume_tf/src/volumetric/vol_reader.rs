use std::{fs::File, path::Path};

use byteorder::{ByteOrder, LittleEndian};
use memmap::{Mmap, MmapOptions};
use nalgebra::Vector3;

use super::{
    checked_voxel_count,
    header::{parse_header, DatasetHeader},
    SampleFormat, Samples, VolumeGrid,
};
use crate::error::{try_alloc, PipelineError, Result};

const STAGE: &str = "load";

fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        stage: STAGE,
        path: path.to_owned(),
        source,
    }
}

/// Load volume described by header file at `header_path`.
///
/// The raw file named in the header is looked up next to the header.
pub fn load<P>(header_path: P) -> Result<VolumeGrid>
where
    P: AsRef<Path>,
{
    let header_path = header_path.as_ref();
    log::info!("Reading data description file {header_path:?}");

    let text = std::fs::read_to_string(header_path).map_err(|e| io_error(header_path, e))?;
    let header = parse_header(&text, header_path)?;

    let raw_path = header.raw_path(header_path);
    log::info!(
        "Loading raw file {raw_path:?}, resolution {}x{}x{}, format {}",
        header.resolution.x,
        header.resolution.y,
        header.resolution.z,
        header.format.name()
    );

    read_raw(&raw_path, &header)
}

/// Memory map raw file.
/// Empty files cannot be mapped, `None` is returned for them.
fn map_file(path: &Path) -> Result<Option<Mmap>> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let len = file.metadata().map_err(|e| io_error(path, e))?.len();
    if len == 0 {
        return Ok(None);
    }
    let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|e| io_error(path, e))?;
    Ok(Some(mmap))
}

/// Read samples of `header` from the raw file at `raw_path`.
pub fn read_raw(raw_path: &Path, header: &DatasetHeader) -> Result<VolumeGrid> {
    let size: Vector3<usize> = header.resolution;
    let too_large = || PipelineError::Header {
        path: raw_path.to_owned(),
        reason: format!("resolution {}x{}x{} is too large", size.x, size.y, size.z),
    };
    let count = checked_voxel_count(size).ok_or_else(too_large)?;
    let needed = count
        .checked_mul(header.format.bytes_per_sample())
        .ok_or_else(too_large)?;

    let mmap = map_file(raw_path)?;
    let bytes: &[u8] = match &mmap {
        Some(m) => &m[..],
        None => &[],
    };

    if bytes.len() < needed {
        return Err(PipelineError::RawSize {
            path: raw_path.to_owned(),
            expected: needed,
            found: bytes.len(),
        });
    }
    if bytes.len() > needed {
        log::warn!(
            "{raw_path:?} has {} trailing bytes, ignored",
            bytes.len() - needed
        );
    }
    let bytes = &bytes[..needed];

    let samples = match header.format {
        SampleFormat::UChar => {
            let mut data = try_alloc::<u8>(STAGE, count)?;
            data.extend_from_slice(bytes);
            Samples::U8(data)
        }
        SampleFormat::UShort => {
            let mut data = try_alloc::<u16>(STAGE, count)?;
            data.resize(count, 0);
            LittleEndian::read_u16_into(bytes, &mut data);
            Samples::U16(data)
        }
    };

    log::info!("Loading data done, {count} samples");
    VolumeGrid::new(size, samples)
}

#[cfg(test)]
mod test {

    use std::path::PathBuf;

    use nalgebra::vector;

    use super::*;
    use crate::test_helpers::{scratch_dir, write_dataset};

    #[test]
    fn loads_written_dataset() {
        let data: Vec<u16> = (0..60).map(|v| v * 1000).collect();
        let grid = VolumeGrid::new(vector![3, 4, 5], Samples::U16(data)).unwrap();
        let dir = scratch_dir("loads_written_dataset");
        let header = write_dataset(&dir, "ramp", &grid);

        let loaded = load(&header).unwrap();
        assert_eq!(loaded, grid);
        assert_eq!(loaded.sample(2, 3, 4), 59000);
    }

    #[test]
    fn missing_header() {
        let err = load("surely/not/here.dat").unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
        assert!(err.to_string().contains("here.dat"));
    }

    #[test]
    fn missing_raw() {
        let dir = scratch_dir("missing_raw");
        let header = dir.join("lonely.dat");
        std::fs::write(
            &header,
            "ObjectFileName: lonely.raw\nResolution: 2 2 2\nFormat: UCHAR\n",
        )
        .unwrap();

        let err = load(&header).unwrap_err();
        match err {
            PipelineError::Io { path, .. } => assert_eq!(path, dir.join("lonely.raw")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn short_raw() {
        let dir = scratch_dir("short_raw");
        std::fs::write(dir.join("short.raw"), [1u8, 2, 3]).unwrap();
        let header = DatasetHeader {
            object_file_name: PathBuf::from("short.raw"),
            resolution: vector![2, 2, 1],
            format: SampleFormat::UShort,
        };

        let err = read_raw(&dir.join("short.raw"), &header).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::RawSize {
                expected: 8,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn wrapping_resolution_rejected() {
        let dir = scratch_dir("wrapping_resolution");
        std::fs::write(dir.join("wrap.raw"), [1u8, 2, 3, 4]).unwrap();
        let header = dir.join("wrap.dat");
        std::fs::write(
            &header,
            "ObjectFileName: wrap.raw\nResolution: 2 2147549185 4294836226\nFormat: UCHAR\n",
        )
        .unwrap();
        let err = load(&header).unwrap_err();
        assert!(matches!(err, PipelineError::Header { .. }));

        // header built in code skips the parser checks
        let parsed = DatasetHeader {
            object_file_name: PathBuf::from("wrap.raw"),
            resolution: vector![2, 2_147_549_185, 4_294_836_226],
            format: SampleFormat::UChar,
        };
        let err = read_raw(&dir.join("wrap.raw"), &parsed).unwrap_err();
        assert!(matches!(err, PipelineError::Header { .. }));
    }
}

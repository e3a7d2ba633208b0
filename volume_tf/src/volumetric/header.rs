//! Dataset description file.
//!
//! Line oriented text, one `Key: value` pair per line:
//! ```text
//! ObjectFileName: head.raw
//! Resolution: 256 256 113
//! Format: UCHAR
//! ```
//! Unknown keys and lines without a key are ignored.

use std::path::{Path, PathBuf};

use nalgebra::{vector, Vector3};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char as nom_char, space0, space1, u32 as nom_u32},
    combinator::rest,
    sequence::{delimited, preceded, separated_pair, tuple},
    IResult,
};

use super::{checked_voxel_count, SampleFormat};
use crate::error::{PipelineError, Result};

/// Parsed header.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetHeader {
    /// Raw file, as written in the header
    pub object_file_name: PathBuf,
    pub resolution: Vector3<usize>,
    pub format: SampleFormat,
}

impl DatasetHeader {
    /// Location of the raw file.
    /// Relative names are resolved against the directory of the header.
    pub fn raw_path(&self, header_path: &Path) -> PathBuf {
        if self.object_file_name.is_absolute() {
            return self.object_file_name.clone();
        }
        match header_path.parent() {
            Some(dir) => dir.join(&self.object_file_name),
            None => self.object_file_name.clone(),
        }
    }

    /// Serialize back to header text.
    pub fn to_text(&self) -> String {
        format!(
            "ObjectFileName: {}\nResolution: {} {} {}\nFormat: {}\n",
            self.object_file_name.display(),
            self.resolution.x,
            self.resolution.y,
            self.resolution.z,
            self.format.name()
        )
    }
}

fn key_value(line: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        preceded(
            space0,
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        ),
        delimited(space0, nom_char(':'), space0),
        rest,
    )(line)
}

fn resolution(s: &str) -> IResult<&str, (u32, u32, u32)> {
    tuple((
        preceded(space0, nom_u32),
        preceded(space1, nom_u32),
        preceded(space1, nom_u32),
    ))(s)
}

/// Parse header `text`. `path` is used for error reporting only.
pub fn parse_header(text: &str, path: &Path) -> Result<DatasetHeader> {
    let malformed = |reason: String| PipelineError::Header {
        path: path.to_owned(),
        reason,
    };

    let mut object_file_name = None;
    let mut size = None;
    let mut format = None;

    for line in text.lines() {
        let (key, value) = match key_value(line) {
            Ok((_, kv)) => kv,
            Err(_) => continue,
        };
        let value = value.trim();

        match key {
            "ObjectFileName" => {
                let name = value
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| malformed("empty ObjectFileName".into()))?;
                object_file_name = Some(PathBuf::from(name));
            }
            "Resolution" => {
                let (_, (x, y, z)) = resolution(value)
                    .map_err(|_| malformed(format!("cannot parse Resolution {value:?}")))?;
                if x == 0 || y == 0 || z == 0 {
                    return Err(malformed(format!("zero dimension in Resolution {value:?}")));
                }
                let dims = vector![x as usize, y as usize, z as usize];
                checked_voxel_count(dims)
                    .ok_or_else(|| malformed(format!("Resolution {value:?} is too large")))?;
                size = Some(dims);
            }
            "Format" => {
                let name = value.split_whitespace().next().unwrap_or("");
                let parsed = SampleFormat::from_name(name).ok_or_else(|| PipelineError::Format {
                    path: path.to_owned(),
                    format: name.to_owned(),
                })?;
                format = Some(parsed);
            }
            _ => log::debug!("skipping header line {line:?}"),
        }
    }

    Ok(DatasetHeader {
        object_file_name: object_file_name
            .ok_or_else(|| malformed("missing ObjectFileName".into()))?,
        resolution: size.ok_or_else(|| malformed("missing Resolution".into()))?,
        format: format.ok_or_else(|| malformed("missing Format".into()))?,
    })
}

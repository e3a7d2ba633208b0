use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions of the analysis pipeline.
///
/// None of these are retried, the caller is expected to report and abort.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage}: cannot read {path:?}: {source}")]
    Io {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("load: unsupported sample format {format:?} in {path:?}, expected UCHAR or USHORT")]
    Format { path: PathBuf, format: String },

    #[error("load: malformed header {path:?}: {reason}")]
    Header { path: PathBuf, reason: String },

    #[error("load: raw file {path:?} holds {found} bytes, {expected} needed")]
    RawSize {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("grid: {found} samples do not fill a {dims} volume")]
    Shape { dims: String, found: usize },

    #[error("{stage}: {field} field is used but was not computed")]
    MissingField {
        stage: &'static str,
        field: &'static str,
    },

    #[error("{stage}: cannot allocate {bytes} bytes")]
    Allocation { stage: &'static str, bytes: usize },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Allocates an empty vector able to hold `len` elements without growing.
///
/// Allocation failure is reported instead of aborting the process.
pub(crate) fn try_alloc<T>(stage: &'static str, len: usize) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| PipelineError::Allocation {
            stage,
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    Ok(vec)
}

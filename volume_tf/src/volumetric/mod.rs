//! Sampled scalar field and its on-disk representation.

mod field;
mod filter;
mod grid;
pub mod header;
mod vol_reader;

pub use field::{checked_voxel_count, linear_index, ScalarField};
pub use filter::box_smooth;
pub use grid::{SampleFormat, Samples, VolumeGrid};
pub use header::DatasetHeader;
pub use vol_reader::{load, read_raw};

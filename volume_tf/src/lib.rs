//! Volume analysis and transfer-function pipeline for GPU style ray casting.
//!
//! Stages run in order: [`volumetric::VolumeGrid`] is loaded from a header/raw
//! pair, [`derivative::DerivativeFields`] and [`histogram::HistogramStats`]
//! are derived from it, and [`transfer::TransferFunctionBuilder`] maps every
//! voxel to an RGBA sample. [`pipeline::PipelineContext`] ties the stages
//! together and owns the buffer handed to the renderer.

pub mod common;
pub mod derivative;
pub mod error;
pub mod histogram;
pub mod pipeline;
pub mod render;
pub mod test_helpers;
pub mod transfer;
pub mod volumetric;

pub use error::{PipelineError, Result};
pub use pipeline::{PipelineContext, PipelineOptions};

//! Pipeline context.
//!
//! Owns every analysis stage of one dataset together with the interactive
//! render controls. The transfer volume is published through
//! [`SharedTransfer`], readers always see a complete buffer.

use std::{path::Path, sync::Arc};

use parking_lot::RwLock;

use crate::{
    derivative::{BoundaryPolicy, DerivativeFields},
    error::Result,
    histogram::{HistogramStats, JointHistogram},
    render::{RenderParams, ViewMode},
    transfer::{HueRange, TransferConfig, TransferFunctionBuilder, TransferVolume},
    volumetric::{self, box_smooth, VolumeGrid},
};

/// Analysis options, fixed for the lifetime of a context
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub boundary: BoundaryPolicy,
    /// Compute Df3, also enables its opacity threshold
    pub third_order: bool,
    /// 3x3x3 mean filter before differentiation
    pub smooth: bool,
    pub transfer: TransferConfig,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            boundary: BoundaryPolicy::FirstFace,
            third_order: true,
            smooth: false,
            transfer: TransferConfig::continuous(),
        }
    }
}

pub const STEP_DEFAULT: f32 = 1.0 / 1000.0;
pub const STEP_MIN: f32 = 1.0 / 200.0;
pub const STEP_MAX: f32 = 0.25;
pub const STEP_DELTA: f32 = 1.0 / 2048.0;

pub const HUE_DELTA: f64 = 5.0;

pub const LUMINANCE_DEFAULT: f32 = 10.0;
pub const LUMINANCE_MIN: f32 = 0.00001;
pub const LUMINANCE_MAX: f32 = 100.0;

/// User adjustable render state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderControls {
    step_size: f32,
    hue_range: HueRange,
    luminance: f32,
    view: ViewMode,
}

impl Default for RenderControls {
    fn default() -> Self {
        RenderControls {
            step_size: STEP_DEFAULT,
            hue_range: HueRange::default(),
            luminance: LUMINANCE_DEFAULT,
            view: ViewMode::Composite,
        }
    }
}

impl RenderControls {
    pub fn step_size(&self) -> f32 {
        self.step_size
    }

    pub fn hue_range(&self) -> HueRange {
        self.hue_range
    }

    pub fn luminance(&self) -> f32 {
        self.luminance
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Result of every adjustment lands in `[STEP_MIN, STEP_MAX]`,
    /// the initial value may lie below.
    pub fn adjust_step(&mut self, delta: f32) {
        self.step_size = (self.step_size + delta).clamp(STEP_MIN, STEP_MAX);
    }

    /// Hue bounds stay within `[0, 360]` and `low <= high`
    pub fn adjust_hue(&mut self, d_low: f64, d_high: f64) {
        let high = (self.hue_range.high + d_high).clamp(0.0, 360.0);
        let low = (self.hue_range.low + d_low).clamp(0.0, high);
        self.hue_range = HueRange::new(low, high.max(low));
    }

    pub fn set_luminance(&mut self, luminance: f32) {
        self.luminance = luminance.clamp(LUMINANCE_MIN, LUMINANCE_MAX);
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.next();
    }

    /// Uniforms for a frame of the given size
    pub fn render_params(&self, resolution: (usize, usize)) -> RenderParams {
        RenderParams {
            resolution,
            step_size: self.step_size,
            luminance: self.luminance,
            view: self.view,
            ..Default::default()
        }
    }
}

/// Interactive commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    StepUp,
    StepDown,
    HueHighUp,
    HueHighDown,
    HueLowUp,
    HueLowDown,
    ToggleView,
    SetLuminance(f32),
}

/// Handle to the current transfer volume.
///
/// A rebuild creates a new buffer and swaps it in under the write lock.
/// Clones share the same slot.
#[derive(Debug, Clone)]
pub struct SharedTransfer {
    slot: Arc<RwLock<(u64, Arc<TransferVolume>)>>,
}

impl SharedTransfer {
    pub fn new(volume: TransferVolume) -> SharedTransfer {
        SharedTransfer {
            slot: Arc::new(RwLock::new((0, Arc::new(volume)))),
        }
    }

    pub fn current(&self) -> Arc<TransferVolume> {
        self.slot.read().1.clone()
    }

    /// Current buffer with its generation, incremented on every swap
    pub fn snapshot(&self) -> (u64, Arc<TransferVolume>) {
        let lock = self.slot.read();
        (lock.0, lock.1.clone())
    }

    pub fn generation(&self) -> u64 {
        self.slot.read().0
    }

    fn replace(&self, volume: TransferVolume) {
        let volume = Arc::new(volume);
        let mut lock = self.slot.write();
        lock.0 += 1;
        lock.1 = volume;
    }
}

/// All stages of one dataset
pub struct PipelineContext {
    grid: Arc<VolumeGrid>,
    derivatives: DerivativeFields,
    stats: HistogramStats,
    joint: JointHistogram,
    options: PipelineOptions,
    controls: RenderControls,
    transfer: SharedTransfer,
}

impl PipelineContext {
    /// Load dataset from header file and run all stages
    pub fn load<P>(header_path: P, options: PipelineOptions) -> Result<PipelineContext>
    where
        P: AsRef<Path>,
    {
        let grid = volumetric::load(header_path)?;
        PipelineContext::from_grid(grid, options)
    }

    pub fn from_grid(grid: VolumeGrid, options: PipelineOptions) -> Result<PipelineContext> {
        let grid = if options.smooth {
            box_smooth(&grid)?
        } else {
            grid
        };

        let derivatives = DerivativeFields::compute(&grid, options.boundary, options.third_order)?;
        let stats = HistogramStats::build(&grid)?;
        let joint = JointHistogram::build(&grid, &stats, &derivatives.gradient);

        let controls = RenderControls {
            hue_range: options.transfer.hue_range,
            ..Default::default()
        };

        let transfer = TransferFunctionBuilder::new(&grid, &derivatives, &stats, &joint)
            .build(&options.transfer)?;

        Ok(PipelineContext {
            grid: Arc::new(grid),
            derivatives,
            stats,
            joint,
            options,
            controls,
            transfer: SharedTransfer::new(transfer),
        })
    }

    pub fn grid(&self) -> &Arc<VolumeGrid> {
        &self.grid
    }

    pub fn derivatives(&self) -> &DerivativeFields {
        &self.derivatives
    }

    pub fn stats(&self) -> &HistogramStats {
        &self.stats
    }

    pub fn joint(&self) -> &JointHistogram {
        &self.joint
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn controls(&self) -> &RenderControls {
        &self.controls
    }

    /// Handle for the renderer side
    pub fn transfer(&self) -> SharedTransfer {
        self.transfer.clone()
    }

    /// Transfer config with the current hue range
    pub fn transfer_config(&self) -> TransferConfig {
        TransferConfig {
            hue_range: self.controls.hue_range,
            ..self.options.transfer.clone()
        }
    }

    /// Build a new transfer volume and publish it
    pub fn rebuild_transfer(&mut self) -> Result<()> {
        let volume =
            TransferFunctionBuilder::new(&self.grid, &self.derivatives, &self.stats, &self.joint)
                .build(&self.transfer_config())?;
        self.transfer.replace(volume);
        Ok(())
    }

    /// Apply a command, hue changes rebuild the transfer volume.
    /// Returns whether a rebuild happened.
    pub fn apply(&mut self, command: Command) -> Result<bool> {
        let hue_before = self.controls.hue_range;
        match command {
            Command::StepUp => self.controls.adjust_step(STEP_DELTA),
            Command::StepDown => self.controls.adjust_step(-STEP_DELTA),
            Command::HueHighUp => self.controls.adjust_hue(0.0, HUE_DELTA),
            Command::HueHighDown => self.controls.adjust_hue(0.0, -HUE_DELTA),
            Command::HueLowUp => self.controls.adjust_hue(HUE_DELTA, 0.0),
            Command::HueLowDown => self.controls.adjust_hue(-HUE_DELTA, 0.0),
            Command::ToggleView => self.controls.toggle_view(),
            Command::SetLuminance(l) => self.controls.set_luminance(l),
        }
        log::debug!("{:?} -> {:?}", command, self.controls);

        if self.controls.hue_range != hue_before {
            self.rebuild_transfer()?;
            return Ok(true);
        }
        Ok(false)
    }
}

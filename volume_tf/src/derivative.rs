//! Finite difference derivative fields.
//!
//! The same stencil produces every order: the gradient magnitude is taken of
//! the scalar volume, the second derivative ("Df2") of the gradient magnitude
//! field and the third ("Df3") of the Df2 field.

use nalgebra::{vector, Vector3};
use rayon::prelude::*;

use crate::{
    common::ValueRange,
    error::{try_alloc, Result},
    volumetric::{linear_index, ScalarField},
};

/// Stencil used on voxels lying on a boundary face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Faces are tested in the order x=0, x=max, y=0, y=max, z=0, z=max.
    /// Only the first matching axis gets a one-sided difference, the other
    /// two partials stay zero. Output compatible with the legacy renderer.
    #[default]
    FirstFace,
    /// Each axis is handled on its own: one-sided difference on the axes where
    /// the voxel touches a face, central difference on the rest.
    AllAxes,
}

/// Order of a derived field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeOrder {
    First,
    Second,
    Third,
}

impl DerivativeOrder {
    /// Factor applied to every partial.
    /// The first order stays unscaled for compatibility with existing tables.
    pub fn scale(&self) -> f64 {
        match self {
            DerivativeOrder::First => 1.0,
            DerivativeOrder::Second | DerivativeOrder::Third => 0.5,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            DerivativeOrder::First => "gradient",
            DerivativeOrder::Second => "df2",
            DerivativeOrder::Third => "df3",
        }
    }
}

// f(p + 1) - f(p) along axis, zero for a single voxel thick axis
fn forward<F: ScalarField + ?Sized>(field: &F, p: Vector3<usize>, axis: usize) -> f64 {
    if p[axis] + 1 >= field.size()[axis] {
        return 0.0;
    }
    let mut n = p;
    n[axis] += 1;
    field.value(n.x, n.y, n.z) - field.value(p.x, p.y, p.z)
}

// f(p) - f(p - 1) along axis
fn backward<F: ScalarField + ?Sized>(field: &F, p: Vector3<usize>, axis: usize) -> f64 {
    if p[axis] == 0 {
        return 0.0;
    }
    let mut n = p;
    n[axis] -= 1;
    field.value(p.x, p.y, p.z) - field.value(n.x, n.y, n.z)
}

// f(p + 1) - f(p - 1) along axis, caller guarantees interior position
fn central<F: ScalarField + ?Sized>(field: &F, p: Vector3<usize>, axis: usize) -> f64 {
    let mut hi = p;
    let mut lo = p;
    hi[axis] += 1;
    lo[axis] -= 1;
    field.value(hi.x, hi.y, hi.z) - field.value(lo.x, lo.y, lo.z)
}

/// Partial derivatives of `field` at voxel `(x, y, z)`, each multiplied by `scale`.
pub fn partials<F: ScalarField + ?Sized>(
    field: &F,
    x: usize,
    y: usize,
    z: usize,
    scale: f64,
    policy: BoundaryPolicy,
) -> Vector3<f64> {
    let size = field.size();
    let p = vector![x, y, z];
    let on_low = |axis: usize| p[axis] == 0;
    let on_high = |axis: usize| p[axis] == size[axis] - 1;

    let interior = (0..3).all(|axis| !on_low(axis) && !on_high(axis));
    if interior {
        return vector![central(field, p, 0), central(field, p, 1), central(field, p, 2)] * scale;
    }

    let mut d = Vector3::zeros();
    match policy {
        BoundaryPolicy::FirstFace => {
            // first face hit wins, the last branch is z == max
            if on_low(0) {
                d.x = forward(field, p, 0);
            } else if on_high(0) {
                d.x = backward(field, p, 0);
            } else if on_low(1) {
                d.y = forward(field, p, 1);
            } else if on_high(1) {
                d.y = backward(field, p, 1);
            } else if on_low(2) {
                d.z = forward(field, p, 2);
            } else {
                d.z = backward(field, p, 2);
            }
        }
        BoundaryPolicy::AllAxes => {
            for axis in 0..3 {
                d[axis] = if on_low(axis) {
                    forward(field, p, axis)
                } else if on_high(axis) {
                    backward(field, p, axis)
                } else {
                    central(field, p, axis)
                };
            }
        }
    }
    d * scale
}

/// One magnitude per voxel, truncated to an integer, with its observed range.
#[derive(Clone, PartialEq)]
pub struct MagnitudeField {
    size: Vector3<usize>,
    values: Vec<u32>,
    range: ValueRange,
}

impl std::fmt::Debug for MagnitudeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagnitudeField")
            .field("size", &self.size)
            .field("range", &self.range)
            .finish()
    }
}

impl MagnitudeField {
    /// Compute magnitude of the finite difference partials of `field`.
    ///
    /// Sweeps z-slices in parallel. The min/max of every slice is merged
    /// afterwards, result does not depend on scheduling.
    pub fn compute<F: ScalarField + ?Sized>(
        field: &F,
        order: DerivativeOrder,
        policy: BoundaryPolicy,
    ) -> Result<MagnitudeField> {
        let size = field.size();
        let count = field.voxel_count();
        let plane = size.x * size.y;
        let scale = order.scale();

        let mut values = try_alloc::<u32>(order.stage(), count)?;
        values.resize(count, 0);

        let range = values
            .par_chunks_mut(plane)
            .enumerate()
            .map(|(z, slice)| {
                let mut range = ValueRange::empty();
                for y in 0..size.y {
                    for x in 0..size.x {
                        let magnitude = partials(field, x, y, z, scale, policy).norm() as u32;
                        slice[y * size.x + x] = magnitude;
                        range.extend(magnitude);
                    }
                }
                range
            })
            .reduce(ValueRange::empty, ValueRange::merge);

        log::debug!(
            "{} field done, range {}..={}",
            order.stage(),
            range.low,
            range.high
        );

        Ok(MagnitudeField {
            size,
            values,
            range,
        })
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> u32 {
        self.values[linear_index(self.size, x, y, z)]
    }

    pub fn at_index(&self, index: usize) -> u32 {
        self.values[index]
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Observed min and max over the whole field
    pub fn range(&self) -> ValueRange {
        self.range
    }
}

impl ScalarField for MagnitudeField {
    fn size(&self) -> Vector3<usize> {
        self.size
    }

    #[inline]
    fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        self.get(x, y, z) as f64
    }
}

/// Gradient, Df2 and optionally Df3 of a volume.
#[derive(Debug, Clone)]
pub struct DerivativeFields {
    pub gradient: MagnitudeField,
    pub second: MagnitudeField,
    pub third: Option<MagnitudeField>,
}

impl DerivativeFields {
    /// Each order is derived from the previous one.
    pub fn compute<F: ScalarField + ?Sized>(
        field: &F,
        policy: BoundaryPolicy,
        third_order: bool,
    ) -> Result<DerivativeFields> {
        let gradient = MagnitudeField::compute(field, DerivativeOrder::First, policy)?;
        let second = MagnitudeField::compute(&gradient, DerivativeOrder::Second, policy)?;
        let third = if third_order {
            Some(MagnitudeField::compute(
                &second,
                DerivativeOrder::Third,
                policy,
            )?)
        } else {
            None
        };

        log::info!(
            "Derivatives computed, gradient {}..={}, df2 {}..={}",
            gradient.range().low,
            gradient.range().high,
            second.range().low,
            second.range().high
        );

        Ok(DerivativeFields {
            gradient,
            second,
            third,
        })
    }
}

//! Masked arrays: a value array paired with a same-shaped mask.
//!
//! MOHID results are only meaningful over water, so every extracted field
//! travels with a mask. The representation is deliberately simple: an
//! `ndarray` of values and an `ndarray` of booleans with identical shape.

use ndarray::{s, Array, Axis, Dimension, Ix2, Ix3, NdIndex, RemoveAxis};
use thiserror::Error;

/// Masked 2D array, `(latitude, longitude)`.
pub type MaskedArray2 = MaskedArray<Ix2>;

/// Masked 3D array, `(time, latitude, longitude)`.
pub type MaskedArray3 = MaskedArray<Ix3>;

/// Errors raised when pairing values with a mask.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MaskError {
    #[error("mask shape {mask:?} does not match data shape {data:?}")]
    ShapeMismatch { data: Vec<usize>, mask: Vec<usize> },
}

/// A value array plus a boolean mask of the same shape.
///
/// `true` in the mask marks the entry as masked (land, closed point or
/// otherwise invalid). Masked entries keep whatever value was stored, but
/// every accessor and reduction on this type skips them.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray<D: Dimension> {
    data: Array<f64, D>,
    mask: Array<bool, D>,
}

impl<D: Dimension> MaskedArray<D> {
    /// Pair `data` with `mask`. Fails if the shapes differ.
    pub fn new(data: Array<f64, D>, mask: Array<bool, D>) -> Result<Self, MaskError> {
        check_shape(data.shape(), mask.shape())?;
        Ok(Self { data, mask })
    }

    /// Wrap `data` with nothing masked.
    pub fn unmasked(data: Array<f64, D>) -> Self {
        let mask = Array::from_elem(data.raw_dim(), false);
        Self { data, mask }
    }

    /// Mask every entry for which `predicate` returns true.
    pub fn masked_where<F>(data: Array<f64, D>, predicate: F) -> Self
    where
        F: Fn(f64) -> bool,
    {
        let mask = data.mapv(predicate);
        Self { data, mask }
    }

    pub fn data(&self) -> &Array<f64, D> {
        &self.data
    }

    pub fn mask(&self) -> &Array<bool, D> {
        &self.mask
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Total number of entries, masked or not.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `index`, or `None` if the entry is masked or out of bounds.
    pub fn get<I>(&self, index: I) -> Option<f64>
    where
        I: NdIndex<D> + Clone,
    {
        if *self.mask.get(index.clone())? {
            return None;
        }
        self.data.get(index).copied()
    }

    /// Out-of-bounds indices count as masked.
    pub fn is_masked<I>(&self, index: I) -> bool
    where
        I: NdIndex<D>,
    {
        self.mask.get(index).copied().unwrap_or(true)
    }

    /// Iterate over unmasked values in logical (row-major) order.
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data
            .iter()
            .zip(self.mask.iter())
            .filter(|&(_, &masked)| !masked)
            .map(|(&value, _)| value)
    }

    pub fn count_valid(&self) -> usize {
        self.mask.iter().filter(|&&masked| !masked).count()
    }

    pub fn count_masked(&self) -> usize {
        self.len() - self.count_valid()
    }

    /// Minimum over unmasked, non-NaN entries.
    pub fn min(&self) -> Option<f64> {
        self.valid_values()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
    }

    /// Maximum over unmasked, non-NaN entries.
    pub fn max(&self) -> Option<f64> {
        self.valid_values()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Mean over unmasked, non-NaN entries.
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .valid_values()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// `(min, max)` over unmasked entries; the colour-scale range a renderer
    /// would use.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        Some((self.min()?, self.max()?))
    }
}

impl<D: RemoveAxis> MaskedArray<D> {
    /// Owned sub-array at `index` along `axis`, or `None` when out of range.
    pub fn index_axis(&self, axis: Axis, index: usize) -> Option<MaskedArray<D::Smaller>> {
        if axis.index() >= self.data.ndim() || index >= self.data.len_of(axis) {
            return None;
        }
        Some(MaskedArray {
            data: self.data.index_axis(axis, index).to_owned(),
            mask: self.mask.index_axis(axis, index).to_owned(),
        })
    }
}

impl MaskedArray<Ix3> {
    /// Number of time steps (length of axis 0).
    pub fn steps(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// `(latitude, longitude)` extent of each frame.
    pub fn spatial_shape(&self) -> (usize, usize) {
        let shape = self.data.shape();
        (shape[1], shape[2])
    }

    /// The `(latitude, longitude)` frame of one time step.
    pub fn frame(&self, step: usize) -> Option<MaskedArray2> {
        self.index_axis(Axis(0), step)
    }

    pub fn frames(&self) -> impl Iterator<Item = MaskedArray2> + '_ {
        (0..self.steps()).filter_map(move |step| self.frame(step))
    }
}

impl MaskedArray<Ix2> {
    /// Keep every `stride`-th row and column starting at the origin.
    ///
    /// A stride of 0 is treated as 1.
    pub fn strided(&self, stride: usize) -> Self {
        let step = stride.max(1) as isize;
        Self {
            data: self.data.slice(s![..;step, ..;step]).to_owned(),
            mask: self.mask.slice(s![..;step, ..;step]).to_owned(),
        }
    }
}

fn check_shape(data: &[usize], mask: &[usize]) -> Result<(), MaskError> {
    if data != mask {
        return Err(MaskError::ShapeMismatch {
            data: data.to_vec(),
            mask: mask.to_vec(),
        });
    }
    Ok(())
}

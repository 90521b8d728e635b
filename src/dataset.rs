use crate::time_axis::TimeAxis;
use ndarray::{ArrayD, IxDyn};

/// Numeric values with a parallel validity mask of the same shape.
/// A `true` mask entry marks the value as missing; masked entries are
/// excluded from every reduction rather than treated as a number.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    pub data: ArrayD<f64>,
    pub mask: ArrayD<bool>,
}

impl MaskedArray {
    pub fn new(data: ArrayD<f64>, mask: ArrayD<bool>) -> Self {
        debug_assert_eq!(data.shape(), mask.shape());
        Self { data, mask }
    }

    /// An array with every value valid.
    pub fn unmasked(data: ArrayD<f64>) -> Self {
        let mask = ArrayD::from_elem(data.raw_dim(), false);
        Self { data, mask }
    }

    /// One-dimensional array from plain values.
    pub fn from_values(values: Vec<f64>) -> Self {
        let len = values.len();
        Self::unmasked(ArrayD::from_shape_vec(IxDyn(&[len]), values).expect("1-D shape"))
    }

    /// One-dimensional array with the listed positions masked.
    pub fn from_values_with_mask(values: Vec<f64>, masked: &[usize]) -> Self {
        let mut array = Self::from_values(values);
        for &index in masked {
            array.mask[[index]] = true;
        }
        array
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

/// A single model's output: a named masked array with one designated time
/// dimension. The caller owns the data; the pipeline replaces the time axis
/// during calendar unification but never touches the values.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub var_name: String,
    pub values: MaskedArray,
    pub time: TimeAxis,
    /// Index of the time dimension within `values`.
    pub time_dim: usize,
}

impl Dataset {
    pub fn new(var_name: impl Into<String>, values: MaskedArray, time: TimeAxis) -> Self {
        Self {
            var_name: var_name.into(),
            values,
            time,
            time_dim: 0,
        }
    }

    pub fn with_time_dim(mut self, time_dim: usize) -> Self {
        self.time_dim = time_dim;
        self
    }
}

/// The ensemble array produced by the combiner: every aligned dataset stacked
/// along a new leading realization axis, with the shared time axis attached
/// once. `time_dim` indexes into the per-realization dimensions, so it sits
/// at `time_dim + 1` of the stacked array.
#[derive(Debug, Clone)]
pub struct AlignedStack {
    pub var_name: String,
    pub values: MaskedArray,
    pub time: TimeAxis,
    pub time_dim: usize,
}

impl AlignedStack {
    pub fn num_realizations(&self) -> usize {
        self.values.shape()[0]
    }
}

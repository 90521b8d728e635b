use crate::dataset::{AlignedStack, Dataset, MaskedArray};
use crate::time_axis::TimeAxis;
use ndarray::{ArrayD, Axis, IxDyn};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    #[error("Unknown span policy '{0}' (expected 'overlap' or 'full')")]
    InvalidPolicy(String),

    #[error("Datasets share no common time points under the 'overlap' policy")]
    EmptyOverlap,

    #[error("Cannot merge datasets: {0}")]
    MergeConflict(String),
}

/// How the common time span is resolved across datasets: the intersection of
/// all time points or their union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanPolicy {
    Overlap,
    Full,
}

impl FromStr for SpanPolicy {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overlap" => Ok(SpanPolicy::Overlap),
            "full" => Ok(SpanPolicy::Full),
            other => Err(AlignError::InvalidPolicy(other.to_string())),
        }
    }
}

/// Resolve the target sequence of time points for a set of calendar-unified
/// axes: sorted intersection under `Overlap`, sorted deduplicated union under
/// `Full`. An empty intersection is an error; re-requesting with `Full` is
/// the caller's recourse.
pub fn resolve_span(axes: &[&TimeAxis], policy: SpanPolicy) -> Result<Vec<f64>, AlignError> {
    let mut points: Vec<f64> = match policy {
        SpanPolicy::Full => axes
            .iter()
            .flat_map(|axis| axis.points.iter().copied())
            .collect(),
        SpanPolicy::Overlap => match axes.split_first() {
            None => Vec::new(),
            Some((first, rest)) => first
                .points
                .iter()
                .copied()
                .filter(|point| rest.iter().all(|axis| axis.points.contains(point)))
                .collect(),
        },
    };

    points.sort_by(|a, b| a.total_cmp(b));
    points.dedup();

    if points.is_empty() && policy == SpanPolicy::Overlap {
        return Err(AlignError::EmptyOverlap);
    }
    Ok(points)
}

/// Reindex one dataset onto the target time points. Slices present in the
/// source are copied; absent target points (possible only under the `Full`
/// policy) become fully masked placeholder slices. The placeholder values
/// themselves never enter a reduction, the mask keeps them out.
pub fn align_dataset(dataset: &Dataset, target: &[f64]) -> Dataset {
    let time_dim = dataset.time_dim;
    let mut shape = dataset.values.shape().to_vec();
    shape[time_dim] = target.len();

    let mut data = ArrayD::from_elem(IxDyn(&shape), f64::NAN);
    let mut mask = ArrayD::from_elem(IxDyn(&shape), true);

    for (target_index, point) in target.iter().enumerate() {
        if let Some(source_index) = dataset.time.points.iter().position(|p| p == point) {
            data.index_axis_mut(Axis(time_dim), target_index)
                .assign(&dataset.values.data.index_axis(Axis(time_dim), source_index));
            mask.index_axis_mut(Axis(time_dim), target_index)
                .assign(&dataset.values.mask.index_axis(Axis(time_dim), source_index));
        }
    }

    Dataset {
        var_name: dataset.var_name.clone(),
        values: MaskedArray::new(data, mask),
        time: TimeAxis::new(target.to_vec(), dataset.time.units.clone()),
        time_dim,
    }
}

/// Stack aligned datasets along a new leading realization axis. All inputs
/// must agree on variable name, shape and time points; the shared time axis
/// is attached to the stack once.
pub fn combine(aligned: &[Dataset], time: TimeAxis) -> Result<AlignedStack, AlignError> {
    let first = aligned
        .first()
        .ok_or_else(|| AlignError::MergeConflict("no datasets to combine".to_string()))?;

    for dataset in &aligned[1..] {
        if dataset.var_name != first.var_name {
            return Err(AlignError::MergeConflict(format!(
                "inconsistent variable names: '{}' vs '{}'",
                first.var_name, dataset.var_name
            )));
        }
        if dataset.values.shape() != first.values.shape() {
            return Err(AlignError::MergeConflict(format!(
                "inconsistent shapes: {:?} vs {:?}",
                first.values.shape(),
                dataset.values.shape()
            )));
        }
        if dataset.time_dim != first.time_dim {
            return Err(AlignError::MergeConflict(format!(
                "inconsistent time dimensions: {} vs {}",
                first.time_dim, dataset.time_dim
            )));
        }
        if dataset.time.points != first.time.points {
            return Err(AlignError::MergeConflict(
                "inconsistent time points".to_string(),
            ));
        }
    }

    let mut shape = vec![aligned.len()];
    shape.extend_from_slice(first.values.shape());

    let mut data = ArrayD::zeros(IxDyn(&shape));
    let mut mask = ArrayD::from_elem(IxDyn(&shape), false);

    for (realization, dataset) in aligned.iter().enumerate() {
        data.index_axis_mut(Axis(0), realization)
            .assign(&dataset.values.data);
        mask.index_axis_mut(Axis(0), realization)
            .assign(&dataset.values.mask);
    }

    Ok(AlignedStack {
        var_name: first.var_name.clone(),
        values: MaskedArray::new(data, mask),
        time,
        time_dim: first.time_dim,
    })
}

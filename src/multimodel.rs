use crate::align::{align_dataset, combine, resolve_span, AlignError, SpanPolicy};
use crate::dataset::Dataset;
use crate::statistics::{compute_statistic, Statistic, StatisticError};
use crate::time_axis::{unify_time_axes, TimeAxis, TimeAxisError};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MultiModelError {
    #[error(transparent)]
    TimeAxis(#[from] TimeAxisError),

    #[error(transparent)]
    Align(#[from] AlignError),

    #[error(transparent)]
    Statistic(#[from] StatisticError),

    #[error("No datasets given")]
    NoDatasets,

    #[error("No statistics requested")]
    NoStatistics,
}

/// Compute per-timestep cross-model statistics over an ensemble of datasets.
///
/// The pipeline runs calendar unification, span resolution, alignment,
/// combination and statistic computation in that order. Unification replaces
/// each input dataset's time axis in place (a documented side effect); the
/// data values are never touched.
///
/// Any invalid statistic identifier fails the whole call, before the input
/// axes are mutated; no partial result map is returned. Callers hitting
/// `EmptyOverlap` may re-request with the `full` span.
pub fn multi_model_statistics(
    datasets: &mut [Dataset],
    span: &str,
    statistics: &[&str],
) -> Result<HashMap<String, Dataset>, MultiModelError> {
    if datasets.is_empty() {
        return Err(MultiModelError::NoDatasets);
    }
    if statistics.is_empty() {
        return Err(MultiModelError::NoStatistics);
    }

    let policy: SpanPolicy = span.parse()?;
    let mut requested = Vec::with_capacity(statistics.len());
    for identifier in statistics {
        requested.push((identifier.to_string(), Statistic::parse(identifier)?));
    }

    let target_unit = unify_time_axes(datasets)?;

    let axes: Vec<&TimeAxis> = datasets.iter().map(|dataset| &dataset.time).collect();
    let target_points = resolve_span(&axes, policy)?;

    let aligned: Vec<Dataset> = datasets
        .iter()
        .map(|dataset| align_dataset(dataset, &target_points))
        .collect();

    let shared_axis = TimeAxis::new(target_points, target_unit);
    let stack = combine(&aligned, shared_axis)?;

    let mut results = HashMap::with_capacity(requested.len());
    for (identifier, statistic) in requested {
        results.insert(identifier, compute_statistic(&stack, &statistic));
    }
    Ok(results)
}

use crate::dataset::{AlignedStack, Dataset, MaskedArray};
use crate::math::lin_interp;
use ndarray::{ArrayD, Axis, IxDyn, Zip};
use thiserror::Error;

/// Statistic names that exist as ensemble operations elsewhere but are not
/// implemented by this engine. Requesting one is a programming error, unlike
/// a malformed argument such as a percentile without its threshold.
const UNIMPLEMENTED_STATISTICS: [&str; 3] = ["count", "peak", "proportion"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatisticError {
    #[error("Invalid statistic argument: {0}")]
    InvalidArgument(String),

    #[error("Statistic '{0}' is not a supported operation")]
    NotImplemented(String),
}

/// A parsed statistic request. Identifiers are resolved to a closed variant
/// set up front so the reduction step never dispatches on strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    Mean,
    Median,
    StdDev,
    Min,
    Max,
    Percentile(f64),
}

impl Statistic {
    /// Parse a statistic identifier. `std` and `std_dev` name the same
    /// statistic; `pNN` and `pNN.N` request percentiles. Percentile-like
    /// identifiers missing their threshold (`percentile`, `wpercentile`) are
    /// bad arguments; `count`, `peak` and `proportion` name operations this
    /// engine does not provide.
    pub fn parse(identifier: &str) -> Result<Self, StatisticError> {
        match identifier {
            "mean" => Ok(Statistic::Mean),
            "median" => Ok(Statistic::Median),
            "std" | "std_dev" => Ok(Statistic::StdDev),
            "min" => Ok(Statistic::Min),
            "max" => Ok(Statistic::Max),
            "percentile" | "wpercentile" => Err(StatisticError::InvalidArgument(format!(
                "'{identifier}' requires a percentile threshold, e.g. 'p95'"
            ))),
            _ if UNIMPLEMENTED_STATISTICS.contains(&identifier) => {
                Err(StatisticError::NotImplemented(identifier.to_string()))
            }
            _ => Self::parse_percentile(identifier),
        }
    }

    fn parse_percentile(identifier: &str) -> Result<Self, StatisticError> {
        let invalid =
            || StatisticError::InvalidArgument(format!("unknown statistic '{identifier}'"));

        let digits = identifier.strip_prefix('p').ok_or_else(|| invalid())?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(invalid());
        }
        let threshold: f64 = digits.parse().map_err(|_| invalid())?;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(StatisticError::InvalidArgument(format!(
                "percentile threshold {threshold} outside [0, 100]"
            )));
        }
        Ok(Statistic::Percentile(threshold))
    }
}

/// Reduce the stack over its realization axis, one output value per remaining
/// coordinate. Masked entries are excluded from each reduction; a coordinate
/// with no valid entries (or too few for the statistic) is masked in the
/// output. The stack itself is never modified.
pub fn compute_statistic(stack: &AlignedStack, statistic: &Statistic) -> Dataset {
    let out_shape: Vec<usize> = stack.values.shape()[1..].to_vec();
    let mut data = ArrayD::from_elem(IxDyn(&out_shape), f64::NAN);
    let mut mask = ArrayD::from_elem(IxDyn(&out_shape), true);

    Zip::from(stack.values.data.lanes(Axis(0)))
        .and(stack.values.mask.lanes(Axis(0)))
        .and(&mut data)
        .and(&mut mask)
        .for_each(|values, masks, out_value, out_masked| {
            let mut valid: Vec<f64> = values
                .iter()
                .zip(masks.iter())
                .filter(|(_, &masked)| !masked)
                .map(|(&value, _)| value)
                .collect();
            if let Some(result) = reduce(statistic, &mut valid) {
                *out_value = result;
                *out_masked = false;
            }
        });

    Dataset {
        var_name: stack.var_name.clone(),
        values: MaskedArray::new(data, mask),
        time: stack.time.clone(),
        time_dim: stack.time_dim,
    }
}

fn reduce(statistic: &Statistic, valid: &mut Vec<f64>) -> Option<f64> {
    if valid.is_empty() {
        return None;
    }
    match statistic {
        Statistic::Mean => Some(valid.iter().sum::<f64>() / valid.len() as f64),
        Statistic::Min => valid.iter().copied().reduce(f64::min),
        Statistic::Max => valid.iter().copied().reduce(f64::max),
        Statistic::StdDev => sample_std_dev(valid),
        Statistic::Median => Some(percentile(valid, 50.0)),
        Statistic::Percentile(threshold) => Some(percentile(valid, *threshold)),
    }
}

/// Sample standard deviation (one delta degree of freedom). Undefined for
/// fewer than two values, which leaves the coordinate masked.
fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some((sum_sq / (n - 1) as f64).sqrt())
}

/// Percentile via linear interpolation between order statistics, at rank
/// `threshold / 100 * (n - 1)`.
fn percentile(values: &mut [f64], threshold: f64) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let rank = threshold / 100.0 * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    lin_interp(values[lower], values[upper], rank - lower as f64)
}

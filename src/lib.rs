pub mod align;
pub mod calendar;
pub mod dataset;
pub mod math;
pub mod multimodel;
pub mod statistics;
pub mod time_axis;

pub use multimodel::{multi_model_statistics, MultiModelError};

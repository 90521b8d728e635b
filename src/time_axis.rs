use crate::calendar::{Calendar, CalendarError, Date};
use crate::dataset::Dataset;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeAxisError {
    #[error("Sub-daily data is not supported by multi-model statistics")]
    UnsupportedFrequency,

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Time encoding: days elapsed since an origin date under a given calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnit {
    pub origin: Date,
    pub calendar: Calendar,
}

impl TimeUnit {
    pub fn new(origin: Date, calendar: Calendar) -> Self {
        Self { origin, calendar }
    }

    /// The fallback unit used when inputs disagree on their time encoding:
    /// days since 1850-01-01 in the standard calendar.
    pub fn default_unit() -> Self {
        Self::new(Date::new(1850, 1, 1), Calendar::Gregorian)
    }

    /// Express a date as a numeric offset under this unit.
    pub fn encode(&self, date: &Date) -> Result<f64, CalendarError> {
        let day = self.calendar.date_to_day_number(date)?;
        let origin_day = self.calendar.date_to_day_number(&self.origin)?;
        Ok((day - origin_day) as f64 + date.time_fraction() - self.origin.time_fraction())
    }

    /// Recover the date a numeric offset refers to under this unit.
    pub fn decode(&self, offset: f64) -> Result<Date, CalendarError> {
        let origin_day = self.calendar.date_to_day_number(&self.origin)?;
        let total = offset + self.origin.time_fraction();
        let whole_days = total.floor();
        let mut date = self
            .calendar
            .date_from_day_number(origin_day + whole_days as i64);
        date.set_time_fraction(total - whole_days);
        Ok(date)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "days since {:04}-{:02}-{:02} ({})",
            self.origin.year, self.origin.month, self.origin.day, self.calendar
        )
    }
}

/// Sampling frequency of a time axis, inferred from its decoded dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Yearly,
    Monthly,
    Daily,
}

/// Infer the frequency from consecutive date components: if no two
/// neighbouring points share a year the data is yearly, and so on down to
/// daily. Points that repeat a day are sub-daily and rejected.
pub fn infer_frequency(dates: &[Date]) -> Result<Frequency, TimeAxisError> {
    if dates.windows(2).all(|w| w[0].year != w[1].year) {
        Ok(Frequency::Yearly)
    } else if dates.windows(2).all(|w| w[0].month != w[1].month) {
        Ok(Frequency::Monthly)
    } else if dates.windows(2).all(|w| w[0].day != w[1].day) {
        Ok(Frequency::Daily)
    } else {
        Err(TimeAxisError::UnsupportedFrequency)
    }
}

/// An ordered sequence of time points with their encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub points: Vec<f64>,
    pub units: TimeUnit,
}

impl TimeAxis {
    pub fn new(points: Vec<f64>, units: TimeUnit) -> Self {
        Self { points, units }
    }

    /// Build an axis from explicit dates.
    pub fn from_dates(dates: &[Date], units: TimeUnit) -> Result<Self, CalendarError> {
        let points = dates
            .iter()
            .map(|d| units.encode(d))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(Self::new(points, units))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Result<Vec<Date>, CalendarError> {
        self.points.iter().map(|&p| self.units.decode(p)).collect()
    }

    pub fn frequency(&self) -> Result<Frequency, TimeAxisError> {
        infer_frequency(&self.dates()?)
    }
}

/// Pick the target unit for a set of axes: the shared unit if every axis
/// already uses the same one, the default unit otherwise.
pub fn consistent_time_unit<'a, I>(axes: I) -> TimeUnit
where
    I: IntoIterator<Item = &'a TimeAxis>,
{
    let mut iter = axes.into_iter();
    match iter.next() {
        Some(first) if iter.all(|axis| axis.units == first.units) => first.units.clone(),
        _ => TimeUnit::default_unit(),
    }
}

/// Re-express one axis under the target unit, normalizing each point to the
/// canonical instant for the axis frequency: July 1 for yearly data, the
/// 15th at midnight for monthly data, the unchanged date for daily data.
/// Returns a new axis; the input is untouched.
pub fn unified_time_axis(axis: &TimeAxis, target: &TimeUnit) -> Result<TimeAxis, TimeAxisError> {
    let dates = axis.dates()?;
    let frequency = infer_frequency(&dates)?;

    let canonical: Vec<Date> = dates
        .iter()
        .map(|date| match frequency {
            Frequency::Yearly => Date::new(date.year, 7, 1),
            Frequency::Monthly => Date::new(date.year, date.month, 15),
            Frequency::Daily => *date,
        })
        .collect();

    Ok(TimeAxis::from_dates(&canonical, target.clone())?)
}

/// Unify the time axes of all datasets onto one shared unit and canonical
/// point values. Each dataset's axis is replaced; callers holding on to the
/// inputs observe the updated axes afterwards. Must run to completion before
/// any other stage reads the axes.
pub fn unify_time_axes(datasets: &mut [Dataset]) -> Result<TimeUnit, TimeAxisError> {
    let target = consistent_time_unit(datasets.iter().map(|ds| &ds.time));
    for dataset in datasets.iter_mut() {
        dataset.time = unified_time_axis(&dataset.time, &target)?;
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly_dates(year: i32, day: u8, num: u8) -> Vec<Date> {
        (1..=num).map(|month| Date::new(year, month, day)).collect()
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let unit = TimeUnit::default_unit();
        for date in monthly_dates(1850, 15, 12) {
            let offset = unit.encode(&date).unwrap();
            assert_eq!(unit.decode(offset).unwrap(), date);
        }
    }

    #[test]
    fn test_encode_known_offsets() {
        let unit = TimeUnit::default_unit();
        // Mid-month instants for Jan-Mar 1850
        assert_eq!(unit.encode(&Date::new(1850, 1, 15)).unwrap(), 14.0);
        assert_eq!(unit.encode(&Date::new(1850, 2, 15)).unwrap(), 45.0);
        assert_eq!(unit.encode(&Date::new(1850, 3, 15)).unwrap(), 73.0);
    }

    #[test]
    fn test_decode_negative_offset() {
        let unit = TimeUnit::new(Date::new(1950, 1, 1), Calendar::Day360);
        let offset = unit.encode(&Date::new(1850, 1, 15)).unwrap();
        assert_eq!(offset, -35986.0);
        assert_eq!(unit.decode(offset).unwrap(), Date::new(1850, 1, 15));
    }

    #[test]
    fn test_infer_frequency() {
        let yearly: Vec<Date> = (0..3).map(|i| Date::new(1850 + i, 3, 1)).collect();
        assert_eq!(infer_frequency(&yearly).unwrap(), Frequency::Yearly);

        assert_eq!(
            infer_frequency(&monthly_dates(1850, 15, 3)).unwrap(),
            Frequency::Monthly
        );

        let daily: Vec<Date> = (1..=3).map(|d| Date::new(1850, 1, d)).collect();
        assert_eq!(infer_frequency(&daily).unwrap(), Frequency::Daily);

        let hourly: Vec<Date> = (1..=3)
            .map(|h| Date::with_time(1850, 1, 1, h, 0, 0))
            .collect();
        assert_eq!(
            infer_frequency(&hourly),
            Err(TimeAxisError::UnsupportedFrequency)
        );
    }

    #[test]
    fn test_consistent_time_unit() {
        let unit_360 = TimeUnit::new(Date::new(1850, 1, 1), Calendar::Day360);
        let axis1 = TimeAxis::from_dates(&monthly_dates(1850, 15, 3), unit_360.clone()).unwrap();
        let axis2 = TimeAxis::from_dates(
            &monthly_dates(1850, 15, 3),
            TimeUnit::new(Date::new(1850, 1, 1), Calendar::Day365),
        )
        .unwrap();

        // Matching units are kept, mismatched units fall back to the default
        assert_eq!(consistent_time_unit(vec![&axis1, &axis1]), unit_360);
        assert_eq!(
            consistent_time_unit(vec![&axis1, &axis2]),
            TimeUnit::default_unit()
        );
    }

    #[test]
    fn test_monthly_normalized_to_midmonth() {
        let target = TimeUnit::default_unit();
        let stamped_12 =
            TimeAxis::from_dates(&monthly_dates(1850, 12, 3), target.clone()).unwrap();
        let stamped_25 =
            TimeAxis::from_dates(&monthly_dates(1850, 25, 3), target.clone()).unwrap();

        let unified_12 = unified_time_axis(&stamped_12, &target).unwrap();
        let unified_25 = unified_time_axis(&stamped_25, &target).unwrap();

        assert_eq!(unified_12.points, vec![14.0, 45.0, 73.0]);
        assert_eq!(unified_12.points, unified_25.points);
    }

    #[test]
    fn test_yearly_normalized_to_july_first() {
        let target = TimeUnit::default_unit();
        let dates: Vec<Date> = (0..3).map(|i| Date::new(1850 + i, 3, 20)).collect();
        let axis = TimeAxis::from_dates(&dates, target.clone()).unwrap();

        let unified = unified_time_axis(&axis, &target).unwrap();
        for date in unified.dates().unwrap() {
            assert_eq!((date.month, date.day), (7, 1));
        }
    }

    #[test]
    fn test_unification_idempotent() {
        let target = TimeUnit::default_unit();
        let axis = TimeAxis::from_dates(&monthly_dates(1850, 25, 3), target.clone()).unwrap();

        let once = unified_time_axis(&axis, &target).unwrap();
        let twice = unified_time_axis(&once, &target).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_same_calendar_is_value_noop() {
        let target = TimeUnit::default_unit();
        let axis = TimeAxis::from_dates(&monthly_dates(1850, 15, 3), target.clone()).unwrap();

        let unified = unified_time_axis(&axis, &target).unwrap();
        assert_eq!(unified.points, axis.points);
    }

    #[test]
    fn test_sub_daily_axis_rejected() {
        let target = TimeUnit::default_unit();
        let dates: Vec<Date> = (1..=3)
            .map(|h| Date::with_time(1850, 1, 1, h, 0, 0))
            .collect();
        let axis = TimeAxis::from_dates(&dates, target.clone()).unwrap();

        assert_eq!(
            unified_time_axis(&axis, &target),
            Err(TimeAxisError::UnsupportedFrequency)
        );
    }
}

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// First Gregorian day of the 1582 calendar reform, as a Julian day number.
/// Dates on or after 1582-10-15 use Gregorian rules in the mixed calendar;
/// the days 1582-10-05 through 1582-10-14 do not exist in it.
const GREGORIAN_REFORM_JDN: i64 = 2299161;

/// Cumulative day-of-year offsets per month for the fixed 365-day calendar.
const CUM_DAYS_365: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error("Unknown calendar: {0}")]
    UnknownCalendar(String),

    #[error("Invalid date {year:04}-{month:02}-{day:02} for calendar {calendar}")]
    InvalidDate {
        year: i32,
        month: u8,
        day: u8,
        calendar: Calendar,
    },
}

/// The closed set of model calendars understood by the alignment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Calendar {
    /// CF "standard"/"gregorian": Julian rules before the 1582 reform,
    /// Gregorian rules after.
    Gregorian,
    /// Gregorian rules extended backwards indefinitely.
    ProlepticGregorian,
    /// Julian rules for all dates.
    Julian,
    /// Twelve 30-day months.
    Day360,
    /// No leap years ("noleap").
    Day365,
}

impl Calendar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Calendar::Gregorian => "gregorian",
            Calendar::ProlepticGregorian => "proleptic_gregorian",
            Calendar::Julian => "julian",
            Calendar::Day360 => "360_day",
            Calendar::Day365 => "365_day",
        }
    }

    pub fn is_leap_year(&self, year: i32) -> bool {
        match self {
            Calendar::Julian => year % 4 == 0,
            // The mixed calendar follows Julian leap rules before the reform.
            Calendar::Gregorian if year < 1582 => year % 4 == 0,
            Calendar::Gregorian | Calendar::ProlepticGregorian => {
                (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
            }
            Calendar::Day360 | Calendar::Day365 => false,
        }
    }

    /// Number of days in a given month under this calendar.
    pub fn days_in_month(&self, year: i32, month: u8) -> u8 {
        match self {
            Calendar::Day360 => 30,
            _ => match month {
                1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
                4 | 6 | 9 | 11 => 30,
                2 => {
                    if self.is_leap_year(year) {
                        29
                    } else {
                        28
                    }
                }
                _ => 0,
            },
        }
    }

    /// Serial day number of a date under this calendar. Real-world calendars
    /// map to Julian day numbers; the idealized calendars use a plain
    /// year/month/day expansion. Only differences of serial numbers are
    /// meaningful across the API.
    pub fn date_to_day_number(&self, date: &Date) -> Result<i64, CalendarError> {
        self.validate(date)?;
        let (y, m, d) = (date.year as i64, date.month as i64, date.day as i64);
        let number = match self {
            Calendar::ProlepticGregorian => gregorian_day_number(y, m, d),
            Calendar::Julian => julian_day_number(y, m, d),
            Calendar::Gregorian => {
                if (date.year, date.month, date.day) >= (1582, 10, 15) {
                    gregorian_day_number(y, m, d)
                } else {
                    julian_day_number(y, m, d)
                }
            }
            Calendar::Day360 => y * 360 + (m - 1) * 30 + (d - 1),
            Calendar::Day365 => y * 365 + CUM_DAYS_365[(m - 1) as usize] + (d - 1),
        };
        Ok(number)
    }

    /// Inverse of `date_to_day_number`; the result is at midnight.
    pub fn date_from_day_number(&self, number: i64) -> Date {
        let (year, month, day) = match self {
            Calendar::ProlepticGregorian => gregorian_from_day_number(number),
            Calendar::Julian => julian_from_day_number(number),
            Calendar::Gregorian => {
                if number >= GREGORIAN_REFORM_JDN {
                    gregorian_from_day_number(number)
                } else {
                    julian_from_day_number(number)
                }
            }
            Calendar::Day360 => {
                let year = number.div_euclid(360);
                let rem = number.rem_euclid(360);
                (year, rem / 30 + 1, rem % 30 + 1)
            }
            Calendar::Day365 => {
                let year = number.div_euclid(365);
                let rem = number.rem_euclid(365);
                let month = CUM_DAYS_365.iter().rposition(|&c| c <= rem).unwrap_or(0);
                (year, month as i64 + 1, rem - CUM_DAYS_365[month] + 1)
            }
        };
        Date::new(year as i32, month as u8, day as u8)
    }

    fn validate(&self, date: &Date) -> Result<(), CalendarError> {
        let invalid = || CalendarError::InvalidDate {
            year: date.year,
            month: date.month,
            day: date.day,
            calendar: *self,
        };
        if date.month < 1 || date.month > 12 {
            return Err(invalid());
        }
        if date.day < 1 || date.day > self.days_in_month(date.year, date.month) {
            return Err(invalid());
        }
        // Dates removed by the 1582 reform do not exist in the mixed calendar.
        if *self == Calendar::Gregorian
            && date.year == 1582
            && date.month == 10
            && (5..=14).contains(&date.day)
        {
            return Err(invalid());
        }
        Ok(())
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Calendar {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gregorian" | "standard" => Ok(Calendar::Gregorian),
            "proleptic_gregorian" => Ok(Calendar::ProlepticGregorian),
            "julian" => Ok(Calendar::Julian),
            "360_day" => Ok(Calendar::Day360),
            "365_day" | "noleap" => Ok(Calendar::Day365),
            other => Err(CalendarError::UnknownCalendar(other.to_string())),
        }
    }
}

/// A calendar-agnostic date and time of day. Whether a given date is valid
/// depends on the calendar it is interpreted under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Date {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Date {
    /// A date at midnight.
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    pub fn with_time(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Time of day as a fraction of a day.
    pub fn time_fraction(&self) -> f64 {
        (self.hour as f64 * 3600.0 + self.minute as f64 * 60.0 + self.second as f64) / 86400.0
    }

    /// Replace the time of day from a day fraction in [0, 1).
    pub fn set_time_fraction(&mut self, fraction: f64) {
        let total_seconds = (fraction * 86400.0).round() as u32;
        self.hour = (total_seconds / 3600) as u8;
        self.minute = ((total_seconds % 3600) / 60) as u8;
        self.second = (total_seconds % 60) as u8;
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Julian day number of a proleptic-Gregorian date (Fliegel-Van Flandern).
fn gregorian_day_number(year: i64, month: i64, day: i64) -> i64 {
    day - 32075
        + 1461 * (year + 4800 + (month - 14) / 12) / 4
        + 367 * (month - 2 - (month - 14) / 12 * 12) / 12
        - 3 * ((year + 4900 + (month - 14) / 12) / 100) / 4
}

fn gregorian_from_day_number(jd: i64) -> (i64, i64, i64) {
    let l = jd + 68569;
    let n = 4 * l / 146097;
    let l = l - (146097 * n + 3) / 4;
    let i = 4000 * (l + 1) / 1461001;
    let l = l - 1461 * i / 4 + 31;
    let j = 80 * l / 2447;
    let k = l - 2447 * j / 80;
    let l = j / 11;
    let j = j + 2 - 12 * l;
    let i = 100 * (n - 49) + i + l;

    (i, j, k)
}

/// Julian day number of a Julian-calendar date.
fn julian_day_number(year: i64, month: i64, day: i64) -> i64 {
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2) / 5 + 365 * y + y / 4 - 32083
}

fn julian_from_day_number(jd: i64) -> (i64, i64, i64) {
    let c = jd + 32082;
    let d = (4 * c + 3) / 1461;
    let e = c - 1461 * d / 4;
    let m = (5 * e + 2) / 153;

    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = d - 4800 + m / 10;

    (year, month, day)
}

//! Naive calendar date-times backing the `DateTime` data type.
//!
//! A [`Moment`] is a count of milliseconds since `1970-01-01T00:00:00`, with no
//! time zone attached. Calendar conversion uses Howard Hinnant's
//! `days_from_civil` / `civil_from_days` algorithms, so every proleptic
//! Gregorian date is representable.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub(crate) const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;
const MAX_YEAR: i64 = 999_999;

static MOMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-?\d{4,6})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2})(?:\.(\d{1,3}))?)?)?$",
    )
    .expect("moment pattern is a valid regex")
});

/// Error returned when a string is not a valid ISO-8601 date or date-time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date-time '{input}': expected YYYY-MM-DD[THH:MM[:SS[.fff]]]")]
pub struct ParseMomentError {
    pub input: String,
}

/// A point on the calendar, millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Moment {
    millis: i64,
}

impl Moment {
    /// Builds a moment from raw milliseconds since the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Moment { millis }
    }

    /// Milliseconds since the epoch.
    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Midnight on the given date, or `None` if the date does not exist.
    ///
    /// ```
    /// use formula_lang::Moment;
    ///
    /// assert!(Moment::from_ymd(2024, 2, 29).is_some());
    /// assert!(Moment::from_ymd(2023, 2, 29).is_none());
    /// ```
    pub fn from_ymd(year: i64, month: u32, day: u32) -> Option<Self> {
        Self::from_ymd_hms(year, month, day, 0, 0, 0)
    }

    pub fn from_ymd_hms(
        year: i64,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        if hour > 23 || minute > 59 || second > 59 || year.abs() > MAX_YEAR {
            return None;
        }
        let days = days_from_civil(year, month, day);
        let millis = days
            .checked_mul(MILLIS_PER_DAY)?
            .checked_add(i64::from(hour) * MILLIS_PER_HOUR)?
            .checked_add(i64::from(minute) * MILLIS_PER_MINUTE)?
            .checked_add(i64::from(second) * MILLIS_PER_SECOND)?;
        Some(Moment { millis })
    }

    /// Calendar date as `(year, month, day)`.
    pub fn date(&self) -> (i64, u32, u32) {
        civil_from_days(self.millis.div_euclid(MILLIS_PER_DAY))
    }

    /// Time of day as `(hour, minute, second, millisecond)`.
    pub fn time(&self) -> (u32, u32, u32, u32) {
        let of_day = self.millis.rem_euclid(MILLIS_PER_DAY);
        let hour = of_day / MILLIS_PER_HOUR;
        let minute = (of_day % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
        let second = (of_day % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
        let milli = of_day % MILLIS_PER_SECOND;
        (hour as u32, minute as u32, second as u32, milli as u32)
    }

    /// Shifts by a (possibly fractional) number of days, rounded to the
    /// nearest millisecond.
    pub fn add_days(&self, days: f64) -> Option<Self> {
        self.add_scaled(days, MILLIS_PER_DAY)
    }

    pub fn add_hours(&self, hours: f64) -> Option<Self> {
        self.add_scaled(hours, MILLIS_PER_HOUR)
    }

    pub fn add_minutes(&self, minutes: f64) -> Option<Self> {
        self.add_scaled(minutes, MILLIS_PER_MINUTE)
    }

    pub fn add_seconds(&self, seconds: f64) -> Option<Self> {
        self.add_scaled(seconds, MILLIS_PER_SECOND)
    }

    /// Shifts by whole calendar months. The day of month is clamped to the
    /// length of the target month, so Jan 31 + 1 month is Feb 28 (or 29).
    pub fn add_months(&self, months: i64) -> Option<Self> {
        let (year, month, day) = self.date();
        let total = year.checked_mul(12)?.checked_add(i64::from(month) - 1)?;
        let total = total.checked_add(months)?;
        let new_year = total.div_euclid(12);
        let new_month = (total.rem_euclid(12) + 1) as u32;
        if new_year.abs() > MAX_YEAR {
            return None;
        }
        let new_day = day.min(days_in_month(new_year, new_month));

        let of_day = self.millis.rem_euclid(MILLIS_PER_DAY);
        days_from_civil(new_year, new_month, new_day)
            .checked_mul(MILLIS_PER_DAY)?
            .checked_add(of_day)
            .map(Moment::from_millis)
    }

    pub fn add_years(&self, years: i64) -> Option<Self> {
        self.add_months(years.checked_mul(12)?)
    }

    /// Signed distance `self - other`, in fractional days.
    pub fn days_since(&self, other: &Moment) -> f64 {
        (i128::from(self.millis) - i128::from(other.millis)) as f64 / MILLIS_PER_DAY as f64
    }

    fn add_scaled(&self, amount: f64, unit: i64) -> Option<Self> {
        let delta = (amount * unit as f64).round();
        if !delta.is_finite() || delta.abs() >= i64::MAX as f64 {
            return None;
        }
        let millis = self.millis.checked_add(delta as i64)?;
        in_range(millis).then(|| Moment::from_millis(millis))
    }
}

impl FromStr for Moment {
    type Err = ParseMomentError;

    /// Accepts `YYYY-MM-DD`, optionally followed by `T` or a space and
    /// `HH:MM`, `HH:MM:SS` or `HH:MM:SS.fff`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMomentError {
            input: s.to_string(),
        };
        let caps = MOMENT_PATTERN.captures(s.trim()).ok_or_else(err)?;

        let field = |i: usize| -> Result<u32, ParseMomentError> {
            match caps.get(i) {
                Some(m) => m.as_str().parse().map_err(|_| err()),
                None => Ok(0),
            }
        };

        let year: i64 = caps[1].parse().map_err(|_| err())?;
        let moment = Moment::from_ymd_hms(year, field(2)?, field(3)?, field(4)?, field(5)?, field(6)?)
            .ok_or_else(err)?;

        let millis = match caps.get(7) {
            // ".5" means 500 ms, ".05" means 50 ms
            Some(m) => {
                let digits = m.as_str();
                let value: i64 = digits.parse().map_err(|_| err())?;
                value * 10_i64.pow(3 - digits.len() as u32)
            }
            None => 0,
        };
        Ok(Moment::from_millis(moment.millis + millis))
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, month, day) = self.date();
        let (hour, minute, second, milli) = self.time();
        write!(
            f,
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"
        )?;
        if milli != 0 {
            write!(f, ".{milli:03}")?;
        }
        Ok(())
    }
}

/// Whether `millis` falls within years `-MAX_YEAR..=MAX_YEAR`.
fn in_range(millis: i64) -> bool {
    let min = days_from_civil(-MAX_YEAR, 1, 1) * MILLIS_PER_DAY;
    let max = (days_from_civil(MAX_YEAR, 12, 31) + 1) * MILLIS_PER_DAY;
    (min..max).contains(&millis)
}

fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Convert (year, month 1-12, day 1-31) to days since Unix epoch.
fn days_from_civil(y: i64, m: u32, d: u32) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32;
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe as i64 - 719_468
}

/// Decompose days-since-epoch into (year, month 1-12, day 1-31).
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let mo = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe as i64 + era * 400 + if mo <= 2 { 1 } else { 0 };
    (y, mo, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(y: i64, m: u32, d: u32) -> Moment {
        Moment::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_epoch_round_trip() {
        assert_eq!(ymd(1970, 1, 1).millis(), 0);
        assert_eq!(ymd(2024, 1, 1).date(), (2024, 1, 1));
        assert_eq!(ymd(1969, 12, 31).date(), (1969, 12, 31));
    }

    #[test]
    fn test_parse_date_and_time() {
        let m: Moment = "2024-03-05T14:30:15.250".parse().unwrap();
        assert_eq!(m.date(), (2024, 3, 5));
        assert_eq!(m.time(), (14, 30, 15, 250));

        let m: Moment = "2024-03-05 08:00".parse().unwrap();
        assert_eq!(m.time(), (8, 0, 0, 0));
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        assert!("2024-02-30".parse::<Moment>().is_err());
        assert!("2024-13-01".parse::<Moment>().is_err());
        assert!("2024-01-01T24:00".parse::<Moment>().is_err());
        assert!("yesterday".parse::<Moment>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ymd(2024, 1, 6).to_string(), "2024-01-06T00:00:00");
        let m: Moment = "2024-01-06T01:02:03.004".parse().unwrap();
        assert_eq!(m.to_string(), "2024-01-06T01:02:03.004");
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(ymd(2024, 1, 31).add_months(1), Some(ymd(2024, 2, 29)));
        assert_eq!(ymd(2023, 1, 31).add_months(1), Some(ymd(2023, 2, 28)));
        assert_eq!(ymd(2024, 3, 15).add_months(-3), Some(ymd(2023, 12, 15)));
        assert_eq!(ymd(2024, 2, 29).add_years(1), Some(ymd(2025, 2, 28)));
    }

    #[test]
    fn test_fractional_days() {
        let m = ymd(2024, 1, 1).add_days(1.5).unwrap();
        assert_eq!(m.date(), (2024, 1, 2));
        assert_eq!(m.time(), (12, 0, 0, 0));
        assert_eq!(m.days_since(&ymd(2024, 1, 1)), 1.5);
    }

    #[test]
    fn test_add_overflow_is_none() {
        assert_eq!(ymd(2024, 1, 1).add_days(f64::INFINITY), None);
        assert_eq!(ymd(2024, 1, 1).add_seconds(1e300), None);
    }

    #[test]
    fn test_add_stays_within_year_range() {
        assert_eq!(ymd(2024, 1, 1).add_days(1e11), None);
        assert_eq!(ymd(2024, 1, 1).add_hours(-1e12), None);
        let last = ymd(MAX_YEAR, 12, 31);
        assert_eq!(last.add_days(1.0), None);
        assert_eq!(last.add_hours(23.0).map(|m| m.date()), Some((MAX_YEAR, 12, 31)));
    }

    #[test]
    fn test_days_since_extremes() {
        let far = Moment::from_millis(i64::MAX).days_since(&Moment::from_millis(i64::MIN));
        assert!(far > 2.0e8);
    }
}

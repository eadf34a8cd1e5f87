//! Expiry dates and the days-until-expiry calculation.
//!
//! Expiry dates are persisted as `D/M/Y` strings (one-based month, no zero
//! padding, no timezone), for example `"5/6/2025"`. [`ExpiryDate`] keeps that
//! raw string untouched so records written by other clients round-trip
//! byte-for-byte.
//!
//! # Calculation
//!
//! [`days_until`] compares local midnight of "today" with local midnight of
//! the expiry date, both in the timezone of the supplied `now`, and divides
//! the millisecond difference by the length of a day, truncating toward zero.
//! Across a daylight-saving transition the difference is an hour short of a
//! whole day, so the result can be one less than the calendar difference.
//!
//! Out-of-range components are normalized leniently instead of rejected:
//! month 13 is January of the following year, day 32 rolls into the next
//! month and day 0 is the last day of the previous month.
//!
//! Unparseable strings never produce an error. They map to
//! [`UNPARSEABLE_DAYS`], which sorts them after every realistic date.

use core::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

/// Day count reported for a date string that cannot be parsed.
pub const UNPARSEABLE_DAYS: i64 = 9999;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Calendar-day difference between `now` and the `D/M/Y` date in
/// `date_string`.
///
/// Returns [`UNPARSEABLE_DAYS`] if the string does not have exactly three
/// integer components or the normalized date falls outside the supported
/// calendar range.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use smart_pantry_core::{UNPARSEABLE_DAYS, days_until};
///
/// let now = Utc.with_ymd_and_hms(2025, 6, 14, 18, 45, 0).unwrap();
/// assert_eq!(days_until("15/6/2025", &now), 1);
/// assert_eq!(days_until("13/6/2025", &now), -1);
/// assert_eq!(days_until("not-a-date", &now), UNPARSEABLE_DAYS);
/// ```
#[must_use]
pub fn days_until<Tz: TimeZone>(date_string: &str, now: &DateTime<Tz>) -> i64 {
    parse_lenient(date_string)
        .and_then(|expiry| {
            let tz = now.timezone();
            let today = local_midnight(&tz, now.date_naive())?;
            let expiry = local_midnight(&tz, expiry)?;
            Some(expiry.signed_duration_since(today).num_milliseconds() / MILLIS_PER_DAY)
        })
        .unwrap_or(UNPARSEABLE_DAYS)
}

/// Parse `D/M/Y` into a date, normalizing out-of-range day and month values.
fn parse_lenient(date_string: &str) -> Option<NaiveDate> {
    let mut parts = date_string.split('/');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    normalize(
        day.parse().ok()?,
        month.parse().ok()?,
        year.parse().ok()?,
    )
}

/// Build a date from possibly out-of-range components the way a lenient
/// calendar does: excess months carry into the year, excess days into the
/// month.
fn normalize(day: i32, month: i32, year: i32) -> Option<NaiveDate> {
    let month0 = i64::from(month) - 1;
    let year = i32::try_from(i64::from(year) + month0.div_euclid(12)).ok()?;
    let month = u32::try_from(month0.rem_euclid(12) + 1).ok()?;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    first_of_month.checked_add_signed(TimeDelta::try_days(i64::from(day) - 1)?)
}

/// The first instant of `date` in `tz`.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        // Midnight inside a DST gap: the day starts at the end of the gap.
        .or_else(|| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
        })
}

/// An expiry date in its persisted `D/M/Y` form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpiryDate(String);

impl ExpiryDate {
    /// Wrap a raw stored string. No validation happens here; malformed
    /// strings surface as [`UNPARSEABLE_DAYS`] when ranked.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Format a calendar date the way the date picker does: `D/M/Y` with a
    /// one-based month and no padding.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{}/{}/{}", date.day(), date.month(), date.year()))
    }

    /// The raw stored string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the stored string is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The normalized calendar date, or `None` if the string is malformed.
    #[must_use]
    pub fn to_date(&self) -> Option<NaiveDate> {
        parse_lenient(&self.0)
    }

    /// See [`days_until`].
    #[must_use]
    pub fn days_until<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> i64 {
        days_until(&self.0, now)
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NaiveDate> for ExpiryDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

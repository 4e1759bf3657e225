// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Gregorian calendar arithmetic on civil dates.
//!
//! These helpers work on `jiff::civil` values and never look at a timezone.
//! Week numbering follows ISO 8601 generalized to an arbitrary week start:
//! week 1 is the week (starting on `wkst`) that contains January 4th, which
//! is the same as the first week holding at least four days of the year.

use jiff::Span;
use jiff::civil::{self, Date, DateTime, Time};

use crate::value::datetime::TimeError;
use crate::value::rrule::WeekDay;

/// Seconds in a civil day.
pub const SECONDS_PER_DAY: i64 = 86_400;

const EPOCH: Date = civil::date(1970, 1, 1);

/// Whether `year` is a leap year in the proleptic Gregorian calendar.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
///
/// Returns 0 for a month outside 1-12.
#[must_use]
pub const fn days_in_month(month: i32, year: i32) -> i8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Number of days in `year`.
#[must_use]
pub const fn days_in_year(year: i32) -> i16 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Days elapsed since 1970-01-01, negative before it.
#[must_use]
pub fn epoch_days(date: Date) -> i64 {
    date.duration_since(EPOCH).as_secs() / SECONDS_PER_DAY
}

/// Inverse of [`epoch_days`].
///
/// # Errors
///
/// Returns an error if the resulting date is outside the supported range.
pub fn date_from_epoch_days(days: i64) -> Result<Date, TimeError> {
    let span = Span::new().try_days(days)?;
    Ok(EPOCH.checked_add(span)?)
}

/// Shift a date by a signed number of days.
///
/// # Errors
///
/// Returns an error if the resulting date is outside the supported range.
pub fn add_days(date: Date, days: i64) -> Result<Date, TimeError> {
    date_from_epoch_days(epoch_days(date) + days)
}

/// Seconds elapsed since the Unix epoch, reading the civil value as if it were UTC.
#[must_use]
pub fn wall_seconds(dt: DateTime) -> i64 {
    epoch_days(dt.date()) * SECONDS_PER_DAY
        + i64::from(dt.hour()) * 3600
        + i64::from(dt.minute()) * 60
        + i64::from(dt.second())
}

/// Inverse of [`wall_seconds`].
///
/// # Errors
///
/// Returns an error if the resulting date is outside the supported range.
pub fn datetime_from_wall_seconds(seconds: i64) -> Result<DateTime, TimeError> {
    let date = date_from_epoch_days(seconds.div_euclid(SECONDS_PER_DAY))?;
    let rem = seconds.rem_euclid(SECONDS_PER_DAY);
    #[expect(clippy::cast_possible_truncation)]
    let time = Time::new(
        (rem / 3600) as i8,
        (rem % 3600 / 60) as i8,
        (rem % 60) as i8,
        0,
    )?;
    Ok(date.to_datetime(time))
}

/// Build a civil value from possibly overflowing fields.
///
/// Months outside 1-12 roll into neighbouring years, and days, hours,
/// minutes and seconds roll into the next larger unit, so day 33 of a
/// 31-day month becomes the 2nd of the following month.
///
/// # Errors
///
/// Returns an error if the normalized year is outside the supported range.
pub fn normalize_fields(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
) -> Result<DateTime, TimeError> {
    let months = month - 1;
    let year = year + months.div_euclid(12);
    let month = months.rem_euclid(12) + 1;
    let year = i16::try_from(year).map_err(|_| TimeError::YearOutOfRange(year))?;
    #[expect(clippy::cast_possible_truncation)]
    let first = Date::new(year, month as i8, 1)?;

    let seconds = wall_seconds(first.to_datetime(Time::midnight()))
        + (day - 1) * SECONDS_PER_DAY
        + hour * 3600
        + minute * 60
        + second;
    datetime_from_wall_seconds(seconds)
}

/// The first day of the week containing `date`.
///
/// # Errors
///
/// Returns an error if the week starts before the supported range.
pub fn start_of_week(date: Date, wkst: WeekDay) -> Result<Date, TimeError> {
    let delta = (WeekDay::from(date.weekday()).index() - wkst.index()).rem_euclid(7);
    add_days(date, -i64::from(delta))
}

/// The first day of week 1 of `year`, which may fall in December of the
/// previous year.
///
/// # Errors
///
/// Returns an error if `year` is outside the supported range.
pub fn week_one_starts(year: i16, wkst: WeekDay) -> Result<Date, TimeError> {
    start_of_week(Date::new(year, 1, 4)?, wkst)
}

/// Number of weeks (52 or 53) in the week-numbering year `year`.
///
/// # Errors
///
/// Returns an error if `year` or `year + 1` is outside the supported range.
pub fn weeks_in_year(year: i16, wkst: WeekDay) -> Result<i8, TimeError> {
    let next = year
        .checked_add(1)
        .ok_or(TimeError::YearOutOfRange(i64::from(year) + 1))?;
    let days = epoch_days(week_one_starts(next, wkst)?) - epoch_days(week_one_starts(year, wkst)?);
    #[expect(clippy::cast_possible_truncation)]
    Ok((days / 7) as i8)
}

/// The week-numbering year and the week number (1-53) of `date`.
///
/// # Errors
///
/// Returns an error if a neighbouring year is outside the supported range.
pub fn week_number(date: Date, wkst: WeekDay) -> Result<(i16, i8), TimeError> {
    let year = date.year();
    if let Some(next) = year.checked_add(1) {
        let next_start = week_one_starts(next, wkst)?;
        if date >= next_start {
            return Ok((next, 1));
        }
    }

    let mut week_year = year;
    let mut start = week_one_starts(year, wkst)?;
    if date < start {
        week_year = year - 1;
        start = week_one_starts(week_year, wkst)?;
    }

    #[expect(clippy::cast_possible_truncation)]
    let week = ((epoch_days(date) - epoch_days(start)) / 7 + 1) as i8;
    Ok((week_year, week))
}

/// Day of month of the `nth` `weekday` in the month of `date`.
///
/// Positive `nth` counts from the start of the month, negative from the
/// end. Returns `None` when the month has no such weekday, or `nth` is 0.
#[must_use]
pub fn nth_weekday_of_month(date: Date, weekday: WeekDay, nth: i32) -> Option<i8> {
    let dim = i32::from(date.days_in_month());
    let first = WeekDay::from(date.first_of_month().weekday()).index();
    let first_match = 1 + (weekday.index() - first).rem_euclid(7);
    let day = match nth {
        0 => return None,
        n if n > 0 => first_match + 7 * (n - 1),
        n => {
            let last_match = first_match + 7 * ((dim - first_match) / 7);
            last_match + 7 * (n + 1)
        }
    };
    (1..=dim).contains(&day).then(|| i8::try_from(day).ok()).flatten()
}

/// Day of year of the `nth` `weekday` in the year of `date`, counted like
/// [`nth_weekday_of_month`].
#[must_use]
pub fn nth_weekday_of_year(date: Date, weekday: WeekDay, nth: i32) -> Option<i16> {
    let diy = i32::from(date.days_in_year());
    let first = WeekDay::from(date.first_of_year().weekday()).index();
    let first_match = 1 + (weekday.index() - first).rem_euclid(7);
    let day = match nth {
        0 => return None,
        n if n > 0 => first_match + 7 * (n - 1),
        n => {
            let last_match = first_match + 7 * ((diy - first_match) / 7);
            last_match + 7 * (n + 1)
        }
    };
    (1..=diy).contains(&day).then(|| i16::try_from(day).ok()).flatten()
}

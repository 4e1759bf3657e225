// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar time value with timezone-aware comparison and calendar arithmetic.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use jiff::civil::{self, Date, DateTime, Time};
use serde::{Deserialize, Serialize};

use crate::value::calendar::{
    self, SECONDS_PER_DAY, datetime_from_wall_seconds, normalize_fields, wall_seconds,
};
use crate::value::duration::Duration;
use crate::value::rrule::WeekDay;
use crate::value::timezone::{Timezone, TimezoneRegistry};
use crate::value::utc_offset::UtcOffset;

/// Errors raised while building or restoring calendar values.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum TimeError {
    /// The year does not fit the supported calendar range.
    #[error("year {0} is outside the supported range")]
    YearOutOfRange(i64),

    /// A calendar computation left the supported range.
    #[error("calendar value out of range: {0}")]
    OutOfRange(#[from] jiff::Error),

    /// A zone identifier is not known to the registry.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// A date or date-time in a timezone.
///
/// Values are plain data: cloning never aliases, and the operations that
/// look like mutation (`adjust`, `add_duration`, the setters) only touch the
/// receiver. Fields are always kept normalized, so setting day 33 of a
/// 31-day month rolls into the following month instead of clamping.
///
/// Ordering follows the represented instant. When either side is floating,
/// wall-clock fields are compared as-is; when either side is a date, only
/// the calendar dates are compared. Mixing these shapes breaks transitivity,
/// so values sorted or used as map keys together should share one shape.
#[derive(Debug, Clone)]
pub struct CalendarTime {
    dt: DateTime,
    is_date: bool,
    zone: Timezone,
}

impl CalendarTime {
    /// A date-only value in the floating zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized date is outside the supported range.
    pub fn date(year: i32, month: i32, day: i32) -> Result<Self, TimeError> {
        let dt = normalize_fields(year.into(), month.into(), day.into(), 0, 0, 0)?;
        Ok(Self {
            dt,
            is_date: true,
            zone: Timezone::Floating,
        })
    }

    /// A date-time value in `zone`. Overflowing fields are normalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized value is outside the supported range.
    pub fn date_time(
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: i32,
        zone: Timezone,
    ) -> Result<Self, TimeError> {
        let dt = normalize_fields(
            year.into(),
            month.into(),
            day.into(),
            hour.into(),
            minute.into(),
            second.into(),
        )?;
        Ok(Self {
            dt,
            is_date: false,
            zone,
        })
    }

    /// Wrap a civil date-time.
    #[must_use]
    pub fn from_civil(dt: DateTime, is_date: bool, zone: Timezone) -> Self {
        let dt = if is_date {
            dt.date().to_datetime(Time::midnight())
        } else {
            dt
        };
        Self { dt, is_date, zone }
    }

    /// Wrap a civil date as a date-only value in the floating zone.
    #[must_use]
    pub fn from_civil_date(date: Date) -> Self {
        Self::from_civil(date.to_datetime(Time::midnight()), true, Timezone::Floating)
    }

    /// The date of the `day_of_year`-th day of `year`, normalized when the
    /// day falls outside the year.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized date is outside the supported range.
    pub fn from_day_of_year(day_of_year: i32, year: i32) -> Result<Self, TimeError> {
        Self::date(year, 1, day_of_year)
    }

    /// The instant `seconds` after the Unix epoch, expressed in `zone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is outside the supported range.
    pub fn from_unix_time(seconds: i64, zone: Timezone) -> Result<Self, TimeError> {
        let offset = zone.utc_offset_at(seconds);
        let dt = datetime_from_wall_seconds(seconds + i64::from(offset.to_seconds()))?;
        Ok(Self {
            dt,
            is_date: false,
            zone,
        })
    }

    /// The start of week 1 of `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if `year` is outside the supported range.
    pub fn week_one_starts(year: i16, wkst: WeekDay) -> Result<Self, TimeError> {
        calendar::week_one_starts(year, wkst).map(Self::from_civil_date)
    }

    /// Whether `year` is a Gregorian leap year.
    #[must_use]
    pub const fn is_leap_year(year: i32) -> bool {
        calendar::is_leap_year(year)
    }

    /// Number of days in `month` of `year`.
    #[must_use]
    pub const fn days_in_month(month: i32, year: i32) -> i8 {
        calendar::days_in_month(month, year)
    }

    /// Year component.
    #[must_use]
    pub fn year(&self) -> i16 {
        self.dt.year()
    }

    /// Month component, 1-12.
    #[must_use]
    pub fn month(&self) -> i8 {
        self.dt.month()
    }

    /// Day component, 1-31.
    #[must_use]
    pub fn day(&self) -> i8 {
        self.dt.day()
    }

    /// Hour component, 0-23. Always 0 for a date.
    #[must_use]
    pub fn hour(&self) -> i8 {
        self.dt.hour()
    }

    /// Minute component, 0-59. Always 0 for a date.
    #[must_use]
    pub fn minute(&self) -> i8 {
        self.dt.minute()
    }

    /// Second component, 0-59. Always 0 for a date.
    #[must_use]
    pub fn second(&self) -> i8 {
        self.dt.second()
    }

    /// Whether this value carries only a date.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        self.is_date
    }

    /// The zone the wall-clock fields are expressed in.
    #[must_use]
    pub const fn zone(&self) -> &Timezone {
        &self.zone
    }

    /// The wall-clock fields as a civil date-time.
    #[must_use]
    pub const fn civil(&self) -> DateTime {
        self.dt
    }

    /// The calendar date.
    #[must_use]
    pub fn civil_date(&self) -> Date {
        self.dt.date()
    }

    /// Set the year, keeping the other fields and normalizing.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the supported range.
    pub fn set_year(&mut self, year: i32) -> Result<(), TimeError> {
        self.set_fields(year.into(), self.month().into(), self.day().into())
    }

    /// Set the month, rolling into neighbouring years when out of 1-12.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the supported range.
    pub fn set_month(&mut self, month: i32) -> Result<(), TimeError> {
        self.set_fields(self.year().into(), month.into(), self.day().into())
    }

    /// Set the day of month, rolling into neighbouring months when out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the supported range.
    pub fn set_day(&mut self, day: i32) -> Result<(), TimeError> {
        self.set_fields(self.year().into(), self.month().into(), day.into())
    }

    /// Turn the value into a date (dropping the time) or back into a date-time.
    pub fn set_is_date(&mut self, is_date: bool) {
        self.is_date = is_date;
        if is_date {
            self.dt = self.dt.date().to_datetime(Time::midnight());
        }
    }

    /// Replace the zone without touching the wall-clock fields.
    #[must_use]
    pub fn with_zone(mut self, zone: Timezone) -> Self {
        self.zone = zone;
        self
    }

    fn set_fields(&mut self, year: i64, month: i64, day: i64) -> Result<(), TimeError> {
        self.dt = normalize_fields(
            year,
            month,
            day,
            self.hour().into(),
            self.minute().into(),
            self.second().into(),
        )?;
        Ok(())
    }

    /// Day of the week.
    #[must_use]
    pub fn day_of_week(&self) -> WeekDay {
        self.dt.weekday().into()
    }

    /// Day of the year, 1-366.
    #[must_use]
    pub fn day_of_year(&self) -> i16 {
        self.dt.day_of_year()
    }

    /// The first day of this week as a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the week starts outside the supported range.
    pub fn start_of_week(&self, wkst: WeekDay) -> Result<Self, TimeError> {
        let date = calendar::start_of_week(self.civil_date(), wkst)?;
        Ok(self.with_civil_date(date))
    }

    /// The last day of this week as a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the week ends outside the supported range.
    pub fn end_of_week(&self, wkst: WeekDay) -> Result<Self, TimeError> {
        let start = calendar::start_of_week(self.civil_date(), wkst)?;
        Ok(self.with_civil_date(calendar::add_days(start, 6)?))
    }

    /// The first day of this month as a date.
    #[must_use]
    pub fn start_of_month(&self) -> Self {
        self.with_civil_date(self.civil_date().first_of_month())
    }

    /// The last day of this month as a date.
    #[must_use]
    pub fn end_of_month(&self) -> Self {
        self.with_civil_date(self.civil_date().last_of_month())
    }

    /// The first day of this year as a date.
    #[must_use]
    pub fn start_of_year(&self) -> Self {
        self.with_civil_date(self.civil_date().first_of_year())
    }

    /// The last day of this year as a date.
    #[must_use]
    pub fn end_of_year(&self) -> Self {
        self.with_civil_date(self.civil_date().last_of_year())
    }

    fn with_civil_date(&self, date: Date) -> Self {
        Self {
            dt: date.to_datetime(Time::midnight()),
            is_date: true,
            zone: self.zone.clone(),
        }
    }

    /// Day of year on which the week containing this value starts; zero or
    /// negative when the week began in the previous year.
    ///
    /// # Errors
    ///
    /// Returns an error if the week starts outside the supported range.
    pub fn start_doy_week(&self, wkst: WeekDay) -> Result<i32, TimeError> {
        let delta = (self.day_of_week().index() - wkst.index()).rem_euclid(7);
        Ok(i32::from(self.day_of_year()) - delta)
    }

    /// Day of month of the `pos`-th `weekday` in this month, counting from the
    /// end when `pos` is negative.
    #[must_use]
    pub fn nth_week_day(&self, weekday: WeekDay, pos: i32) -> Option<i8> {
        calendar::nth_weekday_of_month(self.civil_date(), weekday, pos)
    }

    /// Whether this value is the `pos`-th `weekday` of its month. A zero
    /// `pos` only checks the weekday.
    #[must_use]
    pub fn is_nth_week_day(&self, weekday: WeekDay, pos: i32) -> bool {
        if self.day_of_week() != weekday {
            return false;
        }
        pos == 0 || self.nth_week_day(weekday, pos) == Some(self.day())
    }

    /// ISO 8601 week number with a configurable week start.
    ///
    /// # Errors
    ///
    /// Returns an error if a neighbouring year is outside the supported range.
    pub fn week_number(&self, wkst: WeekDay) -> Result<i8, TimeError> {
        calendar::week_number(self.civil_date(), wkst).map(|(_, week)| week)
    }

    /// Shift the wall-clock fields, normalizing the result.
    ///
    /// Dates only move by whole days.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the supported range.
    pub fn adjust(
        &mut self,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    ) -> Result<(), TimeError> {
        let delta = if self.is_date {
            days * SECONDS_PER_DAY
        } else {
            days * SECONDS_PER_DAY + hours * 3600 + minutes * 60 + seconds
        };
        self.dt = datetime_from_wall_seconds(wall_seconds(self.dt) + delta)?;
        Ok(())
    }

    /// Add a duration to the wall-clock fields. A date moves by the whole
    /// days the duration spans.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the supported range.
    pub fn add_duration(&mut self, duration: &Duration) -> Result<(), TimeError> {
        let seconds = duration.to_seconds();
        if self.is_date {
            self.adjust(seconds / SECONDS_PER_DAY, 0, 0, 0)
        } else {
            self.adjust(0, 0, 0, seconds)
        }
    }

    /// Wall-clock difference `self - other`, ignoring zones.
    #[must_use]
    pub fn subtract_date(&self, other: &Self) -> Duration {
        Duration::from_seconds(wall_seconds(self.dt) - wall_seconds(other.dt))
    }

    /// Instant difference `self - other`.
    #[must_use]
    pub fn subtract_date_tz(&self, other: &Self) -> Duration {
        Duration::from_seconds(self.to_unix_time() - other.to_unix_time())
    }

    /// Compare by represented instant. See the type docs for floating and
    /// date-only values.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.is_date || other.is_date {
            return self.civil_date().cmp(&other.civil_date());
        }
        if self.zone.is_floating() || other.zone.is_floating() {
            return self.dt.cmp(&other.dt);
        }
        self.to_unix_time().cmp(&other.to_unix_time())
    }

    /// Compare calendar dates after converting both values to `zone`.
    ///
    /// # Errors
    ///
    /// Returns an error if a conversion leaves the supported range.
    pub fn compare_date_only_tz(
        &self,
        other: &Self,
        zone: &Timezone,
    ) -> Result<Ordering, TimeError> {
        let a = self.convert_to_zone(zone)?;
        let b = other.convert_to_zone(zone)?;
        Ok(a.civil_date().cmp(&b.civil_date()))
    }

    /// The same instant expressed in `zone`. Dates and values already in
    /// `zone` only have their zone replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the supported range.
    pub fn convert_to_zone(&self, zone: &Timezone) -> Result<Self, TimeError> {
        if self.is_date || self.zone.tzid() == zone.tzid() {
            return Ok(self.clone().with_zone(zone.clone()));
        }
        Timezone::convert_time(self, &self.zone, zone)
    }

    /// The UTC offset in effect for this value in its own zone.
    #[must_use]
    pub fn utc_offset(&self) -> UtcOffset {
        self.zone.utc_offset(self)
    }

    /// Seconds since the Unix epoch. Floating values are read as UTC.
    #[must_use]
    pub fn to_unix_time(&self) -> i64 {
        wall_seconds(self.dt) - i64::from(self.utc_offset().to_seconds())
    }

    /// The iCalendar basic form, e.g. `20240101T100000Z` or `20240101`.
    #[must_use]
    pub fn to_ical_string(&self) -> String {
        let date = format!("{:04}{:02}{:02}", self.year(), self.month(), self.day());
        if self.is_date {
            return date;
        }
        let utc = if self.zone.is_utc() { "Z" } else { "" };
        format!(
            "{date}T{:02}{:02}{:02}{utc}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }

    /// Plain snapshot of the fields and zone identifier.
    #[must_use]
    pub fn to_data(&self) -> TimeData {
        TimeData {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            hour: self.hour(),
            minute: self.minute(),
            second: self.second(),
            is_date: self.is_date,
            tzid: (!self.zone.is_floating()).then(|| self.zone.tzid().to_owned()),
        }
    }

    /// Rebuild a value from its snapshot, resolving the zone in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone is unknown or the fields are out of range.
    pub fn from_data(data: &TimeData, registry: &TimezoneRegistry) -> Result<Self, TimeError> {
        let zone = registry.resolve(data.tzid.as_deref())?;
        let mut time = Self::date_time(
            data.year.into(),
            data.month.into(),
            data.day.into(),
            data.hour.into(),
            data.minute.into(),
            data.second.into(),
            zone,
        )?;
        time.set_is_date(data.is_date);
        Ok(time)
    }
}

impl PartialEq for CalendarTime {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for CalendarTime {}

impl PartialOrd for CalendarTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Display for CalendarTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())?;
        if self.is_date {
            return Ok(());
        }
        write!(
            f,
            "T{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )?;
        if self.zone.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

impl From<civil::Date> for CalendarTime {
    fn from(date: civil::Date) -> Self {
        Self::from_civil_date(date)
    }
}

/// Plain, serializable snapshot of a [`CalendarTime`].
///
/// The zone travels as its identifier; `None` stands for floating time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[expect(missing_docs)]
pub struct TimeData {
    pub year: i16,
    pub month: i8,
    pub day: i8,
    pub hour: i8,
    pub minute: i8,
    pub second: i8,
    pub is_date: bool,
    pub tzid: Option<String>,
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule model as defined in RFC 5545 Section 3.3.10.
//!
//! A [`RecurrenceRule`] is validated when it is built, so every rule that
//! exists is one the iterator can expand.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_RRULE_BYDAY,
    KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND,
    KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_FREQ,
    KW_RRULE_FREQ_DAILY, KW_RRULE_FREQ_HOURLY, KW_RRULE_FREQ_MINUTELY, KW_RRULE_FREQ_MONTHLY,
    KW_RRULE_FREQ_SECONDLY, KW_RRULE_FREQ_WEEKLY, KW_RRULE_FREQ_YEARLY, KW_RRULE_INTERVAL,
    KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::datetime::{CalendarTime, TimeData, TimeError};
use crate::value::timezone::TimezoneRegistry;

/// Errors raised when a recurrence rule is malformed.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleError {
    /// The rule has no frequency.
    #[error("recurrence rule has no FREQ")]
    MissingFrequency,

    /// INTERVAL is zero.
    #[error("INTERVAL must be at least 1")]
    ZeroInterval,

    /// COUNT is zero.
    #[error("COUNT must be at least 1")]
    ZeroCount,

    /// Both bounds are set.
    #[error("COUNT and UNTIL must not occur in the same rule")]
    CountAndUntil,

    /// A BY-part value is outside its legal range.
    #[error("{kind} value {value} is out of range")]
    ValueOutOfRange {
        /// Offending part
        kind: ByPartKind,
        /// Offending value
        value: i32,
    },

    /// A BY-part is meaningless for the rule's frequency.
    #[error("{kind} is not allowed with FREQ={freq}")]
    PartNotAllowed {
        /// Offending part
        kind: ByPartKind,
        /// Frequency of the rule
        freq: Frequency,
    },

    /// A BYDAY entry carries an ordinal the frequency cannot scope.
    #[error("BYDAY ordinal {ordinal} is not allowed with FREQ={freq}")]
    OrdinalNotAllowed {
        /// Offending entry
        ordinal: WeekDayNum,
        /// Frequency of the rule
        freq: Frequency,
    },

    /// BYSETPOS has nothing to select from.
    #[error("BYSETPOS requires another BY-part")]
    SetPosWithoutFilter,

    /// Time-of-day expansion was requested for a date-only series.
    #[error("time-of-day recurrence requires a date-time series start")]
    TimePartWithDate,

    /// UNTIL could not be restored.
    #[error("invalid UNTIL: {0}")]
    Until(#[from] TimeError),
}

/// Recurrence frequency
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Whether the frequency is finer than a day.
    #[must_use]
    pub const fn is_sub_daily(self) -> bool {
        matches!(self, Self::Secondly | Self::Minutely | Self::Hourly)
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Secondly => write!(f, "{KW_RRULE_FREQ_SECONDLY}"),
            Frequency::Minutely => write!(f, "{KW_RRULE_FREQ_MINUTELY}"),
            Frequency::Hourly => write!(f, "{KW_RRULE_FREQ_HOURLY}"),
            Frequency::Daily => write!(f, "{KW_RRULE_FREQ_DAILY}"),
            Frequency::Weekly => write!(f, "{KW_RRULE_FREQ_WEEKLY}"),
            Frequency::Monthly => write!(f, "{KW_RRULE_FREQ_MONTHLY}"),
            Frequency::Yearly => write!(f, "{KW_RRULE_FREQ_YEARLY}"),
        }
    }
}

/// Day of the week
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum WeekDay {
    #[serde(rename = "SU")]
    #[strum(serialize = "SU", serialize = "Sunday")]
    Sunday,
    #[default]
    #[serde(rename = "MO")]
    #[strum(serialize = "MO", serialize = "Monday")]
    Monday,
    #[serde(rename = "TU")]
    #[strum(serialize = "TU", serialize = "Tuesday")]
    Tuesday,
    #[serde(rename = "WE")]
    #[strum(serialize = "WE", serialize = "Wednesday")]
    Wednesday,
    #[serde(rename = "TH")]
    #[strum(serialize = "TH", serialize = "Thursday")]
    Thursday,
    #[serde(rename = "FR")]
    #[strum(serialize = "FR", serialize = "Friday")]
    Friday,
    #[serde(rename = "SA")]
    #[strum(serialize = "SA", serialize = "Saturday")]
    Saturday,
}

impl WeekDay {
    /// Zero-based index counting from Sunday.
    #[must_use]
    pub const fn index(self) -> i32 {
        match self {
            WeekDay::Sunday => 0,
            WeekDay::Monday => 1,
            WeekDay::Tuesday => 2,
            WeekDay::Wednesday => 3,
            WeekDay::Thursday => 4,
            WeekDay::Friday => 5,
            WeekDay::Saturday => 6,
        }
    }

    /// Inverse of [`WeekDay::index`], wrapping modulo 7.
    #[must_use]
    pub const fn from_index(index: i32) -> Self {
        match index.rem_euclid(7) {
            0 => WeekDay::Sunday,
            1 => WeekDay::Monday,
            2 => WeekDay::Tuesday,
            3 => WeekDay::Wednesday,
            4 => WeekDay::Thursday,
            5 => WeekDay::Friday,
            _ => WeekDay::Saturday,
        }
    }
}

impl From<jiff::civil::Weekday> for WeekDay {
    fn from(weekday: jiff::civil::Weekday) -> Self {
        Self::from_index(weekday.to_sunday_zero_offset().into())
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekDay::Sunday => write!(f, "{KW_DAY_SU}"),
            WeekDay::Monday => write!(f, "{KW_DAY_MO}"),
            WeekDay::Tuesday => write!(f, "{KW_DAY_TU}"),
            WeekDay::Wednesday => write!(f, "{KW_DAY_WE}"),
            WeekDay::Thursday => write!(f, "{KW_DAY_TH}"),
            WeekDay::Friday => write!(f, "{KW_DAY_FR}"),
            WeekDay::Saturday => write!(f, "{KW_DAY_SA}"),
        }
    }
}

/// Day of week with optional occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// Occurrence within the period, negative counting from the end
    pub occurrence: Option<i8>,
}

impl WeekDayNum {
    /// Every `day` of the period.
    #[must_use]
    pub const fn every(day: WeekDay) -> Self {
        Self {
            day,
            occurrence: None,
        }
    }

    /// The `occurrence`-th `day` of the period.
    #[must_use]
    pub const fn nth(occurrence: i8, day: WeekDay) -> Self {
        Self {
            day,
            occurrence: Some(occurrence),
        }
    }

    /// Pack into a single integer, `sign * (|n| * 8 + weekday + 1)`.
    #[must_use]
    pub fn encode(self) -> i32 {
        let dow = self.day.index() + 1;
        match self.occurrence {
            Some(n) if n < 0 => -(i32::from(n.unsigned_abs()) * 8 + dow),
            Some(n) => i32::from(n) * 8 + dow,
            None => dow,
        }
    }

    /// Inverse of [`WeekDayNum::encode`]; `None` for an invalid weekday.
    #[must_use]
    pub fn decode(value: i32) -> Option<Self> {
        let abs = value.unsigned_abs();
        let dow = abs % 8;
        if dow == 0 || dow > 7 {
            return None;
        }
        let n = i8::try_from(abs / 8).ok()?;
        let day = WeekDay::from_index(i32::try_from(dow).ok()? - 1);
        let occurrence = match n {
            0 => None,
            n if value < 0 => Some(-n),
            n => Some(n),
        };
        Some(Self { day, occurrence })
    }
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.occurrence {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.day)
    }
}

/// Kind of BY-part filter, in RFC 5545 rule-part order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[expect(missing_docs)]
pub enum ByPartKind {
    Second,
    Minute,
    Hour,
    Day,
    MonthDay,
    YearDay,
    WeekNo,
    Month,
    SetPos,
}

impl ByPartKind {
    /// Whether `value` is legal for this part, ignoring frequency.
    #[must_use]
    pub fn accepts(self, value: i32) -> bool {
        let signed = |max: i32| value != 0 && value.abs() <= max;
        match self {
            ByPartKind::Second => (0..=60).contains(&value),
            ByPartKind::Minute => (0..=59).contains(&value),
            ByPartKind::Hour => (0..=23).contains(&value),
            ByPartKind::Month => (1..=12).contains(&value),
            ByPartKind::MonthDay => signed(31),
            ByPartKind::YearDay | ByPartKind::SetPos => signed(366),
            ByPartKind::WeekNo => signed(53),
            ByPartKind::Day => WeekDayNum::decode(value).is_some(),
        }
    }
}

impl Display for ByPartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByPartKind::Second => write!(f, "{KW_RRULE_BYSECOND}"),
            ByPartKind::Minute => write!(f, "{KW_RRULE_BYMINUTE}"),
            ByPartKind::Hour => write!(f, "{KW_RRULE_BYHOUR}"),
            ByPartKind::Day => write!(f, "{KW_RRULE_BYDAY}"),
            ByPartKind::MonthDay => write!(f, "{KW_RRULE_BYMONTHDAY}"),
            ByPartKind::YearDay => write!(f, "{KW_RRULE_BYYEARDAY}"),
            ByPartKind::WeekNo => write!(f, "{KW_RRULE_BYWEEKNO}"),
            ByPartKind::Month => write!(f, "{KW_RRULE_BYMONTH}"),
            ByPartKind::SetPos => write!(f, "{KW_RRULE_BYSETPOS}"),
        }
    }
}

/// Recurrence rule
///
/// BY-part values are kept sorted and free of duplicates. BYDAY entries
/// are stored in their [`WeekDayNum::encode`] form.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRule {
    freq: Frequency,
    interval: u32,
    week_start: WeekDay,
    until: Option<CalendarTime>,
    count: Option<u32>,
    parts: BTreeMap<ByPartKind, Vec<i32>>,
}

impl RecurrenceRule {
    /// Start building a rule with the given frequency.
    #[must_use]
    pub fn builder(freq: Frequency) -> RuleBuilder {
        RuleBuilder {
            freq,
            interval: 1,
            week_start: WeekDay::Monday,
            until: None,
            count: None,
            parts: BTreeMap::new(),
        }
    }

    /// Frequency of recurrence
    #[must_use]
    pub const fn freq(&self) -> Frequency {
        self.freq
    }

    /// Interval between recurrences, at least 1
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Start day of week
    #[must_use]
    pub const fn week_start(&self) -> WeekDay {
        self.week_start
    }

    /// Inclusive upper bound
    #[must_use]
    pub const fn until(&self) -> Option<&CalendarTime> {
        self.until.as_ref()
    }

    /// Number of occurrences
    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        self.count
    }

    /// Values of one BY-part, empty when absent.
    #[must_use]
    pub fn part(&self, kind: ByPartKind) -> &[i32] {
        self.parts.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Whether the BY-part is present.
    #[must_use]
    pub fn has_part(&self, kind: ByPartKind) -> bool {
        self.parts.contains_key(&kind)
    }

    /// All present BY-parts.
    pub fn parts(&self) -> impl Iterator<Item = (ByPartKind, &[i32])> {
        self.parts.iter().map(|(kind, values)| (*kind, values.as_slice()))
    }

    /// Decoded BYDAY entries.
    #[must_use]
    pub fn by_day(&self) -> Vec<WeekDayNum> {
        self.part(ByPartKind::Day)
            .iter()
            .filter_map(|v| WeekDayNum::decode(*v))
            .collect()
    }

    /// Whether the rule produces a bounded number of occurrences.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.count.is_some() || self.until.is_some()
    }

    /// Whether the rule is bounded by COUNT.
    #[must_use]
    pub const fn is_by_count(&self) -> bool {
        self.count.is_some()
    }

    /// Check the rule against a series start.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::TimePartWithDate`] when a date-only start is
    /// combined with a sub-daily frequency or a time-of-day BY-part.
    pub fn check_start(&self, dtstart: &CalendarTime) -> Result<(), RuleError> {
        let has_time_parts = [ByPartKind::Hour, ByPartKind::Minute, ByPartKind::Second]
            .into_iter()
            .any(|kind| self.has_part(kind));
        if dtstart.is_date() && (self.freq.is_sub_daily() || has_time_parts) {
            return Err(RuleError::TimePartWithDate);
        }
        Ok(())
    }

    /// Plain snapshot of the rule.
    #[must_use]
    pub fn to_data(&self) -> RuleData {
        RuleData {
            freq: Some(self.freq),
            interval: self.interval,
            week_start: Some(self.week_start),
            until: self.until.as_ref().map(CalendarTime::to_data),
            count: self.count,
            parts: self.parts.clone(),
        }
    }

    /// Rebuild and re-validate a rule from its snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot describes a malformed rule or its
    /// UNTIL zone is unknown to `registry`.
    pub fn from_data(data: &RuleData, registry: &TimezoneRegistry) -> Result<Self, RuleError> {
        let freq = data.freq.ok_or(RuleError::MissingFrequency)?;
        let mut builder = Self::builder(freq)
            .interval(data.interval)
            .week_start(data.week_start.unwrap_or_default());
        if let Some(until) = &data.until {
            builder = builder.until(CalendarTime::from_data(until, registry)?);
        }
        if let Some(count) = data.count {
            builder = builder.count(count);
        }
        for (kind, values) in &data.parts {
            builder = builder.part(*kind, values.iter().copied());
        }
        builder.build()
    }
}

impl Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{KW_RRULE_FREQ}={}", self.freq)?;
        if let Some(count) = self.count {
            write!(f, ";{KW_RRULE_COUNT}={count}")?;
        }
        if self.interval > 1 {
            write!(f, ";{KW_RRULE_INTERVAL}={}", self.interval)?;
        }
        for (kind, values) in &self.parts {
            write!(f, ";{kind}=")?;
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                match (kind, WeekDayNum::decode(*value)) {
                    (ByPartKind::Day, Some(day)) => write!(f, "{day}")?,
                    _ => write!(f, "{value}")?,
                }
            }
        }
        if let Some(until) = &self.until {
            write!(f, ";{KW_RRULE_UNTIL}={}", until.to_ical_string())?;
        }
        if self.week_start != WeekDay::Monday {
            write!(f, ";{KW_RRULE_WKST}={}", self.week_start)?;
        }
        Ok(())
    }
}

/// Builder for [`RecurrenceRule`]; all checks run in [`RuleBuilder::build`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    freq: Frequency,
    interval: u32,
    week_start: WeekDay,
    until: Option<CalendarTime>,
    count: Option<u32>,
    parts: BTreeMap<ByPartKind, Vec<i32>>,
}

impl RuleBuilder {
    /// Set INTERVAL.
    #[must_use]
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Set COUNT.
    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Set UNTIL.
    #[must_use]
    pub fn until(mut self, until: CalendarTime) -> Self {
        self.until = Some(until);
        self
    }

    /// Set WKST.
    #[must_use]
    pub fn week_start(mut self, week_start: WeekDay) -> Self {
        self.week_start = week_start;
        self
    }

    /// Append BYDAY entries.
    #[must_use]
    pub fn by_day(self, days: impl IntoIterator<Item = WeekDayNum>) -> Self {
        self.part(ByPartKind::Day, days.into_iter().map(WeekDayNum::encode))
    }

    /// Append raw values to a BY-part. BYDAY values use the
    /// [`WeekDayNum::encode`] form.
    #[must_use]
    pub fn part(mut self, kind: ByPartKind, values: impl IntoIterator<Item = i32>) -> Self {
        self.parts.entry(kind).or_default().extend(values);
        self
    }

    /// Validate and build the rule.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] the rule violates.
    pub fn build(mut self) -> Result<RecurrenceRule, RuleError> {
        if self.interval == 0 {
            return Err(RuleError::ZeroInterval);
        }
        if self.count == Some(0) {
            return Err(RuleError::ZeroCount);
        }
        if self.count.is_some() && self.until.is_some() {
            return Err(RuleError::CountAndUntil);
        }

        self.parts.retain(|_, values| !values.is_empty());
        for values in self.parts.values_mut() {
            values.sort_unstable();
            values.dedup();
        }

        for (kind, values) in &self.parts {
            if let Some(value) = values.iter().find(|v| !kind.accepts(**v)) {
                return Err(RuleError::ValueOutOfRange {
                    kind: *kind,
                    value: *value,
                });
            }
            if !part_allowed(*kind, self.freq) {
                return Err(RuleError::PartNotAllowed {
                    kind: *kind,
                    freq: self.freq,
                });
            }
        }

        if self.parts.contains_key(&ByPartKind::SetPos) && self.parts.len() == 1 {
            return Err(RuleError::SetPosWithoutFilter);
        }

        self.check_ordinals()?;

        Ok(RecurrenceRule {
            freq: self.freq,
            interval: self.interval,
            week_start: self.week_start,
            until: self.until,
            count: self.count,
            parts: self.parts,
        })
    }

    fn check_ordinals(&self) -> Result<(), RuleError> {
        let has_week_no = self.parts.contains_key(&ByPartKind::WeekNo);
        let month_scoped = self.freq == Frequency::Monthly
            || (self.freq == Frequency::Yearly && self.parts.contains_key(&ByPartKind::Month));
        let allowed = self.freq == Frequency::Monthly
            || (self.freq == Frequency::Yearly && !has_week_no);
        let max = if month_scoped { 5 } else { 53 };

        let days = self.parts.get(&ByPartKind::Day).into_iter().flatten();
        for ordinal in days.filter_map(|v| WeekDayNum::decode(*v)) {
            let Some(n) = ordinal.occurrence else {
                continue;
            };
            if !allowed {
                return Err(RuleError::OrdinalNotAllowed {
                    ordinal,
                    freq: self.freq,
                });
            }
            if n == 0 || n.unsigned_abs() > max {
                return Err(RuleError::ValueOutOfRange {
                    kind: ByPartKind::Day,
                    value: ordinal.encode(),
                });
            }
        }
        Ok(())
    }
}

fn part_allowed(kind: ByPartKind, freq: Frequency) -> bool {
    match kind {
        ByPartKind::WeekNo => freq == Frequency::Yearly,
        ByPartKind::YearDay => !matches!(
            freq,
            Frequency::Daily | Frequency::Weekly | Frequency::Monthly
        ),
        ByPartKind::MonthDay => freq != Frequency::Weekly,
        _ => true,
    }
}

/// Plain, serializable snapshot of a [`RecurrenceRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleData {
    /// Frequency; a snapshot without one is rejected on restore.
    pub freq: Option<Frequency>,
    /// Interval between recurrences
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Start day of week, Monday when absent
    #[serde(default)]
    pub week_start: Option<WeekDay>,
    /// Inclusive upper bound
    #[serde(default)]
    pub until: Option<TimeData>,
    /// Number of occurrences
    #[serde(default)]
    pub count: Option<u32>,
    /// BY-part values
    #[serde(default)]
    pub parts: BTreeMap<ByPartKind, Vec<i32>>,
}

const fn default_interval() -> u32 {
    1
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Timezones as a pluggable offset capability, and a caller-owned registry.

use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use jiff::civil::DateTime;
use jiff::tz::AmbiguousOffset;

use crate::keyword::{KW_TZID_FLOATING, KW_TZID_UTC};
use crate::value::calendar::{datetime_from_wall_seconds, wall_seconds};
use crate::value::datetime::{CalendarTime, TimeError};
use crate::value::utc_offset::UtcOffset;

/// Source of UTC offsets for one zone.
///
/// Implementations are read-only once built and may be shared between any
/// number of calendar values and iterators.
pub trait ZoneRules: Debug + Send + Sync {
    /// Zone identifier, unique within a [`TimezoneRegistry`].
    fn tzid(&self) -> &str;

    /// Offset in effect at the local wall-clock time `local`.
    ///
    /// Times skipped by a forward transition take the offset before it;
    /// repeated times take the earlier of the two.
    fn offset_for_local(&self, local: DateTime) -> UtcOffset;

    /// Offset in effect at `seconds` after the Unix epoch.
    fn offset_at(&self, seconds: i64) -> UtcOffset {
        let first = self.offset_for_local(wall_at(seconds, 0));
        self.offset_for_local(wall_at(seconds, first.to_seconds()))
    }
}

fn wall_at(seconds: i64, offset: i32) -> DateTime {
    datetime_from_wall_seconds(seconds + i64::from(offset)).unwrap_or(DateTime::MIN)
}

/// The zone a [`CalendarTime`] is expressed in.
#[derive(Debug, Clone)]
pub enum Timezone {
    /// Coordinated Universal Time.
    Utc,
    /// No zone; wall-clock time read in whatever zone the consumer is in.
    Floating,
    /// A zone backed by externally supplied rules.
    Custom(Arc<dyn ZoneRules>),
}

impl Timezone {
    /// Wrap zone rules.
    pub fn custom(rules: impl ZoneRules + 'static) -> Self {
        Self::Custom(Arc::new(rules))
    }

    /// Zone identifier.
    #[must_use]
    pub fn tzid(&self) -> &str {
        match self {
            Self::Utc => KW_TZID_UTC,
            Self::Floating => KW_TZID_FLOATING,
            Self::Custom(rules) => rules.tzid(),
        }
    }

    /// Whether this is the UTC zone.
    #[must_use]
    pub const fn is_utc(&self) -> bool {
        matches!(self, Self::Utc)
    }

    /// Whether this is the floating zone.
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        matches!(self, Self::Floating)
    }

    /// Offset in effect for the wall-clock fields of `time`, read in this zone.
    #[must_use]
    pub fn utc_offset(&self, time: &CalendarTime) -> UtcOffset {
        match self {
            Self::Utc | Self::Floating => UtcOffset::UTC,
            Self::Custom(rules) => rules.offset_for_local(time.civil()),
        }
    }

    /// Offset in effect at `seconds` after the Unix epoch.
    #[must_use]
    pub fn utc_offset_at(&self, seconds: i64) -> UtcOffset {
        match self {
            Self::Utc | Self::Floating => UtcOffset::UTC,
            Self::Custom(rules) => rules.offset_at(seconds),
        }
    }

    /// Re-express `time`, read as wall-clock time in `from`, in `to`.
    ///
    /// Dates, identical zones and the floating zone on either side only
    /// swap the zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the converted value is outside the supported range.
    pub fn convert_time(
        time: &CalendarTime,
        from: &Self,
        to: &Self,
    ) -> Result<CalendarTime, TimeError> {
        if time.is_date() || from == to || from.is_floating() || to.is_floating() {
            return Ok(time.clone().with_zone(to.clone()));
        }
        let offset = from.utc_offset(time);
        let instant = wall_seconds(time.civil()) - i64::from(offset.to_seconds());
        CalendarTime::from_unix_time(instant, to.clone())
    }
}

impl PartialEq for Timezone {
    fn eq(&self, other: &Self) -> bool {
        self.tzid() == other.tzid()
    }
}

impl Eq for Timezone {}

impl Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tzid())
    }
}

/// A zone with a constant offset.
#[derive(Debug, Clone)]
pub struct FixedZone {
    tzid: String,
    offset: UtcOffset,
}

impl FixedZone {
    /// Create a fixed-offset zone.
    pub fn new(tzid: impl Into<String>, offset: UtcOffset) -> Self {
        Self {
            tzid: tzid.into(),
            offset,
        }
    }
}

impl ZoneRules for FixedZone {
    fn tzid(&self) -> &str {
        &self.tzid
    }

    fn offset_for_local(&self, _local: DateTime) -> UtcOffset {
        self.offset
    }

    fn offset_at(&self, _seconds: i64) -> UtcOffset {
        self.offset
    }
}

/// A zone backed by `jiff` transition data.
#[derive(Debug, Clone)]
pub struct JiffZone {
    tzid: String,
    tz: jiff::tz::TimeZone,
}

impl JiffZone {
    /// Wrap a `jiff` timezone under the given identifier.
    pub fn new(tzid: impl Into<String>, tz: jiff::tz::TimeZone) -> Self {
        Self {
            tzid: tzid.into(),
            tz,
        }
    }

    /// Look up an IANA zone in the host's timezone database.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone is not found.
    pub fn from_database(tzid: &str) -> Result<Self, TimeError> {
        let tz = jiff::tz::TimeZone::get(tzid)
            .map_err(|_| TimeError::UnknownTimezone(tzid.to_owned()))?;
        Ok(Self::new(tzid, tz))
    }
}

impl ZoneRules for JiffZone {
    fn tzid(&self) -> &str {
        &self.tzid
    }

    fn offset_for_local(&self, local: DateTime) -> UtcOffset {
        match self.tz.to_ambiguous_timestamp(local).offset() {
            AmbiguousOffset::Unambiguous { offset }
            | AmbiguousOffset::Gap { before: offset, .. }
            | AmbiguousOffset::Fold { before: offset, .. } => offset.into(),
        }
    }

    fn offset_at(&self, seconds: i64) -> UtcOffset {
        match jiff::Timestamp::from_second(seconds) {
            Ok(ts) => self.tz.to_offset(ts).into(),
            Err(_) => self.offset_for_local(wall_at(seconds, 0)),
        }
    }
}

/// Caller-owned lookup table from zone identifier to [`Timezone`].
///
/// Populated once up front and only read while expanding. UTC and the
/// floating zone are always present.
#[derive(Debug, Clone)]
pub struct TimezoneRegistry {
    zones: HashMap<String, Timezone>,
}

impl TimezoneRegistry {
    /// A registry holding only the built-in zones.
    #[must_use]
    pub fn new() -> Self {
        let zones = [Timezone::Utc, Timezone::Floating]
            .into_iter()
            .map(|zone| (zone.tzid().to_owned(), zone))
            .collect();
        Self { zones }
    }

    /// Add or replace a zone, returning the one it replaced.
    pub fn register(&mut self, zone: Timezone) -> Option<Timezone> {
        tracing::debug!(tzid = zone.tzid(), "registering timezone");
        self.zones.insert(zone.tzid().to_owned(), zone)
    }

    /// Look up a zone by identifier.
    #[must_use]
    pub fn get(&self, tzid: &str) -> Option<&Timezone> {
        self.zones.get(tzid)
    }

    /// Resolve an optional identifier; `None` is the floating zone.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::UnknownTimezone`] if the identifier is not registered.
    pub fn resolve(&self, tzid: Option<&str>) -> Result<Timezone, TimeError> {
        match tzid {
            None => Ok(Timezone::Floating),
            Some(id) => self
                .get(id)
                .cloned()
                .ok_or_else(|| TimeError::UnknownTimezone(id.to_owned())),
        }
    }
}

impl Default for TimezoneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

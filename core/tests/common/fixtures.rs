// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.
//!
//! This module provides helper functions to create calendar values,
//! configurations and events.

use occur_core::{Config, Event, EventDraft, EventEnd};
use occur_ical::{CalendarTime, Duration, FixedZone, Frequency, RecurrenceRule, Timezone, UtcOffset};

/// Creates a UTC date-time.
///
/// # Panics
///
/// Panics if the fields are outside the supported range.
#[must_use]
pub fn utc(year: i32, month: i32, day: i32, hour: i32, minute: i32) -> CalendarTime {
    CalendarTime::date_time(year, month, day, hour, minute, 0, Timezone::Utc).unwrap()
}

/// Creates a date-only value.
///
/// # Panics
///
/// Panics if the fields are outside the supported range.
#[must_use]
pub fn date(year: i32, month: i32, day: i32) -> CalendarTime {
    CalendarTime::date(year, month, day).unwrap()
}

/// Creates a date-time in a fixed-offset zone.
///
/// # Arguments
///
/// * `tzid` - Identifier of the zone
/// * `hours` - Offset from UTC in hours
///
/// # Example
///
/// ```ignore
/// let tokyo_nine = zoned("Asia/Tokyo", 9, (2024, 1, 1, 9, 0));
/// ```
#[must_use]
pub fn zoned(
    tzid: &str,
    hours: i8,
    (year, month, day, hour, minute): (i32, i32, i32, i32, i32),
) -> CalendarTime {
    let offset = UtcOffset::from_seconds(i32::from(hours) * 3600);
    let zone = Timezone::custom(FixedZone::new(tzid, offset));
    CalendarTime::date_time(year, month, day, hour, minute, 0, zone).unwrap()
}

/// Creates a configuration with a small empty-period cap.
#[must_use]
pub fn test_config(max_empty_periods: u32) -> Config {
    Config {
        max_empty_periods,
        ..Config::default()
    }
}

/// Creates a one-hour weekly event starting at `start`.
///
/// # Arguments
///
/// * `uid` - Unique identifier of the event
/// * `start` - Series start
/// * `count` - Optional COUNT of the rule
#[must_use]
pub fn weekly_event(uid: &str, start: CalendarTime, count: Option<u32>) -> Event {
    let mut builder = RecurrenceRule::builder(Frequency::Weekly);
    if let Some(count) = count {
        builder = builder.count(count);
    }

    let mut draft = EventDraft::new(uid, start);
    draft.summary = Some("Weekly sync".to_owned());
    draft.end = Some(EventEnd::Duration(Duration::from_seconds(3600)));
    draft.rrule = Some(builder.build().unwrap());
    Event::from(draft)
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Snapshot and resume of rule iterators.

use std::sync::Arc;

use occur_core::{Config, RecurError, RuleIterator, RuleIteratorState};
use occur_ical::{
    ByPartKind, Frequency, RecurrenceRule, TimeError, TimezoneRegistry, WeekDay, WeekDayNum,
};

use crate::common::{collect_occurrences, zoned};

fn tokyo_rule() -> (Arc<RecurrenceRule>, occur_ical::CalendarTime) {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .by_day([WeekDayNum::nth(2, WeekDay::Thursday)])
        .part(ByPartKind::Hour, [9, 18])
        .count(9)
        .build()
        .unwrap();
    (Arc::new(rule), zoned("Asia/Tokyo", 9, (2024, 1, 1, 9, 0)))
}

#[test]
fn resumes_where_snapshot_was_taken() {
    let (rule, start) = tokyo_rule();
    let config = Config::default();
    let reference = RuleIterator::new(rule.clone(), start.clone(), &config).unwrap();
    let expected = collect_occurrences(reference);
    assert_eq!(expected.len(), 9);

    let mut registry = TimezoneRegistry::new();
    registry.register(start.zone().clone());

    let mut iter = RuleIterator::new(rule, start, &config).unwrap();
    let mut seen = collect_occurrences(iter.by_ref().take(3));
    let json = serde_json::to_string(&iter.to_state()).unwrap();

    let state: RuleIteratorState = serde_json::from_str(&json).unwrap();
    assert_eq!(state.occurrence_number, 3);
    let resumed = RuleIterator::from_state(&state, &registry, &config).unwrap();
    assert_eq!(resumed.occurrence_number(), 3);
    seen.extend(collect_occurrences(resumed));
    assert_eq!(seen, expected);
}

#[test]
fn resume_needs_registered_zone() {
    let (rule, start) = tokyo_rule();
    let config = Config::default();
    let mut iter = RuleIterator::new(rule, start, &config).unwrap();
    iter.next_occurrence().unwrap();

    let err = RuleIterator::from_state(&iter.to_state(), &TimezoneRegistry::new(), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        RecurError::Time(TimeError::UnknownTimezone(ref tzid)) if tzid == "Asia/Tokyo"
    ));
}

#[test]
fn completed_snapshot_stays_completed() {
    let (rule, start) = tokyo_rule();
    let config = Config::default();
    let mut iter = RuleIterator::new(rule, start.clone(), &config).unwrap();
    while iter.next_occurrence().unwrap().is_some() {}
    assert!(iter.completed());

    let mut registry = TimezoneRegistry::new();
    registry.register(start.zone().clone());
    let mut resumed = RuleIterator::from_state(&iter.to_state(), &registry, &config).unwrap();
    assert!(resumed.completed());
    assert!(resumed.next_occurrence().unwrap().is_none());
}

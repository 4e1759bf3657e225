// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! COUNT, UNTIL, ordering and termination of rule iterators.

use std::cmp::Ordering;
use std::sync::Arc;

use occur_core::{Config, RecurError, RuleExt, RuleIterator};
use occur_ical::{ByPartKind, Frequency, RecurrenceRule, RuleError};

use crate::common::{collect_occurrences, date, test_config, utc};

#[test]
fn count_limits_occurrences() {
    let rule = Arc::new(RecurrenceRule::builder(Frequency::Daily).count(5).build().unwrap());
    let mut iter = rule.iterator(&date(2024, 1, 1), &Config::default()).unwrap();
    let occurrences: Vec<_> = iter.by_ref().map(Result::unwrap).collect();
    assert_eq!(occurrences.len(), 5);
    assert_eq!(iter.occurrence_number(), 5);
    assert!(iter.completed());
    assert!(iter.next_occurrence().unwrap().is_none());
}

#[test]
fn until_is_inclusive() {
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .until(utc(2024, 1, 3, 9, 0))
        .build()
        .unwrap();
    let iter = rule.iterator(&utc(2024, 1, 1, 9, 0), &Config::default()).unwrap();
    assert_eq!(
        collect_occurrences(iter),
        [
            "2024-01-01T09:00:00Z",
            "2024-01-02T09:00:00Z",
            "2024-01-03T09:00:00Z",
        ]
    );
}

#[test]
fn until_before_start_yields_nothing() {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .until(date(2023, 12, 1))
        .build()
        .unwrap();
    let iter = rule.iterator(&date(2024, 1, 1), &Config::default()).unwrap();
    assert!(collect_occurrences(iter).is_empty());
}

#[test]
fn occurrences_are_strictly_ascending() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .part(ByPartKind::MonthDay, [1, -1, 15])
        .part(ByPartKind::Hour, [8, 20])
        .count(60)
        .build()
        .unwrap();
    let iter = rule.iterator(&utc(2024, 1, 1, 8, 0), &Config::default()).unwrap();
    let occurrences: Vec<_> = iter.map(Result::unwrap).collect();
    assert_eq!(occurrences.len(), 60);
    for pair in occurrences.windows(2) {
        if let [a, b] = pair {
            assert_eq!(a.compare(b), Ordering::Less, "{a} should precede {b}");
        }
    }
}

#[test]
fn impossible_rule_reports_no_progress() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .part(ByPartKind::Month, [2])
        .part(ByPartKind::MonthDay, [30])
        .build()
        .unwrap();
    let mut iter = RuleIterator::new(Arc::new(rule), date(2024, 1, 1), &test_config(10)).unwrap();

    let err = iter.next_occurrence().unwrap_err();
    assert!(matches!(err, RecurError::NonProgressing { periods: 11 }));
    assert!(iter.completed());
    assert!(iter.next().is_none());
}

#[test]
fn impossible_rule_reports_no_progress_before_calendar_ends() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .part(ByPartKind::Month, [2])
        .part(ByPartKind::MonthDay, [30])
        .build()
        .unwrap();
    let mut iter = rule.iterator(&date(2024, 1, 1), &Config::default()).unwrap();

    let err = iter.next_occurrence().unwrap_err();
    assert!(matches!(err, RecurError::NonProgressing { periods } if periods > 7_000));
    assert!(iter.completed());
}

#[test]
fn matching_rule_ends_quietly_at_calendar_end() {
    let rule = RecurrenceRule::builder(Frequency::Yearly).build().unwrap();
    let iter = rule.iterator(&date(9996, 2, 29), &Config::default()).unwrap();
    assert_eq!(collect_occurrences(iter), ["9996-02-29"]);
}

#[test]
fn date_start_rejects_time_parts() {
    let rule = RecurrenceRule::builder(Frequency::Hourly).build().unwrap();
    let err = rule.iterator(&date(2024, 1, 1), &Config::default()).unwrap_err();
    assert!(matches!(
        err,
        RecurError::MalformedRule(RuleError::TimePartWithDate)
    ));
}

#[test]
fn next_occurrence_after_recurrence_id() {
    let rule = RecurrenceRule::builder(Frequency::Daily).interval(2).build().unwrap();
    let next = rule
        .next_occurrence(&date(2024, 1, 1), &date(2024, 1, 4), &Config::default())
        .unwrap();
    assert_eq!(next, Some(date(2024, 1, 5)));
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Rule expansion scenarios, mostly taken from RFC 5545 Section 3.8.5.3.

use std::sync::Arc;

use occur_core::{Config, RuleIterator};
use occur_ical::{ByPartKind, CalendarTime, Frequency, RecurrenceRule, WeekDay, WeekDayNum};

use crate::common::{assert_occurrences, collect_occurrences, date, utc};

fn iter(rule: RecurrenceRule, dtstart: CalendarTime) -> RuleIterator {
    RuleIterator::new(Arc::new(rule), dtstart, &Config::default()).unwrap()
}

#[test]
fn weekly_on_monday_wednesday_friday() {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .by_day([WeekDay::Monday, WeekDay::Wednesday, WeekDay::Friday].map(WeekDayNum::every))
        .build()
        .unwrap();
    assert_occurrences(
        iter(rule, date(2024, 1, 1)),
        &["2024-01-01", "2024-01-03", "2024-01-05", "2024-01-08", "2024-01-10"],
    );
}

#[test]
fn monthly_on_last_friday() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .by_day([WeekDayNum::nth(-1, WeekDay::Friday)])
        .build()
        .unwrap();
    assert_occurrences(
        iter(rule, date(2024, 1, 1)),
        &["2024-01-26", "2024-02-23", "2024-03-29"],
    );
}

#[test]
fn monthly_on_day_31_skips_short_months() {
    let rule = RecurrenceRule::builder(Frequency::Monthly).count(4).build().unwrap();
    let occurrences = collect_occurrences(iter(rule, utc(2024, 1, 31, 8, 0)));
    assert_eq!(
        occurrences,
        [
            "2024-01-31T08:00:00Z",
            "2024-03-31T08:00:00Z",
            "2024-05-31T08:00:00Z",
            "2024-07-31T08:00:00Z",
        ]
    );
}

#[test]
fn monthly_last_workday_by_setpos() {
    let weekdays = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
    ];
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .by_day(weekdays.map(WeekDayNum::every))
        .part(ByPartKind::SetPos, [-1])
        .count(3)
        .build()
        .unwrap();
    let occurrences = collect_occurrences(iter(rule, date(2024, 1, 1)));
    assert_eq!(occurrences, ["2024-01-31", "2024-02-29", "2024-03-29"]);
}

#[test]
fn us_presidential_election_day() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .interval(4)
        .part(ByPartKind::Month, [11])
        .by_day([WeekDayNum::every(WeekDay::Tuesday)])
        .part(ByPartKind::MonthDay, 2..=8)
        .count(3)
        .build()
        .unwrap();
    let occurrences = collect_occurrences(iter(rule, utc(1996, 11, 5, 9, 0)));
    assert_eq!(
        occurrences,
        [
            "1996-11-05T09:00:00Z",
            "2000-11-07T09:00:00Z",
            "2004-11-02T09:00:00Z",
        ]
    );
}

#[test]
fn week_start_changes_biweekly_grouping() {
    let rule = |wkst| {
        RecurrenceRule::builder(Frequency::Weekly)
            .interval(2)
            .count(4)
            .by_day([WeekDayNum::every(WeekDay::Tuesday), WeekDayNum::every(WeekDay::Sunday)])
            .week_start(wkst)
            .build()
            .unwrap()
    };
    let start = utc(1997, 8, 5, 9, 0);

    let monday = collect_occurrences(iter(rule(WeekDay::Monday), start.clone()));
    assert_eq!(
        monday,
        [
            "1997-08-05T09:00:00Z",
            "1997-08-10T09:00:00Z",
            "1997-08-19T09:00:00Z",
            "1997-08-24T09:00:00Z",
        ]
    );

    let sunday = collect_occurrences(iter(rule(WeekDay::Sunday), start));
    assert_eq!(
        sunday,
        [
            "1997-08-05T09:00:00Z",
            "1997-08-17T09:00:00Z",
            "1997-08-19T09:00:00Z",
            "1997-08-31T09:00:00Z",
        ]
    );
}

#[test]
fn daily_at_two_hours() {
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .part(ByPartKind::Hour, [17, 9])
        .count(4)
        .build()
        .unwrap();
    let occurrences = collect_occurrences(iter(rule, utc(2024, 1, 1, 9, 0)));
    assert_eq!(
        occurrences,
        [
            "2024-01-01T09:00:00Z",
            "2024-01-01T17:00:00Z",
            "2024-01-02T09:00:00Z",
            "2024-01-02T17:00:00Z",
        ]
    );
}

#[test]
fn yearly_leap_day_waits_for_leap_years() {
    let rule = RecurrenceRule::builder(Frequency::Yearly).count(3).build().unwrap();
    let occurrences = collect_occurrences(iter(rule, date(2024, 2, 29)));
    assert_eq!(occurrences, ["2024-02-29", "2028-02-29", "2032-02-29"]);
}

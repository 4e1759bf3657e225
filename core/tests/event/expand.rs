// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Range expansion of events.

use std::collections::BTreeSet;

use occur_core::{Config, Event, EventDraft, EventEnd};
use occur_ical::{CalendarTime, Frequency};

use crate::common::{collect_occurrences, date, utc, weekly_event};

fn starts(event: &Event, range_start: &CalendarTime, range_end: &CalendarTime) -> Vec<String> {
    event
        .expand(range_start, range_end, &Config::default())
        .unwrap()
        .map(|details| details.unwrap().start.to_string())
        .collect()
}

#[test]
fn single_event_occurs_once() {
    let mut draft = EventDraft::new("single", utc(2024, 6, 1, 10, 0));
    draft.end = Some(EventEnd::End(utc(2024, 6, 1, 11, 0)));
    let event = Event::from(draft);
    assert!(!event.is_recurring());

    let occurrences: Vec<_> = event
        .expand(&date(2024, 6, 1), &date(2024, 6, 2), &Config::default())
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(occurrences.len(), 1);
    let details = occurrences.first().unwrap();
    assert_eq!(details.start, utc(2024, 6, 1, 10, 0));
    assert_eq!(details.end, utc(2024, 6, 1, 11, 0));
    assert_eq!(details.recurrence_id, utc(2024, 6, 1, 10, 0));
    assert!(!details.is_exception());
}

#[test]
fn exdate_removes_one_occurrence() {
    let mut draft = EventDraft::new("weekly", utc(2024, 1, 1, 9, 0));
    draft.rrule = Some(
        occur_ical::RecurrenceRule::builder(Frequency::Weekly)
            .count(4)
            .build()
            .unwrap(),
    );
    draft.exdates = vec![utc(2024, 1, 15, 9, 0)];
    let event = Event::from(draft);

    let iter = event.iterator(None, &Config::default()).unwrap();
    assert_eq!(
        collect_occurrences(iter),
        [
            "2024-01-01T09:00:00Z",
            "2024-01-08T09:00:00Z",
            "2024-01-22T09:00:00Z",
        ]
    );
}

#[test]
fn recurring_event_filters_on_occurrence_start() {
    let event = weekly_event("weekly", utc(2024, 1, 1, 9, 0), None);

    // the 2024-01-08 occurrence still runs at 09:30 but started before the range
    let found = starts(&event, &utc(2024, 1, 8, 9, 30), &utc(2024, 1, 15, 8, 0));
    assert!(found.is_empty());

    // both bounds are inclusive
    let found = starts(&event, &utc(2024, 1, 1, 9, 0), &utc(2024, 1, 15, 9, 0));
    assert_eq!(
        found,
        [
            "2024-01-01T09:00:00Z",
            "2024-01-08T09:00:00Z",
            "2024-01-15T09:00:00Z",
        ]
    );
}

#[test]
fn single_event_overlapping_range_start() {
    let mut draft = EventDraft::new("single", utc(2024, 6, 1, 10, 0));
    draft.end = Some(EventEnd::End(utc(2024, 6, 1, 11, 0)));
    let event = Event::from(draft);

    let found = starts(&event, &utc(2024, 6, 1, 10, 30), &utc(2024, 6, 1, 12, 0));
    assert_eq!(found, ["2024-06-01T10:00:00Z"]);

    let found = starts(&event, &utc(2024, 6, 1, 11, 0), &utc(2024, 6, 1, 12, 0));
    assert_eq!(found, ["2024-06-01T10:00:00Z"]);

    let found = starts(&event, &utc(2024, 6, 1, 11, 1), &utc(2024, 6, 1, 12, 0));
    assert!(found.is_empty());
}

#[test]
fn unbounded_rule_stops_at_range_end() {
    let event = weekly_event("weekly", utc(2024, 1, 1, 9, 0), None);
    let found = starts(&event, &utc(2024, 3, 1, 0, 0), &utc(2024, 3, 31, 0, 0));
    assert_eq!(
        found,
        [
            "2024-03-04T09:00:00Z",
            "2024-03-11T09:00:00Z",
            "2024-03-18T09:00:00Z",
            "2024-03-25T09:00:00Z",
        ]
    );
}

#[test]
fn rdates_add_occurrences() {
    let mut draft = EventDraft::new("extra", utc(2024, 1, 1, 9, 0));
    draft.rrule = Some(
        occur_ical::RecurrenceRule::builder(Frequency::Weekly)
            .count(2)
            .build()
            .unwrap(),
    );
    draft.rdates = vec![utc(2024, 1, 3, 14, 0)];
    let event = Event::from(draft);
    assert_eq!(event.recurrence_types(), BTreeSet::from([Frequency::Weekly]));

    let found = starts(&event, &utc(2024, 1, 1, 0, 0), &utc(2024, 12, 31, 0, 0));
    assert_eq!(
        found,
        [
            "2024-01-01T09:00:00Z",
            "2024-01-03T14:00:00Z",
            "2024-01-08T09:00:00Z",
        ]
    );
}

#[test]
fn all_day_event_lasts_one_day() {
    let mut draft = EventDraft::new("holiday", date(2024, 12, 25));
    draft.rrule = Some(
        occur_ical::RecurrenceRule::builder(Frequency::Yearly)
            .build()
            .unwrap(),
    );
    let event = Event::from(draft);

    let occurrences: Vec<_> = event
        .expand(&date(2025, 1, 1), &date(2026, 12, 31), &Config::default())
        .unwrap()
        .map(Result::unwrap)
        .collect();
    let spans: Vec<_> = occurrences
        .iter()
        .map(|d| (d.start.to_string(), d.end.to_string()))
        .collect();
    assert_eq!(
        spans,
        [
            ("2025-12-25".to_owned(), "2025-12-26".to_owned()),
            ("2026-12-25".to_owned(), "2026-12-26".to_owned()),
        ]
    );
}

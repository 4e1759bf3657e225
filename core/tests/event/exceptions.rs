// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence exceptions applied during expansion.

use occur_core::{Config, Event, EventDraft, EventEnd, RecurError, RecurrenceIdRange};
use occur_ical::{CalendarTime, Duration};

use crate::common::{utc, weekly_event};

fn exception(start: CalendarTime, recurrence_id: CalendarTime, summary: &str) -> EventDraft {
    let mut draft = EventDraft::new("weekly", start);
    draft.summary = Some(summary.to_owned());
    draft.end = Some(EventEnd::Duration(Duration::from_seconds(3600)));
    draft.recurrence_id = Some(recurrence_id);
    draft
}

#[test]
fn exception_overrides_third_occurrence() {
    let mut event = weekly_event("weekly", utc(2024, 1, 1, 9, 0), Some(5));
    let third = utc(2024, 1, 15, 9, 0);
    let moved = exception(utc(2024, 1, 15, 13, 0), third.clone(), "Moved sync");
    event.relate_exception(Event::from(moved)).unwrap();

    let details = event.resolve(&third).unwrap();
    assert_eq!(details.summary(), Some("Moved sync"));
    assert_eq!(details.start, utc(2024, 1, 15, 13, 0));
    assert_eq!(details.end, utc(2024, 1, 15, 14, 0));
    assert!(details.is_exception());

    let summaries: Vec<_> = event
        .expand(&utc(2024, 1, 1, 0, 0), &utc(2024, 2, 1, 0, 0), &Config::default())
        .unwrap()
        .map(|d| d.unwrap().summary().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(
        summaries,
        ["Weekly sync", "Weekly sync", "Moved sync", "Weekly sync", "Weekly sync"]
    );
}

#[test]
fn exception_is_found_by_its_recurrence_id() {
    let mut event = weekly_event("weekly", utc(2024, 1, 1, 9, 0), Some(3));
    let second = utc(2024, 1, 8, 9, 0);
    let moved = exception(utc(2024, 2, 20, 9, 0), second.clone(), "Postponed");
    event.relate_exception(Event::from(moved)).unwrap();

    let found: Vec<_> = event
        .expand(&utc(2024, 1, 1, 0, 0), &utc(2024, 1, 31, 0, 0), &Config::default())
        .unwrap()
        .map(|d| {
            let d = d.unwrap();
            (d.recurrence_id.to_string(), d.start.to_string())
        })
        .collect();
    assert_eq!(
        found,
        [
            ("2024-01-01T09:00:00Z".to_owned(), "2024-01-01T09:00:00Z".to_owned()),
            ("2024-01-08T09:00:00Z".to_owned(), "2024-02-20T09:00:00Z".to_owned()),
            ("2024-01-15T09:00:00Z".to_owned(), "2024-01-15T09:00:00Z".to_owned()),
        ]
    );

    // moved into the range, but its recurrence id lies outside
    let found = event
        .expand(&utc(2024, 2, 1, 0, 0), &utc(2024, 2, 29, 0, 0), &Config::default())
        .unwrap()
        .count();
    assert_eq!(found, 0);
}

#[test]
fn this_and_future_shifts_the_rest_of_the_series() {
    let mut event = weekly_event("weekly", utc(2024, 1, 1, 9, 0), Some(4));
    let mut moved = exception(utc(2024, 1, 15, 10, 0), utc(2024, 1, 15, 9, 0), "Later sync");
    moved.range = Some(RecurrenceIdRange::ThisAndFuture);
    let moved = Event::from(moved);
    assert!(moved.modifies_future());
    event.relate_exception(moved).unwrap();

    let found: Vec<_> = event
        .expand(&utc(2024, 1, 1, 0, 0), &utc(2024, 2, 1, 0, 0), &Config::default())
        .unwrap()
        .map(|d| {
            let d = d.unwrap();
            (d.start.to_string(), d.summary().map(str::to_owned))
        })
        .collect();
    assert_eq!(
        found,
        [
            ("2024-01-01T09:00:00Z".to_owned(), Some("Weekly sync".to_owned())),
            ("2024-01-08T09:00:00Z".to_owned(), Some("Weekly sync".to_owned())),
            ("2024-01-15T10:00:00Z".to_owned(), Some("Later sync".to_owned())),
            ("2024-01-22T10:00:00Z".to_owned(), Some("Later sync".to_owned())),
        ]
    );
}

#[test]
fn rejects_exception_of_other_event() {
    let mut event = weekly_event("weekly", utc(2024, 1, 1, 9, 0), None);
    let mut other = exception(utc(2024, 1, 8, 9, 0), utc(2024, 1, 8, 9, 0), "Other");
    other.uid = "other".to_owned();

    let err = event.relate_exception(Event::from(other)).unwrap_err();
    assert!(matches!(err, RecurError::InvalidRelation { .. }));
    assert_eq!(err.to_string(), "exception of other cannot be related to event weekly");
    assert!(event.exceptions().is_empty());
}

#[test]
fn nearest_range_exception_wins() {
    let mut event = weekly_event("weekly", utc(2024, 1, 1, 9, 0), Some(5));

    let mut earlier = exception(utc(2024, 1, 8, 10, 0), utc(2024, 1, 8, 9, 0), "First move");
    earlier.range = Some(RecurrenceIdRange::ThisAndFuture);
    let mut later = exception(utc(2024, 1, 22, 12, 0), utc(2024, 1, 22, 9, 0), "Second move");
    later.range = Some(RecurrenceIdRange::ThisAndFuture);
    event.relate_exception(Event::from(later)).unwrap();
    event.relate_exception(Event::from(earlier)).unwrap();

    assert_eq!(event.find_range_exception(&utc(2024, 1, 1, 9, 0)), None);
    assert_eq!(
        event.find_range_exception(&utc(2024, 1, 15, 9, 0)),
        Some(&utc(2024, 1, 8, 9, 0))
    );
    assert_eq!(
        event.find_range_exception(&utc(2024, 1, 29, 9, 0)),
        Some(&utc(2024, 1, 22, 9, 0))
    );

    let found: Vec<_> = event
        .expand(&utc(2024, 1, 1, 0, 0), &utc(2024, 2, 1, 0, 0), &Config::default())
        .unwrap()
        .map(|d| {
            let d = d.unwrap();
            (d.start.to_string(), d.summary().map(str::to_owned))
        })
        .collect();
    assert_eq!(
        found,
        [
            ("2024-01-01T09:00:00Z".to_owned(), Some("Weekly sync".to_owned())),
            ("2024-01-08T10:00:00Z".to_owned(), Some("First move".to_owned())),
            ("2024-01-15T10:00:00Z".to_owned(), Some("First move".to_owned())),
            ("2024-01-22T12:00:00Z".to_owned(), Some("Second move".to_owned())),
            ("2024-01-29T12:00:00Z".to_owned(), Some("Second move".to_owned())),
        ]
    );
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};
use std::sync::Arc;

use occur_ical::keyword::KW_RANGE_THISANDFUTURE;
use occur_ical::{CalendarTime, Duration, Frequency, RecurrenceRule};

use crate::config::Config;
use crate::error::RecurError;
use crate::expansion::Expansion;

/// How an event's end is given.
#[derive(Debug, Clone)]
pub enum EventEnd {
    /// Explicit end (DTEND).
    End(CalendarTime),
    /// Length from the start (DURATION).
    Duration(Duration),
}

/// Range of a recurrence id, RFC 5545 Section 3.2.13.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceIdRange {
    /// The override also applies to every later occurrence.
    ThisAndFuture,
}

impl Display for RecurrenceIdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThisAndFuture => write!(f, "{KW_RANGE_THISANDFUTURE}"),
        }
    }
}

/// Draft for an event, used for creating new events.
#[derive(Debug, Clone)]
pub struct EventDraft {
    /// The unique identifier for the event.
    pub uid: String,

    /// The summary of the event, if available.
    pub summary: Option<String>,

    /// The start of the event.
    pub start: CalendarTime,

    /// The end or duration of the event, if available.
    pub end: Option<EventEnd>,

    /// The recurrence rule, if the event repeats.
    pub rrule: Option<RecurrenceRule>,

    /// Additional occurrence dates.
    pub rdates: Vec<CalendarTime>,

    /// Excluded occurrence dates.
    pub exdates: Vec<CalendarTime>,

    /// The occurrence this event overrides, for exceptions.
    pub recurrence_id: Option<CalendarTime>,

    /// Range of the override, for exceptions.
    pub range: Option<RecurrenceIdRange>,
}

impl EventDraft {
    /// A single, non-recurring event.
    pub fn new(uid: impl Into<String>, start: CalendarTime) -> Self {
        Self {
            uid: uid.into(),
            summary: None,
            start,
            end: None,
            rrule: None,
            rdates: Vec::new(),
            exdates: Vec::new(),
            recurrence_id: None,
            range: None,
        }
    }
}

/// A calendar event together with the exceptions that override its
/// occurrences.
#[derive(Debug, Clone)]
pub struct Event {
    uid: String,
    summary: Option<String>,
    start: CalendarTime,
    end: Option<EventEnd>,
    rrule: Option<Arc<RecurrenceRule>>,
    rdates: Vec<CalendarTime>,
    exdates: Vec<CalendarTime>,
    recurrence_id: Option<CalendarTime>,
    range: Option<RecurrenceIdRange>,
    exceptions: BTreeMap<CalendarTime, Event>,
    range_exceptions: Vec<(CalendarTime, Duration)>,
}

impl From<EventDraft> for Event {
    fn from(draft: EventDraft) -> Self {
        Self {
            uid: draft.uid,
            summary: draft.summary,
            start: draft.start,
            end: draft.end,
            rrule: draft.rrule.map(Arc::new),
            rdates: draft.rdates,
            exdates: draft.exdates,
            recurrence_id: draft.recurrence_id,
            range: draft.range,
            exceptions: BTreeMap::new(),
            range_exceptions: Vec::new(),
        }
    }
}

impl Event {
    /// The unique identifier for the event.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The summary of the event, if available.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// The start of the event.
    #[must_use]
    pub fn start(&self) -> &CalendarTime {
        &self.start
    }

    /// The recurrence rule, if any.
    #[must_use]
    pub fn rrule(&self) -> Option<&Arc<RecurrenceRule>> {
        self.rrule.as_ref()
    }

    /// The occurrence this event overrides, if it is an exception.
    #[must_use]
    pub fn recurrence_id(&self) -> Option<&CalendarTime> {
        self.recurrence_id.as_ref()
    }

    /// Related exceptions keyed by recurrence id, expressed in the zone of
    /// the event's start (and as a date when the start is a date).
    #[must_use]
    pub fn exceptions(&self) -> &BTreeMap<CalendarTime, Event> {
        &self.exceptions
    }

    /// Length of the event.
    ///
    /// A DTEND in another zone than the start is measured between the two
    /// instants. Without DTEND or DURATION a date-only event lasts one day
    /// and a date-time event has no length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        match &self.end {
            Some(EventEnd::End(end)) => elapsed(&self.start, end),
            Some(EventEnd::Duration(duration)) => *duration,
            None if self.start.is_date() => Duration {
                days: 1,
                ..Duration::ZERO
            },
            None => Duration::ZERO,
        }
    }

    /// End of the event, derived from the duration when not given.
    ///
    /// # Errors
    ///
    /// Returns an error if the end is outside the supported range.
    pub fn end_date(&self) -> Result<CalendarTime, RecurError> {
        if let Some(EventEnd::End(end)) = &self.end {
            return Ok(end.clone());
        }
        let mut end = self.start.clone();
        end.add_duration(&self.duration())?;
        Ok(end)
    }

    /// Whether the event has a rule or extra recurrence dates.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.rrule.is_some() || !self.rdates.is_empty()
    }

    /// Whether the event overrides an occurrence of another event.
    #[must_use]
    pub fn is_recurrence_exception(&self) -> bool {
        self.recurrence_id.is_some()
    }

    /// Whether the override also applies to every later occurrence.
    #[must_use]
    pub fn modifies_future(&self) -> bool {
        self.recurrence_id.is_some() && self.range == Some(RecurrenceIdRange::ThisAndFuture)
    }

    /// Frequencies the event recurs with.
    #[must_use]
    pub fn recurrence_types(&self) -> BTreeSet<Frequency> {
        self.rrule.iter().map(|rule| rule.freq()).collect()
    }

    /// Relate an exception to this event.
    ///
    /// An exception for a recurrence id that already has one replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if this event is itself an exception, or `exception`
    /// belongs to another event or has no recurrence id.
    pub fn relate_exception(&mut self, exception: Event) -> Result<(), RecurError> {
        if self.is_recurrence_exception() {
            return Err(RecurError::RecursiveException);
        }
        if exception.uid != self.uid {
            return Err(RecurError::InvalidRelation {
                owner: self.uid.clone(),
                exception: exception.uid,
            });
        }
        let Some(recurrence_id) = &exception.recurrence_id else {
            return Err(RecurError::MissingRecurrenceId { uid: exception.uid });
        };
        let id = self.series_key(recurrence_id)?;

        self.range_exceptions
            .retain(|(other, _)| other.compare(&id) != Ordering::Equal);
        if exception.modifies_future() {
            let shift = elapsed(recurrence_id, &exception.start);
            let at = self
                .range_exceptions
                .partition_point(|(other, _)| other.compare(&id) == Ordering::Less);
            self.range_exceptions.insert(at, (id.clone(), shift));
        }

        tracing::debug!(
            uid = %self.uid,
            recurrence_id = %id,
            range = ?exception.range,
            "related exception"
        );
        self.exceptions.insert(id, exception);
        Ok(())
    }

    /// `time` in the shape of the series start: its zone, and a date when
    /// the start is a date. Keys that share one shape order consistently.
    fn series_key(&self, time: &CalendarTime) -> Result<CalendarTime, RecurError> {
        let zone = self.start.zone();
        let key = time.convert_to_zone(zone)?;
        let key = match (self.start.is_date(), key.is_date()) {
            (true, false) => CalendarTime::from_civil(key.civil(), true, zone.clone()),
            (false, true) => {
                let at = key.civil_date().to_datetime(self.start.civil().time());
                CalendarTime::from_civil(at, false, zone.clone())
            }
            _ => key,
        };
        Ok(key)
    }

    /// Recurrence id of the nearest THISANDFUTURE exception at or before `time`.
    #[must_use]
    pub fn find_range_exception(&self, time: &CalendarTime) -> Option<&CalendarTime> {
        let at = self
            .range_exceptions
            .partition_point(|(id, _)| id.compare(time) != Ordering::Greater);
        at.checked_sub(1)
            .and_then(|i| self.range_exceptions.get(i))
            .map(|(id, _)| id)
    }

    /// Effective start, end and item for the occurrence at `occurrence`.
    ///
    /// `occurrence` should come from [`Event::iterator`]; it is not checked
    /// against the recurrence set.
    ///
    /// # Errors
    ///
    /// Returns an error if a derived time is outside the supported range.
    pub fn occurrence_details(
        &self,
        occurrence: &CalendarTime,
    ) -> Result<OccurrenceDetails<'_>, RecurError> {
        if let Some(item) = self.exceptions.get(&self.series_key(occurrence)?) {
            return Ok(OccurrenceDetails {
                recurrence_id: occurrence.clone(),
                start: item.start.clone(),
                end: item.end_date()?,
                item,
            });
        }

        let range = self
            .find_range_exception(occurrence)
            .and_then(|id| self.range_exceptions.iter().find(|(other, _)| other == id))
            .and_then(|(id, shift)| self.exceptions.get(id).map(|item| (item, shift)));

        let (item, start, duration) = match range {
            Some((item, shift)) => {
                let mut start = occurrence.clone();
                start.add_duration(shift)?;
                (item, start, item.duration())
            }
            None => (self, occurrence.clone(), self.duration()),
        };
        let mut end = start.clone();
        end.add_duration(&duration)?;

        Ok(OccurrenceDetails {
            recurrence_id: occurrence.clone(),
            start,
            end,
            item,
        })
    }

    /// Effective data for `occurrence`, the same as [`Event::occurrence_details`].
    ///
    /// # Errors
    ///
    /// Returns an error if a derived time is outside the supported range.
    pub fn resolve(&self, occurrence: &CalendarTime) -> Result<OccurrenceDetails<'_>, RecurError> {
        self.occurrence_details(occurrence)
    }

    /// Iterate the occurrences of the event from `start`, or from the
    /// event's own start.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be expanded.
    pub fn iterator(
        &self,
        start: Option<&CalendarTime>,
        config: &Config,
    ) -> Result<Expansion, RecurError> {
        Expansion::new(
            start.unwrap_or(&self.start).clone(),
            self.rrule.clone(),
            self.rdates.clone(),
            self.exdates.clone(),
            config,
        )
    }

    /// Occurrences in `[range_start, range_end]`, with exceptions applied.
    ///
    /// A recurring event yields the occurrences whose recurrence id lies in
    /// the range, even when an exception moves them elsewhere. A single
    /// event is yielded when it overlaps the range: it starts no later than
    /// `range_end` and ends no earlier than `range_start`. Expansion stops at
    /// the first recurrence id after `range_end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be expanded.
    pub fn expand(
        &self,
        range_start: &CalendarTime,
        range_end: &CalendarTime,
        config: &Config,
    ) -> Result<Occurrences<'_>, RecurError> {
        Ok(Occurrences {
            event: self,
            expansion: self.iterator(None, config)?,
            range_start: range_start.clone(),
            range_end: range_end.clone(),
            done: false,
        })
    }
}

/// Length from `start` to `end`: by instant for date-times, so zones may
/// differ, and by calendar days once either side is date-only.
fn elapsed(start: &CalendarTime, end: &CalendarTime) -> Duration {
    if start.is_date() || end.is_date() {
        end.subtract_date(start)
    } else {
        end.subtract_date_tz(start)
    }
}

/// Effective data of one occurrence.
#[derive(Debug, Clone)]
pub struct OccurrenceDetails<'a> {
    /// The unmodified occurrence time.
    pub recurrence_id: CalendarTime,
    /// Effective start.
    pub start: CalendarTime,
    /// Effective end.
    pub end: CalendarTime,
    /// The event the data comes from: the base event or an exception.
    pub item: &'a Event,
}

impl OccurrenceDetails<'_> {
    /// Effective summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.item.summary()
    }

    /// Whether an exception overrides this occurrence.
    #[must_use]
    pub fn is_exception(&self) -> bool {
        self.item.is_recurrence_exception()
    }
}

/// Occurrences of an event within a range, see [`Event::expand`].
#[derive(Debug)]
pub struct Occurrences<'a> {
    event: &'a Event,
    expansion: Expansion,
    range_start: CalendarTime,
    range_end: CalendarTime,
    done: bool,
}

impl<'a> Occurrences<'a> {
    fn next_details(&mut self) -> Result<Option<OccurrenceDetails<'a>>, RecurError> {
        while !self.done {
            let Some(occurrence) = self.expansion.next_occurrence()? else {
                self.done = true;
                break;
            };
            if occurrence.compare(&self.range_end) == Ordering::Greater {
                self.done = true;
                break;
            }

            if self.event.is_recurring() {
                if occurrence.compare(&self.range_start) != Ordering::Less {
                    return self.event.occurrence_details(&occurrence).map(Some);
                }
                continue;
            }

            let details = self.event.occurrence_details(&occurrence)?;
            if details.start.compare(&self.range_end) != Ordering::Greater
                && details.end.compare(&self.range_start) != Ordering::Less
            {
                return Ok(Some(details));
            }
        }
        Ok(None)
    }
}

impl<'a> Iterator for Occurrences<'a> {
    type Item = Result<OccurrenceDetails<'a>, RecurError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.next_details();
        if item.is_err() {
            self.done = true;
        }
        item.transpose()
    }
}

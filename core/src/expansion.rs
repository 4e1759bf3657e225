// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::sync::Arc;

use occur_ical::{CalendarTime, RecurrenceRule, TimeData, TimezoneRegistry};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::RecurError;
use crate::recur::{RuleIterator, RuleIteratorState};

/// Merged, ascending occurrences of one event.
///
/// Combines the rule iterator with the explicit recurrence dates and drops
/// every candidate that matches an excluded date. An event with neither a
/// rule nor recurrence dates occurs once, at its start.
#[derive(Debug, Clone)]
pub struct Expansion {
    dtstart: CalendarTime,
    rule: Option<RuleIterator>,
    rule_pending: Option<CalendarTime>,
    rdates: Vec<CalendarTime>,
    rdate_index: usize,
    exdates: Vec<CalendarTime>,
    exdate_index: usize,
    last: Option<CalendarTime>,
    complete: bool,
}

impl Expansion {
    /// Create an expansion.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be expanded from `dtstart`.
    pub fn new(
        dtstart: CalendarTime,
        rule: Option<Arc<RecurrenceRule>>,
        rdates: Vec<CalendarTime>,
        exdates: Vec<CalendarTime>,
        config: &Config,
    ) -> Result<Self, RecurError> {
        let rule = rule
            .map(|rule| RuleIterator::new(rule, dtstart.clone(), config))
            .transpose()?;

        let mut rdates = sorted(rdates);
        if rule.is_none() && rdates.is_empty() {
            rdates.push(dtstart.clone());
        }

        Ok(Self {
            dtstart,
            rule,
            rule_pending: None,
            rdates,
            rdate_index: 0,
            exdates: sorted(exdates),
            exdate_index: 0,
            last: None,
            complete: false,
        })
    }

    /// The series start.
    #[must_use]
    pub fn dtstart(&self) -> &CalendarTime {
        &self.dtstart
    }

    /// The most recently emitted occurrence.
    #[must_use]
    pub fn last(&self) -> Option<&CalendarTime> {
        self.last.as_ref()
    }

    /// Whether every source is exhausted.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.complete
    }

    /// Produce the next occurrence, or `Ok(None)` once every source is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Propagates rule iterator errors. The failed rule is exhausted
    /// afterwards, so later calls continue with the remaining dates.
    pub fn next_occurrence(&mut self) -> Result<Option<CalendarTime>, RecurError> {
        loop {
            if self.complete {
                return Ok(None);
            }

            if self.rule_pending.is_none()
                && let Some(rule) = &mut self.rule
            {
                self.rule_pending = rule.next_occurrence()?;
            }

            let Some(candidate) = self.take_earliest() else {
                tracing::debug!(dtstart = %self.dtstart, "expansion completed");
                self.complete = true;
                return Ok(None);
            };

            if self
                .last
                .as_ref()
                .is_some_and(|last| candidate.compare(last) != Ordering::Greater)
            {
                tracing::trace!(%candidate, "skipping duplicate occurrence");
                continue;
            }

            if self.is_excluded(&candidate) {
                tracing::trace!(%candidate, "skipping excluded occurrence");
                continue;
            }

            self.last = Some(candidate.clone());
            return Ok(Some(candidate));
        }
    }

    fn take_earliest(&mut self) -> Option<CalendarTime> {
        let rdate = self.rdates.get(self.rdate_index);
        let take_rule = match (&self.rule_pending, rdate) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(rule), Some(rdate)) => rule.compare(rdate) != Ordering::Greater,
        };
        if take_rule {
            self.rule_pending.take()
        } else {
            self.rdate_index += 1;
            rdate.cloned()
        }
    }

    fn is_excluded(&mut self, candidate: &CalendarTime) -> bool {
        while let Some(exdate) = self.exdates.get(self.exdate_index) {
            match exdate.compare(candidate) {
                Ordering::Less => self.exdate_index += 1,
                Ordering::Equal => return true,
                Ordering::Greater => return false,
            }
        }
        false
    }

    /// Snapshot the expansion position.
    #[must_use]
    pub fn to_state(&self) -> ExpansionState {
        ExpansionState {
            dtstart: self.dtstart.to_data(),
            rule: self.rule.as_ref().map(RuleIterator::to_state),
            rule_pending: self.rule_pending.as_ref().map(CalendarTime::to_data),
            rdates: self.rdates.iter().map(CalendarTime::to_data).collect(),
            rdate_index: self.rdate_index,
            exdates: self.exdates.iter().map(CalendarTime::to_data).collect(),
            exdate_index: self.exdate_index,
            last: self.last.as_ref().map(CalendarTime::to_data),
            complete: self.complete,
        }
    }

    /// Resume from a snapshot, resolving zones in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot holds a malformed rule or an
    /// unknown zone.
    pub fn from_state(
        state: &ExpansionState,
        registry: &TimezoneRegistry,
        config: &Config,
    ) -> Result<Self, RecurError> {
        let restore = |data: &TimeData| CalendarTime::from_data(data, registry);
        let restore_all =
            |data: &[TimeData]| data.iter().map(restore).collect::<Result<Vec<_>, _>>();

        let rule = match &state.rule {
            Some(rule) => Some(RuleIterator::from_state(rule, registry, config)?),
            None => None,
        };
        Ok(Self {
            dtstart: restore(&state.dtstart)?,
            rule,
            rule_pending: state.rule_pending.as_ref().map(restore).transpose()?,
            rdates: restore_all(&state.rdates)?,
            rdate_index: state.rdate_index,
            exdates: restore_all(&state.exdates)?,
            exdate_index: state.exdate_index,
            last: state.last.as_ref().map(restore).transpose()?,
            complete: state.complete,
        })
    }
}

impl Iterator for Expansion {
    type Item = Result<CalendarTime, RecurError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_occurrence().transpose()
    }
}

// Instants give a total order even when zones or date-only values mix.
fn sorted(mut times: Vec<CalendarTime>) -> Vec<CalendarTime> {
    times.sort_by_key(CalendarTime::to_unix_time);
    times.dedup_by(|a, b| a.compare(b) == Ordering::Equal);
    times
}

/// Plain, serializable snapshot of an [`Expansion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionState {
    /// Series start
    pub dtstart: TimeData,
    /// Rule iterator position, if the event has a rule
    pub rule: Option<RuleIteratorState>,
    /// Occurrence already pulled from the rule but not yet emitted
    #[serde(default)]
    pub rule_pending: Option<TimeData>,
    /// Sorted recurrence dates
    pub rdates: Vec<TimeData>,
    /// Cursor into `rdates`
    pub rdate_index: usize,
    /// Sorted excluded dates
    pub exdates: Vec<TimeData>,
    /// Cursor into `exdates`
    pub exdate_index: usize,
    /// Last emitted occurrence
    pub last: Option<TimeData>,
    /// Whether every source is exhausted
    pub complete: bool,
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::sync::Arc;

use jiff::civil::{Date, DateTime};
use occur_ical::{CalendarTime, RecurrenceRule, RuleData, TimeData, TimeError, TimezoneRegistry};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::RecurError;
use crate::recur::candidates::CandidatePlan;

/// Lazy, ascending sequence of the occurrences one rule produces from a
/// series start.
///
/// The start acts as a lower bound: candidates before it are never
/// emitted, and the start itself is only emitted when the rule matches it.
/// Once COUNT is reached or UNTIL is passed, every call to
/// [`RuleIterator::next_occurrence`] returns `Ok(None)`.
#[derive(Debug, Clone)]
pub struct RuleIterator {
    rule: Arc<RecurrenceRule>,
    plan: CandidatePlan,
    dtstart: CalendarTime,
    until: Option<Date>,
    last: Option<CalendarTime>,
    period: Date,
    candidates: Option<Vec<DateTime>>,
    cursor: usize,
    emitted_in_period: bool,
    occurrence_number: u32,
    empty_periods: u32,
    max_empty_periods: u32,
    completed: bool,
}

impl RuleIterator {
    /// Start iterating `rule` from `dtstart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be expanded from `dtstart`.
    pub fn new(
        rule: Arc<RecurrenceRule>,
        dtstart: CalendarTime,
        config: &Config,
    ) -> Result<Self, RecurError> {
        rule.check_start(&dtstart)?;
        let plan = CandidatePlan::new(&rule, &dtstart);
        let period = plan.period_of(dtstart.civil_date())?;
        Ok(Self::assemble(rule, plan, dtstart, period, config))
    }

    fn assemble(
        rule: Arc<RecurrenceRule>,
        plan: CandidatePlan,
        dtstart: CalendarTime,
        period: Date,
        config: &Config,
    ) -> Self {
        // UNTIL in the series zone, so whole periods past it can be skipped
        let until = rule.until().map(|until| {
            until
                .convert_to_zone(dtstart.zone())
                .map_or_else(|_| until.civil_date(), |local| local.civil_date())
        });
        Self {
            rule,
            plan,
            dtstart,
            until,
            last: None,
            period,
            candidates: None,
            cursor: 0,
            emitted_in_period: false,
            occurrence_number: 0,
            empty_periods: 0,
            max_empty_periods: config.max_empty_periods.max(1),
            completed: false,
        }
    }

    /// The rule being iterated.
    #[must_use]
    pub fn rule(&self) -> &Arc<RecurrenceRule> {
        &self.rule
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

    /// Number of occurrences emitted so far.
    #[must_use]
    pub fn occurrence_number(&self) -> u32 {
        self.occurrence_number
    }

    /// Whether the iterator is exhausted.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Produce the next occurrence, or `Ok(None)` once exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::NonProgressing`] when more consecutive periods
    /// than allowed yield nothing, or when the calendar ends before the rule
    /// matched anything. The iterator is exhausted afterwards.
    pub fn next_occurrence(&mut self) -> Result<Option<CalendarTime>, RecurError> {
        loop {
            if self.completed {
                return Ok(None);
            }
            if self.rule.count().is_some_and(|count| self.occurrence_number >= count) {
                self.complete("count reached");
                return Ok(None);
            }

            if self.candidates.is_none() {
                if self.until.is_some_and(|until| self.period > until) {
                    self.complete("until passed");
                    return Ok(None);
                }
                match self.plan.candidates(self.period) {
                    Ok(candidates) => self.candidates = Some(candidates),
                    Err(err) => {
                        self.out_of_range(&err)?;
                        return Ok(None);
                    }
                }
                self.cursor = 0;
                self.emitted_in_period = false;
            }

            if let Some(time) = self.next_in_period() {
                if let Some(until) = self.rule.until()
                    && time.compare(until) == Ordering::Greater
                {
                    self.complete("until passed");
                    return Ok(None);
                }
                self.occurrence_number += 1;
                self.emitted_in_period = true;
                self.empty_periods = 0;
                self.last = Some(time.clone());
                tracing::trace!(%time, occurrence = self.occurrence_number, "rule occurrence");
                return Ok(Some(time));
            }

            self.advance_period()?;
        }
    }

    fn next_in_period(&mut self) -> Option<CalendarTime> {
        let candidates = self.candidates.as_ref()?;
        while let Some(dt) = candidates.get(self.cursor) {
            self.cursor += 1;
            let zone = self.dtstart.zone().clone();
            let time = CalendarTime::from_civil(*dt, self.dtstart.is_date(), zone);
            if time.compare(&self.dtstart) == Ordering::Less {
                continue;
            }
            if self
                .last
                .as_ref()
                .is_some_and(|last| time.compare(last) != Ordering::Greater)
            {
                continue;
            }
            return Some(time);
        }
        None
    }

    fn advance_period(&mut self) -> Result<(), RecurError> {
        if !self.emitted_in_period {
            self.empty_periods += 1;
            if self.empty_periods > self.max_empty_periods {
                return Err(self.stalled());
            }
        }

        self.candidates = None;
        match self.plan.next_period(self.period) {
            Ok(period) => self.period = period,
            Err(err) => self.out_of_range(&err)?,
        }
        Ok(())
    }

    /// End iteration at the edge of the calendar. A rule that never matched
    /// anything before reaching it cannot progress.
    fn out_of_range(&mut self, err: &TimeError) -> Result<(), RecurError> {
        tracing::debug!(%err, "calendar range exhausted");
        if self.occurrence_number == 0 && self.empty_periods > 0 {
            return Err(self.stalled());
        }
        self.complete("out of range");
        Ok(())
    }

    fn stalled(&mut self) -> RecurError {
        tracing::warn!(
            rule = %self.rule,
            periods = self.empty_periods,
            "recurrence rule stopped making progress"
        );
        self.completed = true;
        RecurError::NonProgressing {
            periods: self.empty_periods,
        }
    }

    fn complete(&mut self, reason: &'static str) {
        if !self.completed {
            tracing::debug!(
                rule = %self.rule,
                occurrences = self.occurrence_number,
                reason,
                "rule iterator completed"
            );
        }
        self.completed = true;
    }

    /// Snapshot the iteration position.
    #[must_use]
    pub fn to_state(&self) -> RuleIteratorState {
        RuleIteratorState {
            rule: self.rule.to_data(),
            dtstart: self.dtstart.to_data(),
            last: self.last.as_ref().map(CalendarTime::to_data),
            period: PeriodCursor::from(self.period),
            occurrence_number: self.occurrence_number,
            empty_periods: self.empty_periods,
            completed: self.completed,
        }
    }

    /// Resume from a snapshot, resolving zones in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot holds a malformed rule, an unknown
    /// zone or an invalid period.
    pub fn from_state(
        state: &RuleIteratorState,
        registry: &TimezoneRegistry,
        config: &Config,
    ) -> Result<Self, RecurError> {
        let rule = Arc::new(RecurrenceRule::from_data(&state.rule, registry)?);
        let dtstart = CalendarTime::from_data(&state.dtstart, registry)?;
        rule.check_start(&dtstart)?;
        let plan = CandidatePlan::new(&rule, &dtstart);
        let period = Date::new(state.period.year, state.period.month, state.period.day)
            .map_err(TimeError::from)?;

        let mut iter = Self::assemble(rule, plan, dtstart, period, config);
        iter.last = match &state.last {
            Some(last) => Some(CalendarTime::from_data(last, registry)?),
            None => None,
        };
        iter.occurrence_number = state.occurrence_number;
        iter.empty_periods = state.empty_periods;
        iter.completed = state.completed;
        Ok(iter)
    }
}

impl Iterator for RuleIterator {
    type Item = Result<CalendarTime, RecurError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_occurrence().transpose()
    }
}

/// Plain, serializable snapshot of a [`RuleIterator`].
///
/// Restoring re-derives the candidates of the current period and skips
/// everything up to `last`, so the resumed iterator continues exactly where
/// the snapshotted iterator stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleIteratorState {
    /// The rule being iterated
    pub rule: RuleData,
    /// Series start
    pub dtstart: TimeData,
    /// Last emitted occurrence
    pub last: Option<TimeData>,
    /// Anchor of the current period
    pub period: PeriodCursor,
    /// Occurrences emitted so far
    pub occurrence_number: u32,
    /// Consecutive periods that yielded nothing
    #[serde(default)]
    pub empty_periods: u32,
    /// Whether the iterator is exhausted
    pub completed: bool,
}

/// Calendar date that anchors a recurrence period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[expect(missing_docs)]
pub struct PeriodCursor {
    pub year: i16,
    pub month: i8,
    pub day: i8,
}

impl From<Date> for PeriodCursor {
    fn from(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule expansion.

mod candidates;
mod iterator;

use std::cmp::Ordering;
use std::sync::Arc;

use occur_ical::{CalendarTime, RecurrenceRule};

pub use crate::recur::iterator::{PeriodCursor, RuleIterator, RuleIteratorState};
use crate::{Config, RecurError};

/// Expansion helpers for [`RecurrenceRule`].
pub trait RuleExt {
    /// Iterate the occurrences of the rule from `dtstart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be expanded from `dtstart`.
    fn iterator(&self, dtstart: &CalendarTime, config: &Config) -> Result<RuleIterator, RecurError>;

    /// The first occurrence strictly after `recurrence_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be expanded from `dtstart` or stops
    /// making progress.
    fn next_occurrence(
        &self,
        dtstart: &CalendarTime,
        recurrence_id: &CalendarTime,
        config: &Config,
    ) -> Result<Option<CalendarTime>, RecurError>;
}

impl RuleExt for Arc<RecurrenceRule> {
    fn iterator(
        &self,
        dtstart: &CalendarTime,
        config: &Config,
    ) -> Result<RuleIterator, RecurError> {
        RuleIterator::new(Arc::clone(self), dtstart.clone(), config)
    }

    fn next_occurrence(
        &self,
        dtstart: &CalendarTime,
        recurrence_id: &CalendarTime,
        config: &Config,
    ) -> Result<Option<CalendarTime>, RecurError> {
        let mut iter = self.iterator(dtstart, config)?;
        while let Some(next) = iter.next_occurrence()? {
            if next.compare(recurrence_id) == Ordering::Greater {
                return Ok(Some(next));
            }
        }
        Ok(None)
    }
}

impl RuleExt for RecurrenceRule {
    fn iterator(
        &self,
        dtstart: &CalendarTime,
        config: &Config,
    ) -> Result<RuleIterator, RecurError> {
        Arc::new(self.clone()).iterator(dtstart, config)
    }

    fn next_occurrence(
        &self,
        dtstart: &CalendarTime,
        recurrence_id: &CalendarTime,
        config: &Config,
    ) -> Result<Option<CalendarTime>, RecurError> {
        Arc::new(self.clone()).next_occurrence(dtstart, recurrence_id, config)
    }
}

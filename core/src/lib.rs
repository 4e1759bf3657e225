// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expand iCalendar recurrences into concrete occurrences.
//!
//! [`RuleIterator`] walks a single [`occur_ical::RecurrenceRule`],
//! [`Expansion`] merges it with RDATE and EXDATE values, and [`Event`]
//! applies recurrence exceptions on top.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod event;
mod expansion;
pub mod recur;

pub use crate::config::{Config, DEFAULT_MAX_EMPTY_PERIODS};
pub use crate::error::RecurError;
pub use crate::event::{
    Event, EventDraft, EventEnd, OccurrenceDetails, Occurrences, RecurrenceIdRange,
};
pub use crate::expansion::{Expansion, ExpansionState};
pub use crate::recur::{PeriodCursor, RuleExt, RuleIterator, RuleIteratorState};

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar values for recurrence expansion: times, durations, offsets,
//! timezones and recurrence rules.

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
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool,
    clippy::module_name_repetitions
)]

pub mod keyword;
pub mod value;

pub use crate::value::{
    ByPartKind, CalendarTime, Duration, FixedZone, Frequency, JiffZone, RecurrenceRule, RuleBuilder,
    RuleData, RuleError, TimeData, TimeError, Timezone, TimezoneRegistry, UtcOffset, WeekDay,
    WeekDayNum, ZoneRules,
};

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Value types for recurrence expansion.
//!
//! The types follow the value definitions of RFC 5545 Section 3.3, but carry
//! the calendar arithmetic needed to expand recurrences rather than the
//! text representation.

pub mod calendar;
mod datetime;
mod duration;
mod rrule;
mod timezone;
mod utc_offset;

pub use datetime::{CalendarTime, TimeData, TimeError};
pub use duration::Duration;
pub use rrule::{
    ByPartKind, Frequency, RecurrenceRule, RuleBuilder, RuleData, RuleError, WeekDay, WeekDayNum,
};
pub use timezone::{FixedZone, JiffZone, Timezone, TimezoneRegistry, ZoneRules};
pub use utc_offset::UtcOffset;

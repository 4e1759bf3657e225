// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! UTC offset value as defined in RFC 5545 Section 3.3.14.

use std::cmp::Ordering;
use std::fmt::{self, Display};

/// Offset from UTC with minute precision.
///
/// The signed value is `factor * (hours * 3600 + minutes * 60)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffset {
    hours: u8,
    minutes: u8,
    factor: i8,
}

impl UtcOffset {
    /// The zero offset.
    pub const UTC: Self = Self {
        hours: 0,
        minutes: 0,
        factor: 1,
    };

    /// Build an offset from its sign and magnitude, as written in `-00:30`.
    #[must_use]
    pub fn new(positive: bool, hours: u8, minutes: u8) -> Self {
        Self {
            hours,
            minutes,
            factor: if positive || (hours == 0 && minutes == 0) { 1 } else { -1 },
        }
    }

    /// Build an offset from a signed number of seconds, dropping any
    /// sub-minute remainder.
    #[must_use]
    pub fn from_seconds(seconds: i32) -> Self {
        let abs = seconds.unsigned_abs();
        Self {
            hours: u8::try_from(abs / 3600).unwrap_or(u8::MAX),
            minutes: u8::try_from(abs % 3600 / 60).unwrap_or(0),
            factor: if seconds < 0 { -1 } else { 1 },
        }
    }

    /// Signed offset in seconds.
    #[must_use]
    pub fn to_seconds(&self) -> i32 {
        i32::from(self.factor) * (i32::from(self.hours) * 3600 + i32::from(self.minutes) * 60)
    }

    /// Compare by signed offset.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.to_seconds().cmp(&other.to_seconds())
    }
}

impl Default for UtcOffset {
    fn default() -> Self {
        Self::UTC
    }
}

impl From<jiff::tz::Offset> for UtcOffset {
    fn from(offset: jiff::tz::Offset) -> Self {
        Self::from_seconds(offset.seconds())
    }
}

impl Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.to_seconds() < 0 { '-' } else { '+' };
        write!(f, "{sign}{:02}:{:02}", self.hours, self.minutes)
    }
}

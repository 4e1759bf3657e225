// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Duration value as defined in RFC 5545 Section 3.3.6.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::ops::Neg;

/// Signed span of weeks, days, hours, minutes and seconds.
///
/// Fields may be denormalized (e.g. 90 seconds); [`Duration::to_seconds`]
/// is the canonical value and [`Duration::normalize`] redistributes the
/// fields without changing it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    /// Week Duration
    pub weeks: u32,
    /// Day Duration
    pub days: u32,
    /// Hour Duration
    pub hours: u32,
    /// Minute Duration
    pub minutes: u32,
    /// Second Duration
    pub seconds: u32,
    /// Whether the duration is negative
    pub is_negative: bool,
}

impl Duration {
    /// The empty duration.
    pub const ZERO: Self = Self {
        weeks: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        is_negative: false,
    };

    /// Build a normalized duration from a signed number of seconds.
    ///
    /// Whole weeks are only used when the day count is a multiple of seven,
    /// so 8 days stays `P8D` rather than `P1W1D`.
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        let mut secs = seconds.unsigned_abs();
        let mut days = secs / 86_400;
        let mut weeks = 0;
        if days % 7 == 0 {
            weeks = days / 7;
            days = 0;
        }
        secs -= (days + weeks * 7) * 86_400;
        let hours = secs / 3600;
        secs -= hours * 3600;
        let minutes = secs / 60;
        secs -= minutes * 60;

        let narrow = |v: u64| u32::try_from(v).unwrap_or(u32::MAX);
        Self {
            weeks: narrow(weeks),
            days: narrow(days),
            hours: narrow(hours),
            minutes: narrow(minutes),
            seconds: narrow(secs),
            is_negative: seconds < 0,
        }
    }

    /// Total signed length in seconds.
    #[must_use]
    pub fn to_seconds(&self) -> i64 {
        let total = i64::from(self.seconds)
            + 60 * i64::from(self.minutes)
            + 3600 * i64::from(self.hours)
            + 86_400 * i64::from(self.days)
            + 7 * 86_400 * i64::from(self.weeks);
        if self.is_negative { -total } else { total }
    }

    /// Redistribute the fields so that each is within its natural range.
    pub fn normalize(&mut self) {
        *self = Self::from_seconds(self.to_seconds());
    }

    /// Compare by total length.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.to_seconds().cmp(&other.to_seconds())
    }

    /// Whether the duration spans no time at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.to_seconds() == 0
    }
}

impl Neg for Duration {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            is_negative: !self.is_negative,
            ..self
        }
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "PT0S");
        }
        if self.is_negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        if self.weeks > 0 {
            write!(f, "{}W", self.weeks)?;
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        }
        Ok(())
    }
}

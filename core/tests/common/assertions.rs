// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Custom assertion helpers for integration tests.

use occur_core::RecurError;
use occur_ical::CalendarTime;

/// Collects occurrences in their extended display form.
///
/// # Panics
///
/// Panics if the iterator yields an error.
pub fn collect_occurrences<I>(iter: I) -> Vec<String>
where
    I: Iterator<Item = Result<CalendarTime, RecurError>>,
{
    iter.map(|t| t.unwrap().to_string()).collect()
}

/// Asserts that the first occurrences match `expected`.
///
/// # Panics
///
/// Panics if the iterator yields an error or the occurrences differ.
///
/// # Example
///
/// ```ignore
/// assert_occurrences(iter, &["2024-01-01", "2024-01-03"]);
/// ```
pub fn assert_occurrences<I>(iter: I, expected: &[&str])
where
    I: Iterator<Item = Result<CalendarTime, RecurError>>,
{
    let actual = collect_occurrences(iter.take(expected.len()));
    assert_eq!(actual, expected, "Occurrence mismatch");
}

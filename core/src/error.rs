// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use occur_ical::{RuleError, TimeError};

/// Errors raised while expanding recurrences.
///
/// Running out of occurrences is not an error; iterators report it as
/// `Ok(None)`.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecurError {
    /// The recurrence rule cannot be expanded.
    #[error("malformed recurrence rule: {0}")]
    MalformedRule(#[from] RuleError),

    /// An exception belongs to a different event.
    #[error("exception of {exception} cannot be related to event {owner}")]
    InvalidRelation {
        /// UID of the owning event
        owner: String,
        /// UID of the exception
        exception: String,
    },

    /// An exception was related without a recurrence id.
    #[error("exception of {uid} has no recurrence id")]
    MissingRecurrenceId {
        /// UID of the exception
        uid: String,
    },

    /// An exception event was asked to own exceptions of its own.
    #[error("a recurrence exception cannot own exceptions")]
    RecursiveException,

    /// Too many consecutive periods produced no occurrence.
    #[error("no occurrence found in {periods} consecutive periods")]
    NonProgressing {
        /// Number of empty periods skipped
        periods: u32,
    },

    /// A calendar value left the supported range or could not be restored.
    #[error(transparent)]
    Time(#[from] TimeError),
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - Calendar value factories (fixtures)
//! - Occurrence assertion helpers

mod assertions;
mod fixtures;

#[allow(unused_imports)]
pub use assertions::{assert_occurrences, collect_occurrences};
#[allow(unused_imports)]
pub use fixtures::{date, test_config, utc, weekly_event, zoned};

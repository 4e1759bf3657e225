// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use occur_ical::{Frequency, RecurrenceRule, RuleBuilder, WeekDay};
use serde::de;

/// Default number of consecutive empty periods before iteration gives up.
pub const DEFAULT_MAX_EMPTY_PERIODS: u32 = 10_000;

/// Configuration for recurrence expansion.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Consecutive candidate periods allowed to yield nothing before the
    /// iterator reports [`crate::RecurError::NonProgressing`].
    #[serde(default = "default_max_empty_periods")]
    pub max_empty_periods: u32,

    /// Week start for rules built by the host without WKST.
    #[serde(default, deserialize_with = "deserialize_week_start")]
    pub week_start: WeekDay,
}

impl Config {
    /// Normalize the configuration.
    pub fn normalize(&mut self) {
        if self.max_empty_periods == 0 {
            tracing::warn!("max_empty_periods must be positive, using 1");
            self.max_empty_periods = 1;
        }
    }

    /// Start a rule using the configured week start.
    #[must_use]
    pub fn rule_builder(&self, freq: Frequency) -> RuleBuilder {
        RecurrenceRule::builder(freq).week_start(self.week_start)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS,
            week_start: WeekDay::Monday,
        }
    }
}

const fn default_max_empty_periods() -> u32 {
    DEFAULT_MAX_EMPTY_PERIODS
}

fn deserialize_week_start<'de, D>(deserializer: D) -> Result<WeekDay, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct WeekDayVisitor;

    impl de::Visitor<'_> for WeekDayVisitor {
        type Value = WeekDay;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str(r#"a weekday like "MO", "monday" or "Sunday""#)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value
                .parse()
                .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_str(WeekDayVisitor)
}

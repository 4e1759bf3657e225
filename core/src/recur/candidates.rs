// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Candidate generation for one recurrence period.
//!
//! A period is the span the frequency steps over: a year, a month, a week
//! (starting on WKST) or a day. Sub-daily frequencies use one-day periods
//! and keep only the time units that fall on the interval grid.

use std::ops::RangeInclusive;

use jiff::civil::{Date, DateTime, Time};
use occur_ical::value::calendar::{self, date_from_epoch_days, epoch_days, wall_seconds};
use occur_ical::{
    ByPartKind, CalendarTime, Frequency, RecurrenceRule, TimeError, WeekDay, WeekDayNum,
};

#[derive(Debug, Clone)]
pub(crate) struct CandidatePlan {
    freq: Frequency,
    interval: i64,
    wkst: WeekDay,
    month_scoped: bool,
    months: Vec<i8>,
    week_nos: Vec<i32>,
    year_days: Vec<i32>,
    month_days: Vec<i32>,
    days: Vec<WeekDayNum>,
    times: Vec<Time>,
    set_pos: Vec<i32>,
    origin: i64,
}

impl CandidatePlan {
    /// Resolve the rule against its series start, filling in the parts the
    /// start implies (e.g. a plain monthly rule repeats on the start's day).
    pub(crate) fn new(rule: &RecurrenceRule, dtstart: &CalendarTime) -> Self {
        let freq = rule.freq();
        let start = dtstart.civil();

        let mut months: Vec<i8> = narrow(rule.part(ByPartKind::Month));
        let mut month_days = rule.part(ByPartKind::MonthDay).to_vec();
        let mut days = rule.by_day();
        let week_nos = rule.part(ByPartKind::WeekNo).to_vec();
        let year_days = rule.part(ByPartKind::YearDay).to_vec();

        if week_nos.is_empty() && year_days.is_empty() && month_days.is_empty() && days.is_empty()
        {
            match freq {
                Frequency::Yearly => {
                    if months.is_empty() {
                        months.push(start.month());
                    }
                    month_days.push(start.day().into());
                }
                Frequency::Monthly => month_days.push(start.day().into()),
                Frequency::Weekly => days.push(WeekDayNum::every(dtstart.day_of_week())),
                _ => {}
            }
        }

        let times = if dtstart.is_date() {
            vec![Time::midnight()]
        } else {
            let hours = time_values(rule, ByPartKind::Hour, freq, 0..=23, start.hour());
            let minutes = time_values(rule, ByPartKind::Minute, freq, 0..=59, start.minute());
            let seconds = time_values(rule, ByPartKind::Second, freq, 0..=59, start.second());
            let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
            for h in &hours {
                for m in &minutes {
                    for s in &seconds {
                        times.extend(Time::new(*h, *m, *s, 0).ok());
                    }
                }
            }
            times
        };

        let origin = match unit_seconds(freq) {
            Some(unit) => {
                let wall = wall_seconds(start);
                wall - wall.rem_euclid(unit)
            }
            None => 0,
        };

        Self {
            freq,
            interval: rule.interval().into(),
            wkst: rule.week_start(),
            month_scoped: freq == Frequency::Monthly
                || (freq == Frequency::Yearly && rule.has_part(ByPartKind::Month)),
            months,
            week_nos,
            year_days,
            month_days,
            days,
            times,
            set_pos: rule.part(ByPartKind::SetPos).to_vec(),
            origin,
        }
    }

    /// Anchor of the period containing `date`.
    pub(crate) fn period_of(&self, date: Date) -> Result<Date, TimeError> {
        match self.freq {
            Frequency::Yearly => Ok(date.first_of_year()),
            Frequency::Monthly => Ok(date.first_of_month()),
            Frequency::Weekly => calendar::start_of_week(date, self.wkst),
            _ => Ok(date),
        }
    }

    /// Anchor of the period after `period`.
    pub(crate) fn next_period(&self, period: Date) -> Result<Date, TimeError> {
        let (year, month) = (i64::from(period.year()), i64::from(period.month()));
        match self.freq {
            Frequency::Yearly => {
                calendar::normalize_fields(year + self.interval, 1, 1, 0, 0, 0).map(|dt| dt.date())
            }
            Frequency::Monthly => {
                calendar::normalize_fields(year, month + self.interval, 1, 0, 0, 0)
                    .map(|dt| dt.date())
            }
            Frequency::Weekly => calendar::add_days(period, 7 * self.interval),
            Frequency::Daily => calendar::add_days(period, self.interval),
            _ => calendar::add_days(period, 1),
        }
    }

    /// All candidates of the period anchored at `period`, ascending.
    pub(crate) fn candidates(&self, period: Date) -> Result<Vec<DateTime>, TimeError> {
        let len: i64 = match self.freq {
            Frequency::Yearly => period.days_in_year().into(),
            Frequency::Monthly => period.days_in_month().into(),
            Frequency::Weekly => 7,
            _ => 1,
        };

        let base = epoch_days(period);
        let mut out = Vec::new();
        for offset in 0..len {
            let date = date_from_epoch_days(base + offset)?;
            if !self.matches_date(date)? {
                continue;
            }
            for time in &self.times {
                let dt = date.to_datetime(*time);
                if self.on_interval_grid(dt) {
                    out.push(dt);
                }
            }
        }

        if self.set_pos.is_empty() {
            return Ok(out);
        }
        if unit_seconds(self.freq).is_none() {
            return Ok(select_positions(&out, &self.set_pos));
        }
        let selected = out
            .chunk_by(|a, b| self.unit_index(*a) == self.unit_index(*b))
            .flat_map(|group| select_positions(group, &self.set_pos))
            .collect();
        Ok(selected)
    }

    fn matches_date(&self, date: Date) -> Result<bool, TimeError> {
        if !self.months.is_empty() && !self.months.contains(&date.month()) {
            return Ok(false);
        }

        if !self.week_nos.is_empty() {
            let (week_year, week) = calendar::week_number(date, self.wkst)?;
            let total = calendar::weeks_in_year(week_year, self.wkst)?;
            let week = i32::from(week);
            let total = i32::from(total);
            if !self.week_nos.iter().any(|v| from_end(*v, total) == week) {
                return Ok(false);
            }
        }

        if !self.year_days.is_empty() {
            let total = i32::from(date.days_in_year());
            let doy = i32::from(date.day_of_year());
            if !self.year_days.iter().any(|v| from_end(*v, total) == doy) {
                return Ok(false);
            }
        }

        if !self.month_days.is_empty() {
            let total = i32::from(date.days_in_month());
            let day = i32::from(date.day());
            if !self.month_days.iter().any(|v| from_end(*v, total) == day) {
                return Ok(false);
            }
        }

        if !self.days.is_empty() && !self.days.iter().any(|d| self.matches_weekday(date, *d)) {
            return Ok(false);
        }

        Ok(true)
    }

    fn matches_weekday(&self, date: Date, day: WeekDayNum) -> bool {
        if WeekDay::from(date.weekday()) != day.day {
            return false;
        }
        match day.occurrence {
            None => true,
            Some(n) if self.month_scoped => {
                calendar::nth_weekday_of_month(date, day.day, n.into()) == Some(date.day())
            }
            Some(n) => {
                calendar::nth_weekday_of_year(date, day.day, n.into()) == Some(date.day_of_year())
            }
        }
    }

    fn unit_index(&self, dt: DateTime) -> i64 {
        match unit_seconds(self.freq) {
            Some(unit) => (wall_seconds(dt) - self.origin).div_euclid(unit),
            None => 0,
        }
    }

    fn on_interval_grid(&self, dt: DateTime) -> bool {
        unit_seconds(self.freq).is_none() || self.unit_index(dt).rem_euclid(self.interval) == 0
    }
}

fn unit_seconds(freq: Frequency) -> Option<i64> {
    match freq {
        Frequency::Hourly => Some(3600),
        Frequency::Minutely => Some(60),
        Frequency::Secondly => Some(1),
        _ => None,
    }
}

fn time_values(
    rule: &RecurrenceRule,
    kind: ByPartKind,
    freq: Frequency,
    all: RangeInclusive<i8>,
    start: i8,
) -> Vec<i8> {
    let expands = match kind {
        ByPartKind::Hour => freq <= Frequency::Hourly,
        ByPartKind::Minute => freq <= Frequency::Minutely,
        _ => freq <= Frequency::Secondly,
    };
    if rule.has_part(kind) {
        narrow(rule.part(kind))
            .into_iter()
            .filter(|v| all.contains(v))
            .collect()
    } else if expands {
        all.collect()
    } else {
        vec![start]
    }
}

fn narrow(values: &[i32]) -> Vec<i8> {
    values.iter().filter_map(|v| i8::try_from(*v).ok()).collect()
}

/// Resolve a possibly negative position against a count of `total` items.
fn from_end(value: i32, total: i32) -> i32 {
    if value > 0 { value } else { total + 1 + value }
}

fn select_positions(list: &[DateTime], positions: &[i32]) -> Vec<DateTime> {
    let len = i64::try_from(list.len()).unwrap_or(i64::MAX);
    let mut picked: Vec<DateTime> = positions
        .iter()
        .filter_map(|pos| {
            let pos = i64::from(*pos);
            let index = if pos > 0 { pos - 1 } else { len + pos };
            usize::try_from(index).ok().and_then(|i| list.get(i)).copied()
        })
        .collect();
    picked.sort_unstable();
    picked.dedup();
    picked
}

//! BYxxx rule evaluation for one period of a recurrence rule.
//!
//! Each period's candidate days are the days of the period (a whole year,
//! month or week, or a single day) that pass every day-level rule; each day
//! is then expanded by the time-level rules and BYSETPOS picks from the
//! sorted batch. Rules coarser than the frequency therefore limit and rules
//! finer than it expand, which is the RFC 5545 §3.3.10 table.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::rfc::ical::core::{Frequency, RRule};

/// The unit a sub-daily period was rejected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Skip {
    Day,
    Hour,
    Minute,
}

/// The outcome of evaluating one period.
#[derive(Debug)]
pub(super) enum Batch {
    /// Sorted, duplicate-free wall-clock instants.
    Instants(Vec<NaiveDateTime>),
    /// Nothing until the next boundary of this unit can match.
    Skip(Skip),
}

/// A rule's BYxxx parts, normalized for evaluation.
#[derive(Debug, Clone)]
pub(super) struct Rules {
    freq: Frequency,
    months: Vec<u32>,
    week_nos: Vec<i64>,
    year_days: Vec<i64>,
    month_days: Vec<i64>,
    weekdays: Vec<Weekday>,
    nth_weekdays: Vec<(i64, Weekday)>,
    hours: Vec<u32>,
    minutes: Vec<u32>,
    seconds: Vec<u32>,
    set_pos: Vec<i64>,
    week_start: Weekday,
    date_only: bool,
}

impl Rules {
    /// ## Summary
    /// Normalizes `rule` against the wall clock of its start.
    ///
    /// Parts the rule leaves out are taken from the start: the day of month
    /// for MONTHLY, the month and day for YEARLY, the weekday for WEEKLY and
    /// for a YEARLY rule with only BYWEEKNO, and the time of day down to the
    /// frequency's unit. Time parts are ignored for a DATE start.
    pub(super) fn new(rule: &RRule, start: NaiveDateTime, date_only: bool) -> Self {
        let freq = rule.freq();
        let mut weekdays = Vec::new();
        let mut nth_weekdays = Vec::new();
        for day in rule.by_day() {
            match day.ordinal {
                Some(n) if matches!(freq, Frequency::Monthly | Frequency::Yearly) => {
                    nth_weekdays.push((i64::from(n), day.weekday.to_chrono()));
                }
                _ => weekdays.push(day.weekday.to_chrono()),
            }
        }

        let mut months: Vec<u32> = rule.by_month().iter().copied().map(u32::from).collect();
        let week_nos: Vec<i64> = rule.by_week_no().iter().copied().map(i64::from).collect();
        let year_days: Vec<i64> = rule.by_year_day().iter().copied().map(i64::from).collect();
        let mut month_days: Vec<i64> = rule.by_month_day().iter().copied().map(i64::from).collect();

        let no_weekday = weekdays.is_empty() && nth_weekdays.is_empty();
        if week_nos.is_empty() && year_days.is_empty() && month_days.is_empty() && no_weekday {
            match freq {
                Frequency::Yearly => {
                    if months.is_empty() {
                        months.push(start.month());
                    }
                    month_days.push(i64::from(start.day()));
                }
                Frequency::Monthly => month_days.push(i64::from(start.day())),
                Frequency::Weekly => weekdays.push(start.weekday()),
                _ => {}
            }
        } else if freq == Frequency::Yearly
            && !week_nos.is_empty()
            && year_days.is_empty()
            && month_days.is_empty()
            && no_weekday
        {
            weekdays.push(start.weekday());
        }

        let fill = |by: &[u8], default: u32, expands: bool| -> Vec<u32> {
            if by.is_empty() && expands {
                vec![default]
            } else {
                let mut values: Vec<u32> = by.iter().copied().map(u32::from).collect();
                values.sort_unstable();
                values.dedup();
                values
            }
        };
        let hours = fill(rule.by_hour(), start.hour(), freq > Frequency::Hourly);
        let minutes = fill(rule.by_minute(), start.minute(), freq > Frequency::Minutely);
        let seconds = fill(rule.by_second(), start.second(), freq > Frequency::Secondly);

        Self {
            freq,
            months,
            week_nos,
            year_days,
            month_days,
            weekdays,
            nth_weekdays,
            hours,
            minutes,
            seconds,
            set_pos: rule.by_set_pos().iter().copied().map(i64::from).collect(),
            week_start: rule.week_start().to_chrono(),
            date_only,
        }
    }

    /// Evaluates the period beginning at `anchor`.
    pub(super) fn expand(&self, anchor: NaiveDateTime) -> Batch {
        let date = anchor.date();
        let instants = match self.freq {
            Frequency::Yearly | Frequency::Monthly | Frequency::Weekly | Frequency::Daily => {
                let mut out = Vec::new();
                for day in self.period_days(date).filter(|d| self.day_matches(*d)) {
                    if self.date_only {
                        out.push(day.and_time(NaiveTime::MIN));
                    } else {
                        out.extend(self.times(&self.hours, &self.minutes).map(|t| day.and_time(t)));
                    }
                }
                out
            }
            Frequency::Hourly => {
                if !self.day_matches(date) {
                    return Batch::Skip(Skip::Day);
                }
                if !accepts(&self.hours, anchor.hour()) {
                    return Batch::Instants(Vec::new());
                }
                self.times(&[anchor.hour()], &self.minutes)
                    .map(|t| date.and_time(t))
                    .collect()
            }
            Frequency::Minutely => {
                if !self.day_matches(date) {
                    return Batch::Skip(Skip::Day);
                }
                if !accepts(&self.hours, anchor.hour()) {
                    return Batch::Skip(Skip::Hour);
                }
                if !accepts(&self.minutes, anchor.minute()) {
                    return Batch::Instants(Vec::new());
                }
                self.times(&[anchor.hour()], &[anchor.minute()])
                    .map(|t| date.and_time(t))
                    .collect()
            }
            Frequency::Secondly => {
                if !self.day_matches(date) {
                    return Batch::Skip(Skip::Day);
                }
                if !accepts(&self.hours, anchor.hour()) {
                    return Batch::Skip(Skip::Hour);
                }
                if !accepts(&self.minutes, anchor.minute()) {
                    return Batch::Skip(Skip::Minute);
                }
                if accepts(&self.seconds, anchor.second()) {
                    vec![anchor]
                } else {
                    Vec::new()
                }
            }
        };
        Batch::Instants(self.select(instants))
    }

    /// Times of day from the given hours and minutes and the rule's seconds.
    fn times<'a>(&'a self, hours: &'a [u32], minutes: &'a [u32]) -> impl Iterator<Item = NaiveTime> + 'a {
        hours.iter().flat_map(move |&h| {
            minutes.iter().flat_map(move |&m| {
                self.seconds
                    .iter()
                    .filter_map(move |&s| NaiveTime::from_hms_opt(h, m, s))
            })
        })
    }

    /// Sorts the batch and applies BYSETPOS.
    fn select(&self, mut instants: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
        instants.sort_unstable();
        instants.dedup();
        if self.set_pos.is_empty() || instants.is_empty() {
            return instants;
        }

        let Ok(len) = i64::try_from(instants.len()) else {
            return Vec::new();
        };
        let mut picked: Vec<NaiveDateTime> = self
            .set_pos
            .iter()
            .filter_map(|&pos| {
                let index = if pos > 0 { pos - 1 } else { len + pos };
                usize::try_from(index)
                    .ok()
                    .and_then(|i| instants.get(i).copied())
            })
            .collect();
        picked.sort_unstable();
        picked.dedup();
        picked
    }

    /// Days of the period starting on `anchor`.
    fn period_days(&self, anchor: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        let (year, month) = (anchor.year(), anchor.month());
        let freq = self.freq;
        anchor
            .iter_days()
            .enumerate()
            .take_while(move |(i, d)| match freq {
                Frequency::Yearly => d.year() == year,
                Frequency::Monthly => d.month() == month && d.year() == year,
                Frequency::Weekly => *i < 7,
                _ => *i < 1,
            })
            .map(|(_, d)| d)
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        if !self.months.is_empty() && !self.months.contains(&date.month()) {
            return false;
        }
        if !self.week_nos.is_empty() && !self.matches_week_no(date) {
            return false;
        }
        if !self.year_days.is_empty()
            && !matches_signed(&self.year_days, date.ordinal(), days_in_year(date.year()))
        {
            return false;
        }
        if !self.month_days.is_empty()
            && !matches_signed(&self.month_days, date.day(), days_in_month(date))
        {
            return false;
        }
        if self.weekdays.is_empty() && self.nth_weekdays.is_empty() {
            return true;
        }
        let weekday = date.weekday();
        self.weekdays.contains(&weekday)
            || self
                .nth_weekdays
                .iter()
                .any(|&(n, wd)| wd == weekday && self.is_nth(date, n))
    }

    /// Whether `date` is the `n`th of its weekday within the month (MONTHLY,
    /// or YEARLY with BYMONTH) or the year.
    fn is_nth(&self, date: NaiveDate, n: i64) -> bool {
        let month_scope = self.freq == Frequency::Monthly
            || (self.freq == Frequency::Yearly && !self.months.is_empty());
        let (pos, len) = if month_scope {
            (date.day(), days_in_month(date))
        } else {
            (date.ordinal(), days_in_year(date.year()))
        };
        if n > 0 {
            n == i64::from((pos - 1) / 7 + 1)
        } else {
            -n == i64::from((len - pos) / 7 + 1)
        }
    }

    fn matches_week_no(&self, date: NaiveDate) -> bool {
        let Some((week, weeks)) = week_of(date, self.week_start) else {
            return false;
        };
        self.week_nos
            .iter()
            .any(|&n| n == week || (n < 0 && weeks + n + 1 == week))
    }
}

fn accepts(values: &[u32], value: u32) -> bool {
    values.is_empty() || values.contains(&value)
}

/// Matches `value` (1-based) against positive and from-the-end entries.
fn matches_signed(entries: &[i64], value: u32, len: u32) -> bool {
    let (value, len) = (i64::from(value), i64::from(len));
    entries
        .iter()
        .any(|&n| n == value || (n < 0 && len + n + 1 == value))
}

pub(super) fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .or_else(|| NaiveDate::from_ymd_opt(year + 1, 1, 1))
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

fn days_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 31).map_or(365, |d| d.ordinal())
}

/// Returns the first day of the week containing `date`, weeks starting on
/// `week_start`.
pub(super) fn week_containing(date: NaiveDate, week_start: Weekday) -> Option<NaiveDate> {
    let back = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date.checked_sub_days(Days::new(u64::from(back)))
}

/// First day of week 1: the week holding January 4th, so at least four of
/// its days fall in the year.
fn week_one(year: i32, week_start: Weekday) -> Option<NaiveDate> {
    week_containing(NaiveDate::from_ymd_opt(year, 1, 4)?, week_start)
}

/// Returns the week number of `date` and the number of weeks in its
/// week-numbering year.
fn week_of(date: NaiveDate, week_start: Weekday) -> Option<(i64, i64)> {
    let year = date.year();
    let week_year = if date >= week_one(year + 1, week_start)? {
        year + 1
    } else if date < week_one(year, week_start)? {
        year - 1
    } else {
        year
    };
    let first = week_one(week_year, week_start)?;
    let following = week_one(week_year + 1, week_start)?;
    Some((
        (date - first).num_days() / 7 + 1,
        (following - first).num_days() / 7,
    ))
}

//! Period stepping: the FREQ and INTERVAL parts of a rule.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday};

use super::byrule::{Skip, week_containing};
use crate::rfc::ical::core::Frequency;

/// Locates the periods of a rule: period `n` begins `n * INTERVAL` units
/// after the period holding the start.
#[derive(Debug, Clone)]
pub(super) struct Cadence {
    freq: Frequency,
    interval: u32,
    origin: NaiveDateTime,
}

impl Cadence {
    pub(super) fn new(freq: Frequency, interval: u32, start: NaiveDateTime, week_start: Weekday) -> Self {
        let date = start.date();
        let origin = match freq {
            Frequency::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1).map(midnight),
            Frequency::Monthly => date.with_day(1).map(midnight),
            Frequency::Weekly => week_containing(date, week_start).map(midnight),
            Frequency::Daily => Some(midnight(date)),
            Frequency::Hourly => start
                .with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0)),
            Frequency::Minutely => start.with_second(0).and_then(|t| t.with_nanosecond(0)),
            Frequency::Secondly => start.with_nanosecond(0),
        }
        .unwrap_or(start);

        Self {
            freq,
            interval: interval.max(1),
            origin,
        }
    }

    /// Returns the beginning of period `index`, or `None` past chrono's range.
    pub(super) fn anchor(&self, index: u64) -> Option<NaiveDateTime> {
        let steps = index.checked_mul(u64::from(self.interval))?;
        match self.freq {
            Frequency::Yearly => self
                .origin
                .checked_add_months(Months::new(u32::try_from(steps.checked_mul(12)?).ok()?)),
            Frequency::Monthly => self
                .origin
                .checked_add_months(Months::new(u32::try_from(steps).ok()?)),
            Frequency::Weekly => self.origin.checked_add_days(Days::new(steps.checked_mul(7)?)),
            Frequency::Daily => self.origin.checked_add_days(Days::new(steps)),
            Frequency::Hourly => self
                .origin
                .checked_add_signed(TimeDelta::try_hours(i64::try_from(steps).ok()?)?),
            Frequency::Minutely => self
                .origin
                .checked_add_signed(TimeDelta::try_minutes(i64::try_from(steps).ok()?)?),
            Frequency::Secondly => self
                .origin
                .checked_add_signed(TimeDelta::try_seconds(i64::try_from(steps).ok()?)?),
        }
    }

    /// ## Summary
    /// Returns the first period after `index` that begins at or after the
    /// next boundary of `unit`.
    ///
    /// Used by sub-daily rules to step over a whole day, hour or minute a
    /// coarser BYxxx part has already rejected.
    pub(super) fn skip_past(&self, index: u64, unit: Skip) -> Option<u64> {
        let anchor = self.anchor(index)?;
        let boundary = match unit {
            Skip::Day => midnight(anchor.date().succ_opt()?),
            Skip::Hour => anchor
                .with_minute(0)?
                .with_second(0)?
                .checked_add_signed(TimeDelta::hours(1))?,
            Skip::Minute => anchor
                .with_second(0)?
                .checked_add_signed(TimeDelta::minutes(1))?,
        };
        let unit_seconds: u64 = match self.freq {
            Frequency::Hourly => 3600,
            Frequency::Minutely => 60,
            Frequency::Secondly => 1,
            _ => return index.checked_add(1),
        };
        let step = unit_seconds.checked_mul(u64::from(self.interval))?;
        let gap = u64::try_from((boundary - anchor).num_seconds()).ok()?;
        index.checked_add(gap.div_ceil(step).max(1))
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

//! The lazy occurrence iterator.

use std::collections::VecDeque;

use chrono::{NaiveDate, NaiveDateTime};

use super::byrule::{Batch, Rules};
use super::frequency::Cadence;
use super::set::CountPolicy;
use crate::rfc::ical::core::{RRule, Temporal, TemporalKind};

/// Inclusive end of a rule.
#[derive(Debug, Clone, Copy)]
enum Until {
    /// A DATE UNTIL covers the whole day.
    Date(NaiveDate),
    Instant(NaiveDateTime),
}

impl Until {
    fn from_temporal(until: &Temporal) -> Self {
        match until {
            Temporal::Date(d) => Self::Date(*d),
            Temporal::DateTime(_) => Self::Instant(until.instant_key()),
        }
    }

    fn passed_by(self, occurrence: &Temporal) -> bool {
        match self {
            Self::Date(d) => occurrence.date() > d,
            Self::Instant(key) => occurrence.instant_key() > key,
        }
    }
}

/// Exception dates, matched by instant or by day.
#[derive(Debug, Clone, Default)]
pub(super) struct Exclusions {
    instants: Vec<NaiveDateTime>,
    dates: Vec<NaiveDate>,
}

impl Exclusions {
    pub(super) fn new(exdates: &[Temporal]) -> Self {
        let mut exclusions = Self::default();
        for exdate in exdates {
            match exdate {
                Temporal::Date(d) => exclusions.dates.push(*d),
                Temporal::DateTime(_) => exclusions.instants.push(exdate.instant_key()),
            }
        }
        exclusions
    }

    /// A DATE exception removes every occurrence on that wall-clock day;
    /// date-time exceptions match the exact instant.
    fn excludes(&self, occurrence: &Temporal) -> bool {
        if self.dates.contains(&occurrence.date()) {
            return true;
        }
        match occurrence.kind() {
            TemporalKind::Date => false,
            TemporalKind::Local | TemporalKind::Zoned => {
                self.instants.contains(&occurrence.instant_key())
            }
        }
    }
}

/// Produces the instants of one RRULE in order, applying the lower bound,
/// UNTIL and COUNT.
#[derive(Debug, Clone)]
struct RuleCursor {
    rules: Rules,
    cadence: Cadence,
    index: u64,
    template: Temporal,
    start: NaiveDateTime,
    until: Option<Until>,
    count: Option<u32>,
    produced: u32,
    policy: CountPolicy,
    buffer: VecDeque<NaiveDateTime>,
    empty_run: u32,
    max_empty_periods: u32,
    done: bool,
}

impl RuleCursor {
    fn new(rule: &RRule, start: &Temporal, policy: CountPolicy, max_empty_periods: u32) -> Self {
        let wall = start.wall_clock();
        let date_only = start.kind() == TemporalKind::Date;
        Self {
            rules: Rules::new(rule, wall, date_only),
            cadence: Cadence::new(rule.freq(), rule.interval(), wall, rule.week_start().to_chrono()),
            index: 0,
            template: start.clone(),
            start: wall,
            until: rule.until().map(Until::from_temporal),
            count: rule.count(),
            produced: 0,
            policy,
            buffer: VecDeque::new(),
            empty_run: 0,
            max_empty_periods,
            done: false,
        }
    }

    fn next(&mut self, exclusions: &Exclusions) -> Option<Temporal> {
        while !self.done {
            let Some(local) = self.buffer.pop_front() else {
                self.fill();
                continue;
            };
            let occurrence = self.template.with_wall_clock(local);
            if self.until.is_some_and(|until| until.passed_by(&occurrence)) {
                self.done = true;
                break;
            }
            if self.policy == CountPolicy::ExcludeExceptions && exclusions.excludes(&occurrence) {
                continue;
            }
            if self.count.is_some_and(|count| self.produced >= count) {
                self.done = true;
                break;
            }
            self.produced += 1;
            return Some(occurrence);
        }
        None
    }

    /// Evaluates periods until one yields instants at or after the start.
    fn fill(&mut self) {
        let Some(anchor) = self.cadence.anchor(self.index) else {
            tracing::debug!(index = self.index, "Recurrence left the representable range");
            self.done = true;
            return;
        };
        if let Some(until) = self.until
            && until.passed_by(&self.template.with_wall_clock(anchor))
        {
            self.done = true;
            return;
        }

        match self.rules.expand(anchor) {
            Batch::Instants(instants) => {
                self.index += 1;
                let start = self.start;
                self.buffer.extend(instants.into_iter().filter(|i| *i >= start));
                if self.buffer.is_empty() {
                    self.empty_run += 1;
                } else {
                    self.empty_run = 0;
                }
            }
            Batch::Skip(unit) => {
                tracing::trace!(?anchor, ?unit, "Skipping rejected period");
                match self.cadence.skip_past(self.index, unit) {
                    Some(next) => self.index = next,
                    None => self.done = true,
                }
                self.empty_run += 1;
            }
        }

        if self.empty_run >= self.max_empty_periods {
            tracing::warn!(
                empty_periods = self.empty_run,
                ?anchor,
                "Recurrence rule produced no instants for too many periods, ending stream"
            );
            self.done = true;
        }
    }
}

/// Where rule instants come from.
#[derive(Debug, Clone)]
enum Source {
    /// No RRULE: DTSTART is the single rule instant.
    Start(Option<Temporal>),
    Rule(Box<RuleCursor>),
}

impl Source {
    fn next(&mut self, exclusions: &Exclusions) -> Option<Temporal> {
        match self {
            Self::Start(start) => start.take(),
            Self::Rule(cursor) => cursor.next(exclusions),
        }
    }
}

/// ## Summary
/// A lazy, ascending, duplicate-free stream of occurrences.
///
/// RDATE instants are merged into the rule instants and EXDATE instants are
/// removed. The stream owns its data, so it outlives the component it came
/// from; dropping it part way is always safe.
#[derive(Debug, Clone)]
pub struct OccurrenceStream {
    source: Source,
    pending: Option<Temporal>,
    rdates: Vec<Temporal>,
    rdate_pos: usize,
    exclusions: Exclusions,
    from: Option<NaiveDateTime>,
    last: Option<NaiveDateTime>,
}

impl OccurrenceStream {
    pub(super) fn new(
        start: &Temporal,
        rule: Option<&RRule>,
        mut rdates: Vec<Temporal>,
        exclusions: Exclusions,
        policy: CountPolicy,
        max_empty_periods: u32,
    ) -> Self {
        let source = match rule {
            Some(rule) => Source::Rule(Box::new(RuleCursor::new(
                rule,
                start,
                policy,
                max_empty_periods,
            ))),
            None => Source::Start(Some(start.clone())),
        };
        rdates.sort_by_key(Temporal::instant_key);
        Self {
            source,
            pending: None,
            rdates,
            rdate_pos: 0,
            exclusions,
            from: None,
            last: None,
        }
    }

    /// Drops occurrences before `from`. COUNT still counts from DTSTART.
    pub(super) fn starting_at(mut self, from: &Temporal) -> Self {
        self.from = Some(from.instant_key());
        self
    }
}

impl Iterator for OccurrenceStream {
    type Item = Temporal;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pending.is_none() {
                self.pending = self.source.next(&self.exclusions);
            }
            let rdate = self.rdates.get(self.rdate_pos);
            let take_rdate = match (&self.pending, rdate) {
                (None, None) => return None,
                (None, Some(_)) => true,
                (Some(_), None) => false,
                (Some(rule), Some(rdate)) => rdate.instant_key() < rule.instant_key(),
            };
            let occurrence = if take_rdate {
                self.rdate_pos += 1;
                rdate.cloned()
            } else {
                self.pending.take()
            };
            let Some(occurrence) = occurrence else {
                continue;
            };

            let key = occurrence.instant_key();
            if self.last.is_some_and(|last| key <= last) {
                continue;
            }
            if self.exclusions.excludes(&occurrence) {
                continue;
            }
            if self.from.is_some_and(|from| key < from) {
                continue;
            }
            self.last = Some(key);
            return Some(occurrence);
        }
    }
}

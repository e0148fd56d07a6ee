//! Recurrence sets: DTSTART, RRULE, RDATE and EXDATE taken together.

use kalends_core::constants::DEFAULT_MAX_EMPTY_PERIODS;

use super::stream::{Exclusions, OccurrenceStream};
use crate::error::RfcResult;
use crate::rfc::ical::core::{RRule, Temporal};

/// How EXDATE interacts with COUNT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountPolicy {
    /// COUNT is applied to the rule's instants first, so each matching
    /// EXDATE reduces the number of occurrences delivered.
    #[default]
    IncludeExceptions,
    /// Excluded instants do not count; COUNT occurrences are delivered
    /// unless UNTIL or the empty-period cap ends the rule first.
    ExcludeExceptions,
}

/// ## Summary
/// A complete recurrence set (RFC 5545 §3.8.5).
///
/// The set is the rule's instants at or after DTSTART, truncated by UNTIL
/// and COUNT, plus the RDATE instants, minus the EXDATE instants. Without a
/// rule, DTSTART itself is the only rule instant. Occurrences keep DTSTART's
/// value type and time zone.
#[derive(Debug, Clone)]
pub struct RecurrenceSet {
    start: Temporal,
    rule: Option<RRule>,
    exdates: Vec<Temporal>,
    rdates: Vec<Temporal>,
    policy: CountPolicy,
    max_empty_periods: u32,
}

impl RecurrenceSet {
    /// Creates a set holding only `start`.
    #[must_use]
    pub fn new(start: Temporal) -> Self {
        Self {
            start,
            rule: None,
            exdates: Vec::new(),
            rdates: Vec::new(),
            policy: CountPolicy::default(),
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS,
        }
    }

    /// ## Summary
    /// Sets the recurrence rule.
    ///
    /// ## Errors
    /// Returns `RfcError::RuleError` for an invalid rule and
    /// `RfcError::TypeError` when UNTIL does not fit the start.
    pub fn with_rule(mut self, rule: RRule) -> RfcResult<Self> {
        rule.validate_for_start(&self.start)?;
        self.rule = Some(rule);
        Ok(self)
    }

    /// Adds exception dates.
    #[must_use]
    pub fn with_exdates(mut self, exdates: impl IntoIterator<Item = Temporal>) -> Self {
        self.exdates.extend(exdates);
        self
    }

    /// Adds extra recurrence dates.
    #[must_use]
    pub fn with_rdates(mut self, rdates: impl IntoIterator<Item = Temporal>) -> Self {
        self.rdates.extend(rdates);
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: CountPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets how many consecutive periods without an instant end the stream.
    #[must_use]
    pub const fn with_max_empty_periods(mut self, max: u32) -> Self {
        self.max_empty_periods = max;
        self
    }

    #[must_use]
    pub const fn start(&self) -> &Temporal {
        &self.start
    }

    #[must_use]
    pub const fn rule(&self) -> Option<&RRule> {
        self.rule.as_ref()
    }

    #[must_use]
    pub const fn policy(&self) -> CountPolicy {
        self.policy
    }

    /// Returns a fresh stream over the whole set.
    #[must_use]
    #[tracing::instrument(skip(self), fields(start = %self.start, rule = ?self.rule.as_ref().map(ToString::to_string)))]
    pub fn stream(&self) -> OccurrenceStream {
        tracing::debug!(
            exdates = self.exdates.len(),
            rdates = self.rdates.len(),
            policy = ?self.policy,
            "Starting occurrence stream"
        );
        OccurrenceStream::new(
            &self.start,
            self.rule.as_ref(),
            self.rdates.clone(),
            Exclusions::new(&self.exdates),
            self.policy,
            self.max_empty_periods,
        )
    }

    /// Returns a fresh stream of the occurrences at or after `from`.
    #[must_use]
    pub fn stream_from(&self, from: &Temporal) -> OccurrenceStream {
        self.stream().starting_at(from)
    }

    /// Collects at most `limit` occurrences.
    #[must_use]
    pub fn collect_limited(&self, limit: usize) -> Vec<Temporal> {
        self.stream().take(limit).collect()
    }

    /// Returns whether `instant` is an occurrence of the set.
    #[must_use]
    pub fn contains(&self, instant: &Temporal) -> bool {
        let key = instant.instant_key();
        self.stream()
            .take_while(|occurrence| occurrence.instant_key() <= key)
            .any(|occurrence| occurrence.instant_key() == key)
    }
}

//! iCalendar component types (RFC 5545 §3.4-3.6).

use chrono::Timelike;

use super::{
    DateTime, Duration, HasValue, Property, RRule, Temporal, is_singular, names,
};
use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::build::serialize_component;
use crate::rfc::ical::parse::{Fragment, parse_fragment};
use crate::rfc::ical::recur::{OccurrenceStream, RecurrenceSet};
use crate::rfc::ical::validate::{check_end, check_same_kind};

/// Component kind for iCalendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// VCALENDAR wrapper component.
    Calendar,
    Event,
    Todo,
    Journal,
    FreeBusy,
    Timezone,
    /// VALARM component (nested within VEVENT/VTODO).
    Alarm,
    /// STANDARD sub-component of VTIMEZONE.
    Standard,
    /// DAYLIGHT sub-component of VTIMEZONE.
    Daylight,
    /// IANA or X- component not modelled here.
    Other,
}

impl ComponentKind {
    /// Returns the component name, or `None` for [`ComponentKind::Other`].
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        Some(match self {
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
            Self::Journal => "VJOURNAL",
            Self::FreeBusy => "VFREEBUSY",
            Self::Timezone => "VTIMEZONE",
            Self::Alarm => "VALARM",
            Self::Standard => "STANDARD",
            Self::Daylight => "DAYLIGHT",
            Self::Other => return None,
        })
    }

    /// Parses a component kind from a name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "VCALENDAR" => Self::Calendar,
            "VEVENT" => Self::Event,
            "VTODO" => Self::Todo,
            "VJOURNAL" => Self::Journal,
            "VFREEBUSY" => Self::FreeBusy,
            "VTIMEZONE" => Self::Timezone,
            "VALARM" => Self::Alarm,
            "STANDARD" => Self::Standard,
            "DAYLIGHT" => Self::Daylight,
            _ => Self::Other,
        }
    }

    /// Returns whether this kind carries UID, RECURRENCE-ID and RRULE
    /// (VEVENT, VTODO, VJOURNAL).
    #[must_use]
    pub const fn is_displayable(self) -> bool {
        matches!(self, Self::Event | Self::Todo | Self::Journal)
    }
}

/// An iCalendar component.
///
/// Properties keep declaration order. Sub-components (alarms, timezone
/// rules) are owned directly; top-level components live in a
/// [`Calendar`](super::Calendar).
#[derive(Debug, Clone)]
pub struct Component {
    kind: ComponentKind,
    /// Original component name (preserved for X-components).
    name: String,
    properties: Vec<Property>,
    children: Vec<Component>,
}

macro_rules! text_accessors {
    ($($get:ident, $set:ident => $prop:expr;)*) => {
        $(
            #[must_use]
            pub fn $get(&self) -> Option<&str> {
                self.property($prop).and_then(Property::as_text)
            }

            pub fn $set(&mut self, value: impl Into<String>) {
                self.add_property(Property::text($prop, value));
            }
        )*
    };
}

macro_rules! temporal_getters {
    ($($get:ident => $prop:expr;)*) => {
        $(
            #[must_use]
            pub fn $get(&self) -> Option<Temporal> {
                self.property($prop).and_then(Property::as_temporal)
            }
        )*
    };
}

macro_rules! temporal_list_accessors {
    ($($get:ident, $add:ident => $prop:expr;)*) => {
        $(
            /// Returns every value across all instances of the property, in order.
            #[must_use]
            pub fn $get(&self) -> Vec<Temporal> {
                self.properties_named($prop)
                    .flat_map(|p| p.value().temporals())
                    .collect()
            }

            /// ## Errors
            /// Returns `RfcError::TypeError` if the value's kind differs from DTSTART's.
            pub fn $add(&mut self, value: &Temporal) -> RfcResult<()> {
                if let Some(start) = self.dtstart() {
                    check_same_kind(&start, value, $prop)?;
                }
                self.properties.push(Property::temporal($prop, value));
                Ok(())
            }
        )*
    };
}

impl Component {
    /// Creates an empty component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().to_ascii_uppercase();
        Self {
            kind: ComponentKind::parse(&name),
            name,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// ## Summary
    /// Creates a VEVENT, VTODO or VJOURNAL with a fresh UID and DTSTAMP.
    ///
    /// ## Errors
    /// Returns `RfcError::ValueError` if `kind` is not displayable.
    pub fn new_displayable(kind: ComponentKind) -> RfcResult<Self> {
        let name = match kind.as_str() {
            Some(name) if kind.is_displayable() => name,
            _ => {
                return Err(RfcError::ValueError(format!(
                    "{kind:?} is not a displayable component"
                )));
            }
        };
        let mut component = Self::new(name);
        component.set_uid(uuid::Uuid::new_v4().to_string());
        let now = chrono::Utc::now().naive_utc();
        let now = now.with_nanosecond(0).unwrap_or(now);
        component.set_dtstamp(&Temporal::DateTime(DateTime::utc(now)));
        Ok(component)
    }

    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Returns all properties with the given name, in order.
    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> {
        self.properties
            .iter()
            .filter(move |p| p.name().eq_ignore_ascii_case(name))
    }

    /// Adds a property. A singular property replaces the existing instance
    /// in place; a repeatable one is appended.
    pub fn add_property(&mut self, prop: Property) {
        if is_singular(prop.name())
            && let Some(slot) = self
                .properties
                .iter_mut()
                .find(|p| p.name() == prop.name())
        {
            *slot = prop;
            return;
        }
        self.properties.push(prop);
    }

    /// Appends a property without the singular check, as read from text.
    pub(crate) fn push_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    /// Removes every property with the given name and returns them.
    pub fn remove_properties(&mut self, name: &str) -> Vec<Property> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.properties)
            .into_iter()
            .partition(|p| p.name().eq_ignore_ascii_case(name));
        self.properties = kept;
        removed
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub fn children_of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Self> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    pub fn add_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Detaches the sub-component at `index`.
    pub fn remove_child(&mut self, index: usize) -> Option<Self> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// ## Summary
    /// Parses text and appends it: content lines become properties and a
    /// `BEGIN:` block becomes a sub-component, parsed through its `END:`.
    ///
    /// ## Errors
    /// Returns `RfcError::SyntaxError` for a malformed line or unbalanced
    /// block, or the codec's error for an undecodable value. Nothing is
    /// appended on error.
    pub fn add_content(&mut self, text: &str) -> RfcResult<()> {
        for fragment in parse_fragment(text)? {
            match fragment {
                Fragment::Property(prop) => self.add_property(prop),
                Fragment::Component(child) => self.add_child(child),
            }
        }
        Ok(())
    }

    /// Returns the folded text of this component, CRLF-terminated.
    #[must_use]
    pub fn to_text(&self) -> String {
        serialize_component(self)
    }

    text_accessors! {
        uid, set_uid => names::UID;
        summary, set_summary => names::SUMMARY;
        description, set_description => names::DESCRIPTION;
        location, set_location => names::LOCATION;
        status, set_status => names::STATUS;
        tzid, set_tzid => names::TZID;
    }

    temporal_getters! {
        dtstart => names::DTSTART;
        dtend => names::DTEND;
        due => names::DUE;
        dtstamp => names::DTSTAMP;
        recurrence_id => names::RECURRENCE_ID;
    }

    temporal_list_accessors! {
        exdates, add_exdate => names::EXDATE;
        rdates, add_rdate => names::RDATE;
    }

    #[must_use]
    pub fn sequence(&self) -> Option<i32> {
        self.property(names::SEQUENCE).and_then(Property::as_integer)
    }

    pub fn set_sequence(&mut self, sequence: i32) {
        self.add_property(Property::integer(names::SEQUENCE, sequence));
    }

    #[must_use]
    pub fn organizer(&self) -> Option<&str> {
        self.property(names::ORGANIZER).and_then(Property::as_text)
    }

    pub fn set_organizer(&mut self, address: impl Into<String>) {
        self.add_property(Property::cal_address(names::ORGANIZER, address));
    }

    /// Returns the calendar addresses of all ATTENDEE properties.
    #[must_use]
    pub fn attendees(&self) -> Vec<&str> {
        self.properties_named(names::ATTENDEE)
            .filter_map(Property::as_text)
            .collect()
    }

    pub fn add_attendee(&mut self, address: impl Into<String>) {
        self.add_property(Property::cal_address(names::ATTENDEE, address));
    }

    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.property(names::DURATION)
            .and_then(Property::as_duration)
            .copied()
    }

    /// ## Errors
    /// Returns `RfcError::ValueError` if DTEND or DUE is already set.
    pub fn set_duration(&mut self, duration: Duration) -> RfcResult<()> {
        if let Some(end) = self.property(names::DTEND).or_else(|| self.property(names::DUE)) {
            return Err(RfcError::ValueError(format!(
                "DURATION cannot be combined with {}",
                end.name()
            )));
        }
        self.add_property(Property::duration(names::DURATION, duration));
        Ok(())
    }

    #[must_use]
    pub fn rrule(&self) -> Option<&RRule> {
        self.property(names::RRULE).and_then(Property::as_recur)
    }

    /// ## Summary
    /// Sets the RRULE after checking it against DTSTART.
    ///
    /// ## Errors
    /// Returns `RfcError::RuleError` for an invalid or incompatible rule and
    /// `RfcError::TypeError` when UNTIL's kind conflicts with DTSTART.
    pub fn set_rrule(&mut self, rule: RRule) -> RfcResult<()> {
        match self.dtstart() {
            Some(start) => rule.validate_for_start(&start)?,
            None => rule.validate()?,
        }
        self.add_property(Property::recur(rule));
        Ok(())
    }

    /// ## Summary
    /// Sets DTSTART, checking it against the existing end, recurrence id,
    /// exception dates and rule.
    ///
    /// ## Errors
    /// Returns `RfcError::TypeError` on a temporal-kind mismatch and
    /// `RfcError::ValueError` when DTEND or DUE would precede the new start.
    pub fn set_dtstart(&mut self, start: &Temporal) -> RfcResult<()> {
        for name in [names::DTEND, names::DUE] {
            if let Some(end) = self.property(name).and_then(Property::as_temporal) {
                check_end(start, &end, name)?;
            }
        }
        if let Some(rid) = self.recurrence_id() {
            check_same_kind(start, &rid, names::RECURRENCE_ID)?;
        }
        for (name, values) in [
            (names::EXDATE, self.exdates()),
            (names::RDATE, self.rdates()),
        ] {
            for value in &values {
                check_same_kind(start, value, name)?;
            }
        }
        if let Some(rule) = self.rrule() {
            rule.validate_for_start(start)?;
        }
        self.add_property(Property::temporal(names::DTSTART, start));
        Ok(())
    }

    /// ## Errors
    /// Returns `RfcError::TypeError` if `end`'s kind differs from DTSTART's,
    /// and `RfcError::ValueError` if it precedes DTSTART or DURATION is set.
    pub fn set_dtend(&mut self, end: &Temporal) -> RfcResult<()> {
        self.set_end(names::DTEND, end)
    }

    /// ## Errors
    /// Same as [`Component::set_dtend`].
    pub fn set_due(&mut self, due: &Temporal) -> RfcResult<()> {
        self.set_end(names::DUE, due)
    }

    fn set_end(&mut self, name: &str, end: &Temporal) -> RfcResult<()> {
        if self.property(names::DURATION).is_some() {
            return Err(RfcError::ValueError(format!(
                "{name} cannot be combined with DURATION"
            )));
        }
        if let Some(start) = self.dtstart() {
            check_end(&start, end, name)?;
        }
        self.add_property(Property::temporal(name, end));
        Ok(())
    }

    pub fn set_dtstamp(&mut self, stamp: &Temporal) {
        self.add_property(Property::temporal(names::DTSTAMP, stamp));
    }

    /// ## Errors
    /// Returns `RfcError::TypeError` if the kind differs from DTSTART's.
    pub fn set_recurrence_id(&mut self, rid: &Temporal) -> RfcResult<()> {
        if let Some(start) = self.dtstart() {
            check_same_kind(&start, rid, names::RECURRENCE_ID)?;
        }
        self.add_property(Property::temporal(names::RECURRENCE_ID, rid));
        Ok(())
    }

    /// ## Summary
    /// Gathers DTSTART, RRULE, EXDATE and RDATE into a recurrence set.
    ///
    /// ## Errors
    /// Returns `RfcError::ValueError` without DTSTART, and the rule's
    /// validation error for an invalid RRULE.
    pub fn recurrence_set(&self) -> RfcResult<RecurrenceSet> {
        let start = self.dtstart().ok_or_else(|| {
            RfcError::ValueError(format!("{} has no DTSTART to recur from", self.name))
        })?;
        let mut set = RecurrenceSet::new(start)
            .with_exdates(self.exdates())
            .with_rdates(self.rdates());
        if let Some(rule) = self.rrule() {
            set = set.with_rule(rule.clone())?;
        }
        Ok(set)
    }

    /// ## Summary
    /// Returns a fresh lazy stream of this component's occurrences.
    ///
    /// ## Errors
    /// See [`Component::recurrence_set`].
    pub fn stream_recurrences(&self) -> RfcResult<OccurrenceStream> {
        Ok(self.recurrence_set()?.stream())
    }

    /// ## Summary
    /// Returns the occurrences at or after `from`.
    ///
    /// ## Errors
    /// See [`Component::recurrence_set`].
    pub fn stream_recurrences_from(&self, from: &Temporal) -> RfcResult<OccurrenceStream> {
        Ok(self.recurrence_set()?.stream_from(from))
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.to_text() == other.to_text()
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

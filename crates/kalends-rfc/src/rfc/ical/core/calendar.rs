//! The calendar tree: global properties plus an arena of top-level
//! components indexed by UID.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use kalends_core::config::Settings;
use kalends_core::constants::{
    DEFAULT_COLLECT_LIMIT, DEFAULT_MAX_EMPTY_PERIODS, DEFAULT_PRODID, ICALENDAR_VERSION,
};

use super::{Component, ComponentKind, Property, Temporal, Validate, is_singular, names};
use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::build::Serializer;
use crate::rfc::ical::parse::{Diagnostic, Fragment, parse, parse_fragment};
use crate::rfc::ical::recur::OccurrenceStream;
use crate::rfc::ical::validate::{ValidationError, validate_calendar};

/// Handle to a top-level component of a [`Calendar`].
///
/// Handles are issued in increasing order and never reused; one whose
/// component was removed resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A parsed or constructed `VCALENDAR`.
///
/// Top-level components are keyed by handle, so iteration follows insertion
/// order and a removed component frees its entry. Recurrence families are
/// found through the UID index rather than stored links.
#[derive(Debug, Clone)]
pub struct Calendar {
    properties: Vec<Property>,
    components: BTreeMap<ComponentId, Component>,
    next_id: usize,
    uid_index: HashMap<String, Vec<ComponentId>>,
    diagnostics: Vec<Diagnostic>,
    max_empty_periods: u32,
    collect_limit: usize,
    fold_width: Option<usize>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new()
    }
}

impl Calendar {
    /// Creates a calendar stamped with the default PRODID and VERSION.
    #[must_use]
    pub fn new() -> Self {
        let mut calendar = Self::empty();
        calendar.push_property(Property::text(names::PRODID, DEFAULT_PRODID));
        calendar.push_property(Property::text(names::VERSION, ICALENDAR_VERSION));
        calendar
    }

    /// Creates a calendar stamped and tuned from settings.
    #[must_use]
    pub fn with_settings(settings: &Settings) -> Self {
        let mut calendar = Self::empty();
        calendar.push_property(Property::text(names::PRODID, &settings.calendar.prodid));
        calendar.push_property(Property::text(names::VERSION, &settings.calendar.version));
        calendar.max_empty_periods = settings.recurrence.max_empty_periods;
        calendar.collect_limit = settings.recurrence.collect_limit;
        calendar.fold_width = Some(settings.serializer.fold_width);
        calendar
    }

    pub(crate) fn empty() -> Self {
        Self {
            properties: Vec::new(),
            components: BTreeMap::new(),
            next_id: 0,
            uid_index: HashMap::new(),
            diagnostics: Vec::new(),
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS,
            collect_limit: DEFAULT_COLLECT_LIMIT,
            fold_width: None,
        }
    }

    /// Builds a calendar from a parsed `VCALENDAR` component.
    pub(crate) fn from_root(root: Component, diagnostics: Vec<Diagnostic>) -> Self {
        let mut calendar = Self::empty();
        calendar.properties = root.properties().to_vec();
        for child in root.children() {
            calendar.add_component(child.clone());
        }
        calendar.diagnostics = diagnostics;
        calendar
    }

    // ---- Global properties ----

    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Adds a calendar property; singular ones replace in place.
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

    pub(crate) fn push_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.property(names::METHOD).and_then(Property::as_text)
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.add_property(Property::text(names::METHOD, method));
    }

    #[must_use]
    pub fn prodid(&self) -> Option<&str> {
        self.property(names::PRODID).and_then(Property::as_text)
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.property(names::VERSION).and_then(Property::as_text)
    }

    // ---- Components ----

    /// Adds a top-level component and returns its handle.
    pub fn add_component(&mut self, component: Component) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        if let Some(uid) = component.uid() {
            self.uid_index.entry(uid.to_string()).or_default().push(id);
        }
        self.components.insert(id, component);
        id
    }

    /// ## Summary
    /// Parses text and appends it: property lines become calendar properties
    /// and `BEGIN:`/`END:` blocks become top-level components.
    ///
    /// Returns the handles of the added components, in order.
    ///
    /// ## Errors
    /// Returns `RfcError::SyntaxError` for a malformed line or unbalanced
    /// block, and the codec's error for an undecodable value. Nothing is
    /// added on error.
    pub fn add_content(&mut self, text: &str) -> RfcResult<Vec<ComponentId>> {
        let mut added = Vec::new();
        for fragment in parse_fragment(text)? {
            match fragment {
                Fragment::Property(prop) => self.add_property(prop),
                Fragment::Component(component) => added.push(self.add_component(component)),
            }
        }
        Ok(added)
    }

    /// ## Summary
    /// Detaches a component.
    ///
    /// Removing a recurrence parent leaves its children in place; they show
    /// up in [`Calendar::orphaned_children`].
    pub fn remove_component(&mut self, id: ComponentId) -> Option<Component> {
        let component = self.components.remove(&id)?;
        if let Some(uid) = component.uid() {
            self.unindex(uid, id);
        }
        Some(component)
    }

    /// ## Summary
    /// Puts `component` in the slot of `id`, keeping its position.
    ///
    /// ## Errors
    /// Returns `RfcError::ValueError` if `id` no longer resolves.
    pub fn replace_component(&mut self, id: ComponentId, component: Component) -> RfcResult<Component> {
        let old = self
            .remove_component(id)
            .ok_or_else(|| RfcError::ValueError(format!("component {id} is not in this calendar")))?;
        if let Some(uid) = component.uid() {
            let ids = self.uid_index.entry(uid.to_string()).or_default();
            ids.push(id);
            ids.sort_unstable();
        }
        self.components.insert(id, component);
        Ok(old)
    }

    #[must_use]
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Mutates a component in place, keeping the UID index current.
    pub fn modify<R>(&mut self, id: ComponentId, f: impl FnOnce(&mut Component) -> R) -> Option<R> {
        let component = self.components.get_mut(&id)?;
        let old_uid = component.uid().map(str::to_string);
        let result = f(component);
        let new_uid = component.uid().map(str::to_string);
        if old_uid != new_uid {
            if let Some(uid) = &old_uid {
                self.unindex(uid, id);
            }
            if let Some(uid) = new_uid {
                let ids = self.uid_index.entry(uid).or_default();
                ids.push(id);
                ids.sort_unstable();
            }
        }
        Some(result)
    }

    /// Iterates the top-level components in order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components.iter().map(|(&id, component)| (id, component))
    }

    pub fn components_of_kind(
        &self,
        kind: ComponentKind,
    ) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components().filter(move |(_, c)| c.kind() == kind)
    }

    /// Returns every component carrying `uid`, in order.
    #[must_use]
    pub fn components_by_uid(&self, uid: &str) -> Vec<ComponentId> {
        self.uid_index.get(uid).cloned().unwrap_or_default()
    }

    /// ## Summary
    /// Finds the family member for `uid` with the given RECURRENCE-ID, or the
    /// parent when `rid` is `None`.
    ///
    /// RECURRENCE-IDs match by instant, so a UTC and a zoned reading of the
    /// same moment are the same occurrence.
    #[must_use]
    pub fn find(&self, uid: &str, rid: Option<&Temporal>) -> Option<ComponentId> {
        self.uid_index.get(uid)?.iter().copied().find(|&id| {
            self.get(id).is_some_and(|c| {
                match (c.recurrence_id(), rid) {
                    (None, None) => true,
                    (Some(have), Some(want)) => have.instant_key() == want.instant_key(),
                    _ => false,
                }
            })
        })
    }

    // ---- Recurrence families ----

    /// Returns the parent of a recurrence child; `None` for parents, for
    /// components without UID, and for stale handles.
    #[must_use]
    pub fn recurrence_parent(&self, id: ComponentId) -> Option<ComponentId> {
        let component = self.get(id)?;
        component.recurrence_id()?;
        self.find(component.uid()?, None)
    }

    /// Returns the children of a recurrence parent; empty for anything else.
    #[must_use]
    pub fn recurrence_children(&self, id: ComponentId) -> Vec<ComponentId> {
        let Some(component) = self.get(id) else {
            return Vec::new();
        };
        let Some(uid) = component.uid() else {
            return Vec::new();
        };
        if component.recurrence_id().is_some() {
            return Vec::new();
        }
        self.components_by_uid(uid)
            .into_iter()
            .filter(|&other| {
                other != id
                    && self
                        .get(other)
                        .is_some_and(|c| c.recurrence_id().is_some())
            })
            .collect()
    }

    /// ## Summary
    /// Returns recurrence children that have no parent, or whose parent no
    /// longer produces their RECURRENCE-ID instant.
    #[must_use]
    pub fn orphaned_children(&self) -> Vec<ComponentId> {
        self.components()
            .filter(|(id, c)| self.is_orphan(*id, c))
            .map(|(id, _)| id)
            .collect()
    }

    fn is_orphan(&self, id: ComponentId, component: &Component) -> bool {
        let Some(rid) = component.recurrence_id() else {
            return false;
        };
        let Some(parent) = self.recurrence_parent(id).and_then(|p| self.get(p)) else {
            return true;
        };
        match parent.recurrence_set() {
            Ok(set) => !set
                .with_max_empty_periods(self.max_empty_periods)
                .contains(&rid),
            Err(e) => {
                tracing::debug!(error = %e, uid = ?component.uid(), "Parent has no usable recurrence set");
                true
            }
        }
    }

    /// Removes orphaned children, optionally only those with the given UID,
    /// and returns them.
    pub fn purge_orphans(&mut self, uid: Option<&str>) -> Vec<Component> {
        let orphans: Vec<_> = self
            .orphaned_children()
            .into_iter()
            .filter(|&id| uid.is_none_or(|uid| self.get(id).and_then(Component::uid) == Some(uid)))
            .collect();
        orphans
            .into_iter()
            .filter_map(|id| self.remove_component(id))
            .collect()
    }

    /// ## Summary
    /// Streams the occurrences of a component, optionally from a lower bound.
    ///
    /// ## Errors
    /// Returns `RfcError::ValueError` for a stale handle or a component
    /// without DTSTART, and the rule's error for an invalid RRULE.
    pub fn stream_recurrences(
        &self,
        id: ComponentId,
        from: Option<&Temporal>,
    ) -> RfcResult<OccurrenceStream> {
        let component = self
            .get(id)
            .ok_or_else(|| RfcError::ValueError(format!("component {id} is not in this calendar")))?;
        let set = component
            .recurrence_set()?
            .with_max_empty_periods(self.max_empty_periods);
        Ok(match from {
            Some(from) => set.stream_from(from),
            None => set.stream(),
        })
    }

    /// ## Summary
    /// Collects the occurrences of a component, stopping at the calendar's
    /// collect limit for unbounded rules.
    ///
    /// ## Errors
    /// As for [`Calendar::stream_recurrences`].
    pub fn recurrences(&self, id: ComponentId) -> RfcResult<Vec<Temporal>> {
        let occurrences: Vec<_> = self
            .stream_recurrences(id, None)?
            .take(self.collect_limit)
            .collect();
        if occurrences.len() == self.collect_limit {
            tracing::debug!(%id, limit = self.collect_limit, "Occurrence collection truncated");
        }
        Ok(occurrences)
    }

    // ---- Time zones ----

    pub fn timezones(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components_of_kind(ComponentKind::Timezone)
    }

    /// Returns the VTIMEZONE defining `tzid`.
    #[must_use]
    pub fn timezone(&self, tzid: &str) -> Option<ComponentId> {
        self.timezones()
            .find(|(_, tz)| tz.tzid() == Some(tzid))
            .map(|(id, _)| id)
    }

    // ---- Diagnostics and output ----

    /// Returns the non-fatal problems recorded while parsing.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns every validation failure; never fails itself.
    #[must_use]
    pub fn errors(&self) -> Vec<ValidationError> {
        self.validation_errors()
    }

    /// Serializes the calendar, CRLF-terminated and folded.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.fold_width
            .map_or_else(Serializer::default, Serializer::new)
            .serialize(self)
    }

    fn unindex(&mut self, uid: &str, id: ComponentId) {
        if let Some(ids) = self.uid_index.get_mut(uid) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.uid_index.remove(uid);
            }
        }
    }
}

impl Validate for Calendar {
    fn validation_errors(&self) -> Vec<ValidationError> {
        validate_calendar(self)
    }
}

impl PartialEq for Calendar {
    fn eq(&self, other: &Self) -> bool {
        self.to_text() == other.to_text()
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Calendar {
    type Err = RfcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::core::{DateTime, Frequency, RRule};
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Temporal {
        Temporal::DateTime(DateTime::floating(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        ))
    }

    fn event(uid: &str, start: &Temporal) -> Component {
        let mut event = Component::new("VEVENT");
        event.set_uid(uid);
        event.set_dtstart(start).unwrap();
        event
    }

    fn child(uid: &str, start: &Temporal, rid: &Temporal) -> Component {
        let mut child = event(uid, start);
        child.set_recurrence_id(rid).unwrap();
        child
    }

    fn daily_family() -> (Calendar, ComponentId, ComponentId) {
        let mut calendar = Calendar::new();
        let mut parent = event("fam", &at(2016, 5, 1, 10));
        parent
            .set_rrule(RRule::new(Frequency::Daily).with_count(5))
            .unwrap();
        let parent = calendar.add_component(parent);
        let child = calendar.add_component(child("fam", &at(2016, 5, 3, 12), &at(2016, 5, 3, 10)));
        (calendar, parent, child)
    }

    #[test_log::test]
    fn new_calendar_is_stamped() {
        let calendar = Calendar::new();
        assert_eq!(calendar.version(), Some("2.0"));
        assert_eq!(calendar.prodid(), Some(DEFAULT_PRODID));
        assert_eq!(calendar.components().count(), 0);
        assert!(calendar.is_valid());
    }

    #[test_log::test]
    fn settings_override_stamp() {
        let mut settings = Settings::default();
        settings.calendar.prodid = "-//Example//Test//EN".into();
        let calendar = Calendar::with_settings(&settings);
        assert_eq!(calendar.prodid(), Some("-//Example//Test//EN"));
    }

    #[test_log::test]
    fn collect_limit_bounds_unbounded_rules() {
        let mut settings = Settings::default();
        settings.recurrence.collect_limit = 3;
        let mut calendar = Calendar::with_settings(&settings);
        let mut forever = event("forever", &at(2016, 5, 1, 10));
        forever.set_rrule(RRule::new(Frequency::Daily)).unwrap();
        let id = calendar.add_component(forever);
        assert_eq!(
            calendar.recurrences(id).unwrap(),
            vec![at(2016, 5, 1, 10), at(2016, 5, 2, 10), at(2016, 5, 3, 10)]
        );

        let (calendar, parent, _) = daily_family();
        assert_eq!(calendar.recurrences(parent).unwrap().len(), 5);
    }

    #[test_log::test]
    fn family_lookup() {
        let (calendar, parent, child) = daily_family();
        assert_eq!(calendar.recurrence_parent(child), Some(parent));
        assert_eq!(calendar.recurrence_parent(parent), None);
        assert_eq!(calendar.recurrence_children(parent), vec![child]);
        assert!(calendar.recurrence_children(child).is_empty());
        assert_eq!(calendar.find("fam", None), Some(parent));
        assert_eq!(calendar.find("fam", Some(&at(2016, 5, 3, 10))), Some(child));
        assert_eq!(calendar.find("fam", Some(&at(2016, 5, 4, 10))), None);
        assert!(calendar.orphaned_children().is_empty());
    }

    #[test_log::test]
    fn removing_parent_orphans_children() {
        let (mut calendar, parent, child) = daily_family();
        assert!(calendar.remove_component(parent).is_some());
        assert!(calendar.get(parent).is_none());
        assert!(calendar.recurrence_children(parent).is_empty());
        assert_eq!(calendar.orphaned_children(), vec![child]);

        let purged = calendar.purge_orphans(Some("other"));
        assert!(purged.is_empty());
        let purged = calendar.purge_orphans(Some("fam"));
        assert_eq!(purged.len(), 1);
        assert_eq!(calendar.components().count(), 0);
    }

    #[test_log::test]
    fn churn_does_not_grow_storage() {
        let (mut calendar, parent, first) = daily_family();
        let rid = at(2016, 5, 3, 10);
        let mut latest = first;
        for hour in 11..23 {
            assert!(calendar.remove_component(latest).is_some());
            latest = calendar.add_component(child("fam", &at(2016, 5, 3, hour), &rid));
        }
        assert_eq!(calendar.components.len(), 2);
        assert!(calendar.get(first).is_none());
        assert_ne!(latest, first);
        assert_eq!(calendar.recurrence_children(parent), vec![latest]);

        let replacement = event("fam", &at(2016, 5, 1, 8));
        calendar.replace_component(parent, replacement).unwrap();
        assert_eq!(calendar.components.len(), 2);
        let order: Vec<_> = calendar.components().map(|(id, _)| id).collect();
        assert_eq!(order, vec![parent, latest]);
    }

    #[test_log::test]
    fn child_outside_new_rule_is_orphaned() {
        let (mut calendar, parent, child) = daily_family();
        calendar
            .modify(parent, |p| {
                p.set_rrule(
                    RRule::new(Frequency::Daily)
                        .with_count(5)
                        .with_interval(4),
                )
            })
            .unwrap()
            .unwrap();
        assert_eq!(calendar.orphaned_children(), vec![child]);
    }

    #[test_log::test]
    fn modify_reindexes_uid() {
        let (mut calendar, parent, _) = daily_family();
        calendar.modify(parent, |p| p.set_uid("renamed"));
        assert_eq!(calendar.components_by_uid("renamed"), vec![parent]);
        assert_eq!(calendar.find("fam", None), None);
    }

    #[test_log::test]
    fn replace_keeps_position() {
        let (mut calendar, parent, child) = daily_family();
        let mut replacement = event("fam", &at(2016, 5, 1, 10));
        replacement.set_summary("new");
        let old = calendar.replace_component(parent, replacement).unwrap();
        assert!(old.summary().is_none());
        let order: Vec<_> = calendar.components().map(|(id, _)| id).collect();
        assert_eq!(order, vec![parent, child]);
        assert_eq!(calendar.components_by_uid("fam"), vec![parent, child]);
    }

    #[test_log::test]
    fn add_content_appends_components() {
        let mut calendar = Calendar::new();
        let added = calendar
            .add_content("METHOD:PUBLISH\r\nBEGIN:VTODO\r\nUID:t1\r\nEND:VTODO\r\n")
            .unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(calendar.method(), Some("PUBLISH"));
        assert_eq!(calendar.components_by_uid("t1"), added);
        assert!(calendar.add_content("BEGIN:VTODO\r\n").is_err());
    }

    #[test_log::test]
    fn stream_through_handle() {
        let (calendar, parent, _) = daily_family();
        let starts: Vec<_> = calendar
            .stream_recurrences(parent, Some(&at(2016, 5, 3, 0)))
            .unwrap()
            .collect();
        assert_eq!(starts, vec![at(2016, 5, 3, 10), at(2016, 5, 4, 10), at(2016, 5, 5, 10)]);

        let mut calendar = calendar;
        calendar.remove_component(parent);
        assert!(calendar.stream_recurrences(parent, None).is_err());
    }

    #[test_log::test]
    fn timezone_lookup() {
        let mut calendar = Calendar::new();
        let mut tz = Component::new("VTIMEZONE");
        tz.set_tzid("Europe/Berlin");
        let id = calendar.add_component(tz);
        assert_eq!(calendar.timezone("Europe/Berlin"), Some(id));
        assert_eq!(calendar.timezone("Europe/Paris"), None);
    }

    #[test_log::test]
    fn text_round_trip_and_equality() {
        let (calendar, _, _) = daily_family();
        let text = calendar.to_text();
        let reparsed: Calendar = text.parse().unwrap();
        assert_eq!(reparsed, calendar);
        assert_eq!(reparsed.to_text(), text);
    }
}

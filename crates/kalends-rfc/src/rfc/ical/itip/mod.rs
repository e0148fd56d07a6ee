//! iTIP scheduling messages (RFC 5546) merged into a main calendar.
//!
//! Each supported METHOD has a [`MessageProcessor`]; [`apply_schedule_message`]
//! dispatches on the incoming calendar's METHOD and commits the result only
//! when the whole message applies.

mod publish;
mod request;

use std::fmt;

pub use publish::PublishProcessor;
pub use request::RequestProcessor;

use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::core::{Calendar, Component, ComponentKind};
use crate::rfc::ical::parse::parse;

/// Scheduling methods this crate processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Publish,
    Request,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "PUBLISH",
            Self::Request => "REQUEST",
        }
    }

    /// Parses a METHOD value (case-insensitive); other iTIP methods are `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PUBLISH" => Some(Self::Publish),
            "REQUEST" => Some(Self::Request),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies one kind of scheduling message.
pub trait MessageProcessor: Sync {
    fn method(&self) -> Method;

    /// ## Summary
    /// Merges `incoming` into `main` and returns the outcome notices.
    ///
    /// ## Errors
    /// Implementations may leave `main` partly modified on error;
    /// [`apply_message`] discards such a working copy.
    fn process(&self, main: &mut Calendar, incoming: &Calendar) -> RfcResult<Vec<String>>;
}

/// Returns the processor for a method.
#[must_use]
pub fn processor_for(method: Method) -> &'static dyn MessageProcessor {
    match method {
        Method::Publish => &PublishProcessor,
        Method::Request => &RequestProcessor,
    }
}

/// ## Summary
/// Parses a scheduling message and merges it into `main`.
///
/// ## Errors
/// Returns `RfcError::SyntaxError` if the message does not parse, and any
/// error of [`apply_message`].
#[tracing::instrument(skip_all, fields(input_len = text.len()))]
pub fn apply_schedule_message(main: &mut Calendar, text: &str) -> RfcResult<Vec<String>> {
    let incoming = parse(text)?;
    apply_message(main, &incoming)
}

/// ## Summary
/// Merges an already parsed scheduling message into `main`.
///
/// The message is applied to a copy of `main` that replaces it only on
/// success, so a rejected message leaves `main` untouched.
///
/// ## Errors
/// - `RfcError::UnsupportedError` for a missing METHOD, a method other than
///   PUBLISH or REQUEST, or a REQUEST carrying attendees
/// - `RfcError::ValueError` for a component without UID, or a REQUEST for a
///   UID `main` does not hold
/// - `RfcError::SequenceError` when a component does not supersede the one
///   it would replace
pub fn apply_message(main: &mut Calendar, incoming: &Calendar) -> RfcResult<Vec<String>> {
    let method_text = incoming.method().ok_or_else(|| {
        RfcError::UnsupportedError("scheduling message has no METHOD".into())
    })?;
    let method = Method::parse(method_text).ok_or_else(|| {
        RfcError::UnsupportedError(format!("METHOD:{method_text} is not implemented"))
    })?;
    tracing::debug!(%method, components = incoming.components().count(), "Applying scheduling message");

    let mut working = main.clone();
    let notices = match processor_for(method).process(&mut working, incoming) {
        Ok(notices) => notices,
        Err(e) => {
            tracing::warn!(%method, error = %e, "Scheduling message rejected");
            return Err(e);
        }
    };
    *main = working;

    for notice in &notices {
        if notice.starts_with("SUCCESS") {
            tracing::info!(%method, "{notice}");
        } else {
            tracing::warn!(%method, "{notice}");
        }
    }
    Ok(notices)
}

/// ## Summary
/// The replacement rule shared by PUBLISH and REQUEST.
///
/// An incoming component must carry a higher SEQUENCE than the one it
/// replaces; two components that both lack a revision (0 and 0) are also
/// accepted.
///
/// ## Errors
/// Returns `RfcError::SequenceError` otherwise.
pub(crate) fn check_sequence(incoming: &Component, existing: &Component) -> RfcResult<()> {
    let new = incoming.sequence().unwrap_or(0);
    let old = existing.sequence().unwrap_or(0);
    if new > old || (new == 0 && old == 0) {
        Ok(())
    } else {
        Err(RfcError::SequenceError { new, old })
    }
}

/// ## Summary
/// Adds or replaces each displayable component of `incoming`, merges time
/// zones, and purges children orphaned by a replaced parent.
///
/// `warn` adds the notices a PUBLISH reports for ORGANIZER and ATTENDEE.
pub(crate) fn merge(
    main: &mut Calendar,
    incoming: &Calendar,
    warn: bool,
) -> RfcResult<Vec<String>> {
    let mut notices = Vec::new();
    let mut replaced_parents: Vec<String> = Vec::new();

    for (_, component) in incoming.components() {
        let name = component.name();
        match component.kind() {
            ComponentKind::Timezone => {
                let tzid = component.tzid().ok_or_else(|| {
                    RfcError::ValueError("VTIMEZONE in scheduling message has no TZID".into())
                })?;
                match main.timezone(tzid) {
                    Some(id) => {
                        main.replace_component(id, component.clone())?;
                    }
                    None => {
                        main.add_component(component.clone());
                    }
                }
                notices.push(format!("SUCCESS: merged VTIMEZONE {tzid}"));
            }
            kind if kind.is_displayable() => {
                let uid = component.uid().ok_or_else(|| {
                    RfcError::ValueError(format!("{name} in scheduling message has no UID"))
                })?;
                if warn {
                    if component.organizer().is_none() {
                        notices.push(format!(
                            "WARNING: ORGANIZER is missing in published {name} with UID:{uid}"
                        ));
                    }
                    if !component.attendees().is_empty() {
                        notices.push(format!(
                            "WARNING: ATTENDEE is not allowed in published {name} with UID:{uid}"
                        ));
                    }
                }

                let rid = component.recurrence_id();
                match main.find(uid, rid.as_ref()) {
                    Some(id) => {
                        if let Some(existing) = main.get(id) {
                            check_sequence(component, existing)?;
                        }
                        main.replace_component(id, component.clone())?;
                        if rid.is_none() {
                            replaced_parents.push(uid.to_string());
                        }
                        notices.push(format!("SUCCESS: replaced {name} with UID:{uid}"));
                    }
                    None => {
                        main.add_component(component.clone());
                        notices.push(format!("SUCCESS: added {name} with UID:{uid}"));
                    }
                }
            }
            _ => notices.push(format!("IGNORED: {name} is not processable")),
        }
    }

    for uid in &replaced_parents {
        for orphan in main.purge_orphans(Some(uid)) {
            let rid = orphan
                .recurrence_id()
                .map(|rid| rid.to_string())
                .unwrap_or_default();
            notices.push(format!("PURGED: orphaned child {uid} RECURRENCE-ID:{rid}"));
        }
    }

    Ok(notices)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:evt-1\r\n\
DTSTAMP:20160101T000000Z\r\n\
DTSTART:20160207T100000\r\n\
SUMMARY:Original\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn message(method: &str, body: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\nMETHOD:{method}\r\n{body}END:VCALENDAR\r\n"
        )
    }

    #[test_log::test]
    fn method_dispatch() {
        assert_eq!(Method::parse("publish"), Some(Method::Publish));
        assert_eq!(Method::parse("CANCEL"), None);
        assert_eq!(processor_for(Method::Request).method(), Method::Request);

        let mut main = parse(MAIN).unwrap();
        let err = apply_schedule_message(&mut main, &message("CANCEL", "")).unwrap_err();
        assert!(matches!(err, RfcError::UnsupportedError(_)));

        let no_method = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
        let err = apply_schedule_message(&mut main, no_method).unwrap_err();
        assert!(matches!(err, RfcError::UnsupportedError(_)));
    }

    #[test_log::test]
    fn sequence_rule() {
        let mut existing = Component::new("VEVENT");
        let mut incoming = Component::new("VEVENT");
        assert!(check_sequence(&incoming, &existing).is_ok());

        existing.set_sequence(1);
        assert!(matches!(
            check_sequence(&incoming, &existing),
            Err(RfcError::SequenceError { new: 0, old: 1 })
        ));
        incoming.set_sequence(1);
        assert!(check_sequence(&incoming, &existing).is_err());
        incoming.set_sequence(2);
        assert!(check_sequence(&incoming, &existing).is_ok());
    }

    #[test_log::test]
    fn rejected_message_leaves_main_untouched() {
        let mut main = parse(MAIN).unwrap();
        let before = main.to_text();
        // The second component fails after the first would have been added
        let body = "BEGIN:VEVENT\r\nUID:new-1\r\nDTSTART:20160301T100000\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nDTSTART:20160302T100000\r\nEND:VEVENT\r\n";
        let err = apply_schedule_message(&mut main, &message("PUBLISH", body)).unwrap_err();
        assert!(matches!(err, RfcError::ValueError(_)));
        assert_eq!(main.to_text(), before);
    }
}

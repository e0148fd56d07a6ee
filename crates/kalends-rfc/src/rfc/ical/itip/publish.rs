//! METHOD:PUBLISH.

use super::{Method, MessageProcessor, merge};
use crate::error::RfcResult;
use crate::rfc::ical::core::Calendar;

/// ## Summary
/// Unsolicited publication of components.
///
/// Components are added, or replace the component with the same UID and
/// RECURRENCE-ID when their SEQUENCE supersedes it. A missing ORGANIZER or
/// a present ATTENDEE only produces a warning notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishProcessor;

impl MessageProcessor for PublishProcessor {
    fn method(&self) -> Method {
        Method::Publish
    }

    fn process(&self, main: &mut Calendar, incoming: &Calendar) -> RfcResult<Vec<String>> {
        merge(main, incoming, true)
    }
}

#[cfg(test)]
mod tests {
    use super::super::apply_schedule_message;
    use crate::error::RfcError;
    use crate::rfc::ical::core::ComponentKind;
    use crate::rfc::ical::parse::parse;

    const MAIN: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:weekly\r\n\
DTSTAMP:20160101T000000Z\r\n\
DTSTART:20160104T100000\r\n\
RRULE:FREQ=WEEKLY;COUNT=4\r\n\
SUMMARY:Standup\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:weekly\r\n\
DTSTAMP:20160101T000000Z\r\n\
RECURRENCE-ID:20160111T100000\r\n\
DTSTART:20160111T110000\r\n\
SUMMARY:Standup moved\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn publish(body: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Other//EN\r\nMETHOD:PUBLISH\r\n{body}END:VCALENDAR\r\n"
        )
    }

    #[test_log::test]
    fn adds_new_component_with_warnings() {
        let mut main = parse(MAIN).unwrap();
        let body = "BEGIN:VEVENT\r\nUID:party\r\nDTSTART:20160301T200000\r\nATTENDEE:mailto:a@example.com\r\nEND:VEVENT\r\n";
        let notices = apply_schedule_message(&mut main, &publish(body)).unwrap();
        assert_eq!(
            notices,
            vec![
                "WARNING: ORGANIZER is missing in published VEVENT with UID:party".to_string(),
                "WARNING: ATTENDEE is not allowed in published VEVENT with UID:party".to_string(),
                "SUCCESS: added VEVENT with UID:party".to_string(),
            ]
        );
        assert_eq!(main.components_by_uid("party").len(), 1);
    }

    #[test_log::test]
    fn replaces_only_with_higher_sequence() {
        let mut main = parse(MAIN).unwrap();
        let body = "BEGIN:VEVENT\r\nUID:weekly\r\nORGANIZER:mailto:o@example.com\r\n\
DTSTART:20160104T100000\r\nRRULE:FREQ=WEEKLY;COUNT=4\r\nSEQUENCE:1\r\nSUMMARY:Renamed\r\nEND:VEVENT\r\n";
        let notices = apply_schedule_message(&mut main, &publish(body)).unwrap();
        assert_eq!(notices, vec!["SUCCESS: replaced VEVENT with UID:weekly".to_string()]);
        let parent = main.find("weekly", None).unwrap();
        assert_eq!(main.get(parent).unwrap().summary(), Some("Renamed"));
        // Same rule, so the moved occurrence keeps its parent
        assert_eq!(main.components_by_uid("weekly").len(), 2);

        let stale = body.replace("SEQUENCE:1", "SEQUENCE:0");
        let before = main.to_text();
        let err = apply_schedule_message(&mut main, &publish(&stale)).unwrap_err();
        assert!(matches!(err, RfcError::SequenceError { new: 0, old: 1 }));
        assert_eq!(main.to_text(), before);
    }

    #[test_log::test]
    fn replaced_parent_purges_orphans() {
        let mut main = parse(MAIN).unwrap();
        // Moving the series to Tuesdays leaves the Monday override orphaned
        let body = "BEGIN:VEVENT\r\nUID:weekly\r\nORGANIZER:mailto:o@example.com\r\n\
DTSTART:20160105T100000\r\nRRULE:FREQ=WEEKLY;COUNT=4\r\nSEQUENCE:1\r\nEND:VEVENT\r\n";
        let notices = apply_schedule_message(&mut main, &publish(body)).unwrap();
        assert_eq!(
            notices,
            vec![
                "SUCCESS: replaced VEVENT with UID:weekly".to_string(),
                "PURGED: orphaned child weekly RECURRENCE-ID:20160111T100000".to_string(),
            ]
        );
        assert_eq!(main.components_by_uid("weekly").len(), 1);
    }

    #[test_log::test]
    fn merges_timezones_and_ignores_the_rest() {
        let mut main = parse(MAIN).unwrap();
        let body = "BEGIN:VTIMEZONE\r\nTZID:Custom/Zone\r\nBEGIN:STANDARD\r\n\
DTSTART:19700101T000000\r\nTZOFFSETFROM:+0100\r\nTZOFFSETTO:+0100\r\nEND:STANDARD\r\nEND:VTIMEZONE\r\n\
BEGIN:X-THING\r\nX-FOO:bar\r\nEND:X-THING\r\n";
        let notices = apply_schedule_message(&mut main, &publish(body)).unwrap();
        assert_eq!(
            notices,
            vec![
                "SUCCESS: merged VTIMEZONE Custom/Zone".to_string(),
                "IGNORED: X-THING is not processable".to_string(),
            ]
        );
        assert!(main.timezone("Custom/Zone").is_some());
        assert_eq!(main.components_of_kind(ComponentKind::Timezone).count(), 1);

        // A second publication of the same zone replaces it in place
        apply_schedule_message(&mut main, &publish(body)).unwrap();
        assert_eq!(main.components_of_kind(ComponentKind::Timezone).count(), 1);
    }
}

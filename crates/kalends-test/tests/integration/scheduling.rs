use kalends_rfc::error::RfcError;
use kalends_rfc::rfc::ical::{apply_schedule_message, parse};
use kalends_test::{wrap_calendar, wrap_message};

fn event(uid: &str, sequence: u32, summary: &str) -> String {
    format!(
        "BEGIN:VEVENT\r\nUID:{uid}\r\nORGANIZER:mailto:org@example.com\r\n\
DTSTAMP:20160101T000000Z\r\nDTSTART:20160301T100000\r\nSEQUENCE:{sequence}\r\n\
SUMMARY:{summary}\r\nEND:VEVENT\r\n"
    )
}

#[test_log::test]
fn sequence_zero_then_one_replaces() {
    let mut main = parse(&wrap_calendar(&event("review", 0, "Draft"))).unwrap();

    let notices =
        apply_schedule_message(&mut main, &wrap_message("PUBLISH", &event("review", 1, "Final")))
            .unwrap();
    assert_eq!(notices, vec!["SUCCESS: replaced VEVENT with UID:review".to_string()]);

    let id = main.find("review", None).unwrap();
    assert_eq!(main.get(id).unwrap().summary(), Some("Final"));
    assert_eq!(main.components_by_uid("review").len(), 1);
}

#[test_log::test]
fn sequence_one_then_zero_fails_without_mutation() {
    let mut main = parse(&wrap_calendar(&event("review", 1, "Final"))).unwrap();
    let before = main.to_text();

    let err =
        apply_schedule_message(&mut main, &wrap_message("PUBLISH", &event("review", 0, "Draft")))
            .unwrap_err();
    assert!(matches!(err, RfcError::SequenceError { new: 0, old: 1 }));
    assert_eq!(main.to_text(), before);
}

#[test_log::test]
fn unrevised_components_replace_each_other() {
    let mut main = parse(&wrap_calendar(&event("note", 0, "One"))).unwrap();
    apply_schedule_message(&mut main, &wrap_message("PUBLISH", &event("note", 0, "Two")))
        .unwrap();
    let id = main.find("note", None).unwrap();
    assert_eq!(main.get(id).unwrap().summary(), Some("Two"));
}

#[test_log::test]
fn request_updates_existing_components_only() {
    let mut main = parse(&wrap_calendar(&event("sync", 0, "Sync"))).unwrap();

    let notices =
        apply_schedule_message(&mut main, &wrap_message("REQUEST", &event("sync", 2, "Sync v2")))
            .unwrap();
    assert_eq!(notices, vec!["SUCCESS: replaced VEVENT with UID:sync".to_string()]);

    let err =
        apply_schedule_message(&mut main, &wrap_message("REQUEST", &event("other", 1, "Other")))
            .unwrap_err();
    assert!(matches!(err, RfcError::ValueError(_)));

    let with_attendee = event("sync", 3, "Sync v3").replace(
        "END:VEVENT",
        "ATTENDEE:mailto:someone@example.com\r\nEND:VEVENT",
    );
    let err = apply_schedule_message(&mut main, &wrap_message("REQUEST", &with_attendee))
        .unwrap_err();
    assert!(matches!(err, RfcError::UnsupportedError(_)));

    let id = main.find("sync", None).unwrap();
    assert_eq!(main.get(id).unwrap().sequence(), Some(2));
}

#[test_log::test]
fn other_methods_are_unsupported() {
    let mut main = parse(&wrap_calendar("")).unwrap();
    for method in ["CANCEL", "REPLY", "COUNTER"] {
        let err = apply_schedule_message(&mut main, &wrap_message(method, &event("x", 0, "x")))
            .unwrap_err();
        assert!(matches!(err, RfcError::UnsupportedError(_)), "{method} accepted");
    }
    assert_eq!(main.components().count(), 0);
}

#[test_log::test]
fn malformed_message_is_a_syntax_error() {
    let mut main = parse(&wrap_calendar("")).unwrap();
    let err = apply_schedule_message(
        &mut main,
        "BEGIN:VCALENDAR\r\nMETHOD:PUBLISH\r\nBEGIN:VEVENT\r\nUID:x\r\nEND:VCALENDAR\r\n",
    )
    .unwrap_err();
    assert!(matches!(err, RfcError::SyntaxError(_)));
}

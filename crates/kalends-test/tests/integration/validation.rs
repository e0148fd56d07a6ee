use kalends_rfc::error::RfcError;
use kalends_rfc::rfc::ical::core::{Temporal, Validate};
use kalends_rfc::rfc::ical::parse;
use kalends_test::{event_calendar, wrap_calendar};

#[test_log::test]
fn end_kind_mismatch_names_both_values() {
    let calendar = event_calendar(
        "mismatch",
        "DTSTART;VALUE=DATE:20160301\nDTEND:20160302T100000",
    )
    .unwrap();
    assert!(!calendar.is_valid());

    let errors = calendar.errors();
    assert_eq!(errors.len(), 1);
    let error = &errors[0];
    assert_eq!(error.component, "VEVENT UID:mismatch");
    assert_eq!(error.property.as_deref(), Some("DTEND"));
    assert!(error.message.contains("20160302T100000"), "{error}");
    assert!(error.message.contains("20160301"), "{error}");
    assert_eq!(
        error.to_string(),
        "VEVENT UID:mismatch DTEND: DTEND value 20160302T100000 (DATE-TIME (floating)) must have \
the same value type as DTSTART value 20160301 (DATE)"
    );
}

#[test_log::test]
fn end_before_start_is_a_separate_message() {
    let calendar = event_calendar(
        "backwards",
        "DTSTART:20160301T100000\nDTEND:20160301T090000",
    )
    .unwrap();
    let errors = calendar.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "DTEND value 20160301T090000 must not precede DTSTART value 20160301T100000"
    );
}

#[test_log::test]
fn setters_fail_fast_and_leave_state() {
    let calendar = event_calendar("setter", "DTSTART:20160301T100000").unwrap();
    let (_, event) = calendar.components().next().unwrap();
    let mut event = event.clone();
    let before = event.to_text();

    let date = Temporal::Date(chrono::NaiveDate::from_ymd_opt(2016, 3, 2).unwrap());
    let err = event.set_dtend(&date).unwrap_err();
    assert!(matches!(err, RfcError::TypeError(_)));
    assert_eq!(event.to_text(), before);
    assert!(event.is_valid());
}

#[test_log::test]
fn many_problems_are_collected_together() {
    let text = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
UID:a\r\n\
DTSTART;VALUE=DATE:20160301\r\n\
DURATION:PT1H\r\n\
DTEND;VALUE=DATE:20160302\r\n\
EXDATE:20160305T100000\r\n\
RRULE:FREQ=WEEKLY;BYMONTHDAY=1\r\n\
SUMMARY:one\r\n\
SUMMARY:two\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
    let calendar = parse(text).unwrap();
    let properties: Vec<Option<String>> = calendar
        .errors()
        .into_iter()
        .map(|e| e.property)
        .collect();
    for expected in ["VERSION", "PRODID", "SUMMARY", "DTEND", "EXDATE", "RRULE", "DURATION"] {
        assert!(
            properties.contains(&Some(expected.to_string())),
            "no {expected} error in {properties:?}"
        );
    }
}

#[test_log::test]
fn child_recurrence_id_must_match_parent_start() {
    let body = "BEGIN:VEVENT\r\nUID:fam\r\nDTSTART:20160301T100000\r\nRRULE:FREQ=DAILY\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:fam\r\nRECURRENCE-ID;VALUE=DATE:20160302\r\nSUMMARY:moved\r\nEND:VEVENT\r\n";
    let calendar = parse(&wrap_calendar(body)).unwrap();
    let errors = calendar.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].property.as_deref(), Some("RECURRENCE-ID"));
}

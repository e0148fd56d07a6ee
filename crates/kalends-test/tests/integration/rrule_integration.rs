use kalends_rfc::rfc::ical::CountPolicy;
use kalends_rfc::rfc::ical::core::RRule;
use kalends_test::event_calendar;

include!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/rrule_cases_data/mod.rs"));

/// ## Summary
/// Integration-level validation for recurrence behavior using shared cases.
#[test_log::test]
fn rrule_cases_integration() {
    for case in rrule_cases() {
        assert_case(&case);
    }
}

#[test_log::test]
fn count_policies_on_the_same_event() {
    let calendar = event_calendar(
        "policy",
        "DTSTART:20151109T100000\nRRULE:FREQ=DAILY;INTERVAL=3;COUNT=6\nEXDATE:20151112T100000\nEXDATE:20151115T100000",
    )
    .unwrap();
    let (_, event) = calendar.components().next().unwrap();
    let set = event.recurrence_set().unwrap();

    assert_eq!(set.policy(), CountPolicy::IncludeExceptions);
    assert_eq!(set.collect_limited(100).len(), 4);

    let excluded = set.with_policy(CountPolicy::ExcludeExceptions);
    let days: Vec<u32> = excluded
        .collect_limited(100)
        .iter()
        .map(|t| chrono::Datelike::day(&t.date()))
        .collect();
    assert_eq!(days, vec![9, 18, 21, 24, 27, 30]);
}

#[test_log::test]
fn unbounded_stream_is_lazy_and_outlives_the_calendar() {
    let mut stream = {
        let calendar =
            event_calendar("forever", "DTSTART:20160101T080000\nRRULE:FREQ=MINUTELY").unwrap();
        let (id, _) = calendar.components().next().unwrap();
        calendar.stream_recurrences(id, None).unwrap()
    };
    let first: Vec<Temporal> = stream.by_ref().take(3).collect();
    assert_eq!(first.len(), 3);
    let next = stream.next().unwrap();
    assert_eq!(next.wall_clock().format("%H:%M").to_string(), "08:03");
}

#[test_log::test]
fn streams_restart_from_the_same_start() {
    let calendar = event_calendar(
        "restart",
        "DTSTART;VALUE=DATE:20160229\nRRULE:FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=-1",
    )
    .unwrap();
    let (id, event) = calendar.components().next().unwrap();
    let a: Vec<_> = event.stream_recurrences().unwrap().take(4).collect();
    let b: Vec<_> = calendar.stream_recurrences(id, None).unwrap().take(4).collect();
    assert_eq!(a, b);
    let days: Vec<u32> = a.iter().map(|t| chrono::Datelike::day(&t.date())).collect();
    assert_eq!(days, vec![29, 28, 28, 28]);
}

#[test_log::test]
fn rule_text_round_trips() {
    let text = "FREQ=YEARLY;INTERVAL=2;BYMONTH=1;BYDAY=SU";
    let rule: RRule = text.parse().unwrap();
    assert_eq!(rule.to_string(), text);
    assert_eq!(rule.to_string().parse::<RRule>().unwrap(), rule);

    let calendar = event_calendar("rule", &format!("DTSTART:20160103T100000\nRRULE:{text}")).unwrap();
    let (_, event) = calendar.components().next().unwrap();
    assert_eq!(event.rrule(), Some(&rule));
    assert!(calendar.to_text().contains(&format!("RRULE:{text}\r\n")));
}

use kalends_rfc::rfc::ical::core::{ComponentKind, Parameter, Property, names};
use kalends_rfc::rfc::ical::{Calendar, Component, parse, serialize};
use kalends_test::wrap_calendar;

const FAMILY: &str = "BEGIN:VEVENT\r\nUID:fam\r\nDTSTART:20160104T100000\r\nRRULE:FREQ=WEEKLY;COUNT=3\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:fam\r\nRECURRENCE-ID:20160111T100000\r\nDTSTART:20160111T120000\r\nEND:VEVENT\r\n";

#[test_log::test]
fn parse_edit_serialize() {
    let mut calendar = parse(&wrap_calendar(FAMILY)).unwrap();
    let parent = calendar.find("fam", None).unwrap();
    let children = calendar.recurrence_children(parent);
    assert_eq!(children.len(), 1);
    assert_eq!(calendar.recurrence_parent(children[0]), Some(parent));

    calendar
        .modify(parent, |event| event.set_summary("Weekly, with notes; and more"))
        .unwrap();
    let text = serialize(&calendar);
    assert!(text.contains("SUMMARY:Weekly\\, with notes\\; and more\r\n"));

    let reparsed: Calendar = text.parse().unwrap();
    assert_eq!(reparsed, calendar);
}

#[test_log::test]
fn removing_a_parent_orphans_its_children() {
    let mut calendar = parse(&wrap_calendar(FAMILY)).unwrap();
    let parent = calendar.find("fam", None).unwrap();
    let removed = calendar.remove_component(parent).unwrap();
    assert_eq!(removed.uid(), Some("fam"));

    let orphans = calendar.orphaned_children();
    assert_eq!(orphans.len(), 1);
    assert_eq!(calendar.recurrence_parent(orphans[0]), None);

    let purged = calendar.purge_orphans(None);
    assert_eq!(purged.len(), 1);
    assert_eq!(calendar.components().count(), 0);
}

#[test_log::test]
fn detached_components_have_no_family() {
    let calendar = parse(&wrap_calendar(FAMILY)).unwrap();
    let (_, child) = calendar
        .components()
        .find(|(_, c)| c.recurrence_id().is_some())
        .unwrap();
    let mut other = Calendar::new();
    let id = other.add_component(child.clone());
    assert_eq!(other.recurrence_parent(id), None);
    assert_eq!(other.orphaned_children(), vec![id]);
}

#[test_log::test]
fn add_content_parses_nested_blocks() {
    let mut calendar = Calendar::new();
    let ids = calendar
        .add_content(
            "BEGIN:VTODO\r\nUID:t\r\nBEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:-PT5M\r\nEND:VALARM\r\nEND:VTODO\r\n",
        )
        .unwrap();
    assert_eq!(ids.len(), 1);
    let todo = calendar.get(ids[0]).unwrap();
    assert_eq!(todo.kind(), ComponentKind::Todo);
    assert_eq!(todo.children_of_kind(ComponentKind::Alarm).count(), 1);

    let mut event = Component::new_displayable(ComponentKind::Event).unwrap();
    event.add_content("BEGIN:VALARM\r\nACTION:AUDIO\r\nTRIGGER:-PT1M\r\nEND:VALARM\r\n")
        .unwrap();
    assert_eq!(event.children().len(), 1);
}

#[test_log::test]
fn parameters_keep_their_order_and_copies_are_independent() {
    let mut prop = Property::cal_address(names::ATTENDEE, "mailto:a@example.com");
    prop.add_parameter(Parameter::new("X-FIRST", "1")).unwrap();
    prop.add_parameter(Parameter::cn("Doe, Jane")).unwrap();
    prop.add_parameter(Parameter::new("ROLE", "CHAIR")).unwrap();
    assert_eq!(
        prop.to_text(),
        "ATTENDEE;X-FIRST=1;CN=\"Doe, Jane\";ROLE=CHAIR:mailto:a@example.com"
    );

    let mut copy = prop.clone();
    copy.set_parameter(Parameter::new("ROLE", "OPT-PARTICIPANT")).unwrap();
    assert!(prop.to_text().ends_with("ROLE=CHAIR:mailto:a@example.com"));
    assert!(copy.to_text().ends_with("ROLE=OPT-PARTICIPANT:mailto:a@example.com"));
}

#[test_log::test]
fn bad_lines_are_diagnostics_not_failures() {
    let text = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//x//EN\r\nBEGIN:VEVENT\r\nUID:d\r\n\
this line has no colon\r\nDTSTART:20160101T100000\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
    let calendar = parse(text).unwrap();
    assert_eq!(calendar.diagnostics().len(), 1);
    assert_eq!(calendar.diagnostics()[0].line, 6);
    assert_eq!(calendar.components().count(), 1);
}

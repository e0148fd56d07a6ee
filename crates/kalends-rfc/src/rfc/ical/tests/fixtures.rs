//! RFC 5545 iCalendar test fixtures.
//!
//! Examples adapted from RFC 5545 Appendix A and common client output. Every
//! line is shorter than the fold width, so serialization reproduces the
//! fixtures byte for byte.

/// RFC 5545 §A.1 - Minimal VEVENT
pub const VEVENT_MINIMAL: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:19970901T130000Z-123401@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART:19970903T163000Z\r\n\
DTEND:19970903T190000Z\r\n\
SUMMARY:Annual Employee Review\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// A weekly series with one moved occurrence
pub const VEVENT_RECURRING: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:19970901T130000Z-123402@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART:19970905T090000Z\r\n\
DTEND:19970905T100000Z\r\n\
SUMMARY:Weekly Team Meeting\r\n\
RRULE:FREQ=WEEKLY;COUNT=10;BYDAY=FR\r\n\
EXDATE:19970919T090000Z,19970926T090000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:19970901T130000Z-123402@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
RECURRENCE-ID:19970912T090000Z\r\n\
DTSTART:19970912T140000Z\r\n\
DTEND:19970912T150000Z\r\n\
SUMMARY:Weekly Team Meeting (afternoon)\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// RFC 5545 §A.2 - Basic VTODO
pub const VTODO_BASIC: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VTODO\r\n\
UID:19970901T130000Z-123403@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DUE:19970903T090000Z\r\n\
SUMMARY:Submit Tax Returns\r\n\
STATUS:NEEDS-ACTION\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

/// RFC 5545 §A.3 - Basic VJOURNAL
pub const VJOURNAL_BASIC: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VJOURNAL\r\n\
UID:19970901T130000Z-123404@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART;VALUE=DATE:19970317\r\n\
SUMMARY:Staff meeting minutes\r\n\
DESCRIPTION:1. Staff meeting: Participants include Joe\\,\\n Lisa and Bob\r\n\
END:VJOURNAL\r\n\
END:VCALENDAR\r\n";

/// VEVENT with a display alarm
pub const VEVENT_WITH_ALARM: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:alarm-event@example.com\r\n\
DTSTAMP:20060206T001102Z\r\n\
DTSTART:20060210T100000Z\r\n\
DURATION:PT1H\r\n\
SUMMARY:Dentist\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
TRIGGER;RELATED=START:-PT15M\r\n\
DESCRIPTION:Reminder\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// VEVENT referencing a VTIMEZONE
pub const VEVENT_WITH_TIMEZONE: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:America/New_York\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:20070311T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n\
TZOFFSETFROM:-0500\r\n\
TZOFFSETTO:-0400\r\n\
TZNAME:EDT\r\n\
END:DAYLIGHT\r\n\
BEGIN:STANDARD\r\n\
DTSTART:20071104T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\r\n\
TZOFFSETFROM:-0400\r\n\
TZOFFSETTO:-0500\r\n\
TZNAME:EST\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:tz-event@example.com\r\n\
DTSTAMP:20060206T001102Z\r\n\
DTSTART;TZID=America/New_York:20060102T120000\r\n\
DTEND;TZID=America/New_York:20060102T130000\r\n\
RRULE:FREQ=DAILY;COUNT=5\r\n\
SUMMARY:Lunch\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// VEVENT with quoted, multi-valued and caret-escaped parameters
pub const VEVENT_WITH_ATTENDEES: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
METHOD:PUBLISH\r\n\
BEGIN:VEVENT\r\n\
UID:attendees@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART:19970903T163000Z\r\n\
ORGANIZER;CN=\"Doe, Jane\":mailto:jane@example.com\r\n\
ATTENDEE;MEMBER=\"mailto:a@example.com\",\"mailto:b@example.com\":mailto:c@example.com\r\n\
ATTENDEE;CN=\"George ^'Herman^' Ruth\";RSVP=TRUE:mailto:babe@example.com\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// X- properties, an X- component and a value that does not decode
pub const VEVENT_WITH_EXTENSIONS: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
X-WR-CALNAME:Team\r\n\
BEGIN:VEVENT\r\n\
UID:extensions@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART;VALUE=DATE:20160101\r\n\
GEO:37.386013;-122.082932\r\n\
X-CUSTOM;X-PARAM=1:anything goes\r\n\
PERCENT-COMPLETE:lots\r\n\
END:VEVENT\r\n\
BEGIN:X-VENDOR-THING\r\n\
X-FOO:bar\r\n\
END:X-VENDOR-THING\r\n\
END:VCALENDAR\r\n";

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use kalends_rfc::rfc::ical::core::{Temporal, TemporalKind};

pub struct RRuleCase {
    pub name: &'static str,
    /// DTSTART, RRULE, RDATE and EXDATE lines of one VEVENT.
    pub event: &'static str,
    /// Occurrences as `YYYY-MM-DD`, a floating `YYYY-MM-DDTHH:MM:SS`, or
    /// RFC 3339 with `Z` or the zone's offset.
    pub expected: Option<&'static [&'static str]>,
    pub expected_len: Option<usize>,
    pub limit: usize,
    pub from: Option<&'static str>,
    pub before: Option<&'static str>,
}

#[expect(clippy::too_many_lines)]
pub fn rrule_cases() -> Vec<RRuleCase> {
    vec![
        RRuleCase {
            name: "daily_basic",
            event: "DTSTART:20120201T093000Z\nRRULE:FREQ=DAILY;COUNT=3",
            expected: Some(&[
                "2012-02-01T09:30:00Z",
                "2012-02-02T09:30:00Z",
                "2012-02-03T09:30:00Z",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "weekly_basic",
            event: "DTSTART:19970902T090000Z\nRRULE:FREQ=WEEKLY;COUNT=3;BYDAY=TU,TH",
            expected: Some(&[
                "1997-09-02T09:00:00Z",
                "1997-09-04T09:00:00Z",
                "1997-09-09T09:00:00Z",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "monthly_basic",
            event: "DTSTART:20120101T090000Z\nRRULE:FREQ=MONTHLY;COUNT=3;BYMONTHDAY=1",
            expected: Some(&[
                "2012-01-01T09:00:00Z",
                "2012-02-01T09:00:00Z",
                "2012-03-01T09:00:00Z",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "yearly_basic",
            event: "DTSTART:20120101T090000Z\nRRULE:FREQ=YEARLY;COUNT=3",
            expected: Some(&[
                "2012-01-01T09:00:00Z",
                "2013-01-01T09:00:00Z",
                "2014-01-01T09:00:00Z",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "hourly_basic",
            event: "DTSTART:20120101T090000Z\nRRULE:FREQ=HOURLY;COUNT=3",
            expected: Some(&[
                "2012-01-01T09:00:00Z",
                "2012-01-01T10:00:00Z",
                "2012-01-01T11:00:00Z",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "minutely_basic",
            event: "DTSTART:20120101T090000Z\nRRULE:FREQ=MINUTELY;COUNT=3",
            expected: Some(&[
                "2012-01-01T09:00:00Z",
                "2012-01-01T09:01:00Z",
                "2012-01-01T09:02:00Z",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "secondly_basic",
            event: "DTSTART:20120101T090000Z\nRRULE:FREQ=SECONDLY;COUNT=3",
            expected: Some(&[
                "2012-01-01T09:00:00Z",
                "2012-01-01T09:00:01Z",
                "2012-01-01T09:00:02Z",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "rdate_exdate",
            event: "DTSTART:20120201T093000Z\nRRULE:FREQ=DAILY;COUNT=3\nRDATE:20120210T093000Z\nEXDATE:20120202T093000Z",
            expected: Some(&[
                "2012-02-01T09:30:00Z",
                "2012-02-03T09:30:00Z",
                "2012-02-10T09:30:00Z",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "from_before",
            event: "DTSTART:20120201T093000Z\nRRULE:FREQ=DAILY;COUNT=3",
            expected: Some(&["2012-02-02T09:30:00Z", "2012-02-03T09:30:00Z"]),
            expected_len: None,
            limit: 100,
            from: Some("2012-02-01T10:00:00Z"),
            before: Some("2012-04-01T09:00:00Z"),
        },
        RRuleCase {
            name: "dst_new_york",
            event: "DTSTART;TZID=America/New_York:20210313T090000\nRRULE:FREQ=DAILY;COUNT=3",
            expected: Some(&[
                "2021-03-13T09:00:00-05:00",
                "2021-03-14T09:00:00-04:00",
                "2021-03-15T09:00:00-04:00",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "local_mean_time_berlin",
            event: "DTSTART;TZID=Europe/Berlin:18930401T010000\nRRULE:FREQ=DAILY",
            expected: None,
            expected_len: Some(10),
            limit: 10,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "rfc_every_day_in_jan",
            event: "DTSTART;TZID=America/New_York:19980101T090000\nRRULE:FREQ=YEARLY;UNTIL=20000131T140000Z;BYMONTH=1;BYDAY=SU,MO,TU,WE,TH,FR,SA",
            expected: None,
            expected_len: Some(93),
            limit: 200,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "every_third_day_with_exceptions",
            event: "DTSTART:20151109T100000\nRRULE:FREQ=DAILY;INTERVAL=3;COUNT=6\nEXDATE:20151112T100000,20151115T100000",
            expected: Some(&[
                "2015-11-09T10:00:00",
                "2015-11-18T10:00:00",
                "2015-11-21T10:00:00",
                "2015-11-24T10:00:00",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "monthly_nth_weekdays",
            event: "DTSTART:20160615T090000\nRRULE:FREQ=MONTHLY;COUNT=7;BYDAY=3WE,2TU",
            expected: Some(&[
                "2016-06-15T09:00:00",
                "2016-07-12T09:00:00",
                "2016-07-20T09:00:00",
                "2016-08-09T09:00:00",
                "2016-08-17T09:00:00",
                "2016-09-13T09:00:00",
                "2016-09-21T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "monthly_weekends",
            event: "DTSTART:20160508T090000\nRRULE:FREQ=MONTHLY;COUNT=5;BYDAY=SA,SU",
            expected: Some(&[
                "2016-05-08T09:00:00",
                "2016-05-14T09:00:00",
                "2016-05-15T09:00:00",
                "2016-05-21T09:00:00",
                "2016-05-22T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "weekly_mo_we_fr",
            event: "DTSTART:20160509T090000\nRRULE:FREQ=WEEKLY;COUNT=5;BYDAY=MO,WE,FR",
            expected: Some(&[
                "2016-05-09T09:00:00",
                "2016-05-11T09:00:00",
                "2016-05-13T09:00:00",
                "2016-05-16T09:00:00",
                "2016-05-18T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "yearly_ordinal_weekdays_on_dates",
            event: "DTSTART;VALUE=DATE:20151227\nRRULE:FREQ=YEARLY;BYDAY=-1SU,2MO",
            expected: Some(&[
                "2015-12-27",
                "2016-01-11",
                "2016-12-25",
                "2017-01-09",
                "2017-12-31",
            ]),
            expected_len: None,
            limit: 5,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "last_weekday_of_month",
            event: "DTSTART:20160101T090000\nRRULE:FREQ=MONTHLY;COUNT=3;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",
            expected: Some(&[
                "2016-01-29T09:00:00",
                "2016-02-29T09:00:00",
                "2016-03-31T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "monthly_31st_skips_short_months",
            event: "DTSTART:20160131T090000\nRRULE:FREQ=MONTHLY;COUNT=4",
            expected: Some(&[
                "2016-01-31T09:00:00",
                "2016-03-31T09:00:00",
                "2016-05-31T09:00:00",
                "2016-07-31T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "monday_of_week_twenty",
            event: "DTSTART:19970512T090000\nRRULE:FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO",
            expected: Some(&[
                "1997-05-12T09:00:00",
                "1998-05-11T09:00:00",
                "1999-05-17T09:00:00",
            ]),
            expected_len: None,
            limit: 3,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "date_until_is_inclusive",
            event: "DTSTART;VALUE=DATE:20160101\nRRULE:FREQ=DAILY;UNTIL=20160105",
            expected: None,
            expected_len: Some(5),
            limit: 100,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "impossible_rule_ends",
            event: "DTSTART;VALUE=DATE:20160101\nRRULE:FREQ=DAILY;BYMONTH=2;BYMONTHDAY=30",
            expected: Some(&[]),
            expected_len: None,
            limit: 10,
            from: None,
            before: None,
        },
        RRuleCase {
            name: "hourly_interval_filtered_by_hour",
            event: "DTSTART:20160101T090000\nRRULE:FREQ=HOURLY;INTERVAL=5;BYHOUR=9,10;COUNT=3",
            expected: Some(&[
                "2016-01-01T09:00:00",
                "2016-01-02T10:00:00",
                "2016-01-06T09:00:00",
            ]),
            expected_len: None,
            limit: 100,
            from: None,
            before: None,
        },
    ]
}

pub fn assert_case(case: &RRuleCase) {
    let calendar = kalends_test::event_calendar(case.name, case.event)
        .unwrap_or_else(|err| panic!("Failed to parse {}: {}", case.name, err));
    let (_, event) = calendar
        .components()
        .next()
        .unwrap_or_else(|| panic!("Case {} has no component", case.name));
    let set = event
        .recurrence_set()
        .unwrap_or_else(|err| panic!("Case {} has no recurrence set: {}", case.name, err));

    let stream = match case.from {
        Some(from) => set.stream_from(&parse_instant(from)),
        None => set.stream(),
    };
    let before = case.before.map(|value| parse_instant(value).instant_key());
    let occurrences: Vec<Temporal> = stream
        .take_while(|t| before.is_none_or(|before| t.instant_key() < before))
        .take(case.limit)
        .collect();

    assert!(
        occurrences
            .windows(2)
            .all(|pair| pair[0].instant_key() < pair[1].instant_key()),
        "Case {} is not strictly ascending",
        case.name
    );
    let kind = set.start().kind();
    assert!(
        occurrences.iter().all(|t| t.kind() == kind && t.tzid() == set.start().tzid()),
        "Case {} changed the start's value type",
        case.name
    );

    if let Some(expected) = case.expected {
        let actual: Vec<String> = occurrences.iter().map(render).collect();
        assert_eq!(actual, expected, "Case {} did not match", case.name);
    }

    if let Some(expected_len) = case.expected_len {
        assert_eq!(
            occurrences.len(),
            expected_len,
            "Case {} expected {} occurrences",
            case.name,
            expected_len
        );
    }
}

/// Renders an occurrence the way the case table writes it.
fn render(t: &Temporal) -> String {
    match (t.kind(), t.tzid()) {
        (TemporalKind::Date, _) => t.date().format("%Y-%m-%d").to_string(),
        (TemporalKind::Local, _) => t.wall_clock().format("%Y-%m-%dT%H:%M:%S").to_string(),
        (TemporalKind::Zoned, None) => t.wall_clock().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        (TemporalKind::Zoned, Some(_)) => {
            let offset = (t.wall_clock() - t.instant_key()).num_minutes();
            let sign = if offset < 0 { '-' } else { '+' };
            let offset = offset.abs();
            format!(
                "{}{sign}{:02}:{:02}",
                t.wall_clock().format("%Y-%m-%dT%H:%M:%S"),
                offset / 60,
                offset % 60
            )
        }
    }
}

/// Parses a case bound; RFC 3339 values become UTC instants.
fn parse_instant(value: &str) -> Temporal {
    use kalends_rfc::rfc::ical::core::DateTime as CalDateTime;

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Temporal::DateTime(CalDateTime::utc(dt.naive_utc()));
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Temporal::DateTime(CalDateTime::floating(local));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Temporal::Date)
        .unwrap_or_else(|err| panic!("Failed to parse case bound {value}: {err}"))
}

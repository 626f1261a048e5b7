//! ICS file parsing for event import, using the icalendar crate's parser.
//!
//! Only the import direction exists: VEVENTs become canonical events that
//! are then pushed to the service one by one. Recurrence rules route
//! through the strict RRULE translator, so a file using constructs outside
//! the supported subset fails the import instead of silently dropping the
//! rule.

use std::collections::BTreeSet;

use chrono::TimeZone;
use icalendar::{
    DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use crate::error::{OcalError, OcalResult};
use crate::event::{Event, EventTime};
use crate::recurrence::from_rrule_text;
use crate::tz::TimezoneContext;

/// Parse ICS content into canonical events.
///
/// Floating times (no `Z`, no `TZID`) are localized via the context, the
/// same way naive CLI input is.
pub fn parse_events(content: &str, ctx: &TimezoneContext) -> OcalResult<Vec<Event>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded)
        .map_err(|e| OcalError::MalformedPayload(format!("unreadable ICS: {}", e)))?;

    calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(|vevent| parse_vevent(vevent, ctx))
        .collect()
}

fn parse_vevent(vevent: &Component, ctx: &TimezoneContext) -> OcalResult<Event> {
    let subject = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .ok_or_else(|| OcalError::MalformedPayload("VEVENT without SUMMARY".into()))?;

    let start = event_time(vevent, "DTSTART", ctx)?;
    let end = event_time(vevent, "DTEND", ctx)?;

    let location = vevent.find_prop("LOCATION").map(|p| p.val.to_string());
    let body = vevent.find_prop("DESCRIPTION").map(|p| p.val.to_string());

    let attendees: BTreeSet<String> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "ATTENDEE")
        .map(attendee_address)
        .collect();

    let recurrence = vevent
        .find_prop("RRULE")
        .map(|p| from_rrule_text(p.val.as_ref()))
        .transpose()?;

    // First VALARM that fires before the event, if any.
    let reminder = vevent
        .components
        .iter()
        .filter(|c| c.name == "VALARM")
        .find_map(|alarm| {
            let trigger = alarm.find_prop("TRIGGER")?;
            parse_trigger_minutes(trigger.val.as_ref())
        });

    let event = Event {
        id: None,
        subject,
        start,
        end,
        location,
        body,
        attendees,
        reminder,
        recurrence,
    };
    event.validate()?;
    Ok(event)
}

fn event_time(vevent: &Component, prop: &str, ctx: &TimezoneContext) -> OcalResult<EventTime> {
    let raw = vevent
        .find_prop(prop)
        .ok_or_else(|| OcalError::MalformedPayload(format!("VEVENT without {}", prop)))?;

    let parsed = DatePerhapsTime::try_from(raw)
        .map_err(|_| OcalError::MalformedPayload(format!("bad {} value", prop)))?;

    match parsed {
        DatePerhapsTime::Date(d) => Ok(EventTime::Date(d)),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => Ok(EventTime::DateTime(dt)),
            icalendar::CalendarDateTime::Floating(naive) => {
                Ok(EventTime::DateTime(ctx.localize_utc(naive)?))
            }
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                let tz: chrono_tz::Tz = tzid
                    .parse()
                    .map_err(|_| OcalError::MalformedPayload(format!("bad TZID '{}'", tzid)))?;
                let dt = tz.from_local_datetime(&date_time).earliest().ok_or_else(|| {
                    OcalError::MalformedPayload(format!(
                        "nonexistent local time '{}' in '{}'",
                        date_time, tzid
                    ))
                })?;
                Ok(EventTime::DateTime(dt.with_timezone(&chrono::Utc)))
            }
        },
    }
}

fn attendee_address(prop: &Property) -> String {
    let val = prop.val.as_ref();
    val.strip_prefix("mailto:").unwrap_or(val).to_string()
}

/// Parse a TRIGGER value into minutes before the event (`-PT30M`, `-P1D`).
/// Triggers at or after the start are not reminders.
fn parse_trigger_minutes(value: &str) -> Option<u32> {
    let duration_str = value.strip_prefix('-')?;
    let duration = iso8601::duration(duration_str).ok()?;
    let std_duration: std::time::Duration = duration.into();
    Some((std_duration.as_secs() / 60) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{ByDay, Frequency};
    use chrono::{NaiveDate, Utc};
    use chrono_tz::{Europe::Dublin, UTC};

    fn ctx() -> TimezoneContext {
        TimezoneContext::new(UTC, None, None)
    }

    fn ics(event_lines: &[&str]) -> String {
        let mut lines = vec!["BEGIN:VCALENDAR", "VERSION:2.0", "BEGIN:VEVENT"];
        lines.extend_from_slice(event_lines);
        lines.extend_from_slice(&["END:VEVENT", "END:VCALENDAR"]);
        lines.join("\r\n")
    }

    // --- timed events ---

    #[test]
    fn parses_a_utc_event() {
        let content = ics(&[
            "UID:one@example",
            "SUMMARY:Standup",
            "DTSTART:20250115T100000Z",
            "DTEND:20250115T103000Z",
            "LOCATION:Room 4",
            "DESCRIPTION:Daily sync",
        ]);
        let events = parse_events(&content, &ctx()).unwrap();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.subject, "Standup");
        assert_eq!(event.location.as_deref(), Some("Room 4"));
        assert_eq!(event.body.as_deref(), Some("Daily sync"));
        assert_eq!(
            event.start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap())
        );
        assert_eq!(event.id, None);
    }

    #[test]
    fn zoned_times_convert_to_utc() {
        let content = ics(&[
            "SUMMARY:Picnic",
            "DTSTART;TZID=Europe/Dublin:20250615T100000",
            "DTEND;TZID=Europe/Dublin:20250615T120000",
        ]);
        let events = parse_events(&content, &ctx()).unwrap();
        assert_eq!(
            events[0].start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn floating_times_follow_the_context() {
        let content = ics(&[
            "SUMMARY:Call",
            "DTSTART:20250615T100000",
            "DTEND:20250615T110000",
        ]);
        let dublin = TimezoneContext::new(Dublin, None, None);
        let events = parse_events(&content, &dublin).unwrap();
        assert_eq!(
            events[0].start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap())
        );
    }

    // --- all-day events ---

    #[test]
    fn date_values_become_all_day() {
        let content = ics(&[
            "SUMMARY:Conference",
            "DTSTART;VALUE=DATE:20250115",
            "DTEND;VALUE=DATE:20250117",
        ]);
        let events = parse_events(&content, &ctx()).unwrap();
        let event = &events[0];
        assert!(event.is_all_day());
        assert_eq!(
            event.start,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
        );
        assert_eq!(
            event.end,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, 17).unwrap())
        );
    }

    // --- attendees, reminders, recurrence ---

    #[test]
    fn attendees_and_alarm() {
        let content = ics(&[
            "SUMMARY:Review",
            "DTSTART:20250115T100000Z",
            "DTEND:20250115T110000Z",
            "ATTENDEE;CN=Ali:mailto:ali@example.com",
            "ATTENDEE:mailto:bea@example.com",
            "BEGIN:VALARM",
            "ACTION:DISPLAY",
            "TRIGGER:-PT30M",
            "END:VALARM",
        ]);
        let events = parse_events(&content, &ctx()).unwrap();
        let event = &events[0];
        assert_eq!(
            event.attendees,
            ["ali@example.com".to_string(), "bea@example.com".to_string()]
                .into_iter()
                .collect()
        );
        assert_eq!(event.reminder, Some(30));
    }

    #[test]
    fn rrule_routes_through_the_strict_translator() {
        let content = ics(&[
            "SUMMARY:Gym",
            "DTSTART:20250115T070000Z",
            "DTEND:20250115T080000Z",
            "RRULE:FREQ=WEEKLY;BYDAY=MO,WE",
        ]);
        let events = parse_events(&content, &ctx()).unwrap();
        let rec = events[0].recurrence.as_ref().unwrap();
        assert_eq!(rec.frequency, Frequency::Weekly);
        assert_eq!(rec.by_day, [ByDay::Mo, ByDay::We].into_iter().collect());
    }

    #[test]
    fn unsupported_rrule_fails_the_import() {
        let content = ics(&[
            "SUMMARY:Rent",
            "DTSTART:20250101T090000Z",
            "DTEND:20250101T100000Z",
            "RRULE:FREQ=MONTHLY;BYMONTHDAY=1",
        ]);
        assert!(matches!(
            parse_events(&content, &ctx()),
            Err(OcalError::UnsupportedRecurrence(_))
        ));
    }

    // --- malformed input ---

    #[test]
    fn missing_summary_or_times_rejected() {
        let no_summary = ics(&["DTSTART:20250115T100000Z", "DTEND:20250115T110000Z"]);
        assert!(parse_events(&no_summary, &ctx()).is_err());

        let no_end = ics(&["SUMMARY:X", "DTSTART:20250115T100000Z"]);
        assert!(parse_events(&no_end, &ctx()).is_err());
    }

    #[test]
    fn trigger_after_start_is_not_a_reminder() {
        assert_eq!(parse_trigger_minutes("PT30M"), None);
        assert_eq!(parse_trigger_minutes("-PT30M"), Some(30));
        assert_eq!(parse_trigger_minutes("-P1D"), Some(1440));
    }
}

//! Terminal rendering for events.

use chrono::Duration;
use chrono_tz::Tz;
use ocal_core::event::{Event, EventTime};
use ocal_core::recurrence::to_rrule_text;
use owo_colors::OwoColorize;
use serde_json::json;

/// One line per event, times shown in the given zone.
pub fn render_events(events: &[Event], tz: Tz) -> String {
    if events.is_empty() {
        return "  (no events)".dimmed().to_string();
    }

    events
        .iter()
        .map(|event| render_event(event, tz))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_event(event: &Event, tz: Tz) -> String {
    let mut line = format!(
        "  {}  {}",
        render_event_time(event, tz).cyan(),
        event.subject
    );

    if let Some(ref location) = event.location {
        line.push_str(&format!(" {} {}", "@".dimmed(), location.yellow()));
    }
    if event.recurrence.is_some() {
        line.push_str(&format!(" {}", "(recurring)".dimmed()));
    }
    if let Some(ref id) = event.id {
        line.push_str(&format!("\n      {}", id.dimmed()));
    }

    line
}

fn render_event_time(event: &Event, tz: Tz) -> String {
    match (&event.start, &event.end) {
        (EventTime::Date(start), EventTime::Date(end)) => {
            // End is exclusive; show the last included date.
            let last = *end - Duration::days(1);
            if *start == last {
                format!("{} (all day)", start)
            } else {
                format!("{} – {} (all day)", start, last)
            }
        }
        (EventTime::DateTime(start), EventTime::DateTime(end)) => {
            let start_local = start.with_timezone(&tz);
            let end_local = end.with_timezone(&tz);
            if start_local.date_naive() == end_local.date_naive() {
                format!(
                    "{} – {}",
                    start_local.format("%Y-%m-%d %H:%M"),
                    end_local.format("%H:%M")
                )
            } else {
                format!(
                    "{} – {}",
                    start_local.format("%Y-%m-%d %H:%M"),
                    end_local.format("%Y-%m-%d %H:%M")
                )
            }
        }
        // The model forbids mixed variants; render defensively anyway.
        _ => "(invalid time)".to_string(),
    }
}

/// Flat JSON representation for scripting.
pub fn events_to_json(events: &[Event]) -> serde_json::Value {
    json!(
        events
            .iter()
            .map(|event| {
                json!({
                    "id": event.id,
                    "subject": event.subject,
                    "start": event_time_string(&event.start),
                    "end": event_time_string(&event.end),
                    "allDay": event.is_all_day(),
                    "location": event.location,
                    "body": event.body,
                    "attendees": event.attendees,
                    "reminderMinutesBeforeStart": event.reminder,
                    "recurrence": event.recurrence.as_ref().map(to_rrule_text),
                })
            })
            .collect::<Vec<_>>()
    )
}

fn event_time_string(time: &EventTime) -> String {
    match time {
        EventTime::DateTime(dt) => dt.to_rfc3339(),
        EventTime::Date(d) => d.to_string(),
    }
}

//! Wire payload mapping.
//!
//! Converts between the canonical [`Event`] and the remote service's event
//! payload. The mapping is an explicit struct-to-struct conversion per
//! direction, so adding a canonical field breaks compilation here instead
//! of silently dropping on the wire. Decoding substitutes no defaults:
//! a payload missing `subject`, `start`, or `end` is malformed.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OcalError, OcalResult};
use crate::event::{Event, EventTime};
use crate::recurrence::{PatternPayload, from_wire_pattern, to_wire_pattern};

/// The service's event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<WireBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<WireLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<WireDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<WireDateTime>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<WireAttendee>,
    #[serde(default)]
    pub is_reminder_on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_minutes_before_start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<PatternPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLocation {
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAttendee {
    pub email_address: WireEmail,
    #[serde(rename = "type", default = "required_attendee")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEmail {
    pub address: String,
}

fn required_attendee() -> String {
    "required".to_string()
}

/// Encode a canonical event for the wire.
pub fn to_wire(event: &Event) -> WireEvent {
    WireEvent {
        id: event.id.clone(),
        subject: Some(event.subject.clone()),
        body: event.body.as_ref().map(|content| WireBody {
            content_type: "text".to_string(),
            content: content.clone(),
        }),
        location: event.location.as_ref().map(|name| WireLocation {
            display_name: name.clone(),
        }),
        start: Some(encode_event_time(&event.start)),
        end: Some(encode_event_time(&event.end)),
        is_all_day: event.is_all_day(),
        attendees: event
            .attendees
            .iter()
            .map(|address| WireAttendee {
                email_address: WireEmail {
                    address: address.clone(),
                },
                kind: required_attendee(),
            })
            .collect(),
        is_reminder_on: event.reminder.is_some(),
        reminder_minutes_before_start: event.reminder,
        recurrence: event.recurrence.as_ref().map(to_wire_pattern),
    }
}

/// Decode a wire payload into a canonical event.
pub fn from_wire(wire: WireEvent) -> OcalResult<Event> {
    let subject = wire
        .subject
        .ok_or_else(|| OcalError::MalformedPayload("missing subject".into()))?;

    let start_raw = wire
        .start
        .ok_or_else(|| OcalError::MalformedPayload("missing start".into()))?;
    let end_raw = wire
        .end
        .ok_or_else(|| OcalError::MalformedPayload("missing end".into()))?;

    let (start, end) = if wire.is_all_day {
        (
            EventTime::Date(decode_date(&start_raw)?),
            EventTime::Date(decode_date(&end_raw)?),
        )
    } else {
        (
            EventTime::DateTime(decode_instant(&start_raw)?),
            EventTime::DateTime(decode_instant(&end_raw)?),
        )
    };

    let attendees: BTreeSet<String> = wire
        .attendees
        .into_iter()
        .map(|a| a.email_address.address)
        .collect();

    let reminder = if wire.is_reminder_on {
        wire.reminder_minutes_before_start
    } else {
        None
    };

    let recurrence = wire
        .recurrence
        .as_ref()
        .map(from_wire_pattern)
        .transpose()?;

    let event = Event {
        id: wire.id,
        subject,
        start,
        end,
        location: wire.location.map(|l| l.display_name),
        body: wire.body.map(|b| b.content),
        attendees,
        reminder,
        recurrence,
    };
    event.validate()?;
    Ok(event)
}

fn encode_event_time(time: &EventTime) -> WireDateTime {
    match time {
        EventTime::DateTime(dt) => WireDateTime {
            date_time: dt.to_rfc3339(),
            time_zone: "UTC".to_string(),
        },
        EventTime::Date(d) => WireDateTime {
            date_time: format!("{}T00:00:00", d.format("%Y-%m-%d")),
            time_zone: "UTC".to_string(),
        },
    }
}

/// All-day boundaries travel as `YYYY-MM-DDT00:00:00`; only the date part
/// is meaningful.
fn decode_date(raw: &WireDateTime) -> OcalResult<NaiveDate> {
    let date_part = raw.date_time.get(..10).unwrap_or(&raw.date_time);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| OcalError::MalformedPayload(format!("bad all-day date '{}'", raw.date_time)))
}

/// Timed boundaries are RFC 3339, or a naive datetime (the service emits
/// up to seven fractional digits) paired with a zone name.
fn decode_instant(raw: &WireDateTime) -> OcalResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw.date_time) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(&raw.date_time, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| OcalError::MalformedPayload(format!("bad datetime '{}'", raw.date_time)))?;

    if raw.time_zone == "UTC" {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    let tz: chrono_tz::Tz = raw
        .time_zone
        .parse()
        .map_err(|_| OcalError::MalformedPayload(format!("bad timezone '{}'", raw.time_zone)))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            OcalError::MalformedPayload(format!(
                "nonexistent local time '{}' in '{}'",
                raw.date_time, raw.time_zone
            ))
        })
}

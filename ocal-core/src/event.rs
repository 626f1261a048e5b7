//! Provider-neutral event types.
//!
//! These types represent calendar events in a provider-agnostic way.
//! The wire mapper converts them to and from the remote service's payload,
//! and the CLI works exclusively with them.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OcalError, OcalResult};
use crate::recurrence::Recurrence;

/// A calendar event.
///
/// `id` is assigned by the remote service and absent on locally constructed
/// drafts. Attendees are kept as a set: the wire format orders them, but
/// order carries no meaning here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<String>,
    pub subject: String,
    pub start: EventTime,
    pub end: EventTime,
    pub location: Option<String>,
    pub body: Option<String>,
    pub attendees: BTreeSet<String>,
    /// Minutes before `start` at which to remind.
    pub reminder: Option<u32>,
    pub recurrence: Option<Recurrence>,
}

/// Start/end of an event: an absolute instant for timed events, or a
/// calendar date for all-day events (start inclusive, end exclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl Event {
    /// A minimal timed draft with no remote identity.
    pub fn draft(subject: String, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Event {
            id: None,
            subject,
            start: EventTime::DateTime(start),
            end: EventTime::DateTime(end),
            location: None,
            body: None,
            attendees: BTreeSet::new(),
            reminder: None,
            recurrence: None,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self.start, EventTime::Date(_))
    }

    /// Check the model invariants: non-empty subject, matching start/end
    /// variants, `start < end`, and the recurrence day-set rule.
    pub fn validate(&self) -> OcalResult<()> {
        if self.subject.trim().is_empty() {
            return Err(OcalError::MalformedPayload("empty subject".into()));
        }

        match (&self.start, &self.end) {
            (EventTime::DateTime(s), EventTime::DateTime(e)) => {
                if s >= e {
                    return Err(OcalError::MalformedPayload(format!(
                        "start '{}' is not before end '{}'",
                        s, e
                    )));
                }
            }
            (EventTime::Date(s), EventTime::Date(e)) => {
                if s >= e {
                    return Err(OcalError::MalformedPayload(format!(
                        "all-day start '{}' is not before end '{}'",
                        s, e
                    )));
                }
            }
            _ => {
                return Err(OcalError::MalformedPayload(
                    "start and end must both be instants or both be dates".into(),
                ));
            }
        }

        if let Some(ref rec) = self.recurrence {
            rec.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timed(start_hour: u32, end_hour: u32) -> Event {
        Event::draft(
            "Standup".into(),
            Utc.with_ymd_and_hms(2025, 1, 15, start_hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 15, end_hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn valid_timed_event_passes() {
        assert!(timed(10, 11).validate().is_ok());
    }

    #[test]
    fn inverted_times_rejected() {
        assert!(timed(11, 10).validate().is_err());
        assert!(timed(10, 10).validate().is_err());
    }

    #[test]
    fn empty_subject_rejected() {
        let mut event = timed(10, 11);
        event.subject = "  ".into();
        assert!(event.validate().is_err());
    }

    #[test]
    fn mixed_variants_rejected() {
        let mut event = timed(10, 11);
        event.end = EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());
        assert!(event.validate().is_err());
    }

    #[test]
    fn all_day_is_derived_from_variant() {
        let mut event = timed(10, 11);
        assert!(!event.is_all_day());
        event.start = EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        event.end = EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());
        assert!(event.is_all_day());
        assert!(event.validate().is_ok());
    }
}

use anyhow::Result;
use ocal_core::config::GlobalConfig;
use ocal_core::event::EventTime;
use ocal_core::recurrence::from_rrule_text;
use ocal_core::tz::{TimezoneContext, parse_date, parse_instant, resolve_span};
use owo_colors::OwoColorize;

use crate::client::GraphClient;
use crate::render;

/// Replacement values for an edit. Each given field replaces the remote
/// value wholesale; there is no partial merge below the field level.
pub struct Changes {
    pub subject: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub body: Option<String>,
    pub attendees: Vec<String>,
    pub reminder: Option<u32>,
    pub recurrence: Option<String>,
}

impl Changes {
    fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.location.is_none()
            && self.body.is_none()
            && self.attendees.is_empty()
            && self.reminder.is_none()
            && self.recurrence.is_none()
    }
}

pub async fn run(
    config: &GlobalConfig,
    ctx: &TimezoneContext,
    id: &str,
    changes: Changes,
) -> Result<()> {
    if changes.is_empty() {
        println!("{}", "No changes specified".yellow());
        return Ok(());
    }

    let client = GraphClient::from_config(config)?;
    let mut event = client.get_event(id).await?;

    if let Some(subject) = changes.subject {
        event.subject = subject;
    }

    apply_times(&mut event, changes.start.as_deref(), changes.end.as_deref(), ctx)?;

    if let Some(location) = changes.location {
        event.location = if location.is_empty() {
            None
        } else {
            Some(location)
        };
    }
    if let Some(body) = changes.body {
        event.body = if body.is_empty() { None } else { Some(body) };
    }
    if !changes.attendees.is_empty() {
        event.attendees = changes.attendees.into_iter().collect();
    }
    if let Some(reminder) = changes.reminder {
        event.reminder = Some(reminder);
    }
    if let Some(rrule) = changes.recurrence {
        event.recurrence = if rrule.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(from_rrule_text(&rrule)?)
        };
    }

    event.validate()?;
    let updated = client.update_event(&event).await?;

    println!("{}", format!("Updated: {}", updated.subject).green());
    println!("{}", render::render_event(&updated, ctx.effective()));

    Ok(())
}

/// Replace start/end. All-day events take dates; timed events take
/// datetimes, with the conflicting-offset check when both are replaced.
fn apply_times(
    event: &mut ocal_core::event::Event,
    start: Option<&str>,
    end: Option<&str>,
    ctx: &TimezoneContext,
) -> Result<()> {
    if start.is_none() && end.is_none() {
        return Ok(());
    }

    if event.is_all_day() {
        if let Some(s) = start {
            event.start = EventTime::Date(parse_date(s)?);
        }
        if let Some(e) = end {
            event.end = EventTime::Date(parse_date(e)?);
        }
        return Ok(());
    }

    match (start, end) {
        (Some(s), Some(e)) => {
            let (start_instant, end_instant) = resolve_span(s, e, ctx)?;
            event.start = EventTime::DateTime(start_instant);
            event.end = EventTime::DateTime(end_instant);
        }
        (Some(s), None) => {
            event.start = EventTime::DateTime(parse_instant(s, ctx)?.instant);
        }
        (None, Some(e)) => {
            event.end = EventTime::DateTime(parse_instant(e, ctx)?.instant);
        }
        (None, None) => {}
    }

    Ok(())
}

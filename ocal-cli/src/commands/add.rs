use anyhow::{Context, Result};
use chrono::Duration;
use ocal_core::config::GlobalConfig;
use ocal_core::event::{Event, EventTime};
use ocal_core::recurrence::from_rrule_text;
use ocal_core::tz::{TimezoneContext, parse_date, parse_instant, resolve_span};
use owo_colors::OwoColorize;

use crate::client::GraphClient;
use crate::render;

pub struct Fields {
    pub subject: String,
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub body: Option<String>,
    pub attendees: Vec<String>,
    pub reminder: Option<u32>,
    pub all_day: bool,
    pub recurrence: Option<String>,
}

pub async fn run(config: &GlobalConfig, ctx: &TimezoneContext, fields: Fields) -> Result<()> {
    let client = GraphClient::from_config(config)?;

    let (start, end) = resolve_times(&fields, ctx)?;

    let recurrence = fields
        .recurrence
        .as_deref()
        .map(from_rrule_text)
        .transpose()?;

    let event = Event {
        id: None,
        subject: fields.subject,
        start,
        end,
        location: fields.location,
        body: fields.body,
        attendees: fields.attendees.into_iter().collect(),
        reminder: fields.reminder,
        recurrence,
    };
    event.validate()?;

    let created = client.create_event(&event).await?;

    println!("{}", format!("Created: {}", created.subject).green());
    println!("{}", render::render_event(&created, ctx.effective()));

    Ok(())
}

fn resolve_times(fields: &Fields, ctx: &TimezoneContext) -> Result<(EventTime, EventTime)> {
    if fields.all_day {
        let first = parse_date(&fields.start)?;
        let end_date = match &fields.end {
            Some(e) => parse_date(e)?,
            None => first + Duration::days(1),
        };
        return Ok((EventTime::Date(first), EventTime::Date(end_date)));
    }

    match (&fields.end, &fields.duration) {
        (Some(end), _) => {
            let (start, end) = resolve_span(&fields.start, end, ctx)?;
            Ok((EventTime::DateTime(start), EventTime::DateTime(end)))
        }
        (None, Some(dur_text)) => {
            let start = parse_instant(&fields.start, ctx)?.instant;
            let std_dur = humantime::parse_duration(dur_text)
                .with_context(|| format!("could not parse duration \"{}\"", dur_text))?;
            let duration = Duration::from_std(std_dur).context("duration too large")?;
            Ok((
                EventTime::DateTime(start),
                EventTime::DateTime(start + duration),
            ))
        }
        (None, None) => {
            let start = parse_instant(&fields.start, ctx)?.instant;
            Ok((
                EventTime::DateTime(start),
                EventTime::DateTime(start + Duration::hours(1)),
            ))
        }
    }
}

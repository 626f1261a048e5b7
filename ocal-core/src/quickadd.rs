//! Natural-language event compilation.
//!
//! Turns one free-text line of the shape
//! `<time clause>: <subject>[ @ <location>]` into a structured draft.
//! The time clause is an optional relative-date token plus a clock token,
//! optionally followed by `for <duration>`. Pure text-in, draft-out; the
//! current instant and timezone context come in as parameters.

use chrono::{DateTime, Duration, Utc};

use crate::error::{OcalError, OcalResult};
use crate::event::Event;
use crate::temporal::{resolve_relative_date, resolve_time_of_day};
use crate::tz::TimezoneContext;

/// The result of compiling one quickadd line. Consumed immediately to
/// build an [`Event`]; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickaddDraft {
    pub subject: String,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QuickaddDraft {
    pub fn into_event(self) -> Event {
        let mut event = Event::draft(self.subject, self.start, self.end);
        event.location = self.location;
        event
    }
}

/// Compile a quickadd line into a draft.
pub fn compile(text: &str, now: DateTime<Utc>, ctx: &TimezoneContext) -> OcalResult<QuickaddDraft> {
    let sep = find_separator(text).ok_or_else(|| {
        OcalError::QuickaddParse(format!("missing time clause in '{}'", text.trim()))
    })?;

    let (start, end) = parse_time_clause(&text[..sep], now, ctx)?;

    let content = &text[sep + 1..];
    let (subject_raw, location_raw) = match find_location_marker(content) {
        Some(at) => (&content[..at], Some(&content[at + 1..])),
        None => (content, None),
    };

    let subject = unescape(subject_raw.trim());
    if subject.is_empty() {
        return Err(OcalError::QuickaddParse(format!(
            "empty subject in '{}'",
            text.trim()
        )));
    }

    let location = location_raw
        .map(|loc| unescape(loc.trim()))
        .filter(|loc| !loc.is_empty());

    Ok(QuickaddDraft {
        subject,
        location,
        start,
        end,
    })
}

/// Resolve the time clause into start/end instants.
///
/// Shape: `[<date token>] <clock token> [for <duration>]`. The date token
/// may span two words (`next friday`) and defaults to `today`; without a
/// duration the event runs one hour.
fn parse_time_clause(
    clause: &str,
    now: DateTime<Utc>,
    ctx: &TimezoneContext,
) -> OcalResult<(DateTime<Utc>, DateTime<Utc>)> {
    let mut tokens: Vec<&str> = clause.split_whitespace().collect();

    let mut duration = Duration::hours(1);
    if let Some(pos) = tokens.iter().position(|t| t.eq_ignore_ascii_case("for")) {
        let dur_text = tokens[pos + 1..].join(" ");
        let std_dur = humantime::parse_duration(&dur_text).map_err(|_| {
            OcalError::QuickaddParse(format!("unparseable duration '{}'", dur_text))
        })?;
        duration = Duration::from_std(std_dur)
            .map_err(|_| OcalError::QuickaddParse(format!("duration '{}' too large", dur_text)))?;
        if duration <= Duration::zero() {
            return Err(OcalError::QuickaddParse(format!(
                "duration '{}' is empty",
                dur_text
            )));
        }
        tokens.truncate(pos);
    }

    let clock_token = tokens.pop().ok_or_else(|| {
        OcalError::QuickaddParse(format!("missing time clause in '{}'", clause.trim()))
    })?;
    let (hour, minute) = resolve_time_of_day(clock_token)?;

    let date = if tokens.is_empty() {
        resolve_relative_date("today", now, ctx.effective())?
    } else {
        resolve_relative_date(&tokens.join(" "), now, ctx.effective())?
    };

    // Hour and minute were range-checked by the clock resolver.
    let naive = date.and_hms_opt(hour, minute, 0).unwrap();
    let start = ctx.localize_utc(naive)?;

    Ok((start, start + duration))
}

/// First unescaped `:` that is not interior to a clock token (flanked by
/// digits on both sides), or None.
fn find_separator(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b':' {
            continue;
        }
        if i > 0 && bytes[i - 1] == b'\\' {
            continue;
        }
        let digit_before = i > 0 && bytes[i - 1].is_ascii_digit();
        let digit_after = i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit();
        if digit_before && digit_after {
            continue;
        }
        return Some(i);
    }
    None
}

/// Last unescaped `@` in the content clause, or None.
fn find_location_marker(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    (0..bytes.len())
        .rev()
        .find(|&i| bytes[i] == b'@' && !(i > 0 && bytes[i - 1] == b'\\'))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some(':' | '@' | '\\')) {
            // Drop the backslash, keep the escaped character.
            continue;
        }
        out.push(c);
    }
    out
}

//! Timezone resolution.
//!
//! Promotes naive clock times to absolute instants under the
//! override > configured > system precedence, derives all-day boundaries,
//! and passes explicit-offset datetimes through untouched. Localization
//! always uses the zone's rule for the specific date, so DST gaps surface
//! as errors instead of silently shifting.

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{OcalError, OcalResult};

/// The timezones in play for one command invocation.
///
/// Exactly one of the three is selected by [`TimezoneContext::effective`];
/// there is no merging. Built once per invocation, read-only after.
#[derive(Debug, Clone)]
pub struct TimezoneContext {
    pub system: Tz,
    pub configured: Option<Tz>,
    pub override_tz: Option<Tz>,
}

impl TimezoneContext {
    pub fn new(system: Tz, configured: Option<Tz>, override_tz: Option<Tz>) -> Self {
        TimezoneContext {
            system,
            configured,
            override_tz,
        }
    }

    /// Override > configured > system.
    pub fn effective(&self) -> Tz {
        self.override_tz.or(self.configured).unwrap_or(self.system)
    }

    /// Promote a naive datetime to an instant in the effective zone.
    ///
    /// A repeated local hour (DST fold) resolves to the earlier instant; a
    /// skipped hour (DST gap) is an error.
    pub fn localize(&self, naive: NaiveDateTime) -> OcalResult<DateTime<Tz>> {
        let tz = self.effective();
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(earlier, _) => Ok(earlier),
            LocalResult::None => Err(OcalError::InvalidLocalTime(
                naive.to_string(),
                tz.name().to_string(),
            )),
        }
    }

    pub fn localize_utc(&self, naive: NaiveDateTime) -> OcalResult<DateTime<Utc>> {
        Ok(self.localize(naive)?.with_timezone(&Utc))
    }

    /// Instant boundaries of an all-day span: local midnight of `first`
    /// through local midnight of the day after `last` (end exclusive), so a
    /// single-day event covers exactly one local day.
    pub fn all_day_span(
        &self,
        first: NaiveDate,
        last: NaiveDate,
    ) -> OcalResult<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.localize_utc(midnight(first))?;
        let end = self.localize_utc(midnight(last + Duration::days(1)))?;
        Ok((start, end))
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap()
}

/// Look up an IANA timezone by name.
pub fn parse_tz(name: &str) -> OcalResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| OcalError::Config(format!("unknown timezone '{}'", name)))
}

/// A parsed user-supplied instant, remembering whether the input carried
/// its own UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct ParsedInstant {
    pub instant: DateTime<Utc>,
    pub offset: Option<FixedOffset>,
}

/// Parse a datetime string.
///
/// RFC 3339 input with an explicit offset is passed through unchanged and
/// never re-localized; naive `YYYY-MM-DDTHH:MM[:SS]` input is localized via
/// the context.
pub fn parse_instant(text: &str, ctx: &TimezoneContext) -> OcalResult<ParsedInstant> {
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ParsedInstant {
            instant: dt.with_timezone(&Utc),
            offset: Some(*dt.offset()),
        });
    }

    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|_| OcalError::UnrecognizedDate(trimmed.to_string()))?;

    Ok(ParsedInstant {
        instant: ctx.localize_utc(naive)?,
        offset: None,
    })
}

/// Parse a calendar date (`YYYY-MM-DD`).
pub fn parse_date(text: &str) -> OcalResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| OcalError::UnrecognizedDate(text.trim().to_string()))
}

/// Resolve a start/end pair for a single event edit.
///
/// When both inputs carry explicit offsets they must agree; there is no
/// rule for reconciling two different offsets in one edit.
pub fn resolve_span(
    start_text: &str,
    end_text: &str,
    ctx: &TimezoneContext,
) -> OcalResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = parse_instant(start_text, ctx)?;
    let end = parse_instant(end_text, ctx)?;

    if let (Some(start_off), Some(end_off)) = (start.offset, end.offset) {
        if start_off != end_off {
            return Err(OcalError::AmbiguousLocalization(
                start_text.trim().to_string(),
                end_text.trim().to_string(),
            ));
        }
    }

    Ok((start.instant, end.instant))
}

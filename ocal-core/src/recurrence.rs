//! Recurrence model and its two external encodings.
//!
//! The model is deliberately restricted to the DAILY/WEEKLY subset. Both
//! decoders are strict: any construct outside the subset rejects the whole
//! input instead of silently dropping the clause, because a partially
//! parsed rule would schedule something the user did not ask for.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{OcalError, OcalResult};

/// How often the event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    fn rrule_token(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
        }
    }

    fn pattern_type(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }
}

/// Weekday token for BYDAY sets.
///
/// Declaration order is Monday-first, so a `BTreeSet<ByDay>` iterates in
/// the canonical order both encodings emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ByDay {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl ByDay {
    fn rrule_token(self) -> &'static str {
        match self {
            ByDay::Mo => "MO",
            ByDay::Tu => "TU",
            ByDay::We => "WE",
            ByDay::Th => "TH",
            ByDay::Fr => "FR",
            ByDay::Sa => "SA",
            ByDay::Su => "SU",
        }
    }

    fn from_rrule(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "MO" => Some(ByDay::Mo),
            "TU" => Some(ByDay::Tu),
            "WE" => Some(ByDay::We),
            "TH" => Some(ByDay::Th),
            "FR" => Some(ByDay::Fr),
            "SA" => Some(ByDay::Sa),
            "SU" => Some(ByDay::Su),
            _ => None,
        }
    }

    /// Day name used in the service's pattern payload.
    fn pattern_name(self) -> &'static str {
        match self {
            ByDay::Mo => "monday",
            ByDay::Tu => "tuesday",
            ByDay::We => "wednesday",
            ByDay::Th => "thursday",
            ByDay::Fr => "friday",
            ByDay::Sa => "saturday",
            ByDay::Su => "sunday",
        }
    }

    fn from_pattern_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "monday" => Some(ByDay::Mo),
            "tuesday" => Some(ByDay::Tu),
            "wednesday" => Some(ByDay::We),
            "thursday" => Some(ByDay::Th),
            "friday" => Some(ByDay::Fr),
            "saturday" => Some(ByDay::Sa),
            "sunday" => Some(ByDay::Su),
            _ => None,
        }
    }
}

/// A restricted recurrence rule.
///
/// `by_day` is meaningful only for weekly rules; an empty set means "the
/// same weekday as the event's start".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub interval: u32,
    pub by_day: BTreeSet<ByDay>,
}

impl Recurrence {
    pub fn daily(interval: u32) -> Self {
        Recurrence {
            frequency: Frequency::Daily,
            interval,
            by_day: BTreeSet::new(),
        }
    }

    pub fn weekly(interval: u32, by_day: BTreeSet<ByDay>) -> Self {
        Recurrence {
            frequency: Frequency::Weekly,
            interval,
            by_day,
        }
    }

    /// A daily rule never carries weekday tokens, and intervals are positive.
    pub fn validate(&self) -> OcalResult<()> {
        if self.interval == 0 {
            return Err(OcalError::UnsupportedRecurrence("INTERVAL=0".into()));
        }
        if self.frequency == Frequency::Daily && !self.by_day.is_empty() {
            return Err(OcalError::UnsupportedRecurrence(
                "BYDAY with FREQ=DAILY".into(),
            ));
        }
        Ok(())
    }
}

// --- RRULE text encoding ---

/// Emit the canonical RRULE text: `INTERVAL` omitted when 1, BYDAY
/// Monday-first regardless of how the set was built.
pub fn to_rrule_text(rec: &Recurrence) -> String {
    let mut out = format!("FREQ={}", rec.frequency.rrule_token());
    if rec.interval != 1 {
        out.push_str(&format!(";INTERVAL={}", rec.interval));
    }
    if rec.frequency == Frequency::Weekly && !rec.by_day.is_empty() {
        let days: Vec<&str> = rec.by_day.iter().map(|d| d.rrule_token()).collect();
        out.push_str(&format!(";BYDAY={}", days.join(",")));
    }
    out
}

/// Parse an RRULE-subset string. Unknown keys, duplicate keys, empty
/// clauses, and any value outside the DAILY/WEEKLY subset reject the whole
/// string.
pub fn from_rrule_text(text: &str) -> OcalResult<Recurrence> {
    let mut freq: Option<Frequency> = None;
    let mut interval: Option<u32> = None;
    let mut by_day: Option<BTreeSet<ByDay>> = None;

    for part in text.trim().split(';') {
        let part = part.trim();
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| OcalError::UnsupportedRecurrence(part.to_string()))?;

        match key.to_ascii_uppercase().as_str() {
            "FREQ" if freq.is_none() => {
                freq = Some(match value.to_ascii_uppercase().as_str() {
                    "DAILY" => Frequency::Daily,
                    "WEEKLY" => Frequency::Weekly,
                    _ => return Err(OcalError::UnsupportedRecurrence(part.to_string())),
                });
            }
            "INTERVAL" if interval.is_none() => {
                let n: u32 = value
                    .parse()
                    .map_err(|_| OcalError::UnsupportedRecurrence(part.to_string()))?;
                interval = Some(n);
            }
            "BYDAY" if by_day.is_none() => {
                let mut days = BTreeSet::new();
                for token in value.split(',') {
                    let day = ByDay::from_rrule(token.trim())
                        .ok_or_else(|| OcalError::UnsupportedRecurrence(token.to_string()))?;
                    days.insert(day);
                }
                by_day = Some(days);
            }
            // Duplicates fall through to rejection as well.
            _ => return Err(OcalError::UnsupportedRecurrence(part.to_string())),
        }
    }

    let frequency = freq.ok_or_else(|| OcalError::UnsupportedRecurrence(text.to_string()))?;
    let rec = Recurrence {
        frequency,
        interval: interval.unwrap_or(1),
        by_day: by_day.unwrap_or_default(),
    };
    rec.validate()?;
    Ok(rec)
}

// --- Service pattern payload encoding ---

/// The remote service's structured recurrence encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternPayload {
    pub pattern: WirePattern,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<WireRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePattern {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(rename = "daysOfWeek", skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRange {
    #[serde(rename = "type")]
    pub kind: String,
}

fn default_interval() -> u32 {
    1
}

pub fn to_wire_pattern(rec: &Recurrence) -> PatternPayload {
    let days_of_week = if rec.frequency == Frequency::Weekly && !rec.by_day.is_empty() {
        Some(rec.by_day.iter().map(|d| d.pattern_name().to_string()).collect())
    } else {
        None
    };

    PatternPayload {
        pattern: WirePattern {
            kind: rec.frequency.pattern_type().to_string(),
            interval: rec.interval,
            days_of_week,
        },
        range: Some(WireRange {
            kind: "noEnd".to_string(),
        }),
    }
}

/// Decode a pattern payload. Accepts only the DAILY/WEEKLY subset with an
/// open-ended range; a bounded range or an unknown pattern type rejects
/// the payload outright.
pub fn from_wire_pattern(payload: &PatternPayload) -> OcalResult<Recurrence> {
    let frequency = match payload.pattern.kind.to_ascii_lowercase().as_str() {
        "daily" => Frequency::Daily,
        "weekly" => Frequency::Weekly,
        other => return Err(OcalError::UnsupportedRecurrence(other.to_string())),
    };

    if let Some(ref range) = payload.range {
        if range.kind != "noEnd" {
            return Err(OcalError::UnsupportedRecurrence(format!(
                "range type '{}'",
                range.kind
            )));
        }
    }

    let mut by_day = BTreeSet::new();
    if let Some(ref names) = payload.pattern.days_of_week {
        for name in names {
            let day = ByDay::from_pattern_name(name)
                .ok_or_else(|| OcalError::UnsupportedRecurrence(name.clone()))?;
            by_day.insert(day);
        }
    }

    let rec = Recurrence {
        frequency,
        interval: payload.pattern.interval,
        by_day,
    };
    rec.validate()?;
    Ok(rec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekdays(days: &[ByDay]) -> BTreeSet<ByDay> {
        days.iter().copied().collect()
    }

    // --- RRULE round trips ---

    #[test]
    fn daily_rrule_roundtrip() {
        let rec = Recurrence::daily(1);
        let text = to_rrule_text(&rec);
        assert_eq!(text, "FREQ=DAILY");
        assert_eq!(from_rrule_text(&text).unwrap(), rec);
    }

    #[test]
    fn daily_with_interval_roundtrip() {
        let rec = Recurrence::daily(3);
        let text = to_rrule_text(&rec);
        assert_eq!(text, "FREQ=DAILY;INTERVAL=3");
        assert_eq!(from_rrule_text(&text).unwrap(), rec);
    }

    #[test]
    fn weekly_byday_roundtrip() {
        let rec = Recurrence::weekly(2, weekdays(&[ByDay::Mo, ByDay::We, ByDay::Fr]));
        let text = to_rrule_text(&rec);
        assert_eq!(text, "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE,FR");
        assert_eq!(from_rrule_text(&text).unwrap(), rec);
    }

    #[test]
    fn byday_order_is_canonical_monday_first() {
        let rec = from_rrule_text("FREQ=WEEKLY;BYDAY=FR,MO,SU").unwrap();
        assert_eq!(to_rrule_text(&rec), "FREQ=WEEKLY;BYDAY=MO,FR,SU");
    }

    #[test]
    fn interval_one_is_omitted_but_decodes_back() {
        let rec = Recurrence::weekly(1, weekdays(&[ByDay::Tu]));
        let text = to_rrule_text(&rec);
        assert!(!text.contains("INTERVAL"));
        assert_eq!(from_rrule_text(&text).unwrap().interval, 1);
    }

    // --- strict RRULE rejection ---

    #[test]
    fn monthly_is_rejected() {
        assert!(matches!(
            from_rrule_text("FREQ=MONTHLY;BYMONTHDAY=1"),
            Err(OcalError::UnsupportedRecurrence(_))
        ));
    }

    #[test]
    fn count_and_until_are_rejected() {
        assert!(from_rrule_text("FREQ=DAILY;COUNT=10").is_err());
        assert!(from_rrule_text("FREQ=WEEKLY;UNTIL=20260101T000000Z").is_err());
    }

    #[test]
    fn unknown_key_rejects_whole_string() {
        assert!(from_rrule_text("FREQ=WEEKLY;BYDAY=MO;WKST=SU").is_err());
    }

    #[test]
    fn duplicate_key_rejected() {
        assert!(from_rrule_text("FREQ=DAILY;FREQ=WEEKLY").is_err());
    }

    #[test]
    fn missing_freq_rejected() {
        assert!(from_rrule_text("INTERVAL=2").is_err());
    }

    #[test]
    fn empty_clause_rejected() {
        assert!(from_rrule_text("FREQ=DAILY;").is_err());
        assert!(from_rrule_text("").is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(from_rrule_text("FREQ=DAILY;INTERVAL=0").is_err());
    }

    #[test]
    fn byday_with_daily_rejected() {
        assert!(from_rrule_text("FREQ=DAILY;BYDAY=MO").is_err());
    }

    #[test]
    fn bad_weekday_token_rejected() {
        assert!(from_rrule_text("FREQ=WEEKLY;BYDAY=MO,XX").is_err());
    }

    // --- pattern payload ---

    #[test]
    fn pattern_roundtrip_weekly() {
        let rec = Recurrence::weekly(2, weekdays(&[ByDay::Mo, ByDay::Th]));
        let payload = to_wire_pattern(&rec);
        assert_eq!(payload.pattern.kind, "weekly");
        assert_eq!(
            payload.pattern.days_of_week,
            Some(vec!["monday".to_string(), "thursday".to_string()])
        );
        assert_eq!(from_wire_pattern(&payload).unwrap(), rec);
    }

    #[test]
    fn pattern_roundtrip_daily() {
        let rec = Recurrence::daily(4);
        let payload = to_wire_pattern(&rec);
        assert_eq!(payload.pattern.kind, "daily");
        assert_eq!(payload.pattern.days_of_week, None);
        assert_eq!(from_wire_pattern(&payload).unwrap(), rec);
    }

    #[test]
    fn pattern_unknown_type_rejected() {
        let mut payload = to_wire_pattern(&Recurrence::daily(1));
        payload.pattern.kind = "absoluteMonthly".into();
        assert!(matches!(
            from_wire_pattern(&payload),
            Err(OcalError::UnsupportedRecurrence(_))
        ));
    }

    #[test]
    fn pattern_bounded_range_rejected() {
        let mut payload = to_wire_pattern(&Recurrence::daily(1));
        payload.range = Some(WireRange {
            kind: "endDate".into(),
        });
        assert!(from_wire_pattern(&payload).is_err());
    }

    #[test]
    fn pattern_unknown_weekday_rejected() {
        let mut payload = to_wire_pattern(&Recurrence::weekly(1, weekdays(&[ByDay::Mo])));
        payload.pattern.days_of_week = Some(vec!["someday".into()]);
        assert!(from_wire_pattern(&payload).is_err());
    }

    #[test]
    fn pattern_missing_range_is_open_ended() {
        let mut payload = to_wire_pattern(&Recurrence::daily(2));
        payload.range = None;
        assert_eq!(from_wire_pattern(&payload).unwrap(), Recurrence::daily(2));
    }
}

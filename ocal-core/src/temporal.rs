//! Relative-date and clock-time token resolution.
//!
//! Resolves words like `tomorrow`, `friday`, or `next tuesday` into calendar
//! dates relative to a caller-supplied "now", and clock tokens like `4pm` or
//! `9:30` into hour/minute pairs. All resolution is pure; the current
//! instant and timezone always come in as parameters.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{OcalError, OcalResult};

/// Resolve a relative date token against the local date of `now` in `tz`.
///
/// Recognized (case-insensitive): `today`, `yesterday`, `tomorrow`, full or
/// abbreviated weekday names, `this <weekday>`, `next <weekday>`.
///
/// A bare weekday is the next occurrence strictly after today: on a
/// Wednesday, `wednesday` means a week from today, never today itself.
/// `next <weekday>` lands one further week out than the bare token, so the
/// two never coincide. `this <weekday>` stays within the coming seven days
/// and may be today.
pub fn resolve_relative_date(token: &str, now: DateTime<Utc>, tz: Tz) -> OcalResult<NaiveDate> {
    let today = now.with_timezone(&tz).date_naive();
    let lower = token.trim().to_lowercase();

    match lower.as_str() {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        "tomorrow" => return Ok(today + Duration::days(1)),
        _ => {}
    }

    let (modifier, day_str) = if let Some(rest) = lower.strip_prefix("next ") {
        (Modifier::Next, rest.trim())
    } else if let Some(rest) = lower.strip_prefix("this ") {
        (Modifier::This, rest.trim())
    } else {
        (Modifier::Bare, lower.as_str())
    };

    let target = parse_weekday_name(day_str)
        .ok_or_else(|| OcalError::UnrecognizedDate(token.trim().to_string()))?;

    let diff = i64::from(target.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday());
    let upcoming = (diff + 7) % 7; // 0..=6, 0 = today

    let days_ahead = match modifier {
        Modifier::This => upcoming,
        Modifier::Bare => {
            if upcoming == 0 {
                7
            } else {
                upcoming
            }
        }
        Modifier::Next => {
            let bare = if upcoming == 0 { 7 } else { upcoming };
            bare + 7
        }
    };

    Ok(today + Duration::days(days_ahead))
}

enum Modifier {
    Bare,
    This,
    Next,
}

fn parse_weekday_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Resolve a clock token into `(hour, minute)` in 24-hour form.
///
/// Accepts `H:MM` (24-hour), `Ham/pm`, and `H:MMam/pm`, case-insensitive,
/// with optional space before the marker. A bare hour without a marker is
/// ambiguous ("4" could be 04:00 or 16:00) and is rejected.
pub fn resolve_time_of_day(token: &str) -> OcalResult<(u32, u32)> {
    let trimmed = token.trim();
    let lower = trimmed.to_ascii_lowercase();

    let (digits, meridiem) = if let Some(rest) = lower.strip_suffix("am") {
        (rest.trim_end(), Some(Meridiem::Am))
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest.trim_end(), Some(Meridiem::Pm))
    } else {
        (lower.as_str(), None)
    };

    let unrecognized = || OcalError::UnrecognizedDate(trimmed.to_string());

    if let Some((hour_str, minute_str)) = digits.split_once(':') {
        let hour: u32 = hour_str.parse().map_err(|_| unrecognized())?;
        let minute: u32 = minute_str.parse().map_err(|_| unrecognized())?;
        if minute > 59 {
            return Err(unrecognized());
        }
        match meridiem {
            Some(m) => {
                if !(1..=12).contains(&hour) {
                    return Err(unrecognized());
                }
                Ok((m.to_24h(hour), minute))
            }
            None => {
                if hour > 23 {
                    return Err(unrecognized());
                }
                Ok((hour, minute))
            }
        }
    } else {
        let hour: u32 = digits.parse().map_err(|_| unrecognized())?;
        match meridiem {
            Some(m) => {
                if !(1..=12).contains(&hour) {
                    return Err(unrecognized());
                }
                Ok((m.to_24h(hour), 0))
            }
            None => Err(OcalError::AmbiguousTime(trimmed.to_string())),
        }
    }
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn to_24h(self, hour: u32) -> u32 {
        match self {
            Meridiem::Am => {
                if hour == 12 {
                    0
                } else {
                    hour
                }
            }
            Meridiem::Pm => {
                if hour == 12 {
                    12
                } else {
                    hour + 12
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::UTC;

    /// 2025-01-15 was a Wednesday.
    fn wednesday_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // --- relative dates ---

    #[test]
    fn today_tomorrow_yesterday() {
        let now = wednesday_now();
        assert_eq!(
            resolve_relative_date("today", now, UTC).unwrap(),
            date(2025, 1, 15)
        );
        assert_eq!(
            resolve_relative_date("Tomorrow", now, UTC).unwrap(),
            date(2025, 1, 16)
        );
        assert_eq!(
            resolve_relative_date("yesterday", now, UTC).unwrap(),
            date(2025, 1, 14)
        );
    }

    #[test]
    fn bare_weekday_is_strictly_in_the_future() {
        let now = wednesday_now();
        // Same weekday as today resolves to next week, not today.
        assert_eq!(
            resolve_relative_date("wednesday", now, UTC).unwrap(),
            date(2025, 1, 22)
        );
        assert_eq!(
            resolve_relative_date("thursday", now, UTC).unwrap(),
            date(2025, 1, 16)
        );
        assert_eq!(
            resolve_relative_date("tuesday", now, UTC).unwrap(),
            date(2025, 1, 21)
        );
    }

    #[test]
    fn next_weekday_is_a_week_beyond_bare() {
        let now = wednesday_now();
        assert_eq!(
            resolve_relative_date("next wednesday", now, UTC).unwrap(),
            date(2025, 1, 29)
        );
        assert_eq!(
            resolve_relative_date("next thursday", now, UTC).unwrap(),
            date(2025, 1, 23)
        );
        // Never coincides with the bare-token result.
        let bare = resolve_relative_date("wednesday", now, UTC).unwrap();
        let next = resolve_relative_date("next wednesday", now, UTC).unwrap();
        assert_ne!(bare, next);
    }

    #[test]
    fn this_weekday_can_be_today() {
        let now = wednesday_now();
        assert_eq!(
            resolve_relative_date("this wednesday", now, UTC).unwrap(),
            date(2025, 1, 15)
        );
        assert_eq!(
            resolve_relative_date("this friday", now, UTC).unwrap(),
            date(2025, 1, 17)
        );
    }

    #[test]
    fn abbreviations_and_case() {
        let now = wednesday_now();
        assert_eq!(
            resolve_relative_date("FRI", now, UTC).unwrap(),
            date(2025, 1, 17)
        );
        assert_eq!(
            resolve_relative_date("next Tues", now, UTC).unwrap(),
            date(2025, 1, 28)
        );
    }

    #[test]
    fn local_date_depends_on_timezone() {
        // 2025-01-15T03:00Z is still Jan 14 in Los Angeles.
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 3, 0, 0).unwrap();
        assert_eq!(
            resolve_relative_date("today", now, chrono_tz::America::Los_Angeles).unwrap(),
            date(2025, 1, 14)
        );
    }

    #[test]
    fn unknown_token_carries_fragment() {
        let err = resolve_relative_date("somedaysoon", wednesday_now(), UTC).unwrap_err();
        match err {
            OcalError::UnrecognizedDate(tok) => assert_eq!(tok, "somedaysoon"),
            other => panic!("unexpected error: {other}"),
        }
    }

    // --- time of day ---

    #[test]
    fn am_pm_hours() {
        assert_eq!(resolve_time_of_day("4pm").unwrap(), (16, 0));
        assert_eq!(resolve_time_of_day("9am").unwrap(), (9, 0));
        assert_eq!(resolve_time_of_day("12am").unwrap(), (0, 0));
        assert_eq!(resolve_time_of_day("12pm").unwrap(), (12, 0));
        assert_eq!(resolve_time_of_day("4:45PM").unwrap(), (16, 45));
        assert_eq!(resolve_time_of_day("10 am").unwrap(), (10, 0));
    }

    #[test]
    fn twenty_four_hour_form() {
        assert_eq!(resolve_time_of_day("9:30").unwrap(), (9, 30));
        assert_eq!(resolve_time_of_day("16:05").unwrap(), (16, 5));
        assert_eq!(resolve_time_of_day("0:00").unwrap(), (0, 0));
    }

    #[test]
    fn bare_hour_is_ambiguous() {
        assert!(matches!(
            resolve_time_of_day("4"),
            Err(OcalError::AmbiguousTime(_))
        ));
        assert!(matches!(
            resolve_time_of_day("16"),
            Err(OcalError::AmbiguousTime(_))
        ));
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(resolve_time_of_day("25:00").is_err());
        assert!(resolve_time_of_day("9:75").is_err());
        assert!(resolve_time_of_day("13pm").is_err());
        assert!(resolve_time_of_day("0pm").is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(resolve_time_of_day("noonish").is_err());
        assert!(resolve_time_of_day(":30").is_err());
        assert!(resolve_time_of_day("4:xx").is_err());
    }
}

//! Natural-language time normalization for visit scheduling.
//!
//! The extractor hands over loose phrases like "tomorrow 3 PM",
//! "October 3 3 PM", or an ISO string; this module resolves them against
//! the current moment in a configured IANA timezone and yields a naive
//! wall-clock timestamp. Callers format it with [`to_canonical`].

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

/// Injected date-parsing capability. `None` means "could not parse";
/// the caller decides what to do with the raw phrase.
pub trait TimeParser: Send + Sync {
    fn parse_phrase(&self, phrase: &str, now: DateTime<Utc>) -> Option<NaiveDateTime>;
}

/// Canonical ISO-8601 rendering of a resolved timestamp.
pub fn to_canonical(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Deterministic phrase parser covering the phrasing the visit-schedule
/// patterns can produce. Relative days resolve in `tz`.
#[derive(Debug, Clone)]
pub struct NaturalTimeParser {
    tz: Tz,
}

impl Default for NaturalTimeParser {
    fn default() -> Self {
        Self { tz: chrono_tz::UTC }
    }
}

impl NaturalTimeParser {
    /// Build from an IANA timezone name like "Asia/Kolkata".
    pub fn new(tz: &str) -> Result<Self> {
        let tz: Tz = tz
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
        Ok(Self { tz })
    }

    fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }
}

impl TimeParser for NaturalTimeParser {
    fn parse_phrase(&self, phrase: &str, now: DateTime<Utc>) -> Option<NaiveDateTime> {
        let phrase = phrase.trim();

        // Already-absolute forms first.
        if let Ok(dt) = NaiveDateTime::parse_from_str(phrase, "%Y-%m-%dT%H:%M:%S") {
            return Some(dt);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(phrase) {
            // Keep the stated wall clock; the offset is not ours to resolve.
            return Some(dt.naive_local());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(phrase, "%Y-%m-%d %H:%M") {
            return Some(dt);
        }

        let tokens: Vec<String> = phrase
            .split_whitespace()
            .map(|t| t.trim_matches(',').to_lowercase())
            .filter(|t| !t.is_empty() && t != "at")
            .collect();
        let first = tokens.first()?;

        // "October 3 3 PM"
        if let Some(month) = month_number(first) {
            let day: u32 = tokens.get(1)?.parse().ok()?;
            let year = self.today(now).year();
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            let time = parse_clock(&tokens[2..])?;
            return Some(date.and_time(time));
        }

        // "tomorrow 3 PM", "friday 17:00"
        if let Some(offset) = relative_day_offset(first, self.today(now)) {
            let date = self.today(now) + Duration::days(offset);
            let time = parse_clock(&tokens[1..])?;
            return Some(date.and_time(time));
        }

        // Bare clock resolves to today.
        let time = parse_clock(&tokens)?;
        Some(self.today(now).and_time(time))
    }
}

/// Day offset from today for "today"/"tomorrow"/weekday names. A bare
/// weekday means its next strictly-future occurrence.
fn relative_day_offset(token: &str, today: NaiveDate) -> Option<i64> {
    match token {
        "today" => return Some(0),
        "tomorrow" => return Some(1),
        _ => {}
    }
    let target = match token {
        "monday" => Weekday::Mon,
        "tuesday" => Weekday::Tue,
        "wednesday" => Weekday::Wed,
        "thursday" => Weekday::Thu,
        "friday" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        "sunday" => Weekday::Sun,
        _ => return None,
    };
    let ahead = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    Some(if ahead == 0 { 7 } else { ahead })
}

fn month_number(token: &str) -> Option<u32> {
    let months = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    months.iter().position(|m| *m == token).map(|i| i as u32 + 1)
}

/// Parse clock tokens like ["3", "pm"], ["3:30pm"], or ["15:00"].
fn parse_clock(tokens: &[String]) -> Option<NaiveTime> {
    if tokens.is_empty() {
        return None;
    }
    let joined = tokens.join("");
    let (digits, meridiem) = if let Some(rest) = joined.strip_suffix("pm") {
        (rest.trim().to_string(), Some("pm"))
    } else if let Some(rest) = joined.strip_suffix("am") {
        (rest.trim().to_string(), Some("am"))
    } else {
        (joined, None)
    };

    let (hour_s, minute_s) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None => (digits.as_str(), "0"),
    };
    let mut hour: u32 = hour_s.trim().parse().ok()?;
    let minute: u32 = minute_s.trim().parse().ok()?;

    match meridiem {
        Some("pm") if hour < 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(iso: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S")
            .expect("valid test timestamp")
            .and_utc()
    }

    fn parser() -> NaturalTimeParser {
        NaturalTimeParser::default()
    }

    #[test]
    fn test_iso_passthrough() {
        let dt = parser()
            .parse_phrase("2025-10-03T10:00:00", at("2025-10-03T09:00:00"))
            .unwrap();
        assert_eq!(to_canonical(&dt), "2025-10-03T10:00:00");
    }

    #[test]
    fn test_rfc3339_keeps_wall_clock() {
        let dt = parser()
            .parse_phrase("2025-10-02T17:00:00+05:30", at("2025-10-01T09:00:00"))
            .unwrap();
        assert_eq!(to_canonical(&dt), "2025-10-02T17:00:00");
    }

    #[test]
    fn test_date_with_time() {
        let dt = parser()
            .parse_phrase("2025-10-03 15:00", at("2025-10-03T09:00:00"))
            .unwrap();
        assert_eq!(to_canonical(&dt), "2025-10-03T15:00:00");
    }

    #[test]
    fn test_month_name_day_time() {
        let dt = parser()
            .parse_phrase("October 3 3 PM", at("2025-06-01T09:00:00"))
            .unwrap();
        assert_eq!(to_canonical(&dt), "2025-10-03T15:00:00");
    }

    #[test]
    fn test_tomorrow_with_time() {
        let dt = parser()
            .parse_phrase("tomorrow 3 PM", at("2025-10-02T09:00:00"))
            .unwrap();
        assert_eq!(to_canonical(&dt), "2025-10-03T15:00:00");
    }

    #[test]
    fn test_weekday_is_strictly_future() {
        // 2025-10-03 is a Friday; "friday" must mean the next one.
        let dt = parser()
            .parse_phrase("friday 10:00", at("2025-10-03T09:00:00"))
            .unwrap();
        assert_eq!(to_canonical(&dt), "2025-10-10T10:00:00");
    }

    #[test]
    fn test_bare_clock_is_today() {
        let dt = parser()
            .parse_phrase("15:30", at("2025-10-03T09:00:00"))
            .unwrap();
        assert_eq!(to_canonical(&dt), "2025-10-03T15:30:00");
    }

    #[test]
    fn test_meridiem_edges() {
        assert_eq!(
            parse_clock(&["12".into(), "am".into()]).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_clock(&["12".into(), "pm".into()]).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unparseable_is_none() {
        assert!(parser()
            .parse_phrase("sometime soon", at("2025-10-03T09:00:00"))
            .is_none());
    }
}

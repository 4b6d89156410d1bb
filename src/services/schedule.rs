use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Parse a free-form duration string from the CMS into whole seconds.
///
/// Editors enter durations in several shapes, so the policy is:
/// - `H:MM` or `H:MM:SS` is read literally as hours:minutes[:seconds].
/// - A bare number up to and including 24 is read as hours (fractions
///   allowed, rounded to the nearest second).
/// - A bare number above 24 is read as minutes ("90" is an hour and a half,
///   not ninety hours).
/// - Anything unparseable, negative, or missing is 0.
pub fn parse_duration_to_seconds(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else { return 0 };
    let s = raw.trim();
    if s.is_empty() {
        return 0;
    }

    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return 0;
        }
        let mut fields = Vec::with_capacity(parts.len());
        for part in &parts {
            match part.trim().parse::<i64>() {
                Ok(n) if n >= 0 => fields.push(n),
                _ => return 0,
            }
        }
        let hours = fields[0];
        let minutes = fields[1];
        let seconds = if fields.len() == 3 { fields[2] } else { 0 };
        return hours * 3600 + minutes * 60 + seconds;
    }

    match s.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => {
            if n <= 24.0 {
                (n * 3600.0).round() as i64
            } else {
                (n * 60.0).round() as i64
            }
        }
        _ => 0,
    }
}

/// Combine the broadcast date and time metadata fields into a UTC instant.
///
/// The date field is usually `YYYY-MM-DD`, but full RFC3339 stamps pasted
/// from other tools are accepted too (the separate time field is ignored in
/// that case). A missing time means midnight. Returns None when the date is
/// missing or unparseable.
pub fn broadcast_start(date: Option<&str>, time: Option<&str>) -> Option<DateTime<Utc>> {
    let date = date?.trim();
    if date.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }

    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let at = time
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .and_then(|t| {
            NaiveTime::parse_from_str(t, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
                .ok()
        })
        .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());

    Some(Utc.from_utc_datetime(&day.and_time(at)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn bare_numbers_up_to_24_are_hours() {
        assert_eq!(parse_duration_to_seconds(Some("4")), 14400);
        assert_eq!(parse_duration_to_seconds(Some("1.5")), 5400);
        assert_eq!(parse_duration_to_seconds(Some("24")), 86400);
    }

    #[test]
    fn bare_numbers_above_24_are_minutes() {
        assert_eq!(parse_duration_to_seconds(Some("25")), 1500);
        assert_eq!(parse_duration_to_seconds(Some("90")), 5400);
    }

    #[test]
    fn colon_forms_are_literal() {
        assert_eq!(parse_duration_to_seconds(Some("04:00")), 14400);
        assert_eq!(parse_duration_to_seconds(Some("02:30")), 9000);
        assert_eq!(parse_duration_to_seconds(Some("01:00:00")), 3600);
    }

    #[test]
    fn unparseable_input_is_zero() {
        assert_eq!(parse_duration_to_seconds(None), 0);
        assert_eq!(parse_duration_to_seconds(Some("")), 0);
        assert_eq!(parse_duration_to_seconds(Some("   ")), 0);
        assert_eq!(parse_duration_to_seconds(Some("abc")), 0);
        assert_eq!(parse_duration_to_seconds(Some("1:xx")), 0);
        assert_eq!(parse_duration_to_seconds(Some("1:2:3:4")), 0);
        assert_eq!(parse_duration_to_seconds(Some("-5")), 0);
    }

    #[test]
    fn fractional_hours_round_to_nearest_second() {
        // 0.001 h = 3.6 s
        assert_eq!(parse_duration_to_seconds(Some("0.001")), 4);
    }

    #[test]
    fn date_and_time_combine_to_utc() {
        let start = broadcast_start(Some("2024-06-01"), Some("22:00")).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-06-01T22:00:00+00:00");
    }

    #[test]
    fn missing_time_means_midnight() {
        let start = broadcast_start(Some("2024-06-01"), None).unwrap();
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
    }

    #[test]
    fn rfc3339_dates_pass_through() {
        let start = broadcast_start(Some("2024-06-01T20:30:00Z"), Some("22:00")).unwrap();
        assert_eq!(start.hour(), 20);
        assert_eq!(start.minute(), 30);
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert!(broadcast_start(None, Some("22:00")).is_none());
        assert!(broadcast_start(Some(""), None).is_none());
        assert!(broadcast_start(Some("June 1st"), None).is_none());
    }
}

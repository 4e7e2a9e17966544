use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a timestamp from the API. Accepts RFC 3339 and naive ISO 8601
/// (`2024-05-01T10:00:00`, `2024-05-01 10:00:00.123`), the latter taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Human-readable age of `raw` relative to `now`. Unparseable input is returned as-is.
pub fn format_relative_time(raw: &str, now: DateTime<Utc>) -> String {
    let Some(dt) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let secs = (now - dt).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m ago", mins);
    }
    let hours = secs / 3600;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = secs / 86_400;
    if days < 7 {
        return format!("{}d ago", days);
    }
    if days < 30 {
        return format!("{}w ago", days / 7);
    }
    dt.format("%Y-%m-%d").to_string()
}

/// Absolute timestamp for detail views, e.g. `2024-05-01 10:00:00 UTC`.
pub fn format_absolute_time(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-05-10T14:00:00+02:00").unwrap();
        assert_eq!(dt, now());
    }

    #[test]
    fn test_parse_naive_as_utc() {
        assert_eq!(parse_timestamp("2024-05-10T12:00:00").unwrap(), now());
        assert_eq!(
            parse_timestamp("2024-05-10 12:00:00.250").unwrap().timestamp(),
            now().timestamp()
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_relative_time_buckets() {
        assert_eq!(format_relative_time("2024-05-10T11:59:30Z", now()), "just now");
        assert_eq!(format_relative_time("2024-05-10T11:55:00Z", now()), "5m ago");
        assert_eq!(format_relative_time("2024-05-10T09:00:00Z", now()), "3h ago");
        assert_eq!(format_relative_time("2024-05-08T12:00:00Z", now()), "2d ago");
        assert_eq!(format_relative_time("2024-04-26T12:00:00Z", now()), "2w ago");
        assert_eq!(format_relative_time("2024-01-01T00:00:00Z", now()), "2024-01-01");
    }

    #[test]
    fn test_relative_time_future_is_just_now() {
        assert_eq!(format_relative_time("2024-05-10T12:05:00Z", now()), "just now");
    }

    #[test]
    fn test_relative_time_unparseable_passthrough() {
        assert_eq!(format_relative_time("T", now()), "T");
    }

    #[test]
    fn test_absolute_time() {
        assert_eq!(format_absolute_time("2024-05-10T12:00:00Z"), "2024-05-10 12:00:00 UTC");
        assert_eq!(format_absolute_time("n/a"), "n/a");
    }
}

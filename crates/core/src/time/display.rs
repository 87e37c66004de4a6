use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub const JUST_NOW: &str = "刚刚";
pub const UNKNOWN_TIME: &str = "时间未知";

const MINUTE_SECS: i64 = 60;
const HOUR_SECS: i64 = 3_600;
const DAY_SECS: i64 = 86_400;
const MONTH_SECS: i64 = 2_592_000;

pub fn parse_timestamp(s: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc));
    }

    DateTime::parse_from_rfc2822(t)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Relative label for `published_at` as seen at `now`.
///
/// Thresholds are literal: under a minute, under an hour, under a day, under
/// thirty days; anything older falls back to the calendar date.
pub fn time_ago(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>, offset: FixedOffset) -> String {
    let Some(published_at) = published_at else {
        return UNKNOWN_TIME.to_string();
    };

    let diff = now.signed_duration_since(published_at).num_seconds();
    if diff < MINUTE_SECS {
        JUST_NOW.to_string()
    } else if diff < HOUR_SECS {
        format!("{}分钟前", diff / MINUTE_SECS)
    } else if diff < DAY_SECS {
        format!("{}小时前", diff / HOUR_SECS)
    } else if diff < MONTH_SECS {
        format!("{}天前", diff / DAY_SECS)
    } else {
        calendar_date(published_at, offset)
    }
}

pub fn calendar_date(dt: DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format("%Y/%-m/%-d").to_string()
}

pub fn format_update_time(dt: DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset)
        .format("%Y/%-m/%-d %H:%M:%S")
        .to_string()
}

pub fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>, offset: FixedOffset) -> bool {
    a.with_timezone(&offset).date_naive() == b.with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn cst() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 23, 12, 0, 0).unwrap()
    }

    fn ago(secs: i64) -> String {
        time_ago(Some(now() - Duration::seconds(secs)), now(), cst())
    }

    #[test]
    fn time_ago_boundaries_are_literal() {
        assert_eq!(ago(0), "刚刚");
        assert_eq!(ago(59), "刚刚");
        assert_eq!(ago(60), "1分钟前");
        assert_eq!(ago(3_599), "59分钟前");
        assert_eq!(ago(3_600), "1小时前");
        assert_eq!(ago(86_399), "23小时前");
        assert_eq!(ago(86_400), "1天前");
        assert_eq!(ago(2_591_999), "29天前");
        // 2_592_000 s before 2025-10-23 12:00 UTC is 2025-09-23 12:00 UTC (20:00 CST).
        assert_eq!(ago(2_592_000), "2025/9/23");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        assert_eq!(ago(-300), "刚刚");
    }

    #[test]
    fn missing_timestamp_has_a_label() {
        assert_eq!(time_ago(None, now(), cst()), UNKNOWN_TIME);
    }

    #[test]
    fn parses_pipeline_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 10, 23, 2, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-10-23T02:00:00Z", cst()), Some(expected));
        assert_eq!(parse_timestamp("2025-10-23T10:00:00.123456", cst()).map(|d| d.timestamp()), Some(expected.timestamp()));
        assert_eq!(parse_timestamp("Thu, 23 Oct 2025 02:00:00 GMT", cst()), Some(expected));
        assert_eq!(parse_timestamp("not a date", cst()), None);
        assert_eq!(parse_timestamp("", cst()), None);
    }

    #[test]
    fn update_time_uses_display_offset() {
        let dt = Utc.with_ymd_and_hms(2025, 10, 22, 18, 5, 9).unwrap();
        assert_eq!(format_update_time(dt, cst()), "2025/10/23 02:05:09");
        assert!(same_local_day(dt, now(), cst()));
    }
}

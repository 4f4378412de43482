use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::core::error::{TimeServerError, TimeServerResult};

// Constants for format strings
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const WEEKDAY_FORMAT: &str = "%A";

/// Fallback timezone used when neither the CLI nor the request names one.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Shanghai;

/// Epoch values above this magnitude are millisecond timestamps (10 digits
/// cover seconds well past 2200; 13-digit values are milliseconds).
pub const EPOCH_MILLIS_THRESHOLD: i64 = 9_999_999_999;

/// Chinese weekday labels, indexed by days from Monday.
pub const WEEKDAYS_CN: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

/// Available resource URIs for the Time MCP Server
pub const AVAILABLE_RESOURCES: &[&str] = &["time://status", "time://help", "time://timezones"];

// Input formats tried in order: offset-carrying first, then naive date-times,
// then bare dates (interpreted as midnight). %.f tolerates a missing fraction.
const AWARE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Whether a trimmed input string is an integer epoch timestamp
/// rather than a date-time string.
pub fn is_epoch_string(input: &str) -> bool {
    let digits = input.strip_prefix('-').unwrap_or(input);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Reconstruct a UTC instant from an epoch value, auto-detecting
/// second vs millisecond resolution by magnitude.
pub fn epoch_to_utc(value: i64) -> TimeServerResult<DateTime<Utc>> {
    let parsed = if value.abs() > EPOCH_MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(value)
    } else {
        Utc.timestamp_opt(value, 0)
    };

    parsed.single().ok_or_else(|| TimeServerError::InvalidTimeInput {
        input: value.to_string(),
    })
}

/// Parse a date-time string into an aware value.
///
/// Strings carrying their own UTC offset fix the instant from that offset;
/// naive strings are interpreted as wall-clock time in `timezone`.
pub fn parse_datetime_str(input: &str, timezone: Tz) -> TimeServerResult<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&timezone));
    }

    for format in AWARE_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Ok(dt.with_timezone(&timezone));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return localize(naive, timezone, input);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return localize(date.and_time(NaiveTime::MIN), timezone, input);
        }
    }

    Err(TimeServerError::InvalidTimeInput {
        input: input.to_string(),
    })
}

fn localize(naive: NaiveDateTime, timezone: Tz, input: &str) -> TimeServerResult<DateTime<Tz>> {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        // A fall-back transition maps one wall-clock time to two instants; take the earliest.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        // Spring-forward gap: the wall-clock time does not exist in this timezone.
        LocalResult::None => Err(TimeServerError::InvalidTimeInput {
            input: input.to_string(),
        }),
    }
}

/// Look up the Chinese weekday label for an ISO weekday.
pub fn localized_weekday(weekday: Weekday) -> &'static str {
    WEEKDAYS_CN[weekday.num_days_from_monday() as usize]
}

/// Render a time with a caller-supplied strftime pattern.
///
/// The pattern is validated up front so an unsupported code is a structured
/// error instead of a panic inside `Display`.
pub fn render_with_pattern(dt: &DateTime<Tz>, pattern: &str) -> TimeServerResult<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(TimeServerError::InvalidFormatPattern {
            pattern: pattern.to_string(),
        });
    }

    Ok(dt.format_with_items(items.into_iter()).to_string())
}

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use rmcp::schemars;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::utils::{self, DATE_FORMAT, DATETIME_FORMAT, TIME_FORMAT, WEEKDAY_FORMAT};

/// Helper function to deserialize and trim strings
fn deserialize_trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

/// Helper function to deserialize and trim optional strings
fn deserialize_trimmed_string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()))
}

/// A time value as accepted on the wire: an epoch timestamp or date-time text.
///
/// Integers (and all-digit strings) are epoch timestamps, second or millisecond
/// resolution detected by magnitude. Anything else is parsed as a date-time string.
#[derive(Debug, Clone, PartialEq, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum TimeInput {
    /// Epoch timestamp in seconds or milliseconds
    Timestamp(i64),
    /// Date-time text, e.g. "2026-01-12", "2026-01-12 12:00:00", ISO 8601 with offset
    Text(String),
}

/// Signed calendar offset applied by `time_calculate`.
///
/// Years and months shift calendar units (with day-of-month clamping);
/// days and below shift a fixed duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimeOffset {
    /// Years to add (negative to subtract)
    #[serde(default)]
    pub years: i32,
    /// Months to add (negative to subtract)
    #[serde(default)]
    pub months: i32,
    /// Days to add (negative to subtract)
    #[serde(default)]
    pub days: i64,
    /// Hours to add (negative to subtract)
    #[serde(default)]
    pub hours: i64,
    /// Minutes to add (negative to subtract)
    #[serde(default)]
    pub minutes: i64,
    /// Seconds to add (negative to subtract)
    #[serde(default)]
    pub seconds: i64,
}

/// One time rendered in every standard output format
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimeResult {
    /// Civil date-time string, "YYYY-MM-DD HH:MM:SS"
    pub datetime: String,
    /// Date-only string, "YYYY-MM-DD"
    pub date: String,
    /// Time-only string, "HH:MM:SS"
    pub time: String,
    /// Epoch seconds
    pub timestamp: i64,
    /// Epoch milliseconds
    pub timestamp_ms: i64,
    /// IANA timezone name the civil fields are rendered in
    pub timezone: String,
    /// ISO 8601 / RFC 3339 string with numeric UTC offset
    pub iso: String,
    /// English weekday name
    pub weekday: String,
    /// Chinese weekday label
    pub weekday_cn: String,
}

impl TimeResult {
    /// Render a timezone-aware datetime into the standard result record
    pub fn from_datetime(dt: &DateTime<Tz>, timezone_name: &str) -> TimeResult {
        TimeResult {
            datetime: dt.format(DATETIME_FORMAT).to_string(),
            date: dt.format(DATE_FORMAT).to_string(),
            time: dt.format(TIME_FORMAT).to_string(),
            timestamp: dt.timestamp(),
            timestamp_ms: dt.timestamp_millis(),
            timezone: timezone_name.to_string(),
            iso: dt.to_rfc3339(),
            weekday: dt.format(WEEKDAY_FORMAT).to_string(),
            weekday_cn: utils::localized_weekday(dt.weekday()).to_string(),
        }
    }
}

/// Calculation result: the shifted time, the resolved base it was computed
/// from, and the offset that was applied
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimeCalculationResult {
    /// The shifted time in every standard format
    #[serde(flatten)]
    pub result: TimeResult,
    /// The resolved base time the offset was applied to
    pub base_time: TimeResult,
    /// The offset that was applied
    pub operation: TimeOffset,
}

/// Conversion result with source and target renderings of the same instant
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimezoneConversionResult {
    /// The input time rendered in the source timezone
    pub source: TimeResult,
    /// The same instant rendered in the target timezone
    pub target: TimeResult,
    /// Source IANA timezone name
    pub from_timezone: String,
    /// Target IANA timezone name
    pub to_timezone: String,
}

/// Timezone catalog listing
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimezoneListResult {
    /// Matching IANA timezone identifiers, catalog order
    pub timezones: Vec<String>,
    /// Number of identifiers returned
    pub count: usize,
    /// Usage hint for the region filter
    pub hint: String,
}

/// Request to get the current time
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetCurrentTimeRequest {
    /// IANA timezone name (e.g. 'Asia/Shanghai', 'America/New_York'); server default when omitted
    #[serde(default, deserialize_with = "deserialize_trimmed_string_opt")]
    pub timezone: Option<String>,
    /// Custom strftime output pattern, e.g. "%Y-%m-%d %H:%M:%S"; full record when omitted
    #[serde(default, deserialize_with = "deserialize_trimmed_string_opt")]
    pub format: Option<String>,
}

/// Request to shift a base time by a calendar offset
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TimeCalculateRequest {
    /// Base time: epoch seconds/milliseconds or date-time text; current time when omitted
    #[serde(default)]
    pub base_time: Option<TimeInput>,
    /// Offset fields (years, months, days, hours, minutes, seconds), each defaulting to zero
    #[serde(flatten)]
    pub offset: TimeOffset,
    /// IANA timezone name; server default when omitted
    #[serde(default, deserialize_with = "deserialize_trimmed_string_opt")]
    pub timezone: Option<String>,
}

/// Request to convert a time between timezones
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TimezoneConvertRequest {
    /// Time to convert: epoch seconds/milliseconds or date-time text (required)
    #[serde(default)]
    pub time: Option<TimeInput>,
    /// Target IANA timezone name
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    pub to_tz: String,
    /// Source IANA timezone name; server default when omitted
    #[serde(default, deserialize_with = "deserialize_trimmed_string_opt")]
    pub from_tz: Option<String>,
}

/// Request to list available timezones
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListTimezonesRequest {
    /// Area filter, e.g. "Asia", "America", "Europe"; full catalog when omitted
    #[serde(default, deserialize_with = "deserialize_trimmed_string_opt")]
    pub region: Option<String>,
}

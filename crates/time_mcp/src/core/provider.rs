use std::str::FromStr;

use chrono::{DateTime, Months, TimeDelta, Utc};
use chrono_tz::{TZ_VARIANTS, Tz};

use crate::core::{
    error::{TimeServerError, TimeServerResult},
    models::{
        TimeCalculationResult, TimeInput, TimeOffset, TimeResult, TimezoneConversionResult,
        TimezoneListResult,
    },
    utils::{self, DEFAULT_TIMEZONE},
};

const REGION_HINT: &str = "Filter with the region parameter, e.g. 'Asia', 'America', 'Europe'";

/// Time server implementation
#[derive(Clone)]
pub struct TimeServer {
    pub(crate) default_timezone: Tz,
    pub(crate) local_timezone: Tz,
}

impl TimeServer {
    pub fn new(default_timezone: Tz) -> Self {
        Self {
            default_timezone,
            local_timezone: Self::detect_local_timezone(),
        }
    }

    /// Try to detect the system's local timezone
    fn detect_local_timezone() -> Tz {
        match iana_time_zone::get_timezone() {
            Ok(tz_name) => match tz_name.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    tracing::warn!("Could not parse timezone '{}', defaulting to UTC", tz_name);
                    chrono_tz::UTC
                }
            },
            Err(_) => {
                tracing::warn!("Could not detect system timezone, defaulting to UTC");
                chrono_tz::UTC
            }
        }
    }

    pub(crate) fn parse_timezone(&self, timezone_name: &str) -> TimeServerResult<Tz> {
        Tz::from_str(timezone_name).map_err(|_| TimeServerError::InvalidTimezone {
            timezone: timezone_name.to_string(),
        })
    }

    fn resolve_timezone(&self, timezone_name: Option<&str>) -> TimeServerResult<Tz> {
        match timezone_name {
            Some(name) => self.parse_timezone(name),
            None => Ok(self.default_timezone),
        }
    }

    /// Coerce any supported input into one canonical timezone-aware value.
    ///
    /// `None` means "now". Integers and all-digit strings are epoch timestamps
    /// (seconds or milliseconds by magnitude); the instant is zone-independent
    /// and `timezone` is attached for display. Date-time strings are parsed per
    /// `utils::parse_datetime_str`.
    pub(crate) fn coerce_time(
        &self,
        input: Option<&TimeInput>,
        timezone: Tz,
    ) -> TimeServerResult<DateTime<Tz>> {
        let input = match input {
            None => return Ok(Utc::now().with_timezone(&timezone)),
            Some(input) => input,
        };

        match input {
            TimeInput::Timestamp(value) => Ok(utils::epoch_to_utc(*value)?.with_timezone(&timezone)),
            TimeInput::Text(text) => {
                let text = text.trim();
                if utils::is_epoch_string(text) {
                    let value =
                        text.parse::<i64>()
                            .map_err(|_| TimeServerError::InvalidTimeInput {
                                input: text.to_string(),
                            })?;
                    Ok(utils::epoch_to_utc(value)?.with_timezone(&timezone))
                } else {
                    utils::parse_datetime_str(text, timezone)
                }
            }
        }
    }

    /// Apply a signed offset to a base time.
    ///
    /// Years and months go first as one combined calendar shift so day-of-month
    /// clamping is well defined (Jan 31 + 1 month = Feb 28/29). Days, hours,
    /// minutes and seconds then apply as one fixed-duration shift. The result
    /// keeps the base's timezone.
    pub(crate) fn shift_time(
        base: DateTime<Tz>,
        offset: &TimeOffset,
    ) -> TimeServerResult<DateTime<Tz>> {
        let months = i64::from(offset.years) * 12 + i64::from(offset.months);
        let shifted = if months >= 0 {
            u32::try_from(months)
                .ok()
                .and_then(|months| base.checked_add_months(Months::new(months)))
        } else {
            u32::try_from(-months)
                .ok()
                .and_then(|months| base.checked_sub_months(Months::new(months)))
        }
        .ok_or_else(|| Self::offset_out_of_range(offset))?;

        let seconds =
            Self::offset_seconds(offset).ok_or_else(|| Self::offset_out_of_range(offset))?;
        let delta =
            TimeDelta::try_seconds(seconds).ok_or_else(|| Self::offset_out_of_range(offset))?;

        shifted
            .checked_add_signed(delta)
            .ok_or_else(|| Self::offset_out_of_range(offset))
    }

    fn offset_seconds(offset: &TimeOffset) -> Option<i64> {
        let days = offset.days.checked_mul(86_400)?;
        let hours = offset.hours.checked_mul(3_600)?;
        let minutes = offset.minutes.checked_mul(60)?;
        days.checked_add(hours)?
            .checked_add(minutes)?
            .checked_add(offset.seconds)
    }

    fn offset_out_of_range(offset: &TimeOffset) -> TimeServerError {
        TimeServerError::InvalidTimeInput {
            input: format!(
                "offset out of range: {}y {}mo {}d {}h {}m {}s",
                offset.years, offset.months, offset.days, offset.hours, offset.minutes,
                offset.seconds
            ),
        }
    }

    pub fn get_current_time(&self, timezone_name: Option<&str>) -> TimeServerResult<TimeResult> {
        let timezone = self.resolve_timezone(timezone_name)?;
        let current_time = Utc::now().with_timezone(&timezone);

        Ok(TimeResult::from_datetime(&current_time, timezone.name()))
    }

    pub fn format_current_time(
        &self,
        timezone_name: Option<&str>,
        pattern: &str,
    ) -> TimeServerResult<String> {
        let timezone = self.resolve_timezone(timezone_name)?;
        let current_time = Utc::now().with_timezone(&timezone);

        utils::render_with_pattern(&current_time, pattern)
    }

    pub fn calculate_time(
        &self,
        base_time: Option<&TimeInput>,
        offset: &TimeOffset,
        timezone_name: Option<&str>,
    ) -> TimeServerResult<TimeCalculationResult> {
        let timezone = self.resolve_timezone(timezone_name)?;
        let base = self.coerce_time(base_time, timezone)?;
        let shifted = Self::shift_time(base, offset)?;

        Ok(TimeCalculationResult {
            result: TimeResult::from_datetime(&shifted, timezone.name()),
            base_time: TimeResult::from_datetime(&base, timezone.name()),
            operation: offset.clone(),
        })
    }

    pub fn convert_timezone(
        &self,
        time: Option<&TimeInput>,
        from_tz: Option<&str>,
        to_tz: &str,
    ) -> TimeServerResult<TimezoneConversionResult> {
        let time = time.ok_or_else(|| TimeServerError::MissingRequiredInput {
            field: "time".to_string(),
        })?;
        let source_timezone = self.resolve_timezone(from_tz)?;
        let target_timezone = self.parse_timezone(to_tz)?;

        let source_time = self.coerce_time(Some(time), source_timezone)?;
        let target_time = source_time.with_timezone(&target_timezone);

        Ok(TimezoneConversionResult {
            source: TimeResult::from_datetime(&source_time, source_timezone.name()),
            target: TimeResult::from_datetime(&target_time, target_timezone.name()),
            from_timezone: source_timezone.name().to_string(),
            to_timezone: target_timezone.name().to_string(),
        })
    }

    /// List known IANA timezone identifiers, optionally narrowed to one area.
    ///
    /// The filter matches the area segment, so "Asia" selects `Asia/*` and a
    /// nested area like "America/Argentina" also works. No match is an empty
    /// list, not an error.
    pub fn list_timezones(&self, region: Option<&str>) -> TimezoneListResult {
        let timezones: Vec<String> = match region {
            Some(region) => {
                let prefix = format!("{region}/");
                TZ_VARIANTS
                    .iter()
                    .map(|tz| tz.name())
                    .filter(|name| *name == region || name.starts_with(&prefix))
                    .map(str::to_string)
                    .collect()
            }
            None => TZ_VARIANTS.iter().map(|tz| tz.name().to_string()).collect(),
        };

        TimezoneListResult {
            count: timezones.len(),
            timezones,
            hint: REGION_HINT.to_string(),
        }
    }
}

impl Default for TimeServer {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(input: &str) -> TimeInput {
        TimeInput::Text(input.to_string())
    }

    #[test]
    fn test_epoch_seconds_round_trip() {
        let server = TimeServer::default();
        let coerced = server
            .coerce_time(Some(&TimeInput::Timestamp(1_700_000_000)), chrono_tz::UTC)
            .unwrap();
        assert_eq!(coerced.timestamp(), 1_700_000_000);

        // The display timezone never moves the instant
        let in_tokyo = server
            .coerce_time(
                Some(&TimeInput::Timestamp(1_700_000_000)),
                chrono_tz::Asia::Tokyo,
            )
            .unwrap();
        assert_eq!(in_tokyo.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_epoch_millis_round_trip() {
        let server = TimeServer::default();
        let coerced = server
            .coerce_time(
                Some(&TimeInput::Timestamp(1_704_067_200_123)),
                chrono_tz::UTC,
            )
            .unwrap();
        assert_eq!(coerced.timestamp_millis(), 1_704_067_200_123);
    }

    #[test]
    fn test_numeric_string_equivalence() {
        let server = TimeServer::default();
        let from_number = server
            .coerce_time(Some(&TimeInput::Timestamp(1_700_000_000)), chrono_tz::UTC)
            .unwrap();
        let from_string = server
            .coerce_time(Some(&text("1700000000")), chrono_tz::UTC)
            .unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_absent_input_is_now() {
        let server = TimeServer::default();
        let before = Utc::now().timestamp();
        let coerced = server.coerce_time(None, chrono_tz::UTC).unwrap();
        let after = Utc::now().timestamp();
        assert!(coerced.timestamp() >= before && coerced.timestamp() <= after);
    }

    #[test]
    fn test_month_overflow_clamps() {
        let server = TimeServer::default();
        let result = server
            .calculate_time(
                Some(&text("2026-01-31")),
                &TimeOffset {
                    months: 1,
                    ..Default::default()
                },
                Some("UTC"),
            )
            .unwrap();
        assert_eq!(result.result.date, "2026-02-28");
        assert_eq!(result.base_time.date, "2026-01-31");
        assert_eq!(result.operation.months, 1);
    }

    #[test]
    fn test_subtract_month() {
        let server = TimeServer::default();
        let result = server
            .calculate_time(
                Some(&text("2026-01-01")),
                &TimeOffset {
                    months: -1,
                    ..Default::default()
                },
                Some("UTC"),
            )
            .unwrap();
        assert_eq!(result.result.date, "2025-12-01");
    }

    #[test]
    fn test_years_and_months_combine() {
        let server = TimeServer::default();
        let result = server
            .calculate_time(
                Some(&text("2026-01-31")),
                &TimeOffset {
                    years: 1,
                    months: 1,
                    ..Default::default()
                },
                Some("UTC"),
            )
            .unwrap();
        // 13 months from Jan 31 lands on Feb 28 of the year after next
        assert_eq!(result.result.date, "2027-02-28");
    }

    #[test]
    fn test_duration_offsets_invert() {
        let server = TimeServer::default();
        let base = server
            .coerce_time(Some(&text("2026-03-15 10:30:00")), chrono_tz::UTC)
            .unwrap();
        let forward = TimeOffset {
            days: 3,
            hours: 5,
            minutes: 20,
            seconds: 11,
            ..Default::default()
        };
        let backward = TimeOffset {
            days: -3,
            hours: -5,
            minutes: -20,
            seconds: -11,
            ..Default::default()
        };

        let there = TimeServer::shift_time(base, &forward).unwrap();
        let back = TimeServer::shift_time(there, &backward).unwrap();
        assert_eq!(back, base);
    }

    #[test]
    fn test_zero_offset_is_noop() {
        let server = TimeServer::default();
        let base = server
            .coerce_time(Some(&text("2026-01-12 12:00:00")), chrono_tz::UTC)
            .unwrap();
        let shifted = TimeServer::shift_time(base, &TimeOffset::default()).unwrap();
        assert_eq!(shifted, base);
    }

    #[test]
    fn test_millis_precision_survives_shift() {
        let server = TimeServer::default();
        let base = server
            .coerce_time(
                Some(&TimeInput::Timestamp(1_704_067_200_123)),
                chrono_tz::UTC,
            )
            .unwrap();
        let shifted = TimeServer::shift_time(
            base,
            &TimeOffset {
                hours: 8,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(shifted.timestamp_millis(), 1_704_067_200_123 + 8 * 3_600_000);
    }

    #[test]
    fn test_convert_shanghai_to_new_york() {
        let server = TimeServer::default();
        let result = server
            .convert_timezone(
                Some(&text("2026-01-12 12:00:00")),
                Some("Asia/Shanghai"),
                "America/New_York",
            )
            .unwrap();

        assert_eq!(result.source.datetime, "2026-01-12 12:00:00");
        // UTC+8 noon is 23:00 the previous day in EST (UTC-5, no DST in January)
        assert_eq!(result.target.datetime, "2026-01-11 23:00:00");
        assert_eq!(result.source.timestamp, result.target.timestamp);
        assert_eq!(result.from_timezone, "Asia/Shanghai");
        assert_eq!(result.to_timezone, "America/New_York");
    }

    #[test]
    fn test_convert_uses_default_source_timezone() {
        // Default timezone is Asia/Shanghai, so this matches the explicit version
        let server = TimeServer::default();
        let result = server
            .convert_timezone(Some(&text("2026-01-12 12:00:00")), None, "UTC")
            .unwrap();
        assert_eq!(result.from_timezone, "Asia/Shanghai");
        assert_eq!(result.target.datetime, "2026-01-12 04:00:00");
    }

    #[test]
    fn test_convert_requires_time() {
        let server = TimeServer::default();
        let result = server.convert_timezone(None, Some("UTC"), "Asia/Tokyo");
        assert!(matches!(
            result,
            Err(TimeServerError::MissingRequiredInput { .. })
        ));
    }

    #[test]
    fn test_unknown_timezone_rejected_everywhere() {
        let server = TimeServer::default();

        assert!(matches!(
            server.get_current_time(Some("Mars/Colony")),
            Err(TimeServerError::InvalidTimezone { .. })
        ));
        assert!(matches!(
            server.calculate_time(None, &TimeOffset::default(), Some("Mars/Colony")),
            Err(TimeServerError::InvalidTimezone { .. })
        ));
        assert!(matches!(
            server.convert_timezone(Some(&text("2026-01-01")), Some("Mars/Colony"), "UTC"),
            Err(TimeServerError::InvalidTimezone { .. })
        ));
        assert!(matches!(
            server.convert_timezone(Some(&text("2026-01-01")), Some("UTC"), "Mars/Colony"),
            Err(TimeServerError::InvalidTimezone { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let server = TimeServer::default();
        let result = server.format_current_time(Some("UTC"), "%Q");
        assert!(matches!(
            result,
            Err(TimeServerError::InvalidFormatPattern { .. })
        ));
    }

    #[test]
    fn test_list_timezones_region_filter() {
        let server = TimeServer::default();
        let all = server.list_timezones(None);
        let asia = server.list_timezones(Some("Asia"));

        assert!(!asia.timezones.is_empty());
        assert_eq!(asia.count, asia.timezones.len());
        assert!(asia.timezones.iter().all(|name| name.starts_with("Asia/")));
        assert!(asia.timezones.contains(&"Asia/Shanghai".to_string()));
        assert!(
            asia.timezones
                .iter()
                .all(|name| all.timezones.contains(name))
        );
        assert!(asia.count < all.count);
    }

    #[test]
    fn test_list_timezones_unknown_region_is_empty() {
        let server = TimeServer::default();
        let result = server.list_timezones(Some("Atlantis"));
        assert!(result.timezones.is_empty());
        assert_eq!(result.count, 0);
    }

    #[test]
    fn test_timezone_parsing() {
        let server = TimeServer::default();
        assert!(server.parse_timezone("UTC").is_ok());
        assert!(server.parse_timezone("Mars/Colony").is_err());
    }
}

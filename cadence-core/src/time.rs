//! Time utilities: time-zone parsing and local day boundaries.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, EngineResult};

/// Parse an IANA zone id like "America/New_York".
///
/// Unknown ids are a validation error; there is no silent UTC fallback.
pub fn parse_tz(tz: &str) -> EngineResult<Tz> {
    tz.trim()
        .parse::<Tz>()
        .map_err(|_| EngineError::validation(format!("invalid timezone: {tz}")))
}

/// Calendar date of `instant` as observed in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// First instant of the local calendar day `date` in `tz`.
///
/// If local midnight falls in a DST gap, the day starts at the first local time that exists.
pub fn start_of_local_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    // Gaps are at most a few hours; step forward a minute at a time.
    for offset in 0..=24 * 60 {
        let candidate = midnight + Duration::minutes(offset);
        if let Some(t) = tz.from_local_datetime(&candidate).earliest() {
            return t.with_timezone(&Utc);
        }
    }
    // Unreachable for real tz data; treat the wall clock as UTC.
    Utc.from_utc_datetime(&midnight)
}

/// Last instant (millisecond precision) of the local calendar day `date` in `tz`.
///
/// Defined as one millisecond before the next local day starts, so a repeated 23:xx hour
/// resolves to the later instant and a gap before midnight resolves to the last valid one.
pub fn end_of_local_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let next = date.succ_opt().unwrap_or(date);
    start_of_local_day(next, tz) - Duration::milliseconds(1)
}

/// Render a UTC instant in the user's zone, e.g. "2026-01-11 23:59 EST".
pub fn format_local(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tz_rejects_unknown_zone() {
        let err = parse_tz("Mars/Olympus_Mons").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(parse_tz("America/Chicago").unwrap(), chrono_tz::America::Chicago);
    }

    #[test]
    fn test_end_of_day_new_york_winter() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 11).unwrap();
        let end = end_of_local_day(date, chrono_tz::America::New_York);
        // EST is UTC-5
        assert_eq!(end.to_rfc3339(), "2026-01-12T04:59:59.999+00:00");
    }

    #[test]
    fn test_end_of_day_on_fall_back_day() {
        // 2026-11-01 is 25 hours long in New York; the day still ends at local 23:59:59.999 EST.
        let date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let tz = chrono_tz::America::New_York;
        let start = start_of_local_day(date, tz);
        let end = end_of_local_day(date, tz);
        assert_eq!(start.to_rfc3339(), "2026-11-01T04:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-11-02T04:59:59.999+00:00");
    }

    #[test]
    fn test_local_date_crosses_utc_midnight() {
        let t = Utc.with_ymd_and_hms(2026, 1, 12, 3, 0, 0).unwrap();
        assert_eq!(
            local_date(t, chrono_tz::America::New_York),
            NaiveDate::from_ymd_opt(2026, 1, 11).unwrap()
        );
        assert_eq!(local_date(t, chrono_tz::UTC), NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
    }
}

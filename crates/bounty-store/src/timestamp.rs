//! Timestamp parsing for persisted postings.
//!
//! Records written by older builds stored posting times as host-local
//! wall-clock strings; current builds write RFC 3339 UTC. Loading tries an
//! ordered list of strategies and falls back to a caller-supplied default,
//! so a bad timestamp never aborts a load.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// A single parsing strategy.
type Strategy = fn(&str) -> Option<DateTime<Utc>>;

/// Strategies in the order they are tried.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("explicit-utc", parse_explicit_utc),
    ("legacy-local", parse_legacy_local),
    ("generic", parse_generic),
];

/// Local wall-clock layouts written by older builds.
const LEGACY_LOCAL_FORMATS: &[&str] = &["%m/%d/%Y %I:%M:%S %p", "%m/%d/%Y %H:%M:%S"];

/// Naive layouts accepted as UTC when nothing else matched.
const GENERIC_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Date-only layouts, read as midnight UTC.
const GENERIC_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Format a timestamp the way the current record writes it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a persisted timestamp, returning `default` if no strategy matches.
pub fn parse_timestamp(raw: &str, default: DateTime<Utc>) -> DateTime<Utc> {
    let raw = raw.trim();
    for (name, strategy) in STRATEGIES {
        if let Some(at) = strategy(raw) {
            if *name != "explicit-utc" {
                tracing::debug!(raw, strategy = name, "Parsed non-UTC posting timestamp");
            }
            return at;
        }
    }

    tracing::warn!(raw, default = %default, "Unparseable posting timestamp, using default");
    default
}

/// RFC 3339 with any offset, or `yyyy-mm-dd hh:mm:ssZ`.
fn parse_explicit_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%SZ")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Wall-clock time in the host's zone.
fn parse_legacy_local(raw: &str) -> Option<DateTime<Utc>> {
    LEGACY_LOCAL_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(raw, fmt).ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|at| at.with_timezone(&Utc))
    })
}

/// Anything else recognizable, read as UTC.
fn parse_generic(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc2822(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Some(at) = GENERIC_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(at.and_utc());
    }
    GENERIC_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Timelike};

    use super::*;

    fn fallback() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    #[test]
    fn current_format_round_trips_exactly() {
        let at = utc(2025, 2, 3, 4, 5, 6) + Duration::nanoseconds(123_456_789);
        let written = format_timestamp(at);
        assert!(written.ends_with('Z'));
        assert_eq!(parse_timestamp(&written, fallback()), at);
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let parsed = parse_timestamp("2025-02-03T06:05:06+02:00", fallback());
        assert_eq!(parsed, utc(2025, 2, 3, 4, 5, 6));
    }

    #[test]
    fn sortable_utc_format_is_accepted() {
        let parsed = parse_timestamp("2025-02-03 04:05:06Z", fallback());
        assert_eq!(parsed, utc(2025, 2, 3, 4, 5, 6));
    }

    #[test]
    fn legacy_local_format_uses_host_zone() {
        let naive = NaiveDateTime::parse_from_str("03/14/2024 15:09:26", "%m/%d/%Y %H:%M:%S").ok();
        let expected = naive
            .and_then(|n| Local.from_local_datetime(&n).earliest())
            .map(|at| at.with_timezone(&Utc));

        assert_eq!(
            Some(parse_timestamp("3/14/2024 3:09:26 PM", fallback())),
            expected
        );
        assert_eq!(
            Some(parse_timestamp("03/14/2024 15:09:26", fallback())),
            expected
        );
    }

    #[test]
    fn generic_formats_are_read_as_utc() {
        assert_eq!(
            parse_timestamp("2024-07-01 10:00:00", fallback()),
            utc(2024, 7, 1, 10, 0, 0)
        );
        assert_eq!(parse_timestamp("2024-07-01", fallback()), utc(2024, 7, 1, 0, 0, 0));
        let rfc2822 = parse_timestamp("Mon, 01 Jul 2024 10:00:00 +0000", fallback());
        assert_eq!(rfc2822.hour(), 10);
    }

    #[test]
    fn garbage_falls_back_to_default() {
        assert_eq!(parse_timestamp("yesterday-ish", fallback()), fallback());
        assert_eq!(parse_timestamp("", fallback()), fallback());
    }
}

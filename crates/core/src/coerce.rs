//! Lenient scalar coercion for incoming revision records.
//!
//! The bulk loader forwards TSV cells verbatim, so every value arrives as a
//! JSON string. These deserializers accept either the native JSON type or a
//! string holding it, and reject anything else with a descriptive error.
//!
//! Use them with `#[serde(deserialize_with = "...")]`:
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct Row {
//!     #[serde(deserialize_with = "revingest_core::coerce::int")]
//!     user_id: i64,
//! }
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer, Unexpected, Visitor};

use crate::types::Timestamp;

/// Naive datetime layouts accepted in addition to RFC 3339. Interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Offset-carrying layouts that RFC 3339 parsing rejects (space separator).
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Epoch values with a larger magnitude are milliseconds, not seconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 20_000_000_000;

/// Earliest instant a PostgreSQL `timestamptz` holds: 4714-11-24 BC, midnight UTC.
/// The latest (294276 AD) lies beyond anything chrono can represent.
const MIN_STORABLE_SECS: i64 = -210_866_803_200;

// ---------------------------------------------------------------------------
// Pure parsers
// ---------------------------------------------------------------------------

/// Parse a base-10 integer, ignoring surrounding whitespace.
pub fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

/// Parse a timestamp from any of the accepted textual layouts.
///
/// Tried in order: RFC 3339, space-separated with offset, naive datetime
/// (UTC), bare date (midnight UTC), Unix epoch (see [`timestamp_from_epoch`]).
/// Instants PostgreSQL cannot store are rejected.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    parse_timestamp_layouts(s.trim()).and_then(storable)
}

fn parse_timestamp_layouts(s: &str) -> Option<Timestamp> {

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    parse_int(s).and_then(timestamp_from_epoch)
}

/// Convert a Unix epoch value into a timestamp.
///
/// Magnitudes up to 2e10 are seconds; larger ones are milliseconds, so
/// `1262401445` and `1262401445000` are the same instant.
pub fn timestamp_from_epoch(value: i64) -> Option<Timestamp> {
    let ts = if value.unsigned_abs() > EPOCH_MILLIS_THRESHOLD as u64 {
        DateTime::from_timestamp_millis(value)?
    } else {
        DateTime::from_timestamp(value, 0)?
    };
    storable(ts)
}

/// Convert a fractional Unix epoch value into a timestamp, with the same
/// seconds/milliseconds split as [`timestamp_from_epoch`].
fn timestamp_from_f64(value: f64) -> Option<Timestamp> {
    if !value.is_finite() {
        return None;
    }
    let secs = if value.abs() > EPOCH_MILLIS_THRESHOLD as f64 {
        value / 1000.0
    } else {
        value
    };
    if secs < MIN_STORABLE_SECS as f64 || secs > i64::MAX as f64 {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos).and_then(storable)
}

fn storable(ts: Timestamp) -> Option<Timestamp> {
    (ts.timestamp() >= MIN_STORABLE_SECS).then_some(ts)
}

// ---------------------------------------------------------------------------
// Deserializers
// ---------------------------------------------------------------------------

/// Deserialize an `i64` from a JSON integer, integral float, or numeric string.
pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    deserializer.deserialize_any(IntVisitor)
}

/// Deserialize a `String` from a JSON string or number.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(TextVisitor)
}

/// Deserialize a UTC timestamp from a datetime string or an epoch value.
pub fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    deserializer.deserialize_any(TimestampVisitor)
}

struct IntVisitor;

impl<'de> Visitor<'de> for IntVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or a string containing an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        let in_range = v >= i64::MIN as f64 && v <= i64::MAX as f64;
        if v.is_finite() && v.fract() == 0.0 && in_range {
            Ok(v as i64)
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        parse_int(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
    }
}

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a datetime string or a Unix epoch in seconds or milliseconds")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Timestamp, E> {
        timestamp_from_epoch(v).ok_or_else(|| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Timestamp, E> {
        i64::try_from(v)
            .ok()
            .and_then(timestamp_from_epoch)
            .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Timestamp, E> {
        timestamp_from_f64(v).ok_or_else(|| E::invalid_value(Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Timestamp, E> {
        parse_timestamp(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(deserialize_with = "int")]
        n: i64,
        #[serde(deserialize_with = "text")]
        s: String,
        #[serde(deserialize_with = "timestamp")]
        t: Timestamp,
    }

    fn row(value: serde_json::Value) -> Result<Row, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn accepts_native_json_types() {
        let p = row(serde_json::json!({
            "n": 42,
            "s": "abc",
            "t": "2009-05-31T17:26:00Z"
        }))
        .unwrap();
        assert_eq!(p.n, 42);
        assert_eq!(p.s, "abc");
        assert_eq!(p.t, Utc.with_ymd_and_hms(2009, 5, 31, 17, 26, 0).unwrap());
    }

    #[test]
    fn accepts_tsv_strings() {
        let p = row(serde_json::json!({
            "n": " -17 ",
            "s": "d41d8cd98f00b204e9800998ecf8427e",
            "t": "2009-05-31 17:26:00"
        }))
        .unwrap();
        assert_eq!(p.n, -17);
        assert_eq!(p.t, Utc.with_ymd_and_hms(2009, 5, 31, 17, 26, 0).unwrap());
    }

    #[test]
    fn numbers_become_text() {
        let p = row(serde_json::json!({ "n": 1, "s": 1234, "t": 0 })).unwrap();
        assert_eq!(p.s, "1234");
        assert_eq!(p.t, Utc.timestamp_opt(0, 0).unwrap());
    }

    #[test]
    fn integral_float_is_an_int() {
        let p = row(serde_json::json!({ "n": 3.0, "s": "", "t": 0 })).unwrap();
        assert_eq!(p.n, 3);
    }

    #[test]
    fn fractional_float_is_rejected() {
        let err = row(serde_json::json!({ "n": 3.5, "s": "", "t": 0 })).unwrap_err();
        assert!(err.to_string().contains("an integer"));
    }

    #[test]
    fn non_numeric_string_is_rejected() {
        let err = row(serde_json::json!({ "n": "abc", "s": "", "t": 0 })).unwrap_err();
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn null_is_rejected() {
        assert!(row(serde_json::json!({ "n": null, "s": "", "t": 0 })).is_err());
    }

    #[test]
    fn parse_timestamp_layouts() {
        let expected = Utc.with_ymd_and_hms(2010, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2010-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2010-01-02T05:04:05+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2010-01-02 03:04:05+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2010-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_timestamp("2010-01-02T03:04:05"), Some(expected));
        assert_eq!(parse_timestamp("1262401445"), Some(expected));
        assert_eq!(
            parse_timestamp("2010-01-02"),
            Some(Utc.with_ymd_and_hms(2010, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn fractional_seconds_are_kept() {
        let t = parse_timestamp("2010-01-02 03:04:05.250").unwrap();
        assert_eq!(t.timestamp_subsec_millis(), 250);
        let t = timestamp_from_f64(1.5).unwrap();
        assert_eq!(t.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn large_epoch_values_are_milliseconds() {
        let expected = Utc.with_ymd_and_hms(2010, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("1262401445000"), Some(expected));
        assert_eq!(timestamp_from_epoch(1_262_401_445_000), Some(expected));
        assert_eq!(timestamp_from_f64(1_262_401_445_000.0), Some(expected));

        let p = row(serde_json::json!({ "n": 1, "s": "", "t": 1_262_401_445_250_u64 }))
            .unwrap();
        assert_eq!(p.t.timestamp(), expected.timestamp());
        assert_eq!(p.t.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn epoch_threshold_boundary() {
        // 2e10 itself is still seconds (year 2603); one more is milliseconds (1970).
        assert_eq!(
            timestamp_from_epoch(20_000_000_000).map(|t| t.timestamp()),
            Some(20_000_000_000)
        );
        assert_eq!(
            timestamp_from_epoch(20_000_000_001).map(|t| t.timestamp()),
            Some(20_000_000)
        );
        assert_eq!(
            timestamp_from_epoch(-1_262_401_445_000).map(|t| t.timestamp()),
            Some(-1_262_401_445)
        );
    }

    #[test]
    fn instants_before_postgres_range_are_rejected() {
        assert!(timestamp_from_epoch(MIN_STORABLE_SECS * 1000).is_some());
        assert_eq!(timestamp_from_epoch((MIN_STORABLE_SECS - 1) * 1000), None);
        assert_eq!(timestamp_from_epoch(-300_000_000_000_000), None);
        assert_eq!(parse_timestamp("-300000000000000"), None);
        assert_eq!(timestamp_from_f64(-3.0e14), None);
        assert_eq!(timestamp_from_epoch(i64::MIN), None);

        let err = row(serde_json::json!({ "n": 1, "s": "", "t": "-300000000000000" }))
            .unwrap_err();
        assert!(err.to_string().contains("Unix epoch"));
    }
}

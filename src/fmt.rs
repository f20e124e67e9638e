//! Locale-invariant primitive codecs shared by every format.
//!
//! All numeric and date text produced anywhere in this crate goes through
//! these functions; that is what guarantees that the URI codec and the XML
//! writers agree bit-for-bit and round-trip each other's output.
//!
//! Formatting is stateless and per-call. Parse failures are reported as
//! `None` and the caller decides whether that is a soft or a hard failure.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use regex::Regex;

use crate::point::{GeoPoint, NO_LAT_LON, NO_ZOOM};

/// Hemisphere prefixes that keep the sign.
const PREFIX_POSITIVE: &str = "nNeE";
/// Hemisphere prefixes that negate the value.
const PREFIX_NEGATIVE: &str = "sSwW";

/// Maximum fractional digits for coordinate text.
const LAT_LON_PRECISION: usize = 7;

/// Parses latitude/longitude text with an optional one-character hemisphere
/// prefix (`n`/`N`/`e`/`E` positive, `s`/`S`/`w`/`W` negative).
///
/// Empty text is the unset coordinate, [`NO_LAT_LON`]. Malformed text is
/// `None`; callers treat that as a soft failure and leave the field unset.
pub fn parse_lat_or_lon(text: &str) -> Option<f64> {
    if text.is_empty() {
        return Some(NO_LAT_LON);
    }

    let first = text.chars().next()?;
    let (sign, rest) = if PREFIX_POSITIVE.contains(first) {
        (1.0, &text[first.len_utf8()..])
    } else if PREFIX_NEGATIVE.contains(first) {
        (-1.0, &text[first.len_utf8()..])
    } else {
        (1.0, text)
    };

    rest.parse::<f64>().ok().map(|value| sign * value)
}

/// Formats a coordinate with up to 7 fractional digits, `.`-decimal,
/// trailing zeros trimmed. The unset sentinel formats as the empty string.
pub fn format_lat_lon(value: f64) -> String {
    if GeoPoint::is_unset_coordinate(value) {
        return String::new();
    }

    let mut text = format!("{value:.prec$}", prec = LAT_LON_PRECISION);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    text
}

/// Parses a zoom level. Anything that is not an integer in `[0,64)` yields
/// the [`NO_ZOOM`] sentinel silently.
pub fn parse_zoom(text: &str) -> i32 {
    match text.trim().parse::<i32>() {
        Ok(zoom) if (0..64).contains(&zoom) => zoom,
        _ => NO_ZOOM,
    }
}

/// Formats a zoom level; the [`NO_ZOOM`] sentinel formats as empty.
pub fn format_zoom(zoom: i32) -> String {
    if zoom == NO_ZOOM {
        return String::new();
    }
    zoom.to_string()
}

/// Formats a timestamp as `yyyy-MM-ddTHH:mm:ssZ` in UTC.
pub fn format_date(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

static RE_OFFSET_STRAY_Z: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([+-]\d{2}:?\d{2})z$").expect("valid regex"));
static RE_OFFSET_NO_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]\d{4}$").expect("valid regex"));
static RE_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]\d{2}:\d{2}$").expect("valid regex"));

/// Parses ISO-8601 timestamp text.
///
/// Accepts the canonical `yyyy-MM-ddTHH:mm:ssZ` form plus variants with
/// fractional seconds, `+HH:MM` and `+HHMM` offsets, and the historical
/// `+HHMMZ` quirk (numeric offset followed by a stray `Z`). The result is
/// normalized to UTC with fractional seconds dropped.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut normalized = RE_OFFSET_STRAY_Z.replace(trimmed, "$1").into_owned();
    if normalized.ends_with('Z') || normalized.ends_with('z') {
        normalized.pop();
        normalized.push_str("+00:00");
    } else if RE_OFFSET_NO_COLON.is_match(&normalized) {
        normalized.insert(normalized.len() - 2, ':');
    }

    if RE_OFFSET.is_match(&normalized) {
        return DateTime::parse_from_rfc3339(&normalized)
            .ok()
            .map(|time| time.with_timezone(&Utc).trunc_subsecs(0));
    }

    // No offset at all: interpret as UTC.
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive).trunc_subsecs(0))
}

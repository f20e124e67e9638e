//! `geo:` / `geoarea:` URI codec.
//!
//! Parses and formats the geo-URI grammar
//! `geo:{lat}[,{lon}]?q={lat},{lon}(name)&z=..&z2=..&link=..&s=..&d=..&id=..&t=..`
//! plus the `geoarea:{latNE},{lonNE},{latSW},{lonSW}` bounding form, and
//! recognizes share links from four web map services (Yandex,
//! OpenStreetMap, Here, Google).
//!
//! Field population is strictly first-wins: a provider extractor, the
//! generic parameter pass and the inference pass each only fill fields
//! that are still unset. Malformed numeric tokens are soft failures that
//! leave the field unset; the only way to get "no result" is an
//! unrecognized scheme (or an unparseable `geoarea:` form).

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use url::form_urlencoded;

use crate::fmt;
use crate::point::{GeoPoint, NO_ZOOM};

/// Scheme of a single-point uri.
pub const GEO_SCHEME: &str = "geo:";
/// Scheme of a bounding-pair uri.
pub const AREA_SCHEME: &str = "geoarea:";

const HTTP_SCHEME: &str = "http:";
const HTTPS_SCHEME: &str = "https:";

/// One fragment of the lat/lon grammar: optional sign or hemisphere
/// prefix, then digits and dots.
const RE_DOUBLE: &str = r"([+\-nNeEsSwW]?[0-9.]+)";

static RE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]+)\)").expect("valid regex"));
static RE_LAT_LON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{RE_DOUBLE}(?:\s*,\s*{RE_DOUBLE})(?:\s*,\s*{RE_DOUBLE})?"))
        .expect("valid regex")
});
static RE_LAT_LON_LAT_LON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{RE_DOUBLE}(?:\s*,\s*{RE_DOUBLE})(?:\s*,\s*{RE_DOUBLE})(?:\s*,\s*{RE_DOUBLE})"
    ))
    .expect("valid regex")
});
static RE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([12]\d{3}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2}Z?)?)")
        .expect("valid regex")
});
static RE_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s?=\s?['"]([^'"]*)['"]"#).expect("valid regex"));
static RE_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src\s?=\s?['"]([^'"]*)['"]"#).expect("valid regex"));

/// Recognized geo-uri query parameters. Everything else is
/// [`ParamKind::Unrecognized`]: kept only as an inference candidate,
/// never assigned to a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParamKind {
    /// `d` free-text description.
    Description,
    /// `link` url with additional information.
    Link,
    /// `s` icon url.
    Symbol,
    /// `q` search query: `lat,lon(name)`.
    Query,
    /// `z` minimum zoom.
    Zoom,
    /// `z2` maximum zoom.
    ZoomMax,
    /// `id` point identity.
    Id,
    /// `t` time of measurement.
    Time,
    /// `n` name, alternative to `q=(name)`.
    Name,
    /// `ll` lat,lon pair, alternative to `q=lat,lon`.
    LatLon,
    /// Anything else.
    Unrecognized,
}

impl ParamKind {
    fn from_key(key: &str) -> Self {
        match key {
            "d" => Self::Description,
            "link" => Self::Link,
            "s" => Self::Symbol,
            "q" => Self::Query,
            "z" => Self::Zoom,
            "z2" => Self::ZoomMax,
            "id" => Self::Id,
            "t" => Self::Time,
            "n" => Self::Name,
            "ll" => Self::LatLon,
            _ => Self::Unrecognized,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Description => "d",
            Self::Link => "link",
            Self::Symbol => "s",
            Self::Query => "q",
            Self::Zoom => "z",
            Self::ZoomMax => "z2",
            Self::Id => "id",
            Self::Time => "t",
            Self::Name => "n",
            Self::LatLon => "ll",
            Self::Unrecognized => "",
        }
    }
}

/// Options controlling parsing and formatting behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoUriOptions {
    /// Emit latitude/longitude twice (`geo:52.1,9.2?q=52.1,9.2`); some
    /// consumers only read the `q=` form.
    pub format_redundant_lat_lon: bool,

    /// When parsing, try to fill unset fields (name, time, link, symbol,
    /// coordinates) by pattern-matching every parameter value and the
    /// description text.
    pub parse_infer_missing: bool,
}

impl GeoUriOptions {
    /// Options with inference enabled.
    pub fn infer_missing() -> Self {
        Self {
            parse_infer_missing: true,
            ..Self::default()
        }
    }
}

/// Converts between a [`GeoPoint`] and its uri text form.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoUri {
    options: GeoUriOptions,
}

/// Coordinate extractor for one map provider. Takes the full url, writes
/// any coordinates/zoom it finds (first-wins) and returns the url the
/// generic parameter pass should continue with.
type ProviderExtractor = fn(&str, &mut GeoPoint) -> String;

/// Provider recognition table. Order is significant: markers are checked
/// against the lowercased url top to bottom and the first hit wins.
const PROVIDERS: &[(&str, ProviderExtractor)] = &[
    ("yandex.", extract_yandex),
    ("openstreetmap.", extract_openstreetmap),
    (".here.", extract_here),
    (".google.", extract_google),
];

impl GeoUri {
    /// Codec with default options.
    pub fn new() -> Self {
        Self::with_options(GeoUriOptions::default())
    }

    /// Codec with explicit options.
    pub fn with_options(options: GeoUriOptions) -> Self {
        Self { options }
    }

    /// Parses uri text into a fresh point.
    ///
    /// Returns `None` for unrecognized schemes; recognized schemes always
    /// yield a point, even if every field in it ends up unset.
    pub fn parse(&self, uri: &str) -> Option<GeoPoint> {
        let mut point = GeoPoint::new();
        self.parse_into(uri, &mut point).then_some(point)
    }

    /// Parses uri text into an existing point, only filling unset fields.
    ///
    /// Returns false if the scheme is not recognized; `point` is left
    /// untouched in that case.
    pub fn parse_into(&self, uri: &str, point: &mut GeoPoint) -> bool {
        if uri.starts_with(HTTP_SCHEME) || uri.starts_with(HTTPS_SCHEME) {
            let lower = uri.to_lowercase();
            for (marker, extract) in PROVIDERS {
                if lower.contains(marker) {
                    let rewritten = extract(uri, point);
                    self.parse_params(&rewritten, point);
                    return true;
                }
            }
            // unknown web map; try the generic grammar
            self.parse_params(uri, point);
            return true;
        }
        if uri.starts_with(GEO_SCHEME) {
            self.parse_params(uri, point);
            return true;
        }
        false
    }

    /// The generic `scheme:lat,lon?key=value&...` pass.
    fn parse_params(&self, uri: &str, point: &mut GeoPoint) {
        let Some(query_offset) = uri.find('?') else {
            parse_lat_lon_candidates(point, &[uri.to_string()]);
            return;
        };

        let path = &uri[..query_offset];
        let query = &uri[query_offset + 1..];
        let params: Vec<(ParamKind, String)> = form_urlencoded::parse(query.as_bytes())
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (ParamKind::from_key(&key), value.into_owned()))
            .collect();

        if is_blank(&point.description) {
            point.description = param(&params, ParamKind::Description).map(str::to_string);
        }
        if is_blank(&point.link) {
            point.link = param(&params, ParamKind::Link).map(str::to_string);
        }
        if is_blank(&point.symbol) {
            point.symbol = param(&params, ParamKind::Symbol).map(str::to_string);
        }
        if is_blank(&point.id) {
            point.id = param(&params, ParamKind::Id).map(str::to_string);
        }
        if point.zoom_min == NO_ZOOM {
            if let Some(zoom) = param(&params, ParamKind::Zoom) {
                set_lat_lon_zoom(point, None, None, Some(zoom));
            }
        }
        if point.zoom_max == NO_ZOOM {
            if let Some(zoom) = param(&params, ParamKind::ZoomMax) {
                point.zoom_max = fmt::parse_zoom(zoom);
            }
        }

        // candidate texts for pattern extraction, in priority order:
        // lat/lon from q= wins over the url path
        let infer = self.options.parse_infer_missing;
        let mut candidates: Vec<String> = Vec::new();
        if let Some(q) = param(&params, ParamKind::Query) {
            candidates.push(q.to_string());
        }
        candidates.push(path.to_string());
        if let Some(ll) = param(&params, ParamKind::LatLon) {
            candidates.push(ll.to_string());
        }
        if infer {
            if let Some(description) = &point.description {
                candidates.push(description.clone());
            }
            candidates.extend(params.iter().map(|(_, value)| value.clone()));
        }

        if is_blank(&point.name) {
            point.name = find_first(&RE_NAME, &candidates);
        }
        if point.time.is_none() {
            point.time = find_time(param(&params, ParamKind::Time), &candidates);
        }

        parse_lat_lon_candidates(point, &candidates);

        if is_blank(&point.name) {
            point.name = param(&params, ParamKind::Name).map(str::to_string);
        }
        if infer {
            if is_blank(&point.link) {
                point.link = find_first(&RE_HREF, &candidates);
            }
            if is_blank(&point.symbol) {
                point.symbol = find_first(&RE_SRC, &candidates);
            }
        }
    }

    /// Formats a point as `geo:` uri text. An all-unset point formats to
    /// exactly `geo:`.
    pub fn format(&self, point: &GeoPoint) -> String {
        let mut result = String::from(GEO_SCHEME);
        append_lat_lon(&mut result, point);

        let mut delim = '?';
        let query = self.format_query(point);
        append_param(&mut result, &mut delim, ParamKind::Query, &query, false);
        append_param(
            &mut result,
            &mut delim,
            ParamKind::Zoom,
            &fmt::format_zoom(point.zoom_min),
            false,
        );
        append_param(
            &mut result,
            &mut delim,
            ParamKind::ZoomMax,
            &fmt::format_zoom(point.zoom_max),
            false,
        );
        append_param(
            &mut result,
            &mut delim,
            ParamKind::Link,
            point.link.as_deref().unwrap_or(""),
            true,
        );
        append_param(
            &mut result,
            &mut delim,
            ParamKind::Symbol,
            point.symbol.as_deref().unwrap_or(""),
            true,
        );
        append_param(
            &mut result,
            &mut delim,
            ParamKind::Description,
            point.description.as_deref().unwrap_or(""),
            true,
        );
        append_param(
            &mut result,
            &mut delim,
            ParamKind::Id,
            point.id.as_deref().unwrap_or(""),
            true,
        );
        if let Some(time) = &point.time {
            append_param(
                &mut result,
                &mut delim,
                ParamKind::Time,
                &fmt::format_date(time),
                false,
            );
        }
        result
    }

    fn format_query(&self, point: &GeoPoint) -> String {
        let mut query = String::new();
        if self.options.format_redundant_lat_lon {
            append_lat_lon(&mut query, point);
        }
        if let Some(name) = &point.name {
            query.push('(');
            query.push_str(&encode_value(name));
            query.push(')');
        }
        query
    }

    /// Formats a bounding pair as `geoarea:latNE,lonNE,latSW,lonSW`.
    pub fn format_area(&self, north_east: &GeoPoint, south_west: &GeoPoint) -> String {
        format!(
            "{AREA_SCHEME}{},{},{},{}",
            fmt::format_lat_lon(north_east.latitude),
            fmt::format_lat_lon(north_east.longitude),
            fmt::format_lat_lon(south_west.latitude),
            fmt::format_lat_lon(south_west.longitude),
        )
    }

    /// Parses a `geoarea:` uri into its north-east and south-west corners.
    /// Requires exactly four numeric groups; anything else is `None`.
    pub fn parse_area(&self, uri: &str) -> Option<(GeoPoint, GeoPoint)> {
        if !uri.starts_with(AREA_SCHEME) {
            return None;
        }

        let caps = RE_LAT_LON_LAT_LON.captures(uri)?;
        let mut coords = [0.0f64; 4];
        for (index, coord) in coords.iter_mut().enumerate() {
            *coord = fmt::parse_lat_or_lon(caps.get(index + 1)?.as_str())?;
        }
        Some((
            GeoPoint::with_lat_lon(coords[0], coords[1]),
            GeoPoint::with_lat_lon(coords[2], coords[3]),
        ))
    }
}

/// Fills unset name/time/link/symbol from free text; used by the XML
/// reader against each emitted point's description.
pub fn infer_missing(point: &mut GeoPoint, text: &str) {
    let candidates = [text.to_string()];
    if is_blank(&point.name) {
        point.name = find_first(&RE_NAME, &candidates);
    }
    if point.time.is_none() {
        point.time = find_time(None, &candidates);
    }
    if is_blank(&point.link) {
        point.link = find_first(&RE_HREF, &candidates);
    }
    if is_blank(&point.symbol) {
        point.symbol = find_first(&RE_SRC, &candidates);
    }
}

/// Fills unset coordinates from the first `lat,lon` pair found in `text`.
pub fn parse_lat_lon(point: &mut GeoPoint, text: &str) {
    parse_lat_lon_candidates(point, &[text.to_string()]);
}

fn parse_lat_lon_candidates(point: &mut GeoPoint, candidates: &[String]) {
    for candidate in candidates {
        if let Some(caps) = RE_LAT_LON.captures(candidate) {
            let lat = caps.get(1).map(|m| m.as_str());
            let lon = caps.get(2).map(|m| m.as_str());
            set_lat_lon_zoom(point, lat, lon, None);
            return;
        }
    }
}

/// First-wins field writer shared by all extractors: each value is only
/// applied if the target field is still unset, and a value that fails to
/// parse leaves the field unset (soft failure).
fn set_lat_lon_zoom(point: &mut GeoPoint, lat: Option<&str>, lon: Option<&str>, zoom: Option<&str>) {
    if point.zoom_min == NO_ZOOM {
        if let Some(zoom) = zoom {
            point.zoom_min = fmt::parse_zoom(zoom);
        }
    }
    if let Some(lat) = lat {
        if GeoPoint::is_unset_coordinate(point.latitude) {
            if let Some(value) = fmt::parse_lat_or_lon(lat) {
                point.latitude = value;
            }
        }
    }
    if let Some(lon) = lon {
        if GeoPoint::is_unset_coordinate(point.longitude) {
            if let Some(value) = fmt::parse_lat_or_lon(lon) {
                point.longitude = value;
            }
        }
    }
}

/// Index just past `marker` in `uri`, if present.
fn content_index_behind(uri: &str, marker: &str) -> Option<usize> {
    uri.find(marker).map(|index| index + marker.len())
}

/// Tail of `uri` from `start`, split on `delimiters`, requiring at least
/// `min_parts` tokens.
fn split_parts<'a>(
    uri: &'a str,
    start: Option<usize>,
    delimiters: &[char],
    min_parts: usize,
) -> Option<Vec<&'a str>> {
    let start = start?;
    let parts: Vec<&str> = uri[start..]
        .split(|c: char| delimiters.contains(&c))
        .collect();
    (parts.len() >= min_parts).then_some(parts)
}

// https://www.yandex.com/maps/?ll=9.2,52.1&z=14 -- ll= is lon,lat (swapped)
fn extract_yandex(uri: &str, point: &mut GeoPoint) -> String {
    let start = content_index_behind(uri, "ll=");
    if let Some(parts) = split_parts(uri, start, &[',', '?', '&'], 2) {
        set_lat_lon_zoom(point, Some(parts[1]), Some(parts[0]), None);
    }
    uri.to_string()
}

// https://www.openstreetmap.org/?#map=14/52.1/9.2
// https://www.openstreetmap.org/#14/52.1/9.2
fn extract_openstreetmap(uri: &str, point: &mut GeoPoint) -> String {
    let start = content_index_behind(uri, "#map=").or_else(|| content_index_behind(uri, "/#"));
    if let Some(parts) = split_parts(uri, start, &['/', '?', '&'], 3) {
        set_lat_lon_zoom(point, Some(parts[1]), Some(parts[2]), Some(parts[0]));
    }
    uri.to_string()
}

// https://wego.here.com/?map=52.1,9.2,14
// https://share.here.com/52.1,9.2,14
fn extract_here(uri: &str, point: &mut GeoPoint) -> String {
    let start =
        content_index_behind(uri, "map=").or_else(|| uri.rfind('/').map(|index| index + 1));
    if let Some(parts) = split_parts(uri, start, &[',', '&', '?'], 2) {
        let zoom = parts.get(2).copied();
        set_lat_lon_zoom(point, Some(parts[0]), Some(parts[1]), zoom);
    }
    uri.to_string()
}

// https://www.google.com/maps/@52.1,9.2,14z -- zoom carries a 'z' suffix
fn extract_google(uri: &str, point: &mut GeoPoint) -> String {
    let uri = uri.replace("q=loc:", "q=");
    let start = content_index_behind(&uri, "/@");
    if let Some(parts) = split_parts(&uri, start, &[',', '?', '&', '('], 2) {
        if let Some(zoom) = parts.get(2) {
            if zoom.to_lowercase().ends_with('z') {
                set_lat_lon_zoom(point, None, None, Some(&zoom[..zoom.len() - 1]));
            }
        }
        set_lat_lon_zoom(point, Some(parts[0]), Some(parts[1]), None);
    }
    uri
}

/// Last occurrence of `kind` in the decoded parameter list.
fn param(params: &[(ParamKind, String)], kind: ParamKind) -> Option<&str> {
    params
        .iter()
        .rev()
        .find(|(key, _)| *key == kind)
        .map(|(_, value)| value.as_str())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// First capture of `pattern` across `candidates`, in candidate order.
fn find_first(pattern: &Regex, candidates: &[String]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        pattern
            .captures(candidate)
            .and_then(|caps| caps.get(1))
            .map(|group| group.as_str().to_string())
    })
}

/// Timestamp from the explicit `t=` value if present, otherwise the first
/// ISO-8601 looking substring in the candidates. Unparsable text is a soft
/// failure.
fn find_time(explicit: Option<&str>, candidates: &[String]) -> Option<DateTime<Utc>> {
    let text = match explicit.filter(|value| !value.is_empty()) {
        Some(value) => Some(value.to_string()),
        None => find_first(&RE_TIME, candidates),
    };
    text.and_then(|value| fmt::parse_date(&value))
}

fn append_lat_lon(result: &mut String, point: &GeoPoint) {
    result.push_str(&fmt::format_lat_lon(point.latitude));
    if !GeoPoint::is_unset_coordinate(point.longitude) {
        result.push(',');
        result.push_str(&fmt::format_lat_lon(point.longitude));
    }
}

fn append_param(result: &mut String, delim: &mut char, kind: ParamKind, value: &str, encode: bool) {
    if value.is_empty() {
        return;
    }
    result.push(*delim);
    result.push_str(kind.key());
    result.push('=');
    if encode {
        result.push_str(&encode_value(value));
    } else {
        result.push_str(value);
    }
    *delim = '&';
}

/// x-www-form-urlencoded, `+` for space.
fn encode_value(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

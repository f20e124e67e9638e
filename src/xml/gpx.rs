//! GPX 1.1 writer.
//!
//! Emits a full GPX document with one `<trkpt>` per non-empty point.
//! Fields GPX has no standard slot for (id, symbol url, zoom bounds) go
//! into an `<extensions>` block under the `gm` namespace, so a document
//! written here reads back without loss.

use std::fmt::Write;

use crate::fmt;
use crate::point::{GeoPoint, NO_ZOOM};
use crate::xml::dialect::{gpx11, poi};
use crate::xml::escape::{escape_attribute, escape_element};

const HEADER: &str = "<?xml version='1.0' encoding='UTF-8'?>\n\
                      <gpx xmlns='http://www.topografix.com/GPX/1/1'\n\
                      \txmlns:gm='uri:geomark' version='1.1' creator='geomark'>\n\
                      \t<trk>\n\t\t<trkseg>";
const FOOTER: &str = "\t\t</trkseg>\n\t</trk>\n</gpx>\n";

/// Formats all non-empty points as one GPX document. An input without any
/// writable point yields the empty string.
pub fn to_gpx_xml(points: &[GeoPoint]) -> String {
    let mut xml = String::new();
    for point in points {
        if point.is_empty() {
            continue;
        }
        if xml.is_empty() {
            writeln!(xml, "{HEADER}").expect("write to string");
        }
        write!(xml, "\t\t\t").expect("write to string");
        append_trkpt(&mut xml, point);
    }
    if !xml.is_empty() {
        write!(xml, "{FOOTER}").expect("write to string");
    }
    xml
}

/// Appends one `<trkpt>` fragment for `point`.
pub fn append_trkpt(xml: &mut String, point: &GeoPoint) {
    write!(
        xml,
        "<{} {}='{}' {}='{}'>",
        gpx11::TRKPT,
        gpx11::ATTR_LAT,
        fmt::format_lat_lon(point.latitude),
        gpx11::ATTR_LON,
        fmt::format_lat_lon(point.longitude),
    )
    .expect("write to string");

    if let Some(time) = point.time {
        element(xml, gpx11::TIME, &fmt::format_date(&time));
    }
    if let Some(name) = &point.name {
        element(xml, gpx11::NAME, name);
    }
    if let Some(description) = &point.description {
        element(xml, gpx11::DESC, description);
    }
    if let Some(link) = &point.link {
        write!(
            xml,
            "<{} {}='{}' />",
            gpx11::LINK,
            gpx11::ATTR_LINK,
            escape_attribute(link)
        )
        .expect("write to string");
    }

    let has_extensions = point.id.is_some()
        || point.symbol.is_some()
        || point.zoom_min != NO_ZOOM
        || point.zoom_max != NO_ZOOM;
    if has_extensions {
        write!(xml, "<{}>", gpx11::EXTENSIONS).expect("write to string");
        if let Some(id) = &point.id {
            element(xml, &format!("gm:{}", poi::ATTR_ID), id);
        }
        if let Some(symbol) = &point.symbol {
            element(xml, &format!("gm:{}", gpx11::SYMBOL), symbol);
        }
        if point.zoom_min != NO_ZOOM {
            element(xml, &format!("gm:{}", gpx11::ZOOM), &fmt::format_zoom(point.zoom_min));
        }
        if point.zoom_max != NO_ZOOM {
            element(
                xml,
                &format!("gm:{}", gpx11::ZOOM_MAX),
                &fmt::format_zoom(point.zoom_max),
            );
        }
        write!(xml, "</{}>", gpx11::EXTENSIONS).expect("write to string");
    }

    writeln!(xml, "</{}>", gpx11::TRKPT).expect("write to string");
}

fn element(xml: &mut String, name: &str, value: &str) {
    write!(xml, "<{name}>{}</{name}>", escape_element(value)).expect("write to string");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::NO_ZOOM;
    use crate::xml::reader::GeoXmlReader;

    fn sample() -> GeoPoint {
        GeoPoint {
            latitude: 53.1099972,
            longitude: 8.7178206,
            name: Some("myName  with forbidden chars <hello world='' >".to_string()),
            description: Some("my Description  with forbidden chars <hello world='' >".to_string()),
            symbol: Some("https://server/path/to/Symbol.jpg?hello=world&32".to_string()),
            link: Some("https://server/path/to/link?hello=world&32".to_string()),
            id: Some("myId with forbidden chars <hello world='' >".to_string()),
            time: fmt::parse_date("2014-12-19T21:13:21Z"),
            zoom_min: 12,
            zoom_max: 33,
        }
    }

    #[test]
    fn empty_points_are_skipped_and_empty_input_yields_empty_string() {
        assert_eq!(to_gpx_xml(&[]), "");
        assert_eq!(to_gpx_xml(&[GeoPoint::new()]), "");
    }

    #[test]
    fn forbidden_chars_survive_a_round_trip() {
        let exported = to_gpx_xml(&[sample(), GeoPoint::with_lat_lon(53.0, 8.0), GeoPoint::new()]);

        let imported = GeoXmlReader::new().read_str(&exported).expect("parse own output");
        assert_eq!(imported.len(), 2);

        let point = &imported[0];
        let original = sample();
        assert_eq!(point.name, original.name);
        assert_eq!(point.description, original.description);
        assert_eq!(point.symbol, original.symbol);
        assert_eq!(point.id, original.id);
        assert_eq!(point.time, original.time);
        assert_eq!(point.latitude, original.latitude);
        assert_eq!(point.longitude, original.longitude);
        assert_eq!(point.zoom_min, 12);
        assert_eq!(point.zoom_max, 33);
    }

    #[test]
    fn attribute_link_quotes_are_escaped() {
        let mut point = GeoPoint::with_lat_lon(1.0, 2.0);
        point.link = Some("https://x/a'b".to_string());
        let xml = to_gpx_xml(&[point]);
        assert!(xml.contains("href='https://x/a&apos;b'"));
    }

    #[test]
    fn no_extensions_block_without_extension_fields() {
        let mut point = GeoPoint::with_lat_lon(1.0, 2.0);
        point.name = Some("n".to_string());
        point.zoom_min = NO_ZOOM;
        let xml = to_gpx_xml(&[point]);
        assert!(!xml.contains("<extensions>"));
    }
}

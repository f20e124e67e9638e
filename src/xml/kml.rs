//! KML 2.2 writer.
//!
//! Icon urls are shared: each distinct symbol url gets exactly one
//! `<IconStyle>` definition inside a single `<Style id='default'>` block,
//! and every placemark using that url points at it through `<styleUrl>`.
//! Style ids are derived from the url basename and disambiguated with a
//! numeric suffix when two different urls share a basename.

use std::fmt::Write;

use crate::fmt;
use crate::point::GeoPoint;
use crate::xml::dialect::{gpx11, kml22, poi};
use crate::xml::escape::{escape_attribute, escape_element};

const HEADER: &str = "<?xml version='1.0' encoding='UTF-8'?>\n\
                      <kml xmlns='http://www.opengis.net/kml/2.2'\n\
                      \txmlns:atom='http://www.w3.org/2005/Atom'\n\
                      \txmlns:gx='http://www.google.com/kml/ext/2.2'\n\
                      \txmlns:gm='uri:geomark' >\n\
                      \t<Document>";
const FOOTER: &str = "\t</Document>\n</kml>\n";

/// Formats all non-empty points as one KML document. An input without any
/// writable point or symbol yields the empty string.
pub fn to_kml_xml(points: &[GeoPoint]) -> String {
    let styles = collect_styles(points);

    let mut xml = String::new();
    if !styles.is_empty() {
        writeln!(xml, "{HEADER}").expect("write to string");
        writeln!(xml, "\t\t<{} id='default'>", kml22::ICON_CONTAINER).expect("write to string");
        for (url, id) in &styles {
            writeln!(
                xml,
                "\t\t\t<{0} id='{1}'><Icon><{2}>{3}</{2}></Icon></{0}>",
                kml22::ICON_DEFINITION,
                escape_attribute(id),
                kml22::ICON_DEFINITION_URL,
                escape_element(url),
            )
            .expect("write to string");
        }
        writeln!(xml, "\t\t</{}>", kml22::ICON_CONTAINER).expect("write to string");
    }

    for point in points {
        if point.is_empty() {
            continue;
        }
        if xml.is_empty() {
            writeln!(xml, "{HEADER}").expect("write to string");
        }
        append_placemark(&mut xml, point, &styles);
    }

    if !xml.is_empty() {
        write!(xml, "{FOOTER}").expect("write to string");
    }
    xml
}

/// One entry per distinct symbol url, in first-seen order.
fn collect_styles(points: &[GeoPoint]) -> Vec<(String, String)> {
    let mut styles: Vec<(String, String)> = Vec::new();
    for point in points {
        let Some(symbol) = point.symbol.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        if styles.iter().any(|(url, _)| url == symbol) {
            continue;
        }
        let base = basename(symbol);
        let mut id = base.clone();
        let mut suffix = 2;
        while styles.iter().any(|(_, existing)| *existing == id) {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        styles.push((symbol.to_string(), id));
    }
    styles
}

/// Final path segment without its extension, query string included in the
/// extension cut. `https://x/path/pin.png` -> `pin`.
fn basename(url: &str) -> String {
    let name = url.rsplit('/').next().unwrap_or(url);
    let name = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    };
    name.to_string()
}

fn append_placemark(xml: &mut String, point: &GeoPoint, styles: &[(String, String)]) {
    writeln!(xml, "\t\t<{}>", kml22::PLACEMARK).expect("write to string");

    element(xml, kml22::DESCRIPTION, point.description.as_deref());
    element(xml, gpx11::NAME, point.name.as_deref());
    element(
        xml,
        &format!("gm:{}", poi::ATTR_ID),
        point.id.as_deref(),
    );

    if let Some(symbol) = point.symbol.as_deref() {
        if let Some((_, id)) = styles.iter().find(|(url, _)| url == symbol) {
            element(xml, kml22::ICON_REFERENCE_ID, Some(&format!("#{id}")));
        }
    }
    if let Some(link) = point.link.as_deref() {
        writeln!(xml, "\t\t\t<atom:link href='{}' />", escape_attribute(link))
            .expect("write to string");
    }

    // empty points never reach this writer, coordinates always exist
    writeln!(xml, "\t\t\t<Point>").expect("write to string");
    coordinates(xml, point);
    if let Some(time) = point.time {
        writeln!(
            xml,
            "\t\t\t\t<{0}>{1}</{0}>",
            kml22::TIMESTAMP_WHEN,
            escape_element(&fmt::format_date(&time))
        )
        .expect("write to string");
    }
    writeln!(xml, "\t\t\t</Point>").expect("write to string");

    if point.zoom_min > 0 {
        element(
            xml,
            &format!("gm:{}", gpx11::ZOOM),
            Some(&fmt::format_zoom(point.zoom_min)),
        );
    }
    if point.zoom_max > 0 {
        element(
            xml,
            &format!("gm:{}", gpx11::ZOOM_MAX),
            Some(&fmt::format_zoom(point.zoom_max)),
        );
    }

    writeln!(xml, "\t\t</{}>", kml22::PLACEMARK).expect("write to string");
}

fn coordinates(xml: &mut String, point: &GeoPoint) {
    writeln!(
        xml,
        "\t\t\t\t<{0}>{1},{2}</{0}>",
        kml22::COORDINATES,
        fmt::format_lat_lon(point.longitude),
        fmt::format_lat_lon(point.latitude),
    )
    .expect("write to string");
}

fn element(xml: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        writeln!(xml, "\t\t\t<{name}>{}</{name}>", escape_element(value))
            .expect("write to string");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::reader::GeoXmlReader;

    fn point_with_symbol(lat: f64, symbol: &str) -> GeoPoint {
        let mut point = GeoPoint::with_lat_lon(lat, 9.2);
        point.symbol = Some(symbol.to_string());
        point
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(to_kml_xml(&[]), "");
        assert_eq!(to_kml_xml(&[GeoPoint::new()]), "");
    }

    #[test]
    fn shared_symbol_url_produces_one_icon_style() {
        let points = [
            point_with_symbol(52.1, "https://icons/pin.png"),
            point_with_symbol(52.2, "https://icons/pin.png"),
        ];
        let xml = to_kml_xml(&points);
        assert_eq!(xml.matches("<IconStyle").count(), 1);
        assert_eq!(xml.matches("<styleUrl>#pin</styleUrl>").count(), 2);
    }

    #[test]
    fn basename_collisions_get_numeric_suffixes() {
        let points = [
            point_with_symbol(52.1, "https://a/pin.png"),
            point_with_symbol(52.2, "https://b/pin.png"),
        ];
        let xml = to_kml_xml(&points);
        assert!(xml.contains("<IconStyle id='pin'>"));
        assert!(xml.contains("<IconStyle id='pin-2'>"));
        assert!(xml.contains("<styleUrl>#pin</styleUrl>"));
        assert!(xml.contains("<styleUrl>#pin-2</styleUrl>"));
    }

    #[test]
    fn query_strings_are_cut_from_style_ids() {
        let points = [point_with_symbol(
            52.1,
            "https://server/path/to/Symbol.jpg?hello=world&32",
        )];
        let xml = to_kml_xml(&points);
        assert!(xml.contains("<IconStyle id='Symbol'>"));
    }

    #[test]
    fn symbols_round_trip_through_the_style_table() {
        let points = [point_with_symbol(52.1, "https://icons/pin.png")];
        let xml = to_kml_xml(&points);

        let imported = GeoXmlReader::new().read_str(&xml).expect("parse own output");
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].symbol.as_deref(), Some("https://icons/pin.png"));
        assert_eq!(imported[0].latitude, 52.1);
        assert_eq!(imported[0].longitude, 9.2);
    }

    #[test]
    fn coordinates_are_lon_lat_ordered() {
        let xml = to_kml_xml(&[GeoPoint::with_lat_lon(53.1, 8.7)]);
        assert!(xml.contains("<coordinates>8.7,53.1</coordinates>"));
    }

    #[test]
    fn time_and_zoom_round_trip() {
        let mut point = GeoPoint::with_lat_lon(53.1, 8.7);
        point.time = fmt::parse_date("2014-12-19T21:13:21Z");
        point.zoom_min = 5;
        point.zoom_max = 7;
        let xml = to_kml_xml(&[point]);

        let imported = GeoXmlReader::new().read_str(&xml).expect("parse own output");
        assert_eq!(imported[0].time, fmt::parse_date("2014-12-19T21:13:21Z"));
        assert_eq!(imported[0].zoom_min, 5);
        assert_eq!(imported[0].zoom_max, 7);
    }
}

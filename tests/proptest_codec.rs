//! Property tests: formatting and re-parsing must agree for any point the
//! codecs can represent.

use geomark::{fmt, to_gpx_xml, to_kml_xml, to_poi_xml, GeoPoint, GeoUri, GeoXmlReader};
use proptest::prelude::*;

/// Coordinates quantized to the 7 fractional digits the text form keeps.
fn arb_lat() -> impl Strategy<Value = f64> {
    (-900_000_000i64..=900_000_000).prop_map(|n| n as f64 / 1e7)
}

fn arb_lon() -> impl Strategy<Value = f64> {
    (-1_800_000_000i64..=1_800_000_000).prop_map(|n| n as f64 / 1e7)
}

/// Names that survive every carrier: no XML markup, no uri delimiters, no
/// leading/trailing or doubled whitespace.
fn arb_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-zA-Z][a-zA-Z0-9]{0,11}( [a-zA-Z0-9]{1,8}){0,2}")
        .expect("valid strategy")
}

fn arb_point() -> impl Strategy<Value = GeoPoint> {
    (
        arb_lat(),
        arb_lon(),
        proptest::option::of(arb_name()),
        proptest::option::of(arb_name()),
        proptest::option::of(1i32..64),
    )
        .prop_map(|(latitude, longitude, name, description, zoom)| {
            let mut point = GeoPoint::with_lat_lon(latitude, longitude);
            point.name = name;
            point.description = description;
            point.zoom_min = zoom.unwrap_or(geomark::NO_ZOOM);
            point
        })
        .prop_filter("writers skip empty points", |point| !point.is_empty())
}

proptest! {
    #[test]
    fn lat_lon_text_round_trips_exactly(value in arb_lat()) {
        let text = fmt::format_lat_lon(value);
        prop_assert_eq!(fmt::parse_lat_or_lon(&text), Some(value));
    }

    #[test]
    fn geo_uri_round_trips(point in arb_point()) {
        let codec = GeoUri::new();
        let uri = codec.format(&point);
        let parsed = codec.parse(&uri).expect("own output is recognized");

        prop_assert_eq!(parsed.latitude, point.latitude);
        prop_assert_eq!(parsed.longitude, point.longitude);
        prop_assert_eq!(&parsed.name, &point.name);
        prop_assert_eq!(&parsed.description, &point.description);
        prop_assert_eq!(parsed.zoom_min, point.zoom_min);
    }

    #[test]
    fn poi_xml_round_trips(point in arb_point()) {
        let xml = to_poi_xml(std::slice::from_ref(&point));
        let imported = GeoXmlReader::new().read_str(&xml).expect("parse own output");

        prop_assert_eq!(imported.len(), 1);
        prop_assert_eq!(imported[0].latitude, point.latitude);
        prop_assert_eq!(imported[0].longitude, point.longitude);
        prop_assert_eq!(&imported[0].name, &point.name);
        prop_assert_eq!(imported[0].zoom_min, point.zoom_min);
    }

    #[test]
    fn gpx_and_kml_agree_on_every_point(point in arb_point()) {
        let from_gpx = GeoXmlReader::new()
            .read_str(&to_gpx_xml(std::slice::from_ref(&point)))
            .expect("parse gpx output");
        let from_kml = GeoXmlReader::new()
            .read_str(&to_kml_xml(std::slice::from_ref(&point)))
            .expect("parse kml output");

        prop_assert_eq!(from_gpx.len(), 1);
        prop_assert_eq!(from_kml.len(), 1);
        prop_assert_eq!(from_gpx[0].latitude, from_kml[0].latitude);
        prop_assert_eq!(from_gpx[0].longitude, from_kml[0].longitude);
        prop_assert_eq!(&from_gpx[0].name, &from_kml[0].name);
        prop_assert_eq!(&from_gpx[0].description, &from_kml[0].description);
    }
}

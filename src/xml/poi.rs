//! Compact POI writer: one self-closing `<poi/>` per point, every field
//! an attribute named after its geo-uri query key.

use std::fmt::Write;

use crate::fmt;
use crate::point::GeoPoint;
use crate::xml::dialect::poi;
use crate::xml::escape::escape_attribute;

const HEADER: &str = "<?xml version='1.0' encoding='UTF-8'?>\n<gm xmlns='uri:geomark'>";
const FOOTER: &str = "\n</gm>";

/// Formats all non-empty points as one POI document. An input without any
/// writable point yields the empty string.
pub fn to_poi_xml(points: &[GeoPoint]) -> String {
    let mut xml = String::new();
    for point in points {
        if point.is_empty() {
            continue;
        }
        if xml.is_empty() {
            xml.push_str(HEADER);
        }
        xml.push_str("\n\t");
        append_poi(&mut xml, point);
    }
    if !xml.is_empty() {
        xml.push_str(FOOTER);
    }
    xml
}

/// Appends one `<poi ... />` fragment for `point`.
pub fn append_poi(xml: &mut String, point: &GeoPoint) {
    write!(xml, "<{}", poi::POI).expect("write to string");

    attr(xml, poi::ATTR_DESCRIPTION, point.description.as_deref());
    attr(xml, poi::ATTR_ID, point.id.as_deref());
    if !GeoPoint::is_empty_lat_lon(point.latitude, point.longitude) {
        attr(
            xml,
            poi::ATTR_LAT_LON,
            Some(&format!(
                "{},{}",
                fmt::format_lat_lon(point.latitude),
                fmt::format_lat_lon(point.longitude)
            )),
        );
    }
    if let Some(time) = point.time {
        attr(xml, poi::ATTR_TIME, Some(&fmt::format_date(&time)));
    }
    attr(xml, poi::ATTR_NAME, point.name.as_deref());
    attr(xml, poi::ATTR_LINK, point.link.as_deref());
    attr(xml, poi::ATTR_SYMBOL, point.symbol.as_deref());
    if point.zoom_min > 0 {
        attr(xml, poi::ATTR_ZOOM, Some(&fmt::format_zoom(point.zoom_min)));
    }
    if point.zoom_max > 0 {
        attr(xml, poi::ATTR_ZOOM_MAX, Some(&fmt::format_zoom(point.zoom_max)));
    }

    xml.push_str(" />");
}

fn attr(xml: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        write!(xml, " {name}='{}'", escape_attribute(value)).expect("write to string");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::reader::GeoXmlReader;

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(to_poi_xml(&[]), "");
        assert_eq!(to_poi_xml(&[GeoPoint::new()]), "");
    }

    #[test]
    fn fragment_for_empty_point_has_no_ll_attribute() {
        let mut xml = String::new();
        append_poi(&mut xml, &GeoPoint::new());
        assert_eq!(xml, "<poi />");
    }

    #[test]
    fn minimal_point_is_one_ll_attribute() {
        let mut xml = String::new();
        append_poi(&mut xml, &GeoPoint::with_lat_lon(52.1, 9.2));
        assert_eq!(xml, "<poi ll='52.1,9.2' />");
    }

    #[test]
    fn attributes_follow_the_fixed_order() {
        let mut point = GeoPoint::with_lat_lon(52.0, 9.0);
        point.description = Some("theDesc".to_string());
        point.id = Some("theId".to_string());
        point.name = Some("theName".to_string());
        point.link = Some("theLink".to_string());
        point.symbol = Some("theIconUrl".to_string());
        point.time = fmt::parse_date("2015-02-10T08:04:45Z");
        point.zoom_min = 5;
        point.zoom_max = 7;

        let mut xml = String::new();
        append_poi(&mut xml, &point);
        assert_eq!(
            xml,
            "<poi d='theDesc' id='theId' ll='52,9' t='2015-02-10T08:04:45Z' \
             n='theName' link='theLink' s='theIconUrl' z='5' z2='7' />"
        );
    }

    #[test]
    fn document_round_trips_through_the_reader() {
        let mut point = GeoPoint::with_lat_lon(53.1099972, 8.7178206);
        point.name = Some("myName  with forbidden chars <hello world='' >".to_string());
        point.link = Some("https://server/path/to/link?hello=world&32".to_string());
        let exported = to_poi_xml(&[point.clone(), GeoPoint::new()]);

        let imported = GeoXmlReader::new().read_str(&exported).expect("parse own output");
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].latitude, point.latitude);
        assert_eq!(imported[0].longitude, point.longitude);
        assert_eq!(imported[0].link, point.link);
        // attribute escaping folds the double space
        assert_eq!(
            imported[0].name.as_deref(),
            Some("myName with forbidden chars <hello world='' >")
        );
    }
}

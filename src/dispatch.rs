//! Text-or-XML input classification.
//!
//! Shared clipboards and intent payloads carry either a cr/lf separated
//! list of geo-uris (optionally with `#` comment lines) or an XML blob in
//! one of the supported dialects. The classifier only looks at the first
//! characters: `#` or `geo:` selects line mode, everything else is
//! treated as XML.

use tracing::debug;

use crate::error::GeomarkError;
use crate::point::GeoPoint;
use crate::uri::{GeoUri, GEO_SCHEME};
use crate::xml::GeoXmlReader;

const COMMENT: &str = "#";
const XML_DECLARATION: &str = "<?xml";

/// Parses a text blob into points, auto-detecting line mode vs XML mode.
///
/// Line mode never fails; malformed uri parts simply leave fields unset.
/// XML mode propagates the reader's hard errors.
pub fn parse_text_or_xml(input: &str) -> Result<Vec<GeoPoint>, GeomarkError> {
    if input.starts_with(COMMENT) || input.starts_with(GEO_SCHEME) {
        debug!("line mode");
        Ok(parse_lines(input))
    } else {
        debug!("xml mode");
        parse_xml(input)
    }
}

fn parse_lines(input: &str) -> Vec<GeoPoint> {
    let codec = GeoUri::new();
    let mut points = Vec::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT) {
            continue;
        }
        let mut point = GeoPoint::new();
        if !codec.parse_into(line, &mut point) {
            debug!(line, "dropped line with unrecognized scheme");
            continue;
        }
        if is_displayable(&point) {
            points.push(point);
        } else {
            debug!(line, "dropped non-displayable line");
        }
    }
    points
}

/// A point whose id starts with `#` is a persisted tombstone, an empty id
/// is malformed; both are dropped. Points without any id pass.
fn is_displayable(point: &GeoPoint) -> bool {
    match point.id.as_deref() {
        Some(id) => !id.is_empty() && !id.starts_with(COMMENT),
        None => true,
    }
}

fn parse_xml(input: &str) -> Result<Vec<GeoPoint>, GeomarkError> {
    let mut reader = GeoXmlReader::new();
    if input.starts_with(XML_DECLARATION) {
        reader.read_str(input)
    } else {
        // rootless fragments get a synthetic root
        reader.read_str(&format!("<xml>{input}</xml>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::gpx;

    #[test]
    fn parses_xml_document() {
        let data = "<?xml version='1.0' encoding='UTF-8'?>\n\
                    <root><poi ll='52.2,9.2'/><poi ll='52.1,9.1'/></root>";
        let points = parse_text_or_xml(data).expect("parse");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].latitude, 52.2);
    }

    #[test]
    fn parses_rootless_xml_fragment() {
        let points =
            parse_text_or_xml("<poi ll='52.2,9.2'/><poi ll='52.1,9.1'/>").expect("parse");
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn parses_generated_trkpt_fragments() {
        let mut fragments = String::new();
        gpx::append_trkpt(&mut fragments, &GeoPoint::with_lat_lon(1.0, 1.0));
        gpx::append_trkpt(&mut fragments, &GeoPoint::with_lat_lon(1.0, 1.0));

        let points = parse_text_or_xml(&fragments).expect("parse");
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn parses_uri_lines_skipping_comments_and_blanks() {
        let data = "#test uri\n\
                    geo:52.1,9.1\n\
                    \n\
                    geo:52.2,9.2\n";
        let points = parse_text_or_xml(data).expect("parse");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].latitude, 52.1);
        assert_eq!(points[1].longitude, 9.2);
    }

    #[test]
    fn line_mode_keeps_points_without_id() {
        let points = parse_text_or_xml("geo:1,2\n").expect("parse");
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn line_mode_drops_tombstone_and_empty_ids() {
        let data = "geo:1,2?id=%23gone\n\
                    geo:3,4?id=kept\n";
        let points = parse_text_or_xml(data).expect("parse");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id.as_deref(), Some("kept"));
    }

    #[test]
    fn line_mode_skips_unrecognized_schemes() {
        let data = "geo:1,2\n\
                    mailto:someone@example.org\n\
                    geo:3,4\n";
        let points = parse_text_or_xml(data).expect("parse");
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].latitude, 3.0);
    }

    #[test]
    fn line_mode_never_infers() {
        let points = parse_text_or_xml("geo:?d=somewhere%20(Bremen)\n").expect("parse");
        assert_eq!(points.len(), 1);
        assert!(points[0].name.is_none());
        assert_eq!(points[0].description.as_deref(), Some("somewhere (Bremen)"));
    }

    #[test]
    fn malformed_xml_surfaces_an_error() {
        assert!(parse_text_or_xml("<trkpt lat='x' lon='2'></trkpt>").is_err());
        assert!(parse_text_or_xml("<a><b></a>").is_err());
    }
}

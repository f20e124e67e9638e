//! Streaming multi-dialect XML reader.
//!
//! A single pull-parser pass over the document; no tree is built. Element
//! names are dispatched after stripping any namespace prefix, which is
//! what lets one state machine read GPX 1.0/1.1 track points, KML
//! placemarks, compact `<poi/>` elements and wikimedia `<page>` blocks
//! from the same stream.
//!
//! The reader owns one scratch [`GeoPoint`]. Every emitted point is a deep
//! clone of the scratch taken at the closing tag; the scratch itself never
//! leaves this module (later elements reuse and mutate it, so handing it
//! out would corrupt previously emitted points).
//!
//! Failure policy is asymmetric on purpose: a malformed coordinate tuple
//! or timestamp aborts the whole document (hard), while the same text
//! inside a geo-uri would merely leave the field unset.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::dialect::{gpx10, gpx11, kml22, poi, wikimedia};
use crate::error::GeomarkError;
use crate::fmt;
use crate::point::GeoPoint;
use crate::uri::{self, GeoUri, GeoUriOptions};

/// Event-driven reader emitting one [`GeoPoint`] per recognized element
/// block, in document order.
///
/// A reader instance is single-document state; run independent documents
/// on independent instances.
#[derive(Default)]
pub struct GeoXmlReader {
    /// Reusable scratch point; cleared at every point-open, cloned at
    /// every point-close.
    scratch: GeoPoint,
    point_open: bool,

    /// Character data since the last element-open, buffered only while a
    /// point or an icon definition is open.
    text: String,

    /// Id of the icon definition currently being captured.
    icon_id: Option<String>,
    /// Document-scoped `#id` -> icon url table. Lookups only succeed for
    /// definitions that appeared earlier in the document.
    icon_urls: HashMap<String, String>,

    /// Codec for embedded `geoUri` attributes; rebuilt whenever an
    /// element carries its own `infer` attribute.
    uri_codec: Option<GeoUri>,
}

impl GeoXmlReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads all points from `xml` in document order.
    pub fn read_str(&mut self, xml: &str) -> Result<Vec<GeoPoint>, GeomarkError> {
        let mut points = Vec::new();
        self.parse(xml, |point| points.push(point))?;
        Ok(points)
    }

    /// Streams `xml`, handing each completed point to `emit`.
    pub fn parse<F>(&mut self, xml: &str, mut emit: F) -> Result<(), GeomarkError>
    where
        F: FnMut(GeoPoint),
    {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event()? {
                Event::Start(element) => {
                    let name = local_name(&element);
                    self.on_open(&name, &element)?;
                }
                Event::Empty(element) => {
                    let name = local_name(&element);
                    self.on_open(&name, &element)?;
                    self.on_close(&name, &mut emit)?;
                }
                Event::Text(data) => {
                    if self.buffering() {
                        self.text.push_str(&data.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if self.buffering() {
                        let raw = data.into_inner();
                        self.text.push_str(&String::from_utf8_lossy(&raw));
                    }
                }
                Event::End(element) => {
                    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                    self.on_close(&name, &mut emit)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn buffering(&self) -> bool {
        self.point_open || self.icon_id.is_some()
    }

    fn on_open(&mut self, name: &str, element: &BytesStart) -> Result<(), GeomarkError> {
        match name {
            gpx11::TRKPT | gpx10::WPT => {
                self.start_point(element);
                self.set_lat_lon_attributes(name, element)?;
            }
            kml22::PLACEMARK | poi::POI => {
                self.start_point(element);
            }
            wikimedia::PAGE => {
                self.start_point(element);
                self.scratch.id = attribute(element, wikimedia::ATTR_ID);
                self.scratch.name = attribute(element, wikimedia::ATTR_TITLE);
                self.scratch.link = attribute(element, wikimedia::ATTR_LINK);
                if let Some(time) =
                    attribute(element, wikimedia::ATTR_TIME).and_then(|raw| fmt::parse_date(&raw))
                {
                    self.scratch.time = Some(time);
                }
            }
            wikimedia::COORDINATE if self.point_open => {
                self.set_lat_lon_attributes(name, element)?;
            }
            wikimedia::IMAGE if self.point_open => {
                if let Some(symbol) = attribute(element, wikimedia::ATTR_IMAGE) {
                    self.scratch.symbol = Some(symbol);
                }
            }
            kml22::ICON_DEFINITION => {
                self.icon_id = attribute(element, kml22::ATTR_DEFINITION_ID);
            }
            gpx11::LINK | gpx10::URL if self.point_open => {
                // attribute-supplied link wins over later element text
                if self.scratch.link.is_none() {
                    self.scratch.link = attribute(element, gpx11::ATTR_LINK);
                }
            }
            _ => {}
        }

        if self.buffering() {
            self.text.clear();
        }
        Ok(())
    }

    fn on_close<F>(&mut self, name: &str, emit: &mut F) -> Result<(), GeomarkError>
    where
        F: FnMut(GeoPoint),
    {
        let text = self.text.trim().to_string();

        match name {
            gpx11::TRKPT | gpx10::WPT | kml22::PLACEMARK | poi::POI | wikimedia::PAGE
                if self.point_open =>
            {
                if let Some(description) = self.scratch.description.clone() {
                    uri::infer_missing(&mut self.scratch, &description);
                }
                debug!(name = self.scratch.name.as_deref(), "point complete");
                // clone-on-emit: the scratch is reused for the next block
                emit(self.scratch.clone());
                self.point_open = false;
            }
            kml22::ICON_DEFINITION => {
                self.icon_id = None;
            }
            kml22::ICON_DEFINITION_URL if self.icon_id.is_some() => {
                if let Some(id) = &self.icon_id {
                    self.icon_urls.insert(format!("#{id}"), text);
                }
            }
            _ if self.point_open => self.on_point_leaf(name, &text)?,
            _ => {}
        }
        Ok(())
    }

    fn on_point_leaf(&mut self, name: &str, text: &str) -> Result<(), GeomarkError> {
        match name {
            gpx11::NAME => {
                if !text.is_empty() {
                    self.scratch.name = Some(text.to_string());
                }
            }
            gpx11::DESC | kml22::DESCRIPTION | wikimedia::DESCRIPTION => {
                if !text.is_empty() {
                    self.scratch.description = Some(text.to_string());
                }
            }
            gpx11::LINK | gpx10::URL => {
                if self.scratch.link.is_none() && !text.is_empty() {
                    self.scratch.link = Some(text.to_string());
                }
            }
            gpx11::SYMBOL => {
                if !text.is_empty() {
                    self.scratch.symbol = Some(text.to_string());
                }
            }
            kml22::ICON_REFERENCE_ID => {
                let symbol = match self.icon_urls.get(text) {
                    Some(url) => Some(url.clone()),
                    // no matching definition: a non-#-reference is taken
                    // as the icon url itself
                    None if !text.starts_with('#') => Some(text.to_string()),
                    None => None,
                };
                if let Some(symbol) = symbol {
                    self.scratch.symbol = Some(symbol);
                }
            }
            poi::ATTR_ID => {
                if !text.is_empty() {
                    self.scratch.id = Some(text.to_string());
                }
            }
            gpx11::TIME | kml22::TIMESTAMP_WHEN | kml22::TIMESPAN_BEGIN => {
                match fmt::parse_date(text) {
                    Some(time) => self.scratch.time = Some(time),
                    None => {
                        return Err(GeomarkError::Timestamp {
                            element: name.to_string(),
                            text: text.to_string(),
                        });
                    }
                }
            }
            kml22::COORDINATES | kml22::COORDINATES2 if !text.is_empty() => {
                // one or more lon,lat[,altitude] tuples; only the first is used
                let parts: Vec<&str> = text
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .collect();
                if parts.len() >= 2 {
                    let lon = parse_coordinate(name, text, parts[0])?;
                    let lat = parse_coordinate(name, text, parts[1])?;
                    self.scratch.latitude = lat;
                    self.scratch.longitude = lon;
                }
            }
            gpx11::ZOOM => {
                self.scratch.zoom_min = fmt::parse_zoom(text);
            }
            gpx11::ZOOM_MAX => {
                self.scratch.zoom_max = fmt::parse_zoom(text);
            }
            _ => {}
        }
        Ok(())
    }

    /// Opens a fresh point on the scratch buffer, seeded from an embedded
    /// `geoUri` attribute first and explicit attributes second (explicit
    /// values win).
    fn start_point(&mut self, element: &BytesStart) {
        self.scratch.clear();
        self.point_open = true;
        debug!("point open");

        if let Some(geo_uri) = attribute(element, poi::ATTR_GEO_URI) {
            let infer_attr = attribute(element, poi::ATTR_INFER);
            if infer_attr.is_some() || self.uri_codec.is_none() {
                // everything except "0..." / "f..." enables inference
                let infer = infer_attr.as_deref().is_some_and(|mode| {
                    let mode = mode.trim().to_lowercase();
                    !(mode.starts_with('0') || mode.starts_with('f'))
                });
                self.uri_codec = Some(GeoUri::with_options(GeoUriOptions {
                    parse_infer_missing: infer,
                    ..GeoUriOptions::default()
                }));
            }
            if let Some(codec) = &self.uri_codec {
                codec.parse_into(&geo_uri, &mut self.scratch);
            }
        }

        if let Some(raw) = attribute(element, poi::ATTR_LAT_LON) {
            uri::parse_lat_lon(&mut self.scratch, &raw);
        }
        if let Some(value) = attribute(element, poi::ATTR_NAME) {
            self.scratch.name = Some(value);
        }
        if let Some(value) = attribute(element, poi::ATTR_DESCRIPTION) {
            self.scratch.description = Some(value);
        }
        if let Some(value) = attribute(element, poi::ATTR_ID) {
            self.scratch.id = Some(value);
        }
        if let Some(value) = attribute(element, poi::ATTR_LINK) {
            self.scratch.link = Some(value);
        }
        if let Some(value) = attribute(element, poi::ATTR_SYMBOL) {
            self.scratch.symbol = Some(value);
        }
        if let Some(value) = attribute(element, poi::ATTR_ZOOM) {
            self.scratch.zoom_min = fmt::parse_zoom(&value);
        }
        if let Some(value) = attribute(element, poi::ATTR_ZOOM_MAX) {
            self.scratch.zoom_max = fmt::parse_zoom(&value);
        }
        if let Some(value) = attribute(element, poi::ATTR_TIME) {
            self.scratch.time = fmt::parse_date(&value);
        }
    }

    /// Applies `lat`/`lon` attributes; malformed numeric text is a hard
    /// error, unlike the uri codec's soft failures.
    fn set_lat_lon_attributes(
        &mut self,
        name: &str,
        element: &BytesStart,
    ) -> Result<(), GeomarkError> {
        if let Some(raw) = attribute(element, gpx11::ATTR_LAT) {
            self.scratch.latitude = raw.parse::<f64>().map_err(|_| {
                GeomarkError::CoordinateAttribute {
                    element: name.to_string(),
                    attribute: gpx11::ATTR_LAT.to_string(),
                    text: raw.clone(),
                }
            })?;
        }
        if let Some(raw) = attribute(element, gpx11::ATTR_LON) {
            self.scratch.longitude = raw.parse::<f64>().map_err(|_| {
                GeomarkError::CoordinateAttribute {
                    element: name.to_string(),
                    attribute: gpx11::ATTR_LON.to_string(),
                    text: raw.clone(),
                }
            })?;
        }
        Ok(())
    }
}

fn local_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.name().local_name().as_ref()).into_owned()
}

fn attribute(element: &BytesStart, name: &str) -> Option<String> {
    element.attributes().flatten().find_map(|attr| {
        (attr.key.local_name().as_ref() == name.as_bytes())
            .then(|| attr.unescape_value().ok().map(|value| value.into_owned()))
            .flatten()
    })
}

fn parse_coordinate(element: &str, tuple: &str, token: &str) -> Result<f64, GeomarkError> {
    token
        .parse::<f64>()
        .map_err(|_| GeomarkError::CoordinateTuple {
            element: element.to_string(),
            text: tuple.to_string(),
        })
}

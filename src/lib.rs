//! Geomark: bidirectional codec for geographic point data.
//!
//! Geomark converts points between the `geo:`/`geoarea:` uri notation and
//! a set of XML interchange formats. The uri side also understands share
//! links from common web map providers and can infer missing fields from
//! free text; the XML side reads GPX 1.0/1.1, KML, compact POI and
//! wikimedia geodata documents in one streaming pass and writes GPX, KML
//! and POI.
//!
//! # Modules
//!
//! - [`point`]: The [`GeoPoint`] data model and its emptiness/identity rules
//! - [`uri`]: `geo:` uri parsing/formatting, provider links, inference
//! - [`xml`]: Streaming multi-dialect reader and the three writers
//! - [`dispatch`]: Classifies a blob as uri lines or XML and parses it
//! - [`fmt`]: Primitive lat/lon, zoom and timestamp codecs
//! - [`error`]: Error types for geomark operations
//!
//! # Example
//!
//! ```
//! use geomark::GeoUri;
//!
//! let codec = GeoUri::new();
//! let point = codec.parse("geo:52.1,9.2?z=14").unwrap();
//! assert_eq!(point.latitude, 52.1);
//! assert_eq!(point.zoom_min, 14);
//! assert_eq!(codec.format(&point), "geo:52.1,9.2?z=14");
//! ```

pub mod dispatch;
pub mod error;
pub mod fmt;
pub mod point;
pub mod uri;
pub mod xml;

pub use dispatch::parse_text_or_xml;
pub use error::GeomarkError;
pub use point::{GeoPoint, NO_LAT_LON, NO_ZOOM};
pub use uri::{GeoUri, GeoUriOptions};
pub use xml::{to_gpx_xml, to_kml_xml, to_poi_xml, GeoXmlReader};

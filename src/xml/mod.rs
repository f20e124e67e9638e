//! XML import and export.
//!
//! One streaming [`reader`] handles all supported dialects in a single
//! pass; the writers are per-format.

pub mod dialect;
pub mod escape;
pub mod gpx;
pub mod kml;
pub mod poi;
pub mod reader;

pub use gpx::to_gpx_xml;
pub use kml::to_kml_xml;
pub use poi::to_poi_xml;
pub use reader::GeoXmlReader;

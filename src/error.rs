use thiserror::Error;

/// The main error type for geomark operations.
///
/// Only hard failures become errors: a hard failure aborts the current
/// document with no partial-result recovery. Soft failures (malformed
/// numeric or zoom tokens in URIs, unmatched provider markers, unknown
/// schemes) never surface here; they leave the affected field unset and
/// parsing continues.
#[derive(Debug, Error)]
pub enum GeomarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid coordinate tuple in <{element}>: expected 'lon,lat,...' but got '{text}'")]
    CoordinateTuple { element: String, text: String },

    #[error("Invalid coordinate attribute {attribute}='{text}' on <{element}>")]
    CoordinateAttribute {
        element: String,
        attribute: String,
        text: String,
    },

    #[error("Invalid timestamp in <{element}>: '{text}'")]
    Timestamp { element: String, text: String },
}

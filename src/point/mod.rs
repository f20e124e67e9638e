//! The canonical point representation all conversions pass through.

mod model;

pub use model::{GeoPoint, NO_LAT_LON, NO_ZOOM};

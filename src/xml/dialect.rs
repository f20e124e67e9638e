//! Element and attribute names of the supported XML dialects.
//!
//! The reader dispatches on these after stripping any namespace prefix,
//! so `gpx:trkpt`, `g:trkpt` and `trkpt` are all [`gpx11::TRKPT`].

/// GPX 1.1 track points.
pub mod gpx11 {
    pub const TRKPT: &str = "trkpt";
    pub const ATTR_LAT: &str = "lat";
    pub const ATTR_LON: &str = "lon";
    pub const NAME: &str = "name";
    pub const DESC: &str = "desc";
    pub const TIME: &str = "time";
    /// `<link href=''/>`, also used by atom.
    pub const LINK: &str = "link";
    pub const ATTR_LINK: &str = "href";
    pub const SYMBOL: &str = "sym";
    /// Supplementary fields live in `<extensions>` under this prefix.
    pub const EXTENSIONS: &str = "extensions";
    pub const ZOOM: &str = "zoom";
    pub const ZOOM_MAX: &str = "zoom2";
}

/// GPX 1.0 aliases.
pub mod gpx10 {
    /// Alias for `trkpt`.
    pub const WPT: &str = "wpt";
    /// Alias for `link`.
    pub const URL: &str = "url";
}

/// KML 2.2 placemarks.
pub mod kml22 {
    pub const PLACEMARK: &str = "Placemark";
    pub const DESCRIPTION: &str = "description";

    // coordinates use lon,lat reverse order
    pub const COORDINATES: &str = "coordinates";
    pub const COORDINATES2: &str = "coord";
    pub const TIMESTAMP_WHEN: &str = "when";
    pub const TIMESPAN_BEGIN: &str = "begin";

    // icons are defined separately from their uses
    pub const ICON_CONTAINER: &str = "Style";
    pub const ICON_DEFINITION: &str = "IconStyle";
    pub const ATTR_DEFINITION_ID: &str = "id";
    pub const ICON_DEFINITION_URL: &str = "href";
    pub const ICON_REFERENCE_ID: &str = "styleUrl";
}

/// Read-only wikimedia geodata pages.
pub mod wikimedia {
    pub const PAGE: &str = "page";
    pub const ATTR_LINK: &str = "fullurl";
    pub const ATTR_ID: &str = "pageid";
    pub const ATTR_TITLE: &str = "title";
    pub const ATTR_TIME: &str = "touched";

    pub const COORDINATE: &str = "co";

    pub const IMAGE: &str = "thumbnail";
    pub const ATTR_IMAGE: &str = "source";

    pub const DESCRIPTION: &str = "extract";
}

/// Compact POI dialect: one self-closing element, everything in
/// attributes named after the geo-uri query keys.
pub mod poi {
    pub const POI: &str = "poi";
    pub const ATTR_DESCRIPTION: &str = "d";
    pub const ATTR_ID: &str = "id";
    pub const ATTR_LAT_LON: &str = "ll";
    pub const ATTR_TIME: &str = "t";
    pub const ATTR_NAME: &str = "n";
    pub const ATTR_LINK: &str = "link";
    pub const ATTR_SYMBOL: &str = "s";
    pub const ATTR_ZOOM: &str = "z";
    pub const ATTR_ZOOM_MAX: &str = "z2";

    /// Optional embedded geo-uri, decoded before explicit attributes.
    pub const ATTR_GEO_URI: &str = "geoUri";
    /// `"0"`/`"false"` disable inference for [`ATTR_GEO_URI`].
    pub const ATTR_INFER: &str = "infer";
}

//! Canonical geographic point model.
//!
//! Every reader parses into [`GeoPoint`] and every writer serializes from
//! it. Coordinates use a reserved maximum-magnitude sentinel instead of an
//! `Option` so that "unset" survives textual round trips that have no
//! notion of null (real coordinates are bounded by ±90/±180, the sentinel
//! is not).

use chrono::{DateTime, Utc};

/// Sentinel for an unset latitude or longitude.
pub const NO_LAT_LON: f64 = f64::MAX;

/// Sentinel for an unset zoom bound.
pub const NO_ZOOM: i32 = -1;

/// A single geographic point with optional descriptive metadata.
///
/// Created fresh by a parser for each recognized block, or built explicitly
/// by a caller; mutated only before being handed to a writer.
#[derive(Clone, Debug)]
pub struct GeoPoint {
    /// Latitude in degrees, [`NO_LAT_LON`] if unset.
    pub latitude: f64,

    /// Longitude in degrees, [`NO_LAT_LON`] if unset.
    pub longitude: f64,

    /// Smallest zoom level this point is visible at; [`NO_ZOOM`] = no bound.
    pub zoom_min: i32,

    /// Largest zoom level this point is visible at; [`NO_ZOOM`] = no bound.
    pub zoom_max: i32,

    /// When the point was measured, if known.
    pub time: Option<DateTime<Utc>>,

    /// Short display name.
    pub name: Option<String>,

    /// Free-text description.
    pub description: Option<String>,

    /// Identity of the point. When set on both sides it dominates equality.
    pub id: Option<String>,

    /// Link to additional information about this point.
    pub link: Option<String>,

    /// Icon url for this point.
    pub symbol: Option<String>,
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self {
            latitude: NO_LAT_LON,
            longitude: NO_LAT_LON,
            zoom_min: NO_ZOOM,
            zoom_max: NO_ZOOM,
            time: None,
            name: None,
            description: None,
            id: None,
            link: None,
            symbol: None,
        }
    }
}

impl GeoPoint {
    /// A point with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// A point with coordinates set and everything else unset.
    pub fn with_lat_lon(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..Self::default()
        }
    }

    /// True if `value` is the unset-coordinate sentinel.
    pub fn is_unset_coordinate(value: f64) -> bool {
        value == NO_LAT_LON
    }

    /// True if either coordinate is unset, or if both are exactly `0.0`.
    pub fn is_empty(&self) -> bool {
        Self::is_empty_lat_lon(self.latitude, self.longitude)
    }

    /// [`GeoPoint::is_empty`] on a raw coordinate pair.
    pub fn is_empty_lat_lon(latitude: f64, longitude: f64) -> bool {
        if Self::is_unset_coordinate(latitude) || Self::is_unset_coordinate(longitude) {
            return true;
        }
        latitude == 0.0 && longitude == 0.0
    }

    /// Resets every field back to its sentinel so the value can be reused
    /// as a parser scratch buffer.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Identity: ids dominate when both are present, otherwise exact
/// coordinate equality. No epsilon on purpose; see the boundary test in
/// `tests/uri_roundtrip.rs` before changing this.
impl PartialEq for GeoPoint {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(lhs), Some(rhs)) = (&self.id, &other.id) {
            return lhs == rhs;
        }
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_point_is_empty() {
        assert!(GeoPoint::new().is_empty());
    }

    #[test]
    fn zero_zero_is_empty_but_zero_lat_alone_is_not() {
        assert!(GeoPoint::with_lat_lon(0.0, 0.0).is_empty());
        assert!(!GeoPoint::with_lat_lon(0.0, 9.2).is_empty());
        assert!(!GeoPoint::with_lat_lon(52.1, 0.0).is_empty());
    }

    #[test]
    fn missing_longitude_is_empty() {
        assert!(GeoPoint::with_lat_lon(52.1, NO_LAT_LON).is_empty());
    }

    #[test]
    fn equality_prefers_ids() {
        let mut a = GeoPoint::with_lat_lon(1.0, 2.0);
        let mut b = GeoPoint::with_lat_lon(3.0, 4.0);
        a.id = Some("x".to_string());
        b.id = Some("x".to_string());
        assert_eq!(a, b);

        b.id = Some("y".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn equality_without_ids_compares_coordinates_exactly() {
        let a = GeoPoint::with_lat_lon(1.0, 2.0);
        let b = GeoPoint::with_lat_lon(1.0, 2.0);
        assert_eq!(a, b);
        assert_ne!(a, GeoPoint::with_lat_lon(1.0 + 1e-12, 2.0));
    }

    #[test]
    fn clear_resets_all_fields() {
        let mut p = GeoPoint::with_lat_lon(1.0, 2.0);
        p.name = Some("n".to_string());
        p.zoom_min = 5;
        p.clear();
        assert!(p.is_empty());
        assert!(p.name.is_none());
        assert_eq!(p.zoom_min, NO_ZOOM);
    }
}

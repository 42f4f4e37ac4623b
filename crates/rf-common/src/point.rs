//! Geographic point types.

use serde::{Deserialize, Serialize};

/// A geographic point in WGS84 degrees.
///
/// `height_m` is the antenna height above ground level (AGL), not an
/// absolute elevation; terrain height is added by the consumers that
/// sample a DSM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    /// Antenna height above ground level, metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_m: Option<f64>,
}

impl GeoPoint {
    /// Create a point with no antenna height.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            height_m: None,
        }
    }

    /// Create a point with an antenna height above ground level.
    pub fn with_height(lat: f64, lon: f64, height_m: f64) -> Self {
        Self {
            lat,
            lon,
            height_m: Some(height_m),
        }
    }

    /// Antenna height AGL, defaulting to ground level.
    pub fn height_agl(&self) -> f64 {
        self.height_m.unwrap_or(0.0)
    }

    /// Check the WGS84 coordinate invariants: `-90 <= lat <= 90`,
    /// `-180 < lon <= 180`.
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0
            && self.lat <= 90.0
            && self.lon > -180.0
            && self.lon <= 180.0
            && self.lat.is_finite()
            && self.lon.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(GeoPoint::new(32.0, 34.8).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_height_agl_default() {
        assert_eq!(GeoPoint::new(32.0, 34.8).height_agl(), 0.0);
        assert_eq!(GeoPoint::with_height(32.0, 34.8, 15.0).height_agl(), 15.0);
    }
}

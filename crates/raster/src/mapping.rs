//! Sector bounds to pixel grid mapping.

use geodesy::{metres_to_degrees_lat, metres_to_degrees_lon};
use rf_common::GeoBounds;
use serde::{Deserialize, Serialize};

/// Largest raster dimension on either axis.
pub const MAX_DIMENSION: usize = 4096;

/// The fixed mapping between a sector's bounding rectangle and the pixel
/// grid of the streaming raster.
///
/// The effective per-pixel steps are derived *after* clamping the
/// dimensions, so every point inside the bounds maps into
/// `[0, W) x [0, H)` regardless of how coarse the clamp made the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterMapping {
    pub bounds: GeoBounds,
    pub width: usize,
    pub height: usize,
    /// Degrees of longitude per pixel column.
    pub eff_lon_step: f64,
    /// Degrees of latitude per pixel row.
    pub eff_lat_step: f64,
    /// Effective resolution in metres, east-west.
    pub eff_res_x_m: f64,
    /// Effective resolution in metres, north-south.
    pub eff_res_y_m: f64,
}

impl RasterMapping {
    /// Build the mapping for a bounding rectangle at a requested linear
    /// resolution in metres.
    pub fn new(bounds: GeoBounds, resolution_m: f64) -> Self {
        let (mid_lat, _) = bounds.center();

        let req_lat_step = metres_to_degrees_lat(resolution_m);
        let req_lon_step = metres_to_degrees_lon(resolution_m, mid_lat);

        let width = ((bounds.width() / req_lon_step).ceil() as usize).clamp(1, MAX_DIMENSION);
        let height = ((bounds.height() / req_lat_step).ceil() as usize).clamp(1, MAX_DIMENSION);

        let eff_lon_step = bounds.width() / width as f64;
        let eff_lat_step = bounds.height() / height as f64;

        let metres_per_deg_lat = resolution_m / req_lat_step;
        let metres_per_deg_lon = resolution_m / req_lon_step;

        Self {
            bounds,
            width,
            height,
            eff_lon_step,
            eff_lat_step,
            eff_res_x_m: eff_lon_step * metres_per_deg_lon,
            eff_res_y_m: eff_lat_step * metres_per_deg_lat,
        }
    }

    /// Map a WGS84 point to its pixel. Points on the far edges land in
    /// the last row/column; points outside the bounds clamp.
    pub fn pixel_for(&self, lat: f64, lon: f64) -> (usize, usize) {
        let px = ((lon - self.bounds.west) / self.eff_lon_step).floor();
        let py = ((self.bounds.north - lat) / self.eff_lat_step).floor();

        let px = (px.max(0.0) as usize).min(self.width - 1);
        let py = (py.max(0.0) as usize).min(self.height - 1);
        (px, py)
    }

    /// Total pixel count.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_track_resolution() {
        // ~0.09 degrees of latitude is ~10 km; at 100 m resolution that
        // is about 100 rows
        let bounds = GeoBounds::new(34.9, 31.95, 35.1, 32.05);
        let mapping = RasterMapping::new(bounds, 100.0);
        assert!(mapping.height >= 100 && mapping.height <= 120, "H={}", mapping.height);
        // Longitude span shrinks by cos(32 deg)
        assert!(mapping.width >= 150 && mapping.width <= 200, "W={}", mapping.width);
    }

    #[test]
    fn test_clamped_to_max_dimension() {
        let bounds = GeoBounds::new(34.0, 30.0, 36.0, 33.0);
        let mapping = RasterMapping::new(bounds, 1.0);
        assert_eq!(mapping.width, MAX_DIMENSION);
        assert_eq!(mapping.height, MAX_DIMENSION);
    }

    #[test]
    fn test_no_point_overflows_after_clamp() {
        let bounds = GeoBounds::new(34.0, 31.0, 35.0, 32.0);
        let mapping = RasterMapping::new(bounds, 30.0);

        let mut lat = 31.0;
        while lat <= 32.0 {
            let mut lon = 34.0;
            while lon <= 35.0 {
                let (px, py) = mapping.pixel_for(lat, lon);
                assert!(px < mapping.width);
                assert!(py < mapping.height);
                lon += 0.0317;
            }
            lat += 0.0311;
        }

        // Exact corners land in the grid
        assert_eq!(mapping.pixel_for(32.0, 34.0), (0, 0));
        let (px, py) = mapping.pixel_for(31.0, 35.0);
        assert_eq!((px, py), (mapping.width - 1, mapping.height - 1));
    }

    #[test]
    fn test_degenerate_sliver_keeps_min_dimension() {
        let bounds = GeoBounds::new(34.0, 31.0, 34.00001, 32.0);
        let mapping = RasterMapping::new(bounds, 100.0);
        assert_eq!(mapping.width, 1);
        assert!(mapping.height > 1);
    }
}

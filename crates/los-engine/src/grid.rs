//! Lazy sector grid generation.
//!
//! Expands a polar sector configuration into grid points without
//! materialising the whole set. Points are addressable by index, so any
//! worker can regenerate its assigned slice from the configuration alone,
//! and two regenerations of the same slice are bit-identical.

use crate::{SweepError, SweepResult};
use geodesy::{destination_point, metres_to_degrees_lat, metres_to_degrees_lon};
use rf_common::{GeoBounds, GeoPoint};
use serde::{Deserialize, Serialize};

/// Sector sweep configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Origin antenna; `height_m` is its AGL height.
    pub origin: GeoPoint,
    /// Inner sweep radius, metres.
    pub min_distance_m: f64,
    /// Outer sweep radius, metres.
    pub max_distance_m: f64,
    /// Arc start, degrees clockwise from true north.
    pub min_azimuth_deg: f64,
    /// Arc end, degrees clockwise from true north. Equal azimuths mean a
    /// full circle.
    pub max_azimuth_deg: f64,
    /// Linear resolution, metres.
    pub resolution_m: f64,
    /// Target antenna height AGL, metres.
    pub target_height_m: f64,
    /// Operating frequency for Fresnel-zone evaluation; `None` selects
    /// optical-only clearance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_mhz: Option<f64>,
}

impl GridConfig {
    /// Check every configuration invariant, returning the first
    /// violation.
    pub fn validate(&self) -> SweepResult<()> {
        if !self.origin.is_valid() {
            return Err(SweepError::BadConfig(format!(
                "origin ({}, {}) is not a valid WGS84 coordinate",
                self.origin.lat, self.origin.lon
            )));
        }
        if !(self.min_distance_m > 0.0) {
            return Err(SweepError::BadConfig(
                "min distance must be positive".into(),
            ));
        }
        if !(self.max_distance_m > self.min_distance_m) {
            return Err(SweepError::BadConfig(format!(
                "max distance {} must exceed min distance {}",
                self.max_distance_m, self.min_distance_m
            )));
        }
        if !(self.resolution_m > 0.0) {
            return Err(SweepError::BadConfig("resolution must be positive".into()));
        }
        if !self.min_azimuth_deg.is_finite() || !self.max_azimuth_deg.is_finite() {
            return Err(SweepError::BadConfig("azimuths must be finite".into()));
        }
        if let Some(f) = self.frequency_mhz {
            if !(f > 0.0) {
                return Err(SweepError::BadConfig("frequency must be positive".into()));
            }
        }
        Ok(())
    }
}

/// A derived grid point. Identity depends only on the configuration and
/// the point index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub index: u64,
    pub lat: f64,
    pub lon: f64,
    /// Distance from the origin, metres.
    pub distance_m: f64,
    /// Bearing from the origin, degrees clockwise from true north.
    pub bearing_deg: f64,
}

/// One radial shell of the sector.
#[derive(Debug, Clone, Copy)]
struct Shell {
    distance_m: f64,
    angular_step_deg: f64,
    count: u64,
    /// Global index of this shell's first point.
    offset: u64,
}

/// The expanded sector: shell geometry precomputed, points derived on
/// demand.
#[derive(Debug, Clone)]
pub struct SectorGrid {
    config: GridConfig,
    /// Arc start after normalisation (0 for a full circle).
    start_azimuth_deg: f64,
    /// Arc width in degrees, `(0, 360]`.
    arc_width_deg: f64,
    shells: Vec<Shell>,
    total: u64,
}

impl SectorGrid {
    /// Expand a validated configuration into shell geometry.
    pub fn new(config: GridConfig) -> SweepResult<SectorGrid> {
        config.validate()?;

        let min_az = config.min_azimuth_deg.rem_euclid(360.0);
        let max_az = config.max_azimuth_deg.rem_euclid(360.0);
        let width = (max_az - min_az).rem_euclid(360.0);
        // Equal azimuths sweep the full circle; canonicalise its start so
        // every full-circle spelling enumerates identical points.
        let (start, width) = if width == 0.0 {
            (0.0, 360.0)
        } else {
            (min_az, width)
        };

        let span = config.max_distance_m - config.min_distance_m;
        let shell_count = (span / config.resolution_m).floor() as u64 + 1;

        let mut shells = Vec::with_capacity(shell_count as usize);
        let mut offset = 0u64;
        for k in 0..shell_count {
            let distance_m = config.min_distance_m + k as f64 * config.resolution_m;
            let angular_step_deg = angular_step(config.resolution_m, distance_m);
            let count = (width / angular_step_deg).ceil().max(1.0) as u64;
            shells.push(Shell {
                distance_m,
                angular_step_deg,
                count,
                offset,
            });
            offset += count;
        }

        Ok(SectorGrid {
            config,
            start_azimuth_deg: start,
            arc_width_deg: width,
            shells,
            total: offset,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Exact number of points the grid enumerates; drives progress
    /// reporting and chunk partitioning.
    pub fn len(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Arc width after normalisation, degrees.
    pub fn arc_width_deg(&self) -> f64 {
        self.arc_width_deg
    }

    /// Derive the point at a global index.
    pub fn point_at(&self, index: u64) -> Option<GridPoint> {
        if index >= self.total {
            return None;
        }
        // Find the shell containing the index
        let shell_idx = match self
            .shells
            .binary_search_by(|s| s.offset.cmp(&index))
        {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let shell = &self.shells[shell_idx];
        let m = index - shell.offset;

        let bearing_deg =
            (self.start_azimuth_deg + m as f64 * shell.angular_step_deg).rem_euclid(360.0);
        let (lat, lon) = destination_point(
            self.config.origin.lat,
            self.config.origin.lon,
            bearing_deg,
            shell.distance_m,
        );

        Some(GridPoint {
            index,
            lat,
            lon,
            distance_m: shell.distance_m,
            bearing_deg,
        })
    }

    /// Iterate every point, restartable at will.
    pub fn iter(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.total).map(move |i| self.point_at(i).expect("index within total"))
    }

    /// Bounding rectangle of the swept sector, for the raster mapping.
    ///
    /// Sampled along the outer shell each degree of arc plus the origin,
    /// padded by one resolution step so edge points never fall outside.
    pub fn bounds(&self) -> GeoBounds {
        let origin = self.config.origin;
        let mut west = origin.lon;
        let mut east = origin.lon;
        let mut south = origin.lat;
        let mut north = origin.lat;

        let steps = self.arc_width_deg.ceil() as usize;
        for s in 0..=steps {
            let bearing = self.start_azimuth_deg + (s as f64).min(self.arc_width_deg);
            let (lat, lon) = destination_point(
                origin.lat,
                origin.lon,
                bearing.rem_euclid(360.0),
                self.config.max_distance_m,
            );
            west = west.min(lon);
            east = east.max(lon);
            south = south.min(lat);
            north = north.max(lat);
        }

        let pad_lat = metres_to_degrees_lat(self.config.resolution_m);
        let pad_lon = metres_to_degrees_lon(self.config.resolution_m, origin.lat);
        GeoBounds::new(west - pad_lon, south - pad_lat, east + pad_lon, north + pad_lat)
    }
}

/// Angular step at a shell so the arc length between neighbours
/// approximates the linear resolution; never finer than one degree.
fn angular_step(resolution_m: f64, distance_m: f64) -> f64 {
    let arc = resolution_m / (2.0 * std::f64::consts::PI * distance_m) * 360.0;
    arc.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_az: f64, max_az: f64) -> GridConfig {
        GridConfig {
            origin: GeoPoint::with_height(32.0, 35.0, 15.0),
            min_distance_m: 500.0,
            max_distance_m: 5_000.0,
            min_azimuth_deg: min_az,
            max_azimuth_deg: max_az,
            resolution_m: 100.0,
            target_height_m: 2.0,
            frequency_mhz: None,
        }
    }

    #[test]
    fn test_validation_catches_bad_configs() {
        let mut c = config(0.0, 90.0);
        c.min_distance_m = 0.0;
        assert!(SectorGrid::new(c).is_err());

        let mut c = config(0.0, 90.0);
        c.max_distance_m = 400.0;
        assert!(SectorGrid::new(c).is_err());

        let mut c = config(0.0, 90.0);
        c.resolution_m = -5.0;
        assert!(SectorGrid::new(c).is_err());

        let mut c = config(0.0, 90.0);
        c.origin.lat = 95.0;
        assert!(SectorGrid::new(c).is_err());
    }

    #[test]
    fn test_points_respect_distance_and_arc() {
        let grid = SectorGrid::new(config(45.0, 135.0)).unwrap();
        assert!(grid.len() > 0);

        for point in grid.iter() {
            assert!(point.distance_m >= 500.0);
            assert!(point.distance_m <= 5_000.0);
            let offset = (point.bearing_deg - 45.0).rem_euclid(360.0);
            assert!(offset < 90.0 + 1e-9, "bearing {} outside arc", point.bearing_deg);
        }
    }

    #[test]
    fn test_wrapping_arc() {
        // 350 to 10 degrees wraps through north
        let grid = SectorGrid::new(config(350.0, 10.0)).unwrap();
        assert!((grid.arc_width_deg() - 20.0).abs() < 1e-9);

        for point in grid.iter() {
            let offset = (point.bearing_deg - 350.0).rem_euclid(360.0);
            assert!(offset < 20.0 + 1e-9);
        }
    }

    #[test]
    fn test_full_circle_spellings_agree() {
        let a = SectorGrid::new(config(0.0, 360.0)).unwrap();
        let b = SectorGrid::new(config(350.0, 350.0)).unwrap();

        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert_eq!(pa.bearing_deg, pb.bearing_deg);
            assert_eq!(pa.distance_m, pb.distance_m);
        }
    }

    #[test]
    fn test_point_at_matches_iteration() {
        let grid = SectorGrid::new(config(10.0, 200.0)).unwrap();
        for (i, point) in grid.iter().enumerate() {
            let direct = grid.point_at(i as u64).unwrap();
            assert_eq!(point, direct);
        }
        assert!(grid.point_at(grid.len()).is_none());
    }

    #[test]
    fn test_outer_shells_carry_more_points() {
        let grid = SectorGrid::new(config(0.0, 360.0)).unwrap();
        let inner = grid.point_at(0).unwrap();
        assert_eq!(inner.distance_m, 500.0);

        // Count points per shell through the public iterator
        let mut per_shell: std::collections::BTreeMap<u64, u64> = Default::default();
        for p in grid.iter() {
            *per_shell.entry(p.distance_m as u64).or_default() += 1;
        }
        assert!(per_shell[&5000] > per_shell[&500]);
    }

    #[test]
    fn test_last_shell_reaches_outer_radius() {
        // Span divisible by the resolution: the outer radius itself is a
        // shell. The inclusion rule is consistent either way.
        let grid = SectorGrid::new(config(0.0, 90.0)).unwrap();
        let max_d = grid.iter().map(|p| p.distance_m as u64).max().unwrap();
        assert_eq!(max_d, 5_000);
    }

    #[test]
    fn test_bounds_cover_every_point() {
        for (min_az, max_az) in [(0.0, 360.0), (45.0, 135.0), (300.0, 30.0)] {
            let grid = SectorGrid::new(config(min_az, max_az)).unwrap();
            let bounds = grid.bounds();
            for point in grid.iter() {
                assert!(
                    bounds.contains(point.lat, point.lon),
                    "point ({}, {}) outside {:?} for arc ({}, {})",
                    point.lat,
                    point.lon,
                    bounds,
                    min_az,
                    max_az
                );
            }
        }
    }
}

//! Bounding rectangle types.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    /// Create a new bounding rectangle from corner coordinates.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center point `(lat, lon)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Check the rectangle invariant `east > west && north > south`.
    pub fn is_valid(&self) -> bool {
        self.east > self.west
            && self.north > self.south
            && self.west.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.north.is_finite()
    }

    /// Check if a point is contained within this rectangle.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Check if this rectangle intersects another.
    pub fn intersects(&self, other: &GeoBounds) -> bool {
        self.west < other.east
            && self.east > other.west
            && self.south < other.north
            && self.north > other.south
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        GeoBounds {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// Expand the rectangle by a buffer amount in degrees.
    pub fn expand(&self, buffer: f64) -> GeoBounds {
        GeoBounds {
            west: self.west - buffer,
            south: self.south - buffer,
            east: self.east + buffer,
            north: self.north + buffer,
        }
    }
}

/// An axis-aligned rectangle in projected metres (ITM or ICS).
///
/// Kept alongside the WGS84 bounds on layers whose source raster is in a
/// projected grid, so pixel lookups can run against the native axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl ProjectedBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.west && x <= self.east && y >= self.south && y <= self.north
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(GeoBounds::new(34.0, 31.0, 35.0, 32.0).is_valid());
        assert!(!GeoBounds::new(35.0, 31.0, 34.0, 32.0).is_valid());
        assert!(!GeoBounds::new(34.0, 32.0, 35.0, 31.0).is_valid());
    }

    #[test]
    fn test_contains_and_intersects() {
        let a = GeoBounds::new(34.0, 31.0, 35.0, 32.0);
        let b = GeoBounds::new(34.5, 31.5, 35.5, 32.5);
        let c = GeoBounds::new(36.0, 33.0, 37.0, 34.0);

        assert!(a.contains(31.5, 34.5));
        assert!(!a.contains(30.0, 34.5));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_union() {
        let a = GeoBounds::new(34.0, 31.0, 35.0, 32.0);
        let b = GeoBounds::new(34.5, 30.5, 35.5, 31.5);
        let u = a.union(&b);
        assert_eq!(u, GeoBounds::new(34.0, 30.5, 35.5, 32.0));
    }
}

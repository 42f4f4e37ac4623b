//! Coordinate reference systems handled by the toolbox.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The coordinate reference systems a DSM layer can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// WGS84 geographic, lat/lon in degrees (EPSG:4326).
    Wgs84,
    /// Israel Transverse Mercator, metres (EPSG:2039).
    Itm,
    /// Israel Cassini-Soldner, the legacy national grid, metres (EPSG:28193).
    Ics,
}

impl Crs {
    /// Whether coordinates in this CRS are projected metres rather than
    /// geographic degrees.
    pub fn is_projected(&self) -> bool {
        !matches!(self, Crs::Wgs84)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Crs::Wgs84 => "WGS84",
            Crs::Itm => "ITM",
            Crs::Ics => "ICS",
        };
        write!(f, "{}", name)
    }
}

//! Coordinate conversions and local metric approximations.
//!
//! Two families of operations live here:
//!
//! - Spherical formulae on the WGS84 mean-radius sphere: forward
//!   (destination point from bearing and range) and inverse (distance and
//!   initial bearing), plus the flat metres-to-degrees approximations used
//!   for raster sizing.
//! - The Israeli national grids: Israel Transverse Mercator (EPSG:2039) on
//!   the GRS80 ellipsoid, and the legacy Cassini-Soldner grid treated as a
//!   constant offset from ITM.
//!
//! Projection math never fails: out-of-range latitudes saturate at the
//! poles and every function returns finite coordinates for finite input.

pub mod detect;
pub mod itm;
pub mod spherical;

pub use detect::detect_crs;
pub use itm::TransverseMercator;
pub use spherical::{
    destination_point, great_circle_distance, initial_bearing, metres_to_degrees_lat,
    metres_to_degrees_lon, EARTH_RADIUS_M,
};

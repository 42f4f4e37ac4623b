//! Spherical forward/inverse formulae and metric approximations.

use std::f64::consts::PI;

/// Mean Earth radius used by the spherical formulae (metres).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres spanned by one degree of latitude.
const METRES_PER_DEGREE: f64 = 111_320.0;

/// Convert a north-south distance in metres to degrees of latitude.
pub fn metres_to_degrees_lat(metres: f64) -> f64 {
    metres / METRES_PER_DEGREE
}

/// Convert an east-west distance in metres to degrees of longitude at the
/// given latitude. The meridian convergence factor `cos(lat)` shrinks the
/// span of a degree of longitude away from the equator.
pub fn metres_to_degrees_lon(metres: f64, lat_deg: f64) -> f64 {
    metres / (METRES_PER_DEGREE * (lat_deg * PI / 180.0).cos())
}

/// Compute the destination point from a start point, an initial bearing
/// (degrees clockwise from true north) and a range in metres, using the
/// spherical forward formula.
///
/// Returns `(lat, lon)` in degrees with longitude normalised to
/// `(-180, 180]`.
pub fn destination_point(lat_deg: f64, lon_deg: f64, bearing_deg: f64, range_m: f64) -> (f64, f64) {
    let to_rad = PI / 180.0;
    let lat1 = saturate_lat(lat_deg) * to_rad;
    let lon1 = lon_deg * to_rad;
    let bearing = bearing_deg * to_rad;
    let angular = range_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    (lat2 / to_rad, normalize_lon(lon2 / to_rad))
}

/// Great-circle distance between two points in metres (haversine).
pub fn great_circle_distance(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let to_rad = PI / 180.0;
    let lat1 = saturate_lat(lat1_deg) * to_rad;
    let lat2 = saturate_lat(lat2_deg) * to_rad;
    let dlat = (lat2_deg - lat1_deg) * to_rad;
    let dlon = (lon2_deg - lon1_deg) * to_rad;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing from the first point towards the second, in degrees
/// clockwise from true north, normalised to `[0, 360)`.
pub fn initial_bearing(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let to_rad = PI / 180.0;
    let lat1 = saturate_lat(lat1_deg) * to_rad;
    let lat2 = saturate_lat(lat2_deg) * to_rad;
    let dlon = (lon2_deg - lon1_deg) * to_rad;

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    let bearing = y.atan2(x) / to_rad;
    (bearing + 360.0) % 360.0
}

/// Out-of-range latitudes saturate at the poles.
fn saturate_lat(lat_deg: f64) -> f64 {
    lat_deg.clamp(-90.0, 90.0)
}

fn normalize_lon(lon_deg: f64) -> f64 {
    let mut lon = lon_deg % 360.0;
    if lon > 180.0 {
        lon -= 360.0;
    } else if lon <= -180.0 {
        lon += 360.0;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metres_to_degrees_lat() {
        assert!((metres_to_degrees_lat(111_320.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_metres_to_degrees_lon_shrinks_with_latitude() {
        let at_equator = metres_to_degrees_lon(1000.0, 0.0);
        let at_32 = metres_to_degrees_lon(1000.0, 32.0);
        assert!(at_32 > at_equator);
        // cos(32 deg) ~ 0.8480
        assert!((at_32 * 0.848 - at_equator).abs() / at_equator < 1e-3);
    }

    #[test]
    fn test_destination_point_due_north() {
        // 1 km due north moves ~0.009 degrees of latitude
        let (lat, lon) = destination_point(32.0, 34.8, 0.0, 1000.0);
        assert!((lon - 34.8).abs() < 1e-9);
        assert!((lat - 32.0 - 0.008993).abs() < 1e-4);
    }

    #[test]
    fn test_forward_inverse_consistency() {
        let (lat0, lon0) = (32.0853, 34.7818);
        for bearing in [0.0, 37.0, 90.0, 180.0, 251.5, 359.0] {
            for range in [100.0, 5_000.0, 50_000.0] {
                let (lat, lon) = destination_point(lat0, lon0, bearing, range);
                let d = great_circle_distance(lat0, lon0, lat, lon);
                let b = initial_bearing(lat0, lon0, lat, lon);
                assert!(
                    (d - range).abs() < 0.01,
                    "range {} bearing {}: got {}",
                    range,
                    bearing,
                    d
                );
                let mut db = (b - bearing).abs();
                if db > 180.0 {
                    db = 360.0 - db;
                }
                assert!(db < 0.01, "bearing {}: got {}", bearing, b);
            }
        }
    }

    #[test]
    fn test_latitude_saturates() {
        let (lat, _lon) = destination_point(95.0, 0.0, 0.0, 1000.0);
        assert!(lat.is_finite());
        assert!(lat <= 90.0);
    }
}

//! Advisory CRS detection for unlabelled DSM headers.

use rf_common::Crs;

/// Northings below this value are assumed to be on the legacy
/// Cassini-Soldner grid; ITM northings inside Israel all sit above it.
const ICS_NORTHING_CUTOFF: f64 = 400_000.0;

/// Guess the CRS of a coordinate set.
///
/// Coordinates where `min(|coord|) > 1000` and `max(|coord|) > 50000` are
/// taken as projected metres; geographic degrees never reach those
/// magnitudes. Projected coordinates with any northing below 400 000 are
/// classified as ICS, otherwise ITM.
///
/// The detector is advisory only: data sets just inside the northing
/// cutoff can be misclassified, so ingest accepts an explicit CRS that
/// overrides this guess.
pub fn detect_crs(xs: &[f64], ys: &[f64]) -> Crs {
    let all = xs.iter().chain(ys.iter()).map(|v| v.abs());

    let mut min_abs = f64::INFINITY;
    let mut max_abs = 0.0f64;
    for v in all {
        min_abs = min_abs.min(v);
        max_abs = max_abs.max(v);
    }

    if !(min_abs > 1000.0 && max_abs > 50_000.0) {
        return Crs::Wgs84;
    }

    if ys.iter().any(|&n| n < ICS_NORTHING_CUTOFF) {
        Crs::Ics
    } else {
        Crs::Itm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees_detected_as_wgs84() {
        assert_eq!(detect_crs(&[34.2, 35.9], &[29.5, 33.4]), Crs::Wgs84);
    }

    #[test]
    fn test_itm_detected() {
        assert_eq!(
            detect_crs(&[180_000.0, 260_000.0], &[550_000.0, 750_000.0]),
            Crs::Itm
        );
    }

    #[test]
    fn test_low_northing_detected_as_ics() {
        assert_eq!(
            detect_crs(&[130_000.0, 210_000.0], &[50_000.0, 250_000.0]),
            Crs::Ics
        );
    }

    #[test]
    fn test_small_magnitudes_stay_geographic() {
        // Large max but tiny min: not projected
        assert_eq!(detect_crs(&[0.5, 200_000.0], &[100.0, 300_000.0]), Crs::Wgs84);
    }
}

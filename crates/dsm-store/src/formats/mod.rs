//! DSM file format parsers.
//!
//! Each recognised format is a self-contained parser module producing the
//! uniform [`DsmLayer`] shape. Dispatch is by file extension; parsing a
//! malformed file fails without side effects.

pub mod asc;
pub mod geotiff;
pub mod hgt;
pub mod res;

use crate::layer::{DsmLayer, NativeGrid};
use crate::{DsmError, DsmResult};
use geodesy::{detect_crs, TransverseMercator};
use rf_common::{Crs, GeoBounds, ProjectedBounds};
use tracing::debug;

/// Recognised DSM file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsmFormat {
    /// ESRI ASCII grid.
    Asc,
    /// SRTM height tile.
    Hgt,
    /// Single-band GeoTIFF.
    GeoTiff,
    /// In-country RES grid, ASCII or binary.
    Res,
    /// ERDAS IMAGINE raster; recognised but rejected.
    Img,
}

impl DsmFormat {
    /// Determine the format from a file name, by extension.
    pub fn from_filename(filename: &str) -> Option<DsmFormat> {
        let ext = filename.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "asc" => Some(DsmFormat::Asc),
            "hgt" => Some(DsmFormat::Hgt),
            "tif" | "tiff" => Some(DsmFormat::GeoTiff),
            "res" => Some(DsmFormat::Res),
            "img" => Some(DsmFormat::Img),
            _ => None,
        }
    }
}

/// Parse a DSM file into a layer, detecting the CRS from the header
/// coordinates where the format does not declare one.
pub fn parse_dsm(filename: &str, bytes: &[u8]) -> DsmResult<DsmLayer> {
    parse_dsm_with_crs(filename, bytes, None)
}

/// Read and parse a DSM file from disk.
pub fn parse_dsm_path(path: &std::path::Path) -> DsmResult<DsmLayer> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DsmError::Unsupported(format!("unusable path: {}", path.display())))?;
    parse_dsm(filename, &bytes)
}

/// Parse a DSM file with an explicit CRS override.
///
/// The override wins over the coordinate-magnitude heuristic, which can
/// misclassify projected data sets with northings near the ICS cutoff.
pub fn parse_dsm_with_crs(
    filename: &str,
    bytes: &[u8],
    crs_override: Option<Crs>,
) -> DsmResult<DsmLayer> {
    let format = DsmFormat::from_filename(filename)
        .ok_or_else(|| DsmError::Unsupported(format!("unrecognised extension: {}", filename)))?;

    debug!(file = filename, ?format, bytes = bytes.len(), "parsing DSM file");

    match format {
        DsmFormat::Asc => asc::parse(filename, bytes, crs_override),
        DsmFormat::Hgt => hgt::parse(filename, bytes),
        DsmFormat::GeoTiff => geotiff::parse(filename, bytes, crs_override),
        DsmFormat::Res => res::parse(filename, bytes, crs_override),
        DsmFormat::Img => Err(DsmError::Unsupported(
            "IMG rasters are not supported; convert to GeoTIFF or an ASCII grid first".into(),
        )),
    }
}

/// Georeference a raster from its native corner coordinates.
///
/// Applies the CRS heuristic (unless overridden), and for projected grids
/// inverse-projects the corners into a WGS84 coverage rectangle while
/// retaining the native bounds for sampling.
pub(crate) fn georeference(
    west: f64,
    south: f64,
    east: f64,
    north: f64,
    crs_override: Option<Crs>,
) -> DsmResult<(GeoBounds, Option<NativeGrid>)> {
    let crs =
        crs_override.unwrap_or_else(|| detect_crs(&[west, east], &[south, north]));

    match crs {
        Crs::Wgs84 => {
            let bounds = GeoBounds::new(west, south, east, north);
            if !bounds.is_valid() || south < -90.0 || north > 90.0 || west <= -180.0 || east > 180.0
            {
                return Err(DsmError::UnknownCrs(format!(
                    "coordinates ({}, {})..({}, {}) are not geographic degrees",
                    west, south, east, north
                )));
            }
            Ok((bounds, None))
        }
        Crs::Itm | Crs::Ics => {
            let native = ProjectedBounds::new(west, south, east, north);
            if native.width() <= 0.0 || native.height() <= 0.0 {
                return Err(DsmError::UnknownCrs(
                    "degenerate projected bounds".into(),
                ));
            }

            let itm = TransverseMercator::itm();
            let inverse = |x: f64, y: f64| -> (f64, f64) {
                match crs {
                    Crs::Ics => itm.inverse(
                        x - geodesy::itm::ICS_EASTING_SHIFT,
                        y - geodesy::itm::ICS_NORTHING_SHIFT,
                    ),
                    _ => itm.inverse(x, y),
                }
            };

            let corners = [
                inverse(west, south),
                inverse(west, north),
                inverse(east, south),
                inverse(east, north),
            ];
            let mut w = f64::INFINITY;
            let mut s = f64::INFINITY;
            let mut e = f64::NEG_INFINITY;
            let mut n = f64::NEG_INFINITY;
            for (lat, lon) in corners {
                w = w.min(lon);
                e = e.max(lon);
                s = s.min(lat);
                n = n.max(lat);
            }

            Ok((
                GeoBounds::new(w, s, e, n),
                Some(NativeGrid {
                    crs,
                    bounds: native,
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(DsmFormat::from_filename("tile.asc"), Some(DsmFormat::Asc));
        assert_eq!(DsmFormat::from_filename("N32E035.HGT"), Some(DsmFormat::Hgt));
        assert_eq!(DsmFormat::from_filename("dem.tif"), Some(DsmFormat::GeoTiff));
        assert_eq!(DsmFormat::from_filename("dem.tiff"), Some(DsmFormat::GeoTiff));
        assert_eq!(DsmFormat::from_filename("area.res"), Some(DsmFormat::Res));
        assert_eq!(DsmFormat::from_filename("area.img"), Some(DsmFormat::Img));
        assert_eq!(DsmFormat::from_filename("notes.txt"), None);
    }

    #[test]
    fn test_img_rejected_with_recommendation() {
        let err = parse_dsm("area.img", &[0u8; 16]).unwrap_err();
        match err {
            DsmError::Unsupported(msg) => assert!(msg.contains("convert")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_georeference_geographic() {
        let (bounds, native) = georeference(34.0, 31.0, 35.0, 32.0, None).unwrap();
        assert_eq!(bounds, GeoBounds::new(34.0, 31.0, 35.0, 32.0));
        assert!(native.is_none());
    }

    #[test]
    fn test_georeference_projected_retains_native() {
        let (bounds, native) =
            georeference(200_000.0, 600_000.0, 210_000.0, 610_000.0, None).unwrap();
        let native = native.unwrap();
        assert_eq!(native.crs, Crs::Itm);
        assert_eq!(native.bounds.west, 200_000.0);
        // The WGS84 gate covers the projected tile (roughly 0.1 degree)
        assert!(bounds.is_valid());
        assert!(bounds.width() > 0.05 && bounds.width() < 0.2);
        assert!(bounds.contains(31.49, 35.0) || bounds.contains(31.5, 35.0));
    }

    #[test]
    fn test_georeference_override_wins() {
        // Magnitudes would detect as ITM; the caller pins ICS
        let (_, native) =
            georeference(150_000.0, 550_000.0, 160_000.0, 560_000.0, Some(Crs::Ics)).unwrap();
        assert_eq!(native.unwrap().crs, Crs::Ics);
    }
}

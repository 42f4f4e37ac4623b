//! SRTM HGT tile parser.
//!
//! The georeference lives entirely in the file name: `N32E035.hgt` is the
//! one-degree tile whose south-west corner is 32N 35E. The payload is
//! big-endian signed 16-bit samples, north row first, either 1201x1201
//! (3 arc-second) or 3601x3601 (1 arc-second).

use crate::layer::DsmLayer;
use crate::{DsmError, DsmResult};
use rf_common::GeoBounds;

const FORMAT: &str = "HGT";
const SRTM3_SIDE: usize = 1201;
const SRTM1_SIDE: usize = 3601;
const NO_DATA: f32 = -32768.0;

pub fn parse(filename: &str, bytes: &[u8]) -> DsmResult<DsmLayer> {
    let (south, west) = corner_from_filename(filename)?;

    let side = match bytes.len() {
        n if n == SRTM3_SIDE * SRTM3_SIDE * 2 => SRTM3_SIDE,
        n if n == SRTM1_SIDE * SRTM1_SIDE * 2 => SRTM1_SIDE,
        n => {
            return Err(DsmError::bad_format(
                FORMAT,
                format!("unexpected byte length {} (not a 1\" or 3\" tile)", n),
            ))
        }
    };

    let mut data = Vec::with_capacity(side * side);
    for pair in bytes.chunks_exact(2) {
        data.push(i16::from_be_bytes([pair[0], pair[1]]) as f32);
    }

    let bounds = GeoBounds::new(west, south, west + 1.0, south + 1.0);

    DsmLayer::new(filename, side, side, data, NO_DATA, bounds, None)
}

/// Extract the south-west corner from a `[NS]dd[EW]ddd.hgt` file name.
fn corner_from_filename(filename: &str) -> DsmResult<(f64, f64)> {
    let stem = filename
        .rsplit('/')
        .next()
        .unwrap_or(filename)
        .trim_end_matches(".hgt")
        .trim_end_matches(".HGT");

    let b = stem.as_bytes();
    if b.len() != 7 {
        return Err(DsmError::bad_format(
            FORMAT,
            format!("file name {} does not match [NS]dd[EW]ddd", stem),
        ));
    }

    let lat_sign = match b[0].to_ascii_uppercase() {
        b'N' => 1.0,
        b'S' => -1.0,
        _ => return Err(DsmError::bad_format(FORMAT, "expected N or S prefix")),
    };
    let lon_sign = match b[3].to_ascii_uppercase() {
        b'E' => 1.0,
        b'W' => -1.0,
        _ => return Err(DsmError::bad_format(FORMAT, "expected E or W prefix")),
    };

    let digits = |s: &[u8]| -> DsmResult<f64> {
        let text = std::str::from_utf8(s)
            .map_err(|_| DsmError::bad_format(FORMAT, "non-ASCII file name"))?;
        text.parse::<f64>()
            .map_err(|_| DsmError::bad_format(FORMAT, format!("bad coordinate digits: {}", text)))
    };

    let lat = lat_sign * digits(&b[1..3])?;
    let lon = lon_sign * digits(&b[4..7])?;
    Ok((lat, lon))
}

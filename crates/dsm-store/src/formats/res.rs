//! RES grid parser.
//!
//! A binary/ASCII elevation grid historically used in-country. The ASCII
//! variant is identical to the ESRI ASCII grid. The binary variant has a
//! little-endian header of `[i32 ncols, i32 nrows, f64 xll, f64 yll,
//! f64 cellsize]` followed by f32 samples; some producers wrote the
//! cellsize as an f32, shortening the header by four bytes. Headerless
//! files that are a perfect square of f32s are assumed to be a square
//! grid centred on the country.

use super::{asc, georeference};
use crate::layer::DsmLayer;
use crate::{DsmError, DsmResult};
use byteorder::{LittleEndian, ReadBytesExt};
use rf_common::Crs;
use std::io::Cursor;
use tracing::debug;

const FORMAT: &str = "RES";
const DEFAULT_NODATA: f32 = -9999.0;

/// Header variant A: f64 cellsize, 32-byte header.
const HEADER_F64: usize = 32;
/// Header variant B: f32 cellsize, 28-byte header.
const HEADER_F32: usize = 28;

/// Cell size for the assumed headerless square grid, metres.
const FALLBACK_CELL_M: f64 = 25.0;
/// ITM easting of the assumed headerless grid centre.
const FALLBACK_CENTER_E: f64 = 200_000.0;
/// ITM northing of the assumed headerless grid centre.
const FALLBACK_CENTER_N: f64 = 600_000.0;

pub fn parse(filename: &str, bytes: &[u8], crs_override: Option<Crs>) -> DsmResult<DsmLayer> {
    // ASCII attempt first
    if let Ok(text) = std::str::from_utf8(bytes) {
        if text
            .trim_start()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
        {
            return asc::parse_text(filename, text, crs_override);
        }
    }

    // Binary header, f64 cellsize
    if let Some(layer) = try_binary(filename, bytes, true, crs_override)? {
        return Ok(layer);
    }
    // Binary header, f32 cellsize at offset 24
    if let Some(layer) = try_binary(filename, bytes, false, crs_override)? {
        return Ok(layer);
    }

    // Headerless square of f32 samples
    if bytes.len() % 4 == 0 {
        let count = bytes.len() / 4;
        let side = (count as f64).sqrt() as usize;
        if side > 0 && side * side == count {
            debug!(file = filename, side, "assuming headerless square RES grid");
            return headerless_square(filename, bytes, side, crs_override);
        }
    }

    Err(DsmError::bad_format(
        FORMAT,
        "no recognisable ASCII or binary header",
    ))
}

/// Attempt the binary layout. Returns `Ok(None)` when the header is
/// implausible so the caller can try the next variant.
fn try_binary(
    filename: &str,
    bytes: &[u8],
    f64_cellsize: bool,
    crs_override: Option<Crs>,
) -> DsmResult<Option<DsmLayer>> {
    let header_len = if f64_cellsize { HEADER_F64 } else { HEADER_F32 };
    if bytes.len() < header_len {
        return Ok(None);
    }

    let mut cursor = Cursor::new(bytes);
    let ncols = cursor.read_i32::<LittleEndian>().unwrap_or(-1);
    let nrows = cursor.read_i32::<LittleEndian>().unwrap_or(-1);
    let xll = cursor.read_f64::<LittleEndian>().unwrap_or(f64::NAN);
    let yll = cursor.read_f64::<LittleEndian>().unwrap_or(f64::NAN);
    let cellsize = if f64_cellsize {
        cursor.read_f64::<LittleEndian>().unwrap_or(f64::NAN)
    } else {
        cursor.read_f32::<LittleEndian>().unwrap_or(f32::NAN) as f64
    };

    if ncols <= 0 || nrows <= 0 || ncols > 50_000 || nrows > 50_000 {
        return Ok(None);
    }
    if !xll.is_finite() || !yll.is_finite() {
        return Ok(None);
    }
    // Implausible cellsize: reject this header variant
    if !cellsize.is_finite() || cellsize <= 0.0 || cellsize > 1000.0 {
        return Ok(None);
    }

    let (ncols, nrows) = (ncols as usize, nrows as usize);
    let expected = ncols * nrows;
    let payload = &bytes[header_len..];
    if payload.len() != expected * 4 {
        return Ok(None);
    }

    let data = read_f32_samples(payload);

    let west = xll;
    let south = yll;
    let east = west + ncols as f64 * cellsize;
    let north = south + nrows as f64 * cellsize;
    let (bounds, native) = georeference(west, south, east, north, crs_override)?;

    DsmLayer::new(filename, ncols, nrows, data, DEFAULT_NODATA, bounds, native).map(Some)
}

fn headerless_square(
    filename: &str,
    bytes: &[u8],
    side: usize,
    crs_override: Option<Crs>,
) -> DsmResult<DsmLayer> {
    let data = read_f32_samples(bytes);

    let half = side as f64 * FALLBACK_CELL_M / 2.0;
    let west = FALLBACK_CENTER_E - half;
    let east = FALLBACK_CENTER_E + half;
    let south = FALLBACK_CENTER_N - half;
    let north = FALLBACK_CENTER_N + half;

    let (bounds, native) = georeference(west, south, east, north, crs_override.or(Some(Crs::Itm)))?;

    DsmLayer::new(filename, side, side, data, DEFAULT_NODATA, bounds, native)
}

fn read_f32_samples(payload: &[u8]) -> Vec<f32> {
    payload
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

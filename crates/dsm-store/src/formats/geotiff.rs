//! Single-band GeoTIFF parser.
//!
//! Uses the pure-Rust `tiff` decoder. The georeference is taken from the
//! ModelTiepoint and ModelPixelScale tags; a GDAL no-data tag is honoured
//! when present. If the bounding box looks projected, the corners are
//! inverse-projected through ITM/ICS for the WGS84 coverage rectangle
//! while the native bounds are retained for sampling.

use super::georeference;
use crate::layer::DsmLayer;
use crate::{DsmError, DsmResult};
use rf_common::Crs;
use std::io::Cursor;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;

const FORMAT: &str = "GeoTIFF";
const DEFAULT_NODATA: f32 = -9999.0;

/// GDAL_NODATA, an ASCII tag carrying the no-data value.
const TAG_GDAL_NODATA: u16 = 42113;

pub fn parse(filename: &str, bytes: &[u8], crs_override: Option<Crs>) -> DsmResult<DsmLayer> {
    let mut decoder = Decoder::new(Cursor::new(bytes))
        .map_err(|e| DsmError::bad_format(FORMAT, format!("not a TIFF: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| DsmError::bad_format(FORMAT, format!("missing dimensions: {}", e)))?;
    let (width, height) = (width as usize, height as usize);

    match decoder.colortype() {
        Ok(ColorType::Gray(_)) => {}
        Ok(other) => {
            return Err(DsmError::bad_format(
                FORMAT,
                format!("expected a single-band raster, got {:?}", other),
            ))
        }
        Err(e) => return Err(DsmError::bad_format(FORMAT, format!("bad color type: {}", e))),
    }

    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| DsmError::UnknownCrs("missing ModelPixelScale tag".into()))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| DsmError::UnknownCrs("missing ModelTiepoint tag".into()))?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(DsmError::UnknownCrs("incomplete georeference tags".into()));
    }

    // Tiepoint maps raster (i, j) to model (x, y)
    let west = tiepoint[3] - tiepoint[0] * scale[0];
    let north = tiepoint[4] + tiepoint[1] * scale[1];
    let east = west + width as f64 * scale[0];
    let south = north - height as f64 * scale[1];

    let no_data = decoder
        .get_tag_ascii_string(Tag::Unknown(TAG_GDAL_NODATA))
        .ok()
        .and_then(|s| s.trim().parse::<f32>().ok())
        .unwrap_or(DEFAULT_NODATA);

    let data = match decoder
        .read_image()
        .map_err(|e| DsmError::bad_format(FORMAT, format!("failed to decode samples: {}", e)))?
    {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U8(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U16(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I16(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        _ => {
            return Err(DsmError::bad_format(
                FORMAT,
                "unsupported sample format (expected float or integer)",
            ))
        }
    };

    if data.len() != width * height {
        return Err(DsmError::Truncated {
            expected: width * height,
            actual: data.len(),
        });
    }

    let (bounds, native) = georeference(west, south, east, north, crs_override)?;

    DsmLayer::new(filename, width, height, data, no_data, bounds, native)
}

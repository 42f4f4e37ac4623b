//! ESRI ASCII grid parser.
//!
//! Text header of `key value` lines followed by whitespace-separated
//! samples, row-major from the top. Header keys are case-insensitive.
//! `xllcenter`/`yllcenter` are accepted as synonyms for the corner keys
//! without a half-cell offset, matching the behaviour of the system this
//! parser replaces.

use super::georeference;
use crate::layer::DsmLayer;
use crate::{DsmError, DsmResult};
use rf_common::Crs;

const FORMAT: &str = "ASC";
const DEFAULT_NODATA: f32 = -9999.0;

struct AscHeader {
    ncols: usize,
    nrows: usize,
    xll: f64,
    yll: f64,
    cellsize: f64,
    nodata: f32,
}

pub fn parse(filename: &str, bytes: &[u8], crs_override: Option<Crs>) -> DsmResult<DsmLayer> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| DsmError::bad_format(FORMAT, "file is not valid text"))?;
    parse_text(filename, text, crs_override)
}

/// Parse ASCII grid content that is already known to be text. Shared with
/// the RES parser, whose ASCII variant is identical.
pub(crate) fn parse_text(
    filename: &str,
    text: &str,
    crs_override: Option<Crs>,
) -> DsmResult<DsmLayer> {
    let mut tokens = text.split_whitespace().peekable();

    let mut ncols: Option<usize> = None;
    let mut nrows: Option<usize> = None;
    let mut xll: Option<f64> = None;
    let mut yll: Option<f64> = None;
    let mut cellsize: Option<f64> = None;
    let mut nodata = DEFAULT_NODATA;

    // Header: alternating key/value pairs until the first numeric token
    while let Some(&tok) = tokens.peek() {
        if !tok.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            break;
        }
        let key = tokens.next().unwrap().to_ascii_lowercase();
        let value = tokens
            .next()
            .ok_or_else(|| DsmError::bad_format(FORMAT, format!("missing value for {}", key)))?;

        let parse_f64 = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| DsmError::bad_format(FORMAT, format!("bad number for {}: {}", key, v)))
        };

        match key.as_str() {
            "ncols" => ncols = Some(parse_f64(value)? as usize),
            "nrows" => nrows = Some(parse_f64(value)? as usize),
            "xllcorner" | "xllcenter" => xll = Some(parse_f64(value)?),
            "yllcorner" | "yllcenter" => yll = Some(parse_f64(value)?),
            "cellsize" => cellsize = Some(parse_f64(value)?),
            "nodata_value" => nodata = parse_f64(value)? as f32,
            _ => {
                return Err(DsmError::bad_format(
                    FORMAT,
                    format!("unknown header key: {}", key),
                ))
            }
        }
    }

    let header = AscHeader {
        ncols: ncols.ok_or_else(|| DsmError::bad_format(FORMAT, "missing ncols"))?,
        nrows: nrows.ok_or_else(|| DsmError::bad_format(FORMAT, "missing nrows"))?,
        xll: xll.ok_or_else(|| DsmError::bad_format(FORMAT, "missing xllcorner"))?,
        yll: yll.ok_or_else(|| DsmError::bad_format(FORMAT, "missing yllcorner"))?,
        cellsize: cellsize.ok_or_else(|| DsmError::bad_format(FORMAT, "missing cellsize"))?,
        nodata,
    };

    if header.ncols == 0 || header.nrows == 0 {
        return Err(DsmError::bad_format(FORMAT, "zero-sized grid"));
    }
    if header.cellsize <= 0.0 {
        return Err(DsmError::bad_format(FORMAT, "non-positive cellsize"));
    }

    let expected = header.ncols * header.nrows;
    let mut data = Vec::with_capacity(expected);
    for tok in tokens {
        let v: f32 = tok
            .parse()
            .map_err(|_| DsmError::bad_format(FORMAT, format!("bad sample value: {}", tok)))?;
        data.push(v);
    }
    if data.len() != expected {
        return Err(DsmError::Truncated {
            expected,
            actual: data.len(),
        });
    }

    let west = header.xll;
    let south = header.yll;
    let east = west + header.ncols as f64 * header.cellsize;
    let north = south + header.nrows as f64 * header.cellsize;

    let (bounds, native) = georeference(west, south, east, north, crs_override)?;

    DsmLayer::new(
        filename,
        header.ncols,
        header.nrows,
        data,
        header.nodata,
        bounds,
        native,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "\
ncols 3
nrows 2
xllcorner 34.5
yllcorner 31.5
cellsize 0.1
nodata_value -9999
1 2 3
4 5 6
";

    #[test]
    fn test_parse_small_grid() {
        let layer = parse("t.asc", SMALL.as_bytes(), None).unwrap();
        assert_eq!(layer.width, 3);
        assert_eq!(layer.height, 2);
        assert_eq!(layer.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(layer.no_data, -9999.0);
        assert_eq!(layer.min_elevation, 1.0);
        assert_eq!(layer.max_elevation, 6.0);

        // bounds: 3 x 0.1 wide, 2 x 0.1 tall from the lower-left corner
        assert!((layer.bounds.west - 34.5).abs() < 1e-12);
        assert!((layer.bounds.east - 34.8).abs() < 1e-12);
        assert!((layer.bounds.south - 31.5).abs() < 1e-12);
        assert!((layer.bounds.north - 31.7).abs() < 1e-12);
        assert!(layer.native.is_none());
    }

    #[test]
    fn test_header_keys_case_insensitive() {
        let text = SMALL.replace("ncols", "NCOLS").replace("cellsize", "CellSize");
        let layer = parse("t.asc", text.as_bytes(), None).unwrap();
        assert_eq!(layer.width, 3);
    }

    #[test]
    fn test_xllcenter_is_not_offset() {
        let text = SMALL
            .replace("xllcorner", "xllcenter")
            .replace("yllcorner", "yllcenter");
        let layer = parse("t.asc", text.as_bytes(), None).unwrap();
        // Same origin as the corner variant
        assert!((layer.bounds.west - 34.5).abs() < 1e-12);
        assert!((layer.bounds.south - 31.5).abs() < 1e-12);
    }

    #[test]
    fn test_nodata_defaults() {
        let text = SMALL.replace("nodata_value -9999\n", "");
        let layer = parse("t.asc", text.as_bytes(), None).unwrap();
        assert_eq!(layer.no_data, -9999.0);
    }

    #[test]
    fn test_truncated_data_rejected() {
        let text = SMALL.replace("4 5 6\n", "4 5\n");
        match parse("t.asc", text.as_bytes(), None).unwrap_err() {
            DsmError::Truncated { expected, actual } => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 5);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_garbage_sample_rejected() {
        let text = SMALL.replace("5", "fifty");
        assert!(parse("t.asc", text.as_bytes(), None).is_err());
    }

    #[test]
    fn test_projected_header_detected() {
        let text = "\
ncols 2
nrows 2
xllcorner 200000
yllcorner 600000
cellsize 50
10 20
30 40
";
        let layer = parse("itm.asc", text.as_bytes(), None).unwrap();
        let native = layer.native.expect("should be projected");
        assert_eq!(native.crs, rf_common::Crs::Itm);
        assert_eq!(native.bounds.west, 200_000.0);
        assert_eq!(native.bounds.north, 600_100.0);
    }
}

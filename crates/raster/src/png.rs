//! Indexed PNG encoding for the coverage overlay.
//!
//! The state buffer's bytes are already palette indices, so encoding is a
//! straight scanline pass: four-entry palette (transparent, grey, red,
//! green), tRNS for per-entry alpha, zlib-compressed IDAT.

use crate::{RasterError, RasterResult};
use std::io::Write;

/// RGBA palette indexed by `CellState` discriminant: EMPTY transparent,
/// NO_DATA grey at 40 % alpha, BLOCKED red at 80 %, CLEAR green at 80 %.
pub const STATE_PALETTE: [(u8, u8, u8, u8); 4] = [
    (0, 0, 0, 0),
    (128, 128, 128, 102),
    (211, 47, 47, 204),
    (56, 142, 60, 204),
];

/// Encode a state-index plane as an indexed PNG (color type 3).
pub fn encode_state_png(indices: &[u8], width: usize, height: usize) -> RasterResult<Vec<u8>> {
    if width == 0 || height == 0 || width > 4096 || height > 4096 {
        return Err(RasterError::BadDimensions { width, height });
    }
    if indices.len() != width * height {
        return Err(RasterError::Encode(format!(
            "index plane has {} bytes for {}x{}",
            indices.len(),
            width,
            height
        )));
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    // IHDR chunk
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(3); // color type 3 = indexed
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr);

    // PLTE chunk
    let mut plte = Vec::with_capacity(STATE_PALETTE.len() * 3);
    for (r, g, b, _) in STATE_PALETTE {
        plte.push(r);
        plte.push(g);
        plte.push(b);
    }
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS chunk carries the per-entry alpha
    let trns: Vec<u8> = STATE_PALETTE.iter().map(|&(_, _, _, a)| a).collect();
    write_chunk(&mut png, b"tRNS", &trns);

    // IDAT: filter byte 0 per scanline, then zlib
    let mut raw = Vec::with_capacity(height * (1 + width));
    for row in indices.chunks_exact(width) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| RasterError::Encode(e.to_string()))?;
    let idat = encoder
        .finish()
        .map_err(|e| RasterError::Encode(e.to_string()))?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write one PNG chunk: length, type, data, CRC over type+data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

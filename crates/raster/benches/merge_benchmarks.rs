//! Benchmarks for the streaming-raster hot path: batch merge and PNG
//! snapshot encoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use raster::{pack_cell, png::encode_state_png, RasterMapping, StateBuffer};
use rf_common::{CellState, GeoBounds};

fn bench_apply_packed(c: &mut Criterion) {
    let mapping = RasterMapping::new(GeoBounds::new(34.0, 31.0, 35.0, 32.0), 30.0);

    // A realistic chunk-sized batch with mixed states
    let batch: Vec<u32> = (0..16_384u32)
        .map(|i| {
            let px = (i as usize * 31) % mapping.width;
            let py = (i as usize * 17) % mapping.height;
            let state = match i % 3 {
                0 => CellState::NoData,
                1 => CellState::Blocked,
                _ => CellState::Clear,
            };
            pack_cell(px, py, state)
        })
        .collect();

    c.bench_function("apply_packed_16k", |b| {
        b.iter(|| {
            let mut buffer = StateBuffer::new(&mapping);
            buffer.apply_packed(black_box(&batch));
            black_box(buffer.dirty())
        })
    });
}

fn bench_encode_png(c: &mut Criterion) {
    let mapping = RasterMapping::new(GeoBounds::new(34.0, 31.0, 35.0, 32.0), 30.0);
    let mut buffer = StateBuffer::new(&mapping);
    for i in 0..mapping.len() {
        buffer.merge(
            i % mapping.width,
            i / mapping.width,
            if i % 2 == 0 { CellState::Clear } else { CellState::Blocked },
        );
    }

    c.bench_function("encode_state_png_full", |b| {
        b.iter(|| {
            encode_state_png(
                black_box(buffer.as_bytes()),
                mapping.width,
                mapping.height,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_apply_packed, bench_encode_png);
criterion_main!(benches);
